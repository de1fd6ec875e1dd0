//! govariant generates closed sum types for Go.
//!
//! A Go file declares a variant as an interface named `_` documented with
//! `// @variant <Name>`. Each method without results is a constructor; the
//! generated file holds the tagged interface, one concrete type per
//! constructor, and optional accessors, visitor and conformance checks.

pub use crate::errors::{ErrorKind, SourceContext, VariantError};
pub use crate::model::{Constructor, GenerateOptions, Parameter, VariantSpec};
pub use crate::pipeline::{GeneratedUnit, GenerationPipeline};
pub use crate::render::{render, RenderContext};

pub mod cli;
pub mod errors;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod scanner;
pub mod syntax;
pub mod validation;
