//! Renders a [`VariantSpec`] as Go source.
//!
//! The source is assembled first and formatted afterwards by the context's
//! [`SourceFormatter`]. Cells that gofmt aligns are separated by `\t`.

use std::fmt::{self, Write};

use tracing::debug;

use crate::errors::VariantError;
use crate::format::{CanonicalFormatter, SourceFormatter};
use crate::model::{ConstructorShape, Constructor, VariantSpec};

pub const DEFAULT_COMMAND: &str = "govariant";

/// Widest function header plus body statement gofmt prints on one line.
const MAX_ONE_LINE: usize = 100;

/// Settings shared by every render of one run.
pub struct RenderContext {
    /// Command line quoted in the generated-file header.
    pub command: String,
    pub formatter: Box<dyn SourceFormatter>,
}

impl RenderContext {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            formatter: Box::new(CanonicalFormatter),
        }
    }

    pub fn with_formatter(mut self, formatter: impl SourceFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND)
    }
}

/// Renders and formats the file for one variant.
pub fn render(spec: &VariantSpec, ctx: &RenderContext) -> Result<String, VariantError> {
    let mut source = String::new();
    write_variant(&mut source, spec, &ctx.command)
        .map_err(|e| VariantError::render(format!("cannot build source: {}", e)))?;

    debug!(variant = %spec.name, bytes = source.len(), "formatting generated source");
    ctx.formatter
        .format(&source)
        .map_err(|e| VariantError::render(e.to_string()))
}

fn write_variant(out: &mut String, spec: &VariantSpec, command: &str) -> fmt::Result {
    writeln!(out, "// Code generated by {}; DO NOT EDIT.", command)?;
    writeln!(out, "package {}", spec.package)?;
    writeln!(out)?;

    if !spec.imports.is_empty() {
        writeln!(out, "import (")?;
        for import in &spec.imports {
            writeln!(out, "\t{}", import)?;
        }
        writeln!(out, ")")?;
        writeln!(out)?;
    }

    writeln!(out, "type {} interface {{", spec.name)?;
    for method in &spec.residual_methods {
        writeln!(out, "\t{}", method)?;
    }
    writeln!(out, "}}")?;

    if spec.options.visitor {
        writeln!(out)?;
        writeln!(out, "type {} struct {{", spec.visitor_name())?;
        for constructor in &spec.constructors {
            writeln!(
                out,
                "\t{}\tfunc({})",
                constructor.visitor_field(),
                constructor.unpack_types().join(", ")
            )?;
        }
        writeln!(out, "}}")?;
    }

    for constructor in &spec.constructors {
        writeln!(out)?;
        write_concrete_type(out, constructor)?;
    }

    for constructor in &spec.constructors {
        writeln!(out)?;
        write_methods(out, spec, constructor)?;
    }

    if spec.options.conformance_check {
        writeln!(out)?;
        writeln!(out, "var (")?;
        for constructor in &spec.constructors {
            writeln!(out, "\t_ {} = struct{{ {} }}{{}}", spec.name, constructor.name)?;
        }
        writeln!(out, ")")?;
    }
    Ok(())
}

fn write_concrete_type(out: &mut String, constructor: &Constructor) -> fmt::Result {
    match constructor.shape() {
        ConstructorShape::Unit => writeln!(out, "type {} struct{{}}", constructor.name),
        ConstructorShape::Newtype(ty) => writeln!(out, "type {} {}", constructor.name, ty),
        ConstructorShape::Record(parameters) => {
            writeln!(out, "type {} struct {{", constructor.name)?;
            for parameter in parameters {
                let name = parameter.name.as_deref().unwrap_or_default();
                writeln!(out, "\t{}\t{}", name, parameter.ty)?;
            }
            writeln!(out, "}}")
        }
    }
}

fn write_methods(out: &mut String, spec: &VariantSpec, constructor: &Constructor) -> fmt::Result {
    let name = &constructor.name;
    let values = constructor.unpack_values().join(", ");

    write_func(out, &format!("func ({}) {}()", name, spec.tag_method()), "")?;

    if spec.options.accessor {
        let types = constructor.unpack_types();
        let result = match types.as_slice() {
            [] => String::new(),
            [single] => format!(" {}", single),
            many => format!(" ({})", many.join(", ")),
        };
        let body = if values.is_empty() {
            "return".to_string()
        } else {
            format!("return {}", values)
        };
        write_func(out, &format!("func (rcv {}) Unpack(){}", name, result), &body)?;
    }

    if spec.options.visitor {
        write_func(
            out,
            &format!("func (rcv {}) Visit(v {})", name, spec.visitor_name()),
            &format!("v.{}({})", constructor.visitor_field(), values),
        )?;
    }
    Ok(())
}

/// Writes a function with a body of at most one statement. gofmt keeps the
/// body on the header's line only while both fit in [`MAX_ONE_LINE`]
/// columns; one-line bodies are tab-separated so consecutive ones align.
fn write_func(out: &mut String, header: &str, statement: &str) -> fmt::Result {
    if header.chars().count() + statement.chars().count() > MAX_ONE_LINE {
        writeln!(out, "{} {{", header)?;
        writeln!(out, "\t{}", statement)?;
        return writeln!(out, "}}");
    }
    if statement.is_empty() {
        writeln!(out, "{}\t{{}}", header)
    } else {
        writeln!(out, "{}\t{{ {} }}", header, statement)
    }
}
