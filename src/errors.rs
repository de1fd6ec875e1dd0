//! govariant Error Handling
//!
//! Every failure in the pipeline is a [`VariantError`]: what went wrong
//! ([`ErrorKind`]), where it happened ([`SourceInfo`]) and how to help
//! ([`DiagnosticInfo`]). Errors are plain values returned up the call chain;
//! the CLI renders them with miette.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::{LineIndex, Span};

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// A named source text, the input of one pipeline run.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Reads a file from disk. The path is used as the source name.
    pub fn read(path: &Path) -> Result<Self, VariantError> {
        let content = std::fs::read_to_string(path).map_err(|e| VariantError::io(path, &e))?;
        Ok(Self::from_file(path.display().to_string(), content))
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

/// A resolved file position, printed as `file:line:column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The single error type of the crate.
#[derive(Debug)]
pub struct VariantError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened; absent for errors without a source location
    pub source_info: Option<SourceInfo>,
    /// How to help
    pub diagnostic_info: DiagnosticInfo,
}

/// Shape of an unnamed constructor parameter that cannot become a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexParameter {
    Interface,
    Pointer,
}

impl fmt::Display for ComplexParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexParameter::Interface => f.write_str("interface"),
            ComplexParameter::Pointer => f.write_str("pointer"),
        }
    }
}

/// All error types as a clean enum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Annotation errors
    #[error("missing variant name")]
    MissingVariantName,
    #[error("variant name is not a valid go identifier ({name})")]
    InvalidVariantName { name: String },
    #[error("missing package name in @import")]
    MissingImportPath,
    #[error("@import package name failed to parse as string ({value})")]
    MalformedImport { value: String },

    // Structural errors
    #[error("type declaration must not be surrounded by parentheses")]
    GroupedDeclarationNotAllowed,
    #[error("variant must be defined with a type declaration")]
    NotATypeDeclaration,
    #[error("type declaration must be named _")]
    WrongPlaceholderName { found: String },
    #[error("variant declaration must not have type parameters")]
    GenericDeclarationNotAllowed,
    #[error("type must be defined as an interface")]
    NotAnInterfaceType,
    #[error("cannot have duplicate variant names in file ({name})")]
    DuplicateVariantName { name: String },
    #[error("must have at least one constructor")]
    NoConstructorsDeclared,

    // Constructor shape errors
    #[error("cannot have a return type on a constructor")]
    ConstructorMustNotReturn,
    #[error("cannot have variadic constructor")]
    VariadicConstructorNotAllowed,
    #[error("cannot have an unnamed {shape} type in constructor")]
    UnnamedComplexParameterNotAllowed { shape: ComplexParameter },
    #[error("cannot use a name list as parameters in a constructor")]
    SharedNameListNotAllowed,
    #[error("cannot have multiple unnamed parameters in a constructor")]
    MultipleUnnamedParametersNotAllowed,
    #[error("@method can only annotate a method signature")]
    InvalidMethodAnnotation,

    // Input errors
    #[error("syntax error: {message}")]
    Syntax { message: String },
    #[error("cannot access {path}: {message}")]
    Io { path: String, message: String },

    // Rendering errors
    #[error("rendering failed: {message}")]
    RenderError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Annotation,
    Structural,
    Constructor,
    Syntax,
    Io,
    Render,
}

impl ErrorKind {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingVariantName
            | Self::InvalidVariantName { .. }
            | Self::MissingImportPath
            | Self::MalformedImport { .. } => ErrorCategory::Annotation,

            Self::GroupedDeclarationNotAllowed
            | Self::NotATypeDeclaration
            | Self::WrongPlaceholderName { .. }
            | Self::GenericDeclarationNotAllowed
            | Self::NotAnInterfaceType
            | Self::DuplicateVariantName { .. }
            | Self::NoConstructorsDeclared => ErrorCategory::Structural,

            Self::ConstructorMustNotReturn
            | Self::VariadicConstructorNotAllowed
            | Self::UnnamedComplexParameterNotAllowed { .. }
            | Self::SharedNameListNotAllowed
            | Self::MultipleUnnamedParametersNotAllowed
            | Self::InvalidMethodAnnotation => ErrorCategory::Constructor,

            Self::Syntax { .. } => ErrorCategory::Syntax,
            Self::Io { .. } => ErrorCategory::Io,
            Self::RenderError { .. } => ErrorCategory::Render,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MissingVariantName => "missing_variant_name",
            Self::InvalidVariantName { .. } => "invalid_variant_name",
            Self::MissingImportPath => "missing_import_path",
            Self::MalformedImport { .. } => "malformed_import",
            Self::GroupedDeclarationNotAllowed => "grouped_declaration",
            Self::NotATypeDeclaration => "not_a_type_declaration",
            Self::WrongPlaceholderName { .. } => "wrong_placeholder_name",
            Self::GenericDeclarationNotAllowed => "generic_declaration",
            Self::NotAnInterfaceType => "not_an_interface",
            Self::DuplicateVariantName { .. } => "duplicate_variant_name",
            Self::NoConstructorsDeclared => "no_constructors",
            Self::ConstructorMustNotReturn => "constructor_returns",
            Self::VariadicConstructorNotAllowed => "variadic_constructor",
            Self::UnnamedComplexParameterNotAllowed { .. } => "unnamed_complex_parameter",
            Self::SharedNameListNotAllowed => "shared_name_list",
            Self::MultipleUnnamedParametersNotAllowed => "multiple_unnamed_parameters",
            Self::InvalidMethodAnnotation => "invalid_method_annotation",
            Self::Syntax { .. } => "syntax",
            Self::Io { .. } => "io",
            Self::RenderError { .. } => "render",
        }
    }

    /// Suggestion shown under the diagnostic.
    fn help(&self) -> Option<&'static str> {
        match self {
            Self::MissingVariantName => Some("write the variant name after the marker: `// @variant Shape`"),
            Self::MissingImportPath | Self::MalformedImport { .. } => {
                Some("write the import path as a quoted string: `// @import \"fmt\"`")
            }
            Self::WrongPlaceholderName { .. } => {
                Some("the declared type is only a template; name it `_` and put the name in `@variant`")
            }
            Self::ConstructorMustNotReturn => {
                Some("annotate regular methods with a trailing `// @method` comment")
            }
            Self::UnnamedComplexParameterNotAllowed { .. } => {
                Some("name the parameter so it can become a struct field")
            }
            Self::SharedNameListNotAllowed => {
                Some("give every parameter its own type: `Rect(w float64, h float64)`")
            }
            Self::MultipleUnnamedParametersNotAllowed => {
                Some("name every parameter when a constructor takes more than one")
            }
            _ => None,
        }
    }

    fn primary_label(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Annotation => "in this annotation",
            ErrorCategory::Structural => "in this declaration",
            ErrorCategory::Constructor => "in this constructor",
            ErrorCategory::Syntax => "here",
            ErrorCategory::Io | ErrorCategory::Render => "here",
        }
    }
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub position: Position,
    pub phase: String,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl VariantError {
    /// An error without a source location.
    pub fn unspanned(kind: ErrorKind, phase: &str) -> Self {
        let error_code = format!("govariant::{}::{}", phase, kind.code_suffix());
        Self {
            diagnostic_info: DiagnosticInfo {
                help: kind.help().map(str::to_string),
                error_code,
            },
            kind,
            source_info: None,
        }
    }

    pub fn io(path: &Path, error: &std::io::Error) -> Self {
        Self::unspanned(
            ErrorKind::Io {
                path: path.display().to_string(),
                message: error.to_string(),
            },
            "io",
        )
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::unspanned(
            ErrorKind::RenderError {
                message: message.into(),
            },
            "render",
        )
    }

    /// Position of the offending token, if the error has one.
    pub fn position(&self) -> Option<&Position> {
        self.source_info.as_ref().map(|info| &info.position)
    }
}

impl std::error::Error for VariantError {}

impl fmt::Display for VariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position() {
            Some(position) => write!(f, "{}: govariant: {}", position, self.kind),
            None => write!(f, "govariant: {}", self.kind),
        }
    }
}

impl Diagnostic for VariantError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let info = self.source_info.as_ref()?;
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_info
            .as_ref()
            .map(|info| &*info.source as &dyn miette::SourceCode)
    }
}

// ============================================================================
// ERROR REPORTING
// ============================================================================

/// Context-aware error creation
pub trait ErrorReporting {
    /// Create an error located at `span`
    fn report(&self, kind: ErrorKind, span: Span) -> VariantError;

    fn syntax_error(&self, message: impl Into<String>, span: Span) -> VariantError {
        self.report(
            ErrorKind::Syntax {
                message: message.into(),
            },
            span,
        )
    }

    /// Creates an error for a parse tree that does not match the grammar's
    /// guarantees. These indicate bugs, not user errors.
    fn internal_error(&self, message: &str, span: Span) -> VariantError {
        let mut error = self.syntax_error(format!("internal parser error: {}", message), span);
        error.diagnostic_info.help =
            Some("This is an internal govariant error. Please report this as a bug.".into());
        error
    }
}

/// General-purpose error creation context used by every pipeline phase.
pub struct ValidationContext {
    pub source: SourceContext,
    pub phase: String,
    named: Arc<NamedSource<String>>,
    lines: LineIndex,
}

impl ValidationContext {
    pub fn new(source: &SourceContext, phase: impl Into<String>) -> Self {
        Self {
            named: source.to_named_source(),
            lines: LineIndex::new(&source.content),
            source: source.clone(),
            phase: phase.into(),
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        let (line, column) = self.lines.line_col(offset);
        Position {
            file: self.source.name.clone(),
            line,
            column,
        }
    }
}

impl ErrorReporting for ValidationContext {
    fn report(&self, kind: ErrorKind, span: Span) -> VariantError {
        let error_code = format!("govariant::{}::{}", self.phase, kind.code_suffix());
        let len = span.end.saturating_sub(span.start);

        VariantError {
            source_info: Some(SourceInfo {
                source: Arc::clone(&self.named),
                primary_span: SourceSpan::from((span.start, len)),
                position: self.position(span.start),
                phase: self.phase.clone(),
            }),
            diagnostic_info: DiagnosticInfo {
                help: kind.help().map(str::to_string),
                error_code,
            },
            kind,
        }
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a VariantError with full miette diagnostics
pub fn print_error(error: VariantError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_go_position_format() {
        let source = SourceContext::from_file("shape.go", "package main\n\n// @variant\ntype _ interface{}\n");
        let ctx = ValidationContext::new(&source, "scan");
        let error = ctx.report(ErrorKind::MissingVariantName, Span::new(14, 24));
        assert_eq!(
            error.to_string(),
            "shape.go:3:1: govariant: missing variant name"
        );
        assert_eq!(
            error.diagnostic_info.error_code,
            "govariant::scan::missing_variant_name"
        );
    }

    #[test]
    fn unspanned_errors_have_no_position() {
        let error = VariantError::render("boom");
        assert!(error.position().is_none());
        assert_eq!(error.to_string(), "govariant: rendering failed: boom");
        assert_eq!(error.kind.category(), ErrorCategory::Render);
    }

    #[test]
    fn miette_report_contains_code_and_help() {
        let source = SourceContext::from_file("x.go", "package x\ntype _ interface { A(a, b int) }\n");
        let ctx = ValidationContext::new(&source, "validate");
        let error = ctx.report(ErrorKind::SharedNameListNotAllowed, Span::new(22, 30));
        let output = format!("{:?}", miette::Report::new(error));
        assert!(output.contains("govariant::validate::shared_name_list"));
        assert!(output.contains("give every parameter its own type"));
    }
}
