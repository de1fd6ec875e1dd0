//! Finding variant declarations.
//!
//! A top-level declaration is a candidate when the last line of its doc
//! comment is a `@variant <Name>` annotation. `@import "<path>"` lines may
//! appear anywhere in the same doc comment.

use tracing::debug;

use crate::errors::{ErrorKind, ErrorReporting, ValidationContext, VariantError};
use crate::syntax::parser::{is_identifier, is_string_literal};
use crate::syntax::{Annotation, Comment, Decl, SourceFile};

/// An annotated declaration that still has to be validated.
#[derive(Debug, Clone)]
pub struct Candidate<'f> {
    pub decl: &'f Decl,
    pub name: String,
    /// The `@variant` comment.
    pub marker: &'f Comment,
    /// Quoted import paths, in doc order.
    pub imports: Vec<String>,
}

/// The candidates of `file` in declaration order. Each declaration is only
/// scanned when the iterator reaches it, so callers can validate a candidate
/// before a later annotation is looked at.
pub fn scan<'f>(
    file: &'f SourceFile,
    ctx: &'f ValidationContext,
) -> impl Iterator<Item = Result<Candidate<'f>, VariantError>> + 'f {
    file.decls
        .iter()
        .filter(|d| d.keyword.is_general())
        .filter_map(move |decl| scan_decl(decl, ctx).transpose())
}

/// The candidate declared by `decl`, if its doc comment ends in `@variant`.
fn scan_decl<'f>(
    decl: &'f Decl,
    ctx: &ValidationContext,
) -> Result<Option<Candidate<'f>>, VariantError> {
    let Some(doc) = &decl.doc else {
        return Ok(None);
    };
    let Some(marker) = doc.last() else {
        return Ok(None);
    };
    let Some(Annotation::Variant { name }) = &marker.annotation else {
        return Ok(None);
    };

    let name = match name {
        Some(name) if is_identifier(name) => name.clone(),
        Some(name) => {
            return Err(ctx.report(
                ErrorKind::InvalidVariantName { name: name.clone() },
                marker.span,
            ))
        }
        None => return Err(ctx.report(ErrorKind::MissingVariantName, marker.span)),
    };

    let imports = doc
        .list
        .iter()
        .filter_map(|comment| match &comment.annotation {
            Some(Annotation::Import { path }) => Some(import_path(comment, path, ctx)),
            _ => None,
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(variant = %name, imports = imports.len(), "found variant candidate");
    Ok(Some(Candidate {
        decl,
        name,
        marker,
        imports,
    }))
}

fn import_path(
    comment: &Comment,
    path: &Option<String>,
    ctx: &ValidationContext,
) -> Result<String, VariantError> {
    match path {
        Some(path) if is_string_literal(path) => Ok(path.clone()),
        Some(path) => Err(ctx.report(
            ErrorKind::MalformedImport {
                value: path.clone(),
            },
            comment.span,
        )),
        None => Err(ctx.report(ErrorKind::MissingImportPath, comment.span)),
    }
}
