//! Syntax module for the Go front-end
//!
//! This module provides the syntax tree types for the subset of Go that
//! govariant reads: the file skeleton (package clause and top-level
//! declarations), doc comments, and the type syntax of candidate declarations.
//! Every node carries a byte span into the original source text.

use std::fmt;

use serde::{Serialize, Serializer};

pub mod annotation;
pub mod comments;
pub mod parser;
pub mod printer;

pub use annotation::Annotation;

// ============================================================================
// SPANS
// ============================================================================

/// Represents a span in the source code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Shifts the span by `base` bytes. Used when a declaration is parsed
    /// from a slice of the file.
    pub fn offset(self, base: usize) -> Self {
        Self {
            start: self.start + base,
            end: self.end + base,
        }
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based line of the byte at `offset`.
    pub fn line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(next) => next,
        }
    }

    /// 1-based (line, column) of the byte at `offset`. Columns count bytes,
    /// like Go's token positions.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let column = offset - self.line_starts[line - 1] + 1;
        (line, column)
    }
}

// ============================================================================
// COMMENTS
// ============================================================================

/// A single `//` or `/* */` comment, with its annotation classified once at
/// parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
    pub annotation: Option<Annotation>,
}

impl Comment {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        let text = text.into();
        let annotation = Annotation::classify(&text);
        Self {
            text,
            span,
            annotation,
        }
    }
}

/// Adjacent comments with no blank line between them.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentGroup {
    pub list: Vec<Comment>,
}

impl CommentGroup {
    pub fn last(&self) -> Option<&Comment> {
        self.list.last()
    }

    pub fn span(&self) -> Span {
        match (self.list.first(), self.list.last()) {
            (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
            _ => Span::default(),
        }
    }
}

// ============================================================================
// FILE SKELETON
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// An identifier synthesized by the generator; it has no source position.
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self::new(name, Span::default())
    }
}

/// A parsed Go source file: the package clause, every top-level declaration
/// with an uninterpreted body, and all comments.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: Ident,
    pub decls: Vec<Decl>,
    pub comments: Vec<Comment>,
    pub lines: LineIndex,
}

/// The keyword that introduces a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Import,
    Type,
    Var,
    Const,
    Func,
}

impl DeclKeyword {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "import" => Some(Self::Import),
            "type" => Some(Self::Type),
            "var" => Some(Self::Var),
            "const" => Some(Self::Const),
            "func" => Some(Self::Func),
            _ => None,
        }
    }

    /// Function declarations are not general declarations and never carry
    /// a variant.
    pub fn is_general(self) -> bool {
        !matches!(self, Self::Func)
    }
}

/// A top-level declaration. The body is kept as a span; only candidate type
/// declarations are parsed further.
#[derive(Debug, Clone)]
pub struct Decl {
    pub keyword: DeclKeyword,
    pub span: Span,
    /// `type ( ... )`, `var ( ... )`, etc.
    pub grouped: bool,
    pub doc: Option<CommentGroup>,
}

// ============================================================================
// TYPE DECLARATIONS
// ============================================================================

/// `type Name[params] Type`. Alias declarations (`type Name = Type`) parse
/// to the same node.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    /// Span of `[T any, ...]`, if present.
    pub type_params: Option<Span>,
    pub ty: TypeExpr,
}

/// A parenthesized list of fields: parameters or results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldList {
    pub fields: Vec<Field>,
    pub span: Span,
}

impl FieldList {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            span: Span::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// One entry of a field list. `names` is empty for unnamed entries and has
/// more than one element for shared name lists such as `a, b int`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<Ident>,
    pub variadic: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

impl Field {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self {
            names: vec![],
            variadic: false,
            ty,
            span: Span::default(),
        }
    }

    /// Number of parameters this entry declares; an unnamed entry declares one.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: FieldList,
    pub results: Option<Results>,
}

/// Function results: a bare type or a parenthesized list.
#[derive(Debug, Clone, PartialEq)]
pub enum Results {
    Single(Box<TypeExpr>),
    List(FieldList),
}

impl Results {
    pub fn span(&self) -> Span {
        match self {
            Results::Single(ty) => ty.span(),
            Results::List(list) => list.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A Go type expression. The generator never interprets these; it only
/// checks their outer shape and prints them back.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Named {
        package: Option<String>,
        name: String,
        args: Vec<TypeExpr>,
        span: Span,
    },
    Pointer(Box<TypeExpr>, Span),
    Slice(Box<TypeExpr>, Span),
    Array {
        len: String,
        elem: Box<TypeExpr>,
        span: Span,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        span: Span,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
        span: Span,
    },
    Func(Signature, Span),
    Interface(InterfaceType),
    Struct(StructType),
    Paren(Box<TypeExpr>, Span),
}

impl TypeExpr {
    /// A plain, unqualified type name without position.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: None,
            name: name.into(),
            args: vec![],
            span: Span::default(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::Pointer(_, span)
            | TypeExpr::Slice(_, span)
            | TypeExpr::Array { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Chan { span, .. }
            | TypeExpr::Func(_, span)
            | TypeExpr::Paren(_, span) => *span,
            TypeExpr::Interface(interface) => interface.span,
            TypeExpr::Struct(structure) => structure.span,
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self) -> &TypeExpr {
        match self {
            TypeExpr::Paren(inner, _) => inner.unparen(),
            other => other,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::print_type(self))
    }
}

impl Serialize for TypeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&printer::print_type(self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub elems: Vec<InterfaceElem>,
    pub span: Span,
}

/// One line of an interface body.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceElem {
    pub kind: ElemKind,
    pub doc: Option<CommentGroup>,
    /// Comment trailing the element on its last line.
    pub comment: Option<Comment>,
    pub span: Span,
}

impl InterfaceElem {
    /// A method element synthesized by the generator.
    pub fn method(name: &str, params: Vec<Field>) -> Self {
        Self {
            kind: ElemKind::Method {
                name: Ident::synthetic(name),
                signature: Signature {
                    params: FieldList::new(params),
                    results: None,
                },
            },
            doc: None,
            comment: None,
            span: Span::default(),
        }
    }

    /// The same element with its documentation removed.
    pub fn without_comments(&self) -> Self {
        Self {
            doc: None,
            comment: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for InterfaceElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::print_elem(self))
    }
}

impl Serialize for InterfaceElem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&printer::print_elem(self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElemKind {
    Method { name: Ident, signature: Signature },
    /// Embedded interface or union of type terms (`~int | string`).
    Embedded(Vec<TypeTerm>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub fields: Vec<StructField>,
    pub span: Span,
}

/// A struct field. Embedded fields have no names.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(1), (1, 2));
        assert_eq!(index.line_col(3), (2, 1));
        assert_eq!(index.line_col(6), (3, 1));
        assert_eq!(index.line_col(8), (4, 2));
    }

    #[test]
    fn unparen_strips_nesting() {
        let inner = TypeExpr::Pointer(Box::new(TypeExpr::named("int")), Span::default());
        let wrapped = TypeExpr::Paren(
            Box::new(TypeExpr::Paren(Box::new(inner.clone()), Span::default())),
            Span::default(),
        );
        assert_eq!(wrapped.unparen(), &inner);
    }
}
