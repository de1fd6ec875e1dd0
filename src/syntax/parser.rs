//! govariant Parser
//!
//! Reads Go source in two passes. [`parse`] builds the file skeleton: the
//! package clause, every top-level declaration with an uninterpreted body and
//! its doc comment. [`parse_type_decl`] parses one declaration from that
//! skeleton in detail; it is only called for declarations that carry a
//! variant annotation.

use pest::{
    error::{Error, ErrorVariant, InputLocation},
    iterators::{Pair, Pairs},
    Parser,
};
use pest_derive::Parser;

use crate::errors::{ErrorReporting, SourceContext, ValidationContext, VariantError};
use crate::syntax::{
    comments, ChanDir, Comment, Decl, DeclKeyword, ElemKind, Field, FieldList, Ident,
    InterfaceElem, InterfaceType, LineIndex, Results, Signature, SourceFile, Span, StructField,
    StructType, TypeExpr, TypeSpec, TypeTerm,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct GoParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse a Go source file into its declaration skeleton.
pub fn parse(source: &SourceContext) -> Result<SourceFile, VariantError> {
    let ctx = ValidationContext::new(source, "parse");
    let text = source.content.as_str();

    let file = GoParser::parse(Rule::file, text)
        .map_err(|e| convert_parse_error(e, &ctx, 0))?
        .next()
        .ok_or_else(|| ctx.internal_error("empty parse tree", Span::default()))?;

    let comments = scan_comments(text, &ctx)?;
    let lines = LineIndex::new(text);

    let mut package = None;
    let mut decls = Vec::new();
    let mut prev_end = None;

    for pair in file.into_inner() {
        match pair.as_rule() {
            Rule::package_clause => {
                let span = get_span(&pair);
                let name = next_pair(&mut pair.into_inner(), &ctx, span, "package name")?;
                package = Some(Ident::new(name.as_str(), get_span(&name)));
                prev_end = Some(span.end);
            }
            Rule::top_level_decl => {
                let decl = build_decl(pair, text, &ctx, &comments, &lines, prev_end)?;
                prev_end = Some(decl.span.end);
                decls.push(decl);
            }
            _ => {}
        }
    }

    let package =
        package.ok_or_else(|| ctx.internal_error("missing package clause", Span::default()))?;

    Ok(SourceFile {
        package,
        decls,
        comments,
        lines,
    })
}

/// Parse a declaration of `file` as a single type declaration.
pub fn parse_type_decl(
    source: &SourceContext,
    file: &SourceFile,
    decl: &Decl,
) -> Result<TypeSpec, VariantError> {
    let ctx = ValidationContext::new(source, "parse");
    let text = source
        .content
        .get(decl.span.start..decl.span.end)
        .ok_or_else(|| ctx.internal_error("declaration outside of source", decl.span))?;

    let pair = GoParser::parse(Rule::type_decl, text)
        .map_err(|e| convert_parse_error(e, &ctx, decl.span.start))?
        .next()
        .ok_or_else(|| ctx.internal_error("empty parse tree", decl.span))?;

    let builder = TypeBuilder {
        ctx: &ctx,
        file,
        base: decl.span.start,
    };
    let spec = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::type_spec)
        .ok_or_else(|| ctx.internal_error("missing type spec", decl.span))?;
    builder.type_spec(spec)
}

/// Whether `text` is a valid Go identifier.
pub fn is_identifier(text: &str) -> bool {
    GoParser::parse(Rule::variant_name, text).is_ok()
}

/// Whether `text` is a single quoted or raw Go string literal.
pub fn is_string_literal(text: &str) -> bool {
    GoParser::parse(Rule::import_path, text).is_ok()
}

// ============================================================================
// FILE SKELETON
// ============================================================================

fn scan_comments(text: &str, ctx: &ValidationContext) -> Result<Vec<Comment>, VariantError> {
    let pairs = GoParser::parse(Rule::comments, text).map_err(|e| convert_parse_error(e, ctx, 0))?;
    Ok(pairs
        .flatten()
        .filter(|p| matches!(p.as_rule(), Rule::line_comment | Rule::block_comment))
        .map(|p| Comment::new(p.as_str(), get_span(&p)))
        .collect())
}

fn build_decl(
    pair: Pair<Rule>,
    text: &str,
    ctx: &ValidationContext,
    comments: &[Comment],
    lines: &LineIndex,
    prev_end: Option<usize>,
) -> Result<Decl, VariantError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let keyword_pair = next_pair(&mut inner, ctx, span, "declaration keyword")?;
    let keyword = DeclKeyword::parse(keyword_pair.as_str())
        .ok_or_else(|| ctx.internal_error("unknown declaration keyword", span))?;
    let body = inner.next().map_or("", |p| p.as_str());

    Ok(Decl {
        keyword,
        span: Span::new(span.start, last_token_end(text, comments, span)),
        grouped: body.trim_start().starts_with('('),
        doc: comments::lead_comment(comments, lines, prev_end, span.start),
    })
}

/// End of the last token of a declaration body, skipping trailing blanks and
/// comments that the body consumed.
fn last_token_end(text: &str, comments: &[Comment], span: Span) -> usize {
    let mut end = span.end;
    loop {
        let trimmed = span.start + text[span.start..end].trim_end().len();
        match comments
            .iter()
            .find(|c| c.span.start >= span.start && c.span.start < trimmed && trimmed <= c.span.end)
        {
            Some(comment) => end = comment.span.start,
            None => return trimmed,
        }
    }
}

// ============================================================================
// TYPE BUILDERS
// ============================================================================

/// Builds type syntax from a declaration parsed out of a slice of the file.
/// Spans are shifted by `base` so they point into the whole file.
struct TypeBuilder<'a> {
    ctx: &'a ValidationContext,
    file: &'a SourceFile,
    base: usize,
}

impl<'a> TypeBuilder<'a> {
    fn span(&self, pair: &Pair<Rule>) -> Span {
        get_span(pair).offset(self.base)
    }

    fn next<'i>(
        &self,
        pairs: &mut Pairs<'i, Rule>,
        span: Span,
        what: &str,
    ) -> Result<Pair<'i, Rule>, VariantError> {
        next_pair(pairs, self.ctx, span, what)
    }

    fn type_spec(&self, pair: Pair<Rule>) -> Result<TypeSpec, VariantError> {
        let span = self.span(&pair);
        let mut name = None;
        let mut type_params = None;
        let mut ty = None;

        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::identifier => name = Some(Ident::new(part.as_str(), self.span(&part))),
                Rule::type_params => type_params = Some(self.span(&part)),
                Rule::type_expr => ty = Some(self.type_expr(part)?),
                _ => {}
            }
        }

        Ok(TypeSpec {
            name: name.ok_or_else(|| self.ctx.internal_error("missing type name", span))?,
            type_params,
            ty: ty.ok_or_else(|| self.ctx.internal_error("missing type", span))?,
        })
    }

    fn type_expr(&self, pair: Pair<Rule>) -> Result<TypeExpr, VariantError> {
        let outer = self.span(&pair);
        let inner = self.next(&mut pair.into_inner(), outer, "type")?;
        let span = self.span(&inner);

        match inner.as_rule() {
            Rule::named_type => self.named_type(inner),
            Rule::pointer_type => Ok(TypeExpr::Pointer(Box::new(self.elem(inner, span)?), span)),
            Rule::slice_type => Ok(TypeExpr::Slice(Box::new(self.elem(inner, span)?), span)),
            Rule::paren_type => Ok(TypeExpr::Paren(Box::new(self.elem(inner, span)?), span)),
            Rule::array_type => {
                let mut parts = inner.into_inner();
                let len = self.next(&mut parts, span, "array length")?;
                let elem = self.type_expr(self.next(&mut parts, span, "element type")?)?;
                Ok(TypeExpr::Array {
                    len: len.as_str().trim().to_string(),
                    elem: Box::new(elem),
                    span,
                })
            }
            Rule::map_type => {
                let mut parts = inner.into_inner();
                let key = self.type_expr(self.next(&mut parts, span, "key type")?)?;
                let value = self.type_expr(self.next(&mut parts, span, "value type")?)?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    span,
                })
            }
            Rule::chan_type => {
                let mut parts = inner.into_inner();
                let dir = self.next(&mut parts, span, "channel direction")?.as_str();
                let dir = if dir.starts_with("<-") {
                    ChanDir::Recv
                } else if dir.ends_with("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let elem = self.type_expr(self.next(&mut parts, span, "element type")?)?;
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(elem),
                    span,
                })
            }
            Rule::func_type => {
                let signature = self.next(&mut inner.into_inner(), span, "signature")?;
                Ok(TypeExpr::Func(self.signature(signature)?, span))
            }
            Rule::interface_type => Ok(TypeExpr::Interface(self.interface(inner)?)),
            Rule::struct_type => Ok(TypeExpr::Struct(self.structure(inner)?)),
            _ => Err(self.ctx.internal_error("unexpected type rule", span)),
        }
    }

    /// The single type nested in `pair`.
    fn elem(&self, pair: Pair<Rule>, span: Span) -> Result<TypeExpr, VariantError> {
        let inner = self.next(&mut pair.into_inner(), span, "element type")?;
        self.type_expr(inner)
    }

    fn named_type(&self, pair: Pair<Rule>) -> Result<TypeExpr, VariantError> {
        let span = self.span(&pair);
        let mut parts = pair.into_inner();
        let (package, name) = self.qualified_ident(self.next(&mut parts, span, "type name")?, span)?;
        let args = match parts.next() {
            Some(args) => self.type_args(args)?,
            None => vec![],
        };
        Ok(TypeExpr::Named {
            package,
            name,
            args,
            span,
        })
    }

    fn qualified_ident(
        &self,
        pair: Pair<Rule>,
        span: Span,
    ) -> Result<(Option<String>, String), VariantError> {
        let mut idents = pair.into_inner().map(|p| p.as_str().to_string());
        match (idents.next(), idents.next()) {
            (Some(package), Some(name)) => Ok((Some(package), name)),
            (Some(name), None) => Ok((None, name)),
            _ => Err(self.ctx.internal_error("empty type name", span)),
        }
    }

    fn type_args(&self, pair: Pair<Rule>) -> Result<Vec<TypeExpr>, VariantError> {
        pair.into_inner().map(|arg| self.type_expr(arg)).collect()
    }

    fn identifiers(&self, pair: Pair<Rule>) -> Vec<Ident> {
        pair.into_inner()
            .map(|id| Ident::new(id.as_str(), self.span(&id)))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    fn signature(&self, pair: Pair<Rule>) -> Result<Signature, VariantError> {
        let span = self.span(&pair);
        let mut parts = pair.into_inner();
        let params = self.parameters(self.next(&mut parts, span, "parameters")?)?;
        let results = match parts.next() {
            Some(result) => {
                let inner = self.next(&mut result.into_inner(), span, "result")?;
                Some(match inner.as_rule() {
                    Rule::parameters => Results::List(self.parameters(inner)?),
                    _ => Results::Single(Box::new(self.type_expr(inner)?)),
                })
            }
            None => None,
        };
        Ok(Signature { params, results })
    }

    fn parameters(&self, pair: Pair<Rule>) -> Result<FieldList, VariantError> {
        let span = self.span(&pair);
        let fields = pair
            .into_inner()
            .map(|decl| self.parameter(decl))
            .collect::<Result<_, _>>()?;
        Ok(FieldList { fields, span })
    }

    fn parameter(&self, pair: Pair<Rule>) -> Result<Field, VariantError> {
        let span = self.span(&pair);
        let mut names = vec![];
        let mut variadic = false;
        let mut ty = None;

        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::identifier_list => names = self.identifiers(part),
                Rule::variadic => variadic = true,
                Rule::type_expr => ty = Some(self.type_expr(part)?),
                _ => {}
            }
        }

        Ok(Field {
            names,
            variadic,
            ty: ty.ok_or_else(|| self.ctx.internal_error("missing parameter type", span))?,
            span,
        })
    }

    // ------------------------------------------------------------------------
    // Interfaces
    // ------------------------------------------------------------------------

    fn interface(&self, pair: Pair<Rule>) -> Result<InterfaceType, VariantError> {
        let span = self.span(&pair);
        let open = pair
            .as_str()
            .find('{')
            .map_or(span.start, |i| span.start + i + 1);

        let parsed = pair
            .into_inner()
            .map(|elem| self.interface_elem(elem))
            .collect::<Result<Vec<_>, _>>()?;

        // Each trailing comment must start before the next element.
        let limits: Vec<usize> = parsed
            .iter()
            .skip(1)
            .map(|(_, next)| next.start)
            .chain(std::iter::once(span.end))
            .collect();

        let mut elems = Vec::with_capacity(parsed.len());
        let mut prev_end = open;
        for ((kind, elem_span), limit) in parsed.into_iter().zip(limits) {
            let doc = comments::lead_comment(
                &self.file.comments,
                &self.file.lines,
                Some(prev_end),
                elem_span.start,
            );
            let comment =
                comments::line_comment(&self.file.comments, &self.file.lines, elem_span.end, limit);
            prev_end = elem_span.end;
            elems.push(InterfaceElem {
                kind,
                doc,
                comment,
                span: elem_span,
            });
        }

        Ok(InterfaceType { elems, span })
    }

    fn interface_elem(&self, pair: Pair<Rule>) -> Result<(ElemKind, Span), VariantError> {
        let span = self.span(&pair);
        let inner = self.next(&mut pair.into_inner(), span, "interface element")?;

        let kind = match inner.as_rule() {
            Rule::method_elem => {
                let mut parts = inner.into_inner();
                let name = self.next(&mut parts, span, "method name")?;
                let signature = self.signature(self.next(&mut parts, span, "method signature")?)?;
                ElemKind::Method {
                    name: Ident::new(name.as_str(), self.span(&name)),
                    signature,
                }
            }
            _ => ElemKind::Embedded(
                inner
                    .into_inner()
                    .map(|term| self.type_term(term))
                    .collect::<Result<_, _>>()?,
            ),
        };
        Ok((kind, span))
    }

    fn type_term(&self, pair: Pair<Rule>) -> Result<TypeTerm, VariantError> {
        let span = self.span(&pair);
        let mut tilde = false;
        let mut ty = None;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::tilde => tilde = true,
                _ => ty = Some(self.type_expr(part)?),
            }
        }
        Ok(TypeTerm {
            tilde,
            ty: ty.ok_or_else(|| self.ctx.internal_error("missing type term", span))?,
        })
    }

    // ------------------------------------------------------------------------
    // Structs
    // ------------------------------------------------------------------------

    fn structure(&self, pair: Pair<Rule>) -> Result<StructType, VariantError> {
        let span = self.span(&pair);
        let fields = pair
            .into_inner()
            .map(|field| self.struct_field(field))
            .collect::<Result<_, _>>()?;
        Ok(StructType { fields, span })
    }

    fn struct_field(&self, pair: Pair<Rule>) -> Result<StructField, VariantError> {
        let span = self.span(&pair);
        let mut parts = pair.into_inner();
        let field = self.next(&mut parts, span, "field")?;
        let tag = parts.next().map(|tag| tag.as_str().to_string());

        if field.as_rule() == Rule::named_fields {
            let mut inner = field.into_inner();
            let names = self.identifiers(self.next(&mut inner, span, "field names")?);
            let ty = self.elem(self.next(&mut inner, span, "field type")?, span)?;
            return Ok(StructField { names, ty, tag });
        }

        // embedded field
        let mut pointer = false;
        let mut name = None;
        let mut args = vec![];
        for part in field.into_inner() {
            match part.as_rule() {
                Rule::embedded_star => pointer = true,
                Rule::qualified_ident => name = Some(self.qualified_ident(part, span)?),
                Rule::type_args => args = self.type_args(part)?,
                _ => {}
            }
        }
        let (package, name) =
            name.ok_or_else(|| self.ctx.internal_error("missing embedded type", span))?;
        let named = TypeExpr::Named {
            package,
            name,
            args,
            span,
        };
        let ty = if pointer {
            TypeExpr::Pointer(Box::new(named), span)
        } else {
            named
        };
        Ok(StructField {
            names: vec![],
            ty,
            tag,
        })
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    ctx: &ValidationContext,
    span: Span,
    what: &str,
) -> Result<Pair<'i, Rule>, VariantError> {
    pairs
        .next()
        .ok_or_else(|| ctx.internal_error(&format!("missing {}", what), span))
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, ctx: &ValidationContext, base: usize) -> VariantError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    }
    .offset(base);

    let message = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } => describe_expected(positives),
        ErrorVariant::CustomError { message } => message.clone(),
    };

    ctx.syntax_error(message, span)
}

fn describe_expected(positives: &[Rule]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for name in positives.iter().map(|rule| rule_name(*rule)) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    if names.is_empty() {
        "unexpected input".to_string()
    } else {
        format!("expected {}", names.join(" or "))
    }
}

fn rule_name(rule: Rule) -> &'static str {
    match rule {
        Rule::package_clause => "package clause",
        Rule::top_level_decl | Rule::decl_keyword => "declaration",
        Rule::identifier | Rule::identifier_list => "identifier",
        Rule::type_spec => "type specification",
        Rule::type_expr
        | Rule::named_type
        | Rule::qualified_ident
        | Rule::pointer_type
        | Rule::slice_type
        | Rule::array_type
        | Rule::map_type
        | Rule::chan_type
        | Rule::func_type
        | Rule::interface_type
        | Rule::struct_type
        | Rule::paren_type => "type",
        Rule::parameters | Rule::parameter_decl => "parameter list",
        Rule::interface_elem | Rule::method_elem | Rule::type_elem => "interface element",
        Rule::field_decl => "struct field",
        Rule::string_lit => "string literal",
        Rule::EOI => "end of input",
        _ => "token",
    }
}
