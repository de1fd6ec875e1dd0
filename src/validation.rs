//! Structural validation of variant candidates.
//!
//! A candidate must be a single type declaration named `_` whose type is an
//! interface. Every interface member is then classified: embedded elements
//! and methods annotated with a trailing `// @method` comment are carried into
//! the generated interface, every other method is a constructor. Validation
//! stops at the first error.

use std::collections::HashSet;

use tracing::trace;

use crate::errors::{
    ComplexParameter, ErrorKind, ErrorReporting, SourceContext, ValidationContext, VariantError,
};
use crate::scanner::Candidate;
use crate::syntax::parser::parse_type_decl;
use crate::syntax::{
    Annotation, DeclKeyword, ElemKind, Field, FieldList, Ident, InterfaceElem, InterfaceType,
    Signature, SourceFile, TypeExpr,
};

/// The placeholder name every variant declaration must use.
pub const PLACEHOLDER: &str = "_";

/// A candidate that passed validation, with its members classified in
/// declaration order.
#[derive(Debug, Clone)]
pub struct ValidatedVariant {
    pub name: String,
    pub imports: Vec<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Constructor { name: Ident, params: FieldList },
    Method(InterfaceElem),
}

impl ValidatedVariant {
    pub fn constructors(&self) -> impl Iterator<Item = (&Ident, &FieldList)> {
        self.members.iter().filter_map(|member| match member {
            Member::Constructor { name, params } => Some((name, params)),
            Member::Method(_) => None,
        })
    }
}

/// Validates the candidates of one file. Remembers the variant names it has
/// accepted so duplicates within the file are rejected.
pub struct Validator<'a> {
    source: &'a SourceContext,
    file: &'a SourceFile,
    ctx: &'a ValidationContext,
    seen: HashSet<String>,
}

impl<'a> Validator<'a> {
    pub fn new(source: &'a SourceContext, file: &'a SourceFile, ctx: &'a ValidationContext) -> Self {
        Self {
            source,
            file,
            ctx,
            seen: HashSet::new(),
        }
    }

    pub fn validate(&mut self, candidate: &Candidate<'_>) -> Result<ValidatedVariant, VariantError> {
        let decl = candidate.decl;
        if decl.grouped {
            return Err(self
                .ctx
                .report(ErrorKind::GroupedDeclarationNotAllowed, decl.span));
        }
        if decl.keyword != DeclKeyword::Type {
            return Err(self.ctx.report(ErrorKind::NotATypeDeclaration, decl.span));
        }

        let spec = parse_type_decl(self.source, self.file, decl)?;
        if spec.name.name != PLACEHOLDER {
            return Err(self.ctx.report(
                ErrorKind::WrongPlaceholderName {
                    found: spec.name.name.clone(),
                },
                spec.name.span,
            ));
        }
        if let Some(params) = spec.type_params {
            return Err(self
                .ctx
                .report(ErrorKind::GenericDeclarationNotAllowed, params));
        }
        let TypeExpr::Interface(interface) = &spec.ty else {
            return Err(self.ctx.report(ErrorKind::NotAnInterfaceType, spec.ty.span()));
        };
        if self.seen.contains(&candidate.name) {
            return Err(self.ctx.report(
                ErrorKind::DuplicateVariantName {
                    name: candidate.name.clone(),
                },
                spec.name.span,
            ));
        }

        let members = self.classify_members(interface)?;
        self.seen.insert(candidate.name.clone());

        Ok(ValidatedVariant {
            name: candidate.name.clone(),
            imports: candidate.imports.clone(),
            members,
        })
    }

    fn classify_members(&self, interface: &InterfaceType) -> Result<Vec<Member>, VariantError> {
        let members = interface
            .elems
            .iter()
            .map(|elem| self.classify(elem))
            .collect::<Result<Vec<_>, _>>()?;

        if !members
            .iter()
            .any(|m| matches!(m, Member::Constructor { .. }))
        {
            return Err(self
                .ctx
                .report(ErrorKind::NoConstructorsDeclared, interface.span));
        }
        Ok(members)
    }

    fn classify(&self, elem: &InterfaceElem) -> Result<Member, VariantError> {
        if let Some(comment) = &elem.comment {
            if comment.annotation == Some(Annotation::Method) {
                return match elem.kind {
                    ElemKind::Method { .. } => {
                        trace!(member = %elem, "annotated method");
                        Ok(Member::Method(elem.clone()))
                    }
                    ElemKind::Embedded(_) => Err(self
                        .ctx
                        .report(ErrorKind::InvalidMethodAnnotation, comment.span)),
                };
            }
        }

        match &elem.kind {
            ElemKind::Embedded(_) => {
                trace!(member = %elem, "embedded element");
                Ok(Member::Method(elem.clone()))
            }
            ElemKind::Method { name, signature } => {
                self.check_constructor(signature)?;
                trace!(member = %elem, "constructor");
                Ok(Member::Constructor {
                    name: name.clone(),
                    params: signature.params.clone(),
                })
            }
        }
    }

    fn check_constructor(&self, signature: &Signature) -> Result<(), VariantError> {
        if let Some(results) = &signature.results {
            return Err(self
                .ctx
                .report(ErrorKind::ConstructorMustNotReturn, results.span()));
        }

        let params = &signature.params;
        let count = parameter_count(params);
        for field in &params.fields {
            if field.variadic {
                return Err(self
                    .ctx
                    .report(ErrorKind::VariadicConstructorNotAllowed, field.span));
            }
            if field.names.is_empty() {
                if let Some(shape) = complex_shape(&field.ty) {
                    return Err(self.ctx.report(
                        ErrorKind::UnnamedComplexParameterNotAllowed { shape },
                        field.span,
                    ));
                }
            }
            if count > 1 {
                if field.names.is_empty() {
                    return Err(self
                        .ctx
                        .report(ErrorKind::MultipleUnnamedParametersNotAllowed, field.span));
                }
                if field.names.len() > 1 {
                    return Err(self
                        .ctx
                        .report(ErrorKind::SharedNameListNotAllowed, field.span));
                }
            }
        }
        Ok(())
    }
}

/// Number of parameters, counting every name of a shared name list.
fn parameter_count(params: &FieldList) -> usize {
    params.fields.iter().map(Field::arity).sum()
}

fn complex_shape(ty: &TypeExpr) -> Option<ComplexParameter> {
    match ty.unparen() {
        TypeExpr::Interface(_) => Some(ComplexParameter::Interface),
        TypeExpr::Pointer(..) => Some(ComplexParameter::Pointer),
        _ => None,
    }
}
