//! The variant model handed to the renderer.

use serde::Serialize;

use crate::syntax::{Field, InterfaceElem, TypeExpr};
use crate::validation::{Member, ValidatedVariant};

/// Which optional parts of the generated code to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateOptions {
    /// `var _ Shape = struct{ Square }{}` assertions.
    pub conformance_check: bool,
    /// `Unpack` accessors.
    pub accessor: bool,
    /// The visitor struct and `Visit` methods.
    pub visitor: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            conformance_check: true,
            accessor: true,
            visitor: true,
        }
    }
}

/// One variant: everything needed to generate its file.
#[derive(Debug, Clone, Serialize)]
pub struct VariantSpec {
    pub name: String,
    pub package: String,
    /// Quoted import paths, sorted and without repeats.
    pub imports: Vec<String>,
    pub constructors: Vec<Constructor>,
    /// Methods of the generated interface, synthesized ones included.
    pub residual_methods: Vec<InterfaceElem>,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constructor {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Absent only for the sole parameter of a newtype constructor.
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

/// How a constructor is represented as a Go type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstructorShape<'a> {
    /// `struct{}`
    Unit,
    /// A defined type over the parameter's type.
    Newtype(&'a TypeExpr),
    /// A struct with one field per parameter.
    Record(&'a [Parameter]),
}

impl VariantSpec {
    /// Builds the model from a validated declaration. Constructors keep their
    /// declaration order; regular methods lose their comments and are
    /// followed by the synthesized `Visit` and tag methods.
    pub fn build(package: &str, variant: ValidatedVariant, options: GenerateOptions) -> Self {
        let mut constructors = Vec::new();
        let mut residual_methods = Vec::new();

        for member in variant.members {
            match member {
                Member::Constructor { name, params } => constructors.push(Constructor {
                    name: name.name,
                    parameters: parameters_from(params.fields),
                }),
                Member::Method(elem) => residual_methods.push(elem.without_comments()),
            }
        }

        if options.visitor {
            residual_methods.push(InterfaceElem::method(
                "Visit",
                vec![Field::unnamed(TypeExpr::named(visitor_name(&variant.name)))],
            ));
        }
        residual_methods.push(InterfaceElem::method(&tag_method(&variant.name), vec![]));

        Self {
            name: variant.name,
            package: package.to_string(),
            imports: canonical_imports(variant.imports),
            constructors,
            residual_methods,
            options,
        }
    }

    pub fn visitor_name(&self) -> String {
        visitor_name(&self.name)
    }

    pub fn tag_method(&self) -> String {
        tag_method(&self.name)
    }

    /// `shape_variant.go` for `Shape`.
    pub fn file_name(&self) -> String {
        format!("{}_variant.go", self.name.to_lowercase())
    }
}

impl Constructor {
    pub fn shape(&self) -> ConstructorShape<'_> {
        match self.parameters.as_slice() {
            [] => ConstructorShape::Unit,
            [Parameter { name: None, ty }] => ConstructorShape::Newtype(ty),
            parameters => ConstructorShape::Record(parameters),
        }
    }

    /// The visitor field that handles this constructor.
    pub fn visitor_field(&self) -> String {
        title(&self.name)
    }

    /// Types of the values `Unpack` returns, in parameter order.
    pub fn unpack_types(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.ty.to_string()).collect()
    }

    /// Expressions reading the stored values from receiver `rcv`.
    pub fn unpack_values(&self) -> Vec<String> {
        match self.shape() {
            ConstructorShape::Unit => vec![],
            ConstructorShape::Newtype(ty) => vec![format!("({})(rcv)", ty)],
            ConstructorShape::Record(parameters) => parameters
                .iter()
                .filter_map(|p| p.name.as_ref())
                .map(|name| format!("rcv.{}", name))
                .collect(),
        }
    }
}

/// Only the first parameter survives when one is unnamed; validation allows
/// that only for a sole parameter.
fn parameters_from(fields: Vec<Field>) -> Vec<Parameter> {
    if let Some(unnamed) = fields.iter().find(|f| f.names.is_empty()) {
        return vec![Parameter {
            name: None,
            ty: unnamed.ty.clone(),
        }];
    }
    fields
        .into_iter()
        .filter_map(|field| {
            let name = field.names.into_iter().next()?;
            Some(Parameter {
                name: Some(name.name),
                ty: field.ty,
            })
        })
        .collect()
}

/// Sorted by path with repeated paths dropped, the way gofmt leaves an
/// import block.
fn canonical_imports(mut imports: Vec<String>) -> Vec<String> {
    imports.sort_by(|a, b| import_path(a).cmp(import_path(b)));
    imports.dedup_by(|a, b| import_path(a) == import_path(b));
    imports
}

/// The path inside a quoted or raw string literal.
fn import_path(literal: &str) -> &str {
    literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or(literal)
}

fn visitor_name(variant: &str) -> String {
    format!("{}Visitor", variant)
}

fn tag_method(variant: &str) -> String {
    format!("is{}", title(variant))
}

/// Upper-cases the first letter, leaving the rest alone.
pub fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{FieldList, Ident, Span};

    fn param(name: Option<&str>, ty: &str) -> Field {
        Field {
            names: name.map(|n| vec![Ident::synthetic(n)]).unwrap_or_default(),
            variadic: false,
            ty: TypeExpr::named(ty),
            span: Span::default(),
        }
    }

    fn constructor(name: &str, params: Vec<Field>) -> Member {
        Member::Constructor {
            name: Ident::synthetic(name),
            params: FieldList::new(params),
        }
    }

    fn shape_variant() -> ValidatedVariant {
        ValidatedVariant {
            name: "shape".into(),
            imports: vec![],
            members: vec![
                constructor("square", vec![param(None, "float64")]),
                Member::Method(InterfaceElem::method("String", vec![])),
                constructor("Rect", vec![param(Some("w"), "int"), param(Some("h"), "int")]),
                constructor("Empty", vec![]),
            ],
        }
    }

    #[test]
    fn keeps_declaration_order_and_appends_synthesized_methods() {
        let spec = VariantSpec::build("main", shape_variant(), GenerateOptions::default());
        let names: Vec<&str> = spec.constructors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["square", "Rect", "Empty"]);

        let methods: Vec<String> = spec.residual_methods.iter().map(|m| m.to_string()).collect();
        assert_eq!(methods, vec!["String()", "Visit(shapeVisitor)", "isShape()"]);
        assert_eq!(spec.file_name(), "shape_variant.go");
    }

    #[test]
    fn visit_method_depends_on_option() {
        let options = GenerateOptions {
            visitor: false,
            ..GenerateOptions::default()
        };
        let spec = VariantSpec::build("main", shape_variant(), options);
        let methods: Vec<String> = spec.residual_methods.iter().map(|m| m.to_string()).collect();
        assert_eq!(methods, vec!["String()", "isShape()"]);
    }

    #[test]
    fn imports_are_sorted_and_deduplicated() {
        let mut variant = shape_variant();
        variant.imports = vec![
            "\"strings\"".into(),
            "\"fmt\"".into(),
            "`strings`".into(),
            "\"fmt\"".into(),
            "\"encoding/json\"".into(),
        ];
        let spec = VariantSpec::build("main", variant, GenerateOptions::default());
        assert_eq!(
            spec.imports,
            vec!["\"encoding/json\"", "\"fmt\"", "\"strings\""]
        );
    }

    #[test]
    fn derives_constructor_shapes() {
        let spec = VariantSpec::build("main", shape_variant(), GenerateOptions::default());
        let [square, rect, empty] = spec.constructors.as_slice() else {
            panic!("expected three constructors");
        };

        assert_eq!(square.shape(), ConstructorShape::Newtype(&TypeExpr::named("float64")));
        assert_eq!(square.unpack_values(), vec!["(float64)(rcv)"]);
        assert_eq!(square.visitor_field(), "Square");

        assert!(matches!(rect.shape(), ConstructorShape::Record(p) if p.len() == 2));
        assert_eq!(rect.unpack_types(), vec!["int", "int"]);
        assert_eq!(rect.unpack_values(), vec!["rcv.w", "rcv.h"]);

        assert_eq!(empty.shape(), ConstructorShape::Unit);
        assert!(empty.unpack_values().is_empty());
    }
}
