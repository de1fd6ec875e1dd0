// tests/parser_tests.rs

mod common;

use common::{extract, source};
use govariant::syntax::parser::{parse, parse_type_decl};
use govariant::syntax::{Annotation, DeclKeyword, ElemKind, TypeExpr};

const REALISTIC: &str = r#"// Package geometry has shapes.
package geometry

import (
	"fmt"
	"strings"
)

const banner = "// @variant NotAComment {"

var tmpl = `
// @variant AlsoNotAComment
type _ interface {
`

// Describe prints a shape.
func Describe(s Shape) string {
	if strings.Contains(banner, "{") {
		return fmt.Sprint(s)
	}
	return "}"
}

// Shapes in the plane.
//
// @import "fmt"
// @variant Shape
type _ interface {
	fmt.Stringer
	Name() string // @method
	// Square has equal sides.
	Square(side float64)
	Polygon(points [][2]float64, closed bool)
	Lookup(m map[string]chan<- int)
	Callback(f func(int) (string, error))
}
"#;

#[test]
fn skeleton_of_a_realistic_file() {
    let file = parse(&source(REALISTIC)).unwrap();
    assert_eq!(file.package.name, "geometry");

    let keywords: Vec<DeclKeyword> = file.decls.iter().map(|d| d.keyword).collect();
    assert_eq!(
        keywords,
        vec![
            DeclKeyword::Import,
            DeclKeyword::Const,
            DeclKeyword::Var,
            DeclKeyword::Func,
            DeclKeyword::Type,
        ]
    );

    // Strings that look like comments are not comments.
    assert!(file
        .comments
        .iter()
        .all(|c| !c.text.contains("NotAComment")));

    let doc = file.decls[4].doc.as_ref().unwrap();
    assert_eq!(doc.list.len(), 4);
    assert_eq!(
        doc.last().unwrap().annotation,
        Some(Annotation::Variant {
            name: Some("Shape".into())
        })
    );
}

#[test]
fn candidate_type_is_parsed_in_detail() {
    let source = source(REALISTIC);
    let file = parse(&source).unwrap();
    let spec = parse_type_decl(&source, &file, &file.decls[4]).unwrap();

    let TypeExpr::Interface(interface) = &spec.ty else {
        panic!("expected an interface, got {:?}", spec.ty);
    };
    let printed: Vec<String> = interface.elems.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        printed,
        vec![
            "fmt.Stringer",
            "Name() string",
            "Square(side float64)",
            "Polygon(points [][2]float64, closed bool)",
            "Lookup(m map[string]chan<- int)",
            "Callback(f func(int) (string, error))",
        ]
    );

    assert!(matches!(interface.elems[0].kind, ElemKind::Embedded(_)));
    assert!(interface.elems[0].comment.is_none());
    assert_eq!(
        interface.elems[1].comment.as_ref().unwrap().annotation,
        Some(Annotation::Method)
    );
    assert_eq!(
        interface.elems[2].doc.as_ref().unwrap().list[0].text,
        "// Square has equal sides."
    );
}

#[test]
fn realistic_file_yields_one_variant() {
    let specs = extract(REALISTIC);
    assert_eq!(specs.len(), 1);
    let shape = &specs[0];
    assert_eq!(shape.name, "Shape");
    assert_eq!(shape.package, "geometry");
    assert_eq!(shape.imports, vec!["\"fmt\"".to_string()]);

    let names: Vec<&str> = shape.constructors.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Square", "Polygon", "Lookup", "Callback"]);

    let methods: Vec<String> = shape.residual_methods.iter().map(|m| m.to_string()).collect();
    assert_eq!(
        methods,
        vec![
            "fmt.Stringer",
            "Name() string",
            "Visit(ShapeVisitor)",
            "isShape()"
        ]
    );
    // Comments do not survive into the model.
    assert!(shape.residual_methods.iter().all(|m| m.comment.is_none()));
}

#[test]
fn block_comment_annotations_are_recognized() {
    let text = "package p\n\n/* @variant Block */\ntype _ interface {\n\tA()\n}\n";
    assert_eq!(extract(text)[0].name, "Block");
}

#[test]
fn doc_separated_by_blank_line_is_not_attached() {
    let text = "package p\n\n// @variant Detached\n\ntype _ interface {\n\tA()\n}\n";
    assert!(extract(text).is_empty());
}

#[test]
fn function_declarations_are_never_candidates() {
    let text = "package p\n\n// @variant F\nfunc f() {}\n";
    assert!(extract(text).is_empty());
}

#[test]
fn alias_declarations_are_accepted() {
    let text = "package p\n\n// @variant Aliased\ntype _ = interface {\n\tA(x int)\n}\n";
    let specs = extract(text);
    assert_eq!(specs[0].name, "Aliased");
    assert_eq!(specs[0].constructors[0].name, "A");
}
