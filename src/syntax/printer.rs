//! Prints type syntax back as Go source, with gofmt spacing.
//!
//! Struct and interface literals are printed on a single line; they only
//! occur nested inside parameter types, where gofmt keeps them inline too.

use crate::syntax::{
    ChanDir, ElemKind, Field, FieldList, InterfaceElem, Results, Signature, StructField, TypeExpr,
    TypeTerm,
};

pub fn print_type(ty: &TypeExpr) -> String {
    let mut out = String::new();
    write_type(&mut out, ty);
    out
}

/// An interface element as it appears on its own line.
pub fn print_elem(elem: &InterfaceElem) -> String {
    let mut out = String::new();
    write_elem(&mut out, elem);
    out
}

fn write_type(out: &mut String, ty: &TypeExpr) {
    match ty {
        TypeExpr::Named {
            package,
            name,
            args,
            ..
        } => {
            if let Some(package) = package {
                out.push_str(package);
                out.push('.');
            }
            out.push_str(name);
            if !args.is_empty() {
                out.push('[');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_type(out, arg);
                }
                out.push(']');
            }
        }
        TypeExpr::Pointer(elem, _) => {
            out.push('*');
            write_type(out, elem);
        }
        TypeExpr::Slice(elem, _) => {
            out.push_str("[]");
            write_type(out, elem);
        }
        TypeExpr::Array { len, elem, .. } => {
            out.push('[');
            out.push_str(len);
            out.push(']');
            write_type(out, elem);
        }
        TypeExpr::Map { key, value, .. } => {
            out.push_str("map[");
            write_type(out, key);
            out.push(']');
            write_type(out, value);
        }
        TypeExpr::Chan { dir, elem, .. } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            write_type(out, elem);
        }
        TypeExpr::Func(signature, _) => {
            out.push_str("func");
            write_signature(out, signature);
        }
        TypeExpr::Interface(interface) => {
            out.push_str("interface{");
            write_inline(out, &interface.elems, write_elem);
            out.push('}');
        }
        TypeExpr::Struct(structure) => {
            out.push_str("struct{");
            write_inline(out, &structure.fields, write_struct_field);
            out.push('}');
        }
        TypeExpr::Paren(inner, _) => {
            out.push('(');
            write_type(out, inner);
            out.push(')');
        }
    }
}

/// `{ a; b }` body of a one-line literal; nothing for an empty one.
fn write_inline<T>(out: &mut String, items: &[T], write: fn(&mut String, &T)) {
    if items.is_empty() {
        return;
    }
    out.push(' ');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        write(out, item);
    }
    out.push(' ');
}

fn write_elem(out: &mut String, elem: &InterfaceElem) {
    match &elem.kind {
        ElemKind::Method { name, signature } => {
            out.push_str(&name.name);
            write_signature(out, signature);
        }
        ElemKind::Embedded(terms) => {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_term(out, term);
            }
        }
    }
}

fn write_term(out: &mut String, term: &TypeTerm) {
    if term.tilde {
        out.push('~');
    }
    write_type(out, &term.ty);
}

fn write_struct_field(out: &mut String, field: &StructField) {
    if !field.names.is_empty() {
        write_names(out, field.names.iter().map(|n| n.name.as_str()));
        out.push(' ');
    }
    write_type(out, &field.ty);
    if let Some(tag) = &field.tag {
        out.push(' ');
        out.push_str(tag);
    }
}

fn write_signature(out: &mut String, signature: &Signature) {
    write_fields(out, &signature.params);
    match &signature.results {
        None => {}
        Some(Results::Single(ty)) => {
            out.push(' ');
            write_type(out, ty);
        }
        // A single unnamed result drops its parentheses.
        Some(Results::List(list)) => match list.fields.as_slice() {
            [] => {}
            [only] if only.names.is_empty() => {
                out.push(' ');
                write_type(out, &only.ty);
            }
            _ => {
                out.push(' ');
                write_fields(out, list);
            }
        },
    }
}

fn write_fields(out: &mut String, list: &FieldList) {
    out.push('(');
    for (i, field) in list.fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_field(out, field);
    }
    out.push(')');
}

fn write_field(out: &mut String, field: &Field) {
    if !field.names.is_empty() {
        write_names(out, field.names.iter().map(|n| n.name.as_str()));
        out.push(' ');
    }
    if field.variadic {
        out.push_str("...");
    }
    write_type(out, &field.ty);
}

fn write_names<'a>(out: &mut String, names: impl Iterator<Item = &'a str>) {
    for (i, name) in names.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(name);
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::SourceContext;
    use crate::syntax::parser::{parse, parse_type_decl};
    use crate::syntax::TypeSpec;

    use super::*;

    fn spec_of(ty: &str) -> TypeSpec {
        let text = format!("package p\n\ntype X {}\n", ty);
        let source = SourceContext::from_file("p.go", text);
        let file = parse(&source).unwrap();
        parse_type_decl(&source, &file, &file.decls[0]).unwrap()
    }

    fn reprint(ty: &str) -> String {
        print_type(&spec_of(ty).ty)
    }

    #[test]
    fn prints_composite_types_with_gofmt_spacing() {
        assert_eq!(reprint("*pkg.T"), "*pkg.T");
        assert_eq!(reprint("[]  map[string] []int"), "[]map[string][]int");
        assert_eq!(reprint("[ 4 ]byte"), "[4]byte");
        assert_eq!(reprint("List[ int ,string ]"), "List[int, string]");
        assert_eq!(reprint("(int)"), "(int)");
    }

    #[test]
    fn prints_channel_directions() {
        assert_eq!(reprint("chan int"), "chan int");
        assert_eq!(reprint("chan<-  int"), "chan<- int");
        assert_eq!(reprint("<- chan int"), "<-chan int");
    }

    #[test]
    fn prints_function_types() {
        assert_eq!(reprint("func()"), "func()");
        assert_eq!(
            reprint("func(a,b int, rest ...string) (int, error)"),
            "func(a, b int, rest ...string) (int, error)"
        );
        assert_eq!(reprint("func(int) (error)"), "func(int) error");
        assert_eq!(reprint("func() (n int)"), "func() (n int)");
    }

    #[test]
    fn prints_literals_on_one_line() {
        assert_eq!(reprint("struct{}"), "struct{}");
        assert_eq!(
            reprint("struct {\n\ta, b int `json:\"a\"`\n\tio.Reader\n}"),
            "struct{ a, b int `json:\"a\"`; io.Reader }"
        );
        assert_eq!(reprint("interface {}"), "interface{}");
        assert_eq!(
            reprint("interface {\n\tM(x int) bool\n\t~int | string\n}"),
            "interface{ M(x int) bool; ~int | string }"
        );
    }

    #[test]
    fn prints_method_elements() {
        let spec = spec_of("interface {\n\tRect(w, h float64)\n}");
        let TypeExpr::Interface(interface) = spec.ty else {
            panic!("expected interface");
        };
        assert_eq!(print_elem(&interface.elems[0]), "Rect(w, h float64)");
    }
}
