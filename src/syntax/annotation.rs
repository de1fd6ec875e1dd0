//! Typed annotations carried by Go comments.
//!
//! A comment line is split on whitespace exactly once, when the comment is
//! parsed. The first token is the comment delimiter (`//` or `/*`); the second
//! token selects the annotation and the third, if any, is its argument.

pub const VARIANT_MARKER: &str = "@variant";
pub const IMPORT_MARKER: &str = "@import";
pub const METHOD_MARKER: &str = "@method";

/// A govariant annotation found in a comment.
///
/// Arguments are kept raw; the scanner decides whether they are well formed
/// so that the error can point at the comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// `// @variant Name`
    Variant { name: Option<String> },
    /// `// @import "path"`
    Import { path: Option<String> },
    /// `// @method`
    Method,
}

impl Annotation {
    /// Classifies the full text of a comment, delimiters included.
    pub fn classify(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace().skip(1);
        let marker = tokens.next()?;
        let argument = tokens.next().map(str::to_string);
        match marker {
            VARIANT_MARKER => Some(Annotation::Variant { name: argument }),
            IMPORT_MARKER => Some(Annotation::Import { path: argument }),
            METHOD_MARKER => Some(Annotation::Method),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_variant_marker() {
        assert_eq!(
            Annotation::classify("// @variant Shape"),
            Some(Annotation::Variant {
                name: Some("Shape".into())
            })
        );
        assert_eq!(
            Annotation::classify("/* @variant Shape */"),
            Some(Annotation::Variant {
                name: Some("Shape".into())
            })
        );
        assert_eq!(
            Annotation::classify("// @variant"),
            Some(Annotation::Variant { name: None })
        );
    }

    #[test]
    fn marker_must_be_second_token() {
        assert_eq!(Annotation::classify("//@variant Shape"), None);
        assert_eq!(Annotation::classify("// see @variant Shape"), None);
        assert_eq!(Annotation::classify("//"), None);
    }

    #[test]
    fn classifies_import_and_method() {
        assert_eq!(
            Annotation::classify(r#"// @import "fmt""#),
            Some(Annotation::Import {
                path: Some(r#""fmt""#.into())
            })
        );
        assert_eq!(
            Annotation::classify("// @import"),
            Some(Annotation::Import { path: None })
        );
        assert_eq!(
            Annotation::classify("// @method"),
            Some(Annotation::Method)
        );
    }
}
