//! Shared helpers for the integration tests.

#![allow(dead_code)]

use govariant::{ErrorKind, GeneratedUnit, GenerationPipeline, SourceContext, VariantSpec};

/// A Go file declaring variant `V` with the given interface body lines.
pub fn variant_file(body: &str) -> String {
    format!("package main\n\n// @variant V\ntype _ interface {{\n{}\n}}\n", body)
}

pub fn source(text: &str) -> SourceContext {
    SourceContext::from_file("input.go", text)
}

pub fn extract(text: &str) -> Vec<VariantSpec> {
    GenerationPipeline::default()
        .extract(&source(text))
        .unwrap_or_else(|e| panic!("extraction failed: {}", e))
}

pub fn generate(text: &str) -> Vec<GeneratedUnit> {
    GenerationPipeline::default()
        .generate(&source(text))
        .unwrap_or_else(|e| panic!("generation failed: {}", e))
}

/// The error kind and `line:column` of a failing extraction.
pub fn extract_error(text: &str) -> (ErrorKind, String) {
    let err = match GenerationPipeline::default().extract(&source(text)) {
        Ok(specs) => panic!("expected an error, got {} variants", specs.len()),
        Err(e) => e,
    };
    let position = err
        .position()
        .map(|p| format!("{}:{}", p.line, p.column))
        .unwrap_or_default();
    (err.kind, position)
}
