//! File-level orchestration: parse, scan, validate, build and render every
//! variant of a Go file, then write the generated files next to it.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::errors::{ErrorKind, SourceContext, ValidationContext, VariantError};
use crate::model::{GenerateOptions, VariantSpec};
use crate::render::{render, RenderContext};
use crate::scanner::scan;
use crate::syntax::parser;
use crate::validation::Validator;

const GO_EXTENSION: &str = "go";
const TEST_SUFFIX: &str = "_test.go";
const OUTPUT_SUFFIX: &str = "_variant.go";

/// One generated file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub variant_name: String,
    pub file_name: String,
    pub contents: String,
}

/// The generation pipeline with the settings of one run.
#[derive(Default)]
pub struct GenerationPipeline {
    pub options: GenerateOptions,
    pub render: RenderContext,
}

impl GenerationPipeline {
    pub fn new(options: GenerateOptions, render: RenderContext) -> Self {
        Self { options, render }
    }

    // ============================================================================
    // SOURCE-LEVEL SERVICES - No file system access
    // ============================================================================

    /// Extracts the variants of a source file, in declaration order. Each
    /// candidate is validated before the next one is scanned.
    pub fn extract(&self, source: &SourceContext) -> Result<Vec<VariantSpec>, VariantError> {
        let file = parser::parse(source)?;
        let ctx = ValidationContext::new(source, "validate");
        let mut validator = Validator::new(source, &file, &ctx);

        let mut specs = Vec::new();
        for candidate in scan(&file, &ctx) {
            let variant = validator.validate(&candidate?)?;
            debug!(variant = %variant.name, "validated");
            specs.push(VariantSpec::build(&file.package.name, variant, self.options));
        }
        Ok(specs)
    }

    /// Renders every variant of a source file. Nothing is returned unless all
    /// of them render.
    pub fn generate(&self, source: &SourceContext) -> Result<Vec<GeneratedUnit>, VariantError> {
        self.extract(source)?
            .iter()
            .map(|spec| {
                Ok(GeneratedUnit {
                    variant_name: spec.name.clone(),
                    file_name: spec.file_name(),
                    contents: render(spec, &self.render)?,
                })
            })
            .collect()
    }

    // ============================================================================
    // FILE SERVICES
    // ============================================================================

    /// Generates the variants of the file at `path` and writes them into the
    /// same directory. Returns the written paths.
    pub fn process_file(&self, path: &Path) -> Result<Vec<PathBuf>, VariantError> {
        let source = SourceContext::read(path)?;
        let units = self.generate(&source)?;
        if units.is_empty() {
            debug!(file = %path.display(), "no variants");
        }

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut written = Vec::with_capacity(units.len());
        for unit in units {
            let output = dir.join(&unit.file_name);
            std::fs::write(&output, &unit.contents).map_err(|e| VariantError::io(&output, &e))?;
            info!(variant = %unit.variant_name, file = %output.display(), "wrote");
            written.push(output);
        }
        Ok(written)
    }

    /// The Go files to process for `root`: the file itself, or the `.go`
    /// files of a directory that are neither tests nor generated variants.
    /// Sub-directories are only entered when `recursive` is set.
    pub fn discover_go_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, VariantError> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut walker = WalkDir::new(root);
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(root, &e))?;
            if entry.file_type().is_file() && Self::is_input_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    fn is_input_file(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        path.extension().is_some_and(|ext| ext == GO_EXTENSION)
            && !name.ends_with(TEST_SUFFIX)
            && !name.ends_with(OUTPUT_SUFFIX)
    }
}

fn walk_error(root: &Path, error: &walkdir::Error) -> VariantError {
    let path = error.path().unwrap_or(root);
    VariantError::unspanned(
        ErrorKind::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        },
        "io",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_plain_go_files() {
        assert!(GenerationPipeline::is_input_file(Path::new("a/shape.go")));
        assert!(!GenerationPipeline::is_input_file(Path::new("a/shape_test.go")));
        assert!(!GenerationPipeline::is_input_file(Path::new("a/shape_variant.go")));
        assert!(!GenerationPipeline::is_input_file(Path::new("a/notes.txt")));
    }

    #[test]
    fn generates_one_unit_per_variant_in_order() {
        let source = SourceContext::from_file(
            "two.go",
            "package two\n\n// @variant B\ntype _ interface {\n\tX()\n}\n\n// @variant A\ntype _ interface {\n\tY()\n}\n",
        );
        let units = GenerationPipeline::default().generate(&source).unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.file_name.as_str()).collect();
        assert_eq!(names, vec!["b_variant.go", "a_variant.go"]);
    }

    #[test]
    fn any_error_discards_the_whole_file() {
        let source = SourceContext::from_file(
            "two.go",
            "package two\n\n// @variant A\ntype _ interface {\n\tX()\n}\n\n// @variant A\ntype _ interface {\n\tY()\n}\n",
        );
        let err = GenerationPipeline::default().generate(&source).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateVariantName { name: "A".into() });
    }
}
