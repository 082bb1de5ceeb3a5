//! `mdtree markdown` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdtree_doc::Node;

use super::{read_input, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the markdown command.
#[derive(Args)]
pub(crate) struct MarkdownArgs {
    /// Document tree JSON file (default: stdin).
    input: Option<PathBuf>,

    /// Write markdown to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl MarkdownArgs {
    /// Execute the markdown command.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input, parsing the document JSON or writing
    /// output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let source = read_input(self.input.as_deref())?;
        let markdown = document_to_markdown(&source)?;
        write_output(&output, self.output.as_deref(), &markdown)
    }
}

fn document_to_markdown(json: &str) -> Result<String, CliError> {
    let document: Vec<Node> = serde_json::from_str(json)?;
    tracing::info!(blocks = document.len(), "Writing markdown");
    Ok(mdtree_convert::to_markdown(&document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_to_markdown() {
        let json = r#"[
            {"type": "head", "level": 2, "children": [{"text": "Notes"}]},
            {"type": "paragraph", "children": [{"text": "bold", "bold": true}, {"text": " text"}]}
        ]"#;
        assert_eq!(
            document_to_markdown(json).unwrap(),
            "## Notes\n\n**bold** text\n"
        );
    }

    #[test]
    fn test_write_output_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.md");

        write_output(&Output::new(), Some(&path), "# Hi\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Hi\n");
    }

    #[test]
    fn test_read_input_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("doc.json");
        std::fs::write(&path, "[]").unwrap();

        assert_eq!(read_input(Some(&path)).unwrap(), "[]");
    }
}
