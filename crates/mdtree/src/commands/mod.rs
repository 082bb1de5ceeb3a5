//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod markdown;

pub(crate) use convert::ConvertArgs;
pub(crate) use markdown::MarkdownArgs;

use std::io::Read;
use std::path::Path;

use crate::error::CliError;
use crate::output::Output;

/// Read the whole input file, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    if let Some(path) = path {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

/// Write a result to `path`, or to stdout when no path is given.
fn write_output(output: &Output, path: Option<&Path>, content: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            output.success(&format!("Wrote {}", path.display()));
        }
        None => output.document(content)?,
    }
    Ok(())
}
