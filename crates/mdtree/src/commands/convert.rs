//! `mdtree convert` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdtree_ast::ParseOptions;
use mdtree_config::{CliSettings, Config};
use mdtree_convert::{ConvertOptions, Converter};

use super::{read_input, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert (default: stdin).
    input: Option<PathBuf>,

    /// Write the document tree to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read mdast JSON instead of markdown text.
    #[arg(long)]
    ast: bool,

    /// Pretty-print JSON output (overrides config).
    #[arg(long)]
    pretty: bool,

    /// Keep blank-line runs out of the tree (overrides config).
    #[arg(long)]
    no_blank_lines: bool,

    /// Path to configuration file (default: auto-discover mdtree.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading input, parsing mdast JSON or
    /// writing output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Using configuration");
        }

        let source = read_input(self.input.as_deref())?;
        let json = convert_source(&config, &source, self.ast)?;
        write_output(&output, self.output.as_deref(), &json)
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            pretty: self.pretty.then_some(true),
            blank_lines: self.no_blank_lines.then_some(false),
        }
    }
}

/// Convert markdown (or mdast JSON when `ast` is set) to document tree JSON.
fn convert_source(config: &Config, source: &str, ast: bool) -> Result<String, CliError> {
    let root = if ast {
        serde_json::from_str(source)?
    } else {
        mdtree_ast::parse(source, &parse_options(config))
    };

    let document = Converter::new(convert_options(config)).convert_document(&root);
    tracing::info!(blocks = document.len(), "Converted document");

    let mut json = if config.output.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    json.push('\n');
    Ok(json)
}

fn parse_options(config: &Config) -> ParseOptions {
    let parser = &config.parser;
    ParseOptions {
        gfm: parser.gfm,
        footnotes: parser.footnotes,
        math: parser.math,
        wikilinks: parser.wikilinks,
        frontmatter: parser.frontmatter,
        tasklists: parser.tasklists,
    }
}

fn convert_options(config: &Config) -> ConvertOptions {
    ConvertOptions {
        reconstruct_blank_lines: config.convert.blank_lines,
        decode_urls: config.convert.decode_urls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(pretty: bool, no_blank_lines: bool) -> ConvertArgs {
        ConvertArgs {
            input: None,
            output: None,
            ast: false,
            pretty,
            no_blank_lines,
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_settings_only_set_given_flags() {
        let settings = args(false, false).cli_settings();
        assert_eq!(settings.pretty, None);
        assert_eq!(settings.blank_lines, None);

        let settings = args(true, true).cli_settings();
        assert_eq!(settings.pretty, Some(true));
        assert_eq!(settings.blank_lines, Some(false));
    }

    #[test]
    fn test_options_follow_config() {
        let mut config = Config::default();
        config.parser.math = false;
        config.convert.decode_urls = false;

        let parse = parse_options(&config);
        assert!(!parse.math);
        assert!(parse.gfm);

        let convert = convert_options(&config);
        assert!(convert.reconstruct_blank_lines);
        assert!(!convert.decode_urls);
    }

    #[test]
    fn test_convert_markdown_to_json() {
        let json = convert_source(&Config::default(), "# Title\n", false).unwrap();
        assert_eq!(
            json,
            "[{\"type\":\"head\",\"level\":1,\"children\":[{\"text\":\"Title\"}]}]\n"
        );
    }

    #[test]
    fn test_convert_mdast_json() {
        let mdast = r#"{"type":"root","children":[{"type":"thematicBreak"}]}"#;
        let json = convert_source(&Config::default(), mdast, true).unwrap();
        assert_eq!(json, "[{\"type\":\"hr\",\"children\":[{\"text\":\"\"}]}]\n");
    }

    #[test]
    fn test_convert_invalid_mdast_json() {
        let err = convert_source(&Config::default(), "{not json", true).unwrap_err();
        assert!(matches!(err, CliError::Json(_)), "got {err:?}");
    }
}
