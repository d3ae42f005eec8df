//! The `treant` command-line interface.
//!
//! The binary is the external-collaborator boundary around the pure
//! generation core: it reads the two structural documents from disk, runs
//! validation and generation, and persists the returned artifacts. Nothing
//! here makes decisions the library does not expose.

use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use treant::naming::{ConcatMode, NamespaceConfig};
use treant::{generate, parse_grammar, validate, GenerateRequest};

/// Generate a typed SDK from a Tree-sitter grammar.
#[derive(Debug, Parser)]
#[command(name = "treant", version, about)]
struct Cli {
    /// Path to the grammar rule tree (`grammar.json`).
    #[arg(long)]
    grammar: PathBuf,

    /// Path to the node-type catalogue (`node-types.json`).
    #[arg(long = "node-types")]
    node_types: PathBuf,

    /// Output directory for the generated SDK.
    #[arg(long, default_value = "sdk")]
    out: PathBuf,

    /// Namespace prefix (defaults to the tool identifier).
    #[arg(long, conflicts_with = "no_prefix")]
    prefix: Option<String>,

    /// Suppress the namespace prefix entirely.
    #[arg(long)]
    no_prefix: bool,

    /// Override the grammar-derived namespace base name.
    #[arg(long)]
    name: Option<String>,

    /// How the namespace prefix and base name are joined.
    #[arg(long, value_enum, default_value_t = ConcatArg::Pascal)]
    concat: ConcatArg,

    /// Validate the grammar and stop without generating.
    #[arg(long)]
    check: bool,
}

/// Command-line spelling of [`ConcatMode`].
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConcatArg {
    /// Direct Pascal concatenation.
    Pascal,
    /// Lower kebab-case.
    Kebab,
    /// Lower snake_case.
    Snake,
}

impl From<ConcatArg> for ConcatMode {
    fn from(arg: ConcatArg) -> Self {
        match arg {
            ConcatArg::Pascal => ConcatMode::Pascal,
            ConcatArg::Kebab => ConcatMode::Kebab,
            ConcatArg::Snake => ConcatMode::Snake,
        }
    }
}

impl Cli {
    fn namespace(&self) -> NamespaceConfig {
        let prefix = if self.no_prefix {
            Some(None)
        } else {
            self.prefix.clone().map(Some)
        };
        NamespaceConfig {
            prefix,
            name: self.name.clone(),
            concat_mode: self.concat.into(),
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let grammar_json = fs::read_to_string(&cli.grammar)
        .map_err(|e| format!("reading {}: {e}", cli.grammar.display()))?;
    let node_types_json = fs::read_to_string(&cli.node_types)
        .map_err(|e| format!("reading {}: {e}", cli.node_types.display()))?;

    let grammar = parse_grammar(&grammar_json)?;
    grammar.classify_all()?;
    for warning in validate(&grammar)? {
        eprintln!("warning: {}", warning.message);
    }
    if cli.check {
        return Ok(());
    }

    let request = GenerateRequest {
        grammar_json: &grammar_json,
        node_types_json: &node_types_json,
        namespace: cli.namespace(),
    };
    let artifacts = generate(&request)?;

    for artifact in &artifacts {
        let path = cli.out.join(Path::new(&artifact.path));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("creating {}: {e}", parent.display()))?;
        }
        fs::write(&path, &artifact.content)
            .map_err(|e| format!("writing {}: {e}", path.display()))?;
    }
    eprintln!(
        "wrote {} artifacts to {}",
        artifacts.len(),
        cli.out.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
