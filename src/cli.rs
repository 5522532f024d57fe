use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tokenforge")]
#[command(about = "Fill named {{placeholders}} in a template", long_about = None)]
pub(crate) struct Cli {
    /// Log level (overrides TOKENFORGE_LOG)
    #[arg(long, global = true)]
    pub(crate) log_level: Option<String>,

    /// Directory for log files (overrides TOKENFORGE_LOG_DIR)
    #[arg(long, global = true)]
    pub(crate) log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

impl Cli {
    /// Rejects argument combinations clap cannot express declaratively.
    /// Standard input can only feed one of the template and the token list.
    pub(crate) fn validate(&self) -> Result<(), clap::Error> {
        let (template, tokens) = match &self.command {
            Some(Commands::Edit(args)) => (args.template.as_deref(), args.tokens.as_deref()),
            Some(Commands::Render(args)) => (args.template.as_deref(), args.tokens.as_deref()),
            _ => return Ok(()),
        };
        if is_stdin(template) && is_stdin(tokens) {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "--template and --tokens cannot both read from standard input (`-`)",
            ));
        }
        Ok(())
    }
}

fn is_stdin(path: Option<&Path>) -> bool {
    path == Some(Path::new("-"))
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Edit tokens and template interactively
    Edit(EditArgs),
    /// Render a template with a JSON token list
    Render(RenderArgs),
    /// Print the slug of each token name
    Slug {
        /// Token names
        names: Vec<String>,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct EditArgs {
    /// Template file to start from
    #[arg(long)]
    pub(crate) template: Option<PathBuf>,

    /// JSON token list to start from
    #[arg(long)]
    pub(crate) tokens: Option<PathBuf>,

    /// Print the rendered output on exit
    #[arg(long)]
    pub(crate) print: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Template file, `-` for stdin
    #[arg(long)]
    pub(crate) template: Option<PathBuf>,

    /// JSON token list file, `-` for stdin
    #[arg(long, conflicts_with = "tokens_json")]
    pub(crate) tokens: Option<PathBuf>,

    /// JSON token list given inline
    #[arg(long)]
    pub(crate) tokens_json: Option<String>,

    /// Print only the rendered output
    #[arg(long)]
    pub(crate) raw: bool,
}
