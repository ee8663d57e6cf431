//! CLI tool to dump the token stream of linker scripts.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ldscript_lexer::{Lexer, LexerOptions, SourceBuffer, TokenKind, TracingSink};
use tracing_subscriber::EnvFilter;

/// Print the tokens of one or more linker scripts.
#[derive(Parser, Debug)]
#[command(name = "ldlex", version, about, long_about = None)]
struct Cli {
    /// Lex every file in expression mode
    #[arg(long)]
    expr: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only report diagnostics, do not print tokens
    #[arg(short, long)]
    quiet: bool,

    /// Script files to lex
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = LexerOptions::default().in_expression(cli.expr);
    let mut had_error = false;

    for path in &cli.files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                had_error = true;
                continue;
            }
        };

        let source = SourceBuffer::new(path.display().to_string(), content);
        let mut lexer = Lexer::with_options(&source, TracingSink, options);
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            if !cli.quiet {
                println!("{}\t{:?}\t{}", token.span, token.kind, token.text);
            }
        }

        let errors = lexer.error_count();
        if errors > 0 {
            eprintln!("{}: {errors} error(s)", source.name());
            had_error = true;
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
