use std::fs;
use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use expression_engine::lex::TokenKind;
use expression_engine::{FirstMatch, Lexer, MathContext, SyntaxError, Variables};
use miette::IntoDiagnostic;
use miette::WrapErr;

#[derive(Parser, Debug)]
#[command(version, about = "Tokenize, parse and evaluate arithmetic expressions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print every token of the expression
    Tokenize {
        #[command(flatten)]
        input: Input,
    },
    /// Print the fully parenthesised tree
    Parse {
        #[command(flatten)]
        input: Input,
    },
    /// Evaluate against the math library and the given variables
    Eval {
        #[command(flatten)]
        input: Input,
        /// Bind a variable, e.g. `--var x=2.5`
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
        vars: Vec<(String, f64)>,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Input {
    expression: Option<String>,
    /// Read the expression from a file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl Input {
    /// Returns the file name to show in diagnostics and the expression text.
    fn read(self) -> miette::Result<(Option<String>, String)> {
        match (self.expression, self.file) {
            (Some(expression), _) => Ok((None, expression)),
            (None, Some(filename)) => {
                let contents = fs::read_to_string(&filename)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;
                Ok((Some(filename.display().to_string()), contents))
            }
            (None, None) => Err(miette::miette!("no expression given")),
        }
    }
}

fn parse_binding(binding: &str) -> Result<(String, f64), String> {
    let (name, value) = binding
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{binding}`"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for `{name}`: {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> miette::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Tokenize { input } => {
            let (filename, source) = input.read()?;

            let mut failed = false;
            for token in Lexer::new(filename.as_deref(), &source) {
                if token.kind == TokenKind::Invalid {
                    let line = source[..token.offset].matches('\n').count() + 1;
                    eprintln!("[line {line}] Error: Unexpected character: {}", token.literal);
                    failed = true;
                    continue;
                }
                println!("{token}");
            }
            println!("EOF  null");

            if failed {
                std::process::exit(65);
            }
        }
        Commands::Parse { input } => {
            let (filename, source) = input.read()?;

            match expression_engine::Parser::new(filename.as_deref(), &source).parse() {
                Ok(tree) => println!("{tree}"),
                Err(e) => syntax_failure(e),
            }
        }
        Commands::Eval { input, vars } => {
            let (filename, source) = input.read()?;

            let tree = match expression_engine::Parser::new(filename.as_deref(), &source).parse()
            {
                Ok(tree) => tree,
                Err(e) => syntax_failure(e),
            };
            let context = FirstMatch::new()
                .with(vars.into_iter().collect::<Variables>())
                .with(MathContext);

            match tree.evaluate(&context) {
                Ok(value) => println!("{value}"),
                Err(e) => {
                    eprintln!("Error: cannot evaluate `{}`", e.name());
                    eprintln!("{:?}", miette::Report::new(e));
                    std::process::exit(70);
                }
            }
        }
    }
    Ok(())
}

fn syntax_failure(error: SyntaxError) -> ! {
    eprintln!("[line {}] Error: {error}", error.line());
    eprintln!("{:?}", miette::Report::new(error));
    std::process::exit(65);
}

/// Logs go to stderr, and only when `RUST_LOG` is set, e.g.
/// `RUST_LOG=expression_engine=trace`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}
