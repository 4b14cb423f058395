use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use emoji_script::dsl::{self, lexer, vocab, ParseOutcome};
use emoji_script::error::AppError;
use emoji_script::settings::{self, CompileSettings, PrintSink};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "emojiscript-cli", about = "Compile emoji script to JavaScript", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print sink override
    #[arg(long, global = true, value_enum)]
    sink: Option<PrintSink>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file (or stdin) to JavaScript
    Compile {
        /// Source file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Parse and print the syntax tree
    Parse {
        file: Option<PathBuf>,
        /// Print the parse outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the token stream with positions
    Tokens { file: Option<PathBuf> },
    /// List the pictogram vocabulary
    Vocab,
    /// Print the JSON schema of the settings file
    ConfigSchema,
}

// ── Main ─────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Commands::Compile { file } => {
            let source = read_source(file.as_ref())?;
            let settings = load_settings(cli)?;
            match dsl::compile_source(&source, &settings) {
                Ok(js) => {
                    println!("{js}");
                    Ok(())
                }
                Err(e) => Err(AppError::Compile {
                    message: e.format_with_source(&source),
                }),
            }
        }
        Commands::Parse { file, json } => {
            let source = read_source(file.as_ref())?;
            let outcome = ParseOutcome::from(dsl::parse(&source));
            if *json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }
            match outcome.error {
                Some(e) => Err(AppError::Compile {
                    message: e.format_with_source(&source),
                }),
                None => {
                    print!("{}", outcome.program.render_tree());
                    Ok(())
                }
            }
        }
        Commands::Tokens { file } => {
            let source = read_source(file.as_ref())?;
            for tok in lexer::tokenize(&source) {
                println!("{:>4}:{:<4} {}", tok.position.line, tok.position.column, tok.token);
            }
            Ok(())
        }
        Commands::Vocab => {
            for entry in vocab::VOCABULARY {
                println!("{}\t{}", entry.symbol, entry.name);
            }
            Ok(())
        }
        Commands::ConfigSchema => {
            println!("{}", settings::settings_schema()?);
            Ok(())
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn read_source(file: Option<&PathBuf>) -> Result<String, AppError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// File settings first, then the `--sink` flag on top.
fn load_settings(cli: &Cli) -> Result<CompileSettings, AppError> {
    let mut settings = match &cli.config {
        Some(path) => settings::read_settings(path)?,
        None => CompileSettings::default(),
    };
    if let Some(sink) = cli.sink {
        settings.print_sink = sink;
    }
    Ok(settings)
}
