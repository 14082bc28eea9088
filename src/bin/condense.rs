//! Condense CLI - Generate condensed code maps for LLM context.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use condense::builder::Condense;
use condense::config::{default_config_path, load_config, Config};
use condense::errors::{exit_code, CondenseError};
use condense::filter::Language;
use condense::tokens::Encoding;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "condense")]
#[command(about = "Generate condensed code maps for LLM context")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the code map of a directory or file
    Map(MapArgs),

    /// Show supported languages
    Languages,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct MapArgs {
    /// Root directory or file to condense
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Write the code map to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Truncate string literals longer than this many characters
    #[arg(long)]
    max_literal_len: Option<usize>,

    /// Skip the language formatter pass
    #[arg(long)]
    no_format: bool,

    /// Glob of paths to leave out (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Only include files of these language(s)
    #[arg(long, value_delimiter = ',')]
    lang: Vec<LanguageArg>,

    /// Config file (default: condense.toml in the root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip files that fail instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Print token and line savings to stderr
    #[arg(long)]
    stats: bool,

    /// Token encoding used by --stats
    #[arg(long, default_value = "cl100k")]
    encoding: EncodingArg,
}

#[derive(Clone, ValueEnum)]
enum LanguageArg {
    Go,
    Java,
    Python,
    Javascript,
    Typescript,
    Tsx,
    Rust,
}

#[derive(Clone, ValueEnum)]
enum EncodingArg {
    Cl100k,
    O200k,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Cl100k => Encoding::Cl100kBase,
            EncodingArg::O200k => Encoding::O200kBase,
        }
    }
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Go => Language::Go,
            LanguageArg::Java => Language::Java,
            LanguageArg::Python => Language::Python,
            LanguageArg::Javascript => Language::JavaScript,
            LanguageArg::Typescript => Language::TypeScript,
            LanguageArg::Tsx => Language::Tsx,
            LanguageArg::Rust => Language::Rust,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Map(args) => run_map(args),
        Commands::Languages => run_languages(),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "condense", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// --- Languages command ---

fn run_languages() -> Result<(), CondenseError> {
    println!("Supported languages:");
    for lang in Language::all() {
        let extensions: Vec<String> = lang.extensions().iter().map(|e| format!(".{}", e)).collect();
        println!("  {:12} {}", lang.to_string(), extensions.join(", "));
    }
    println!("Other text files are included unchanged.");
    Ok(())
}

// --- Map command ---

fn resolve_config(args: &MapArgs) -> Result<Config, CondenseError> {
    let path = match &args.config {
        Some(path) if !path.exists() => return Err(CondenseError::PathNotFound(path.clone())),
        Some(path) => path.clone(),
        None => default_config_path(&args.path),
    };
    let mut config = load_config(&path)?.unwrap_or_default();

    if let Some(len) = args.max_literal_len {
        config.max_literal_len = len;
    }
    if args.no_format {
        config.reformat = false;
    }
    config.include_hidden |= args.include_hidden;
    config.keep_going |= args.keep_going;
    config.exclude.extend(args.exclude.iter().cloned());
    if !args.lang.is_empty() {
        config.languages = args.lang.iter().cloned().map(Language::from).collect();
    }
    Ok(config)
}

fn run_map(args: MapArgs) -> Result<(), CondenseError> {
    if !args.path.exists() {
        return Err(CondenseError::PathNotFound(args.path));
    }

    let config = resolve_config(&args)?;
    tracing::debug!(?config, "effective configuration");

    let mut builder = Condense::from_config(&args.path, &config)?;
    if args.stats {
        builder = builder.measure(args.encoding.into());
    }
    let result = builder.build()?;

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            result.write_to(&mut writer)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            result.write_to(&mut writer)?;
            writer.flush()?;
        }
    }

    for skipped in &result.skipped {
        tracing::info!(path = %skipped.path.display(), reason = %skipped.reason, "left out");
    }
    if let Some(reduction) = result.reduction {
        eprintln!("condensed {}", reduction);
    }

    Ok(())
}
