use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jcheck::parser::{parse_java, Lexer};
use jcheck::{CompileSession, Config};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "jcheck")]
#[command(about = "Semantic checker for Java sources")]
#[command(version)]
struct Cli {
    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check Java sources and print the problem listing
    Check {
        /// Source files or directories
        #[arg(value_name = "PATH", required = true)]
        inputs: Vec<PathBuf>,

        /// Classpath entries: directories of stub sources, `:`-separated
        #[arg(long, value_name = "DIRS")]
        classpath: Option<String>,

        /// Options file of `key=value` lines
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Single option, e.g. `nullAnalysis=enabled`
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,
    },

    /// Parse a Java file and show the AST
    Parse {
        /// Input Java file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pretty-print the tree
        #[arg(short, long)]
        detailed: bool,
    },

    /// Lexically analyze a Java file
    Lex {
        /// Input Java file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show token locations
        #[arg(short, long)]
        locations: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match &cli.command {
        Commands::Check { inputs, classpath, config, options } => {
            let errors = check(inputs, classpath.as_deref(), config.as_deref(), options)?;
            if errors > 0 {
                std::process::exit(1);
            }
        }
        Commands::Parse { input, detailed } => {
            parse_file(input, *detailed)?;
        }
        Commands::Lex { input, locations } => {
            lex_file(input, *locations)?;
        }
    }

    Ok(())
}

fn load_config(file: Option<&Path>, options: &[String]) -> Result<Config> {
    let mut config = match file {
        Some(path) => Config::load(path).with_context(|| format!("reading options from {}", path.display()))?,
        None => Config::default(),
    };
    for option in options {
        let Some((key, value)) = option.split_once('=') else {
            bail!("option '{}' is not of the form key=value", option);
        };
        config.set_option(key, value)?;
    }
    Ok(config)
}

/// Source files under `input` with their display paths.
fn collect_sources(input: &Path) -> Result<Vec<(String, PathBuf)>> {
    if input.is_file() {
        return Ok(vec![(input.to_string_lossy().replace('\\', "/"), input.to_path_buf())]);
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", input.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map(|e| e != "java").unwrap_or(true) {
            continue;
        }
        let relative = path.strip_prefix(input).unwrap_or(path);
        let display: Vec<String> = relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
        found.push((display.join("/"), path.to_path_buf()));
    }
    Ok(found)
}

/// Returns the number of errors reported.
fn check(inputs: &[PathBuf], classpath: Option<&str>, config: Option<&Path>, options: &[String]) -> Result<usize> {
    let config = load_config(config, options)?;
    let mut session = CompileSession::new(config);
    for entry in classpath.map(jcheck::lookup::parse_classpath_entries).unwrap_or_default() {
        session.add_classpath_dir(&entry)?;
    }
    for input in inputs {
        for (display, path) in collect_sources(input)? {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            log::info!("adding {}", display);
            session.add_source(display, text);
        }
    }

    let result = session.compile()?;
    print!("{}", result.render());
    let (errors, warnings) = (result.error_count(), result.warning_count());
    if errors + warnings > 0 {
        println!(
            "{} problem{} ({} error{}, {} warning{})",
            errors + warnings,
            plural(errors + warnings),
            errors,
            plural(errors),
            warnings,
            plural(warnings)
        );
    }
    Ok(errors)
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn parse_file(input: &Path, detailed: bool) -> Result<()> {
    let source = fs::read_to_string(input)?;
    let ast = parse_java(&source)?;

    if detailed {
        println!("{:#?}", ast);
    } else {
        println!("{:?}", ast);
    }

    Ok(())
}

fn lex_file(input: &Path, locations: bool) -> Result<()> {
    let source = fs::read_to_string(input)?;
    let lexer = Lexer::new(&source);
    let tokens = lexer.tokenize().map_err(|e| anyhow::anyhow!("Lexical error: {}", e))?;

    for token in tokens {
        if locations {
            println!("{:?} at {}:{}", token.token_type(), token.location().line, token.location().column);
        } else {
            println!("{:?}: '{}'", token.token_type(), token.lexeme());
        }
    }

    Ok(())
}
