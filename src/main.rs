//! lgo-convert CLI - converts REPL blocks into Go packages

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lgo_convert::errors::{line_col_to_offset, print_error};
use lgo_convert::{Config, Session, StdImporter};

#[derive(Parser, Debug)]
#[command(name = "lgo-convert", version, about = "Convert Go REPL blocks into packages")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert each file as the next block of one session
    Convert {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        options: Options,
    },
    /// Show documentation or a lookup query for an identifier
    Inspect {
        file: PathBuf,

        /// Cursor position, 1-based
        #[arg(long, value_name = "LINE:COL", value_parser = parse_position)]
        at: (usize, usize),

        /// Blocks to run before FILE
        #[arg(long, num_args = 1..)]
        prior: Vec<PathBuf>,

        #[command(flatten)]
        options: Options,
    },
}

#[derive(clap::Args, Debug)]
struct Options {
    /// Prefix of unexported names a block defines
    #[arg(long, default_value = "Def_")]
    def_prefix: String,

    /// Prefix of unexported names of prior blocks
    #[arg(long, default_value = "Ref_")]
    ref_prefix: String,

    /// Import path prefix of block packages
    #[arg(long, default_value = lgo_convert::converter::DEFAULT_PKG_PREFIX)]
    pkg_prefix: String,

    /// Stop cancelled executions at function entries and loop iterations
    #[arg(long)]
    auto_exit: bool,

    /// Register hoisted variables with the runtime
    #[arg(long)]
    register_vars: bool,
}

impl Options {
    fn session<'a>(&self, importer: &'a StdImporter) -> Session<'a> {
        let base = Config {
            def_prefix: self.def_prefix.clone(),
            ref_prefix: self.ref_prefix.clone(),
            auto_exit_code: self.auto_exit,
            register_vars: self.register_vars,
            ..Config::default()
        };
        Session::with_config(importer, base).with_pkg_prefix(&self.pkg_prefix)
    }
}

fn parse_position(s: &str) -> Result<(usize, usize), String> {
    let (line, col) = s.split_once(':').ok_or_else(|| format!("expected LINE:COL, got {:?}", s))?;
    let line = line.parse().map_err(|e| format!("bad line {:?}: {}", line, e))?;
    let col = col.parse().map_err(|e| format!("bad column {:?}: {}", col, e))?;
    Ok((line, col))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<ExitCode> {
    let importer = StdImporter::new();
    match command {
        Command::Convert { files, options } => {
            let mut session = options.session(&importer);
            for (n, path) in files.iter().enumerate() {
                let source = read(path)?;
                match session.convert(&source) {
                    Ok(converted) => {
                        println!("// block {}: {}", n, path.display());
                        print!("{}", converted.src);
                    }
                    Err(e) => {
                        print_error(&source, &path.display().to_string(), &e);
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect {
            file,
            at: (line, col),
            prior,
            options,
        } => {
            let mut session = options.session(&importer);
            for path in &prior {
                let source = read(path)?;
                if let Err(e) = session.convert(&source) {
                    print_error(&source, &path.display().to_string(), &e);
                    return Ok(ExitCode::FAILURE);
                }
            }

            let source = read(&file)?;
            let Some(offset) = line_col_to_offset(&source, line, col) else {
                bail!("{}:{}:{} is outside the file", file.display(), line, col);
            };
            debug!(offset, blocks = session.blocks(), "inspecting");
            let doc = session.inspect(&source, offset);
            if !doc.doc.is_empty() {
                println!("{}", doc.doc);
            }
            if !doc.query.is_empty() {
                println!("query: {}", doc.query);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
