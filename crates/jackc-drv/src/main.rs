//! `jackc` — compile Jack source to a VM instruction listing, or to an
//! indented XML parse tree.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jackc_drv::{Config, EmitMode, Session};

/// Compile Jack source files into VM instructions or an XML parse tree.
#[derive(Parser, Debug)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jack-to-VM compiler front end", long_about = None)]
struct Cli {
    /// A .jack file, or a directory to compile recursively.
    input: PathBuf,

    /// What to emit for each compiled class.
    #[arg(long, value_enum, default_value_t = Emit::Vm)]
    emit: Emit,

    /// Write output files into this directory instead of next to the
    /// source.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Enable debug-level logging.
    #[arg(short, long, global = true, env = "JACKC_VERBOSE")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Emit {
    Vm,
    Xml,
}

impl From<Emit> for EmitMode {
    fn from(e: Emit) -> Self {
        match e {
            Emit::Vm => EmitMode::Vm,
            Emit::Xml => EmitMode::Xml,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config {
        input: cli.input,
        emit: cli.emit.into(),
        out_dir: cli.out_dir,
    };

    let outputs = Session::new(config).compile()?;
    for path in outputs {
        tracing::info!(path = %path.display(), "done");
    }
    Ok(())
}

fn init_logging(verbose: bool) -> Result<(), jackc_drv::DriverError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| jackc_drv::DriverError::Logging(e.to_string()))
}
