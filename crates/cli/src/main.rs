use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use cmd::{cmd_dirs, cmd_info, cmd_resolve, cmd_unresolve};
use output::{OutputFormat, print_error};

/// ora - inspect OpenRA platform detection and support directories
#[derive(Parser)]
#[command(name = "ora")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose (debug) logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show platform, session and directory information
  Info {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Show the installation and support directories
  Dirs {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Expand a symbolic path (`^...`, `./...`) into a real path
  Resolve {
    /// Path segments, joined with the platform separator before expansion
    #[arg(required = true)]
    segments: Vec<String>,
  },

  /// Rewrite a real path into symbolic form
  Unresolve {
    /// Absolute path to rewrite
    path: String,
  },
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Info { output } => cmd_info(output),
    Commands::Dirs { output } => cmd_dirs(output),
    Commands::Resolve { segments } => cmd_resolve(&segments),
    Commands::Unresolve { path } => cmd_unresolve(&path),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
