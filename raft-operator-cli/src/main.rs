use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod sub;

#[derive(Subcommand, Debug)]
enum Sub {
    /// Inspect and change the peer set of the Raft cluster.
    Raft(sub::raft::CommandArgs),
    /// Check agent configuration files and directories.
    Validate(sub::validate::CommandArgs),
}

#[derive(Parser, Debug)]
#[command(name = "raft-operator", version)]
struct Cli {
    #[command(subcommand)]
    sub: Sub,
}

/// Parse `args` and run the command. Returns the process exit code.
async fn execute<I, T>(args: I, out: &mut impl Write, err: &mut impl Write) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    write!(out, "{e}").ok();
                    0
                }
                _ => {
                    write!(err, "{e}").ok();
                    1
                }
            };
        }
    };

    let res = match cli.sub {
        Sub::Raft(args) => sub::raft::run(args, out).await,
        Sub::Validate(args) => sub::validate::run(args, out),
    };
    match res {
        Ok(()) => 0,
        Err(e) => {
            writeln!(err, "{e:#}").ok();
            1
        }
    }
}

fn init_tracing() {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .event_format(format)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let code = execute(std::env::args_os(), &mut std::io::stdout(), &mut std::io::stderr()).await;
    ExitCode::from(code)
}
