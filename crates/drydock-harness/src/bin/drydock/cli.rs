//! CLI definitions for drydock.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "drydock",
    version,
    about = "Command console harness for driving a live application under test",
    infer_subcommands = true,
    arg_required_else_help = true,
    after_help = "Examples:\n  drydock serve                          # control server with the fixture app\n  drydock serve --listen 127.0.0.1:4100  # custom bind address\n  drydock console                        # interactive console client\n  drydock ctl stop                       # stop a running control server"
)]
pub struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the control server with the built-in fixture application.
    #[command(
        after_help = "Examples:\n  drydock serve\n  drydock serve --project ./panel --listen 127.0.0.1:4100"
    )]
    Serve {
        /// Project root holding drydock.toml and the assets directory.
        #[arg(long)]
        project: Option<PathBuf>,
        /// Bind address override (host:port).
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run the interactive console against a control server.
    Console {
        /// Project root holding drydock.toml.
        #[arg(long)]
        project: Option<PathBuf>,
        /// Control server endpoint override.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Send control requests to a running server.
    Ctl {
        /// Project root holding drydock.toml (read for the endpoint).
        #[arg(long)]
        project: Option<PathBuf>,
        /// Control server endpoint override.
        #[arg(long)]
        endpoint: Option<String>,
        #[command(subcommand)]
        action: CtlAction,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
#[command(infer_subcommands = true)]
pub enum CtlAction {
    /// Ask the server to stop listening.
    Stop,
}
