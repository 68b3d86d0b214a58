//! CLI entrypoint for the drydock harness.

#[path = "drydock/cli.rs"]
mod cli;
#[path = "drydock/completions.rs"]
mod completions;
#[path = "drydock/console.rs"]
mod console;
#[path = "drydock/ctl.rs"]
mod ctl;
#[path = "drydock/serve.rs"]
mod serve;
#[path = "drydock/style.rs"]
mod style;

use clap::error::ErrorKind;
use clap::Parser;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    if let Err(err) = run() {
        let message = format_error_with_tip(&err);
        eprintln!("{}", style::error(format!("Error: {message}")));
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let raw_args: Vec<String> = std::env::args().collect();
    let cli = match Cli::try_parse_from(&raw_args) {
        Ok(cli) => cli,
        Err(err) => {
            if err.kind() == ErrorKind::InvalidSubcommand {
                if let Some(input) = raw_args.get(1) {
                    if let Some(suggestion) = suggest_subcommand(input) {
                        eprintln!("Did you mean: {suggestion}?");
                    }
                }
            }
            err.exit();
        }
    };
    init_tracing(cli.verbose);
    match cli.command {
        Command::Serve { project, listen } => serve::run_serve(project, listen),
        Command::Console { project, endpoint } => console::run_console(project, endpoint),
        Command::Ctl {
            project,
            endpoint,
            action,
        } => ctl::run_control(project, endpoint, action),
        Command::Completions { shell } => completions::run_completions(shell),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn suggest_subcommand(input: &str) -> Option<&'static str> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let candidates = ["serve", "console", "ctl", "completions"];
    let mut best = None;
    let mut best_score = usize::MAX;
    for candidate in candidates {
        let score = levenshtein(input, candidate);
        if score < best_score {
            best_score = score;
            best = Some(candidate);
        }
    }
    if best_score <= 2 {
        best
    } else {
        None
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let columns = b.chars().count() + 1;
    let mut prev: Vec<usize> = (0..columns).collect();
    let mut curr = vec![0; columns];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[columns - 1]
}

fn format_error_with_tip(err: &anyhow::Error) -> String {
    let message = format!("{err:#}");
    let lower = message.to_ascii_lowercase();
    let tip = if lower.contains("bind") {
        Some("Tip: another server may hold that address; pick a free port with --listen or run `drydock ctl stop`.")
    } else if lower.contains("connection") {
        Some("Tip: start the control server first with `drydock serve`.")
    } else if lower.contains("drydock.toml") {
        Some("Tip: check the [server] and [console] sections of drydock.toml.")
    } else {
        None
    };
    match tip {
        Some(tip) => format!("{message}\n{tip}"),
        None => message,
    }
}
