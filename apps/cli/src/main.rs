//! # goalledger
//!
//! Command-line front end for savings goals and their progress ledgers.
//! Every command acts on behalf of `--owner` and prints JSON to stdout.

mod commands;
mod config;
mod main_lib;

use clap::Parser;
use config::Config;
use main_lib::{build_state, init_tracing};

/// Track savings goals and the contributions made toward them.
#[derive(Parser, Debug)]
#[command(name = "goalledger", version, about)]
struct Cli {
    /// Id of the user the command acts for.
    #[arg(long, env = "GOALLEDGER_OWNER")]
    owner: i64,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env();
    let state = build_state(&config).await?;

    let output = commands::run(&state, cli.owner, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_amounts_and_descending_sorts_parse() {
        let cli = Cli::try_parse_from([
            "goalledger",
            "--owner",
            "7",
            "record-progress",
            "3",
            "--amount",
            "-500",
        ])
        .unwrap();
        assert_eq!(cli.owner, 7);
        assert!(matches!(
            cli.command,
            commands::Command::RecordProgress { goal_id: 3, amount, date: None } if amount == -500.0
        ));

        let cli = Cli::try_parse_from([
            "goalledger",
            "--owner",
            "7",
            "list-goals",
            "--sort",
            "-deadline",
            "--status",
            "in_progress",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            commands::Command::ListGoals { ref sort, status: Some(goalledger_core::goals::GoalStatus::InProgress), .. } if sort == "-deadline"
        ));
    }
}
