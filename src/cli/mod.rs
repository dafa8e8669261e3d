//! Command line interface.

pub mod output;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::application::TriageSystem;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging;

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Triage - ticket dispatch and pipeline engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a configuration file (defaults to triage.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Route a ticket to the single best agent
    Route {
        /// Ticket text (positional argument)
        ticket: String,

        /// Abort routing if this many seconds elapse before dispatch
        #[arg(short, long)]
        timeout_secs: Option<u64>,
    },

    /// Chain management and execution commands
    #[command(subcommand)]
    Chain(ChainCommands),

    /// List registered agents
    Agents,

    /// List tools, either for one agent or all shared tools
    Tools {
        /// Agent name; omit to list every shared tool
        agent: Option<String>,
    },

    /// Show monitoring data
    Monitor {
        /// Show only the last N errors instead of the full report
        #[arg(short, long)]
        errors: Option<usize>,
    },

    /// Show registry, chain and system status
    Status,
}

#[derive(Subcommand)]
pub enum ChainCommands {
    /// List configured chains
    List,

    /// Run a ticket through a named chain
    Run {
        /// Chain name
        name: String,

        /// Ticket text
        ticket: String,

        /// Stop issuing steps after this many seconds
        #[arg(short, long)]
        timeout_secs: Option<u64>,
    },

    /// Pick the best-matching chain for a ticket without running it
    Detect {
        /// Ticket text
        ticket: String,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

fn deadline_from(timeout_secs: Option<u64>) -> Option<Instant> {
    timeout_secs.map(|secs| Instant::now() + Duration::from_secs(secs))
}

/// Load configuration, build the system and execute the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    logging::init(&config.logging)?;

    let system = TriageSystem::from_config(&config).await?;
    execute(&system, cli).await
}

async fn execute(system: &TriageSystem, cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Route { ticket, timeout_secs } => {
            let outcome = system
                .router()
                .route_with_deadline(&ticket, deadline_from(timeout_secs))
                .await;
            if cli.json {
                output::print_json(&outcome)?;
            } else {
                output::print_route_outcome(&outcome);
            }
        }

        Commands::Chain(ChainCommands::List) => {
            let chains = system.chains().list_chains().await;
            if cli.json {
                output::print_json(&chains)?;
            } else {
                println!("{}", output::chains_table(&chains));
            }
        }

        Commands::Chain(ChainCommands::Run { name, ticket, timeout_secs }) => {
            let run = system
                .process_with_chain(&name, &ticket, deadline_from(timeout_secs))
                .await?;
            if cli.json {
                output::print_json(&run)?;
            } else {
                output::print_chain_run(&run);
            }
        }

        Commands::Chain(ChainCommands::Detect { ticket }) => {
            let detected = system.chains().auto_detect(&ticket).await;
            if cli.json {
                output::print_json(&json!({ "chain": detected }))?;
            } else {
                match detected {
                    Some(name) => println!("detected chain: {name}"),
                    None => println!("no chain matches this ticket"),
                }
            }
        }

        Commands::Agents => {
            let agents = system.registry().list_agents().await;
            if cli.json {
                output::print_json(&agents)?;
            } else {
                println!("{}", output::agents_table(&agents));
            }
        }

        Commands::Tools { agent } => {
            let tools: Vec<(String, Vec<_>)> = match agent {
                Some(name) => {
                    let specs = system.registry().agent_tools(&name).await?;
                    vec![(name, specs)]
                }
                None => system.registry().all_shared_tools().await.into_iter().collect(),
            };
            if cli.json {
                output::print_json(&tools)?;
            } else {
                println!("{}", output::tools_table(&tools));
            }
        }

        Commands::Monitor { errors } => {
            if let Some(limit) = errors {
                let recent = system.monitor().recent_errors(limit).await;
                if cli.json {
                    output::print_json(&recent)?;
                } else {
                    output::print_recent_errors(&recent);
                }
            } else {
                let report = system.monitor().report().await;
                if cli.json {
                    output::print_json(&report)?;
                } else {
                    output::print_monitor_report(&report);
                }
            }
        }

        Commands::Status => {
            let registry = system.registry().status().await;
            let chains = system.chains().status().await;
            let stats = system.monitor().system_stats().await;
            if cli.json {
                output::print_json(&json!({
                    "registry": registry,
                    "chains": chains,
                    "system": stats,
                }))?;
            } else {
                println!(
                    "agents: {} registered ({} enabled, {} disabled)",
                    registry.total_agents, registry.enabled_agents, registry.disabled_agents
                );
                println!(
                    "chains: {} configured, {} member slots",
                    chains.total_chains, chains.total_agents_in_chains
                );
                println!(
                    "requests: {} total, {:.1}% success",
                    stats.total_requests,
                    stats.success_rate * 100.0
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_route() {
        let cli = Cli::try_parse_from(["triage", "route", "need more cpu", "--timeout-secs", "5"])
            .unwrap();
        match cli.command {
            Commands::Route { ticket, timeout_secs } => {
                assert_eq!(ticket, "need more cpu");
                assert_eq!(timeout_secs, Some(5));
            }
            _ => panic!("expected route command"),
        }
    }

    #[test]
    fn test_cli_parses_chain_run_with_global_flags() {
        let cli = Cli::try_parse_from([
            "triage",
            "chain",
            "run",
            "full_processing",
            "ticket text",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Chain(ChainCommands::Run { name, ticket, timeout_secs }) => {
                assert_eq!(name, "full_processing");
                assert_eq!(ticket, "ticket text");
                assert_eq!(timeout_secs, None);
            }
            _ => panic!("expected chain run command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["triage"]).is_err());
    }

    #[test]
    fn test_deadline_from() {
        assert!(deadline_from(None).is_none());
        let deadline = deadline_from(Some(10)).unwrap();
        assert!(deadline > Instant::now());
    }
}
