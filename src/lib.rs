//! Triage - Ticket Dispatch Engine
//!
//! Triage dispatches free-text tickets to pluggable agents, optionally runs
//! an agent pipeline ("chain") with partial-failure semantics, and tracks
//! per-agent success and latency metrics.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure data models and port traits
//! - **Service Layer** (`services`): Registry, router, chain executor, monitor
//! - **Adapters** (`adapters`): Concrete ticket agents and the agent factory
//! - **Infrastructure Layer** (`infrastructure`): Config, logging, HTTP client
//! - **Application Layer** (`application`): System wiring
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use triage::application::TriageSystem;
//! use triage::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let system = TriageSystem::from_config(&config).await?;
//!     let outcome = system.process_ticket("user: u42 needs 16 GB more memory quota").await;
//!     println!("{}", outcome.result);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::TriageSystem;
pub use domain::error::{ChainError, RegistryError};
pub use domain::models::{
    AgentConfig, AgentMetadata, AgentMetrics, ChainInfo, ChainRunResult, Config, LoggingConfig,
    MonitorReport, RouteOutcome, StepResult, SystemStats, TicketAnalysis, Tool, ToolSpec,
};
pub use domain::ports::{ApiResponse, TicketAgent, TicketApi};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AgentMonitor, AgentRegistry, ChainExecutor, TicketRouter};
