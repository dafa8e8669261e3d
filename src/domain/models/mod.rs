pub mod agent;
pub mod chain;
pub mod config;
pub mod metrics;
pub mod routing;
pub mod tool;

pub use agent::{AgentConfig, AgentMetadata, RegistryStatus};
pub use chain::{ChainInfo, ChainRunResult, ChainStatus, StepResult};
pub use config::{
    AgentEntry, ChainEntry, Config, LoggingConfig, MonitorConfig, SystemSettings,
};
pub use metrics::{
    AgentMetrics, AgentStats, MonitorReport, PerformanceEntry, RequestRecord, SystemStats,
};
pub use routing::{Candidate, RouteOutcome, TicketAnalysis};
pub use tool::{Tool, ToolHandler, ToolSpec};
