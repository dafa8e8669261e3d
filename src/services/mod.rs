pub mod chain_executor;
pub mod monitor;
pub mod registry;
pub mod router;

pub use chain_executor::ChainExecutor;
pub use monitor::AgentMonitor;
pub use registry::AgentRegistry;
pub use router::TicketRouter;
