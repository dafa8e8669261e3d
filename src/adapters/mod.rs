//! Concrete agent implementations and their construction.

pub mod agents;

pub use agents::AgentFactory;
