use thiserror::Error;

/// Registry operation errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),

    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    #[error("Tool '{tool}' not found on agent '{agent}'")]
    ToolNotFound { agent: String, tool: String },
}

/// Chain executor errors
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Chain '{0}' does not exist")]
    ChainNotFound(String),

    #[error("Chain '{0}' already exists")]
    DuplicateChain(String),

    #[error("Chain '{chain}' references unregistered agent '{agent}'")]
    UnknownAgent { chain: String, agent: String },
}
