//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the trait seams between the engine and its
//! collaborators:
//! - `TicketAgent`: the capability contract a concrete agent implements
//! - `TicketApi`: outbound quota/project/ticket operations
//!
//! These traits keep the dispatch engine independent of any concrete
//! text-extraction heuristic or HTTP stack.

pub mod agent;
pub mod api;

pub use agent::TicketAgent;
pub use api::{ApiResponse, TicketApi};
