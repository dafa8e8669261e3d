//! Domain layer for the triage engine
//!
//! This module contains core data models and the port traits that concrete
//! agents and outbound clients implement.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{ChainError, RegistryError};
