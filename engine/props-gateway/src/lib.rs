//! PropsGateway - HTTP API for props and lineup generation
//!
//! This module provides the external API interface for the props frontend:
//! shaped NBA and MLB prop listings with recent game logs, the FADE/UNDER
//! confidence spread, and randomized lineup generation.

pub mod config;
pub mod error;
pub mod gateway;
pub mod props;
pub mod rest_api;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::PropsGateway;

/// Version of the PropsGateway API
pub const VERSION: &str = "0.1.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5050;
