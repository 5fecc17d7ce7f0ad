//! # TagBridge-RS: OPC UA tag bridge
//!
//! A small HTTP service that sits between a web front-end and an industrial
//! OPC UA server. It exposes the tag hierarchy of one channel as JSON, reads
//! single tag values, and evaluates logic and math operations over values
//! supplied by the caller.
//!
//! ## Architecture
//!
//! - **Backend**: [`backend::AddressSpaceClient`] abstracts browsing and reading;
//!   a live OPC UA client (feature `opcua-client`) and an in-memory simulation
//!   implement it
//! - **Structure**: recursive discovery of tags and groups under a channel
//! - **Operators**: a fixed registry of logic and math operators with arity
//!   validation
//! - **HTTP**: axum routes over the above, with the client injected as state
//!
//! ## Configuration
//!
//! See [`config`] for the file format and lookup order.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tagbridge_rs::{backend::SimulatedAddressSpace, http, AppConfig};
//!
//! #[tokio::main]
//! async fn main() -> tagbridge_rs::Result<()> {
//!     let config = AppConfig::resolve(None)?;
//!     let space = SimulatedAddressSpace::load("plant.toml")?;
//!     let state = http::AppState::new(Arc::new(space), config.server.channel.clone());
//!     http::serve(state, config.http.bind).await
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod operators;
pub mod structure;
pub mod types;

// Re-export commonly used types
pub use backend::{AddressSpaceClient, SimulatedAddressSpace};
pub use config::AppConfig;
pub use error::{BridgeError, Result};
pub use operators::{evaluate_logic, evaluate_math, EvalError, MathOutcome, OperatorRegistry};
pub use structure::{discover, discover_channel, ChannelStructure};
pub use types::{StructureNode, TagType, TagValue};
