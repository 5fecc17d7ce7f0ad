//! Address-space backends
//!
//! Everything that talks to the remote node-tree server lives here, behind
//! the [`AddressSpaceClient`] trait. The discovery engine and the HTTP layer
//! only ever see the trait.
//!
//! # Components
//!
//! - [`AddressSpaceClient`] - Browse/read interface every backend implements
//! - [`SimulatedAddressSpace`] - In-memory tree for tests and demos
//! - [`OpcUaClient`] - Live OPC UA session (feature-gated)
//!
//! # Example
//!
//! ```ignore
//! use tagbridge_rs::backend::SimulatedAddressSpace;
//! use tagbridge_rs::structure::discover_channel;
//!
//! let space = SimulatedAddressSpace::load("plant.toml")?;
//! let structure = discover_channel(&space, "stroi");
//! ```

pub mod client_trait;
#[cfg(feature = "opcua-client")]
pub mod opcua_client;
pub mod simulated;

pub use client_trait::{AddressSpaceClient, OBJECTS_FOLDER_ID};
#[cfg(feature = "opcua-client")]
pub use opcua_client::OpcUaClient;
pub use simulated::{SimNodeSpec, SimulatedAddressSpace};

#[cfg(test)]
pub use client_trait::MockAddressSpaceClient;
