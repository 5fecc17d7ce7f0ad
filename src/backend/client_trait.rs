//! AddressSpaceClient trait for unified address-space access
//!
//! This module provides the common trait for all address-space clients,
//! enabling both a real OPC UA session and the simulated address space used
//! for testing and demos.

use crate::error::Result;
use crate::types::{DataKind, TagValue};

/// Node id of the standard Objects folder, the root of every channel lookup
pub const OBJECTS_FOLDER_ID: &str = "i=85";

/// Unified interface for address-space clients
///
/// Implementations own their session: connecting, reconnecting after a drop
/// and tearing down are their business. Callers never retry; a failed call is
/// reported as-is. Every method may block on a network round trip.
///
/// # Example
///
/// ```ignore
/// fn channel_names<C: AddressSpaceClient>(client: &C) -> Result<Vec<String>> {
///     let root = client.objects_root()?;
///     client
///         .list_children(&root)?
///         .iter()
///         .map(|node| client.browse_name(node))
///         .collect()
/// }
/// ```
#[cfg_attr(test, mockall::automock(type Node = String;))]
pub trait AddressSpaceClient: Send + Sync {
    /// Opaque handle to a node, borrowed for the duration of one call
    type Node: Clone + Send;

    /// The Objects folder, parent of all top-level channels
    fn objects_root(&self) -> Result<Self::Node>;

    /// Resolve a string node id (e.g. `"ns=2;s=stroi.pump.running"`)
    fn resolve(&self, node_id: &str) -> Result<Self::Node>;

    /// Immediate children of a node, in server order
    fn list_children(&self, node: &Self::Node) -> Result<Vec<Self::Node>>;

    /// Display (browse) name of a node
    fn browse_name(&self, node: &Self::Node) -> Result<String>;

    /// Built-in data type of a variable node
    fn data_type_kind(&self, node: &Self::Node) -> Result<DataKind>;

    /// Stable string identity of a node
    fn node_id_string(&self, node: &Self::Node) -> String;

    /// Current value of a variable node
    fn read_value(&self, node: &Self::Node) -> Result<TagValue>;

    /// Resolve and read in one step
    fn read_value_by_id(&self, node_id: &str) -> Result<TagValue> {
        let node = self.resolve(node_id)?;
        self.read_value(&node)
    }
}
