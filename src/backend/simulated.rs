//! Simulated Address Space
//!
//! An in-memory node tree that implements [`AddressSpaceClient`], used by the
//! test-suite and for running the service without a plant connection.
//!
//! # Features
//!
//! - **File-backed**: load a plant layout from a TOML file
//! - **Builder API**: assemble trees in code for tests and benchmarks
//! - **Fault injection**: nodes without a data type or value fail those reads,
//!   and [`SimulatedAddressSpace::set_connected`] drops the whole "session"
//!
//! # File Format
//!
//! ```toml
//! [[node]]
//! id = "ns=2;s=stroi"
//! name = "stroi"                 # parent defaults to the Objects folder
//!
//! [[node]]
//! id = "ns=2;s=stroi.pump.running"
//! name = "running"
//! parent = "ns=2;s=stroi.pump"
//! kind = "Boolean"               # omit to make the data type read fail
//! value = true                   # omit to make the value read fail
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tagbridge_rs::backend::{SimulatedAddressSpace, OBJECTS_FOLDER_ID};
//! use tagbridge_rs::types::{DataKind, TagValue};
//!
//! let space = SimulatedAddressSpace::new()
//!     .with_folder(OBJECTS_FOLDER_ID, "ns=2;s=stroi", "stroi")
//!     .with_variable(
//!         "ns=2;s=stroi",
//!         "ns=2;s=stroi.level",
//!         "level",
//!         Some(DataKind::Double),
//!         Some(TagValue::Float(3.5)),
//!     );
//! ```

use crate::error::{BridgeError, Result, ResultExt};
use crate::types::{DataKind, TagValue};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use super::client_trait::{AddressSpaceClient, OBJECTS_FOLDER_ID};

/// One node of the simulated tree
#[derive(Debug, Clone)]
struct SimNode {
    browse_name: String,
    data_kind: Option<DataKind>,
    value: Option<TagValue>,
}

/// Entry of a simulation file
#[derive(Debug, Clone, Deserialize)]
pub struct SimNodeSpec {
    pub id: String,
    pub name: String,
    #[serde(default = "default_parent")]
    pub parent: String,
    #[serde(default)]
    pub kind: Option<DataKind>,
    #[serde(default)]
    pub value: Option<TagValue>,
}

fn default_parent() -> String {
    OBJECTS_FOLDER_ID.to_string()
}

#[derive(Debug, Deserialize)]
struct SimFile {
    #[serde(default, rename = "node")]
    nodes: Vec<SimNodeSpec>,
}

/// In-memory address space
#[derive(Debug)]
pub struct SimulatedAddressSpace {
    nodes: HashMap<String, SimNode>,
    children: HashMap<String, Vec<String>>,
    connected: AtomicBool,
}

impl Default for SimulatedAddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedAddressSpace {
    /// Create an address space holding only the Objects folder
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            OBJECTS_FOLDER_ID.to_string(),
            SimNode {
                browse_name: "Objects".to_string(),
                data_kind: None,
                value: None,
            },
        );
        Self {
            nodes,
            children: HashMap::new(),
            connected: AtomicBool::new(true),
        }
    }

    /// Load a simulation file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(BridgeError::from)
            .with_context(|| format!("Failed to read simulation file {}", path.display()))?;
        let space = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid simulation file {}", path.display()))?;
        tracing::info!(
            "Loaded simulated address space from {:?} ({} nodes)",
            path,
            space.len()
        );
        Ok(space)
    }

    /// Parse a simulation document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SimFile = toml::from_str(content)?;
        Self::from_specs(file.nodes)
    }

    /// Build from node specs, validating ids and parent links
    pub fn from_specs(specs: Vec<SimNodeSpec>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(OBJECTS_FOLDER_ID);
        for spec in &specs {
            if !seen.insert(spec.id.as_str()) {
                return Err(BridgeError::Config(format!(
                    "duplicate node id '{}'",
                    spec.id
                )));
            }
            if spec.parent == spec.id {
                return Err(BridgeError::Config(format!(
                    "node '{}' cannot be its own parent",
                    spec.id
                )));
            }
        }
        if let Some(orphan) = specs.iter().find(|s| !seen.contains(s.parent.as_str())) {
            return Err(BridgeError::Config(format!(
                "node '{}' has unknown parent '{}'",
                orphan.id, orphan.parent
            )));
        }

        let mut space = Self::new();
        for spec in specs {
            space.insert(spec);
        }
        Ok(space)
    }

    /// Insert a node under its parent; no validation
    pub fn insert(&mut self, spec: SimNodeSpec) {
        self.children
            .entry(spec.parent)
            .or_default()
            .push(spec.id.clone());
        self.nodes.insert(
            spec.id,
            SimNode {
                browse_name: spec.name,
                data_kind: spec.kind,
                value: spec.value,
            },
        );
    }

    /// Add a branch node
    pub fn with_folder(mut self, parent: &str, id: &str, name: &str) -> Self {
        self.insert(SimNodeSpec {
            id: id.to_string(),
            name: name.to_string(),
            parent: parent.to_string(),
            kind: None,
            value: None,
        });
        self
    }

    /// Add a variable node
    pub fn with_variable(
        mut self,
        parent: &str,
        id: &str,
        name: &str,
        kind: Option<DataKind>,
        value: Option<TagValue>,
    ) -> Self {
        self.insert(SimNodeSpec {
            id: id.to_string(),
            name: name.to_string(),
            parent: parent.to_string(),
            kind,
            value,
        });
        self
    }

    /// Replace the value of an existing node
    pub fn set_value(&mut self, id: &str, value: TagValue) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| BridgeError::NodeNotFound(id.to_string()))?;
        node.value = Some(value);
        Ok(())
    }

    /// Simulate a dropped (or restored) session
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Number of nodes, including the Objects folder
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(BridgeError::NotConnected)
        }
    }

    fn node(&self, id: &str) -> Result<&SimNode> {
        self.ensure_connected()?;
        self.nodes
            .get(id)
            .ok_or_else(|| BridgeError::NodeNotFound(id.to_string()))
    }
}

impl AddressSpaceClient for SimulatedAddressSpace {
    type Node = String;

    fn objects_root(&self) -> Result<String> {
        self.ensure_connected()?;
        Ok(OBJECTS_FOLDER_ID.to_string())
    }

    fn resolve(&self, node_id: &str) -> Result<String> {
        self.node(node_id)?;
        Ok(node_id.to_string())
    }

    fn list_children(&self, node: &String) -> Result<Vec<String>> {
        self.node(node)?;
        Ok(self.children.get(node).cloned().unwrap_or_default())
    }

    fn browse_name(&self, node: &String) -> Result<String> {
        Ok(self.node(node)?.browse_name.clone())
    }

    fn data_type_kind(&self, node: &String) -> Result<DataKind> {
        self.node(node)?.data_kind.ok_or_else(|| {
            BridgeError::Collaborator(format!("node {} has no data type attribute", node))
        })
    }

    fn node_id_string(&self, node: &String) -> String {
        node.clone()
    }

    fn read_value(&self, node: &String) -> Result<TagValue> {
        self.node(node)?
            .value
            .clone()
            .ok_or_else(|| BridgeError::NoValue {
                node_id: node.clone(),
                message: "value attribute is empty".to_string(),
            })
    }
}
