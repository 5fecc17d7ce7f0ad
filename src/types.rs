//! Core data types for tagbridge
//!
//! This module contains the data structures shared by the address-space
//! clients, the structure discoverer and the HTTP surface.
//!
//! # Main Types
//!
//! - [`DataKind`] - Built-in data type of a variable node
//! - [`TagType`] - Coarse classification of a tag (boolean or analog)
//! - [`TagDescriptor`] - A discovered leaf: node id plus tag type
//! - [`StructureNode`] - A discovered branch: named tags and named child groups
//! - [`TagValue`] - A value read from a tag
//!
//! # Wire Format
//!
//! [`StructureNode`] serializes as
//!
//! ```text
//! { "_tags":   { "running": { "nodeId": "ns=2;s=pump.running", "tagType": "boolean" } },
//!   "_groups": { "valves":  { "_tags": { ... }, "_groups": { ... } } } }
//! ```
//!
//! Maps are ordered by name so repeated discoveries serialize identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Built-in data type of a variable node in the address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    Boolean,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    /// Any other data type, by its numeric identifier
    Other(u32),
}

impl DataKind {
    /// Map a standard (namespace 0) data-type identifier to a kind
    pub fn from_builtin_id(id: u32) -> Self {
        match id {
            1 => DataKind::Boolean,
            2 => DataKind::SByte,
            3 => DataKind::Byte,
            4 => DataKind::Int16,
            5 => DataKind::UInt16,
            6 => DataKind::Int32,
            7 => DataKind::UInt32,
            8 => DataKind::Int64,
            9 => DataKind::UInt64,
            10 => DataKind::Float,
            11 => DataKind::Double,
            12 => DataKind::String,
            13 => DataKind::DateTime,
            other => DataKind::Other(other),
        }
    }

    /// Returns true for the integer and floating point kinds
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataKind::SByte
                | DataKind::Byte
                | DataKind::Int16
                | DataKind::UInt16
                | DataKind::Int32
                | DataKind::UInt32
                | DataKind::Int64
                | DataKind::UInt64
                | DataKind::Float
                | DataKind::Double
        )
    }
}

/// Classification of a discovered tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    Boolean,
    /// Everything that is not boolean, including tags whose type could not be read
    #[default]
    Analog,
}

impl TagType {
    /// Classify a data kind; only [`DataKind::Boolean`] maps to a boolean tag
    pub fn from_kind(kind: DataKind) -> Self {
        if kind == DataKind::Boolean {
            TagType::Boolean
        } else {
            TagType::Analog
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagType::Boolean => write!(f, "boolean"),
            TagType::Analog => write!(f, "analog"),
        }
    }
}

/// A leaf of the discovered structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDescriptor {
    /// Stable string identity of the underlying node
    pub node_id: String,
    /// Tag type fixed at discovery time
    pub tag_type: TagType,
}

impl TagDescriptor {
    pub fn new(node_id: impl Into<String>, tag_type: TagType) -> Self {
        Self {
            node_id: node_id.into(),
            tag_type,
        }
    }
}

/// A discovered branch of the address space.
///
/// A name lives in exactly one of `tags` or `groups`. The insert methods
/// enforce this: inserting a tag removes a group of the same name and vice
/// versa, so the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    #[serde(rename = "_tags", default)]
    tags: BTreeMap<String, TagDescriptor>,
    #[serde(rename = "_groups", default)]
    groups: BTreeMap<String, StructureNode>,
}

impl StructureNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf, replacing any tag or group with the same name
    pub fn insert_tag(&mut self, name: impl Into<String>, tag: TagDescriptor) {
        let name = name.into();
        self.groups.remove(&name);
        self.tags.insert(name, tag);
    }

    /// Insert a child branch, replacing any tag or group with the same name
    pub fn insert_group(&mut self, name: impl Into<String>, group: StructureNode) {
        let name = name.into();
        self.tags.remove(&name);
        self.groups.insert(name, group);
    }

    pub fn tags(&self) -> &BTreeMap<String, TagDescriptor> {
        &self.tags
    }

    pub fn groups(&self) -> &BTreeMap<String, StructureNode> {
        &self.groups
    }

    pub fn tag(&self, name: &str) -> Option<&TagDescriptor> {
        self.tags.get(name)
    }

    pub fn group(&self, name: &str) -> Option<&StructureNode> {
        self.groups.get(name)
    }

    /// A childless branch
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.groups.is_empty()
    }

    /// Number of tags in this node and all descendants
    pub fn total_tags(&self) -> usize {
        self.tags.len() + self.groups.values().map(|g| g.total_tags()).sum::<usize>()
    }

    /// Look up a tag by slash-separated path, e.g. `"pump/valves/open"`
    pub fn find_tag(&self, path: &str) -> Option<&TagDescriptor> {
        let (groups, leaf) = match path.rsplit_once('/') {
            Some((groups, leaf)) => (Some(groups), leaf),
            None => (None, path),
        };
        let mut node = self;
        if let Some(groups) = groups {
            for segment in groups.split('/') {
                node = node.groups.get(segment)?;
            }
        }
        node.tags.get(leaf)
    }
}

/// A value read from a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Boolean(v) => write!(f, "{}", v),
            TagValue::Integer(v) => write!(f, "{}", v),
            TagValue::Float(v) => write!(f, "{}", v),
            TagValue::Text(v) => write!(f, "{}", v),
        }
    }
}
