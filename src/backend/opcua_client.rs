//! OPC UA address-space client
//!
//! Adapter over the `opcua` crate's synchronous client. Connects anonymously
//! to a no-security endpoint, lazily on first use. When a service call fails
//! with a connection-class status the session is dropped, so the next call
//! opens a fresh one. A single call is never retried here.
//!
//! Only compiled with the `opcua-client` feature:
//!
//! ```bash
//! cargo run --features opcua-client
//! ```

use crate::config::ServerConfig;
use crate::error::{BridgeError, Result};
use crate::types::{DataKind, TagValue};
use opcua::client::prelude::*;
use opcua::sync::RwLock;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use super::client_trait::AddressSpaceClient;

/// Statuses after which the session is considered gone
const CONNECTION_FAULTS: [StatusCode; 6] = [
    StatusCode::BadNotConnected,
    StatusCode::BadConnectionClosed,
    StatusCode::BadSessionClosed,
    StatusCode::BadSessionIdInvalid,
    StatusCode::BadCommunicationError,
    StatusCode::BadTimeout,
];

/// Address-space client backed by a live OPC UA session
pub struct OpcUaClient {
    endpoint: String,
    client: Mutex<Client>,
    session: Mutex<Option<Arc<RwLock<Session>>>>,
}

impl OpcUaClient {
    /// Build a client for the configured endpoint; does not connect yet
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .application_name(config.application_name.as_str())
            .application_uri(format!("urn:{}", config.application_name))
            .product_uri(format!("urn:{}", config.application_name))
            .trust_server_certs(true)
            .create_sample_keypair(true)
            .session_retry_limit(config.session_retry_limit)
            .client()
            .ok_or_else(|| BridgeError::Config("invalid OPC UA client configuration".into()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client: Mutex::new(client),
            session: Mutex::new(None),
        })
    }

    fn session(&self) -> Result<Arc<RwLock<Session>>> {
        let mut slot = self
            .session
            .lock()
            .map_err(|_| BridgeError::Collaborator("session lock poisoned".into()))?;
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        let mut client = self
            .client
            .lock()
            .map_err(|_| BridgeError::Collaborator("client lock poisoned".into()))?;
        tracing::info!("Connecting to OPC UA endpoint {}", self.endpoint);
        let session = client
            .connect_to_endpoint(
                (
                    self.endpoint.as_str(),
                    SecurityPolicy::None.to_str(),
                    MessageSecurityMode::None,
                    UserTokenPolicy::anonymous(),
                ),
                IdentityToken::Anonymous,
            )
            .map_err(|status| {
                tracing::warn!("Connection to {} failed: {}", self.endpoint, status);
                BridgeError::NotConnected
            })?;
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Map a service fault, dropping the session on connection-class statuses
    fn fault(&self, status: StatusCode) -> BridgeError {
        if CONNECTION_FAULTS.contains(&status) {
            if let Ok(mut slot) = self.session.lock() {
                if slot.take().is_some() {
                    tracing::warn!("Dropping OPC UA session after {}", status);
                }
            }
            BridgeError::NotConnected
        } else {
            BridgeError::Collaborator(status.to_string())
        }
    }

    fn read_attribute(&self, node: &NodeId, attribute: AttributeId) -> Result<Variant> {
        let session = self.session()?;
        let request = ReadValueId {
            node_id: node.clone(),
            attribute_id: attribute as u32,
            index_range: UAString::null(),
            data_encoding: QualifiedName::null(),
        };
        let values = session
            .read()
            .read(&[request], TimestampsToReturn::Neither, 0.0)
            .map_err(|status| self.fault(status))?;
        let value = values
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::Collaborator(format!("empty read result for {}", node)))?;
        if let Some(status) = value.status {
            if status.is_bad() {
                return Err(BridgeError::Collaborator(format!(
                    "reading {:?} of {} failed: {}",
                    attribute, node, status
                )));
            }
        }
        value.value.ok_or_else(|| BridgeError::NoValue {
            node_id: node.to_string(),
            message: format!("{:?} attribute is empty", attribute),
        })
    }
}

impl AddressSpaceClient for OpcUaClient {
    type Node = NodeId;

    fn objects_root(&self) -> Result<NodeId> {
        Ok(NodeId::objects_folder_id())
    }

    fn resolve(&self, node_id: &str) -> Result<NodeId> {
        NodeId::from_str(node_id).map_err(|_| BridgeError::NodeNotFound(node_id.to_string()))
    }

    fn list_children(&self, node: &NodeId) -> Result<Vec<NodeId>> {
        let session = self.session()?;
        let description = BrowseDescription {
            node_id: node.clone(),
            browse_direction: BrowseDirection::Forward,
            reference_type_id: ReferenceTypeId::HierarchicalReferences.into(),
            include_subtypes: true,
            node_class_mask: 0,
            result_mask: BrowseResultMask::All as u32,
        };
        let results = session
            .read()
            .browse(&[description])
            .map_err(|status| self.fault(status))?;
        let result = results
            .and_then(|mut r| r.pop())
            .ok_or_else(|| BridgeError::Collaborator(format!("empty browse result for {}", node)))?;
        if result.status_code.is_bad() {
            return Err(BridgeError::Collaborator(format!(
                "browsing {} failed: {}",
                node, result.status_code
            )));
        }
        Ok(result
            .references
            .unwrap_or_default()
            .into_iter()
            .map(|reference| reference.node_id.node_id)
            .collect())
    }

    fn browse_name(&self, node: &NodeId) -> Result<String> {
        match self.read_attribute(node, AttributeId::BrowseName)? {
            Variant::QualifiedName(name) => Ok(name.name.to_string()),
            other => Err(BridgeError::Collaborator(format!(
                "unexpected browse name {:?} for {}",
                other, node
            ))),
        }
    }

    fn data_type_kind(&self, node: &NodeId) -> Result<DataKind> {
        match self.read_attribute(node, AttributeId::DataType)? {
            Variant::NodeId(data_type) => match (data_type.namespace, &data_type.identifier) {
                (0, Identifier::Numeric(id)) => Ok(DataKind::from_builtin_id(*id)),
                _ => Ok(DataKind::Other(0)),
            },
            other => Err(BridgeError::Collaborator(format!(
                "unexpected data type {:?} for {}",
                other, node
            ))),
        }
    }

    fn node_id_string(&self, node: &NodeId) -> String {
        node.to_string()
    }

    fn read_value(&self, node: &NodeId) -> Result<TagValue> {
        let value = match self.read_attribute(node, AttributeId::Value)? {
            Variant::Boolean(v) => TagValue::Boolean(v),
            Variant::SByte(v) => TagValue::Integer(v.into()),
            Variant::Byte(v) => TagValue::Integer(v.into()),
            Variant::Int16(v) => TagValue::Integer(v.into()),
            Variant::UInt16(v) => TagValue::Integer(v.into()),
            Variant::Int32(v) => TagValue::Integer(v.into()),
            Variant::UInt32(v) => TagValue::Integer(v.into()),
            Variant::Int64(v) => TagValue::Integer(v),
            Variant::UInt64(v) => match i64::try_from(v) {
                Ok(v) => TagValue::Integer(v),
                Err(_) => TagValue::Float(v as f64),
            },
            Variant::Float(v) => TagValue::Float(v.into()),
            Variant::Double(v) => TagValue::Float(v),
            Variant::String(v) => TagValue::Text(v.to_string()),
            Variant::Empty => {
                return Err(BridgeError::NoValue {
                    node_id: node.to_string(),
                    message: "value is empty".to_string(),
                })
            }
            other => TagValue::Text(format!("{:?}", other)),
        };
        Ok(value)
    }
}
