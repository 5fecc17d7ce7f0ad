//! Address-space structure discovery.
//!
//! Walks a subtree through an [`AddressSpaceClient`] and builds a
//! [`StructureNode`] tree: leaves become tags, branches become groups.
//!
//! ```text
//! stroi                      (channel)
//! +-- pump                   (group)
//! |   +-- running            (tag, boolean)
//! |   +-- speed              (tag, analog)
//! +-- level                  (tag, analog)
//! ```
//!
//! ## Failure policy
//!
//! - A failed data-type read classifies the tag as analog; the tag is kept.
//! - Failed browse-name or child listings propagate to the caller, without retry.
//! - [`discover_channel`] swallows every error into an empty result.
//!
//! The walk has no cycle detection and no depth limit: the server must expose
//! a tree. A cyclic hierarchy does not terminate.

pub mod channel;

pub use channel::{discover_channel, ChannelStructure};

use crate::backend::AddressSpaceClient;
use crate::error::{Result, ResultExt};
use crate::types::{DataKind, StructureNode, TagDescriptor, TagType};

/// Recursively discover the subtree below `root`.
pub fn discover<C>(client: &C, root: &C::Node) -> Result<StructureNode>
where
    C: AddressSpaceClient + ?Sized,
{
    let mut result = StructureNode::new();
    let children = client
        .list_children(root)
        .with_context(|| format!("Failed to list children of {}", client.node_id_string(root)))?;

    for child in &children {
        let name = client.browse_name(child)?;
        let grandchildren = client.list_children(child).with_context(|| {
            format!("Failed to list children of {}", client.node_id_string(child))
        })?;

        if grandchildren.is_empty() {
            let tag = classify_tag(client, child, &name);
            result.insert_tag(name, tag);
        } else {
            result.insert_group(name, discover(client, child)?);
        }
    }

    Ok(result)
}

/// Build the descriptor of a leaf, defaulting to analog when the type is unreadable
fn classify_tag<C>(client: &C, node: &C::Node, name: &str) -> TagDescriptor
where
    C: AddressSpaceClient + ?Sized,
{
    let node_id = client.node_id_string(node);
    let tag_type = match client.data_type_kind(node) {
        Ok(kind) => {
            tracing::debug!("Tag '{}', NodeID={}, DataKind={:?}", name, node_id, kind);
            if kind != DataKind::Boolean && !kind.is_numeric() {
                tracing::debug!("Non-numeric tag '{}' reported as analog", name);
            }
            TagType::from_kind(kind)
        }
        Err(e) => {
            tracing::debug!("Error getting data type for '{}': {}", name, e);
            TagType::Analog
        }
    };
    TagDescriptor::new(node_id, tag_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockAddressSpaceClient, SimulatedAddressSpace, OBJECTS_FOLDER_ID};
    use crate::error::BridgeError;
    use crate::types::{DataKind, TagValue};
    use mockall::predicate::eq;

    fn plant() -> SimulatedAddressSpace {
        SimulatedAddressSpace::new()
            .with_folder(OBJECTS_FOLDER_ID, "stroi", "stroi")
            .with_folder("stroi", "stroi.pump", "pump")
            .with_variable(
                "stroi.pump",
                "stroi.pump.running",
                "running",
                Some(DataKind::Boolean),
                Some(TagValue::Boolean(true)),
            )
            .with_variable(
                "stroi.pump",
                "stroi.pump.speed",
                "speed",
                Some(DataKind::Float),
                Some(TagValue::Float(1450.0)),
            )
            .with_variable("stroi", "stroi.level", "level", None, None)
            .with_folder("stroi", "stroi.spare", "spare")
    }

    #[test]
    fn test_discover_leaves_and_groups() {
        let space = plant();
        let node = discover(&space, &"stroi".to_string()).unwrap();

        let pump = node.group("pump").unwrap();
        assert_eq!(pump.tag("running").unwrap().tag_type, TagType::Boolean);
        assert_eq!(pump.tag("speed").unwrap().tag_type, TagType::Analog);
        assert_eq!(pump.tag("speed").unwrap().node_id, "stroi.pump.speed");
        assert!(pump.groups().is_empty());

        // unreadable data type defaults to analog, tag kept
        assert_eq!(node.tag("level").unwrap().tag_type, TagType::Analog);
    }

    #[test]
    fn test_childless_branch_is_a_tag() {
        // a folder without children cannot be told apart from a leaf
        let space = plant();
        let node = discover(&space, &"stroi".to_string()).unwrap();
        assert!(node.tag("spare").is_some());
        assert!(node.group("spare").is_none());
    }

    #[test]
    fn test_discover_empty_root() {
        let space = SimulatedAddressSpace::new();
        let node = discover(&space, &OBJECTS_FOLDER_ID.to_string()).unwrap();
        assert!(node.is_empty());
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let space = SimulatedAddressSpace::new()
            .with_folder(OBJECTS_FOLDER_ID, "root", "root")
            .with_folder("root", "motor.a", "motor")
            .with_variable("motor.a", "motor.a.rpm", "rpm", Some(DataKind::Double), None)
            .with_variable("root", "motor.b", "motor", Some(DataKind::Boolean), None);

        let node = discover(&space, &"root".to_string()).unwrap();
        assert!(node.group("motor").is_none());
        assert_eq!(node.tag("motor").unwrap().node_id, "motor.b");
        assert_eq!(node.tags().len() + node.groups().len(), 1);
    }

    #[test]
    fn test_type_read_failure_is_fail_open() {
        let mut mock = MockAddressSpaceClient::new();
        mock.expect_list_children()
            .withf(|node| node == "root")
            .returning(|_| Ok(vec!["a".to_string(), "b".to_string()]));
        mock.expect_list_children()
            .withf(|node| node != "root")
            .returning(|_| Ok(Vec::new()));
        mock.expect_browse_name()
            .returning(|node| Ok(node.to_uppercase()));
        mock.expect_node_id_string()
            .returning(|node| format!("ns=2;s={}", node));
        mock.expect_data_type_kind()
            .with(eq("a".to_string()))
            .returning(|_| Err(BridgeError::Collaborator("BadAttributeIdInvalid".into())));
        mock.expect_data_type_kind()
            .with(eq("b".to_string()))
            .returning(|_| Ok(DataKind::Boolean));

        let node = discover(&mock, &"root".to_string()).unwrap();
        assert_eq!(node.tag("A").unwrap().tag_type, TagType::Analog);
        assert_eq!(node.tag("A").unwrap().node_id, "ns=2;s=a");
        assert_eq!(node.tag("B").unwrap().tag_type, TagType::Boolean);
    }

    #[test]
    fn test_listing_failure_propagates_without_retry() {
        let mut mock = MockAddressSpaceClient::new();
        mock.expect_list_children()
            .withf(|node| node == "root")
            .times(1)
            .returning(|_| Ok(vec!["a".to_string()]));
        mock.expect_list_children()
            .withf(|node| node == "a")
            .times(1)
            .returning(|_| Err(BridgeError::NotConnected));
        mock.expect_browse_name()
            .times(1)
            .returning(|_| Ok("a".to_string()));
        mock.expect_node_id_string()
            .returning(|node| node.clone());

        let err = discover(&mock, &"root".to_string()).unwrap_err();
        assert!(err.is_connection_fault());
        assert!(err.to_string().contains("Failed to list children of a"));
    }

    #[test]
    fn test_browse_name_failure_propagates() {
        let mut mock = MockAddressSpaceClient::new();
        mock.expect_list_children()
            .returning(|_| Ok(vec!["a".to_string()]));
        mock.expect_browse_name()
            .returning(|_| Err(BridgeError::Collaborator("BadNodeIdUnknown".into())));
        mock.expect_node_id_string()
            .returning(|node| node.clone());

        assert!(discover(&mock, &"root".to_string()).is_err());
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let space = plant();
        let first = discover(&space, &"stroi".to_string()).unwrap();
        let second = discover(&space, &"stroi".to_string()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    /// Build a random tree: each entry is (parent index, is_boolean); parents
    /// always precede children so the result is acyclic.
    fn random_space(shape: &[(usize, bool)]) -> SimulatedAddressSpace {
        let mut space = SimulatedAddressSpace::new().with_folder(OBJECTS_FOLDER_ID, "n0", "n0");
        for (i, (parent, boolean)) in shape.iter().enumerate() {
            let id = format!("n{}", i + 1);
            let parent = format!("n{}", parent % (i + 1));
            let kind = if *boolean { DataKind::Boolean } else { DataKind::Int32 };
            space = space.with_variable(&parent, &id, &id, Some(kind), None);
        }
        space
    }

    fn check_partition(
        space: &SimulatedAddressSpace,
        id: &str,
        node: &StructureNode,
    ) -> std::result::Result<(), TestCaseError> {
        let children = space.list_children(&id.to_string()).unwrap();
        prop_assert_eq!(children.len(), node.tags().len() + node.groups().len());
        for child in children {
            let has_children = !space.list_children(&child).unwrap().is_empty();
            if has_children {
                prop_assert!(node.tag(&child).is_none());
                check_partition(space, &child, node.group(&child).unwrap())?;
            } else {
                prop_assert!(node.group(&child).is_none());
                let tag = node.tag(&child).unwrap();
                let expected = if space.data_type_kind(&child).unwrap() == DataKind::Boolean {
                    TagType::Boolean
                } else {
                    TagType::Analog
                };
                prop_assert_eq!(tag.tag_type, expected);
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn test_leaves_are_tags_and_branches_are_groups(
            shape in prop::collection::vec((0usize..64, any::<bool>()), 0..40)
        ) {
            let space = random_space(&shape);
            let node = discover(&space, &"n0".to_string()).unwrap();

            // Property: every child is a tag iff it has no children
            check_partition(&space, "n0", &node)?;
            prop_assert_eq!(node.total_tags(), count_leaves(&space, "n0"));
        }
    }

    fn count_leaves(space: &SimulatedAddressSpace, id: &str) -> usize {
        space
            .list_children(&id.to_string())
            .unwrap()
            .iter()
            .map(|child| {
                let below = count_leaves(space, child);
                if space.list_children(child).unwrap().is_empty() {
                    1
                } else {
                    below
                }
            })
            .sum()
    }
}
