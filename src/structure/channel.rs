//! Channel selection: discovery restricted to one top-level object.

use std::collections::BTreeMap;

use super::discover;
use crate::backend::AddressSpaceClient;
use crate::error::Result;
use crate::types::StructureNode;

/// Discovered channels keyed by their server-side name.
///
/// Holds at most one entry; empty when the channel was not found.
pub type ChannelStructure = BTreeMap<String, StructureNode>;

/// Discover the top-level object whose name matches `channel_name`
/// case-insensitively.
///
/// Never fails: a missing channel and any browse error both yield an empty
/// map. Errors are logged here and not propagated.
pub fn discover_channel<C>(client: &C, channel_name: &str) -> ChannelStructure
where
    C: AddressSpaceClient + ?Sized,
{
    match try_discover_channel(client, channel_name) {
        Ok(structure) => {
            if structure.is_empty() {
                tracing::info!("Channel '{}' not found in address space", channel_name);
            }
            structure
        }
        Err(e) if e.is_connection_fault() => {
            tracing::warn!("Address space server unavailable: {}", e);
            ChannelStructure::new()
        }
        Err(e) => {
            tracing::warn!("Error fetching address space structure: {}", e);
            ChannelStructure::new()
        }
    }
}

fn try_discover_channel<C>(client: &C, channel_name: &str) -> Result<ChannelStructure>
where
    C: AddressSpaceClient + ?Sized,
{
    let mut structure = ChannelStructure::new();
    let root = client.objects_root()?;
    let wanted = channel_name.to_lowercase();

    for channel in client.list_children(&root)? {
        let name = client.browse_name(&channel)?;
        if name.to_lowercase() != wanted {
            continue;
        }
        let node = discover(client, &channel)?;
        tracing::debug!("Discovered channel '{}' with {} tags", name, node.total_tags());
        structure.insert(name, node);
        break;
    }

    Ok(structure)
}
