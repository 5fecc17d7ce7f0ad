//! Test data builders for simulated plants

use tagbridge_rs::backend::{SimulatedAddressSpace, OBJECTS_FOLDER_ID};
use tagbridge_rs::types::{DataKind, TagValue};

/// Builds a [`SimulatedAddressSpace`] from slash-separated paths below one channel.
///
/// Node ids follow the `ns=2;s=<channel>.<dotted path>` convention, so
/// `boolean("pump/running", true)` under channel `stroi` creates
/// `ns=2;s=stroi.pump.running`.
pub struct PlantBuilder {
    channel: String,
    space: SimulatedAddressSpace,
}

impl PlantBuilder {
    pub fn new(channel: &str) -> Self {
        let space = SimulatedAddressSpace::new().with_folder(
            OBJECTS_FOLDER_ID,
            &channel_id(channel),
            channel,
        );
        Self {
            channel: channel.to_string(),
            space,
        }
    }

    /// Node id of a path below the channel
    pub fn id(&self, path: &str) -> String {
        node_id(&self.channel, path)
    }

    pub fn folder(mut self, path: &str) -> Self {
        let (parent, name) = self.split(path);
        let id = self.id(path);
        self.space = self.space.with_folder(&parent, &id, &name);
        self
    }

    pub fn boolean(self, path: &str, value: bool) -> Self {
        self.variable(path, Some(DataKind::Boolean), Some(TagValue::Boolean(value)))
    }

    pub fn analog(self, path: &str, value: f64) -> Self {
        self.variable(path, Some(DataKind::Double), Some(TagValue::Float(value)))
    }

    pub fn integer(self, path: &str, value: i64) -> Self {
        self.variable(path, Some(DataKind::Int32), Some(TagValue::Integer(value)))
    }

    pub fn variable(mut self, path: &str, kind: Option<DataKind>, value: Option<TagValue>) -> Self {
        let (parent, name) = self.split(path);
        let id = self.id(path);
        self.space = self.space.with_variable(&parent, &id, &name, kind, value);
        self
    }

    /// Add a sibling top-level folder next to the channel
    pub fn other_channel(mut self, name: &str) -> Self {
        self.space = self
            .space
            .with_folder(OBJECTS_FOLDER_ID, &channel_id(name), name);
        self
    }

    pub fn build(self) -> SimulatedAddressSpace {
        self.space
    }

    fn split(&self, path: &str) -> (String, String) {
        match path.rsplit_once('/') {
            Some((parent, name)) => (self.id(parent), name.to_string()),
            None => (channel_id(&self.channel), path.to_string()),
        }
    }
}

fn channel_id(channel: &str) -> String {
    format!("ns=2;s={}", channel)
}

fn node_id(channel: &str, path: &str) -> String {
    format!("ns=2;s={}.{}", channel, path.replace('/', "."))
}

/// Reference plant used across the integration tests:
///
/// ```text
/// stroi
/// +-- pump
/// |   +-- running   bool  true
/// |   +-- speed     f64   1450.5
/// |   +-- motor
/// |       +-- current  i32  12
/// +-- level         f64   3.25
/// +-- spare         (empty folder, reported as a tag)
/// ```
pub fn reference_plant() -> SimulatedAddressSpace {
    PlantBuilder::new("stroi")
        .folder("pump")
        .boolean("pump/running", true)
        .analog("pump/speed", 1450.5)
        .folder("pump/motor")
        .integer("pump/motor/current", 12)
        .analog("level", 3.25)
        .folder("spare")
        .other_channel("Utilities")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_builder_ids() {
        let builder = PlantBuilder::new("stroi");
        assert_eq!(builder.id("pump/running"), "ns=2;s=stroi.pump.running");
    }
}
