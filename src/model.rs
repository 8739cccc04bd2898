//! Value types shared by every stage of the pipeline.
//!
//! Raw records (`RawDevice`, `RawLink`, `RawInterface`) mirror what a host
//! inventory system hands over and may be incomplete. They are validated into
//! `DeviceRecord`s by [`crate::snapshot`] before any classification happens.

use serde::{Deserialize, Serialize};

pub type DeviceId = u64;
pub type SiteId = u64;
pub type EdgeId = u64;
pub type InterfaceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceCategory {
    Core,
    Distribution,
    Access,
    Router,
    Firewall,
    Server,
    WirelessController,
    Other,
}

impl DeviceCategory {
    pub const ALL: [DeviceCategory; 8] = [
        DeviceCategory::Core,
        DeviceCategory::Distribution,
        DeviceCategory::Access,
        DeviceCategory::Router,
        DeviceCategory::Firewall,
        DeviceCategory::Server,
        DeviceCategory::WirelessController,
        DeviceCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceCategory::Core => "core",
            DeviceCategory::Distribution => "distribution",
            DeviceCategory::Access => "access",
            DeviceCategory::Router => "router",
            DeviceCategory::Firewall => "firewall",
            DeviceCategory::Server => "server",
            DeviceCategory::WirelessController => "wireless-controller",
            DeviceCategory::Other => "other",
        }
    }

    /// Row band the category is drawn in inside its site container.
    pub fn layer(self) -> Layer {
        match self {
            DeviceCategory::Core => Layer::Core,
            DeviceCategory::Distribution => Layer::Distribution,
            DeviceCategory::Access => Layer::Access,
            DeviceCategory::Router
            | DeviceCategory::Firewall
            | DeviceCategory::Server
            | DeviceCategory::WirelessController
            | DeviceCategory::Other => Layer::Services,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            DeviceCategory::Core | DeviceCategory::Distribution | DeviceCategory::Access => "⚡",
            DeviceCategory::Router => "🔀",
            DeviceCategory::Firewall => "🛡️",
            DeviceCategory::Server => "💻",
            DeviceCategory::WirelessController => "📶",
            DeviceCategory::Other => "❓",
        }
    }
}

/// Hierarchy bands, north to south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Core,
    Distribution,
    Access,
    Services,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Core, Layer::Distribution, Layer::Access, Layer::Services];

    pub fn index(self) -> usize {
        match self {
            Layer::Core => 0,
            Layer::Distribution => 1,
            Layer::Access => 2,
            Layer::Services => 3,
        }
    }
}

/// A validated device. `id` and `site_id` are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub site_id: SiteId,
    pub site_name: String,
    #[serde(default)]
    pub interface_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedDevice {
    pub record: DeviceRecord,
    pub category: DeviceCategory,
}

impl ClassifiedDevice {
    pub fn id(&self) -> DeviceId {
        self.record.id
    }

    pub fn site_id(&self) -> SiteId {
        self.record.site_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Physical,
    Logical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalEdge {
    pub id: EdgeId,
    pub source_device_id: DeviceId,
    pub target_device_id: DeviceId,
    pub kind: EdgeKind,
    pub status: String,
    pub cable_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_interface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_interface: Option<String>,
    #[serde(default)]
    pub inter_site: bool,
}

/// Device record as supplied by the host inventory. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDevice {
    pub id: Option<DeviceId>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub site_id: Option<SiteId>,
    pub site_name: Option<String>,
    pub interface_count: Option<u32>,
    pub status: Option<String>,
    pub primary_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInterface {
    pub id: InterfaceId,
    pub device_id: DeviceId,
    #[serde(default)]
    pub name: Option<String>,
}

/// One end of a host link record. Hosts are inconsistent about whether they
/// reference the device, the interface, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkEnd {
    pub device: Option<DeviceId>,
    pub interface: Option<InterfaceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLink {
    pub id: Option<EdgeId>,
    pub a: LinkEnd,
    pub b: LinkEnd,
    pub cable_type: Option<String>,
    pub status: Option<String>,
    pub length: Option<f64>,
}

/// Everything one engine invocation sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub devices: Vec<RawDevice>,
    pub interfaces: Vec<RawInterface>,
    pub links: Vec<RawLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_layer_collects_edge_roles() {
        for category in [
            DeviceCategory::Router,
            DeviceCategory::Firewall,
            DeviceCategory::Server,
            DeviceCategory::WirelessController,
            DeviceCategory::Other,
        ] {
            assert_eq!(category.layer(), Layer::Services);
        }
        assert_eq!(DeviceCategory::Access.layer(), Layer::Access);
    }

    #[test]
    fn snapshot_accepts_partial_records() {
        let json = r#"{
            "devices": [{"id": 1, "name": "core-1", "siteId": 7}, {"name": "orphan"}],
            "links": [{"id": 3, "a": {"device": 1}, "b": {"interface": 40}}]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.devices.len(), 2);
        assert_eq!(snapshot.devices[1].id, None);
        assert_eq!(snapshot.links[0].b.interface, Some(40));
        assert!(snapshot.interfaces.is_empty());
    }

    #[test]
    fn category_serializes_kebab_case() {
        let value = serde_json::to_string(&DeviceCategory::WirelessController).unwrap();
        assert_eq!(value, "\"wireless-controller\"");
    }
}
