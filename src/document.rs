use crate::layout::{DevicePosition, Layout, SiteLayout};
use crate::model::{ClassifiedDevice, DeviceCategory, DeviceRecord, EdgeKind, LogicalEdge};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    #[serde(flatten)]
    pub record: DeviceRecord,
    pub category: DeviceCategory,
    pub icon: String,
}

impl From<&ClassifiedDevice> for DeviceEntry {
    fn from(device: &ClassifiedDevice) -> Self {
        Self {
            record: device.record.clone(),
            category: device.category,
            icon: device.category.icon().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_devices: usize,
    pub total_sites: usize,
    pub total_connections: usize,
    pub physical_connections: usize,
    pub logical_connections: usize,
}

/// The rendering contract handed to the external renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyDocument {
    pub devices: Vec<DeviceEntry>,
    pub edges: Vec<LogicalEdge>,
    pub site_layouts: Vec<SiteLayout>,
    pub device_positions: Vec<DevicePosition>,
    pub width: f32,
    pub height: f32,
    pub stats: Stats,
}

impl TopologyDocument {
    pub fn assemble(devices: &[ClassifiedDevice], edges: Vec<LogicalEdge>, layout: Layout) -> Self {
        let physical = edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Physical)
            .count();
        let stats = Stats {
            total_devices: devices.len(),
            total_sites: layout.sites.len(),
            total_connections: edges.len(),
            physical_connections: physical,
            logical_connections: edges.len() - physical,
        };
        Self {
            devices: devices.iter().map(DeviceEntry::from).collect(),
            edges,
            site_layouts: layout.sites,
            device_positions: layout.devices,
            width: layout.width,
            height: layout.height,
            stats,
        }
    }

    /// A copy carrying `sites` instead of the current site rectangles. The
    /// canvas grows to fit but never shrinks, so a drag does not jitter it.
    pub fn with_site_layouts(&self, sites: Vec<SiteLayout>) -> Self {
        let (max_x, max_y) = sites.iter().fold((0.0_f32, 0.0_f32), |(mx, my), site| {
            (mx.max(site.x + site.width), my.max(site.y + site.height))
        });
        Self {
            site_layouts: sites,
            width: self.width.max(max_x),
            height: self.height.max(max_y),
            ..self.clone()
        }
    }
}

pub fn read_document(path: &Path) -> anyhow::Result<TopologyDocument> {
    let file = File::open(path)?;
    let document = serde_json::from_reader(BufReader::new(file))?;
    Ok(document)
}

pub fn write_document(path: &Path, document: &TopologyDocument) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, document)?;
    Ok(())
}
