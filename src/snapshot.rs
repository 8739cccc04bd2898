//! Turns raw host records into validated value snapshots.
//!
//! Nothing here fails outward: records missing an id or a site are excluded
//! and reported, and oversized snapshots are truncated by ascending device id.

use crate::diagnostics::{Diagnostic, Diagnostics, RecordKind};
use crate::model::{DeviceId, DeviceRecord, EdgeId, LinkEnd, RawDevice, RawLink, Snapshot};
use std::collections::{BTreeSet, HashSet};

/// A link record that carries an id. Endpoints are still unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RealLink {
    pub id: EdgeId,
    pub a: LinkEnd,
    pub b: LinkEnd,
    pub cable_type: Option<String>,
    pub status: Option<String>,
    pub length: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedSnapshot {
    pub devices: Vec<DeviceRecord>,
    pub links: Vec<RealLink>,
}

pub fn prepare_snapshot(
    snapshot: &Snapshot,
    max_devices: usize,
    diagnostics: &mut Diagnostics,
) -> PreparedSnapshot {
    diagnostics.devices_queried += snapshot.devices.len();

    let mut devices = Vec::with_capacity(snapshot.devices.len());
    let mut seen: HashSet<DeviceId> = HashSet::new();
    for (index, raw) in snapshot.devices.iter().enumerate() {
        let Some(record) = validate_device(index, raw, diagnostics) else {
            continue;
        };
        if !seen.insert(record.id) {
            diagnostics.push(Diagnostic::MalformedRecord {
                record: RecordKind::Device,
                index,
                id: Some(record.id),
                reason: "duplicate device id".to_string(),
            });
            continue;
        }
        devices.push(record);
    }

    let devices = truncate_devices(devices, max_devices, diagnostics);
    diagnostics.devices_processed += devices.len();
    for device in &devices {
        diagnostics.record_status(device.status.as_deref());
    }

    let links = snapshot
        .links
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| validate_link(index, raw, diagnostics))
        .collect();

    PreparedSnapshot { devices, links }
}

fn validate_device(
    index: usize,
    raw: &RawDevice,
    diagnostics: &mut Diagnostics,
) -> Option<DeviceRecord> {
    let Some(id) = raw.id else {
        diagnostics.push(Diagnostic::MalformedRecord {
            record: RecordKind::Device,
            index,
            id: None,
            reason: "missing id".to_string(),
        });
        return None;
    };
    let Some(site_id) = raw.site_id else {
        diagnostics.devices_without_site += 1;
        diagnostics.push(Diagnostic::MalformedRecord {
            record: RecordKind::Device,
            index,
            id: Some(id),
            reason: "missing site id".to_string(),
        });
        return None;
    };

    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("device-{id}"));
    let site_name = raw
        .site_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Site {site_id}"));

    Some(DeviceRecord {
        id,
        name,
        declared_role: raw.role.clone(),
        model: raw.model.clone(),
        manufacturer: raw.manufacturer.clone(),
        site_id,
        site_name,
        interface_count: raw.interface_count.unwrap_or(0),
        status: raw.status.clone(),
        primary_ip: raw.primary_ip.clone(),
    })
}

/// Keeps the `max_devices` lowest ids, preserving input order among them.
fn truncate_devices(
    devices: Vec<DeviceRecord>,
    max_devices: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<DeviceRecord> {
    if devices.len() <= max_devices {
        return devices;
    }
    let keep: BTreeSet<DeviceId> = devices
        .iter()
        .map(|device| device.id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(max_devices)
        .collect();
    let dropped = devices.len() - keep.len();
    tracing::warn!(
        limit = max_devices,
        dropped,
        "snapshot exceeds device limit, truncating"
    );
    diagnostics.push(Diagnostic::Truncated {
        limit: max_devices,
        dropped,
    });
    devices
        .into_iter()
        .filter(|device| keep.contains(&device.id))
        .collect()
}

fn validate_link(index: usize, raw: &RawLink, diagnostics: &mut Diagnostics) -> Option<RealLink> {
    let Some(id) = raw.id else {
        diagnostics.push(Diagnostic::MalformedRecord {
            record: RecordKind::Link,
            index,
            id: None,
            reason: "missing id".to_string(),
        });
        return None;
    };
    Some(RealLink {
        id,
        a: raw.a.clone(),
        b: raw.b.clone(),
        cable_type: raw.cable_type.clone(),
        status: raw.status.clone(),
        length: raw.length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: Option<u64>, site: Option<u64>) -> RawDevice {
        RawDevice {
            id,
            name: id.map(|id| format!("dev-{id}")),
            site_id: site,
            ..RawDevice::default()
        }
    }

    #[test]
    fn excludes_records_without_id_or_site() {
        let snapshot = Snapshot {
            devices: vec![raw(Some(1), Some(1)), raw(None, Some(1)), raw(Some(3), None)],
            links: vec![RawLink::default()],
            ..Snapshot::default()
        };
        let mut diagnostics = Diagnostics::new();
        let prepared = prepare_snapshot(&snapshot, 100, &mut diagnostics);
        assert_eq!(prepared.devices.len(), 1);
        assert!(prepared.links.is_empty());
        assert_eq!(diagnostics.malformed_records, 3);
        assert_eq!(diagnostics.devices_without_site, 1);
        assert_eq!(diagnostics.devices_queried, 3);
        assert_eq!(diagnostics.devices_processed, 1);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut second = raw(Some(5), Some(2));
        second.name = Some("shadow".to_string());
        let snapshot = Snapshot {
            devices: vec![raw(Some(5), Some(1)), second],
            ..Snapshot::default()
        };
        let mut diagnostics = Diagnostics::new();
        let prepared = prepare_snapshot(&snapshot, 100, &mut diagnostics);
        assert_eq!(prepared.devices.len(), 1);
        assert_eq!(prepared.devices[0].name, "dev-5");
        assert_eq!(prepared.devices[0].site_name, "Site 1");
    }

    #[test]
    fn truncation_keeps_lowest_ids_in_input_order() {
        let snapshot = Snapshot {
            devices: vec![
                raw(Some(9), Some(1)),
                raw(Some(2), Some(1)),
                raw(Some(7), Some(1)),
                raw(Some(4), Some(1)),
            ],
            ..Snapshot::default()
        };
        let mut diagnostics = Diagnostics::new();
        let prepared = prepare_snapshot(&snapshot, 2, &mut diagnostics);
        let ids: Vec<u64> = prepared.devices.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(diagnostics.truncated_devices, 2);
    }
}
