use crate::config::LayoutConfig;
use crate::model::{ClassifiedDevice, DeviceCategory, DeviceId, Layer, SiteId};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Devices of one site, borrowed from the classified snapshot.
#[derive(Debug, Clone)]
pub struct SiteDevices<'a> {
    pub site_id: SiteId,
    pub site_name: &'a str,
    pub devices: Vec<&'a ClassifiedDevice>,
}

impl<'a> SiteDevices<'a> {
    /// Devices of `category` in ascending id order.
    pub fn by_category(&self, category: DeviceCategory) -> Vec<&'a ClassifiedDevice> {
        let mut matched: Vec<&'a ClassifiedDevice> = self
            .devices
            .iter()
            .copied()
            .filter(|device| device.category == category)
            .collect();
        matched.sort_by_key(|device| device.id());
        matched
    }
}

/// Groups devices by site, sites in order of first appearance.
pub fn group_by_site(devices: &[ClassifiedDevice]) -> Vec<SiteDevices<'_>> {
    let mut index: HashMap<SiteId, usize> = HashMap::new();
    let mut groups: Vec<SiteDevices<'_>> = Vec::new();
    for device in devices {
        let slot = *index.entry(device.site_id()).or_insert_with(|| {
            groups.push(SiteDevices {
                site_id: device.site_id(),
                site_name: device.record.site_name.as_str(),
                devices: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].devices.push(device);
    }
    groups
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerRow {
    pub layer: Layer,
    pub devices: Vec<DeviceId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteGroup {
    pub site_id: SiteId,
    pub site_name: String,
    /// Ordered by category, then name, then id.
    pub devices: Vec<ClassifiedDevice>,
    /// Non-empty layers only, north to south.
    pub rows: Vec<LayerRow>,
    pub required_width: f32,
    pub required_height: f32,
}

pub fn aggregate(devices: &[ClassifiedDevice], config: &LayoutConfig) -> Vec<SiteGroup> {
    group_by_site(devices)
        .into_iter()
        .map(|site| build_site_group(&site, config))
        .collect()
}

fn build_site_group(site: &SiteDevices<'_>, config: &LayoutConfig) -> SiteGroup {
    let mut devices: Vec<ClassifiedDevice> =
        site.devices.iter().map(|device| (*device).clone()).collect();
    devices.sort_by(compare_devices);

    let mut buckets: [Vec<DeviceId>; 4] = Default::default();
    for device in &devices {
        buckets[device.category.layer().index()].push(device.id());
    }
    let rows: Vec<LayerRow> = Layer::ALL
        .iter()
        .zip(buckets)
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(layer, devices)| LayerRow {
            layer: *layer,
            devices,
        })
        .collect();

    let (required_width, required_height) = required_size(&rows, config);
    SiteGroup {
        site_id: site.site_id,
        site_name: site.site_name.to_string(),
        devices,
        rows,
        required_width,
        required_height,
    }
}

fn compare_devices(a: &ClassifiedDevice, b: &ClassifiedDevice) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| {
            a.record
                .name
                .to_lowercase()
                .cmp(&b.record.name.to_lowercase())
        })
        .then_with(|| a.id().cmp(&b.id()))
}

/// Number of wrapped grid lines a layer of `count` devices occupies.
pub fn grid_lines(count: usize, config: &LayoutConfig) -> usize {
    count.div_ceil(config.row_capacity())
}

/// Width of a single grid line holding `count` devices.
pub fn line_span(count: usize, config: &LayoutConfig) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let count = count as f32;
    count * config.device_diameter() + (count - 1.0) * config.device_gap_x
}

/// Height of one layer band: label plus its wrapped device lines.
pub fn layer_height(count: usize, config: &LayoutConfig) -> f32 {
    let lines = grid_lines(count, config);
    if lines == 0 {
        return 0.0;
    }
    let lines_f = lines as f32;
    config.label_height + lines_f * config.device_diameter() + (lines_f - 1.0) * config.device_gap_y
}

/// Canvas size a site needs for its rows, never below the site floor.
pub fn required_size(rows: &[LayerRow], config: &LayoutConfig) -> (f32, f32) {
    let widest = rows
        .iter()
        .map(|row| row.devices.len().min(config.row_capacity()))
        .max()
        .unwrap_or(0);
    let width = config.site_padding_x * 2.0 + line_span(widest, config);

    let bands: f32 = rows
        .iter()
        .map(|row| layer_height(row.devices.len(), config))
        .sum();
    let gaps = rows.len().saturating_sub(1) as f32 * config.layer_gap;
    let height = config.site_padding_top + bands + gaps + config.site_padding_bottom;

    (
        width.max(config.site_min_width),
        height.max(config.site_min_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceRecord;

    fn device(id: u64, site: u64, category: DeviceCategory, name: &str) -> ClassifiedDevice {
        ClassifiedDevice {
            record: DeviceRecord {
                id,
                name: name.to_string(),
                declared_role: None,
                model: None,
                manufacturer: None,
                site_id: site,
                site_name: format!("Site {site}"),
                interface_count: 0,
                status: None,
                primary_ip: None,
            },
            category,
        }
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let devices = vec![
            device(1, 20, DeviceCategory::Core, "a"),
            device(2, 10, DeviceCategory::Core, "b"),
            device(3, 20, DeviceCategory::Access, "c"),
        ];
        let groups = group_by_site(&devices);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].site_id, 20);
        assert_eq!(groups[0].devices.len(), 2);
        assert_eq!(groups[1].site_id, 10);
    }

    #[test]
    fn rows_follow_layer_order_and_merge_service_roles() {
        let devices = vec![
            device(5, 1, DeviceCategory::Server, "srv"),
            device(4, 1, DeviceCategory::Access, "acc"),
            device(3, 1, DeviceCategory::Router, "rtr"),
            device(2, 1, DeviceCategory::Core, "core"),
        ];
        let groups = aggregate(&devices, &LayoutConfig::default());
        let group = &groups[0];
        let layers: Vec<Layer> = group.rows.iter().map(|row| row.layer).collect();
        assert_eq!(layers, vec![Layer::Core, Layer::Access, Layer::Services]);
        assert_eq!(group.rows[2].devices, vec![3, 5]);
        let ordered: Vec<u64> = group.devices.iter().map(|d| d.id()).collect();
        assert_eq!(ordered, vec![2, 4, 3, 5]);
    }

    #[test]
    fn equal_names_fall_back_to_id() {
        let devices = vec![
            device(9, 1, DeviceCategory::Access, "sw"),
            device(3, 1, DeviceCategory::Access, "SW"),
        ];
        let groups = aggregate(&devices, &LayoutConfig::default());
        assert_eq!(groups[0].rows[0].devices, vec![3, 9]);
    }

    #[test]
    fn tiny_site_gets_floor_size() {
        let devices = vec![device(1, 1, DeviceCategory::Other, "x")];
        let config = LayoutConfig::default();
        let groups = aggregate(&devices, &config);
        assert_eq!(groups[0].required_width, config.site_min_width);
        assert_eq!(groups[0].required_height, config.site_min_height);
    }

    #[test]
    fn wide_layer_wraps_at_row_capacity() {
        let config = LayoutConfig::default();
        let devices: Vec<ClassifiedDevice> = (0..14)
            .map(|id| device(id, 1, DeviceCategory::Access, &format!("a{id:02}")))
            .collect();
        let groups = aggregate(&devices, &config);
        // 6 per line: 6*40 + 5*40 + 2*30
        assert_eq!(groups[0].required_width, 500.0);
        // three lines: 50 + 16 + 3*40 + 2*30 + 30
        assert_eq!(groups[0].required_height, 276.0);
        assert_eq!(grid_lines(14, &config), 3);
    }
}
