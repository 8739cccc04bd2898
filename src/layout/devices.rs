use super::*;

/// Places a site's devices in north-to-south layer bands. Each band has a
/// label strip followed by wrapped lines of at most `devices_per_row` devices,
/// centred horizontally in the site. Positions are circle centres relative to
/// the site origin.
pub(super) fn place_devices(
    group: &SiteGroup,
    site: &SiteLayout,
    config: &LayoutConfig,
) -> Vec<DevicePosition> {
    let diameter = config.device_diameter();
    let pitch_x = diameter + config.device_gap_x;
    let pitch_y = diameter + config.device_gap_y;
    let capacity = config.row_capacity();
    let inner_left = config.site_padding_x;
    let inner_width = (site.width - config.site_padding_x * 2.0).max(0.0);

    let mut positions = Vec::with_capacity(group.devices.len());
    let mut y_cursor = config.site_padding_top;

    for (band, row) in group.rows.iter().enumerate() {
        if band > 0 {
            y_cursor += config.layer_gap;
        }
        let lines_top = y_cursor + config.label_height;
        for (line, chunk) in row.devices.chunks(capacity).enumerate() {
            let span = line_span(chunk.len(), config);
            let x_start = inner_left + ((inner_width - span) / 2.0).max(0.0);
            let y = lines_top + line as f32 * pitch_y + config.device_radius;
            for (col, device_id) in chunk.iter().enumerate() {
                positions.push(DevicePosition {
                    device_id: *device_id,
                    site_id: group.site_id,
                    x: x_start + col as f32 * pitch_x + config.device_radius,
                    y,
                });
            }
        }
        y_cursor += layer_height(row.devices.len(), config);
    }

    positions
}
