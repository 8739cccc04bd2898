use super::*;

/// Places site containers left to right, wrapping when a row would exceed
/// `canvas_max_row_width`. Each cell is sized from its own site, so rows never
/// overlap: x advances by width plus spacing, y by the tallest site in the
/// finished row plus spacing.
pub(super) fn place_sites(groups: &[SiteGroup], config: &LayoutConfig) -> Vec<SiteLayout> {
    let origin = config.canvas_margin;
    let row_limit = origin + config.canvas_max_row_width;

    let mut x_cursor = origin;
    let mut y_cursor = origin;
    let mut row_height = 0.0_f32;
    let mut row_len = 0usize;
    let mut sites = Vec::with_capacity(groups.len());

    for group in groups {
        let width = group.required_width.max(config.site_min_width);
        let height = group.required_height.max(config.site_min_height);

        if row_len > 0 && x_cursor + width > row_limit {
            x_cursor = origin;
            y_cursor += row_height + config.site_spacing;
            row_height = 0.0;
            row_len = 0;
        }

        sites.push(SiteLayout {
            site_id: group.site_id,
            site_name: group.site_name.clone(),
            x: x_cursor,
            y: y_cursor,
            width,
            height,
            min_width: width,
            min_height: height,
        });

        x_cursor += width + config.site_spacing;
        row_height = row_height.max(height);
        row_len += 1;
    }

    sites
}

/// Canvas extent covering every site plus the margin on the far sides.
pub(super) fn canvas_size(sites: &[SiteLayout], config: &LayoutConfig) -> (f32, f32) {
    let (max_x, max_y) = sites.iter().fold((0.0_f32, 0.0_f32), |(mx, my), site| {
        (mx.max(site.x + site.width), my.max(site.y + site.height))
    });
    (max_x + config.canvas_margin, max_y + config.canvas_margin)
}
