use super::*;

/// Checks the site invariants: finite geometry, the configured size floor,
/// the per-site floor, and pairwise non-overlap.
pub fn validate_sites(sites: &[SiteLayout], config: &LayoutConfig) -> Result<()> {
    for site in sites {
        let values = [site.x, site.y, site.width, site.height];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(Error::constraint(site.site_id, "non-finite geometry"));
        }
        if site.width < config.site_min_width || site.height < config.site_min_height {
            return Err(Error::constraint(
                site.site_id,
                format!(
                    "size {}x{} below floor {}x{}",
                    site.width, site.height, config.site_min_width, config.site_min_height
                ),
            ));
        }
        if site.width < site.min_width || site.height < site.min_height {
            return Err(Error::constraint(
                site.site_id,
                format!(
                    "size {}x{} below required {}x{}",
                    site.width, site.height, site.min_width, site.min_height
                ),
            ));
        }
    }

    for (i, a) in sites.iter().enumerate() {
        let rect = a.rect();
        if let Some(b) = sites[i + 1..]
            .iter()
            .find(|other| rect.intersects(&other.rect()))
        {
            return Err(Error::constraint(
                a.site_id,
                format!("overlaps site {}", b.site_id),
            ));
        }
    }
    Ok(())
}

/// Every device circle must sit inside its site's padded interior.
pub fn validate_devices(
    sites: &[SiteLayout],
    devices: &[DevicePosition],
    config: &LayoutConfig,
) -> Result<()> {
    let r = config.device_radius;
    for position in devices {
        let Some(site) = sites.iter().find(|site| site.site_id == position.site_id) else {
            return Err(Error::constraint(
                position.site_id,
                format!("device {} placed in unknown site", position.device_id),
            ));
        };
        let inside = position.x - r >= config.site_padding_x
            && position.x + r <= site.width - config.site_padding_x
            && position.y - r >= config.site_padding_top
            && position.y + r <= site.height - config.site_padding_bottom;
        if !inside {
            return Err(Error::constraint(
                site.site_id,
                format!("device {} outside site interior", position.device_id),
            ));
        }
    }
    Ok(())
}
