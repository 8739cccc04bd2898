mod devices;
mod sites;
pub(crate) mod types;
mod validate;
pub use types::*;
pub use validate::{validate_devices, validate_sites};
use devices::*;
use sites::*;

use crate::aggregate::{SiteGroup, layer_height, line_span};
use crate::config::LayoutConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};

/// Site rectangles and device positions for `groups`, in input order.
pub fn compute_layout(groups: &[SiteGroup], config: &LayoutConfig) -> Result<Layout> {
    compute_layout_with_diagnostics(groups, config, &mut Diagnostics::new())
}

/// As [`compute_layout`], recording a recompute in `diagnostics`. A layout
/// that fails validation is rebuilt once from scratch; a second failure is
/// returned as an error instead of emitting an invalid layout.
pub fn compute_layout_with_diagnostics(
    groups: &[SiteGroup],
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> Result<Layout> {
    let first = build_layout(groups, config);
    let Err(err) = validate_layout(&first, config) else {
        return Ok(first);
    };

    tracing::warn!(error = %err, "layout failed validation, recomputing");
    diagnostics.push(Diagnostic::LayoutRecomputed {
        reason: err.to_string(),
    });
    let second = build_layout(groups, config);
    validate_layout(&second, config)?;
    Ok(second)
}

fn build_layout(groups: &[SiteGroup], config: &LayoutConfig) -> Layout {
    let sites = place_sites(groups, config);
    let devices = groups
        .iter()
        .zip(&sites)
        .flat_map(|(group, site)| place_devices(group, site, config))
        .collect();
    let (width, height) = canvas_size(&sites, config);
    Layout {
        sites,
        devices,
        width,
        height,
    }
}

fn validate_layout(layout: &Layout, config: &LayoutConfig) -> Result<()> {
    validate_sites(&layout.sites, config)?;
    validate_devices(&layout.sites, &layout.devices, config)
}
