//! Bounded interactive edits on a computed layout.
//!
//! Both operations return a new site sequence and leave the input untouched.
//! Device positions are not recomputed; a resized site keeps its devices
//! where they were until the caller asks for a fresh layout.

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::layout::{Rect, SiteLayout, validate_sites};
use crate::model::SiteId;

/// Translates a site by `(dx, dy)`, stopping at the first contact with another
/// site or the canvas origin along the drag vector.
pub fn apply_drag(
    sites: &[SiteLayout],
    site_id: SiteId,
    dx: f32,
    dy: f32,
    config: &LayoutConfig,
) -> Result<Vec<SiteLayout>> {
    finite("dx", dx)?;
    finite("dy", dy)?;
    let index = position_of(sites, site_id)?;
    let start = sites[index].rect();

    let mut t = 1.0_f32;
    if dx < 0.0 {
        t = t.min(start.x.max(0.0) / -dx);
    }
    if dy < 0.0 {
        t = t.min(start.y.max(0.0) / -dy);
    }
    for (other_index, other) in sites.iter().enumerate() {
        if other_index == index {
            continue;
        }
        if let Some(entry) = sweep_entry(&start, dx, dy, &other.rect()) {
            t = t.min(entry);
        }
    }
    let t = t.clamp(0.0, 1.0);
    if t < 1.0 {
        tracing::debug!(site_id, dx, dy, t, "drag clamped");
    }

    let mut moved = start.translated(dx * t, dy * t);
    if dx < 0.0 && start.x >= 0.0 {
        moved.x = moved.x.max(0.0);
    }
    if dy < 0.0 && start.y >= 0.0 {
        moved.y = moved.y.max(0.0);
    }
    for (other_index, other) in sites.iter().enumerate() {
        if other_index != index {
            moved = settle(moved, dx, dy, &other.rect());
        }
    }
    let mut next = sites.to_vec();
    next[index] = sites[index].with_rect(moved);
    validate_sites(&next, config)?;
    Ok(next)
}

/// Resizes a site anchored at its top-left corner. The size is clamped to the
/// site's own floor and the configured maximum, then shrunk until it clears
/// every neighbour.
pub fn apply_resize(
    sites: &[SiteLayout],
    site_id: SiteId,
    new_width: f32,
    new_height: f32,
    config: &LayoutConfig,
) -> Result<Vec<SiteLayout>> {
    finite("width", new_width)?;
    finite("height", new_height)?;
    let index = position_of(sites, site_id)?;
    let current = &sites[index];

    let min_width = current.min_width.max(config.site_min_width);
    let min_height = current.min_height.max(config.site_min_height);
    let max_width = config.site_max_width.max(min_width);
    let max_height = config.site_max_height.max(min_height);

    let mut rect = Rect {
        width: new_width.clamp(min_width, max_width),
        height: new_height.clamp(min_height, max_height),
        ..current.rect()
    };

    // Each pass removes at least one conflict, so this terminates.
    for _ in 0..=sites.len() {
        let Some(other) = sites
            .iter()
            .enumerate()
            .find(|(i, other)| *i != index && rect.intersects(&other.rect()))
            .map(|(_, other)| other.rect())
        else {
            break;
        };
        rect = shrink_to_clear(rect, &other, current, min_width, min_height);
    }

    if rect.width != new_width || rect.height != new_height {
        tracing::debug!(
            site_id,
            requested_width = new_width,
            requested_height = new_height,
            width = rect.width,
            height = rect.height,
            "resize clamped"
        );
    }

    let mut next = sites.to_vec();
    next[index] = current.with_rect(rect);
    validate_sites(&next, config)?;
    Ok(next)
}

fn finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidDimension { name, value })
    }
}

fn position_of(sites: &[SiteLayout], site_id: SiteId) -> Result<usize> {
    sites
        .iter()
        .position(|site| site.site_id == site_id)
        .ok_or(Error::UnknownSite(site_id))
}

/// Fraction of the move at which `moving` first overlaps `obstacle`'s interior,
/// or `None` if the swept path stays clear.
fn sweep_entry(moving: &Rect, dx: f32, dy: f32, obstacle: &Rect) -> Option<f32> {
    let (x_entry, x_exit) = axis_window(moving.x, moving.right(), dx, obstacle.x, obstacle.right())?;
    let (y_entry, y_exit) = axis_window(moving.y, moving.bottom(), dy, obstacle.y, obstacle.bottom())?;
    let entry = x_entry.max(y_entry);
    let exit = x_exit.min(y_exit);
    if entry >= exit || entry >= 1.0 || exit <= 0.0 {
        return None;
    }
    Some(entry.max(0.0))
}

/// Interval of move fractions during which the open intervals
/// `(lo, hi) + t * d` and `(other_lo, other_hi)` overlap on one axis.
fn axis_window(lo: f32, hi: f32, d: f32, other_lo: f32, other_hi: f32) -> Option<(f32, f32)> {
    if d == 0.0 {
        if lo < other_hi && other_lo < hi {
            return Some((f32::NEG_INFINITY, f32::INFINITY));
        }
        return None;
    }
    let a = (other_lo - hi) / d;
    let b = (other_hi - lo) / d;
    Some((a.min(b), a.max(b)))
}

/// Rounding in `dx * t` can leave a contact a hair inside the obstacle; push
/// back out along the axis with the smaller penetration, against the motion.
fn settle(rect: Rect, dx: f32, dy: f32, obstacle: &Rect) -> Rect {
    if !rect.intersects(obstacle) {
        return rect;
    }
    let x_depth = if dx > 0.0 {
        rect.right() - obstacle.x
    } else if dx < 0.0 {
        obstacle.right() - rect.x
    } else {
        f32::INFINITY
    };
    let y_depth = if dy > 0.0 {
        rect.bottom() - obstacle.y
    } else if dy < 0.0 {
        obstacle.bottom() - rect.y
    } else {
        f32::INFINITY
    };
    if x_depth.is_infinite() && y_depth.is_infinite() {
        return rect;
    }
    if x_depth <= y_depth {
        let x = if dx > 0.0 {
            obstacle.x - rect.width
        } else {
            obstacle.right()
        };
        Rect { x, ..rect }
    } else {
        let y = if dy > 0.0 {
            obstacle.y - rect.height
        } else {
            obstacle.bottom()
        };
        Rect { y, ..rect }
    }
}

fn shrink_to_clear(
    rect: Rect,
    other: &Rect,
    current: &SiteLayout,
    min_width: f32,
    min_height: f32,
) -> Rect {
    let width_cap = other.x - rect.x;
    let height_cap = other.y - rect.y;
    let by_width = (width_cap >= min_width).then(|| Rect {
        width: width_cap.min(rect.width),
        ..rect
    });
    let by_height = (height_cap >= min_height).then(|| Rect {
        height: height_cap.min(rect.height),
        ..rect
    });
    let area = |r: &Rect| r.width * r.height;
    match (by_width, by_height) {
        (Some(w), Some(h)) => {
            if area(&w) >= area(&h) {
                w
            } else {
                h
            }
        }
        (Some(w), None) => w,
        (None, Some(h)) => h,
        // The previous rectangle was clear, so anything inside it is too.
        (None, None) => Rect {
            width: rect.width.min(current.width),
            height: rect.height.min(current.height),
            ..rect
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(site_id: u64, x: f32, y: f32, width: f32, height: f32) -> SiteLayout {
        SiteLayout {
            site_id,
            site_name: format!("Site {site_id}"),
            x,
            y,
            width,
            height,
            min_width: width,
            min_height: height,
        }
    }

    fn pair() -> Vec<SiteLayout> {
        vec![
            site(1, 40.0, 40.0, 300.0, 200.0),
            site(2, 400.0, 40.0, 300.0, 200.0),
        ]
    }

    #[test]
    fn free_drag_moves_exactly() {
        let config = LayoutConfig::default();
        let next = apply_drag(&pair(), 1, 10.0, 300.0, &config).unwrap();
        assert_eq!((next[0].x, next[0].y), (50.0, 340.0));
        assert_eq!(next[1], pair()[1]);
    }

    #[test]
    fn drag_into_neighbour_stops_at_contact() {
        let config = LayoutConfig::default();
        let next = apply_drag(&pair(), 1, 200.0, 0.0, &config).unwrap();
        assert_eq!(next[0].x, 100.0);
        assert!(!next[0].rect().intersects(&next[1].rect()));
    }

    #[test]
    fn diagonal_drag_stops_on_the_vector() {
        let config = LayoutConfig::default();
        let next = apply_drag(&pair(), 1, 120.0, 60.0, &config).unwrap();
        // contact at 60 of 120 in x, i.e. half the vector
        assert_eq!((next[0].x, next[0].y), (100.0, 70.0));
    }

    #[test]
    fn drag_is_bounded_by_canvas_origin() {
        let config = LayoutConfig::default();
        let next = apply_drag(&pair(), 1, -100.0, -20.0, &config).unwrap();
        assert_eq!((next[0].x, next[0].y), (0.0, 32.0));
    }

    #[test]
    fn unknown_site_is_an_error() {
        let config = LayoutConfig::default();
        let err = apply_drag(&pair(), 9, 1.0, 1.0, &config).unwrap_err();
        assert!(matches!(err, Error::UnknownSite(9)));
        let err = apply_resize(&pair(), 1, f32::NAN, 10.0, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { name: "width", .. }));
    }

    #[test]
    fn resize_respects_site_floor() {
        let config = LayoutConfig::default();
        let mut sites = pair();
        sites[0].min_width = 650.0;
        sites[0].width = 650.0;
        sites[1].x = 800.0;
        let next = apply_resize(&sites, 1, 400.0, 200.0, &config).unwrap();
        assert_eq!(next[0].width, 650.0);
    }

    #[test]
    fn resize_caps_at_configured_maximum() {
        let config = LayoutConfig::default();
        let sites = vec![site(1, 40.0, 40.0, 300.0, 200.0)];
        let next = apply_resize(&sites, 1, 9000.0, 9000.0, &config).unwrap();
        assert_eq!((next[0].width, next[0].height), (2400.0, 1800.0));
    }

    #[test]
    fn resize_stops_short_of_neighbour() {
        let config = LayoutConfig::default();
        let next = apply_resize(&pair(), 1, 500.0, 260.0, &config).unwrap();
        assert_eq!((next[0].width, next[0].height), (360.0, 260.0));
        assert!(!next[0].rect().intersects(&next[1].rect()));
    }

    #[test]
    fn input_layout_is_untouched() {
        let config = LayoutConfig::default();
        let sites = pair();
        let _ = apply_resize(&sites, 1, 350.0, 250.0, &config).unwrap();
        assert_eq!(sites, pair());
    }
}
