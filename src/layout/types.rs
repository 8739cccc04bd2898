use crate::model::{DeviceId, SiteId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Interior overlap. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteLayout {
    pub site_id: SiteId,
    pub site_name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Size floor from the site's device rows; resize never goes below it.
    pub min_width: f32,
    pub min_height: f32,
}

impl SiteLayout {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn with_rect(&self, rect: Rect) -> SiteLayout {
        SiteLayout {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            ..self.clone()
        }
    }
}

/// Device centre, relative to the owning site's origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePosition {
    pub device_id: DeviceId,
    pub site_id: SiteId,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub sites: Vec<SiteLayout>,
    pub devices: Vec<DevicePosition>,
    pub width: f32,
    pub height: f32,
}
