//! Structured record of everything the engine decided or discarded while
//! building a document. Returned next to the document, never part of it.

use crate::model::{DeviceCategory, DeviceId, EdgeId, SiteId};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Device,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Role,
    Model,
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub field: MatchField,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeMode {
    Physical,
    Synthesized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    SelfLoop,
    DuplicateId,
    /// Resolved, but one of its sites fell back to synthesis.
    UntrustedSite,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    #[serde(rename_all = "camelCase")]
    MalformedRecord {
        record: RecordKind,
        index: usize,
        id: Option<u64>,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    Classified {
        device_id: DeviceId,
        category: DeviceCategory,
        matched: Option<RuleMatch>,
    },
    #[serde(rename_all = "camelCase")]
    UnresolvableEdge {
        edge_id: EdgeId,
        site_id: Option<SiteId>,
        endpoint: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    DroppedEdge { edge_id: EdgeId, reason: DropReason },
    #[serde(rename_all = "camelCase")]
    EdgeMode {
        site_id: SiteId,
        mode: EdgeMode,
        edges: usize,
    },
    #[serde(rename_all = "camelCase")]
    Truncated { limit: usize, dropped: usize },
    #[serde(rename_all = "camelCase")]
    LayoutRecomputed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub devices_queried: usize,
    pub devices_processed: usize,
    pub devices_without_site: usize,
    pub malformed_records: usize,
    pub unresolvable_edges: usize,
    pub dropped_edges: usize,
    pub truncated_devices: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub category_counts: BTreeMap<DeviceCategory, usize>,
    pub events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Diagnostic) {
        match &event {
            Diagnostic::MalformedRecord { .. } => self.malformed_records += 1,
            Diagnostic::UnresolvableEdge { .. } => self.unresolvable_edges += 1,
            Diagnostic::DroppedEdge { .. } => self.dropped_edges += 1,
            Diagnostic::Truncated { dropped, .. } => self.truncated_devices += dropped,
            Diagnostic::Classified { category, .. } => {
                *self.category_counts.entry(*category).or_insert(0) += 1;
            }
            Diagnostic::EdgeMode { .. } | Diagnostic::LayoutRecomputed { .. } => {}
        }
        self.events.push(event);
    }

    pub fn record_status(&mut self, status: Option<&str>) {
        let key = status.unwrap_or("unknown").to_string();
        *self.status_counts.entry(key).or_insert(0) += 1;
    }

    pub fn edge_mode(&self, site_id: SiteId) -> Option<EdgeMode> {
        self.events.iter().find_map(|event| match event {
            Diagnostic::EdgeMode {
                site_id: id, mode, ..
            } if *id == site_id => Some(*mode),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter()
    }
}
