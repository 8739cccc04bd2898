//! Connection synthesis.
//!
//! Real links are trusted per site, all or nothing: a site keeps its physical
//! links only when it has at least one and every link touching it resolved to
//! known devices. Every other site gets a deterministic logical edge set built
//! from the device categories.

use crate::aggregate::SiteDevices;
use crate::diagnostics::{Diagnostic, Diagnostics, DropReason, EdgeMode};
use crate::model::{
    ClassifiedDevice, DeviceCategory, DeviceId, EdgeId, EdgeKind, InterfaceId, LinkEnd,
    LogicalEdge, RawInterface, SiteId,
};
use crate::snapshot::RealLink;
use std::collections::{HashMap, HashSet};

const DEFAULT_CABLE_TYPE: &str = "ethernet";
const DEFAULT_STATUS: &str = "connected";
const WAN_CABLE_TYPE: &str = "wan";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    pub inter_site_links: bool,
    pub logical_edge_id_base: EdgeId,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            inter_site_links: true,
            logical_edge_id_base: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedEnd {
    device: DeviceId,
    site: SiteId,
    interface: Option<String>,
}

/// Maps link endpoints onto devices of the current snapshot.
struct EndpointIndex<'a> {
    device_sites: HashMap<DeviceId, SiteId>,
    interfaces: HashMap<InterfaceId, &'a RawInterface>,
}

impl<'a> EndpointIndex<'a> {
    fn new(sites: &[SiteDevices<'_>], interfaces: &'a [RawInterface]) -> Self {
        let device_sites = sites
            .iter()
            .flat_map(|site| site.devices.iter().map(|device| (device.id(), site.site_id)))
            .collect();
        let interfaces = interfaces.iter().map(|iface| (iface.id, iface)).collect();
        Self {
            device_sites,
            interfaces,
        }
    }

    /// Device id first, then the interface table.
    fn resolve(&self, end: &LinkEnd) -> Option<ResolvedEnd> {
        let interface = end.interface.and_then(|id| self.interfaces.get(&id));
        if let Some(device) = end.device {
            if let Some(site) = self.device_sites.get(&device) {
                let interface = interface
                    .filter(|iface| iface.device_id == device)
                    .and_then(|iface| iface.name.clone());
                return Some(ResolvedEnd {
                    device,
                    site: *site,
                    interface,
                });
            }
        }
        let iface = interface?;
        let site = self.device_sites.get(&iface.device_id)?;
        Some(ResolvedEnd {
            device: iface.device_id,
            site: *site,
            interface: iface.name.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct SiteLinks {
    resolved: usize,
    tainted: bool,
}

impl SiteLinks {
    fn trusted(&self) -> bool {
        self.resolved > 0 && !self.tainted
    }
}

/// Hands out logical edge ids above every real id seen. Once the id space
/// above the real range runs out, free ids are reused from zero upward.
struct EdgeIds {
    next: Option<EdgeId>,
    reserved: HashSet<EdgeId>,
    reuse: EdgeId,
}

impl EdgeIds {
    fn seeded(reserved: HashSet<EdgeId>, base: EdgeId) -> Self {
        let next = match reserved.iter().max() {
            Some(max_real) => max_real.checked_add(1).map(|floor| floor.max(base)),
            None => Some(base),
        };
        Self {
            next,
            reserved,
            reuse: 0,
        }
    }

    fn take(&mut self) -> EdgeId {
        if let Some(id) = self.next {
            self.next = id.checked_add(1);
            if self.next.is_none() {
                tracing::warn!("logical edge ids exhausted above real ids, reusing free ids");
            }
            return id;
        }
        while self.reserved.contains(&self.reuse) {
            self.reuse = self.reuse.saturating_add(1);
        }
        let id = self.reuse;
        self.reuse = self.reuse.saturating_add(1);
        id
    }
}

pub fn synthesize(
    sites: &[SiteDevices<'_>],
    interfaces: &[RawInterface],
    links: &[RealLink],
    options: &SynthesisOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<LogicalEdge> {
    let index = EndpointIndex::new(sites, interfaces);

    let mut site_links: HashMap<SiteId, SiteLinks> = HashMap::new();
    let mut candidates: Vec<(LogicalEdge, SiteId, SiteId)> = Vec::new();
    let mut seen: HashSet<EdgeId> = HashSet::new();

    for link in links {
        if !seen.insert(link.id) {
            diagnostics.push(Diagnostic::DroppedEdge {
                edge_id: link.id,
                reason: DropReason::DuplicateId,
            });
            continue;
        }
        let a = index.resolve(&link.a);
        let b = index.resolve(&link.b);
        match (a, b) {
            (Some(a), Some(b)) if a.device == b.device => {
                diagnostics.push(Diagnostic::DroppedEdge {
                    edge_id: link.id,
                    reason: DropReason::SelfLoop,
                });
            }
            (Some(a), Some(b)) => {
                site_links.entry(a.site).or_default().resolved += 1;
                if b.site != a.site {
                    site_links.entry(b.site).or_default().resolved += 1;
                }
                let (site_a, site_b) = (a.site, b.site);
                candidates.push((physical_edge(link, a, b), site_a, site_b));
            }
            (Some(known), None) => {
                site_links.entry(known.site).or_default().tainted = true;
                diagnostics.push(Diagnostic::UnresolvableEdge {
                    edge_id: link.id,
                    site_id: Some(known.site),
                    endpoint: "b",
                });
            }
            (None, Some(known)) => {
                site_links.entry(known.site).or_default().tainted = true;
                diagnostics.push(Diagnostic::UnresolvableEdge {
                    edge_id: link.id,
                    site_id: Some(known.site),
                    endpoint: "a",
                });
            }
            (None, None) => {
                diagnostics.push(Diagnostic::UnresolvableEdge {
                    edge_id: link.id,
                    site_id: None,
                    endpoint: "both",
                });
            }
        }
    }

    // A site that loses a real edge to an untrusted neighbour falls back too,
    // which can in turn untrust the sites it links to.
    loop {
        let mut changed = false;
        for (_, site_a, site_b) in &candidates {
            let trusted_a = site_links.get(site_a).is_some_and(SiteLinks::trusted);
            let trusted_b = site_links.get(site_b).is_some_and(SiteLinks::trusted);
            if trusted_a != trusted_b {
                for site in [site_a, site_b] {
                    site_links.entry(*site).or_default().tainted = true;
                }
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    let trusted = |site: SiteId| site_links.get(&site).is_some_and(SiteLinks::trusted);

    let mut edges = Vec::new();
    for (edge, site_a, site_b) in candidates {
        if trusted(site_a) && trusted(site_b) {
            edges.push(edge);
        } else {
            diagnostics.push(Diagnostic::DroppedEdge {
                edge_id: edge.id,
                reason: DropReason::UntrustedSite,
            });
        }
    }

    let mut ids = EdgeIds::seeded(seen, options.logical_edge_id_base);
    let mut synthesized: Vec<&SiteDevices<'_>> = Vec::new();
    for site in sites {
        if trusted(site.site_id) {
            let count = edges
                .iter()
                .filter(|edge| touches_site(edge, site))
                .count();
            diagnostics.push(Diagnostic::EdgeMode {
                site_id: site.site_id,
                mode: EdgeMode::Physical,
                edges: count,
            });
            continue;
        }
        let before = edges.len();
        synthesize_site(site, &mut ids, &mut edges);
        tracing::debug!(
            site_id = site.site_id,
            edges = edges.len() - before,
            "synthesized logical edges"
        );
        diagnostics.push(Diagnostic::EdgeMode {
            site_id: site.site_id,
            mode: EdgeMode::Synthesized,
            edges: edges.len() - before,
        });
        synthesized.push(site);
    }

    if options.inter_site_links {
        link_site_routers(&synthesized, &mut ids, &mut edges);
    }

    edges
}

fn touches_site(edge: &LogicalEdge, site: &SiteDevices<'_>) -> bool {
    site.devices.iter().any(|device| {
        device.id() == edge.source_device_id || device.id() == edge.target_device_id
    })
}

fn physical_edge(link: &RealLink, a: ResolvedEnd, b: ResolvedEnd) -> LogicalEdge {
    LogicalEdge {
        id: link.id,
        source_device_id: a.device,
        target_device_id: b.device,
        kind: EdgeKind::Physical,
        status: link
            .status
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        cable_type: link
            .cable_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CABLE_TYPE.to_string()),
        length: link.length,
        source_interface: a.interface,
        target_interface: b.interface,
        inter_site: a.site != b.site,
    }
}

fn logical_edge(id: EdgeId, source: DeviceId, target: DeviceId) -> LogicalEdge {
    LogicalEdge {
        id,
        source_device_id: source,
        target_device_id: target,
        kind: EdgeKind::Logical,
        status: DEFAULT_STATUS.to_string(),
        cable_type: DEFAULT_CABLE_TYPE.to_string(),
        length: None,
        source_interface: None,
        target_interface: None,
        inter_site: false,
    }
}

fn connect(ids: &mut EdgeIds, edges: &mut Vec<LogicalEdge>, source: DeviceId, target: DeviceId) {
    if source == target {
        return;
    }
    edges.push(logical_edge(ids.take(), source, target));
}

fn synthesize_site(site: &SiteDevices<'_>, ids: &mut EdgeIds, edges: &mut Vec<LogicalEdge>) {
    let cores = site.by_category(DeviceCategory::Core);
    let distributions = site.by_category(DeviceCategory::Distribution);
    let accesses = site.by_category(DeviceCategory::Access);
    let routers = site.by_category(DeviceCategory::Router);
    let firewalls = site.by_category(DeviceCategory::Firewall);
    let controllers = site.by_category(DeviceCategory::WirelessController);

    for core in &cores {
        for distribution in &distributions {
            connect(ids, edges, core.id(), distribution.id());
        }
    }
    for distribution in &distributions {
        for access in &accesses {
            connect(ids, edges, distribution.id(), access.id());
        }
    }
    for router in &routers {
        if let Some(core) = cores.first() {
            connect(ids, edges, router.id(), core.id());
        }
        if let Some(firewall) = firewalls.first() {
            connect(ids, edges, router.id(), firewall.id());
        }
    }
    let upstream: Option<&&ClassifiedDevice> = distributions.first().or(cores.first());
    if let Some(upstream) = upstream {
        for controller in &controllers {
            connect(ids, edges, controller.id(), upstream.id());
        }
    }
}

/// WAN edges between the first routers of every pair of synthesized sites.
fn link_site_routers(
    sites: &[&SiteDevices<'_>],
    ids: &mut EdgeIds,
    edges: &mut Vec<LogicalEdge>,
) {
    let gateways: Vec<DeviceId> = sites
        .iter()
        .filter_map(|site| site.by_category(DeviceCategory::Router).first().map(|d| d.id()))
        .collect();
    for (i, a) in gateways.iter().enumerate() {
        for b in &gateways[i + 1..] {
            let mut edge = logical_edge(ids.take(), *a, *b);
            edge.cable_type = WAN_CABLE_TYPE.to_string();
            edge.inter_site = true;
            edges.push(edge);
        }
    }
}
