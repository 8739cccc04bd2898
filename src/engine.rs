//! End-to-end pipeline from a raw snapshot to a [`TopologyDocument`].

use crate::aggregate::{aggregate, group_by_site};
use crate::cache::{LayoutCache, snapshot_key};
use crate::classify::Classifier;
use crate::config::Config;
use crate::connect::{SynthesisOptions, synthesize};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::TopologyDocument;
use crate::error::Result;
use crate::layout::compute_layout_with_diagnostics;
use crate::model::{ClassifiedDevice, SiteId, Snapshot};
use crate::mutate::{apply_drag, apply_resize};
use crate::snapshot::prepare_snapshot;

/// The rendering document plus the diagnostics gathered while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    pub document: TopologyDocument,
    pub diagnostics: Diagnostics,
}

pub fn build_document(snapshot: &Snapshot, config: &Config) -> Result<BuildOutput> {
    let classifier = Classifier::new(&config.classifier)?;
    run_pipeline(&classifier, snapshot, config)
}

fn run_pipeline(classifier: &Classifier, snapshot: &Snapshot, config: &Config) -> Result<BuildOutput> {
    let mut diagnostics = Diagnostics::new();
    let prepared = prepare_snapshot(
        snapshot,
        config.engine.max_devices_per_canvas,
        &mut diagnostics,
    );

    let devices: Vec<ClassifiedDevice> = prepared
        .devices
        .into_iter()
        .map(|record| {
            let decision = classifier.explain(&record);
            diagnostics.push(Diagnostic::Classified {
                device_id: record.id,
                category: decision.category,
                matched: decision.matched,
            });
            ClassifiedDevice {
                record,
                category: decision.category,
            }
        })
        .collect();

    let options = SynthesisOptions {
        inter_site_links: config.engine.inter_site_links,
        logical_edge_id_base: config.engine.logical_edge_id_base,
    };
    let edges = {
        let sites = group_by_site(&devices);
        synthesize(
            &sites,
            &snapshot.interfaces,
            &prepared.links,
            &options,
            &mut diagnostics,
        )
    };

    let groups = aggregate(&devices, &config.layout);
    let layout = compute_layout_with_diagnostics(&groups, &config.layout, &mut diagnostics)?;
    let document = TopologyDocument::assemble(&devices, edges, layout);

    tracing::info!(
        devices = document.stats.total_devices,
        sites = document.stats.total_sites,
        edges = document.stats.total_connections,
        "topology document built"
    );
    Ok(BuildOutput {
        document,
        diagnostics,
    })
}

/// Long-lived front end holding compiled patterns and, when enabled, a cache
/// of previous builds.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    classifier: Classifier,
    cache: Option<LayoutCache<BuildOutput>>,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        let classifier = Classifier::new(&config.classifier)?;
        let cache = config
            .engine
            .caching
            .enabled
            .then(|| LayoutCache::new(config.engine.caching.capacity));
        Ok(Self {
            config,
            classifier,
            cache,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build(&mut self, snapshot: &Snapshot) -> Result<BuildOutput> {
        let Some(cache) = self.cache.as_mut() else {
            return run_pipeline(&self.classifier, snapshot, &self.config);
        };
        let key = snapshot_key(snapshot, &self.config);
        if let Some(hit) = cache.get(&key) {
            tracing::debug!(key = key.hash(), "layout cache hit");
            return Ok(hit);
        }
        let output = run_pipeline(&self.classifier, snapshot, &self.config)?;
        cache.insert(key, output.clone());
        Ok(output)
    }

    pub fn drag(
        &self,
        document: &TopologyDocument,
        site_id: SiteId,
        dx: f32,
        dy: f32,
    ) -> Result<TopologyDocument> {
        let sites = apply_drag(&document.site_layouts, site_id, dx, dy, &self.config.layout)?;
        Ok(document.with_site_layouts(sites))
    }

    pub fn resize(
        &self,
        document: &TopologyDocument,
        site_id: SiteId,
        width: f32,
        height: f32,
    ) -> Result<TopologyDocument> {
        let sites = apply_resize(
            &document.site_layouts,
            site_id,
            width,
            height,
            &self.config.layout,
        )?;
        Ok(document.with_site_layouts(sites))
    }

    pub fn cached_builds(&self) -> usize {
        self.cache.as_ref().map_or(0, LayoutCache::len)
    }
}
