use serde::{Deserialize, Serialize};
use std::path::Path;

const SWITCH_FAMILY_TOKENS: [&str; 5] = ["switch", "catalyst", "nexus", "ex-", "qfx"];

const DISTRIBUTION_MODEL_TOKENS: [&str; 6] = [
    "distribution",
    "aggregation",
    "catalyst 9500",
    "catalyst 9400",
    r"nexus 9[35]\d\d",
    "qfx",
];

const ACCESS_MODEL_TOKENS: [&str; 6] = [
    "access",
    "catalyst 9200",
    "catalyst 9300",
    "catalyst 2960",
    "ex2300",
    "ex3400",
];

const ROUTER_MODEL_TOKENS: [&str; 5] = ["router", "isr", "asr", "mx-", "srx"];

const FIREWALL_MODEL_TOKENS: [&str; 5] = ["firewall", "pa-", "asa", "fortigate", "security"];

const SERVER_MODEL_TOKENS: [&str; 5] = ["server", "poweredge", "proliant", "vm", "virtual"];

const WIRELESS_MODEL_TOKENS: [&str; 5] = ["ap-", "access point", "wireless", "wifi", "aironet"];

const WIRELESS_NAME_TOKENS: [&str; 1] = ["ap"];

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|value| value.to_string()).collect()
}

/// Model-token pattern lists used by the role classifier. Every entry is a
/// case-insensitive regular expression; plain words match as substrings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub switch_family_tokens: Vec<String>,
    pub distribution_model_tokens: Vec<String>,
    pub access_model_tokens: Vec<String>,
    pub router_model_tokens: Vec<String>,
    pub firewall_model_tokens: Vec<String>,
    pub server_model_tokens: Vec<String>,
    pub wireless_model_tokens: Vec<String>,
    pub wireless_name_tokens: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            switch_family_tokens: owned(&SWITCH_FAMILY_TOKENS),
            distribution_model_tokens: owned(&DISTRIBUTION_MODEL_TOKENS),
            access_model_tokens: owned(&ACCESS_MODEL_TOKENS),
            router_model_tokens: owned(&ROUTER_MODEL_TOKENS),
            firewall_model_tokens: owned(&FIREWALL_MODEL_TOKENS),
            server_model_tokens: owned(&SERVER_MODEL_TOKENS),
            wireless_model_tokens: owned(&WIRELESS_MODEL_TOKENS),
            wireless_name_tokens: owned(&WIRELESS_NAME_TOKENS),
        }
    }
}

/// Spacing and size constants. Layout is a pure function of device counts and
/// these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub device_radius: f32,
    pub device_gap_x: f32,
    pub device_gap_y: f32,
    pub devices_per_row: usize,
    pub site_padding_x: f32,
    pub site_padding_top: f32,
    pub site_padding_bottom: f32,
    pub layer_gap: f32,
    pub label_height: f32,
    pub site_min_width: f32,
    pub site_min_height: f32,
    pub site_max_width: f32,
    pub site_max_height: f32,
    pub site_spacing: f32,
    pub canvas_margin: f32,
    pub canvas_max_row_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            device_radius: 20.0,
            device_gap_x: 40.0,
            device_gap_y: 30.0,
            devices_per_row: 6,
            site_padding_x: 30.0,
            site_padding_top: 50.0,
            site_padding_bottom: 30.0,
            layer_gap: 40.0,
            label_height: 16.0,
            site_min_width: 300.0,
            site_min_height: 200.0,
            site_max_width: 2400.0,
            site_max_height: 1800.0,
            site_spacing: 60.0,
            canvas_margin: 40.0,
            canvas_max_row_width: 1600.0,
        }
    }
}

impl LayoutConfig {
    pub fn device_diameter(&self) -> f32 {
        self.device_radius * 2.0
    }

    /// `devices_per_row` with a floor of one so row arithmetic never divides by zero.
    pub fn row_capacity(&self) -> usize {
        self.devices_per_row.max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachingConfig {
    pub enabled: bool,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_devices_per_canvas: usize,
    pub inter_site_links: bool,
    pub logical_edge_id_base: u64,
    pub caching: CachingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_devices_per_canvas: 300,
            inter_site_links: true,
            logical_edge_id_base: 10_000,
            caching: CachingConfig {
                enabled: false,
                capacity: 16,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub layout: LayoutConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachingConfigFile {
    enabled: Option<bool>,
    capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineConfigFile {
    max_devices_per_canvas: Option<usize>,
    inter_site_links: Option<bool>,
    logical_edge_id_base: Option<u64>,
    caching: Option<CachingConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    device_radius: Option<f32>,
    device_gap_x: Option<f32>,
    device_gap_y: Option<f32>,
    devices_per_row: Option<usize>,
    site_padding_x: Option<f32>,
    site_padding_top: Option<f32>,
    site_padding_bottom: Option<f32>,
    layer_gap: Option<f32>,
    label_height: Option<f32>,
    site_min_width: Option<f32>,
    site_min_height: Option<f32>,
    site_max_width: Option<f32>,
    site_max_height: Option<f32>,
    site_spacing: Option<f32>,
    canvas_margin: Option<f32>,
    canvas_max_row_width: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifierConfigFile {
    switch_family_tokens: Option<Vec<String>>,
    distribution_model_tokens: Option<Vec<String>>,
    access_model_tokens: Option<Vec<String>>,
    router_model_tokens: Option<Vec<String>>,
    firewall_model_tokens: Option<Vec<String>>,
    server_model_tokens: Option<Vec<String>>,
    wireless_model_tokens: Option<Vec<String>>,
    wireless_name_tokens: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    // Flat aliases for the options hosts usually set.
    max_devices_per_canvas: Option<usize>,
    site_min_width: Option<f32>,
    site_min_height: Option<f32>,
    engine: Option<EngineConfigFile>,
    layout: Option<LayoutConfigFile>,
    classifier: Option<ClassifierConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON or JSON5 document and overlays it on the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(engine) = parsed.engine {
        if let Some(v) = engine.max_devices_per_canvas {
            config.engine.max_devices_per_canvas = v;
        }
        if let Some(v) = engine.inter_site_links {
            config.engine.inter_site_links = v;
        }
        if let Some(v) = engine.logical_edge_id_base {
            config.engine.logical_edge_id_base = v;
        }
        if let Some(caching) = engine.caching {
            if let Some(v) = caching.enabled {
                config.engine.caching.enabled = v;
            }
            if let Some(v) = caching.capacity {
                config.engine.caching.capacity = v;
            }
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.device_radius {
            target.device_radius = v;
        }
        if let Some(v) = layout.device_gap_x {
            target.device_gap_x = v;
        }
        if let Some(v) = layout.device_gap_y {
            target.device_gap_y = v;
        }
        if let Some(v) = layout.devices_per_row {
            target.devices_per_row = v;
        }
        if let Some(v) = layout.site_padding_x {
            target.site_padding_x = v;
        }
        if let Some(v) = layout.site_padding_top {
            target.site_padding_top = v;
        }
        if let Some(v) = layout.site_padding_bottom {
            target.site_padding_bottom = v;
        }
        if let Some(v) = layout.layer_gap {
            target.layer_gap = v;
        }
        if let Some(v) = layout.label_height {
            target.label_height = v;
        }
        if let Some(v) = layout.site_min_width {
            target.site_min_width = v;
        }
        if let Some(v) = layout.site_min_height {
            target.site_min_height = v;
        }
        if let Some(v) = layout.site_max_width {
            target.site_max_width = v;
        }
        if let Some(v) = layout.site_max_height {
            target.site_max_height = v;
        }
        if let Some(v) = layout.site_spacing {
            target.site_spacing = v;
        }
        if let Some(v) = layout.canvas_margin {
            target.canvas_margin = v;
        }
        if let Some(v) = layout.canvas_max_row_width {
            target.canvas_max_row_width = v;
        }
    }

    if let Some(classifier) = parsed.classifier {
        let target = &mut config.classifier;
        if let Some(v) = classifier.switch_family_tokens {
            target.switch_family_tokens = v;
        }
        if let Some(v) = classifier.distribution_model_tokens {
            target.distribution_model_tokens = v;
        }
        if let Some(v) = classifier.access_model_tokens {
            target.access_model_tokens = v;
        }
        if let Some(v) = classifier.router_model_tokens {
            target.router_model_tokens = v;
        }
        if let Some(v) = classifier.firewall_model_tokens {
            target.firewall_model_tokens = v;
        }
        if let Some(v) = classifier.server_model_tokens {
            target.server_model_tokens = v;
        }
        if let Some(v) = classifier.wireless_model_tokens {
            target.wireless_model_tokens = v;
        }
        if let Some(v) = classifier.wireless_name_tokens {
            target.wireless_name_tokens = v;
        }
    }

    if let Some(v) = parsed.max_devices_per_canvas {
        config.engine.max_devices_per_canvas = v;
    }
    if let Some(v) = parsed.site_min_width {
        config.layout.site_min_width = v;
    }
    if let Some(v) = parsed.site_min_height {
        config.layout.site_min_height = v;
    }

    validate_layout_config(&config.layout)?;
    Ok(config)
}

fn validate_layout_config(layout: &LayoutConfig) -> anyhow::Result<()> {
    let dimensions = [
        ("deviceRadius", layout.device_radius),
        ("deviceGapX", layout.device_gap_x),
        ("deviceGapY", layout.device_gap_y),
        ("sitePaddingX", layout.site_padding_x),
        ("sitePaddingTop", layout.site_padding_top),
        ("sitePaddingBottom", layout.site_padding_bottom),
        ("layerGap", layout.layer_gap),
        ("labelHeight", layout.label_height),
        ("siteMinWidth", layout.site_min_width),
        ("siteMinHeight", layout.site_min_height),
        ("siteMaxWidth", layout.site_max_width),
        ("siteMaxHeight", layout.site_max_height),
        ("siteSpacing", layout.site_spacing),
        ("canvasMargin", layout.canvas_margin),
        ("canvasMaxRowWidth", layout.canvas_max_row_width),
    ];
    for (name, value) in dimensions {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("{name} must be a non-negative number, got {value}");
        }
    }
    if layout.site_max_width < layout.site_min_width {
        anyhow::bail!("siteMaxWidth must not be smaller than siteMinWidth");
    }
    if layout.site_max_height < layout.site_min_height {
        anyhow::bail!("siteMaxHeight must not be smaller than siteMinHeight");
    }
    Ok(())
}
