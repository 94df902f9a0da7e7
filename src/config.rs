use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::constants::{
    DEFAULT_FEED_REFRESH_MS, DEFAULT_FPS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
    TEXT_SCALE_MAX, TEXT_SCALE_MIN,
};
use crate::deutils::deserialize_numeric_f32;
use crate::geometry::{Anchor, Viewport};
use crate::registry::{WidgetName, WidgetType};
use crate::sources::Settings;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Where a widget sits: fractional screen position plus the anchor code
/// naming which part of the content box the position denotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSpec {
    #[serde(deserialize_with = "deserialize_numeric_f32")]
    pub x: f32,
    #[serde(deserialize_with = "deserialize_numeric_f32")]
    pub y: f32,
    #[serde(default)]
    pub anchor: Anchor,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewportConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Top-level app configuration. Globals plus the two per-widget maps that
/// define the active set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>, // e.g., "info" | "debug"
    pub feed_refresh_interval_ms: Option<u64>,
    pub text_scale_multiplier: Option<f32>,
    pub fps: Option<u32>,
    pub viewport: Option<ViewportConfig>,
    pub widget_positions: HashMap<String, PositionSpec>,
    pub widget_settings: HashMap<String, Settings>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "MirrorS", about = "MirrorS - widgets on the wall", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Global feed refresh interval in milliseconds
    #[arg(long)]
    pub refresh_ms: Option<u64>,
    /// Global text scale multiplier
    #[arg(long)]
    pub scale: Option<f32>,
    #[arg(long)]
    pub fps: Option<u32>,
    #[arg(long)]
    pub viewport_width: Option<u32>,
    #[arg(long)]
    pub viewport_height: Option<u32>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate. Safe to call
/// again on reload; the process args do not change.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();

    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
            cfg.path = Some(p.clone());
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
        cfg.path = Some(p);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/mirrors/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/mirrors/config.yaml");
        if p.exists() {
            return Some(p);
        }
        let p = home.join(".config/mirrors.yaml");
        if p.exists() {
            return Some(p);
        }
    }
    // project local
    for candidate in &["mirrors.yaml", "config.yaml", "config/mirrors.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

fn default_save_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".config/mirrors/config.yaml"))
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option; the widget maps come
/// from YAML alone and replace wholesale.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() {
        dst.log_level = src.log_level;
    }
    if src.feed_refresh_interval_ms.is_some() {
        dst.feed_refresh_interval_ms = src.feed_refresh_interval_ms;
    }
    if src.text_scale_multiplier.is_some() {
        dst.text_scale_multiplier = src.text_scale_multiplier;
    }
    if src.fps.is_some() {
        dst.fps = src.fps;
    }
    match (&mut dst.viewport, src.viewport) {
        (None, Some(v)) => dst.viewport = Some(v),
        (Some(d), Some(s)) => merge_viewport(d, s),
        _ => {}
    }
    if !src.widget_positions.is_empty() {
        dst.widget_positions = src.widget_positions;
    }
    if !src.widget_settings.is_empty() {
        dst.widget_settings = src.widget_settings;
    }
}

fn merge_viewport(dst: &mut ViewportConfig, src: ViewportConfig) {
    if src.width.is_some() {
        dst.width = src.width;
    }
    if src.height.is_some() {
        dst.height = src.height;
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }
    if cli.refresh_ms.is_some() {
        cfg.feed_refresh_interval_ms = cli.refresh_ms;
    }
    if cli.scale.is_some() {
        cfg.text_scale_multiplier = cli.scale;
    }
    if cli.fps.is_some() {
        cfg.fps = cli.fps;
    }
    let any_viewport = cli.viewport_width.is_some() || cli.viewport_height.is_some();
    if any_viewport && cfg.viewport.is_none() {
        cfg.viewport = Some(ViewportConfig::default());
    }
    if let Some(viewport) = cfg.viewport.as_mut() {
        if cli.viewport_width.is_some() {
            viewport.width = cli.viewport_width;
        }
        if cli.viewport_height.is_some() {
            viewport.height = cli.viewport_height;
        }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(ms) = cfg.feed_refresh_interval_ms {
        if ms == 0 {
            return Err(ConfigError::Validation(
                "feed_refresh_interval_ms must be > 0".into(),
            ));
        }
    }
    if let Some(scale) = cfg.text_scale_multiplier {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::Validation(
                "text_scale_multiplier must be a positive number".into(),
            ));
        }
    }
    if let Some(fps) = cfg.fps {
        if fps == 0 || fps > 120 {
            return Err(ConfigError::Validation("fps must be 1..=120".into()));
        }
    }
    if let Some(viewport) = cfg.viewport.as_ref() {
        if viewport.width == Some(0) || viewport.height == Some(0) {
            return Err(ConfigError::Validation(
                "viewport width/height must be > 0".into(),
            ));
        }
    }
    for (name, pos) in &cfg.widget_positions {
        if !(0.0..=1.0).contains(&pos.x) || !(0.0..=1.0).contains(&pos.y) {
            return Err(ConfigError::Validation(format!(
                "{name}: position must be within 0.0..=1.0"
            )));
        }
    }
    Ok(())
}

impl Config {
    pub fn refresh_interval_ms(&self) -> u64 {
        self.feed_refresh_interval_ms
            .unwrap_or(DEFAULT_FEED_REFRESH_MS)
    }

    /// Global multiplier; out-of-range values are clamped rather than fatal.
    pub fn text_scale(&self) -> f32 {
        self.text_scale_multiplier
            .unwrap_or(1.0)
            .clamp(TEXT_SCALE_MIN, TEXT_SCALE_MAX)
    }

    pub fn fps(&self) -> u32 {
        self.fps.unwrap_or(DEFAULT_FPS)
    }

    pub fn viewport(&self) -> Viewport {
        let v = self.viewport.clone().unwrap_or_default();
        Viewport {
            width: v.width.unwrap_or(DEFAULT_VIEWPORT_WIDTH),
            height: v.height.unwrap_or(DEFAULT_VIEWPORT_HEIGHT),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// The active set in stable (sorted) order, with each name's type.
    /// Names that do not parse are skipped here and removed by
    /// [`Config::prune_unknown_widgets`].
    pub fn active_widgets(&self) -> Vec<(String, WidgetType)> {
        let mut names: Vec<&String> = self.widget_positions.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|n| {
                n.parse::<WidgetName>()
                    .ok()
                    .map(|parsed| (n.clone(), parsed.kind))
            })
            .collect()
    }

    pub fn settings_for(&self, name: &str) -> Settings {
        self.widget_settings
            .get(name)
            .cloned()
            .unwrap_or(Settings::Null)
    }

    pub fn position_for(&self, name: &str) -> Option<&PositionSpec> {
        self.widget_positions.get(name)
    }

    /// Drops entries whose name does not parse as `{known_type}_{n}`, from
    /// both maps, plus settings orphaned by a missing position. Returns the
    /// removed names so the caller can log them.
    pub fn prune_unknown_widgets(&mut self) -> Vec<String> {
        let mut pruned: Vec<String> = self
            .widget_positions
            .keys()
            .filter(|n| n.parse::<WidgetName>().is_err())
            .cloned()
            .collect();
        pruned.sort();
        for name in &pruned {
            self.widget_positions.remove(name);
            self.widget_settings.remove(name);
        }
        let active: HashSet<String> = self.widget_positions.keys().cloned().collect();
        self.widget_settings.retain(|name, _| active.contains(name));
        pruned
    }

    /// Adds a widget of `kind` at screen center with its per-type default
    /// settings, allocating the smallest free ordinal. Returns the new name.
    pub fn add_widget(&mut self, kind: WidgetType) -> String {
        let name =
            WidgetName::next_free(kind, self.widget_positions.keys().map(String::as_str))
                .to_string();
        self.widget_positions.insert(
            name.clone(),
            PositionSpec {
                x: 0.5,
                y: 0.5,
                anchor: Anchor::Center,
            },
        );
        let defaults = kind.default_settings();
        if !defaults.is_null() {
            self.widget_settings.insert(name.clone(), defaults);
        }
        name
    }

    pub fn remove_widget(&mut self, name: &str) -> bool {
        let existed = self.widget_positions.remove(name).is_some();
        self.widget_settings.remove(name);
        existed
    }

    /// Stores a dragged widget's new fractional position. The drag handler
    /// hands over the top-left, so the anchor normalizes to `nw` and the
    /// widget does not jump.
    pub fn move_widget(&mut self, name: &str, x: f32, y: f32) -> bool {
        match self.widget_positions.get_mut(name) {
            Some(pos) => {
                pos.x = x.clamp(0.0, 1.0);
                pos.y = y.clamp(0.0, 1.0);
                pos.anchor = Anchor::NorthWest;
                true
            }
            None => false,
        }
    }

    /// Persists to the file the config was loaded from, or the XDG default
    /// for a fresh install.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => default_save_path().ok_or_else(|| {
                ConfigError::Validation("no home directory to save config under".into())
            })?,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
log_level: debug
feed_refresh_interval_ms: 900000
text_scale_multiplier: 1.5
widget_positions:
  time_1: { x: 0.5, y: 0.1, anchor: "n" }
  rss_1: { x: 0.02, y: 0.9, anchor: "sw" }
widget_settings:
  rss_1:
    urls: ["https://example.org/feed.xml"]
    article_count: 3
"#;

    fn parsed() -> Config {
        serde_yaml::from_str(DOC).unwrap()
    }

    #[test]
    fn yaml_document_round_trips() {
        let cfg = parsed();
        assert_eq!(cfg.refresh_interval_ms(), 900_000);
        assert_eq!(cfg.text_scale(), 1.5);
        assert_eq!(cfg.log_level(), "debug");
        let pos = cfg.position_for("time_1").unwrap();
        assert_eq!(pos.anchor, Anchor::North);
        let names: Vec<String> = cfg.active_widgets().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["rss_1", "time_1"]);
    }

    #[test]
    fn accessors_fall_back_to_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.refresh_interval_ms(), 3_600_000);
        assert_eq!(cfg.text_scale(), 1.0);
        assert_eq!(cfg.fps(), 30);
        let vp = cfg.viewport();
        assert_eq!((vp.width, vp.height), (1280, 720));
        assert!(cfg.settings_for("rss_1").is_null());
    }

    #[test]
    fn quoted_position_numbers_parse() {
        let pos: PositionSpec = serde_yaml::from_str("x: \"0.5\"\ny: 0.25\nanchor: se").unwrap();
        assert_eq!((pos.x, pos.y), (0.5, 0.25));
        assert_eq!(pos.anchor, Anchor::SouthEast);
    }

    #[test]
    fn default_interval_is_a_preset_choice() {
        assert!(crate::constants::REFRESH_PRESETS_MS.contains(&DEFAULT_FEED_REFRESH_MS));
    }

    #[test]
    fn oversized_scale_clamps() {
        let mut cfg = Config::default();
        cfg.text_scale_multiplier = Some(9.0);
        assert_eq!(cfg.text_scale(), 2.0);
        cfg.text_scale_multiplier = Some(0.1);
        assert_eq!(cfg.text_scale(), 0.5);
    }

    #[test]
    fn prune_drops_unknown_types_from_both_maps() {
        let mut cfg = parsed();
        cfg.widget_positions.insert(
            "news_1".to_string(),
            PositionSpec {
                x: 0.5,
                y: 0.5,
                anchor: Anchor::Center,
            },
        );
        cfg.widget_settings
            .insert("news_1".to_string(), Settings::Null);
        cfg.widget_settings
            .insert("stock_9".to_string(), Settings::Null);
        let pruned = cfg.prune_unknown_widgets();
        assert_eq!(pruned, vec!["news_1"]);
        assert!(cfg.position_for("news_1").is_none());
        assert!(!cfg.widget_settings.contains_key("news_1"));
        // orphaned settings go too
        assert!(!cfg.widget_settings.contains_key("stock_9"));
    }

    #[test]
    fn add_widget_allocates_center_defaults() {
        let mut cfg = parsed();
        let name = cfg.add_widget(WidgetType::Rss);
        assert_eq!(name, "rss_2");
        let pos = cfg.position_for("rss_2").unwrap();
        assert_eq!((pos.x, pos.y), (0.5, 0.5));
        assert_eq!(pos.anchor, Anchor::Center);
        assert_eq!(
            cfg.settings_for("rss_2")["article_count"],
            Settings::from(5u64)
        );
        // settings-free types get no settings block
        cfg.add_widget(WidgetType::MoonPhase);
        assert!(!cfg.widget_settings.contains_key("moonphase_1"));
        assert!(cfg.position_for("moonphase_1").is_some());
    }

    #[test]
    fn remove_widget_drops_both_sides() {
        let mut cfg = parsed();
        assert!(cfg.remove_widget("rss_1"));
        assert!(cfg.position_for("rss_1").is_none());
        assert!(!cfg.widget_settings.contains_key("rss_1"));
        assert!(!cfg.remove_widget("rss_1"));
    }

    #[test]
    fn move_widget_clamps_and_normalizes_anchor() {
        let mut cfg = parsed();
        assert!(cfg.move_widget("time_1", 1.4, -0.2));
        let pos = cfg.position_for("time_1").unwrap();
        assert_eq!((pos.x, pos.y), (1.0, 0.0));
        assert_eq!(pos.anchor, Anchor::NorthWest);
        assert!(!cfg.move_widget("absent_1", 0.5, 0.5));
    }

    #[test]
    fn validation_rejects_bad_ranges() {
        let mut cfg = parsed();
        cfg.feed_refresh_interval_ms = Some(0);
        assert!(validate(&cfg).is_err());

        let mut cfg = parsed();
        cfg.widget_positions.get_mut("time_1").unwrap().x = 1.5;
        assert!(validate(&cfg).is_err());

        let cfg = parsed();
        assert!(validate(&cfg).is_ok());
    }
}
