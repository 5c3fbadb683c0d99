//! Config: nested sections for each pipeline stage, every field defaulted.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::action::CanonicalAction;

// ── Sub-configs ────────────────────────────────────────────────────────────

/// Gesture classifier thresholds. Distances are in normalized frame units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,
    #[serde(default = "default_click_cooldown_ms")]
    pub click_cooldown_ms: u64,
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f32,
    #[serde(default = "default_swipe_window_ms")]
    pub swipe_window_ms: u64,
    #[serde(default = "default_action_cooldown_ms")]
    pub action_cooldown_ms: u64,
    /// Pixels scrolled per tick while a scroll pose is held.
    #[serde(default = "default_gesture_scroll_step")]
    pub scroll_step_px: f64,
    /// Action fired by a leftward fist swipe.
    #[serde(default = "default_swipe_forward_action")]
    pub swipe_forward_action: CanonicalAction,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: default_pinch_threshold(),
            click_cooldown_ms: default_click_cooldown_ms(),
            swipe_threshold: default_swipe_threshold(),
            swipe_window_ms: default_swipe_window_ms(),
            action_cooldown_ms: default_action_cooldown_ms(),
            scroll_step_px: default_gesture_scroll_step(),
            swipe_forward_action: default_swipe_forward_action(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_wake_words")]
    pub wake_words: Vec<String>,
    /// Delay between a dispatched command and the return to idle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_parser_backend")]
    pub parser_backend: String,
    #[serde(default = "default_stream_backend")]
    pub command_backend: String,
    #[serde(default = "default_stream_backend")]
    pub wake_backend: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            wake_words: default_wake_words(),
            settle_delay_ms: default_settle_delay_ms(),
            parser_backend: default_parser_backend(),
            command_backend: default_stream_backend(),
            wake_backend: default_stream_backend(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_stream_backend")]
    pub backend: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            backend: default_stream_backend(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_route_home")]
    pub home: String,
    #[serde(default = "default_route_cart")]
    pub cart: String,
    #[serde(default = "default_route_checkout")]
    pub checkout: String,
    #[serde(default = "default_route_products")]
    pub products: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            home: default_route_home(),
            cart: default_route_cart(),
            checkout: default_route_checkout(),
            products: default_route_products(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Pixels scrolled by a spoken scroll up/down.
    #[serde(default = "default_dispatch_scroll_step")]
    pub scroll_step_px: f64,
    #[serde(default)]
    pub routes: RoutesConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            scroll_step_px: default_dispatch_scroll_step(),
            routes: RoutesConfig::default(),
        }
    }
}

// ── Top-level config ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

// ── Defaults ───────────────────────────────────────────────────────────────

fn default_pinch_threshold() -> f32 { 0.05 }
fn default_click_cooldown_ms() -> u64 { 500 }
fn default_swipe_threshold() -> f32 { 0.15 }
fn default_swipe_window_ms() -> u64 { 500 }
fn default_action_cooldown_ms() -> u64 { 800 }
fn default_gesture_scroll_step() -> f64 { 40.0 }
fn default_swipe_forward_action() -> CanonicalAction { CanonicalAction::NavigateCart }
fn default_wake_words() -> Vec<String> { vec!["vaquah".into()] }
fn default_settle_delay_ms() -> u64 { 1000 }
fn default_parser_backend() -> String { "keyword".into() }
fn default_stream_backend() -> String { "replay".into() }
fn default_viewport_width() -> f64 { 1280.0 }
fn default_viewport_height() -> f64 { 720.0 }
fn default_dispatch_scroll_step() -> f64 { 300.0 }
fn default_route_home() -> String { "/".into() }
fn default_route_cart() -> String { "/cart".into() }
fn default_route_checkout() -> String { "/checkout".into() }
fn default_route_products() -> String { "/products".into() }

// ── Load / save ────────────────────────────────────────────────────────────

/// `config.json` next to the running binary.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join("config.json")))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Load config from `path`, falling back to defaults if the file is missing
/// or unparsable.
pub fn load_config(path: &Path) -> Config {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            log::info!("No config at {:?}, using defaults", path);
            return Config::default();
        }
    };
    parse_config(&contents).unwrap_or_else(|e| {
        log::warn!("Failed to parse config {:?}: {e:#}. Using defaults.", path);
        Config::default()
    })
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    serde_json::from_str(contents).context("invalid config JSON")
}

pub fn save_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(cfg).context("serialize config")?;
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
