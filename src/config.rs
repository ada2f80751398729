//! Configuration file support for tessel.
//!
//! Loads settings from ~/.config/tessel/config.toml if it exists,
//! otherwise uses sensible defaults. Every section and field is optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::LayoutKind;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub gaps: GapConfig,
    pub layouts: LayoutsConfig,
    pub rules: RulesConfig,
}

/// Where a freshly managed window enters the window order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnLocation {
    #[default]
    End,
    Master,
    BeforeFocused,
    AfterFocused,
    /// Appended at the end, and the window starts floating
    Floating,
}

/// Engine behaviour switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub new_window_spawn_location: SpawnLocation,
    /// A lone tileable window takes the whole working area
    pub maximize_sole_tile: bool,
    /// Monocle ignores the screen gaps
    pub monocle_maximize: bool,
    /// Monocle minimizes every tile except the focused one
    pub monocle_minimize_rest: bool,
    pub keep_float_above: bool,
    pub no_tile_border: bool,
    /// Maximum tile width as a multiple of the working area height (0 disables)
    pub limit_tile_width_ratio: f64,
    /// Directional focus and swaps may cross to neighbouring screens
    pub move_between_surfaces: bool,
    pub layout_per_activity: bool,
    pub layout_per_desktop: bool,
    /// Mouse resizes of tiles feed back into the layout ratios
    pub adjust_layout: bool,
    /// Feed resizes back while the drag is still in progress
    pub adjust_layout_live: bool,
    /// Dropping a tile far from its slot makes it float
    pub untile_by_dragging: bool,
    /// Dragging a tile over another inserts it there instead of swapping
    pub mouse_drag_insert: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            new_window_spawn_location: SpawnLocation::End,
            maximize_sole_tile: false,
            monocle_maximize: true,
            monocle_minimize_rest: false,
            keep_float_above: true,
            no_tile_border: false,
            limit_tile_width_ratio: 0.0,
            move_between_surfaces: false,
            layout_per_activity: true,
            layout_per_desktop: true,
            adjust_layout: true,
            adjust_layout_live: true,
            untile_by_dragging: true,
            mouse_drag_insert: false,
        }
    }
}

/// Gaps in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    /// Gap between tiles
    pub tile: i32,
}

/// Layout selection and per-layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutsConfig {
    /// Candidate layouts in cycling order; the first one is the default
    pub enabled: Vec<LayoutKind>,
    pub tile_master_ratio: f64,
    pub three_column_master_ratio: f64,
    /// Offset between stair steps in pixels
    pub stair_space: i32,
    /// Offset between spread cards as a fraction of the area width
    pub spread_space: f64,
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            enabled: LayoutKind::ALL.to_vec(),
            tile_master_ratio: 0.55,
            three_column_master_ratio: 0.6,
            stair_space: 24,
            spread_space: 0.07,
        }
    }
}

/// Window matching rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Window classes the engine never manages
    pub ignore_class: Vec<String>,
    /// Window classes that always start floating
    pub float_class: Vec<String>,
    /// Title words that make a window ignored
    pub ignore_title: Vec<String>,
    /// Title words that make a window float
    pub float_title: Vec<String>,
}

impl RulesConfig {
    pub fn should_ignore(&self, class: &str, title: &str) -> bool {
        self.ignore_class.iter().any(|c| c == class) || match_words(title, &self.ignore_title)
    }

    pub fn should_float(&self, class: &str, title: &str) -> bool {
        self.float_class.iter().any(|c| c == class) || match_words(title, &self.float_title)
    }
}

/// Whether any of `words` appears in `text`.
fn match_words(text: &str, words: &[String]) -> bool {
    words.iter().any(|w| !w.is_empty() && text.contains(w.as_str()))
}

impl Config {
    /// Load config from default path (~/.config/tessel/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tessel")
            .join("config.toml")
    }

    /// Load config from a specific path, falling back to defaults on any error
    pub fn load_from_path(path: PathBuf) -> Self {
        match Self::read(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) if path.exists() => {
                log::warn!("Failed to load config: {:#}", e);
                Self::default()
            }
            Err(_) => {
                log::info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Strictly read and parse a config file
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.sanitize();
        Ok(config)
    }

    /// Clamp values that would break the layouts
    fn sanitize(&mut self) {
        if self.layouts.enabled.is_empty() {
            log::warn!("No layouts enabled, falling back to all layouts");
            self.layouts.enabled = LayoutKind::ALL.to_vec();
        }
        let mut seen = Vec::new();
        self.layouts.enabled.retain(|kind| {
            if seen.contains(kind) {
                false
            } else {
                seen.push(*kind);
                true
            }
        });
        self.layouts.tile_master_ratio = self.layouts.tile_master_ratio.clamp(0.05, 0.95);
        self.layouts.three_column_master_ratio =
            self.layouts.three_column_master_ratio.clamp(0.05, 0.95);
        self.general.limit_tile_width_ratio = self.general.limit_tile_width_ratio.max(0.0);
    }

    /// Screen gaps applied around the tiling area
    pub fn tiling_area(&self, working_area: crate::types::Rect) -> crate::types::Rect {
        working_area.gap(self.gaps.left, self.gaps.right, self.gaps.top, self.gaps.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layouts.enabled.len(), LayoutKind::ALL.len());
        assert_eq!(config.layouts.enabled[0], LayoutKind::Tile);
        assert_eq!(config.general.new_window_spawn_location, SpawnLocation::End);
        assert!(!config.general.maximize_sole_tile);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
[general]
maximize_sole_tile = true
new_window_spawn_location = "after_focused"

[gaps]
tile = 8
left = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.general.maximize_sole_tile);
        assert_eq!(
            config.general.new_window_spawn_location,
            SpawnLocation::AfterFocused
        );
        assert_eq!(config.gaps.tile, 8);
        assert_eq!(config.gaps.left, 4);
        assert_eq!(config.gaps.right, 0);
        // Untouched sections keep their defaults
        assert_eq!(config.layouts, LayoutsConfig::default());
    }

    #[test]
    fn test_enabled_layouts() {
        let toml = r#"
[layouts]
enabled = ["spiral", "monocle", "three_column"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.layouts.enabled,
            vec![LayoutKind::Spiral, LayoutKind::Monocle, LayoutKind::ThreeColumn]
        );
    }

    #[test]
    fn test_sanitize() {
        let mut config = Config::default();
        config.layouts.enabled = vec![LayoutKind::Monocle, LayoutKind::Monocle];
        config.layouts.tile_master_ratio = 3.0;
        config.sanitize();
        assert_eq!(config.layouts.enabled, vec![LayoutKind::Monocle]);
        assert!((config.layouts.tile_master_ratio - 0.95).abs() < f64::EPSILON);

        config.layouts.enabled.clear();
        config.sanitize();
        assert_eq!(config.layouts.enabled, LayoutKind::ALL.to_vec());
    }

    #[test]
    fn test_rules() {
        let rules = RulesConfig {
            ignore_class: vec!["plasmashell".to_string()],
            float_class: vec!["pavucontrol".to_string()],
            ignore_title: vec![],
            float_title: vec!["Picture-in-Picture".to_string()],
        };
        assert!(rules.should_ignore("plasmashell", "Desktop"));
        assert!(!rules.should_ignore("firefox", "Desktop"));
        assert!(rules.should_float("pavucontrol", "Volume Control"));
        assert!(rules.should_float("firefox", "Picture-in-Picture"));
        assert!(!rules.should_float("firefox", "Mozilla Firefox"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from_path(PathBuf::from("/nonexistent/tessel/config.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = toml::to_string(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
