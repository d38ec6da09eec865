// Settings persistence: overlay tuning stored in the platform-native config
// dir, e.g. ~/.config/glyphfall/settings.json on Linux. Every field has a
// default, so a missing or partial file always yields a usable config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use glyphfall_renderer::BloomTuning;
use glyphfall_sim::DropTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Side length of one grid cell in pixels.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,

    /// Drop fall speed range, rows/second.
    #[serde(default = "default_speed_min")]
    pub drop_speed_min: f64,
    #[serde(default = "default_speed_max")]
    pub drop_speed_max: f64,

    /// Drop tail length range, rows.
    #[serde(default = "default_tail_min")]
    pub drop_tail_min: f64,
    #[serde(default = "default_tail_max")]
    pub drop_tail_max: f64,

    /// Per-column probability per second of an ambient glyph change.
    #[serde(default = "default_flicker_rate")]
    pub flicker_rate: f64,

    #[serde(default = "default_bloom_threshold")]
    pub bloom_threshold: f32,
    #[serde(default = "default_bloom_intensity")]
    pub bloom_intensity: f32,

    /// Optional pre-baked 8×8 glyph atlas image. When unset, the atlas is
    /// baked from the system monospace font at startup.
    #[serde(default)]
    pub atlas_image: Option<PathBuf>,

    /// Fraction of the primary monitor width the overlay strip occupies.
    #[serde(default = "default_width_fraction")]
    pub width_fraction: f32,
}

fn default_cell_size() -> f32 {
    16.0
}
fn default_speed_min() -> f64 {
    10.0
}
fn default_speed_max() -> f64 {
    30.0
}
fn default_tail_min() -> f64 {
    10.0
}
fn default_tail_max() -> f64 {
    50.0
}
fn default_flicker_rate() -> f64 {
    0.5
}
fn default_bloom_threshold() -> f32 {
    0.5
}
fn default_bloom_intensity() -> f32 {
    1.0
}
fn default_width_fraction() -> f32 {
    0.08
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            drop_speed_min: default_speed_min(),
            drop_speed_max: default_speed_max(),
            drop_tail_min: default_tail_min(),
            drop_tail_max: default_tail_max(),
            flicker_rate: default_flicker_rate(),
            bloom_threshold: default_bloom_threshold(),
            bloom_intensity: default_bloom_intensity(),
            atlas_image: None,
            width_fraction: default_width_fraction(),
        }
    }
}

impl OverlaySettings {
    pub fn tuning(&self) -> DropTuning {
        DropTuning {
            speed_min: self.drop_speed_min,
            speed_max: self.drop_speed_max,
            tail_min: self.drop_tail_min,
            tail_max: self.drop_tail_max,
            flicker_rate: self.flicker_rate,
        }
    }

    pub fn bloom(&self) -> BloomTuning {
        BloomTuning {
            threshold: self.bloom_threshold,
            intensity: self.bloom_intensity,
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("glyphfall").join("settings.json"))
}

/// Load settings, falling back to the defaults when the file is absent or
/// unreadable. A malformed file is reported but never fatal.
pub fn load_settings() -> OverlaySettings {
    let Some(path) = settings_path() else {
        return OverlaySettings::default();
    };
    let Ok(text) = std::fs::read_to_string(&path) else {
        return OverlaySettings::default();
    };
    match serde_json::from_str(&text) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("ignoring malformed {}: {}", path.display(), e);
            OverlaySettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_yields_defaults() {
        let parsed: OverlaySettings = serde_json::from_str("{}").unwrap();
        let defaults = OverlaySettings::default();
        assert_eq!(parsed.cell_size, defaults.cell_size);
        assert_eq!(parsed.drop_speed_max, defaults.drop_speed_max);
        assert_eq!(parsed.bloom_threshold, defaults.bloom_threshold);
        assert!(parsed.atlas_image.is_none());
    }

    #[test]
    fn test_partial_override() {
        let parsed: OverlaySettings =
            serde_json::from_str(r#"{"cell_size": 20.0, "drop_tail_max": 80.0}"#).unwrap();
        assert_eq!(parsed.cell_size, 20.0);
        assert_eq!(parsed.drop_tail_max, 80.0);
        assert_eq!(parsed.drop_tail_min, 10.0);
    }

    #[test]
    fn test_tuning_mapping() {
        let settings = OverlaySettings::default();
        let tuning = settings.tuning();
        assert_eq!(tuning.speed_min, 10.0);
        assert_eq!(tuning.speed_max, 30.0);
        assert_eq!(tuning.tail_min, 10.0);
        assert_eq!(tuning.tail_max, 50.0);
    }
}
