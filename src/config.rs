//! Render configuration types.

use serde::{Deserialize, Serialize};

use crate::render::Rgba;

/// Gridline and cell fill colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Gridline color.
    pub grid: Rgba,
    /// Dead cell fill.
    pub dead: Rgba,
    /// Alive cell fill.
    pub alive: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            grid: Rgba::rgb(0xCC, 0xCC, 0xCC),
            dead: Rgba::rgb(0xFF, 0xFF, 0xFF),
            alive: Rgba::rgb(0x00, 0x00, 0x00),
        }
    }
}

fn default_cell_size() -> u32 {
    5
}

fn default_steps_per_frame() -> u32 {
    1
}

/// Top-level render configuration.
///
/// Grid dimensions are not configured here; they belong to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Cell edge length in pixels, excluding the one-pixel gridline.
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
    /// Engine generations advanced per animation frame.
    #[serde(default = "default_steps_per_frame")]
    pub steps_per_frame: u32,
    /// Colors used by the renderer.
    #[serde(default)]
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            steps_per_frame: default_steps_per_frame(),
            palette: Palette::default(),
        }
    }
}

impl RenderConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::InvalidCellSize);
        }
        if self.steps_per_frame == 0 {
            return Err(ConfigError::InvalidStepRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cell size must be non-zero")]
    InvalidCellSize,
    #[error("Steps per frame must be at least 1")]
    InvalidStepRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.cell_size, 5);
        assert_eq!(config.steps_per_frame, 1);
        assert_eq!(config.palette.grid, Rgba::rgb(0xCC, 0xCC, 0xCC));
        assert_eq!(config.palette.dead, Rgba::rgb(0xFF, 0xFF, 0xFF));
        assert_eq!(config.palette.alive, Rgba::rgb(0x00, 0x00, 0x00));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let mut config = RenderConfig::default();
        config.cell_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCellSize)
        ));

        let mut config = RenderConfig::default();
        config.steps_per_frame = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStepRate)
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = RenderConfig::default();
        config.cell_size = 8;
        config.palette.alive = Rgba::rgb(0x20, 0x60, 0xA0);
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{ "cell_size": 3 }"#).unwrap();
        assert_eq!(config.cell_size, 3);
        assert_eq!(config.steps_per_frame, 1);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn test_palette_hex_strings() {
        let json = r##"{ "grid": "#111111", "dead": "#EEEEEE", "alive": "#FF0000" }"##;
        let palette: Palette = serde_json::from_str(json).unwrap();
        assert_eq!(palette.alive, Rgba::rgb(0xFF, 0, 0));
    }
}
