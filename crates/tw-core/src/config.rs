// ABOUTME: Layout configuration handling.
// ABOUTME: Loads and saves size limits, split policy and side slots from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Decoration;

/// Minimum window sizes, in lines (height) and columns (width)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    /// Smallest height a window may get by ordinary resizing
    pub min_height: i32,
    /// Smallest width a window may get by ordinary resizing
    pub min_width: i32,
    /// Absolute lower bound on height, even when overriding limits
    pub safe_min_height: i32,
    /// Absolute lower bound on width, even when overriding limits
    pub safe_min_width: i32,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            min_height: 4,
            min_width: 10,
            safe_min_height: 1,
            safe_min_width: 2,
        }
    }
}

/// How splitting and deleting redistribute space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LayoutPolicy {
    /// Take space for a new window from all siblings proportionally, and give
    /// a deleted window's space back to all siblings, instead of only the
    /// window being split or its neighbor.
    pub combination_resize: bool,

    /// Always insert a new parent when splitting, so the new window can later
    /// return its space to exactly the window it was split from.
    pub combination_limit: bool,
}

/// Maximum number of leaf windows per side region (None = unlimited)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SideSlots {
    pub left: Option<usize>,
    pub top: Option<usize>,
    pub right: Option<usize>,
    pub bottom: Option<usize>,
}

/// Initial frame dimensions for embedders that don't supply their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub height: i32,
    pub width: i32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            height: 24,
            width: 80,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window size limits
    pub sizes: SizeLimits,

    /// Split/delete redistribution policy
    pub policy: LayoutPolicy,

    /// Decoration for new windows that have nothing to inherit from
    pub decoration: Decoration,

    /// Per-edge side window slot limits
    pub sides: SideSlots,

    /// Default frame size
    pub frame: FrameSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Get the default config file path (~/.config/tilewin/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tilewin").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that size limits and frame dimensions make sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = &self.sizes;
        if sizes.safe_min_height < 1 || sizes.safe_min_width < 1 {
            return Err(ConfigError::Invalid(format!(
                "safe minimums must be at least 1 (got {}x{})",
                sizes.safe_min_height, sizes.safe_min_width
            )));
        }
        if sizes.min_height < sizes.safe_min_height {
            return Err(ConfigError::Invalid(format!(
                "min_height {} is below safe_min_height {}",
                sizes.min_height, sizes.safe_min_height
            )));
        }
        if sizes.min_width < sizes.safe_min_width {
            return Err(ConfigError::Invalid(format!(
                "min_width {} is below safe_min_width {}",
                sizes.min_width, sizes.safe_min_width
            )));
        }
        if self.frame.height < 1 || self.frame.width < 1 {
            return Err(ConfigError::Invalid(format!(
                "frame must be at least 1x1 (got {}x{})",
                self.frame.height, self.frame.width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sizes.min_height, 4);
        assert_eq!(config.sizes.min_width, 10);
        assert!(!config.policy.combination_resize);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [sizes]
            min_height = 6

            [policy]
            combination_limit = true

            [sides]
            left = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.sizes.min_height, 6);
        assert_eq!(config.sizes.min_width, 10);
        assert!(config.policy.combination_limit);
        assert_eq!(config.sides.left, Some(2));
        assert_eq!(config.sides.right, None);
        assert!(config.decoration.mode_line);
    }

    #[test]
    fn test_validate_rejects_min_below_safe() {
        let mut config = Config::default();
        config.sizes.min_width = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.sizes.safe_min_height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.sizes.min_height = 3;
        config.policy.combination_resize = true;
        config.sides.bottom = Some(1);
        config.frame.width = 132;

        let path = std::env::temp_dir().join("tilewin_test_config.toml");
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_default_path() {
        if let Some(p) = Config::default_path() {
            assert!(p.ends_with("tilewin/config.toml"));
        }
    }
}
