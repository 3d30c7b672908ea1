// ABOUTME: Shared types and configuration for tilewin.
// ABOUTME: Defines size limits, split policy, leaf decorations and config file handling.

pub mod config;
pub mod decoration;

pub use config::{Config, ConfigError, FrameSettings, LayoutPolicy, SideSlots, SizeLimits};
pub use decoration::Decoration;
