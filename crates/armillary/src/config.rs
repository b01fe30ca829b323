//! Configuration types for the editor core.
//!
//! This module provides configuration structures consumed by the command
//! executor and the interaction bridge. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`EditorConfig`] - Top-level configuration combining history and node settings.
//! - [`HistoryConfig`] - Bounds the undo/redo history depth.
//! - [`NodeConfig`] - Default placement dimensions for palette drops.
//!
//! # Example
//!
//! ```
//! # use armillary::config::EditorConfig;
//! // Use default configuration
//! let config = EditorConfig::default();
//! assert_eq!(config.history().limit(), 100);
//! ```

use serde::Deserialize;

use armillary_core::geometry::Size;

/// Top-level editor configuration combining history and node settings.
///
/// Groups [`HistoryConfig`] and [`NodeConfig`] into a single configuration
/// root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorConfig {
    /// History configuration section.
    #[serde(default)]
    history: HistoryConfig,

    /// Node configuration section.
    #[serde(default)]
    node: NodeConfig,
}

impl EditorConfig {
    /// Creates a new [`EditorConfig`] with the specified history and node configurations.
    ///
    /// # Arguments
    ///
    /// * `history` - Undo/redo history settings.
    /// * `node` - Default node placement settings.
    pub fn new(history: HistoryConfig, node: NodeConfig) -> Self {
        Self { history, node }
    }

    /// Returns the history configuration.
    pub fn history(&self) -> &HistoryConfig {
        &self.history
    }

    /// Returns the node configuration.
    pub fn node(&self) -> &NodeConfig {
        &self.node
    }
}

/// Undo/redo history configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of entries kept on the undo stack. Oldest entries are
    /// dropped beyond this depth.
    #[serde(default = "HistoryConfig::default_limit")]
    limit: usize,
}

impl HistoryConfig {
    fn default_limit() -> usize {
        100
    }

    /// Creates a new [`HistoryConfig`] with the specified depth limit.
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Returns the maximum undo history depth.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
        }
    }
}

/// Default node placement configuration.
///
/// Palette drops that arrive without an explicit size fall back to these
/// dimensions.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Default placement width.
    #[serde(default = "NodeConfig::default_width")]
    default_width: f32,

    /// Default placement height.
    #[serde(default = "NodeConfig::default_height")]
    default_height: f32,
}

impl NodeConfig {
    fn default_width() -> f32 {
        120.0
    }

    fn default_height() -> f32 {
        60.0
    }

    /// Creates a new [`NodeConfig`] with the specified default dimensions.
    pub fn new(default_width: f32, default_height: f32) -> Self {
        Self {
            default_width,
            default_height,
        }
    }

    /// Returns the default placement size for palette drops.
    pub fn default_size(&self) -> Size {
        Size::new(self.default_width, self.default_height)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            default_width: Self::default_width(),
            default_height: Self::default_height(),
        }
    }
}
