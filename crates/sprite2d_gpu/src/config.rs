//! Batch configuration

use serde::Deserialize;

/// Request ordering applied by `SpriteBatch::end`
///
/// All policies are stable: requests that compare equal keep submission order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Submission order
    None,
    /// Ascending depth
    FrontToBack,
    /// Descending depth
    #[default]
    BackToFront,
    /// Ascending texture page id, ignoring depth
    Texture,
}

/// Configuration for a sprite batch
///
/// Deserializable from any serde format; missing fields take their defaults.
///
/// ```toml
/// sort_order = "texture"
/// index_threshold = 20000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Policy used by `begin_default`
    pub sort_order: SortOrder,
    /// Request count above which quads are drawn with an index buffer
    pub index_threshold: usize,
    /// Requests reserved up front each frame
    pub initial_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::BackToFront,
            index_threshold: 10_000,
            initial_capacity: 256,
        }
    }
}

impl BatchConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}
