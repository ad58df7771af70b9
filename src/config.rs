//! Recognized configuration keys (`session configuration` is an external
//! collaborator — this module only defines the typed shape the caller
//! populates; it does not parse any config-file format itself).

use std::collections::BTreeMap;

/// Top-level configuration consumed by a [`crate::session::Session`].
#[derive(Debug, Clone)]
pub struct Config {
    pub stixquery: StixQueryConfig,
    pub prefetch: PrefetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stixquery: StixQueryConfig::default(),
            prefetch: PrefetchConfig::default(),
        }
    }
}

/// `stixquery.*` keys.
#[derive(Debug, Clone)]
pub struct StixQueryConfig {
    /// `stixquery.timerange_start_offset` — seconds, typically negative to
    /// extend the window into the past.
    pub timerange_start_offset: i64,
    /// `stixquery.timerange_stop_offset` — seconds, typically positive to
    /// extend the window into the future.
    pub timerange_stop_offset: i64,
    /// `stixquery.support_id` — whether the active datasource exposes a
    /// stable `id` attribute usable in patterns.
    pub support_id: bool,
}

impl Default for StixQueryConfig {
    fn default() -> Self {
        Self {
            timerange_start_offset: 0,
            timerange_stop_offset: 0,
            support_id: false,
        }
    }
}

/// `prefetch.*` keys.
#[derive(Debug, Clone)]
pub struct PrefetchConfig {
    /// `prefetch.get`.
    pub on_get: bool,
    /// `prefetch.find`.
    pub on_find: bool,
    /// `prefetch.<attr>` weights used by fine-grained process filtering.
    /// Missing attributes default to weight `0.0` (ignored).
    pub attribute_weights: BTreeMap<String, f64>,
    /// Minimum aggregate score (0.0..=1.0) for a prefetched process row to
    /// be considered the same process as a local row.
    pub process_match_threshold: f64,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        let mut attribute_weights = BTreeMap::new();
        attribute_weights.insert("pid".to_string(), 0.4);
        attribute_weights.insert("name".to_string(), 0.3);
        attribute_weights.insert("parent_ref.pid".to_string(), 0.15);
        attribute_weights.insert("command_line".to_string(), 0.1);
        attribute_weights.insert("created".to_string(), 0.05);
        Self {
            on_get: true,
            on_find: true,
            attribute_weights,
            process_match_threshold: 0.5,
        }
    }
}
