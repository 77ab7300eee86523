//! config.rs — engine configuration: rule weight table, blend weights and
//! text-similarity caps.
//!
//! Defaults match the documented canonical table, so the engine works with no
//! config file at all. A TOML file (default `config/recommender.toml`, path
//! overridable via `RECOMMENDER_CONFIG_PATH`) may override any subset.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/recommender.toml";
pub const ENV_CONFIG_PATH: &str = "RECOMMENDER_CONFIG_PATH";

/// Rule-scorer weight table. One canonical table: 5 points per interest
/// match capped at 30, no deadline bonus (the combiner's open/closed filter
/// covers urgency instead).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    pub department_exact: f32,
    pub department_unrestricted: f32,
    pub grade_exact: f32,
    pub grade_unrestricted: f32,
    pub interest_per_match: f32,
    pub max_interest: f32,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            department_exact: 40.0,
            department_unrestricted: 20.0,
            grade_exact: 30.0,
            grade_unrestricted: 15.0,
            interest_per_match: 5.0,
            max_interest: 30.0,
        }
    }
}

/// Fixed blend weights for the hybrid total. Documented, not auto-derived;
/// they sum to 1.0 by construction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub rule: f32,
    pub text: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            rule: 0.6,
            text: 0.4,
        }
    }
}

/// Caps bounding the per-request vectorization cost.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// How many chars of `Program.content` feed the program document.
    pub content_prefix_chars: usize,
    /// Vocabulary cap for the TF-IDF term space.
    pub max_features: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content_prefix_chars: 500,
            max_features: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rule: RuleWeights,
    pub blend: BlendWeights,
    pub text: TextConfig,
}

impl EngineConfig {
    /// Parse from a TOML string. Any table or key may be omitted and falls
    /// back to the default.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: EngineConfig = toml::from_str(toml_str)?;

        // Harden odd blend values: both weights must be finite and non-negative.
        if !cfg.blend.rule.is_finite()
            || !cfg.blend.text.is_finite()
            || cfg.blend.rule < 0.0
            || cfg.blend.text < 0.0
        {
            warn!(
                rule = cfg.blend.rule,
                text = cfg.blend.text,
                "invalid blend weights in config, falling back to defaults"
            );
            cfg.blend = BlendWeights::default();
        }
        Ok(cfg)
    }

    /// Load from a TOML file. Uses RECOMMENDER_CONFIG_PATH or defaults to
    /// `config/recommender.toml`.
    pub fn from_file() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let content = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("failed to read engine config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// File load with a warn-and-default fallback for callers that must not
    /// fail on a missing config.
    pub fn load_or_default() -> Self {
        match Self::from_file() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(error = %e, "engine config unavailable, using built-in defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_canonical_table() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.rule.department_exact, 40.0);
        assert_eq!(cfg.rule.department_unrestricted, 20.0);
        assert_eq!(cfg.rule.grade_exact, 30.0);
        assert_eq!(cfg.rule.grade_unrestricted, 15.0);
        assert_eq!(cfg.rule.interest_per_match, 5.0);
        assert_eq!(cfg.rule.max_interest, 30.0);
        assert!((cfg.blend.rule + cfg.blend.text - 1.0).abs() < 1e-6);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let cfg = EngineConfig::from_toml_str(
            r#"
[rule]
interest_per_match = 10.0

[text]
content_prefix_chars = 300
"#,
        )
        .expect("parse partial config");
        assert_eq!(cfg.rule.interest_per_match, 10.0);
        // Untouched keys keep their defaults.
        assert_eq!(cfg.rule.department_exact, 40.0);
        assert_eq!(cfg.text.content_prefix_chars, 300);
        assert_eq!(cfg.text.max_features, 1000);
        assert_eq!(cfg.blend, BlendWeights::default());
    }

    #[test]
    fn bad_blend_weights_fall_back() {
        let cfg = EngineConfig::from_toml_str(
            r#"
[blend]
rule = -1.0
text = 0.4
"#,
        )
        .expect("parse");
        assert_eq!(cfg.blend, BlendWeights::default());
    }

    #[test]
    fn empty_string_is_all_defaults() {
        let cfg = EngineConfig::from_toml_str("").expect("parse empty");
        assert_eq!(cfg, EngineConfig::default());
    }
}
