// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use serde::{Deserialize, Serialize};
use skill_tree_view::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, EngineSettings, ThrottleEdge};

use crate::group_view::GroupViewOptions;

/// Errors from loading or validating a [`SkillTreeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON or has unknown/mistyped fields.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A field holds a value outside its allowed range.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// When group views are mounted (and so fetch their nodes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Every group is mounted as soon as the tree is.
    #[default]
    All,
    /// A group is mounted the first time its anchor comes within `margin`
    /// world units of the visible region, and then stays mounted.
    Visible {
        /// Extra world-space distance around the visible region.
        margin: f64,
    },
}

/// Serializable form of [`ThrottleEdge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleMode {
    /// See [`ThrottleEdge::Trailing`].
    Trailing,
    /// See [`ThrottleEdge::LeadingAndTrailing`].
    #[default]
    LeadingAndTrailing,
}

impl From<ThrottleMode> for ThrottleEdge {
    fn from(mode: ThrottleMode) -> Self {
        match mode {
            ThrottleMode::Trailing => Self::Trailing,
            ThrottleMode::LeadingAndTrailing => Self::LeadingAndTrailing,
        }
    }
}

/// Tunables of a [`crate::SkillTree`]. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillTreeConfig {
    /// Scale factor per wheel step toward magnification.
    pub zoom_in_factor: f64,
    /// Scale factor per wheel step away from magnification.
    pub zoom_out_factor: f64,
    /// Lower scale bound.
    pub min_scale: f64,
    /// Upper scale bound.
    pub max_scale: f64,
    /// Minimum spacing between committed zoom updates.
    pub throttle_interval_ms: u64,
    /// Edge policy of the wheel throttle.
    pub throttle_mode: ThrottleMode,
    /// When group views are mounted.
    pub load_policy: LoadPolicy,
    /// Side length of a node box, in world units.
    pub node_size: f64,
    /// Side length of a group anchor box, in world units.
    pub group_size: f64,
    /// Draw the group anchor while its nodes are still loading.
    pub anchor_while_loading: bool,
}

impl Default for SkillTreeConfig {
    fn default() -> Self {
        Self {
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            throttle_interval_ms: 100,
            throttle_mode: ThrottleMode::default(),
            load_policy: LoadPolicy::default(),
            node_size: 40.0,
            group_size: 80.0,
            anchor_while_loading: false,
        }
    }
}

impl SkillTreeConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("zoom_in_factor", self.zoom_in_factor)?;
        positive("zoom_out_factor", self.zoom_out_factor)?;
        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid {
                field: "min_scale",
                reason: format!("{} exceeds max_scale {}", self.min_scale, self.max_scale),
            });
        }
        if self.throttle_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "throttle_interval_ms",
                reason: "must be at least 1".into(),
            });
        }
        positive("node_size", self.node_size)?;
        positive("group_size", self.group_size)?;
        if let LoadPolicy::Visible { margin } = self.load_policy
            && !(margin.is_finite() && margin >= 0.0)
        {
            return Err(ConfigError::Invalid {
                field: "load_policy.margin",
                reason: format!("{margin} is not a finite, non-negative distance"),
            });
        }
        Ok(())
    }

    /// Viewport engine settings derived from this configuration.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            zoom_in_factor: self.zoom_in_factor,
            zoom_out_factor: self.zoom_out_factor,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            throttle_interval_ms: self.throttle_interval_ms,
            throttle_edge: self.throttle_mode.into(),
        }
    }

    /// Group view options derived from this configuration.
    #[must_use]
    pub fn group_options(&self) -> GroupViewOptions {
        GroupViewOptions {
            anchor_size: self.group_size,
            node_size: self.node_size,
            anchor_while_loading: self.anchor_while_loading,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a finite, positive number"),
        })
    }
}

#[cfg(test)]
mod tests {
    use skill_tree_view::ThrottleEdge;

    use super::{ConfigError, LoadPolicy, SkillTreeConfig, ThrottleMode};

    #[test]
    fn empty_document_is_all_defaults() {
        let config = SkillTreeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SkillTreeConfig::default());
        let settings = config.engine_settings();
        assert_eq!(settings.zoom_in_factor, 1.1);
        assert_eq!(settings.zoom_out_factor, 0.9);
        assert_eq!((settings.min_scale, settings.max_scale), (0.1, 10.0));
        assert_eq!(settings.throttle_edge, ThrottleEdge::LeadingAndTrailing);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = SkillTreeConfig::from_json_str(
            r#"{
                "max_scale": 4,
                "throttle_mode": "trailing",
                "load_policy": { "mode": "visible", "margin": 200 },
                "anchor_while_loading": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_scale, 4.0);
        assert_eq!(config.throttle_mode, ThrottleMode::Trailing);
        assert_eq!(config.load_policy, LoadPolicy::Visible { margin: 200.0 });
        assert!(config.group_options().anchor_while_loading);
        assert_eq!(config.group_options().anchor_size, 80.0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SkillTreeConfig::from_json_str(r#"{ "zoom_speed": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for (doc, field) in [
            (r#"{ "zoom_in_factor": 0 }"#, "zoom_in_factor"),
            (r#"{ "min_scale": 5, "max_scale": 2 }"#, "min_scale"),
            (r#"{ "throttle_interval_ms": 0 }"#, "throttle_interval_ms"),
            (r#"{ "node_size": -1 }"#, "node_size"),
            (
                r#"{ "load_policy": { "mode": "visible", "margin": -5 } }"#,
                "load_policy.margin",
            ),
        ] {
            match SkillTreeConfig::from_json_str(doc) {
                Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field, "{doc}"),
                other => panic!("expected invalid `{field}`, got {other:?}"),
            }
        }
    }

    #[test]
    fn margin_is_only_checked_for_the_visible_policy() {
        let zero = r#"{ "load_policy": { "mode": "visible", "margin": 0 } }"#;
        assert_eq!(
            SkillTreeConfig::from_json_str(zero).unwrap().load_policy,
            LoadPolicy::Visible { margin: 0.0 }
        );

        let mut config = SkillTreeConfig {
            load_policy: LoadPolicy::Visible { margin: f64::NAN },
            ..SkillTreeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "load_policy.margin", .. })
        ));
        config.load_policy = LoadPolicy::All;
        assert!(config.validate().is_ok());
    }
}
