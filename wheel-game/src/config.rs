//! Wheel configuration: progression shape, fill counts, spin and continue tuning.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants;
use crate::theme::ThemeSet;

/// Errors raised when wheel configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum WheelConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("extra turn range is empty (min {min} >= max {max})")]
    ExtraTurnsRange { min: u32, max: u32 },
    #[error("pointer offset must be finite (got {0})")]
    PointerOffset(f32),
    #[error("{zone} zone fill wants {requested} slices but the wheel holds {capacity}")]
    FillOverflow {
        zone: &'static str,
        requested: usize,
        capacity: usize,
    },
    #[error("score key must not be empty")]
    EmptyScoreKey,
}

/// Top-level configuration for a wheel session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    #[serde(default = "WheelConfig::default_zone_count")]
    pub zone_count: u32,
    #[serde(default = "WheelConfig::default_slices_per_zone")]
    pub slices_per_zone: usize,
    #[serde(default = "WheelConfig::default_safe_zone_interval")]
    pub safe_zone_interval: u32,
    #[serde(default = "WheelConfig::default_score_key")]
    pub score_key: String,
    #[serde(default)]
    pub fill: FillConfig,
    #[serde(default)]
    pub spin: SpinConfig,
    #[serde(default)]
    pub continues: ContinueConfig,
    #[serde(default)]
    pub themes: ThemeSet,
}

impl WheelConfig {
    const fn default_zone_count() -> u32 {
        constants::ZONE_COUNT
    }

    const fn default_slices_per_zone() -> usize {
        constants::SLICES_PER_ZONE
    }

    const fn default_safe_zone_interval() -> u32 {
        constants::SAFE_ZONE_INTERVAL
    }

    fn default_score_key() -> String {
        constants::SCORE_KEY.to_string()
    }

    /// Configuration bundled with the crate.
    #[must_use]
    pub fn default_config() -> Self {
        bundled_config().clone()
    }

    /// Parse and validate configuration from JSON. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or violates a config invariant.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check invariants the progression relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), WheelConfigError> {
        if self.zone_count < 1 {
            return Err(WheelConfigError::MinViolation {
                field: "zone_count",
                min: 1,
                value: self.zone_count,
            });
        }
        if self.slices_per_zone < 2 {
            return Err(WheelConfigError::MinViolation {
                field: "slices_per_zone",
                min: 2,
                value: u32::try_from(self.slices_per_zone).unwrap_or(u32::MAX),
            });
        }
        if self.score_key.trim().is_empty() {
            return Err(WheelConfigError::EmptyScoreKey);
        }
        self.fill.validate(self.slices_per_zone)?;
        self.spin.validate()?;
        if self.continues.base_price < 1 {
            return Err(WheelConfigError::MinViolation {
                field: "continues.base_price",
                min: 1,
                value: self.continues.base_price,
            });
        }
        Ok(())
    }
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            zone_count: Self::default_zone_count(),
            slices_per_zone: Self::default_slices_per_zone(),
            safe_zone_interval: Self::default_safe_zone_interval(),
            score_key: Self::default_score_key(),
            fill: FillConfig::default(),
            spin: SpinConfig::default(),
            continues: ContinueConfig::default(),
            themes: ThemeSet::default(),
        }
    }
}

/// How many slices of each pool a zone category draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillConfig {
    #[serde(default = "FillConfig::default_super_chest_count")]
    pub super_chest_count: usize,
    #[serde(default = "FillConfig::default_super_chest_min_value")]
    pub super_chest_min_value: u32,
    #[serde(default = "FillConfig::default_super_point_count")]
    pub super_point_count: usize,
    #[serde(default = "FillConfig::default_super_point_min_value")]
    pub super_point_min_value: u32,
    #[serde(default = "FillConfig::default_true")]
    pub super_include_special: bool,
    #[serde(default = "FillConfig::default_safe_chest_count")]
    pub safe_chest_count: usize,
    #[serde(default = "FillConfig::default_safe_point_count")]
    pub safe_point_count: usize,
    #[serde(default)]
    pub bomb_in_safe_zones: bool,
    #[serde(default)]
    pub bomb_in_super_zone: bool,
}

impl FillConfig {
    const fn default_super_chest_count() -> usize {
        constants::SUPER_CHEST_COUNT
    }

    const fn default_super_chest_min_value() -> u32 {
        constants::SUPER_CHEST_MIN_VALUE
    }

    const fn default_super_point_count() -> usize {
        constants::SUPER_POINT_COUNT
    }

    const fn default_super_point_min_value() -> u32 {
        constants::SUPER_POINT_MIN_VALUE
    }

    const fn default_true() -> bool {
        true
    }

    const fn default_safe_chest_count() -> usize {
        constants::SAFE_CHEST_COUNT
    }

    const fn default_safe_point_count() -> usize {
        constants::SAFE_POINT_COUNT
    }

    fn validate(&self, capacity: usize) -> Result<(), WheelConfigError> {
        let super_total = self
            .super_chest_count
            .saturating_add(self.super_point_count)
            .saturating_add(usize::from(self.super_include_special))
            .saturating_add(usize::from(self.bomb_in_super_zone));
        if super_total > capacity {
            return Err(WheelConfigError::FillOverflow {
                zone: "super",
                requested: super_total,
                capacity,
            });
        }
        let safe_total = self
            .safe_chest_count
            .saturating_add(self.safe_point_count)
            .saturating_add(usize::from(self.bomb_in_safe_zones));
        if safe_total > capacity {
            return Err(WheelConfigError::FillOverflow {
                zone: "safe",
                requested: safe_total,
                capacity,
            });
        }
        Ok(())
    }
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            super_chest_count: Self::default_super_chest_count(),
            super_chest_min_value: Self::default_super_chest_min_value(),
            super_point_count: Self::default_super_point_count(),
            super_point_min_value: Self::default_super_point_min_value(),
            super_include_special: true,
            safe_chest_count: Self::default_safe_chest_count(),
            safe_point_count: Self::default_safe_point_count(),
            bomb_in_safe_zones: false,
            bomb_in_super_zone: false,
        }
    }
}

/// Spin planning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinConfig {
    /// Inclusive lower bound of extra full turns.
    #[serde(default = "SpinConfig::default_extra_turns_min")]
    pub extra_turns_min: u32,
    /// Exclusive upper bound of extra full turns.
    #[serde(default = "SpinConfig::default_extra_turns_max")]
    pub extra_turns_max: u32,
    /// Pointer direction in degrees; defines where slice 0 sits relative to the wheel.
    #[serde(default)]
    pub pointer_offset_degrees: f32,
}

impl SpinConfig {
    const fn default_extra_turns_min() -> u32 {
        constants::EXTRA_TURNS_MIN
    }

    const fn default_extra_turns_max() -> u32 {
        constants::EXTRA_TURNS_MAX
    }

    fn validate(&self) -> Result<(), WheelConfigError> {
        if self.extra_turns_min >= self.extra_turns_max {
            return Err(WheelConfigError::ExtraTurnsRange {
                min: self.extra_turns_min,
                max: self.extra_turns_max,
            });
        }
        if !self.pointer_offset_degrees.is_finite() {
            return Err(WheelConfigError::PointerOffset(self.pointer_offset_degrees));
        }
        Ok(())
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            extra_turns_min: Self::default_extra_turns_min(),
            extra_turns_max: Self::default_extra_turns_max(),
            pointer_offset_degrees: 0.0,
        }
    }
}

/// Continue pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueConfig {
    #[serde(default = "ContinueConfig::default_base_price")]
    pub base_price: u32,
}

impl ContinueConfig {
    const fn default_base_price() -> u32 {
        constants::CONTINUE_BASE_PRICE
    }

    /// Price of the next continue after `continue_count` continues this run.
    #[must_use]
    pub const fn price_for(&self, continue_count: u32) -> u32 {
        self.base_price
            .saturating_mul(continue_count.saturating_add(1))
    }
}

impl Default for ContinueConfig {
    fn default() -> Self {
        Self {
            base_price: Self::default_base_price(),
        }
    }
}

fn bundled_config() -> &'static WheelConfig {
    static CONFIG: OnceLock<WheelConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        let cfg: WheelConfig =
            serde_json::from_str(include_str!("../data/wheel.json")).expect("valid wheel config");
        cfg.validate().unwrap_or_else(|err| {
            panic!("invalid bundled wheel config: {err}");
        });
        cfg
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_constants() {
        assert_eq!(WheelConfig::default_config(), WheelConfig::default());
    }

    #[test]
    fn empty_json_takes_every_default() {
        let cfg = WheelConfig::from_json("{}").unwrap();
        assert_eq!(cfg.zone_count, 30);
        assert_eq!(cfg.slices_per_zone, 8);
        assert_eq!(cfg.score_key, "total_score");
        assert_eq!(cfg.continues.base_price, 100);
        assert_eq!(cfg.spin.extra_turns_min, 3);
        assert_eq!(cfg.spin.extra_turns_max, 6);
        assert!(cfg.fill.super_include_special);
    }

    #[test]
    fn continue_price_scales_with_count() {
        let cfg = ContinueConfig::default();
        assert_eq!(cfg.price_for(0), 100);
        assert_eq!(cfg.price_for(1), 200);
        assert_eq!(cfg.price_for(2), 300);
        assert_eq!(cfg.price_for(u32::MAX), u32::MAX);
    }

    #[test]
    fn rejects_empty_turn_range() {
        let mut cfg = WheelConfig::default();
        cfg.spin.extra_turns_max = cfg.spin.extra_turns_min;
        assert_eq!(
            cfg.validate(),
            Err(WheelConfigError::ExtraTurnsRange { min: 3, max: 3 })
        );
    }

    #[test]
    fn rejects_fill_that_overflows_wheel() {
        let mut cfg = WheelConfig::default();
        cfg.fill.safe_point_count = 7;
        assert!(matches!(
            cfg.validate(),
            Err(WheelConfigError::FillOverflow { zone: "safe", requested: 9, capacity: 8 })
        ));
    }

    #[test]
    fn huge_fill_counts_report_overflow() {
        let err = WheelConfig::from_json(
            r#"{"fill":{"super_chest_count":18446744073709551615,"super_point_count":1}}"#,
        )
        .unwrap_err();
        let err = err.downcast::<WheelConfigError>().unwrap();
        assert!(matches!(
            err,
            WheelConfigError::FillOverflow { zone: "super", requested: usize::MAX, capacity: 8 }
        ));
    }

    #[test]
    fn rejects_degenerate_shapes() {
        let mut cfg = WheelConfig::default();
        cfg.zone_count = 0;
        assert!(matches!(
            cfg.validate(),
            Err(WheelConfigError::MinViolation { field: "zone_count", .. })
        ));

        let mut cfg = WheelConfig::default();
        cfg.score_key = "  ".to_string();
        assert_eq!(cfg.validate(), Err(WheelConfigError::EmptyScoreKey));

        let mut cfg = WheelConfig::default();
        cfg.spin.pointer_offset_degrees = f32::NAN;
        assert!(matches!(cfg.validate(), Err(WheelConfigError::PointerOffset(_))));
    }

    #[test]
    fn from_json_surfaces_validation_errors() {
        let err = WheelConfig::from_json(r#"{ "continues": { "base_price": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("continues.base_price"));
    }
}
