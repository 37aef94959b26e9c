//! Visual skins selected purely from the zone index.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Skin tier for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeTier {
    Bronze,
    Silver,
    Gold,
}

impl ThemeTier {
    /// Tier for a 0-based zone index: gold from the final zone on, silver on every
    /// `safe_interval`-th zone, bronze otherwise.
    #[must_use]
    pub const fn for_zone_index(index: usize, zone_count: u32, safe_interval: u32) -> Self {
        let zone_number = index as u64 + 1;
        if zone_number >= zone_count as u64 {
            Self::Gold
        } else if safe_interval > 0 && zone_number % safe_interval as u64 == 0 {
            Self::Silver
        } else {
            Self::Bronze
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for ThemeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sprite references and background colour applied by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSkin {
    pub wheel_base: String,
    pub pointer: String,
    /// Background colour as `#RRGGBB`.
    pub background: String,
}

impl ThemeSkin {
    fn new(wheel_base: &str, pointer: &str, background: &str) -> Self {
        Self {
            wheel_base: wheel_base.to_string(),
            pointer: pointer.to_string(),
            background: background.to_string(),
        }
    }

    /// Background colour decoded to RGB, if well-formed.
    #[must_use]
    pub fn background_rgb(&self) -> Option<[u8; 3]> {
        let hex = self.background.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
    }
}

/// Skins for every tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSet {
    pub bronze: ThemeSkin,
    pub silver: ThemeSkin,
    pub gold: ThemeSkin,
}

impl ThemeSet {
    #[must_use]
    pub const fn skin(&self, tier: ThemeTier) -> &ThemeSkin {
        match tier {
            ThemeTier::Bronze => &self.bronze,
            ThemeTier::Silver => &self.silver,
            ThemeTier::Gold => &self.gold,
        }
    }
}

impl Default for ThemeSet {
    fn default() -> Self {
        Self {
            bronze: ThemeSkin::new("ui_spin_bronze_base", "ui_spin_bronze_indicator", "#2B1D14"),
            silver: ThemeSkin::new("ui_spin_silver_base", "ui_spin_silver_indicator", "#1E2630"),
            gold: ThemeSkin::new("ui_spin_golden_base", "ui_spin_golden_indicator", "#3A2A05"),
        }
    }
}

/// Tier plus the resolved skin, handed to the rendering layer on zone load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub tier: ThemeTier,
    pub skin: ThemeSkin,
}
