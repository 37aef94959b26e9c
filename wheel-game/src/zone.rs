//! Zones: the stages of the progression, each holding one wheel's worth of slices.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{SAFE_ZONE_INTERVAL, SLICES_PER_ZONE, ZONE_COUNT};
use crate::rng::RandomSource;
use crate::slice::Slice;

/// Slices for one wheel, stored inline for the usual eight wedges.
pub type ZoneSlices = SmallVec<[Slice; SLICES_PER_ZONE]>;

/// Safety classification of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Bombs end the run unless a continue is bought.
    Normal,
    /// Bombs are ignored and cash-out is allowed.
    Safe,
    /// Final zone with enhanced rewards; bombs are ignored and cash-out is allowed.
    Super,
}

impl ZoneKind {
    /// Classify a 1-based zone index.
    #[must_use]
    pub const fn classify(index: u32, zone_count: u32, safe_interval: u32) -> Self {
        if index == zone_count {
            Self::Super
        } else if safe_interval > 0 && index % safe_interval == 0 {
            Self::Safe
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn protects_from_bomb(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// One stage of the progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    index: u32,
    kind: ZoneKind,
    #[serde(default)]
    slices: ZoneSlices,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    notes: String,
}

impl Zone {
    /// Create an empty zone with flags derived from its 1-based index.
    #[must_use]
    pub fn new(index: u32, zone_count: u32, safe_interval: u32) -> Self {
        Self {
            index,
            kind: ZoneKind::classify(index, zone_count, safe_interval),
            slices: ZoneSlices::new(),
            notes: String::new(),
        }
    }

    /// Attach designer notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// 1-based zone number.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn kind(&self) -> ZoneKind {
        self.kind
    }

    #[must_use]
    pub const fn is_safe_zone(&self) -> bool {
        matches!(self.kind, ZoneKind::Safe)
    }

    #[must_use]
    pub const fn is_super_zone(&self) -> bool {
        matches!(self.kind, ZoneKind::Super)
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Number of bomb slices currently on the wheel.
    #[must_use]
    pub fn bomb_count(&self) -> usize {
        self.slices.iter().filter(|slice| slice.is_bomb).count()
    }

    pub fn clear_slices(&mut self) {
        self.slices.clear();
    }

    pub fn add_slice(&mut self, slice: Slice) {
        self.slices.push(slice);
    }

    pub fn add_slices(&mut self, slices: impl IntoIterator<Item = Slice>) {
        self.slices.extend(slices);
    }

    /// Uniform Fisher-Yates permutation of the slice order.
    pub fn shuffle_slices<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let len = self.slices.len();
        for i in (1..len).rev() {
            let upper = u32::try_from(i + 1).unwrap_or(u32::MAX);
            let j = rng.range_u32(0, upper) as usize;
            self.slices.swap(i, j);
        }
    }
}

/// Build the full zone sequence `1..=zone_count` with derived flags.
#[must_use]
pub fn generate_zones(zone_count: u32, safe_interval: u32) -> Vec<Zone> {
    (1..=zone_count)
        .map(|index| Zone::new(index, zone_count, safe_interval))
        .collect()
}

/// The standard thirty-zone progression.
#[must_use]
pub fn default_zones() -> Vec<Zone> {
    generate_zones(ZONE_COUNT, SAFE_ZONE_INTERVAL)
}
