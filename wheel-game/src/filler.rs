//! Zone autofill: populates a zone's wheel from the shared slice pool.
use thiserror::Error;

use crate::config::FillConfig;
use crate::constants::SLICES_PER_ZONE;
use crate::numbers::usize_to_u32;
use crate::rng::RandomSource;
use crate::slice::{Slice, SliceCatalog};
use crate::zone::{Zone, ZoneKind};

/// Errors raised when a zone cannot be filled from the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FillError {
    #[error("zone {zone} needs a bomb slice but the catalog has none")]
    MissingBomb { zone: u32 },
}

/// Draw up to `count` items uniformly without replacement.
///
/// Asking for more than the pool holds is not an error: every item is returned,
/// in random order.
pub fn sample_without_replacement<'a, T, R>(
    pool: impl IntoIterator<Item = &'a T>,
    count: usize,
    rng: &mut R,
) -> Vec<&'a T>
where
    T: 'a,
    R: RandomSource + ?Sized,
{
    let mut items: Vec<&'a T> = pool.into_iter().collect();
    let take = count.min(items.len());
    // Partial Fisher-Yates: the first `take` positions become the sample.
    for i in 0..take {
        let span = usize_to_u32(items.len() - i);
        let j = i + rng.range_u32(0, span) as usize;
        items.swap(i, j);
    }
    items.truncate(take);
    items
}

/// Fills zones according to their category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneFiller {
    cfg: FillConfig,
    slices_per_zone: usize,
}

impl Default for ZoneFiller {
    fn default() -> Self {
        Self::new(FillConfig::default(), SLICES_PER_ZONE)
    }
}

impl ZoneFiller {
    #[must_use]
    pub const fn new(cfg: FillConfig, slices_per_zone: usize) -> Self {
        Self {
            cfg,
            slices_per_zone,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &FillConfig {
        &self.cfg
    }

    /// Replace the zone's slices with a fresh draw from `catalog`.
    ///
    /// Returns the number of slices placed. The caller decides whether a short wheel
    /// is fatal; filling itself never pads.
    ///
    /// # Errors
    ///
    /// Returns [`FillError::MissingBomb`] when the zone needs a bomb and the catalog has none.
    /// The zone is left untouched in that case.
    pub fn fill<R: RandomSource + ?Sized>(
        &self,
        zone: &mut Zone,
        catalog: &SliceCatalog,
        rng: &mut R,
    ) -> Result<usize, FillError> {
        let needs_bomb = match zone.kind() {
            ZoneKind::Normal => true,
            ZoneKind::Safe => self.cfg.bomb_in_safe_zones,
            ZoneKind::Super => self.cfg.bomb_in_super_zone,
        };
        let bomb = if needs_bomb {
            Some(
                catalog
                    .bomb_slice()
                    .ok_or(FillError::MissingBomb { zone: zone.index() })?,
            )
        } else {
            None
        };

        zone.clear_slices();
        match zone.kind() {
            ZoneKind::Super => self.fill_super(zone, catalog, rng),
            ZoneKind::Safe => self.fill_safe(zone, catalog, rng),
            ZoneKind::Normal => self.fill_normal(zone, catalog, rng),
        }
        if let Some(bomb) = bomb {
            zone.add_slice(bomb.clone());
        }
        Ok(zone.slices().len())
    }

    /// Fill then shuffle, as done every time a zone is entered.
    ///
    /// # Errors
    ///
    /// Propagates [`FillError`] from [`ZoneFiller::fill`].
    pub fn fill_and_shuffle<R: RandomSource + ?Sized>(
        &self,
        zone: &mut Zone,
        catalog: &SliceCatalog,
        rng: &mut R,
    ) -> Result<usize, FillError> {
        let placed = self.fill(zone, catalog, rng)?;
        zone.shuffle_slices(rng);
        Ok(placed)
    }

    fn fill_super<R: RandomSource + ?Sized>(
        &self,
        zone: &mut Zone,
        catalog: &SliceCatalog,
        rng: &mut R,
    ) {
        let high_chests = catalog
            .chest_slices()
            .iter()
            .filter(|slice| slice.reward_value >= self.cfg.super_chest_min_value);
        let chests = sample_without_replacement(high_chests, self.cfg.super_chest_count, rng);
        zone.add_slices(chests.into_iter().cloned());

        let high_points = catalog
            .point_slices()
            .iter()
            .filter(|slice| slice.reward_value >= self.cfg.super_point_min_value);
        let points = sample_without_replacement(high_points, self.cfg.super_point_count, rng);
        zone.add_slices(points.into_iter().cloned());

        if self.cfg.super_include_special
            && let Some(special) = catalog.special_chest()
        {
            zone.add_slice(special.clone());
        }
    }

    fn fill_safe<R: RandomSource + ?Sized>(
        &self,
        zone: &mut Zone,
        catalog: &SliceCatalog,
        rng: &mut R,
    ) {
        let chests = sample_without_replacement(catalog.chest_slices(), self.cfg.safe_chest_count, rng);
        zone.add_slices(chests.into_iter().cloned());
        let points = sample_without_replacement(catalog.point_slices(), self.cfg.safe_point_count, rng);
        zone.add_slices(points.into_iter().cloned());
    }

    fn fill_normal<R: RandomSource + ?Sized>(
        &self,
        zone: &mut Zone,
        catalog: &SliceCatalog,
        rng: &mut R,
    ) {
        let remaining = self.slices_per_zone.saturating_sub(1);
        let pool = catalog
            .point_slices()
            .iter()
            .chain(catalog.chest_slices().iter());
        let picked: Vec<&Slice> = sample_without_replacement(pool, remaining, rng);
        zone.add_slices(picked.into_iter().cloned());
    }
}
