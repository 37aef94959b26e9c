//! Zone progression state machine.
//!
//! Drives a run through the zones: loads and fills each zone, plans spins,
//! applies spin results to the [`RewardLedger`], and handles the continue
//! offer after a bomb and the cash-out in protected zones. Every state change
//! is queued as a [`WheelEvent`]; callers drain the queue with
//! [`ProgressionStateMachine::drain_events`].
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ContinueConfig, WheelConfig, WheelConfigError};
use crate::events::{ResetReason, WheelEvent};
use crate::filler::{FillError, ZoneFiller};
use crate::ledger::RewardLedger;
use crate::numbers::usize_to_u32;
use crate::rng::RandomSource;
use crate::slice::{Slice, SliceCatalog};
use crate::spin::{SpinError, SpinPlan, SpinPlanner};
use crate::theme::{Theme, ThemeSet, ThemeTier};
use crate::zone::{Zone, generate_zones};

/// Fatal configuration errors. State is left as it was before the call.
#[derive(Debug, Error, PartialEq)]
pub enum ProgressionError {
    #[error("progression has no zones")]
    EmptyZones,
    #[error("zone index {index} is out of range for {len} zones")]
    ZoneOutOfRange { index: usize, len: usize },
    #[error("zone {zone} holds {actual} slices, expected {expected}")]
    SliceCount {
        zone: u32,
        expected: usize,
        actual: usize,
    },
    #[error("slice index {index} is out of range for zone {zone}")]
    SliceOutOfRange { zone: u32, index: usize },
    #[error(transparent)]
    Config(#[from] WheelConfigError),
    #[error(transparent)]
    Fill(#[from] FillError),
    #[error(transparent)]
    Spin(#[from] SpinError),
}

fn fatal(err: impl Into<ProgressionError>) -> ProgressionError {
    let err = err.into();
    log::error!("progression aborted: {err}");
    err
}

/// Whether progression is running or blocked on the continue offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Active,
    AwaitingContinueDecision { price: u32 },
}

/// What a resolved spin did to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinOutcome {
    /// Reward banked to the earned list and the run moved to `zone_index`.
    Advanced { slice: Slice, zone_index: usize },
    /// Bomb in a safe or super zone.
    BombIgnored,
    /// Bomb in a normal zone; the run waits for a continue decision.
    ContinueOffered { price: u32 },
    /// Nothing to resolve, or progression is paused.
    Ignored,
}

/// Result of answering a continue offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueOutcome {
    /// Price paid; the run stays in the current zone.
    Continued { price: u32 },
    /// Earned rewards were dropped and the run restarted at the first zone.
    Forfeited { forfeited: u32 },
    /// No offer was pending.
    NotOffered,
}

#[derive(Debug, Clone)]
pub struct ProgressionStateMachine {
    zones: Vec<Zone>,
    catalog: SliceCatalog,
    filler: ZoneFiller,
    planner: SpinPlanner,
    continues: ContinueConfig,
    themes: ThemeSet,
    safe_zone_interval: u32,
    slices_per_zone: usize,
    current_zone_index: usize,
    level_number: u32,
    phase: Phase,
    pending_spin: Option<SpinPlan>,
    events: Vec<WheelEvent>,
}

impl ProgressionStateMachine {
    /// Build the machine with zones generated from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or yields no zones.
    pub fn new(config: &WheelConfig, catalog: SliceCatalog) -> Result<Self, ProgressionError> {
        config.validate().map_err(fatal)?;
        let zones = generate_zones(config.zone_count, config.safe_zone_interval);
        Self::with_zones(config, zones, catalog)
    }

    /// Build the machine over an explicit zone list.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::EmptyZones`] for an empty list.
    pub fn with_zones(
        config: &WheelConfig,
        zones: Vec<Zone>,
        catalog: SliceCatalog,
    ) -> Result<Self, ProgressionError> {
        if zones.is_empty() {
            return Err(fatal(ProgressionError::EmptyZones));
        }
        Ok(Self {
            zones,
            catalog,
            filler: ZoneFiller::new(config.fill.clone(), config.slices_per_zone),
            planner: SpinPlanner::new(config.spin.clone()),
            continues: config.continues.clone(),
            themes: config.themes.clone(),
            safe_zone_interval: config.safe_zone_interval,
            slices_per_zone: config.slices_per_zone,
            current_zone_index: 0,
            level_number: 1,
            phase: Phase::Active,
            pending_spin: None,
            events: Vec::new(),
        })
    }

    /// Begin a fresh run at the first zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the first zone cannot be filled.
    pub fn start<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<(), ProgressionError> {
        self.phase = Phase::Active;
        self.pending_spin = None;
        self.enter_zone(0, 1, rng)
    }

    /// Jump to `index`, refilling and reshuffling it. Keeps the level number.
    ///
    /// Returns `Ok(false)` without loading while a spin is in flight or a
    /// continue decision is pending.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range index or a failed fill.
    pub fn load_zone<R: RandomSource + ?Sized>(
        &mut self,
        index: usize,
        rng: &mut R,
    ) -> Result<bool, ProgressionError> {
        if self.is_paused() || self.is_spinning() {
            log::debug!("zone load to {index} skipped while paused or spinning");
            return Ok(false);
        }
        self.enter_zone(index, self.level_number, rng)?;
        Ok(true)
    }

    /// Plan a spin on the current zone.
    ///
    /// Returns `Ok(None)` while paused or already spinning.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::SliceCount`] when the wheel is not fully populated.
    pub fn begin_spin<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<SpinPlan>, ProgressionError> {
        if self.is_paused() || self.is_spinning() {
            return Ok(None);
        }
        let zone = self.current_zone();
        let actual = zone.slices().len();
        if actual != self.slices_per_zone {
            return Err(fatal(ProgressionError::SliceCount {
                zone: zone.index(),
                expected: self.slices_per_zone,
                actual,
            }));
        }
        let plan = self.planner.plan(actual, rng).map_err(fatal)?;
        log::debug!(
            "spin on zone {}: target {} after {} turns",
            zone.index(),
            plan.target_index,
            plan.extra_turns
        );
        self.pending_spin = Some(plan);
        self.events.push(WheelEvent::SpinStarted { plan });
        Ok(Some(plan))
    }

    /// Resolve the stopped wheel and apply the landed slice.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-finite rotation (the spin stays pending) or a
    /// failed zone load.
    pub fn finish_spin<R: RandomSource + ?Sized>(
        &mut self,
        final_rotation_degrees: f32,
        ledger: &mut RewardLedger,
        rng: &mut R,
    ) -> Result<SpinOutcome, ProgressionError> {
        if self.pending_spin.is_none() {
            return Ok(SpinOutcome::Ignored);
        }
        let resolved_index = self
            .planner
            .resolve(final_rotation_degrees, self.current_zone().slices().len())
            .map_err(fatal)?;
        self.pending_spin = None;
        self.events.push(WheelEvent::SpinFinished { resolved_index });
        self.handle_slice_result(resolved_index, ledger, rng)
    }

    /// Apply the slice at `slice_index` of the current zone.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range slice or a failed zone load.
    pub fn handle_slice_result<R: RandomSource + ?Sized>(
        &mut self,
        slice_index: usize,
        ledger: &mut RewardLedger,
        rng: &mut R,
    ) -> Result<SpinOutcome, ProgressionError> {
        if self.is_paused() {
            log::debug!("slice result ignored while awaiting continue decision");
            return Ok(SpinOutcome::Ignored);
        }
        let zone = self.current_zone();
        let Some(slice) = zone.slices().get(slice_index).cloned() else {
            return Err(fatal(ProgressionError::SliceOutOfRange {
                zone: zone.index(),
                index: slice_index,
            }));
        };
        let protected = zone.kind().protects_from_bomb();
        let zone_index = self.current_zone_index;

        if slice.is_bomb {
            self.events.push(WheelEvent::SliceEvaluated {
                zone_index,
                slice: slice.clone(),
            });
            if protected {
                log::debug!("bomb ignored in protected zone {}", zone_index + 1);
                self.events.push(WheelEvent::BombIgnored { zone_index });
                return Ok(SpinOutcome::BombIgnored);
            }
            let price = ledger.continue_price(&self.continues);
            log::info!(
                "bomb in zone {}: continue offered for {price}",
                zone_index + 1
            );
            self.phase = Phase::AwaitingContinueDecision { price };
            self.events.push(WheelEvent::ContinueOffered { price });
            return Ok(SpinOutcome::ContinueOffered { price });
        }

        let next = (zone_index + 1) % self.zones.len();
        let staged = self.stage_zone(next, rng)?;
        ledger.add_reward(slice.clone());
        self.events.push(WheelEvent::SliceEvaluated {
            zone_index,
            slice: slice.clone(),
        });
        self.events.push(WheelEvent::RewardAdded {
            slice: slice.clone(),
            pending_value: ledger.pending_value(),
        });
        self.commit_zone(next, staged, self.level_number.saturating_add(1));
        Ok(SpinOutcome::Advanced {
            slice,
            zone_index: next,
        })
    }

    /// Pay for a continue. Falls through to [`Self::decline_continue`] when the
    /// score cannot cover the price.
    ///
    /// # Errors
    ///
    /// Propagates zone load failures from the decline path.
    pub fn accept_continue<R: RandomSource + ?Sized>(
        &mut self,
        ledger: &mut RewardLedger,
        rng: &mut R,
    ) -> Result<ContinueOutcome, ProgressionError> {
        let Phase::AwaitingContinueDecision { price } = self.phase else {
            return Ok(ContinueOutcome::NotOffered);
        };
        if !ledger.try_spend_score(price) {
            log::info!(
                "continue refused: score {} below price {price}",
                ledger.score()
            );
            return self.decline_continue(ledger, rng);
        }
        ledger.increment_continue_count();
        self.phase = Phase::Active;
        let zone_index = self.current_zone_index;
        self.zones[zone_index].shuffle_slices(rng);
        log::info!(
            "continue {} bought for {price}, score now {}",
            ledger.continue_count(),
            ledger.score()
        );
        self.events.push(WheelEvent::ContinueAccepted {
            price,
            continue_count: ledger.continue_count(),
        });
        self.events.push(WheelEvent::ScoreChanged {
            score: ledger.score(),
        });
        self.push_zone_loaded();
        Ok(ContinueOutcome::Continued { price })
    }

    /// Forfeit earned rewards and restart at the first zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the first zone cannot be filled.
    pub fn decline_continue<R: RandomSource + ?Sized>(
        &mut self,
        ledger: &mut RewardLedger,
        rng: &mut R,
    ) -> Result<ContinueOutcome, ProgressionError> {
        if !self.is_paused() {
            return Ok(ContinueOutcome::NotOffered);
        }
        let staged = self.stage_zone(0, rng)?;
        let forfeited = ledger.pending_value();
        ledger.reset_rewards();
        ledger.reset_continue_cycle();
        self.phase = Phase::Active;
        log::info!("run reset after bomb, {forfeited} forfeited");
        self.events.push(WheelEvent::RunReset {
            reason: ResetReason::ContinueDeclined,
            forfeited,
        });
        self.commit_zone(0, staged, 1);
        Ok(ContinueOutcome::Forfeited { forfeited })
    }

    /// Cash-out needs a protected zone, earned rewards, no spin in flight and
    /// no pending continue offer.
    #[must_use]
    pub fn can_cash_out(&self, ledger: &RewardLedger) -> bool {
        !self.is_paused()
            && !self.is_spinning()
            && ledger.has_earned()
            && self.current_zone().kind().protects_from_bomb()
    }

    /// Bank earned rewards and restart at the first zone.
    ///
    /// Returns `Ok(None)` when cash-out is not allowed right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the first zone cannot be filled.
    pub fn cash_out<R: RandomSource + ?Sized>(
        &mut self,
        ledger: &mut RewardLedger,
        rng: &mut R,
    ) -> Result<Option<u32>, ProgressionError> {
        if !self.can_cash_out(ledger) {
            return Ok(None);
        }
        let staged = self.stage_zone(0, rng)?;
        let gained = ledger.convert_all_rewards_to_score();
        ledger.reset_continue_cycle();
        log::info!("cashed out {gained}, score now {}", ledger.score());
        self.events.push(WheelEvent::CashedOut { gained });
        self.events.push(WheelEvent::ScoreChanged {
            score: ledger.score(),
        });
        self.events.push(WheelEvent::RunReset {
            reason: ResetReason::CashedOut,
            forfeited: 0,
        });
        self.commit_zone(0, staged, 1);
        Ok(Some(gained))
    }

    #[must_use]
    pub fn current_zone(&self) -> &Zone {
        &self.zones[self.current_zone_index]
    }

    /// 0-based index of the active zone.
    #[must_use]
    pub const fn current_zone_index(&self) -> usize {
        self.current_zone_index
    }

    #[must_use]
    pub const fn level_number(&self) -> u32 {
        self.level_number
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::AwaitingContinueDecision { .. })
    }

    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        self.pending_spin.is_some()
    }

    #[must_use]
    pub const fn pending_spin(&self) -> Option<&SpinPlan> {
        self.pending_spin.as_ref()
    }

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[must_use]
    pub const fn catalog(&self) -> &SliceCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn slices_per_zone(&self) -> usize {
        self.slices_per_zone
    }

    /// Theme of the active zone.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme_for(self.current_zone_index)
    }

    /// Theme for any 0-based zone index.
    #[must_use]
    pub fn theme_for(&self, index: usize) -> Theme {
        let tier = ThemeTier::for_zone_index(
            index,
            usize_to_u32(self.zones.len()),
            self.safe_zone_interval,
        );
        Theme {
            tier,
            skin: self.themes.skin(tier).clone(),
        }
    }

    /// Take every event queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<WheelEvent> {
        std::mem::take(&mut self.events)
    }

    fn enter_zone<R: RandomSource + ?Sized>(
        &mut self,
        index: usize,
        level: u32,
        rng: &mut R,
    ) -> Result<(), ProgressionError> {
        let staged = self.stage_zone(index, rng)?;
        self.commit_zone(index, staged, level);
        Ok(())
    }

    /// Fill a copy of the zone at `index`; nothing changes until it is committed.
    fn stage_zone<R: RandomSource + ?Sized>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> Result<Zone, ProgressionError> {
        let len = self.zones.len();
        let Some(zone) = self.zones.get(index) else {
            return Err(fatal(ProgressionError::ZoneOutOfRange { index, len }));
        };
        let mut zone = zone.clone();
        let placed = self
            .filler
            .fill_and_shuffle(&mut zone, &self.catalog, rng)
            .map_err(fatal)?;
        if placed != self.slices_per_zone {
            log::warn!(
                "zone {} filled with {placed} of {} slices",
                zone.index(),
                self.slices_per_zone
            );
        }
        Ok(zone)
    }

    fn commit_zone(&mut self, index: usize, zone: Zone, level: u32) {
        self.zones[index] = zone;
        self.current_zone_index = index;
        self.level_number = level;
        log::debug!(
            "zone {} loaded at level {level} ({})",
            index + 1,
            self.theme().tier
        );
        self.push_zone_loaded();
    }

    fn push_zone_loaded(&mut self) {
        let event = WheelEvent::ZoneLoaded {
            zone_index: self.current_zone_index,
            level: self.level_number,
            theme: self.theme(),
            slices: self.current_zone().slices().to_vec(),
        };
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FillConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn started(config: &WheelConfig) -> (ProgressionStateMachine, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
        let mut machine =
            ProgressionStateMachine::new(config, SliceCatalog::load_default()).unwrap();
        machine.start(&mut rng).unwrap();
        (machine, rng)
    }

    fn bomb_index(machine: &ProgressionStateMachine) -> usize {
        machine
            .current_zone()
            .slices()
            .iter()
            .position(|slice| slice.is_bomb)
            .unwrap()
    }

    fn reward_index(machine: &ProgressionStateMachine) -> usize {
        machine
            .current_zone()
            .slices()
            .iter()
            .position(|slice| !slice.is_bomb)
            .unwrap()
    }

    fn bombed(score: u32) -> (ProgressionStateMachine, SmallRng, RewardLedger) {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::with_score(score);
        let first = reward_index(&machine);
        machine
            .handle_slice_result(first, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(machine.current_zone_index(), 1);
        let bomb = bomb_index(&machine);
        let outcome = machine
            .handle_slice_result(bomb, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(outcome, SpinOutcome::ContinueOffered { price: 100 });
        (machine, rng, ledger)
    }

    #[test]
    fn start_loads_first_zone() {
        let (mut machine, _) = started(&WheelConfig::default());
        assert_eq!(machine.current_zone_index(), 0);
        assert_eq!(machine.level_number(), 1);
        assert_eq!(machine.current_zone().slices().len(), 8);
        assert_eq!(machine.current_zone().bomb_count(), 1);
        assert_eq!(machine.theme().tier, ThemeTier::Bronze);
        let events = machine.drain_events();
        assert!(matches!(
            events.as_slice(),
            [WheelEvent::ZoneLoaded { zone_index: 0, level: 1, .. }]
        ));
        assert!(machine.drain_events().is_empty());
    }

    #[test]
    fn reward_advances_zone_and_level() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::default();
        let index = reward_index(&machine);
        let expected = machine.current_zone().slices()[index].clone();
        let outcome = machine
            .handle_slice_result(index, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(
            outcome,
            SpinOutcome::Advanced {
                slice: expected.clone(),
                zone_index: 1
            }
        );
        assert_eq!(ledger.earned(), &[expected]);
        assert_eq!(machine.level_number(), 2);
    }

    #[test]
    fn last_zone_wraps_to_first() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::default();
        machine.level_number = 29;
        assert!(machine.load_zone(29, &mut rng).unwrap());
        assert!(machine.current_zone().is_super_zone());
        assert_eq!(machine.theme().tier, ThemeTier::Gold);

        let outcome = machine.handle_slice_result(0, &mut ledger, &mut rng).unwrap();
        assert!(matches!(outcome, SpinOutcome::Advanced { zone_index: 0, .. }));
        assert_eq!(machine.current_zone_index(), 0);
        assert_eq!(machine.level_number(), 30, "level keeps counting across loops");
        assert_eq!(machine.theme().tier, ThemeTier::Bronze);
    }

    #[test]
    fn bomb_in_safe_zone_is_ignored() {
        let config = WheelConfig {
            fill: FillConfig {
                bomb_in_safe_zones: true,
                safe_point_count: 5,
                ..FillConfig::default()
            },
            ..WheelConfig::default()
        };
        let (mut machine, mut rng) = started(&config);
        let mut ledger = RewardLedger::with_score(10);
        machine.load_zone(4, &mut rng).unwrap();
        assert_eq!(machine.theme().tier, ThemeTier::Silver);
        let bomb = bomb_index(&machine);
        machine.drain_events();

        let outcome = machine
            .handle_slice_result(bomb, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(outcome, SpinOutcome::BombIgnored);
        assert_eq!(machine.current_zone_index(), 4);
        assert_eq!(machine.phase(), Phase::Active);
        assert_eq!(ledger, RewardLedger::with_score(10));
        assert_eq!(
            machine.drain_events().last(),
            Some(&WheelEvent::BombIgnored { zone_index: 4 })
        );
    }

    #[test]
    fn bomb_in_normal_zone_pauses_progression() {
        let (mut machine, mut rng, mut ledger) = bombed(0);
        assert!(machine.is_paused());
        assert_eq!(machine.begin_spin(&mut rng).unwrap(), None);
        assert!(!machine.load_zone(3, &mut rng).unwrap());
        assert_eq!(
            machine.handle_slice_result(0, &mut ledger, &mut rng).unwrap(),
            SpinOutcome::Ignored
        );
        assert!(!machine.can_cash_out(&ledger));
        assert_eq!(machine.current_zone_index(), 1);
    }

    #[test]
    fn accepting_continue_spends_and_keeps_zone() {
        let (mut machine, mut rng, mut ledger) = bombed(250);
        let mut before: Vec<String> = machine
            .current_zone()
            .slices()
            .iter()
            .map(|s| s.id.clone())
            .collect();

        let outcome = machine.accept_continue(&mut ledger, &mut rng).unwrap();
        assert_eq!(outcome, ContinueOutcome::Continued { price: 100 });
        assert_eq!(ledger.score(), 150);
        assert_eq!(ledger.continue_count(), 1);
        assert_eq!(ledger.earned().len(), 1);
        assert_eq!(machine.current_zone_index(), 1);
        assert_eq!(machine.phase(), Phase::Active);

        let mut after: Vec<String> = machine
            .current_zone()
            .slices()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        before.sort();
        after.sort();
        assert_eq!(before, after, "reshuffle keeps the same slices");

        // the next offer costs more
        let bomb = bomb_index(&machine);
        let outcome = machine
            .handle_slice_result(bomb, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(outcome, SpinOutcome::ContinueOffered { price: 200 });
    }

    #[test]
    fn declining_continue_forfeits_and_resets() {
        let (mut machine, mut rng, mut ledger) = bombed(250);
        let forfeited = ledger.pending_value();
        let outcome = machine.decline_continue(&mut ledger, &mut rng).unwrap();
        assert_eq!(outcome, ContinueOutcome::Forfeited { forfeited });
        assert_eq!(ledger.score(), 250);
        assert!(ledger.earned().is_empty());
        assert_eq!(ledger.continue_count(), 0);
        assert_eq!(machine.current_zone_index(), 0);
        assert_eq!(machine.level_number(), 1);
        assert_eq!(machine.phase(), Phase::Active);
    }

    #[test]
    fn unaffordable_continue_takes_decline_path() {
        let (mut machine, mut rng, mut ledger) = bombed(99);
        let outcome = machine.accept_continue(&mut ledger, &mut rng).unwrap();
        assert!(matches!(outcome, ContinueOutcome::Forfeited { .. }));
        assert_eq!(ledger.score(), 99);
        assert_eq!(machine.current_zone_index(), 0);
    }

    #[test]
    fn continue_without_offer_is_a_no_op() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::with_score(500);
        assert_eq!(
            machine.accept_continue(&mut ledger, &mut rng).unwrap(),
            ContinueOutcome::NotOffered
        );
        assert_eq!(
            machine.decline_continue(&mut ledger, &mut rng).unwrap(),
            ContinueOutcome::NotOffered
        );
        assert_eq!(ledger.score(), 500);
    }

    #[test]
    fn cash_out_only_in_protected_zones_with_rewards() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::with_score(5);
        ledger.add_reward(Slice::points("a", 20));
        ledger.add_reward(Slice::chest("b", 3));
        ledger.increment_continue_count();

        assert_eq!(machine.cash_out(&mut ledger, &mut rng).unwrap(), None);

        machine.load_zone(9, &mut rng).unwrap();
        assert!(machine.current_zone().is_safe_zone());
        assert!(machine.can_cash_out(&ledger));
        assert_eq!(machine.cash_out(&mut ledger, &mut rng).unwrap(), Some(23));
        assert_eq!(ledger.score(), 28);
        assert!(ledger.earned().is_empty());
        assert_eq!(ledger.continue_count(), 0);
        assert_eq!(machine.current_zone_index(), 0);
        assert_eq!(machine.level_number(), 1);

        machine.load_zone(29, &mut rng).unwrap();
        assert!(!machine.can_cash_out(&ledger), "nothing earned");
    }

    #[test]
    fn cash_out_blocked_mid_spin() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::default();
        ledger.add_reward(Slice::points("a", 5));
        machine.load_zone(4, &mut rng).unwrap();
        assert!(machine.begin_spin(&mut rng).unwrap().is_some());
        assert!(!machine.can_cash_out(&ledger));
        assert_eq!(machine.cash_out(&mut ledger, &mut rng).unwrap(), None);
        assert!(!machine.load_zone(0, &mut rng).unwrap());
    }

    #[test]
    fn spin_resolves_planned_slice() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::default();
        for _ in 0..40 {
            if machine.is_paused() {
                machine.decline_continue(&mut ledger, &mut rng).unwrap();
            }
            let plan = machine.begin_spin(&mut rng).unwrap().unwrap();
            assert!(machine.begin_spin(&mut rng).unwrap().is_none(), "one spin at a time");
            let landed = machine.current_zone().slices()[plan.resolved_index].clone();
            let outcome = machine
                .finish_spin(plan.total_rotation, &mut ledger, &mut rng)
                .unwrap();
            assert!(!machine.is_spinning());
            match outcome {
                SpinOutcome::Advanced { slice, .. } => assert_eq!(slice, landed),
                SpinOutcome::ContinueOffered { .. } | SpinOutcome::BombIgnored => {
                    assert!(landed.is_bomb);
                }
                SpinOutcome::Ignored => panic!("pending spin was ignored"),
            }
        }
        assert_eq!(
            machine.finish_spin(0.0, &mut ledger, &mut rng).unwrap(),
            SpinOutcome::Ignored
        );
    }

    #[test]
    fn non_finite_rotation_keeps_spin_pending() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        let mut ledger = RewardLedger::default();
        machine.begin_spin(&mut rng).unwrap();
        let err = machine
            .finish_spin(f32::INFINITY, &mut ledger, &mut rng)
            .unwrap_err();
        assert!(matches!(err, ProgressionError::Spin(_)));
        assert!(machine.is_spinning());
    }

    #[test]
    fn short_wheel_is_a_fatal_configuration_error() {
        let catalog = SliceCatalog::new(
            vec![Slice::points("p5", 5), Slice::points("p10", 10)],
            vec![Slice::chest("c1", 1)],
            Some(Slice::bomb("bomb")),
        )
        .unwrap();
        let config = WheelConfig::default();
        let mut machine = ProgressionStateMachine::new(&config, catalog).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        machine.start(&mut rng).unwrap();
        assert_eq!(
            machine.begin_spin(&mut rng),
            Err(ProgressionError::SliceCount {
                zone: 1,
                expected: 8,
                actual: 4
            })
        );
        assert!(!machine.is_spinning());
    }

    #[test]
    fn empty_zone_list_is_rejected() {
        let err = ProgressionStateMachine::with_zones(
            &WheelConfig::default(),
            Vec::new(),
            SliceCatalog::load_default(),
        )
        .unwrap_err();
        assert_eq!(err, ProgressionError::EmptyZones);
    }

    fn bombless_catalog() -> SliceCatalog {
        SliceCatalog::new(
            (1..=8).map(|i| Slice::points(&format!("p{i}"), i * 5)).collect(),
            (1..=6).map(|i| Slice::chest(&format!("c{i}"), i)).collect(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn failed_advance_keeps_reward_and_zone() {
        let zones = vec![Zone::new(5, 30, 5), Zone::new(6, 30, 5)];
        let mut machine = ProgressionStateMachine::with_zones(
            &WheelConfig::default(),
            zones,
            bombless_catalog(),
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        machine.start(&mut rng).unwrap();
        machine.drain_events();
        let mut ledger = RewardLedger::with_score(40);

        let err = machine
            .handle_slice_result(0, &mut ledger, &mut rng)
            .unwrap_err();
        assert_eq!(err, ProgressionError::Fill(FillError::MissingBomb { zone: 6 }));
        assert_eq!(ledger, RewardLedger::with_score(40));
        assert_eq!(machine.current_zone_index(), 0);
        assert_eq!(machine.level_number(), 1);
        assert!(machine.zones()[1].slices().is_empty());
        assert!(machine.drain_events().is_empty());
    }

    #[test]
    fn failed_decline_keeps_rewards_and_offer() {
        let (mut machine, mut rng, mut ledger) = bombed(250);
        machine.drain_events();
        machine.catalog = bombless_catalog();
        let before = ledger.clone();

        let err = machine
            .decline_continue(&mut ledger, &mut rng)
            .unwrap_err();
        assert_eq!(err, ProgressionError::Fill(FillError::MissingBomb { zone: 1 }));
        assert_eq!(ledger, before);
        assert_eq!(machine.phase(), Phase::AwaitingContinueDecision { price: 100 });
        assert_eq!(machine.current_zone_index(), 1);
        assert!(machine.drain_events().is_empty());

        // the fallback from an unaffordable accept fails the same way
        let mut broke = RewardLedger::with_score(10);
        broke.add_reward(Slice::points("a", 5));
        let snapshot = broke.clone();
        assert!(machine.accept_continue(&mut broke, &mut rng).is_err());
        assert_eq!(broke, snapshot);
        assert!(machine.is_paused());
    }

    #[test]
    fn failed_cash_out_keeps_earned_rewards() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        machine.load_zone(9, &mut rng).unwrap();
        machine.drain_events();
        machine.catalog = bombless_catalog();
        let mut ledger = RewardLedger::with_score(5);
        ledger.add_reward(Slice::chest("b", 3));
        let before = ledger.clone();

        let err = machine.cash_out(&mut ledger, &mut rng).unwrap_err();
        assert_eq!(err, ProgressionError::Fill(FillError::MissingBomb { zone: 1 }));
        assert_eq!(ledger, before);
        assert_eq!(machine.current_zone_index(), 9);
        assert!(machine.can_cash_out(&ledger));
        assert!(machine.drain_events().is_empty());
    }

    #[test]
    fn out_of_range_zone_load_leaves_state() {
        let (mut machine, mut rng) = started(&WheelConfig::default());
        assert_eq!(
            machine.load_zone(30, &mut rng),
            Err(ProgressionError::ZoneOutOfRange { index: 30, len: 30 })
        );
        assert_eq!(machine.current_zone_index(), 0);
    }
}
