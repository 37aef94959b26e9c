use anyhow::Context;

use crate::config::WheelConfig;
use crate::events::{EventBus, SubscriptionId, WheelEvent};
use crate::ledger::RewardLedger;
use crate::progression::{ContinueOutcome, ProgressionStateMachine, SpinOutcome};
use crate::rng::WheelRng;
use crate::slice::SliceCatalog;
use crate::spin::SpinPlan;
use crate::storage::ScoreStore;

/// High-level session binding the progression, the ledger, seeded RNG streams,
/// score persistence, and event subscribers.
///
/// Events queued by an operation are delivered to subscribers before the
/// operation returns. The zone load performed by [`WheelSession::open`] is
/// delivered by the next operation or by [`WheelSession::flush_events`].
#[derive(Debug)]
pub struct WheelSession<S: ScoreStore> {
    config: WheelConfig,
    machine: ProgressionStateMachine,
    ledger: RewardLedger,
    rng: WheelRng,
    seed: u64,
    store: S,
    bus: EventBus,
    local_events: Vec<WheelEvent>,
}

impl<S: ScoreStore> WheelSession<S> {
    /// Validate `config`, restore the persisted score, and load the first zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the stored score cannot be
    /// read, or the first zone cannot be filled.
    pub fn open(
        config: WheelConfig,
        catalog: SliceCatalog,
        store: S,
        seed: u64,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid wheel configuration")?;
        let score = store
            .load_score(&config.score_key)
            .with_context(|| format!("failed to load stored score `{}`", config.score_key))?
            .unwrap_or(0);
        let rng = WheelRng::from_user_seed(seed);
        let mut machine = ProgressionStateMachine::new(&config, catalog)?;
        machine.start(&mut *rng.fill())?;
        log::debug!("wheel session opened with seed {seed}, score {score}");
        Ok(Self {
            config,
            machine,
            ledger: RewardLedger::with_score(score),
            rng,
            seed,
            store,
            bus: EventBus::new(),
            local_events: Vec::new(),
        })
    }

    /// Plan and resolve a spin in one step, for headless play.
    ///
    /// Returns `Ok(None)` when no spin could start.
    ///
    /// # Errors
    ///
    /// Propagates fatal progression errors.
    pub fn spin(&mut self) -> anyhow::Result<Option<(SpinPlan, SpinOutcome)>> {
        let Some(plan) = self.begin_spin()? else {
            return Ok(None);
        };
        let outcome = self.finish_spin(plan.total_rotation)?;
        Ok(Some((plan, outcome)))
    }

    /// # Errors
    ///
    /// Propagates fatal progression errors.
    pub fn begin_spin(&mut self) -> anyhow::Result<Option<SpinPlan>> {
        let plan = self.machine.begin_spin(&mut *self.rng.spin());
        self.dispatch();
        Ok(plan?)
    }

    /// Report the wheel's final clockwise rotation once the animation stops.
    ///
    /// # Errors
    ///
    /// Propagates fatal progression errors.
    pub fn finish_spin(&mut self, final_rotation_degrees: f32) -> anyhow::Result<SpinOutcome> {
        let outcome = self.machine.finish_spin(
            final_rotation_degrees,
            &mut self.ledger,
            &mut *self.rng.fill(),
        );
        self.dispatch();
        Ok(outcome?)
    }

    /// # Errors
    ///
    /// Propagates fatal progression errors.
    pub fn accept_continue(&mut self) -> anyhow::Result<ContinueOutcome> {
        let outcome = self
            .machine
            .accept_continue(&mut self.ledger, &mut *self.rng.fill());
        self.dispatch();
        Ok(outcome?)
    }

    /// # Errors
    ///
    /// Propagates fatal progression errors.
    pub fn decline_continue(&mut self) -> anyhow::Result<ContinueOutcome> {
        let outcome = self
            .machine
            .decline_continue(&mut self.ledger, &mut *self.rng.fill());
        self.dispatch();
        Ok(outcome?)
    }

    #[must_use]
    pub fn can_cash_out(&self) -> bool {
        self.machine.can_cash_out(&self.ledger)
    }

    /// # Errors
    ///
    /// Propagates fatal progression errors.
    pub fn cash_out(&mut self) -> anyhow::Result<Option<u32>> {
        let gained = self
            .machine
            .cash_out(&mut self.ledger, &mut *self.rng.fill());
        self.dispatch();
        Ok(gained?)
    }

    /// Spend score, clamping at zero.
    pub fn spend_score(&mut self, amount: u32) {
        self.ledger.spend_score(amount);
        self.score_changed();
    }

    /// Spend score only if the whole amount is available.
    pub fn try_spend_score(&mut self, amount: u32) -> bool {
        let spent = self.ledger.try_spend_score(amount);
        if spent {
            self.score_changed();
        }
        spent
    }

    pub fn add_score(&mut self, amount: u32) {
        self.ledger.add_score(amount);
        self.score_changed();
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&WheelEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Deliver any queued events now.
    pub fn flush_events(&mut self) {
        self.dispatch();
    }

    /// Deterministically reseed the RNG streams. Current zone contents are kept.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = WheelRng::from_user_seed(seed);
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.ledger.score()
    }

    #[must_use]
    pub const fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn machine(&self) -> &ProgressionStateMachine {
        &self.machine
    }

    #[must_use]
    pub const fn config(&self) -> &WheelConfig {
        &self.config
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn rng(&self) -> &WheelRng {
        &self.rng
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn score_changed(&mut self) {
        self.local_events.push(WheelEvent::ScoreChanged {
            score: self.ledger.score(),
        });
        self.dispatch();
    }

    fn dispatch(&mut self) {
        let mut events = self.machine.drain_events();
        events.append(&mut self.local_events);
        if events.is_empty() {
            return;
        }
        if events
            .iter()
            .any(|event| matches!(event, WheelEvent::ScoreChanged { .. }))
        {
            self.persist_score();
        }
        for event in &events {
            self.bus.publish(event);
        }
    }

    fn persist_score(&self) {
        let score = self.ledger.score();
        if let Err(err) = self.store.save_score(&self.config.score_key, score) {
            log::warn!(
                "failed to persist score {score} under `{}`: {err}",
                self.config.score_key
            );
        }
    }
}
