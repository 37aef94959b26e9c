use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use wheel_game::{
    MemoryScoreStore, Phase, ResetReason, SliceCatalog, ThemeTier, WheelConfig, WheelEvent,
    WheelSession,
};

use crate::logic::policy::{GameplayStrategy, PolicyView};

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn = Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// What to play and what to expect afterwards.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_steps: usize,
    pub starting_score: u32,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_steps: 100,
            starting_score: 0,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub const fn with_starting_score(mut self, score: u32) -> Self {
        self.starting_score = score;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: GameplayStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// One player decision, kept for failure context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    pub step: usize,
    pub zone_index: usize,
    pub action: &'static str,
}

/// Counters and invariant findings from one simulated run.
#[derive(Debug, Clone, Default)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: Option<GameplayStrategy>,
    pub steps: usize,
    pub spins: usize,
    pub starting_score: u32,
    pub final_score: u32,
    pub continues_bought: u32,
    pub continues_declined: u32,
    pub continue_spend: u64,
    pub bombs_ignored: u32,
    pub cash_outs: u32,
    pub total_banked: u64,
    pub forfeited: u64,
    pub wraps: u32,
    pub max_level: u32,
    pub zone_loads: usize,
    pub zones_visited: BTreeSet<usize>,
    pub violations: Vec<String>,
    pub decisions: Vec<DecisionRecord>,
}

impl SimulationSummary {
    /// Score the run should end with given what it banked and spent.
    #[must_use]
    pub fn expected_final_score(&self) -> u64 {
        (u64::from(self.starting_score) + self.total_banked).saturating_sub(self.continue_spend)
    }

    fn violation(&mut self, step: usize, message: impl Into<String>) {
        let message = message.into();
        log::warn!("seed {} step {step}: {message}", self.seed);
        self.violations.push(format!("step {step}: {message}"));
    }
}

/// Tracks event ordering across a single action.
#[derive(Debug, Default)]
struct EventCursor {
    evaluated_zone: Option<usize>,
    advanced_from: Option<usize>,
}

/// Plays `plan` on a fresh in-memory session and checks invariants after every action.
///
/// # Errors
///
/// Returns an error when the session reports a fatal configuration error.
pub fn run_plan(plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
    let config = WheelConfig::default_config();
    let score_key = config.score_key.clone();
    let store = MemoryScoreStore::with_value(&score_key, plan.starting_score);
    let mut session = WheelSession::open(config, SliceCatalog::load_default(), store.clone(), seed)?;

    let inbox = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&inbox);
    session.subscribe(move |event: &WheelEvent| sink.borrow_mut().push(event.clone()));
    session.flush_events();

    let mut policy = plan.strategy.create_policy();
    let mut summary = SimulationSummary {
        seed,
        strategy: Some(plan.strategy),
        starting_score: plan.starting_score,
        ..SimulationSummary::default()
    };
    let mut cursor = EventCursor::default();
    let opening: Vec<WheelEvent> = inbox.borrow_mut().drain(..).collect();
    observe_events(&session, &opening, &mut summary, &mut cursor, 0);

    for step in 0..plan.max_steps {
        let view = PolicyView::from_session(&session);
        let action = if let Phase::AwaitingContinueDecision { price } = session.machine().phase() {
            if policy.accept_continue(&view, price) {
                session.accept_continue()?;
                "continue"
            } else {
                session.decline_continue()?;
                "decline"
            }
        } else if session.can_cash_out() && policy.cash_out(&view) {
            session.cash_out()?;
            "cash_out"
        } else {
            session.spin()?;
            summary.spins += 1;
            "spin"
        };
        summary.decisions.push(DecisionRecord {
            step,
            zone_index: view.zone_index,
            action,
        });
        summary.steps = step + 1;

        let events: Vec<WheelEvent> = inbox.borrow_mut().drain(..).collect();
        observe_events(&session, &events, &mut summary, &mut cursor, step);
        check_state(&session, &store, &score_key, &mut summary, step);
    }

    summary.final_score = session.score();
    log::debug!(
        "seed {seed} {}: {} steps, final score {}",
        policy.name(),
        summary.steps,
        summary.final_score
    );
    Ok(summary)
}

fn expected_tier(zone_index: usize, zone_count: u32, safe_interval: u32) -> ThemeTier {
    let number = u64::try_from(zone_index).unwrap_or(u64::MAX).saturating_add(1);
    if number >= u64::from(zone_count) {
        ThemeTier::Gold
    } else if safe_interval > 0 && number % u64::from(safe_interval) == 0 {
        ThemeTier::Silver
    } else {
        ThemeTier::Bronze
    }
}

fn observe_events(
    session: &WheelSession<MemoryScoreStore>,
    events: &[WheelEvent],
    summary: &mut SimulationSummary,
    cursor: &mut EventCursor,
    step: usize,
) {
    let config = session.config();
    let zones = session.machine().zones();
    for event in events {
        match event {
            WheelEvent::ZoneLoaded {
                zone_index,
                level,
                theme,
                slices,
            } => {
                summary.zone_loads += 1;
                summary.zones_visited.insert(*zone_index);
                summary.max_level = summary.max_level.max(*level);
                let Some(zone) = zones.get(*zone_index) else {
                    summary.violation(step, format!("zone index {zone_index} out of range"));
                    continue;
                };
                if slices.len() != config.slices_per_zone {
                    summary.violation(
                        step,
                        format!("zone {} loaded {} slices", zone.index(), slices.len()),
                    );
                }
                let bombs = slices.iter().filter(|slice| slice.is_bomb).count();
                let expected_bombs = usize::from(!zone.kind().protects_from_bomb());
                if bombs != expected_bombs {
                    summary.violation(
                        step,
                        format!("zone {} has {bombs} bombs, expected {expected_bombs}", zone.index()),
                    );
                }
                let tier = expected_tier(*zone_index, config.zone_count, config.safe_zone_interval);
                if theme.tier != tier {
                    summary.violation(
                        step,
                        format!("zone {} themed {} instead of {tier}", zone.index(), theme.tier),
                    );
                }
                if let Some(from) = cursor.advanced_from.take() {
                    let next = (from + 1) % zones.len();
                    if *zone_index != next {
                        summary.violation(
                            step,
                            format!("advanced from {from} to {zone_index}, expected {next}"),
                        );
                    } else if next == 0 {
                        summary.wraps += 1;
                    }
                }
            }
            WheelEvent::SliceEvaluated { zone_index, .. } => {
                cursor.evaluated_zone = Some(*zone_index);
            }
            WheelEvent::RewardAdded { .. } => {
                cursor.advanced_from = cursor.evaluated_zone.take();
            }
            WheelEvent::BombIgnored { zone_index } => {
                summary.bombs_ignored += 1;
                if zones
                    .get(*zone_index)
                    .is_none_or(|zone| !zone.kind().protects_from_bomb())
                {
                    summary.violation(step, format!("bomb ignored in unprotected zone {zone_index}"));
                }
            }
            WheelEvent::ContinueAccepted {
                price,
                continue_count,
            } => {
                summary.continues_bought += 1;
                summary.continue_spend += u64::from(*price);
                let expected = config.continues.base_price.saturating_mul(*continue_count);
                if *price != expected {
                    summary.violation(
                        step,
                        format!("continue {continue_count} cost {price}, expected {expected}"),
                    );
                }
            }
            WheelEvent::RunReset { reason, forfeited } => {
                if *reason == ResetReason::ContinueDeclined {
                    summary.continues_declined += 1;
                    summary.forfeited += u64::from(*forfeited);
                }
            }
            WheelEvent::CashedOut { gained } => {
                summary.cash_outs += 1;
                summary.total_banked += u64::from(*gained);
            }
            WheelEvent::SpinStarted { .. }
            | WheelEvent::SpinFinished { .. }
            | WheelEvent::ContinueOffered { .. }
            | WheelEvent::ScoreChanged { .. } => {}
        }
    }
}

fn check_state(
    session: &WheelSession<MemoryScoreStore>,
    store: &MemoryScoreStore,
    score_key: &str,
    summary: &mut SimulationSummary,
    step: usize,
) {
    let machine = session.machine();
    if machine.current_zone_index() >= machine.zones().len() {
        summary.violation(
            step,
            format!("current zone {} out of range", machine.current_zone_index()),
        );
    }
    if machine.is_spinning() {
        summary.violation(step, "spin left pending after a full spin");
    }
    if store.get(score_key) != Some(session.score()) {
        summary.violation(
            step,
            format!(
                "stored score {:?} differs from session score {}",
                store.get(score_key),
                session.score()
            ),
        );
    }
    if machine.is_paused() && session.can_cash_out() {
        summary.violation(step, "cash-out offered while awaiting a continue decision");
    }
    if u64::from(session.score()) != summary.expected_final_score() {
        summary.violation(
            step,
            format!(
                "score {} does not match banked/spent accounting {}",
                session.score(),
                summary.expected_final_score()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_run_is_clean_and_deterministic() {
        let plan = SimulationPlan::new(GameplayStrategy::Greedy)
            .with_starting_score(1_000_000)
            .with_max_steps(200);
        let first = run_plan(&plan, 42).unwrap();
        let second = run_plan(&plan, 42).unwrap();
        assert!(first.violations.is_empty(), "{:?}", first.violations);
        assert_eq!(first.decisions, second.decisions);
        assert_eq!(first.final_score, second.final_score);
        assert_eq!(first.cash_outs, 0);
    }

    #[test]
    fn cautious_run_banks_rewards() {
        let plan = SimulationPlan::new(GameplayStrategy::Cautious).with_max_steps(300);
        let summary = run_plan(&plan, 7).unwrap();
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.continues_bought, 0);
        assert_eq!(u64::from(summary.final_score), summary.total_banked);
    }

    #[test]
    fn tier_rule_matches_zone_numbers() {
        assert_eq!(expected_tier(0, 30, 5), ThemeTier::Bronze);
        assert_eq!(expected_tier(9, 30, 5), ThemeTier::Silver);
        assert_eq!(expected_tier(29, 30, 5), ThemeTier::Gold);
    }
}
