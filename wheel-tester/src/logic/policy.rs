use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use wheel_game::{WheelSession, ZoneKind};

/// Snapshot of the run handed to a [`PlayerPolicy`] before each decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyView {
    pub zone_index: usize,
    pub zone_kind: ZoneKind,
    pub score: u32,
}

impl PolicyView {
    #[must_use]
    pub fn from_session<S: wheel_game::ScoreStore>(session: &WheelSession<S>) -> Self {
        let machine = session.machine();
        Self {
            zone_index: machine.current_zone_index(),
            zone_kind: machine.current_zone().kind(),
            score: session.score(),
        }
    }
}

/// Policy interface for automated play.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Bank earned rewards now? Only asked when cash-out is allowed.
    fn cash_out(&mut self, view: &PolicyView) -> bool;

    /// Pay `price` to keep the run alive after a bomb?
    fn accept_continue(&mut self, view: &PolicyView, price: u32) -> bool;
}

/// Built-in play strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameplayStrategy {
    /// Never cashes out; buys every continue it can afford.
    Greedy,
    /// Cashes out at the first protected zone; never buys continues.
    Cautious,
    /// Buys continues when affordable and cashes out at the super zone.
    Continuer,
}

impl GameplayStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Greedy => "Greedy",
            Self::Cautious => "Cautious",
            Self::Continuer => "Continuer",
        }
    }

    #[must_use]
    pub fn create_policy(self) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Greedy => Box::new(GreedyPolicy),
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Continuer => Box::new(ContinuerPolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct GreedyPolicy;
struct CautiousPolicy;
struct ContinuerPolicy;

impl PlayerPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn cash_out(&mut self, _view: &PolicyView) -> bool {
        false
    }

    fn accept_continue(&mut self, view: &PolicyView, price: u32) -> bool {
        view.score >= price
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn cash_out(&mut self, _view: &PolicyView) -> bool {
        true
    }

    fn accept_continue(&mut self, _view: &PolicyView, _price: u32) -> bool {
        false
    }
}

impl PlayerPolicy for ContinuerPolicy {
    fn name(&self) -> &'static str {
        "Continuer"
    }

    fn cash_out(&mut self, view: &PolicyView) -> bool {
        view.zone_kind == ZoneKind::Super
    }

    fn accept_continue(&mut self, view: &PolicyView, price: u32) -> bool {
        view.score >= price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(zone_kind: ZoneKind, score: u32) -> PolicyView {
        PolicyView {
            zone_index: 4,
            zone_kind,
            score,
        }
    }

    #[test]
    fn view_reflects_opened_session() {
        let config = wheel_game::WheelConfig::default();
        let store = wheel_game::MemoryScoreStore::with_value(&config.score_key, 320);
        let session =
            WheelSession::open(config, wheel_game::SliceCatalog::load_default(), store, 9).unwrap();
        let view = PolicyView::from_session(&session);
        assert_eq!(view.zone_index, 0);
        assert_eq!(view.zone_kind, ZoneKind::Normal);
        assert_eq!(view.score, 320);
    }

    #[test]
    fn greedy_rides_and_pays() {
        let mut policy = GameplayStrategy::Greedy.create_policy();
        assert!(!policy.cash_out(&view(ZoneKind::Super, 0)));
        assert!(policy.accept_continue(&view(ZoneKind::Normal, 100), 100));
        assert!(!policy.accept_continue(&view(ZoneKind::Normal, 99), 100));
    }

    #[test]
    fn cautious_banks_and_never_pays() {
        let mut policy = GameplayStrategy::Cautious.create_policy();
        assert!(policy.cash_out(&view(ZoneKind::Safe, 0)));
        assert!(!policy.accept_continue(&view(ZoneKind::Normal, 10_000), 100));
    }

    #[test]
    fn continuer_waits_for_super_zone() {
        let mut policy = GameplayStrategy::Continuer.create_policy();
        assert!(!policy.cash_out(&view(ZoneKind::Safe, 0)));
        assert!(policy.cash_out(&view(ZoneKind::Super, 0)));
        assert_eq!(policy.name(), GameplayStrategy::Continuer.label());
    }
}
