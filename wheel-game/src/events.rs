//! Structured events emitted by the progression, plus the observer registry
//! that delivers them to the rendering layer.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::slice::Slice;
use crate::spin::SpinPlan;
use crate::theme::Theme;

/// Why a run was reset to the first zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    /// Player declined the continue offer, or could not afford it.
    ContinueDeclined,
    /// Earned rewards were banked.
    CashedOut,
}

/// Mechanical event emitted by the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WheelEvent {
    /// A zone became active with freshly filled slices.
    ZoneLoaded {
        /// 0-based position in the progression.
        zone_index: usize,
        /// 1-based display counter; keeps growing across loops.
        level: u32,
        theme: Theme,
        slices: Vec<Slice>,
    },
    SpinStarted {
        plan: SpinPlan,
    },
    SpinFinished {
        resolved_index: usize,
    },
    SliceEvaluated {
        zone_index: usize,
        slice: Slice,
    },
    RewardAdded {
        slice: Slice,
        pending_value: u32,
    },
    /// Bomb landed in a protected zone.
    BombIgnored {
        zone_index: usize,
    },
    ContinueOffered {
        price: u32,
    },
    ContinueAccepted {
        price: u32,
        continue_count: u32,
    },
    RunReset {
        reason: ResetReason,
        /// Value of rewards dropped without banking.
        forfeited: u32,
    },
    CashedOut {
        gained: u32,
    },
    ScoreChanged {
        score: u32,
    },
}

impl WheelEvent {
    /// Short stable name, used in logs and reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ZoneLoaded { .. } => "zone_loaded",
            Self::SpinStarted { .. } => "spin_started",
            Self::SpinFinished { .. } => "spin_finished",
            Self::SliceEvaluated { .. } => "slice_evaluated",
            Self::RewardAdded { .. } => "reward_added",
            Self::BombIgnored { .. } => "bomb_ignored",
            Self::ContinueOffered { .. } => "continue_offered",
            Self::ContinueAccepted { .. } => "continue_accepted",
            Self::RunReset { .. } => "run_reset",
            Self::CashedOut { .. } => "cashed_out",
            Self::ScoreChanged { .. } => "score_changed",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&WheelEvent)>;

/// Observer registry. Handlers run in subscription order and stay registered
/// until unsubscribed or until the bus is dropped.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&WheelEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` when the id was never issued or is already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn publish(&mut self, event: &WheelEvent) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}
