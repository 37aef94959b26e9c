//! Reward ledger: persistent score, rewards earned this run, and continue count.
use serde::{Deserialize, Serialize};

use crate::config::ContinueConfig;
use crate::slice::Slice;

/// Mutable per-run reward state.
///
/// The score is unsigned, so no sequence of spends can take it below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLedger {
    score: u32,
    #[serde(default)]
    earned: Vec<Slice>,
    #[serde(default)]
    continue_count: u32,
}

impl RewardLedger {
    /// Start a ledger from a previously persisted score.
    #[must_use]
    pub const fn with_score(score: u32) -> Self {
        Self {
            score,
            earned: Vec::new(),
            continue_count: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Rewards won since the last cash-out or reset.
    #[must_use]
    pub fn earned(&self) -> &[Slice] {
        &self.earned
    }

    #[must_use]
    pub fn has_earned(&self) -> bool {
        !self.earned.is_empty()
    }

    /// Sum of reward values that a cash-out would bank right now.
    #[must_use]
    pub fn pending_value(&self) -> u32 {
        self.earned
            .iter()
            .fold(0u32, |acc, slice| acc.saturating_add(slice.reward_value))
    }

    #[must_use]
    pub const fn continue_count(&self) -> u32 {
        self.continue_count
    }

    /// Price of the next continue this run.
    #[must_use]
    pub const fn continue_price(&self, cfg: &ContinueConfig) -> u32 {
        cfg.price_for(self.continue_count)
    }

    pub fn add_reward(&mut self, slice: Slice) {
        self.earned.push(slice);
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    /// Spend `amount` only if the whole amount is available.
    pub fn try_spend_score(&mut self, amount: u32) -> bool {
        match self.score.checked_sub(amount) {
            Some(rest) => {
                self.score = rest;
                true
            }
            None => false,
        }
    }

    /// Spend `amount`, clamping the score at zero.
    pub fn spend_score(&mut self, amount: u32) {
        self.score = self.score.saturating_sub(amount);
    }

    /// Bank every earned reward into the score and clear the earned list.
    ///
    /// Returns the amount gained.
    pub fn convert_all_rewards_to_score(&mut self) -> u32 {
        let gained = self.pending_value();
        self.score = self.score.saturating_add(gained);
        self.earned.clear();
        gained
    }

    /// Forfeit earned rewards without banking them.
    pub fn reset_rewards(&mut self) {
        self.earned.clear();
    }

    pub fn increment_continue_count(&mut self) {
        self.continue_count = self.continue_count.saturating_add(1);
    }

    pub fn reset_continue_cycle(&mut self) {
        self.continue_count = 0;
    }
}
