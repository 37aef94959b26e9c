//! Wheel Game Engine
//!
//! Platform-agnostic core of a wheel-of-fortune progression game: zones filled
//! from a shared slice pool, spin planning and resolution, the bomb / continue /
//! cash-out state machine, and the reward ledger. Rendering, animation, and
//! input live outside this crate and talk to it through [`WheelSession`] and
//! the [`WheelEvent`] stream.

pub mod config;
pub mod constants;
pub mod events;
pub mod filler;
pub mod ledger;
pub mod numbers;
pub mod progression;
pub mod rng;
pub mod session;
pub mod slice;
pub mod spin;
pub mod storage;
pub mod theme;
pub mod zone;

// Re-export commonly used types
pub use config::{ContinueConfig, FillConfig, SpinConfig, WheelConfig, WheelConfigError};
pub use events::{EventBus, ResetReason, SubscriptionId, WheelEvent};
pub use filler::{FillError, ZoneFiller, sample_without_replacement};
pub use ledger::RewardLedger;
pub use progression::{
    ContinueOutcome, Phase, ProgressionError, ProgressionStateMachine, SpinOutcome,
};
pub use rng::{CountingRng, RandomSource, WheelRng};
pub use session::WheelSession;
pub use slice::{CatalogError, RewardKind, Slice, SliceCatalog};
pub use spin::{SpinError, SpinPlan, SpinPlanner, resolve, resolve_transform_angle, slice_angle};
pub use storage::{JsonFileScoreStore, MemoryScoreStore, ScoreStore, StoreError};
pub use theme::{Theme, ThemeSet, ThemeSkin, ThemeTier};
pub use zone::{Zone, ZoneKind, ZoneSlices, default_zones, generate_zones};
