//! Centralized tuning constants for the wheel progression.
//!
//! These are the defaults behind `WheelConfig`; the bundled `data/wheel.json`
//! mirrors them and tests pin the two together.

// Progression shape --------------------------------------------------------
pub const ZONE_COUNT: u32 = 30;
pub const SLICES_PER_ZONE: usize = 8;
pub const SAFE_ZONE_INTERVAL: u32 = 5;

// Persistence --------------------------------------------------------------
pub const SCORE_KEY: &str = "total_score";

// Zone fill ----------------------------------------------------------------
pub const SUPER_CHEST_COUNT: usize = 4;
pub const SUPER_CHEST_MIN_VALUE: u32 = 3;
pub const SUPER_POINT_COUNT: usize = 3;
pub const SUPER_POINT_MIN_VALUE: u32 = 15;
pub const SAFE_CHEST_COUNT: usize = 2;
pub const SAFE_POINT_COUNT: usize = 6;

// Spin ---------------------------------------------------------------------
pub const FULL_TURN_DEGREES: f32 = 360.0;
pub const EXTRA_TURNS_MIN: u32 = 3;
pub const EXTRA_TURNS_MAX: u32 = 6;

// Continue economy -----------------------------------------------------------
pub const CONTINUE_BASE_PRICE: u32 = 100;
