//! Spin planning and result resolution.
//!
//! Angles are in degrees. A spin turns the wheel clockwise by `total_rotation`;
//! engines that rotate the wheel transform to `-total_rotation` can feed the raw
//! transform angle to [`resolve_transform_angle`].
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SpinConfig;
use crate::constants::FULL_TURN_DEGREES;
use crate::numbers::{floor_f32_to_usize, u32_to_f32, usize_to_f32, usize_to_u32};
use crate::rng::RandomSource;

/// Errors raised when spin inputs cannot be resolved.
#[derive(Debug, Error, PartialEq)]
pub enum SpinError {
    #[error("wheel must have at least one slice")]
    NoSlices,
    #[error("rotation {rotation} or pointer offset {offset} is not finite")]
    NonFiniteAngle { rotation: f32, offset: f32 },
}

/// Angular width of one slice.
#[must_use]
pub fn slice_angle(slice_count: usize) -> f32 {
    FULL_TURN_DEGREES / usize_to_f32(slice_count)
}

/// Map a clockwise spin distance to the index of the slice under the pointer.
///
/// Normalizes `rotation + offset` into `[0, 360)`, shifts by half a slice so the
/// nearest slice center wins, then buckets by slice width.
///
/// # Errors
///
/// Returns an error for a zero slice count or non-finite angles.
pub fn resolve(
    final_rotation_degrees: f32,
    pointer_offset_degrees: f32,
    slice_count: usize,
) -> Result<usize, SpinError> {
    if slice_count == 0 {
        return Err(SpinError::NoSlices);
    }
    if !final_rotation_degrees.is_finite() || !pointer_offset_degrees.is_finite() {
        return Err(SpinError::NonFiniteAngle {
            rotation: final_rotation_degrees,
            offset: pointer_offset_degrees,
        });
    }
    let width = slice_angle(slice_count);
    let normalized = (final_rotation_degrees + pointer_offset_degrees).rem_euclid(FULL_TURN_DEGREES);
    let bucket = floor_f32_to_usize((normalized + width * 0.5) / width);
    Ok(bucket % slice_count)
}

/// Resolve from the engine's wheel transform angle, which rotates by `-spin`.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn resolve_transform_angle(
    transform_angle_degrees: f32,
    pointer_offset_degrees: f32,
    slice_count: usize,
) -> Result<usize, SpinError> {
    resolve(-transform_angle_degrees, pointer_offset_degrees, slice_count)
}

/// A planned spin: what to animate and where it lands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinPlan {
    /// Slice index the planner aimed at.
    pub target_index: usize,
    /// Whole extra turns added before the target angle.
    pub extra_turns: u32,
    /// Clockwise distance the wheel travels.
    pub total_rotation: f32,
    /// Slice under the pointer once the wheel stops.
    pub resolved_index: usize,
}

impl SpinPlan {
    /// Angle the engine should tween the wheel transform to.
    #[must_use]
    pub fn transform_angle(&self) -> f32 {
        -self.total_rotation
    }
}

/// Draws random spins.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinPlanner {
    cfg: SpinConfig,
}

impl SpinPlanner {
    #[must_use]
    pub const fn new(cfg: SpinConfig) -> Self {
        Self { cfg }
    }

    #[must_use]
    pub const fn config(&self) -> &SpinConfig {
        &self.cfg
    }

    /// Pick a uniformly random target slice and a random number of extra turns.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero slice count or a non-finite pointer offset.
    pub fn plan<R: RandomSource + ?Sized>(
        &self,
        slice_count: usize,
        rng: &mut R,
    ) -> Result<SpinPlan, SpinError> {
        if slice_count == 0 {
            return Err(SpinError::NoSlices);
        }
        let target_index = rng.range_u32(0, usize_to_u32(slice_count)) as usize;
        let extra_turns = rng.range_u32(self.cfg.extra_turns_min, self.cfg.extra_turns_max);
        let target_angle = usize_to_f32(target_index) * slice_angle(slice_count);
        let total_rotation = u32_to_f32(extra_turns) * FULL_TURN_DEGREES + target_angle;
        let resolved_index = resolve(total_rotation, self.cfg.pointer_offset_degrees, slice_count)?;
        Ok(SpinPlan {
            target_index,
            extra_turns,
            total_rotation,
            resolved_index,
        })
    }

    /// Resolve a finished rotation with the configured pointer offset.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`].
    pub fn resolve(&self, final_rotation_degrees: f32, slice_count: usize) -> Result<usize, SpinError> {
        resolve(final_rotation_degrees, self.cfg.pointer_offset_degrees, slice_count)
    }
}
