//! Step counter for multi-step forms.

use serde::{Deserialize, Serialize};

/// Position within a form of `total_steps` steps.
///
/// `active_step` is always in `0..total_steps`. Navigation past either end
/// is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StepProgress {
    active_step: usize,
    total_steps: usize,
}

impl StepProgress {
    /// Start at step 0. A form with zero steps is treated as one step.
    pub fn new(total_steps: usize) -> Self {
        Self {
            active_step: 0,
            total_steps: total_steps.max(1),
        }
    }

    /// Start at `step`, clamped to the last step.
    pub fn at(total_steps: usize, step: usize) -> Self {
        let mut progress = Self::new(total_steps);
        progress.active_step = step.min(progress.total_steps - 1);
        progress
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Advance one step; returns whether the step changed.
    pub fn go_to_next(&mut self) -> bool {
        if self.is_last_step() {
            return false;
        }
        self.active_step += 1;
        true
    }

    /// Go back one step; returns whether the step changed.
    pub fn go_to_previous(&mut self) -> bool {
        if self.is_first_step() {
            return false;
        }
        self.active_step -= 1;
        true
    }

    /// Jump to `step`. Out-of-range targets are ignored.
    pub fn go_to_step(&mut self, step: usize) -> bool {
        if step >= self.total_steps || step == self.active_step {
            return false;
        }
        self.active_step = step;
        true
    }

    pub fn is_first_step(&self) -> bool {
        self.active_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.active_step + 1 == self.total_steps
    }

    pub fn reset(&mut self) -> bool {
        let changed = self.active_step != 0;
        self.active_step = 0;
        changed
    }
}
