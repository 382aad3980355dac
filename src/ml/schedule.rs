//! Step decay of the learning rate, on Burn's `StepLrScheduler`.

use anyhow::Result;
use burn::lr_scheduler::step::{StepLrScheduler, StepLrSchedulerConfig};

/// Epochs between two decays
pub const LR_STEP_SIZE: usize = 3;

/// Factor applied at each decay
pub const LR_GAMMA: f64 = 0.1;

/// `lr = initial * gamma^(epoch / step_size)`.
///
/// The scheduler is stepped once at the start of every epoch, whatever
/// the validation loss does, so the first `step()` yields `initial`.
pub fn step_lr(initial: f64) -> Result<StepLrScheduler> {
    StepLrSchedulerConfig::new(initial, LR_STEP_SIZE)
        .with_gamma(LR_GAMMA)
        .init()
        .map_err(anyhow::Error::msg)
}
