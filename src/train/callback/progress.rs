//! Progress callback for logging training progress

use tracing::{debug, info};

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Logs one line per epoch, and batch losses at debug level.
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N batches
    log_interval: usize,
    label: String,
}

impl ProgressCallback {
    /// Create progress callback. `label` names the run in every event.
    pub fn new(label: impl Into<String>, log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
            label: label.into(),
        }
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self::new("fit", 10)
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        info!(
            run = %self.label,
            epoch = ctx.epoch + 1,
            max_epochs = ctx.max_epochs,
            loss = ctx.loss,
            accuracy = ctx.accuracy,
            val_loss = ?ctx.val_loss,
            val_accuracy = ?ctx.val_accuracy,
            elapsed_secs = ctx.elapsed_secs,
            "epoch complete"
        );
        CallbackAction::Continue
    }

    fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if ctx.step > 0 && ctx.step.is_multiple_of(self.log_interval) {
            debug!(
                run = %self.label,
                step = ctx.step,
                steps_per_epoch = ctx.steps_per_epoch,
                loss = ctx.loss,
                "batch"
            );
        }
        CallbackAction::Continue
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_callback_never_stops() {
        let mut progress = ProgressCallback::new("max", 5);
        let ctx = CallbackContext {
            max_epochs: 10,
            step: 5,
            steps_per_epoch: 100,
            loss: 0.5,
            val_accuracy: Some(0.7),
            ..Default::default()
        };
        assert_eq!(progress.on_step_end(&ctx), CallbackAction::Continue);
        assert_eq!(progress.on_epoch_end(&ctx), CallbackAction::Continue);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let pc = ProgressCallback::new("x", 0);
        assert_eq!(pc.log_interval, 1);
    }
}
