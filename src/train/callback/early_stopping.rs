//! Early stopping on a monitored epoch metric

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Epoch metric watched by [`EarlyStopping`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Monitor {
    Loss,
    Accuracy,
    ValLoss,
    #[default]
    ValAccuracy,
}

impl Monitor {
    fn value(self, ctx: &CallbackContext) -> Option<f32> {
        match self {
            Self::Loss => Some(ctx.loss),
            Self::Accuracy => Some(ctx.accuracy),
            Self::ValLoss => ctx.val_loss,
            Self::ValAccuracy => ctx.val_accuracy,
        }
    }

    fn maximize(self) -> bool {
        matches!(self, Self::Accuracy | Self::ValAccuracy)
    }
}

/// Halts a fit once the monitored metric stops improving.
///
/// Counts consecutive epochs without improvement and stops when that count
/// reaches `patience`. The first epoch never stops training, so a patience
/// of 0 stops at the first epoch that fails to improve.
///
/// # Example
///
/// ```rust
/// use ensenar::train::callback::{EarlyStopping, Monitor};
///
/// // Stop after 2 epochs without a higher validation accuracy
/// let early_stop = EarlyStopping::new(Monitor::ValAccuracy, 2);
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    monitor: Monitor,
    patience: usize,
    min_delta: f32,
    best: Option<f32>,
    wait: usize,
    stopped_epoch: Option<usize>,
}

impl EarlyStopping {
    pub fn new(monitor: Monitor, patience: usize) -> Self {
        Self {
            monitor,
            patience,
            min_delta: 0.0,
            best: None,
            wait: 0,
            stopped_epoch: None,
        }
    }

    /// Require improvements larger than `min_delta`.
    pub fn with_min_delta(mut self, min_delta: f32) -> Self {
        self.min_delta = min_delta.abs();
        self
    }

    pub fn reset(&mut self) {
        self.best = None;
        self.wait = 0;
        self.stopped_epoch = None;
    }

    /// Epoch (0-indexed) at which the last fit was stopped, if it was.
    pub fn stopped_epoch(&self) -> Option<usize> {
        self.stopped_epoch
    }

    fn improved(&self, current: f32) -> bool {
        match self.best {
            None => true,
            Some(best) if self.monitor.maximize() => current - self.min_delta > best,
            Some(best) => current + self.min_delta < best,
        }
    }
}

impl TrainerCallback for EarlyStopping {
    fn on_train_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        self.reset();
        CallbackAction::Continue
    }

    fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        let Some(current) = self.monitor.value(ctx) else {
            warn!(monitor = ?self.monitor, "early stopping metric unavailable, skipping check");
            return CallbackAction::Continue;
        };
        if self.improved(current) {
            self.best = Some(current);
            self.wait = 0;
            return CallbackAction::Continue;
        }
        self.wait += 1;
        if self.wait >= self.patience && ctx.epoch > 0 {
            self.stopped_epoch = Some(ctx.epoch);
            debug!(
                epoch = ctx.epoch + 1,
                monitor = ?self.monitor,
                best = self.best.unwrap_or(current),
                "early stopping"
            );
            return CallbackAction::Stop;
        }
        CallbackAction::Continue
    }

    fn name(&self) -> &'static str {
        "EarlyStopping"
    }
}
