//! Core traits and types for the callback system
//!
//! - `CallbackContext` - State passed to callbacks
//! - `CallbackAction` - Actions a callback can request
//! - `TrainerCallback` - The trait all callbacks implement

/// Context passed to callbacks with current training state
#[derive(Clone, Debug, Default)]
pub struct CallbackContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Total epochs planned
    pub max_epochs: usize,
    /// Current batch within epoch
    pub step: usize,
    /// Total batches in epoch
    pub steps_per_epoch: usize,
    /// Training loss (running mean over the epoch's batches)
    pub loss: f32,
    /// Training accuracy (running mean over the epoch's batches)
    pub accuracy: f32,
    /// Validation loss, when validation data is available
    pub val_loss: Option<f32>,
    /// Validation accuracy, when validation data is available
    pub val_accuracy: Option<f32>,
    /// Current learning rate
    pub lr: f32,
    /// Training duration in seconds
    pub elapsed_secs: f64,
}

/// Action to take after a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Stop training after the current epoch
    Stop,
}

/// Trait for training callbacks
///
/// All methods have default no-op implementations, so implementors only
/// override the events they care about.
pub trait TrainerCallback: Send {
    /// Called before training starts
    fn on_train_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &CallbackContext) {}

    /// Called before each epoch
    fn on_epoch_begin(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after each epoch, once validation metrics are known
    fn on_epoch_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after each mini-batch
    fn on_step_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}
