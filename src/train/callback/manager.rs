//! Callback manager for dispatching events to multiple callbacks

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Manages multiple callbacks and dispatches events
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with<C: TrainerCallback + 'static>(mut self, callback: C) -> Self {
        self.add(callback);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Fire train begin event
    pub fn on_train_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_train_begin(ctx))
    }

    /// Fire train end event
    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx);
        }
    }

    /// Fire epoch begin event
    pub fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_epoch_begin(ctx))
    }

    /// Fire epoch end event. Every callback sees the epoch even if an
    /// earlier one asked to stop.
    pub fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        let mut action = CallbackAction::Continue;
        for cb in &mut self.callbacks {
            if cb.on_epoch_end(ctx) == CallbackAction::Stop {
                action = CallbackAction::Stop;
            }
        }
        action
    }

    /// Fire step end event
    pub fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_step_end(ctx))
    }

    fn dispatch<F>(&mut self, mut event: F) -> CallbackAction
    where
        F: FnMut(&mut Box<dyn TrainerCallback>) -> CallbackAction,
    {
        for cb in &mut self.callbacks {
            if event(cb) == CallbackAction::Stop {
                return CallbackAction::Stop;
            }
        }
        CallbackAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::callback::{EarlyStopping, Monitor, ProgressCallback};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callback_manager_dispatch() {
        let mut manager = CallbackManager::new().with(EarlyStopping::new(Monitor::Loss, 1));

        let mut ctx = CallbackContext {
            loss: 1.0,
            ..Default::default()
        };
        assert_eq!(manager.on_epoch_end(&ctx), CallbackAction::Continue);

        // No improvement, should stop
        ctx.epoch = 1;
        assert_eq!(manager.on_epoch_end(&ctx), CallbackAction::Stop);
    }

    #[test]
    fn test_callback_manager_len_and_empty() {
        let mut manager = CallbackManager::new();
        assert!(manager.is_empty());
        manager.add(ProgressCallback::default());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_every_callback_sees_epoch_end() {
        struct Counter(Arc<AtomicUsize>);
        impl TrainerCallback for Counter {
            fn on_epoch_end(&mut self, _: &CallbackContext) -> CallbackAction {
                self.0.fetch_add(1, Ordering::SeqCst);
                CallbackAction::Continue
            }
        }
        struct Stopper;
        impl TrainerCallback for Stopper {
            fn on_epoch_end(&mut self, _: &CallbackContext) -> CallbackAction {
                CallbackAction::Stop
            }
        }

        let seen = Arc::new(AtomicUsize::new(0));
        let mut manager = CallbackManager::new()
            .with(Stopper)
            .with(Counter(seen.clone()));
        assert_eq!(
            manager.on_epoch_end(&CallbackContext::default()),
            CallbackAction::Stop
        );
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_train_begin_stop_short_circuits() {
        struct StopCallback;
        impl TrainerCallback for StopCallback {
            fn on_train_begin(&mut self, _: &CallbackContext) -> CallbackAction {
                CallbackAction::Stop
            }
        }

        let mut manager = CallbackManager::new().with(StopCallback);
        assert_eq!(
            manager.on_train_begin(&CallbackContext::default()),
            CallbackAction::Stop
        );
    }
}
