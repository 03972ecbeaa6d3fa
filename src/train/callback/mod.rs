//! Callback system for training events
//!
//! Learners fire `on_train_begin`/`on_train_end`, `on_epoch_begin`/
//! `on_epoch_end` and `on_step_end` through a [`CallbackManager`]; any
//! callback may ask to stop after the current epoch.
//!
//! # Example
//!
//! ```rust
//! use ensenar::train::callback::{CallbackAction, CallbackContext, TrainerCallback};
//!
//! struct PrintCallback;
//!
//! impl TrainerCallback for PrintCallback {
//!     fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
//!         println!("Epoch {} finished with loss {:.4}", ctx.epoch, ctx.loss);
//!         CallbackAction::Continue
//!     }
//! }
//! ```

mod early_stopping;
mod manager;
mod progress;
mod traits;

pub use early_stopping::{EarlyStopping, Monitor};
pub use manager::CallbackManager;
pub use progress::ProgressCallback;
pub use traits::{CallbackAction, CallbackContext, TrainerCallback};
