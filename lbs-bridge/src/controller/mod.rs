//! Engine lifecycle management.
//!
//! [`LifecycleController`] owns the single engine handle and its registered
//! callback sink, and drives them through init, start, stop and destroy.
//! Raw callbacks arriving while started are normalized and emitted on the
//! host event channel as `onLocation`.

mod lifecycle;
mod state;

pub use lifecycle::{ControllerStats, LifecycleController};
pub use state::LifecycleState;
