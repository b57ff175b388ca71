//! # Outbound request contract to the phone switcher.
//!
//! The switcher owns the actual preferred-data change and the ping-based
//! validation; the engine only asks. Exactly three requests exist, awaited
//! inline on the serial loop, so implementations must not block.

use async_trait::async_trait;

use crate::event::EvaluationReason;
use crate::types::SwitchTarget;

/// Receiver of the engine's switch requests.
#[async_trait]
pub trait Switcher: Send + Sync {
    /// Conditions held for the stability dwell: switch to `target` if you
    /// agree, running a ping test first when `need_validation` is set.
    async fn on_require_validation(&self, target: SwitchTarget, need_validation: bool);

    /// Switch to `target` now; no dwell, no validation. `reason` names the
    /// evaluation cause for the switcher's own logging.
    async fn on_require_immediate_switch(&self, target: SwitchTarget, reason: EvaluationReason);

    /// Drop any validation still in flight on the engine's behalf; the
    /// environment no longer favors switching.
    async fn on_cancel_pending_validation(&self);
}
