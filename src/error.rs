//! # Error types surfaced by the engine and its ingress handle.
//!
//! The engine itself has no failable operations; it only classifies and
//! requests. [`SwitchError`] covers the abnormal conditions around that:
//! events referencing slots the engine does not track, evaluations that
//! cannot resolve the default data slot, and ingress submission failures.
//! All of them are logged and dropped, never propagated to the host.

use thiserror::Error;

use crate::types::{SlotId, SubId};

/// Abnormal conditions observed by the engine or its handle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    /// Ingress queue is full; the event was dropped.
    #[error("ingress queue full")]
    QueueFull,

    /// The engine has stopped and no longer accepts events.
    #[error("engine stopped")]
    Closed,

    /// An event referenced a slot outside the tracked modem range.
    #[error("slot {slot} is not a tracked modem")]
    StaleSlot {
        /// The untracked slot.
        slot: SlotId,
    },

    /// The default data subscription could not be resolved to a slot.
    #[error("no slot resolves default data subscription {sub}")]
    NoDefaultSlot {
        /// The unresolvable subscription.
        sub: SubId,
    },

    /// The host reported a preferred data slot the engine does not track.
    #[error("preferred data slot {slot} is not a tracked modem")]
    StalePreferredSlot {
        /// The untracked slot.
        slot: SlotId,
    },
}

impl SwitchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SwitchError::QueueFull => "queue_full",
            SwitchError::Closed => "engine_closed",
            SwitchError::StaleSlot { .. } => "stale_slot",
            SwitchError::NoDefaultSlot { .. } => "no_default_slot",
            SwitchError::StalePreferredSlot { .. } => "stale_preferred_slot",
        }
    }
}
