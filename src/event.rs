//! # Ingress events consumed by the engine's serial loop.
//!
//! [`IngressEvent`] is the single tagged union every external notification is
//! funneled through; dispatch happens in one place on the loop. A few
//! variants are engine-internal: `Evaluate` is self-posted by the coalescing
//! helper, `ValidationFailed` is the switcher's feedback path, and `Dump` is
//! the debug interface.
//!
//! [`EvaluationReason`] records why an evaluation pass was requested; it is
//! carried through to the immediate-switch callback so the switcher can log
//! the cause.

use std::fmt;

use tokio::sync::oneshot;

use crate::types::{NetworkCapabilities, SlotId};

/// Why an evaluation pass was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluationReason {
    /// A slot's data registration state crossed a service partition.
    RegistrationStateChanged,
    /// A slot's network-type display info changed.
    DisplayInfoChanged,
    /// A slot's signal strength level changed.
    SignalStrengthChanged,
    /// The system default network changed transport or was lost.
    DefaultNetworkChanged,
    /// The user toggled mobile data or data roaming.
    DataSettingsChanged,
    /// A previous validation failed; retry after backoff.
    RetryValidation,
    /// A SIM finished loading, slot mapping became available.
    SimLoaded,
    /// A voice call ended.
    VoiceCallEnded,
}

impl EvaluationReason {
    /// Short stable label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationReason::RegistrationStateChanged => "registration_state_changed",
            EvaluationReason::DisplayInfoChanged => "display_info_changed",
            EvaluationReason::SignalStrengthChanged => "signal_strength_changed",
            EvaluationReason::DefaultNetworkChanged => "default_network_changed",
            EvaluationReason::DataSettingsChanged => "data_settings_changed",
            EvaluationReason::RetryValidation => "retry_validation",
            EvaluationReason::SimLoaded => "sim_loaded",
            EvaluationReason::VoiceCallEnded => "voice_call_ended",
        }
    }
}

impl fmt::Display for EvaluationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events accepted by the engine loop.
#[derive(Debug)]
pub enum IngressEvent {
    /// A slot's registration state may have changed; re-read from the host.
    ServiceStateChanged { slot: SlotId },
    /// A slot's display info may have changed; re-read from the host.
    DisplayInfoChanged { slot: SlotId },
    /// A slot's signal strength may have changed; re-read from the host.
    SignalStrengthChanged { slot: SlotId },
    /// The system default network changed. `None` means the default network
    /// was lost.
    DefaultNetworkChanged {
        capabilities: Option<NetworkCapabilities>,
    },
    /// The user toggled mobile data or data roaming on some slot.
    DataSettingsChanged,
    /// A SIM finished loading.
    SimLoaded,
    /// A voice call ended.
    VoiceCallEnded,
    /// The set of active subscriptions changed; re-derive slot listeners.
    SubscriptionsChanged,
    /// The number of active modems changed; resize slot tracking.
    MultiSimConfigChanged { active_modems: usize },
    /// Run an evaluation pass. Self-posted; external callers go through the
    /// per-cause notifications above.
    Evaluate { reason: EvaluationReason },
    /// The switcher reports that a validation attempt failed.
    ValidationFailed,
    /// The switcher reports a completed preferred-data change; drives the
    /// one-time user notification.
    SwitchCompleted {
        slot: SlotId,
        due_to_auto_switch: bool,
    },
    /// Request an indented text dump of the engine state.
    Dump { reply: oneshot::Sender<String> },
}
