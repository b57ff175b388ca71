use tokio::sync::{mpsc, oneshot};

use crate::error::SwitchError;
use crate::event::IngressEvent;
use crate::types::{NetworkCapabilities, SlotId};

/// Cloneable, thread-safe ingress handle feeding the engine's serial loop.
///
/// All methods are non-blocking. When the queue is full the event is dropped
/// with [`SwitchError::QueueFull`]; once the engine has stopped every method
/// returns [`SwitchError::Closed`]. The per-slot trackers re-read the host
/// on dispatch, so a dropped notification is recovered by the next one.
#[derive(Clone)]
pub struct EngineHandle {
    pub(super) tx: mpsc::Sender<IngressEvent>,
}

impl EngineHandle {
    fn post(&self, event: IngressEvent) -> Result<(), SwitchError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SwitchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SwitchError::Closed,
        })
    }

    /// A slot's data registration state may have changed.
    pub fn notify_service_state_changed(&self, slot: SlotId) -> Result<(), SwitchError> {
        self.post(IngressEvent::ServiceStateChanged { slot })
    }

    /// A slot's network-type display info may have changed.
    pub fn notify_display_info_changed(&self, slot: SlotId) -> Result<(), SwitchError> {
        self.post(IngressEvent::DisplayInfoChanged { slot })
    }

    /// A slot's signal strength may have changed.
    pub fn notify_signal_strength_changed(&self, slot: SlotId) -> Result<(), SwitchError> {
        self.post(IngressEvent::SignalStrengthChanged { slot })
    }

    /// The system default network changed; `None` means it was lost.
    pub fn update_default_network(
        &self,
        capabilities: Option<NetworkCapabilities>,
    ) -> Result<(), SwitchError> {
        self.post(IngressEvent::DefaultNetworkChanged { capabilities })
    }

    /// The user toggled mobile data or data roaming.
    pub fn notify_data_settings_changed(&self) -> Result<(), SwitchError> {
        self.post(IngressEvent::DataSettingsChanged)
    }

    /// A SIM finished loading.
    pub fn notify_sim_loaded(&self) -> Result<(), SwitchError> {
        self.post(IngressEvent::SimLoaded)
    }

    /// A voice call ended.
    pub fn notify_voice_call_ended(&self) -> Result<(), SwitchError> {
        self.post(IngressEvent::VoiceCallEnded)
    }

    /// The set of active subscriptions changed.
    pub fn notify_subscriptions_changed(&self) -> Result<(), SwitchError> {
        self.post(IngressEvent::SubscriptionsChanged)
    }

    /// The number of active modems changed.
    pub fn notify_multi_sim_config_changed(&self, active_modems: usize) -> Result<(), SwitchError> {
        self.post(IngressEvent::MultiSimConfigChanged { active_modems })
    }

    /// The switcher reports a failed validation; the engine schedules a
    /// backed-off retry or gives up.
    pub fn report_validation_failure(&self) -> Result<(), SwitchError> {
        self.post(IngressEvent::ValidationFailed)
    }

    /// The switcher reports a completed preferred-data change; drives the
    /// one-time user notification.
    pub fn notify_switch_completed(
        &self,
        slot: SlotId,
        due_to_auto_switch: bool,
    ) -> Result<(), SwitchError> {
        self.post(IngressEvent::SwitchCompleted {
            slot,
            due_to_auto_switch,
        })
    }

    /// Returns an indented text dump of the engine state, for bug reports.
    pub async fn dump(&self) -> Result<String, SwitchError> {
        let (reply, rx) = oneshot::channel();
        self.post(IngressEvent::Dump { reply })?;
        rx.await.map_err(|_| SwitchError::Closed)
    }
}
