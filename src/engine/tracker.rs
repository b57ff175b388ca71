use crate::host::Host;
use crate::policies::UsableState;
use crate::types::{DisplayInfo, RegState, SignalStrength, SlotId};

/// Per-slot record of the signals feeding switch decisions.
pub(super) struct SlotSignal {
    pub slot: SlotId,
    /// Data registration state; unknown until the first service-state event.
    pub reg_state: RegState,
    pub display_info: DisplayInfo,
    pub signal_strength: SignalStrength,
    /// Whether this slot's host event streams are currently subscribed.
    pub listening: bool,
}

impl SlotSignal {
    /// Creates a tracker seeded with the host's current display info and
    /// signal strength for `slot`.
    pub fn new(slot: SlotId, host: &dyn Host) -> Self {
        Self {
            slot,
            reg_state: RegState::NotRegistered,
            display_info: host.display_info(slot),
            signal_strength: host.signal_strength(slot),
            listening: false,
        }
    }

    /// RAT/signal score of this slot. Zero while out of service, so the slot
    /// is never picked as a switch candidate.
    pub fn score(&self, host: &dyn Host) -> u32 {
        if self.reg_state.in_service() {
            host.switch_score(&self.display_info, &self.signal_strength)
        } else {
            0
        }
    }

    /// Qualitative usability, consulting the slot's data roaming setting.
    pub fn usable_state(&self, host: &dyn Host) -> UsableState {
        UsableState::classify(self.reg_state, host.data_roaming_enabled(self.slot))
    }

    /// One-line snapshot for the debug dump.
    pub fn describe(&self, host: &dyn Host) -> String {
        format!(
            "{{slot {} score={} reg={} {} display={:?} level={} listening={}}}",
            self.slot,
            self.score(host),
            self.reg_state,
            self.usable_state(host),
            self.display_info,
            self.signal_strength.level,
            self.listening,
        )
    }
}
