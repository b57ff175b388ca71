//! Core identifiers and value types shared across the engine.

use std::fmt;

/// Physical modem/SIM slot, identified by a small index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscription identifier assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubId(pub i64);

impl fmt::Display for SubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target of an outbound switch request.
///
/// `Default` is the well-known sentinel instructing the switcher to revert to
/// the user-selected default data slot rather than selecting one explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchTarget {
    /// Switch to a concrete slot.
    Slot(SlotId),
    /// Revert to the default data slot.
    Default,
}

impl fmt::Display for SwitchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchTarget::Slot(slot) => write!(f, "slot {slot}"),
            SwitchTarget::Default => write!(f, "default"),
        }
    }
}

/// Data registration state of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RegState {
    /// Not registered, or still searching.
    #[default]
    NotRegistered,
    /// Registered on the home network.
    Home,
    /// Registered on a visited network.
    Roaming,
    /// Registered in some other state (emergency only, denied, ...).
    Other,
}

impl RegState {
    /// `true` when the slot can move data at all.
    pub fn in_service(self) -> bool {
        matches!(self, RegState::Home | RegState::Roaming)
    }

    pub fn is_home(self) -> bool {
        matches!(self, RegState::Home)
    }

    /// Short stable label for logs and the debug dump.
    pub fn as_str(self) -> &'static str {
        match self {
            RegState::NotRegistered => "not_registered",
            RegState::Home => "home",
            RegState::Roaming => "roaming",
            RegState::Other => "other",
        }
    }
}

impl fmt::Display for RegState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque network-type token from the host (RAT, 5G NSA/mmWave overrides).
///
/// The engine only compares it for equality and forwards it to the host score
/// function; it never inspects the contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct DisplayInfo(pub u64);

/// Signal strength snapshot.
///
/// `level` is the coarse bucket used for change detection; the whole value is
/// forwarded to the host score function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SignalStrength {
    pub level: u8,
}

/// One active subscription as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub sub: SubId,
    pub slot: SlotId,
    /// Whether the subscription is visible to the user.
    pub visible: bool,
    /// Opportunistic subscriptions never get the first-switch notice.
    pub opportunistic: bool,
}

/// Transport class of the system default network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Cellular,
    Wifi,
    Ethernet,
    Other,
}

/// Capabilities of the current system default network.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NetworkCapabilities {
    pub transports: Vec<Transport>,
}

impl NetworkCapabilities {
    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(&transport)
    }
}
