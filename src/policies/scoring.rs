//! # Usability ranking of a slot's data service.
//!
//! [`UsableState`] is the qualitative half of the switch decision: it orders
//! slots by how usable their service is before any RAT/signal score is
//! consulted. Home beats enabled roaming because roaming is assumed metered;
//! roaming with data roaming disabled is as good as no service at all.

use std::fmt;

use crate::types::RegState;

/// Qualitative rank of a slot's data service. Ordered: the later the
/// variant, the more preferred the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum UsableState {
    /// Out of service, or roaming with data roaming disabled.
    NotUsable,
    /// Registered on a visited network with data roaming enabled.
    RoamingEnabled,
    /// Registered on the home network; assumed unmetered.
    Home,
}

impl UsableState {
    /// Integer rank; higher is more preferred.
    pub fn rank(self) -> i8 {
        match self {
            UsableState::NotUsable => -1,
            UsableState::RoamingEnabled => 0,
            UsableState::Home => 1,
        }
    }

    /// `true` when the slot could carry data in this state.
    pub fn usable(self) -> bool {
        self > UsableState::NotUsable
    }

    /// Classify from a registration state plus the slot's data roaming
    /// setting.
    pub fn classify(reg: RegState, roaming_enabled: bool) -> Self {
        match reg {
            RegState::Home => UsableState::Home,
            RegState::Roaming if roaming_enabled => UsableState::RoamingEnabled,
            _ => UsableState::NotUsable,
        }
    }

    /// Short stable label for logs and the debug dump.
    pub fn as_str(self) -> &'static str {
        match self {
            UsableState::NotUsable => "not_usable",
            UsableState::RoamingEnabled => "roaming_enabled",
            UsableState::Home => "home",
        }
    }
}

impl fmt::Display for UsableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_outranks_roaming_outranks_not_usable() {
        assert!(UsableState::Home > UsableState::RoamingEnabled);
        assert!(UsableState::RoamingEnabled > UsableState::NotUsable);
        assert_eq!(UsableState::Home.rank(), 1);
        assert_eq!(UsableState::RoamingEnabled.rank(), 0);
        assert_eq!(UsableState::NotUsable.rank(), -1);
    }

    #[test]
    fn roaming_usability_follows_the_user_setting() {
        assert_eq!(
            UsableState::classify(RegState::Roaming, true),
            UsableState::RoamingEnabled
        );
        assert_eq!(
            UsableState::classify(RegState::Roaming, false),
            UsableState::NotUsable
        );
    }

    #[test]
    fn out_of_service_is_never_usable() {
        for reg in [RegState::NotRegistered, RegState::Other] {
            assert_eq!(UsableState::classify(reg, true), UsableState::NotUsable);
            assert!(!UsableState::classify(reg, false).usable());
        }
    }
}
