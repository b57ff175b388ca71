//! # Host capability: the engine's only view of the telephony stack.
//!
//! The engine is created with a [`Host`] handle and nothing more; every
//! process-wide service the original environment reaches for (phone
//! registry, subscription service, device config) is behind this one trait.
//! The host outlives the engine and is borrowed, never owned.
//!
//! All methods are non-blocking snapshot queries; the engine calls them from
//! its serial loop and expects no I/O behind them.

use crate::types::{DisplayInfo, RegState, SignalStrength, SlotId, SubId, SubscriptionInfo};

/// Borrowed capability surface of the surrounding telephony stack.
pub trait Host: Send + Sync {
    /// Number of active modem slots at engine construction time.
    fn active_modem_count(&self) -> usize;

    /// Currently active subscriptions, visible or not.
    fn active_subscriptions(&self) -> Vec<SubscriptionInfo>;

    /// The user-selected default data subscription.
    fn default_data_sub(&self) -> SubId;

    /// The slot the switcher currently routes mobile data through.
    fn preferred_data_slot(&self) -> Option<SlotId>;

    /// The subscription most recently chosen by the auto switch feature.
    fn auto_selected_data_sub(&self) -> SubId;

    fn is_sub_active(&self, sub: SubId) -> bool;

    /// Resolve a subscription to the slot currently hosting it.
    fn slot_of_sub(&self, sub: SubId) -> Option<SlotId>;

    /// The subscription currently hosted on `slot`, if any.
    fn subscription_for_slot(&self, slot: SlotId) -> Option<SubscriptionInfo>;

    // ---- Per-slot dynamic queries ----

    fn registration_state(&self, slot: SlotId) -> RegState;

    fn display_info(&self, slot: SlotId) -> DisplayInfo;

    fn signal_strength(&self, slot: SlotId) -> SignalStrength;

    /// Whether the user enabled data roaming on `slot`.
    fn data_roaming_enabled(&self, slot: SlotId) -> bool;

    /// Whether the user enabled mobile data on `slot`.
    fn user_data_enabled(&self, slot: SlotId) -> bool;

    /// Whether policy (thermal, admin, carrier) currently allows data on
    /// `slot`.
    fn data_allowed(&self, slot: SlotId) -> bool;

    /// Device-specific preference score for a network-type/signal pair.
    /// Opaque to the engine; only differences beyond the configured tolerance
    /// matter.
    fn switch_score(&self, display: &DisplayInfo, signal: &SignalStrength) -> u32;

    // ---- Per-slot event stream lifecycle ----

    /// Start delivering service-state, display-info and signal-strength
    /// events for `slot` to the engine handle.
    fn register_slot_events(&self, slot: SlotId);

    /// Stop delivering per-slot events for `slot`.
    fn unregister_slot_events(&self, slot: SlotId);
}
