//! Shared fixtures: scriptable host, recording switcher and notifier.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use simvisor::{
    AutoSwitchEngine, Config, DisplayInfo, EngineHandle, EvaluationReason, Host, Notifier,
    RegState, SignalStrength, SlotId, SubId, SubscriptionInfo, SwitchTarget, Switcher,
};

/// Everything the host knows about one slot.
#[derive(Clone)]
pub struct SlotFacts {
    pub reg: RegState,
    pub display: DisplayInfo,
    pub signal: SignalStrength,
    pub roaming_enabled: bool,
    pub user_data: bool,
    pub data_allowed: bool,
}

impl Default for SlotFacts {
    fn default() -> Self {
        Self {
            reg: RegState::Home,
            display: DisplayInfo(0),
            signal: SignalStrength { level: 3 },
            roaming_enabled: false,
            user_data: true,
            data_allowed: true,
        }
    }
}

pub struct HostState {
    pub modem_count: usize,
    pub subs: Vec<SubscriptionInfo>,
    pub default_sub: SubId,
    pub preferred_slot: Option<SlotId>,
    pub auto_selected_sub: SubId,
    pub slots: Vec<SlotFacts>,
    pub register_calls: Vec<SlotId>,
    pub unregister_calls: Vec<SlotId>,
}

/// Scriptable [`Host`] backed by a mutex so tests can flip facts mid-flight.
/// The score of a slot is simply its signal level.
pub struct MockHost {
    pub state: Mutex<HostState>,
}

impl MockHost {
    /// Two modems: sub 10 on slot 0 (default and preferred), sub 20 on
    /// slot 1, both visible, both home service at signal level 3.
    pub fn dual_sim() -> Arc<Self> {
        Self::with_modems(2)
    }

    pub fn with_modems(modem_count: usize) -> Arc<Self> {
        let subs = (0..modem_count)
            .map(|i| SubscriptionInfo {
                sub: SubId((i as i64 + 1) * 10),
                slot: SlotId(i),
                visible: true,
                opportunistic: false,
            })
            .collect();
        Arc::new(Self {
            state: Mutex::new(HostState {
                modem_count,
                subs,
                default_sub: SubId(10),
                preferred_slot: Some(SlotId(0)),
                auto_selected_sub: SubId(10),
                slots: vec![SlotFacts::default(); modem_count],
                register_calls: Vec::new(),
                unregister_calls: Vec::new(),
            }),
        })
    }

    pub fn set_signal_level(&self, slot: SlotId, level: u8) {
        self.state.lock().unwrap().slots[slot.0].signal = SignalStrength { level };
    }

    pub fn set_display(&self, slot: SlotId, display: DisplayInfo) {
        self.state.lock().unwrap().slots[slot.0].display = display;
    }

    pub fn set_reg(&self, slot: SlotId, reg: RegState) {
        self.state.lock().unwrap().slots[slot.0].reg = reg;
    }

    pub fn set_roaming_enabled(&self, slot: SlotId, enabled: bool) {
        self.state.lock().unwrap().slots[slot.0].roaming_enabled = enabled;
    }

    pub fn set_user_data(&self, slot: SlotId, enabled: bool) {
        self.state.lock().unwrap().slots[slot.0].user_data = enabled;
    }

    pub fn set_data_allowed(&self, slot: SlotId, allowed: bool) {
        self.state.lock().unwrap().slots[slot.0].data_allowed = allowed;
    }

    pub fn set_preferred(&self, slot: Option<SlotId>) {
        self.state.lock().unwrap().preferred_slot = slot;
    }

    pub fn set_default_sub(&self, sub: SubId) {
        self.state.lock().unwrap().default_sub = sub;
    }

    pub fn set_auto_selected_sub(&self, sub: SubId) {
        self.state.lock().unwrap().auto_selected_sub = sub;
    }

    pub fn set_subs(&self, subs: Vec<SubscriptionInfo>) {
        self.state.lock().unwrap().subs = subs;
    }

    pub fn register_calls(&self) -> Vec<SlotId> {
        self.state.lock().unwrap().register_calls.clone()
    }

    pub fn unregister_calls(&self) -> Vec<SlotId> {
        self.state.lock().unwrap().unregister_calls.clone()
    }
}

impl Host for MockHost {
    fn active_modem_count(&self) -> usize {
        self.state.lock().unwrap().modem_count
    }

    fn active_subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.state.lock().unwrap().subs.clone()
    }

    fn default_data_sub(&self) -> SubId {
        self.state.lock().unwrap().default_sub
    }

    fn preferred_data_slot(&self) -> Option<SlotId> {
        self.state.lock().unwrap().preferred_slot
    }

    fn auto_selected_data_sub(&self) -> SubId {
        self.state.lock().unwrap().auto_selected_sub
    }

    fn is_sub_active(&self, sub: SubId) -> bool {
        self.state.lock().unwrap().subs.iter().any(|s| s.sub == sub)
    }

    fn slot_of_sub(&self, sub: SubId) -> Option<SlotId> {
        self.state
            .lock()
            .unwrap()
            .subs
            .iter()
            .find(|s| s.sub == sub)
            .map(|s| s.slot)
    }

    fn subscription_for_slot(&self, slot: SlotId) -> Option<SubscriptionInfo> {
        self.state
            .lock()
            .unwrap()
            .subs
            .iter()
            .find(|s| s.slot == slot)
            .copied()
    }

    fn registration_state(&self, slot: SlotId) -> RegState {
        let state = self.state.lock().unwrap();
        state.slots.get(slot.0).map(|s| s.reg).unwrap_or_default()
    }

    fn display_info(&self, slot: SlotId) -> DisplayInfo {
        let state = self.state.lock().unwrap();
        state
            .slots
            .get(slot.0)
            .map(|s| s.display)
            .unwrap_or_default()
    }

    fn signal_strength(&self, slot: SlotId) -> SignalStrength {
        let state = self.state.lock().unwrap();
        state
            .slots
            .get(slot.0)
            .map(|s| s.signal)
            .unwrap_or_default()
    }

    fn data_roaming_enabled(&self, slot: SlotId) -> bool {
        self.state.lock().unwrap().slots[slot.0].roaming_enabled
    }

    fn user_data_enabled(&self, slot: SlotId) -> bool {
        self.state.lock().unwrap().slots[slot.0].user_data
    }

    fn data_allowed(&self, slot: SlotId) -> bool {
        self.state.lock().unwrap().slots[slot.0].data_allowed
    }

    fn switch_score(&self, _display: &DisplayInfo, signal: &SignalStrength) -> u32 {
        u32::from(signal.level)
    }

    fn register_slot_events(&self, slot: SlotId) {
        self.state.lock().unwrap().register_calls.push(slot);
    }

    fn unregister_slot_events(&self, slot: SlotId) {
        self.state.lock().unwrap().unregister_calls.push(slot);
    }
}

/// One recorded outbound request, timestamped on the paused test clock.
#[derive(Clone, Debug, PartialEq)]
pub enum SwitcherCall {
    Validate {
        target: SwitchTarget,
        need_validation: bool,
        at: Instant,
    },
    Immediate {
        target: SwitchTarget,
        reason: EvaluationReason,
        at: Instant,
    },
    Cancel {
        at: Instant,
    },
}

#[derive(Default)]
pub struct MockSwitcher {
    calls: Mutex<Vec<SwitcherCall>>,
}

impl MockSwitcher {
    pub fn calls(&self) -> Vec<SwitcherCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn validations(&self) -> Vec<(SwitchTarget, bool, Instant)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SwitcherCall::Validate {
                    target,
                    need_validation,
                    at,
                } => Some((target, need_validation, at)),
                _ => None,
            })
            .collect()
    }

    pub fn immediates(&self) -> Vec<(SwitchTarget, EvaluationReason, Instant)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SwitcherCall::Immediate { target, reason, at } => Some((target, reason, at)),
                _ => None,
            })
            .collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SwitcherCall::Cancel { .. }))
            .count()
    }
}

#[async_trait]
impl Switcher for MockSwitcher {
    async fn on_require_validation(&self, target: SwitchTarget, need_validation: bool) {
        self.calls.lock().unwrap().push(SwitcherCall::Validate {
            target,
            need_validation,
            at: Instant::now(),
        });
    }

    async fn on_require_immediate_switch(&self, target: SwitchTarget, reason: EvaluationReason) {
        self.calls.lock().unwrap().push(SwitcherCall::Immediate {
            target,
            reason,
            at: Instant::now(),
        });
    }

    async fn on_cancel_pending_validation(&self) {
        self.calls
            .lock()
            .unwrap()
            .push(SwitcherCall::Cancel { at: Instant::now() });
    }
}

#[derive(Default)]
pub struct MockNotifier {
    posted: Mutex<Vec<SubId>>,
    cancelled: Mutex<usize>,
}

impl MockNotifier {
    pub fn posted(&self) -> Vec<SubId> {
        self.posted.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> usize {
        *self.cancelled.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn post_switch_notice(&self, sub: SubId) {
        self.posted.lock().unwrap().push(sub);
    }

    async fn cancel_switch_notice(&self) {
        *self.cancelled.lock().unwrap() += 1;
    }
}

pub struct Fixture {
    pub host: Arc<MockHost>,
    pub switcher: Arc<MockSwitcher>,
    pub notifier: Arc<MockNotifier>,
    pub handle: EngineHandle,
    pub token: CancellationToken,
}

/// Config most scenarios use: 10s dwell, tolerance 1, ping required.
pub fn test_config() -> Config {
    Config {
        stability_dwell: Some(Duration::from_secs(10)),
        score_tolerance: 1,
        require_ping: true,
        max_validation_retries: 3,
        allow_roaming_switch: false,
        score_based_switch: true,
        ..Config::default()
    }
}

pub fn spawn_engine(cfg: Config, host: Arc<MockHost>) -> Fixture {
    let switcher = Arc::new(MockSwitcher::default());
    let notifier = Arc::new(MockNotifier::default());
    let engine = AutoSwitchEngine::new(cfg, host.clone(), switcher.clone(), notifier.clone());
    let handle = engine.handle();
    let token = CancellationToken::new();
    tokio::spawn(engine.run(token.clone()));
    Fixture {
        host,
        switcher,
        notifier,
        handle,
        token,
    }
}

/// Lets the engine drain its queue without advancing the paused clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Pushes the host's registration states into the engine's trackers.
pub async fn sync_service_states(fx: &Fixture, slots: usize) {
    for i in 0..slots {
        fx.handle.notify_service_state_changed(SlotId(i)).unwrap();
    }
    settle().await;
}
