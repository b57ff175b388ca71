use std::collections::{HashSet, VecDeque};
use std::fmt::Write as _;
use std::sync::Arc;

use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::SwitchError;
use crate::event::{EvaluationReason, IngressEvent};
use crate::host::Host;
use crate::notify::Notifier;
use crate::policies::RetryBackoff;
use crate::switcher::Switcher;
use crate::types::{NetworkCapabilities, SlotId, Transport};

use super::handle::EngineHandle;
use super::stability::StabilityCheck;
use super::tracker::SlotSignal;

/// Capacity of the in-memory log kept for the debug dump.
const LOCAL_LOG_CAPACITY: usize = 128;

/// The auto data switch decision engine.
///
/// Owns all mutable state and runs it on one serial loop; see the crate docs
/// for the data flow. Constructed with the host, switcher and notifier
/// capabilities, then consumed by [`AutoSwitchEngine::run`].
pub struct AutoSwitchEngine {
    pub(super) cfg: Config,
    pub(super) host: Arc<dyn Host>,
    pub(super) switcher: Arc<dyn Switcher>,
    notifier: Arc<dyn Notifier>,

    tx: mpsc::Sender<IngressEvent>,
    rx: Option<mpsc::Receiver<IngressEvent>>,

    /// Per-slot signal trackers, indexed by slot.
    pub(super) phones: Vec<SlotSignal>,
    /// Whether the system default network currently runs on Wi-Fi/Ethernet.
    pub(super) default_on_non_cellular: bool,
    displayed_first_notification: bool,
    /// Slot the armed stability timer, if any, is working toward.
    pub(super) selected_target: Option<SlotId>,
    pub(super) validation_failure_count: u32,
    pub(super) stability: Option<StabilityCheck>,
    /// Deadline of a scheduled retry evaluation, if any.
    retry_at: Option<Instant>,
    /// A coalesced `Evaluate` is sitting in the queue.
    evaluate_pending: bool,
    pub(super) backoff: RetryBackoff,
    local_log: LocalLog,
}

impl AutoSwitchEngine {
    /// Creates the engine and subscribes every current modem slot.
    ///
    /// Listening on all slots at boot makes sure nothing is missed; the
    /// first subscriptions-changed event prunes the set down.
    pub fn new(
        cfg: Config,
        host: Arc<dyn Host>,
        switcher: Arc<dyn Switcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(cfg.queue_capacity);
        let backoff = RetryBackoff {
            first: cfg.stability_dwell.unwrap_or_default(),
            max: cfg.max_retry_backoff,
        };
        let mut engine = Self {
            cfg,
            host,
            switcher,
            notifier,
            tx,
            rx: Some(rx),
            phones: Vec::new(),
            default_on_non_cellular: false,
            displayed_first_notification: false,
            selected_target: None,
            validation_failure_count: 0,
            stability: None,
            retry_at: None,
            evaluate_pending: false,
            backoff,
            local_log: LocalLog::new(LOCAL_LOG_CAPACITY),
        };
        for index in 0..engine.host.active_modem_count() {
            engine.register_slot(SlotId(index));
        }
        engine
    }

    /// Returns a handle for submitting events to the engine.
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            tx: self.tx.clone(),
        }
    }

    /// Drives the serial event loop until `token` is cancelled or every
    /// handle has been dropped. Slot listeners are released on the way out.
    pub async fn run(mut self, token: CancellationToken) {
        let Some(mut rx) = self.rx.take() else {
            return;
        };
        loop {
            let stability_deadline = self.stability.map(|s| s.deadline);
            let retry_deadline = self.retry_at;
            select! {
                _ = token.cancelled() => break,
                maybe = rx.recv() => {
                    match maybe {
                        Some(event) => self.dispatch(event).await,
                        None => break,
                    }
                }
                _ = sleep_until(stability_deadline.unwrap_or_else(Instant::now)),
                        if stability_deadline.is_some() => {
                    self.on_stability_met().await;
                }
                _ = sleep_until(retry_deadline.unwrap_or_else(Instant::now)),
                        if retry_deadline.is_some() => {
                    self.retry_at = None;
                    self.on_evaluate(EvaluationReason::RetryValidation).await;
                }
            }
        }
        self.release_listeners();
    }

    async fn dispatch(&mut self, event: IngressEvent) {
        let outcome = match event {
            IngressEvent::ServiceStateChanged { slot } => self.on_service_state_changed(slot),
            IngressEvent::DisplayInfoChanged { slot } => self.on_display_info_changed(slot),
            IngressEvent::SignalStrengthChanged { slot } => self.on_signal_strength_changed(slot),
            IngressEvent::DefaultNetworkChanged { capabilities } => {
                self.on_default_network_changed(capabilities);
                Ok(())
            }
            IngressEvent::DataSettingsChanged => {
                self.request_evaluation(EvaluationReason::DataSettingsChanged);
                Ok(())
            }
            IngressEvent::SimLoaded => {
                self.request_evaluation(EvaluationReason::SimLoaded);
                Ok(())
            }
            IngressEvent::VoiceCallEnded => {
                self.request_evaluation(EvaluationReason::VoiceCallEnded);
                Ok(())
            }
            IngressEvent::SubscriptionsChanged => {
                self.on_subscriptions_changed();
                Ok(())
            }
            IngressEvent::MultiSimConfigChanged { active_modems } => {
                self.on_multi_sim_config_changed(active_modems);
                Ok(())
            }
            IngressEvent::Evaluate { reason } => {
                self.evaluate_pending = false;
                self.on_evaluate(reason).await;
                Ok(())
            }
            IngressEvent::ValidationFailed => {
                self.on_validation_failed();
                Ok(())
            }
            IngressEvent::SwitchCompleted {
                slot,
                due_to_auto_switch,
            } => {
                self.on_switch_completed(slot, due_to_auto_switch).await;
                Ok(())
            }
            IngressEvent::Dump { reply } => {
                let _ = reply.send(self.dump());
                Ok(())
            }
        };
        if let Err(e) = outcome {
            tracing::warn!(label = e.as_label(), "dropping event: {e}");
        }
    }

    // ---- Per-slot tracker updates ----

    fn tracker_mut(&mut self, slot: SlotId) -> Result<&mut SlotSignal, SwitchError> {
        self.phones
            .get_mut(slot.0)
            .ok_or(SwitchError::StaleSlot { slot })
    }

    fn on_service_state_changed(&mut self, slot: SlotId) -> Result<(), SwitchError> {
        let new_state = self.host.registration_state(slot);
        let tracker = self.tracker_mut(slot)?;
        let old_state = tracker.reg_state;
        if new_state == old_state {
            return Ok(());
        }
        tracker.reg_state = new_state;
        // Only transitions across the {out of service, home, other
        // in-service} partitions can change a decision.
        if old_state.in_service() != new_state.in_service()
            || old_state.is_home() != new_state.is_home()
        {
            tracing::debug!("slot {slot}: registration {old_state} -> {new_state}");
            self.request_evaluation(EvaluationReason::RegistrationStateChanged);
        }
        Ok(())
    }

    fn on_display_info_changed(&mut self, slot: SlotId) -> Result<(), SwitchError> {
        let info = self.host.display_info(slot);
        let tracker = self.tracker_mut(slot)?;
        tracker.display_info = info;
        if self.higher_score_candidate() != self.selected_target {
            tracing::debug!("slot {slot}: display info {info:?}");
            self.request_evaluation(EvaluationReason::DisplayInfoChanged);
        }
        Ok(())
    }

    fn on_signal_strength_changed(&mut self, slot: SlotId) -> Result<(), SwitchError> {
        let strength = self.host.signal_strength(slot);
        let tracker = self.tracker_mut(slot)?;
        let old_level = tracker.signal_strength.level;
        if old_level == strength.level {
            return Ok(());
        }
        tracker.signal_strength = strength;
        if self.higher_score_candidate() != self.selected_target {
            tracing::debug!("slot {slot}: signal level {old_level} -> {}", strength.level);
            self.request_evaluation(EvaluationReason::SignalStrengthChanged);
        }
        Ok(())
    }

    // ---- Evaluation scheduling ----

    /// Enqueues an evaluation pass unless one is already pending, immediate
    /// or scheduled. Retry requests are delayed by the exponential backoff
    /// instead of running at once.
    pub(super) fn request_evaluation(&mut self, reason: EvaluationReason) {
        if self.evaluate_pending || self.retry_at.is_some() {
            return;
        }
        if reason == EvaluationReason::RetryValidation {
            let delay = self.backoff.delay(self.validation_failure_count);
            tracing::debug!("retry evaluation scheduled in {delay:?}");
            self.retry_at = Some(Instant::now() + delay);
        } else if self.tx.try_send(IngressEvent::Evaluate { reason }).is_ok() {
            self.evaluate_pending = true;
        } else {
            tracing::warn!("ingress queue full, skipping evaluation for {reason}");
        }
    }

    async fn on_stability_met(&mut self) {
        let Some(check) = self.stability.take() else {
            return;
        };
        self.selected_target = None;
        tracing::debug!(
            "conditions stable, requiring validation toward {} ({} ping)",
            check.target,
            if check.need_validation { "with" } else { "no" },
        );
        self.switcher
            .on_require_validation(check.target, check.need_validation)
            .await;
    }

    /// Feedback from the switcher after a failed validation: back off and
    /// retry until the budget is exhausted, then reset for the next
    /// opportunity.
    fn on_validation_failed(&mut self) {
        if self.validation_failure_count < self.cfg.max_validation_retries {
            self.request_evaluation(EvaluationReason::RetryValidation);
            self.validation_failure_count += 1;
        } else {
            self.logl(format!(
                "giving up after {} failed validations",
                self.cfg.max_validation_retries
            ));
            self.validation_failure_count = 0;
        }
    }

    // ---- Default network transport tracking ----

    fn on_default_network_changed(&mut self, capabilities: Option<NetworkCapabilities>) {
        match capabilities {
            Some(caps) => {
                self.default_on_non_cellular = !caps.has_transport(Transport::Cellular);
                if self.default_on_non_cellular
                    && self.host.is_sub_active(self.host.auto_selected_data_sub())
                {
                    tracing::debug!("default network moved off cellular, revisit the auto switch");
                    self.request_evaluation(EvaluationReason::DefaultNetworkChanged);
                }
            }
            None => {
                tracing::debug!("default network lost, look for a replacement");
                self.default_on_non_cellular = false;
                self.request_evaluation(EvaluationReason::DefaultNetworkChanged);
            }
        }
    }

    // ---- Subscription and modem lifecycle ----

    /// Prunes or extends per-slot listeners to match the active user-visible
    /// subscription set. Tracking is pointless with fewer than two of them.
    fn on_subscriptions_changed(&mut self) {
        let mut active: HashSet<SlotId> = self
            .host
            .active_subscriptions()
            .into_iter()
            .filter(|s| s.visible)
            .map(|s| s.slot)
            .collect();
        if active.len() < 2 {
            active.clear();
        }
        let mut changed = false;
        for index in 0..self.phones.len() {
            let slot = SlotId(index);
            let listening = self.phones[index].listening;
            if active.contains(&slot) && !listening {
                self.register_slot(slot);
                changed = true;
            } else if !active.contains(&slot) && listening {
                self.unregister_slot(slot);
                changed = true;
            }
        }
        if changed {
            let line = format!("subscriptions changed: {}", self.describe_phones());
            self.logl(line);
        }
    }

    fn on_multi_sim_config_changed(&mut self, active_modems: usize) {
        let old = self.phones.len();
        if old == active_modems {
            return;
        }
        for index in active_modems..old {
            self.unregister_slot(SlotId(index));
        }
        self.phones.truncate(active_modems);
        for index in old..active_modems {
            self.register_slot(SlotId(index));
        }
        let line = format!(
            "active modems {old} -> {active_modems}: {}",
            self.describe_phones()
        );
        self.logl(line);
    }

    /// Subscribes host event streams for `slot` behind a fresh tracker
    /// snapshot.
    fn register_slot(&mut self, slot: SlotId) {
        if slot.0 > self.phones.len() {
            tracing::warn!("cannot register out-of-order slot {slot}");
            return;
        }
        let mut tracker = SlotSignal::new(slot, self.host.as_ref());
        tracker.listening = true;
        self.host.register_slot_events(slot);
        if slot.0 == self.phones.len() {
            self.phones.push(tracker);
        } else {
            self.phones[slot.0] = tracker;
        }
    }

    fn unregister_slot(&mut self, slot: SlotId) {
        match self.phones.get_mut(slot.0) {
            Some(tracker) => {
                tracker.listening = false;
                self.host.unregister_slot_events(slot);
            }
            None => tracing::warn!("cannot unregister untracked slot {slot}"),
        }
    }

    fn release_listeners(&mut self) {
        for tracker in &mut self.phones {
            if tracker.listening {
                tracker.listening = false;
                self.host.unregister_slot_events(tracker.slot);
            }
        }
    }

    // ---- First-switch notification ----

    async fn on_switch_completed(&mut self, slot: SlotId, due_to_auto_switch: bool) {
        if self.displayed_first_notification {
            // One notice per lifetime; a later switch retires a stale one.
            self.notifier.cancel_switch_notice().await;
            return;
        }
        if !due_to_auto_switch {
            return;
        }
        let Some(info) = self.host.subscription_for_slot(slot) else {
            tracing::warn!("switch completed on slot {slot} with no backing subscription");
            return;
        };
        if info.opportunistic {
            return;
        }
        self.logl(format!("posting first auto-switch notice for sub {}", info.sub));
        self.notifier.post_switch_notice(info.sub).await;
        self.displayed_first_notification = true;
    }

    // ---- Debug dump ----

    pub(super) fn logl(&mut self, line: String) {
        tracing::debug!("{line}");
        self.local_log.record(line);
    }

    fn describe_phones(&self) -> String {
        let lines: Vec<String> = self
            .phones
            .iter()
            .map(|t| t.describe(self.host.as_ref()))
            .collect();
        lines.join(" ")
    }

    fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "AutoSwitchEngine:");
        let _ = writeln!(out, "  stability_dwell={:?}", self.cfg.stability_dwell);
        let _ = writeln!(out, "  score_tolerance={}", self.cfg.score_tolerance);
        let _ = writeln!(out, "  require_ping={}", self.cfg.require_ping);
        let _ = writeln!(
            out,
            "  max_validation_retries={} validation_failure_count={}",
            self.cfg.max_validation_retries, self.validation_failure_count
        );
        let _ = writeln!(out, "  selected_target={:?}", self.selected_target);
        let _ = writeln!(
            out,
            "  default_on_non_cellular={}",
            self.default_on_non_cellular
        );
        let _ = writeln!(out, "  phones:");
        for tracker in &self.phones {
            let _ = writeln!(out, "    {}", tracker.describe(self.host.as_ref()));
        }
        let _ = writeln!(out, "  local log:");
        for line in self.local_log.iter() {
            let _ = writeln!(out, "    {line}");
        }
        out
    }
}

/// Bounded ring of recent notable lines, kept for the debug dump.
struct LocalLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LocalLog {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn record(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }
}
