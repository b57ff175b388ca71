//! The switch evaluation pass: classify the current world as on-default or
//! on-backup and turn it into one of the three outbound requests.
//!
//! Decision lines are built up incrementally (`why`) so one debug line tells
//! the whole story of a pass.

use std::fmt::Write as _;
use std::time::Duration;

use crate::error::SwitchError;
use crate::event::EvaluationReason;
use crate::types::{SlotId, SwitchTarget};

use super::core::AutoSwitchEngine;
use super::stability;

impl AutoSwitchEngine {
    /// Runs one evaluation pass.
    ///
    /// Fast exits: feature disabled, not a usable dual-SIM setup, or the
    /// default data subscription cannot be resolved (the latter leaves any
    /// armed timer untouched).
    pub(super) async fn on_evaluate(&mut self, reason: EvaluationReason) {
        let Some(dwell) = self.cfg.stability_dwell else {
            return;
        };
        let default_sub = self.host.default_data_sub();
        let visible = self
            .host
            .active_subscriptions()
            .iter()
            .filter(|s| s.visible)
            .count();
        if visible < 2 {
            return;
        }
        let Some(default_slot) = self
            .host
            .slot_of_sub(default_sub)
            .filter(|slot| slot.0 < self.phones.len())
        else {
            let e = SwitchError::NoDefaultSlot { sub: default_sub };
            tracing::warn!(label = e.as_label(), "{e}; keeping any pending switch");
            return;
        };
        let Some(preferred) = self.host.preferred_data_slot() else {
            tracing::warn!("host reports no preferred data slot");
            return;
        };

        let mut why =
            format!("evaluate: default=slot {default_slot} preferred=slot {preferred} reason={reason}");

        if preferred == default_slot {
            match self.switch_candidate(default_slot, &mut why) {
                Some(candidate) => {
                    tracing::debug!("{why}");
                    self.selected_target = Some(candidate);
                    self.arm_stability(SwitchTarget::Slot(candidate), self.cfg.require_ping, dwell);
                }
                None => {
                    tracing::debug!("{why}");
                    self.cancel_any_pending_switch().await;
                }
            }
        } else {
            self.evaluate_on_backup(default_slot, preferred, dwell, why)
                .await;
        }
    }

    /// On the default slot: pick a sufficiently better candidate, or `None`.
    ///
    /// First eligible slot wins; iteration in slot order is the stable
    /// tie-break.
    fn switch_candidate(&self, default_slot: SlotId, why: &mut String) -> Option<SlotId> {
        let host = self.host.as_ref();
        let default_status = self.phones.get(default_slot.0)?;

        if !host.user_data_enabled(default_slot) {
            why.push_str(", no candidate while mobile data is off");
            return None;
        }
        if self.default_on_non_cellular {
            why.push_str(", no candidate while the default network is non-cellular");
            return None;
        }

        let score_switch = self.score_switch_enabled();
        // Without score-based switching there is nothing to gain while the
        // default slot already has the best service it can reach.
        if self.cfg.allow_roaming_switch {
            if !score_switch && default_status.reg_state.is_home() {
                why.push_str(", no candidate while the default slot has home service");
                return None;
            }
        } else if !score_switch && default_status.reg_state.in_service() {
            why.push_str(", no candidate while the default slot is in service");
            return None;
        }

        for candidate in &self.phones {
            if candidate.slot == default_slot {
                continue;
            }
            let mut better = false;
            if self.cfg.allow_roaming_switch {
                let default_rank = default_status.usable_state(host);
                let candidate_rank = candidate.usable_state(host);
                let _ = write!(
                    why,
                    ", slot {} is {candidate_rank}, default is {default_rank}",
                    candidate.slot
                );
                if candidate_rank > default_rank {
                    better = true;
                } else if score_switch
                    && candidate_rank == default_rank
                    && candidate_rank.usable()
                {
                    // Same usable rank: only a clear score win justifies the
                    // churn.
                    better = self.exceeds_tolerance(
                        candidate.score(host),
                        default_status.score(host),
                        why,
                    );
                }
            } else if candidate.reg_state.is_home() {
                let _ = write!(why, ", slot {} has home service", candidate.slot);
                if default_status.reg_state.in_service() {
                    if score_switch {
                        better = self.exceeds_tolerance(
                            candidate.score(host),
                            default_status.score(host),
                            why,
                        );
                    }
                } else {
                    better = true;
                }
            }
            if better {
                if host.data_allowed(candidate.slot) {
                    return Some(candidate.slot);
                }
                let _ = write!(why, ", but data is not allowed on slot {}", candidate.slot);
            }
        }
        why.push_str(", no qualified candidate");
        None
    }

    /// On a backup slot: decide whether (and how urgently) to fall back to
    /// the default.
    async fn evaluate_on_backup(
        &mut self,
        default_slot: SlotId,
        preferred: SlotId,
        dwell: Duration,
        mut why: String,
    ) {
        if self.phones.get(preferred.0).is_none() {
            let e = SwitchError::StalePreferredSlot { slot: preferred };
            tracing::warn!(label = e.as_label(), "{e}");
            return;
        }
        if !self.host.user_data_enabled(default_slot) || !self.host.data_allowed(preferred) {
            why.push_str(", user turned off settings, back to default immediately");
            tracing::debug!("{why}");
            self.switcher
                .on_require_immediate_switch(
                    SwitchTarget::Default,
                    EvaluationReason::DataSettingsChanged,
                )
                .await;
            return;
        }

        let mut back_to_default = false;
        let mut need_validation = true;

        let host = self.host.as_ref();
        let backup_status = &self.phones[preferred.0];
        let default_status = &self.phones[default_slot.0];

        if self.default_on_non_cellular {
            why.push_str(", back to default, the default network is on a non-cellular transport");
            back_to_default = true;
            need_validation = false;
        } else if self.cfg.allow_roaming_switch {
            let default_rank = default_status.usable_state(host);
            let backup_rank = backup_status.usable_state(host);
            let backup_usable = backup_rank.usable();

            if backup_rank < default_rank {
                let _ = write!(
                    why,
                    ", back to default: it is {default_rank}, backup is {backup_rank}"
                );
                back_to_default = true;
                // Only bother validating if the backup still works at all.
                need_validation = backup_usable && self.cfg.require_ping;
            } else if backup_rank == default_rank {
                let _ = write!(why, ", default is {default_rank}, backup is {backup_rank}");
                if !backup_usable {
                    why.push_str(", back to default, neither slot is usable");
                    back_to_default = true;
                    need_validation = false;
                } else if self.score_switch_enabled() {
                    let default_score = default_status.score(host);
                    let backup_score = backup_status.score(host);
                    if i64::from(default_score) - i64::from(backup_score)
                        > i64::from(self.cfg.score_tolerance)
                    {
                        let _ = write!(
                            why,
                            ", back to default for the higher score {default_score} versus {backup_score}"
                        );
                        back_to_default = true;
                        need_validation = self.cfg.require_ping;
                    }
                } else {
                    why.push_str(", back to default, it is equally usable");
                    back_to_default = true;
                    need_validation = self.cfg.require_ping;
                }
            }
        } else if !backup_status.reg_state.is_home() {
            why.push_str(", back to default, the backup slot lost home service");
            back_to_default = true;
            need_validation = false;
        } else if self.score_switch_enabled() {
            let default_score = default_status.score(host);
            let backup_score = backup_status.score(host);
            if i64::from(default_score) - i64::from(backup_score)
                > i64::from(self.cfg.score_tolerance)
            {
                let _ = write!(
                    why,
                    ", back to default for the higher score {default_score} versus {backup_score}"
                );
                back_to_default = true;
                need_validation = self.cfg.require_ping;
            }
        } else if default_status.reg_state.in_service() {
            why.push_str(", back to default, it regained service");
            back_to_default = true;
            need_validation = self.cfg.require_ping;
        }

        if back_to_default {
            tracing::debug!("{why}");
            self.selected_target = Some(default_slot);
            self.arm_stability(SwitchTarget::Default, need_validation, dwell);
        } else {
            tracing::debug!("{why}");
            self.cancel_any_pending_switch().await;
        }
    }

    /// `true` when `candidate`'s score clears `current` by more than the
    /// configured tolerance; appends the verdict to the decision line.
    fn exceeds_tolerance(&self, candidate: u32, current: u32, why: &mut String) -> bool {
        if i64::from(candidate) - i64::from(current) > i64::from(self.cfg.score_tolerance) {
            let _ = write!(why, " with winning score {candidate} versus {current}");
            true
        } else {
            let _ = write!(
                why,
                ", but score {candidate} does not clear the bar against {current}"
            );
            false
        }
    }

    pub(super) fn score_switch_enabled(&self) -> bool {
        self.cfg.score_based_switch && self.cfg.score_tolerance >= 0
    }

    /// Cheap prefilter for noisy display/signal updates: the first slot
    /// whose score beats the currently preferred slot's by more than the
    /// tolerance.
    pub(super) fn higher_score_candidate(&self) -> Option<SlotId> {
        let preferred = self.host.preferred_data_slot()?;
        let current = self
            .phones
            .get(preferred.0)?
            .score(self.host.as_ref());
        let tolerance = i64::from(self.cfg.score_tolerance);
        self.phones
            .iter()
            .filter(|t| t.slot != preferred)
            .find(|t| i64::from(t.score(self.host.as_ref())) - i64::from(current) > tolerance)
            .map(|t| t.slot)
    }

    fn arm_stability(&mut self, target: SwitchTarget, need_validation: bool, dwell: Duration) {
        tracing::debug!("stability check toward {target}, need_validation={need_validation}");
        stability::arm(&mut self.stability, target, need_validation, dwell);
    }

    /// Tears down the armed check and tells the switcher to drop any
    /// in-flight validation; the environment no longer favors switching.
    pub(super) async fn cancel_any_pending_switch(&mut self) {
        self.selected_target = None;
        self.validation_failure_count = 0;
        self.stability = None;
        self.switcher.on_cancel_pending_validation().await;
    }
}
