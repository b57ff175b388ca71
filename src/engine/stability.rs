use std::time::Duration;

use tokio::time::Instant;

use crate::types::SwitchTarget;

/// An armed dwell timer for a tentative switch decision.
///
/// Identity is the `(target, need_validation)` pair: re-arming with the same
/// identity keeps the earliest deadline, a different identity cancels the
/// timer and re-arms from now.
#[derive(Clone, Copy, Debug)]
pub(super) struct StabilityCheck {
    pub deadline: Instant,
    pub target: SwitchTarget,
    pub need_validation: bool,
}

impl StabilityCheck {
    pub fn same_identity(&self, target: SwitchTarget, need_validation: bool) -> bool {
        self.target == target && self.need_validation == need_validation
    }
}

/// Arm or re-arm the dwell timer per the identity rules.
pub(super) fn arm(
    slot: &mut Option<StabilityCheck>,
    target: SwitchTarget,
    need_validation: bool,
    dwell: Duration,
) {
    if let Some(armed) = slot {
        if armed.same_identity(target, need_validation) {
            return;
        }
    }
    *slot = Some(StabilityCheck {
        deadline: Instant::now() + dwell,
        target,
        need_validation,
    });
}
