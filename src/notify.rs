//! # User notification sink for the first auto switch.
//!
//! Presentation lives with the host; the engine only decides *whether* the
//! one-time notice should be shown or retired. See
//! [`EngineHandle::notify_switch_completed`](crate::EngineHandle::notify_switch_completed).

use async_trait::async_trait;

use crate::types::SubId;

/// Side-effect sink for the one-time auto-switch notice.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post the "mobile data was switched" notice for `sub`, linking to the
    /// relevant settings surface.
    async fn post_switch_notice(&self, sub: SubId);

    /// Cancel a previously posted notice, if one is still showing.
    async fn cancel_switch_notice(&self);
}
