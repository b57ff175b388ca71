//! # simvisor
//!
//! **Simvisor** is a decision engine for multi-SIM devices: it continuously
//! evaluates which SIM slot should carry the system's default mobile data and
//! recommends a switch when the non-default slot offers materially better
//! service.
//!
//! The engine never switches anything itself. It classifies the world it
//! observes through a [`Host`] capability and emits at most three kinds of
//! requests to a [`Switcher`]: *validate then switch*, *switch immediately*,
//! and *cancel any pending validation*.
//!
//! ## Features
//!
//! | Area               | Description                                                        | Key types / traits                  |
//! |--------------------|--------------------------------------------------------------------|-------------------------------------|
//! | **Engine**         | Serial event loop: intake, scoring, stability dwell, retry.        | [`AutoSwitchEngine`]                |
//! | **Ingress**        | Thread-safe, non-blocking event submission.                        | [`EngineHandle`], [`IngressEvent`]  |
//! | **Capabilities**   | Borrowed view of the surrounding telephony stack.                  | [`Host`]                            |
//! | **Requests**       | Outbound switch/validation/cancel callbacks.                       | [`Switcher`], [`Notifier`]          |
//! | **Policies**       | Pure usability ranking and retry backoff.                          | [`UsableState`], [`RetryBackoff`]   |
//! | **Configuration**  | One-shot, immutable engine settings.                               | [`Config`]                          |
//! | **Errors**         | Typed drop/abort conditions.                                       | [`SwitchError`]                     |
//!
//! ## High-level architecture
//!
//! ```text
//!  host events ──► EngineHandle ──► mpsc ──► AutoSwitchEngine (serial loop)
//!                                               │
//!                                      SlotSignal trackers
//!                                               │
//!                                        evaluation ──► stability dwell
//!                                               │        (one-shot timer)
//!                                               ▼              │
//!                                       Switcher callbacks ◄───┘
//!                              (validate / immediate switch / cancel)
//!                                               │
//!                          validation failure ──┘ (retry with backoff)
//! ```
//!
//! All state lives on the loop; no field needs a lock. The only thread-safe
//! primitive is the ingress channel behind [`EngineHandle`]. Cancellation is
//! cooperative via a `tokio_util::sync::CancellationToken` handed to
//! [`AutoSwitchEngine::run`].

mod config;
mod error;
mod event;
mod host;
mod notify;
mod switcher;
mod types;

mod engine;
mod policies;

// ---- Public re-exports ----

pub use config::Config;
pub use engine::{AutoSwitchEngine, EngineHandle};
pub use error::SwitchError;
pub use event::{EvaluationReason, IngressEvent};
pub use host::Host;
pub use notify::Notifier;
pub use policies::{RetryBackoff, UsableState};
pub use switcher::Switcher;
pub use types::{
    DisplayInfo, NetworkCapabilities, RegState, SignalStrength, SlotId, SubId, SubscriptionInfo,
    SwitchTarget, Transport,
};
