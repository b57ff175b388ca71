mod core;
mod evaluate;
mod handle;
mod stability;
mod tracker;

pub use core::AutoSwitchEngine;
pub use handle::EngineHandle;
