pub mod backoff;
pub mod scoring;

pub use backoff::RetryBackoff;
pub use scoring::UsableState;
