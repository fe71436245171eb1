//! Convenience re-exports for common test utilities.

pub use crate::must::{must, must_err, must_some};

#[cfg(feature = "fixtures")]
pub use crate::fixtures::{ProfileFixture, fixed_now, identity};

#[cfg(feature = "mock")]
pub use crate::mock::CountingStore;
