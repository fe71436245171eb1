//! Shared test utilities for RidersAid.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`mock`] - A call-counting, failure-injecting [`RecordStore`] wrapper
//! - [`fixtures`] - Profile and record builders for common scenarios
//! - [`prelude`] - Convenience re-exports
//!
//! ```rust,ignore
//! use ridersaid_test_helpers::prelude::*;
//! ```
//!
//! [`RecordStore`]: ridersaid_store::RecordStore

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod must;
pub mod prelude;

#[cfg(feature = "mock")]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

#[cfg(feature = "fixtures")]
#[cfg_attr(docsrs, doc(cfg(feature = "fixtures")))]
pub mod fixtures;

pub use must::*;
