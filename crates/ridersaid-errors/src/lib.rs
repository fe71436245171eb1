//! Centralized error types for RidersAid
//!
//! Every crate in the workspace reports failures through the types defined
//! here, so that the view layer can tell the four user-facing outcomes apart:
//!
//! - [`access`]: identity and ownership failures (`Unauthenticated`, `NotFound`)
//! - [`store`]: record store failures (`StoreUnavailable`)
//! - [`validation`]: payload and form validation (`ValidationFailed`)
//! - [`common`]: the top-level [`RidersAidError`], its [`ErrorKind`] and
//!   [`ErrorSeverity`] classification, and the [`ResultExt`] context helper
//!
//! Errors are never swallowed below the view layer and nothing in the core
//! retries on its own. A caller decides what to show by matching on
//! [`RidersAidError::kind`].
//!
//! # Example
//!
//! ```
//! use ridersaid_errors::prelude::*;
//!
//! fn require_name(name: &str) -> Result<&str> {
//!     if name.trim().is_empty() {
//!         return Err(ValidationError::required("name").into());
//!     }
//!     Ok(name)
//! }
//!
//! let err = require_name("  ").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ValidationFailed);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod access;
pub mod common;
pub mod prelude;
pub mod store;
pub mod validation;

pub use access::AccessError;
pub use common::{ErrorContext, ErrorKind, ErrorSeverity, ResultExt, RidersAidError};
pub use store::StoreError;
pub use validation::ValidationError;

/// A specialized `Result` type for RidersAid operations.
pub type Result<T> = std::result::Result<T, RidersAidError>;
