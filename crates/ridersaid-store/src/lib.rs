//! Record store for RidersAid
//!
//! The store holds one `profiles` table and five dependent tables keyed by
//! `profile_id`. Access control lives here, not in callers:
//!
//! - **Owner scope**: a row is visible and mutable only when its
//!   `profile_id` equals the acting identity.
//! - **Public scope**: a profile is readable by exact `access_token` match,
//!   and dependent rows of a profile id are readable without further checks.
//!
//! [`RecordStore`] is the contract; [`MemoryStore`] is the reference
//! implementation, optionally persisted as a JSON snapshot through
//! [`FileStorage`].

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod contract;
pub mod memory;
pub mod storage;

pub use contract::{RecordStore, RowScope, TokenAssignment, TokenWrite};
pub use memory::{MemoryStore, Snapshot};
pub use storage::FileStorage;
