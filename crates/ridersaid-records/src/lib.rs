//! Profile and medical record types
//!
//! This crate defines the persisted data model of RidersAid: one [`Profile`]
//! per identity and five dependent collections keyed by `profile_id`
//! ([`Allergy`], [`Medication`], [`Condition`], [`Implant`],
//! [`EmergencyContact`]). Every optional medical attribute is an `Option`;
//! defaulting for display happens later, in the aggregator.
//!
//! Insert payloads (`New*`) deliberately have no `profile_id`. The owning
//! profile is stamped by the store from the acting identity, so a caller
//! cannot create rows under someone else's profile.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod patch;
pub mod record;
pub mod types;
pub mod validation;

pub use ids::{AccessToken, Identity, ProfileId, RecordId};
pub use patch::ProfilePatch;
pub use record::{Collection, DependentRecord, NewRow, Row};
pub use types::*;
pub use validation::{Validate, validate_credentials, validate_registration};
