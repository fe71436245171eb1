//! RidersAid emergency profile core
//!
//! A rider keeps one medical profile. First responders reach it by scanning
//! a QR code or sticker that carries an opaque access token. This crate holds
//! the logic between the identity provider, the record store and the views:
//!
//! - [`OwnerRepository`]: the owner's CRUD, always scoped to an explicit
//!   identity
//! - [`PublicResolver`]: token to [`TokenGrant`], then read-only collections
//! - [`aggregate()`]: profile plus collections to [`EmergencyRecord`], with
//!   every display default applied in one place
//! - [`TokenLifecycle`]: issuing, rotating and revoking the access token
//! - [`demo_input()`]: a fixed sample profile for the public demo page
//!
//! Both the owner preview and the public view build an [`AggregationInput`]
//! and render it through the same aggregator.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod aggregate;
pub mod demo;
pub mod i18n;
pub mod links;
pub mod owner;
pub mod public;
pub mod token;

pub use aggregate::{
    AggregationContext, AggregationInput, AllergyItem, BloodInfo, Collections, ContactItem,
    EmergencyRecord, MedicationItem, PersonalInfo, PhysicalInfo, Section, aggregate,
    age_in_years, implant_label,
};
pub use demo::{DEMO_SEGMENT, demo_input};
pub use i18n::{Labels, Language};
pub use links::{EmergencyLinks, preview_link, public_link};
pub use owner::{OwnerRepository, OwnerSnapshot};
pub use public::{PublicResolver, TokenGrant};
pub use token::{
    DEFAULT_MAX_ATTEMPTS, RandomTokenSource, SequenceTokenSource, TokenLifecycle, TokenSource,
};
