//! Uniform handling of the five dependent collections.

use std::fmt;
use std::str::FromStr;

use ridersaid_errors::ValidationError;
use serde::{Deserialize, Serialize};

use crate::ids::{ProfileId, RecordId};
use crate::types::{
    Allergy, Condition, EmergencyContact, Implant, Medication, NewAllergy, NewCondition,
    NewEmergencyContact, NewImplant, NewMedication,
};

/// Name of a dependent collection, as used in storage and in URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Allergies,
    Medications,
    Conditions,
    Implants,
    EmergencyContacts,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Allergies,
        Collection::Medications,
        Collection::Conditions,
        Collection::Implants,
        Collection::EmergencyContacts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Allergies => "allergies",
            Collection::Medications => "medications",
            Collection::Conditions => "conditions",
            Collection::Implants => "implants",
            Collection::EmergencyContacts => "emergency_contacts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let expected: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
                ValidationError::invalid_enum("collection", s, &expected)
            })
    }
}

/// A stored dependent row of any collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "collection", content = "row", rename_all = "snake_case")]
pub enum Row {
    Allergies(Allergy),
    Medications(Medication),
    Conditions(Condition),
    Implants(Implant),
    EmergencyContacts(EmergencyContact),
}

impl Row {
    pub fn collection(&self) -> Collection {
        match self {
            Row::Allergies(_) => Collection::Allergies,
            Row::Medications(_) => Collection::Medications,
            Row::Conditions(_) => Collection::Conditions,
            Row::Implants(_) => Collection::Implants,
            Row::EmergencyContacts(_) => Collection::EmergencyContacts,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Row::Allergies(r) => r.id,
            Row::Medications(r) => r.id,
            Row::Conditions(r) => r.id,
            Row::Implants(r) => r.id,
            Row::EmergencyContacts(r) => r.id,
        }
    }

    pub fn profile_id(&self) -> &ProfileId {
        match self {
            Row::Allergies(r) => &r.profile_id,
            Row::Medications(r) => &r.profile_id,
            Row::Conditions(r) => &r.profile_id,
            Row::Implants(r) => &r.profile_id,
            Row::EmergencyContacts(r) => &r.profile_id,
        }
    }
}

/// Insert payload for any collection. Carries no owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "collection", content = "row", rename_all = "snake_case")]
pub enum NewRow {
    Allergies(NewAllergy),
    Medications(NewMedication),
    Conditions(NewCondition),
    Implants(NewImplant),
    EmergencyContacts(NewEmergencyContact),
}

impl NewRow {
    /// Decode a JSON payload for the given collection.
    pub fn from_json(
        collection: Collection,
        value: serde_json::Value,
    ) -> Result<Self, ValidationError> {
        let invalid = |e: serde_json::Error| {
            ValidationError::invalid_format(collection.as_str(), e.to_string())
        };
        Ok(match collection {
            Collection::Allergies => {
                NewRow::Allergies(serde_json::from_value(value).map_err(invalid)?)
            }
            Collection::Medications => {
                NewRow::Medications(serde_json::from_value(value).map_err(invalid)?)
            }
            Collection::Conditions => {
                NewRow::Conditions(serde_json::from_value(value).map_err(invalid)?)
            }
            Collection::Implants => {
                NewRow::Implants(serde_json::from_value(value).map_err(invalid)?)
            }
            Collection::EmergencyContacts => {
                NewRow::EmergencyContacts(serde_json::from_value(value).map_err(invalid)?)
            }
        })
    }

    pub fn collection(&self) -> Collection {
        match self {
            NewRow::Allergies(_) => Collection::Allergies,
            NewRow::Medications(_) => Collection::Medications,
            NewRow::Conditions(_) => Collection::Conditions,
            NewRow::Implants(_) => Collection::Implants,
            NewRow::EmergencyContacts(_) => Collection::EmergencyContacts,
        }
    }

    /// Stamp the payload with its id and owning profile.
    pub fn into_row(self, id: RecordId, profile_id: ProfileId) -> Row {
        match self {
            NewRow::Allergies(n) => Row::Allergies(Allergy {
                id,
                profile_id,
                kind: n.kind,
                name: n.name,
                severity: n.severity,
            }),
            NewRow::Medications(n) => Row::Medications(Medication {
                id,
                profile_id,
                name: n.name,
                dosage: n.dosage,
                frequency: n.frequency,
            }),
            NewRow::Conditions(n) => Row::Conditions(Condition {
                id,
                profile_id,
                name: n.name,
            }),
            NewRow::Implants(n) => Row::Implants(Implant {
                id,
                profile_id,
                name: n.name,
                year: n.year,
            }),
            NewRow::EmergencyContacts(n) => Row::EmergencyContacts(EmergencyContact {
                id,
                profile_id,
                name: n.name,
                relationship: n.relationship,
                phone: n.phone,
            }),
        }
    }
}

/// Typed view over one collection, so callers can work with `Allergy`
/// instead of matching on [`Row`].
pub trait DependentRecord: Sized + Clone + Send + Sync + 'static {
    /// Insert payload type.
    type New: Clone + Send + Sync + 'static;

    const COLLECTION: Collection;

    fn from_row(row: Row) -> Option<Self>;

    fn wrap_new(new: Self::New) -> NewRow;

    fn id(&self) -> RecordId;

    fn profile_id(&self) -> &ProfileId;
}

macro_rules! dependent_record {
    ($ty:ident, $new:ident, $variant:ident) => {
        impl DependentRecord for $ty {
            type New = $new;

            const COLLECTION: Collection = Collection::$variant;

            fn from_row(row: Row) -> Option<Self> {
                match row {
                    Row::$variant(record) => Some(record),
                    _ => None,
                }
            }

            fn wrap_new(new: Self::New) -> NewRow {
                NewRow::$variant(new)
            }

            fn id(&self) -> RecordId {
                self.id
            }

            fn profile_id(&self) -> &ProfileId {
                &self.profile_id
            }
        }
    };
}

dependent_record!(Allergy, NewAllergy, Allergies);
dependent_record!(Medication, NewMedication, Medications);
dependent_record!(Condition, NewCondition, Conditions);
dependent_record!(Implant, NewImplant, Implants);
dependent_record!(EmergencyContact, NewEmergencyContact, EmergencyContacts);
