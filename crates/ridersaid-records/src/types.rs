//! Profile and dependent record definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AccessToken, ProfileId, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    A,
    B,
    AB,
    /// Also accepted as `"0"`, the German notation.
    #[serde(alias = "0")]
    O,
}

impl BloodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::A => "A",
            BloodType::B => "B",
            BloodType::AB => "AB",
            BloodType::O => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RhFactor {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
}

impl RhFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            RhFactor::Positive => "+",
            RhFactor::Negative => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Diverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    #[default]
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

/// The single medical-identity record of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    /// Absent and blank names are both rendered as "not specified".
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    pub rh_factor: Option<RhFactor>,
    #[serde(default)]
    pub is_organ_donor: bool,
    pub gender: Option<Gender>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    /// Unset until the owner issues one.
    pub access_token: Option<AccessToken>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Empty profile for a new identity. No access token is issued here.
    pub fn new(id: ProfileId, full_name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name,
            birth_date: None,
            blood_type: None,
            rh_factor: None,
            is_organ_donor: false,
            gender: None,
            weight_kg: None,
            height_cm: None,
            access_token: None,
            updated_at: now,
        }
    }

    /// Projection served to token holders. Drops the token itself.
    pub fn public_view(&self) -> PublicProfile {
        PublicProfile {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            birth_date: self.birth_date,
            blood_type: self.blood_type,
            rh_factor: self.rh_factor,
            is_organ_donor: self.is_organ_donor,
            gender: self.gender,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            updated_at: self.updated_at,
        }
    }
}

/// Public projection of [`Profile`]: every field except `access_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: ProfileId,
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    pub rh_factor: Option<RhFactor>,
    #[serde(default)]
    pub is_organ_donor: bool,
    pub gender: Option<Gender>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

fn default_allergy_type() -> String {
    "other".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergy {
    pub id: RecordId,
    pub profile_id: ProfileId,
    #[serde(rename = "type", default = "default_allergy_type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implant {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub name: String,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    pub phone: String,
}

/// Insert payload for [`Allergy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAllergy {
    #[serde(rename = "type", default = "default_allergy_type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub severity: Severity,
}

impl NewAllergy {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: default_allergy_type(),
            name: name.into(),
            severity,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

/// Insert payload for [`Medication`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMedication {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
}

/// Insert payload for [`Condition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCondition {
    pub name: String,
}

/// Insert payload for [`Implant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewImplant {
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Insert payload for [`EmergencyContact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmergencyContact {
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    pub phone: String,
}
