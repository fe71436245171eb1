//! Partial profile updates.
//!
//! Each field is a double `Option`: absent in the payload leaves the stored
//! value alone, an explicit `null` clears it. `id`, `access_token` and
//! `updated_at` are not patchable.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{BloodType, Gender, Profile, RhFactor};

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<Option<BloodType>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub rh_factor: Option<Option<RhFactor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_organ_donor: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Option<Gender>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<Option<f64>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self == &ProfilePatch::default()
    }

    /// Apply the present fields to `profile`. Does not touch `updated_at`.
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(full_name) = &self.full_name {
            profile.full_name = full_name.clone();
        }
        if let Some(birth_date) = self.birth_date {
            profile.birth_date = birth_date;
        }
        if let Some(blood_type) = self.blood_type {
            profile.blood_type = blood_type;
        }
        if let Some(rh_factor) = self.rh_factor {
            profile.rh_factor = rh_factor;
        }
        if let Some(is_organ_donor) = self.is_organ_donor {
            profile.is_organ_donor = is_organ_donor;
        }
        if let Some(gender) = self.gender {
            profile.gender = gender;
        }
        if let Some(weight_kg) = self.weight_kg {
            profile.weight_kg = weight_kg;
        }
        if let Some(height_cm) = self.height_cm {
            profile.height_cm = height_cm;
        }
    }

    pub fn full_name(mut self, value: impl Into<String>) -> Self {
        self.full_name = Some(Some(value.into()));
        self
    }

    pub fn blood(mut self, blood_type: BloodType, rh_factor: RhFactor) -> Self {
        self.blood_type = Some(Some(blood_type));
        self.rh_factor = Some(Some(rh_factor));
        self
    }

    pub fn organ_donor(mut self, value: bool) -> Self {
        self.is_organ_donor = Some(value);
        self
    }
}
