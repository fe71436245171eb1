//! Test fixtures for profiles and dependent records.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use ridersaid_records::{
    BloodType, Gender, Identity, NewAllergy, NewCondition, NewEmergencyContact, NewImplant,
    NewMedication, Profile, ProfileId, ProfilePatch, RhFactor, Severity,
};

pub fn identity() -> Identity {
    Identity::new(ProfileId::generate())
}

/// Fixed clock used by aggregation tests: 2024-06-15T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Builder for [`Profile`] values.
#[derive(Debug, Clone)]
pub struct ProfileFixture {
    profile: Profile,
}

impl ProfileFixture {
    pub fn new(id: ProfileId) -> Self {
        Self {
            profile: Profile::new(id, None, fixed_now()),
        }
    }

    /// Max Mustermann, born 1985-03-15, A+, organ donor.
    pub fn max_mustermann(id: ProfileId) -> Self {
        Self::new(id)
            .name("Max Mustermann")
            .birth_date(1985, 3, 15)
            .blood(BloodType::A, RhFactor::Positive)
            .organ_donor(true)
            .physical(Gender::Male, 82.0, 180.0)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.profile.full_name = Some(name.to_string());
        self
    }

    pub fn birth_date(mut self, y: i32, m: u32, d: u32) -> Self {
        self.profile.birth_date = date(y, m, d);
        self
    }

    pub fn blood(mut self, blood_type: BloodType, rh_factor: RhFactor) -> Self {
        self.profile.blood_type = Some(blood_type);
        self.profile.rh_factor = Some(rh_factor);
        self
    }

    pub fn organ_donor(mut self, donor: bool) -> Self {
        self.profile.is_organ_donor = donor;
        self
    }

    pub fn physical(mut self, gender: Gender, weight_kg: f64, height_cm: f64) -> Self {
        self.profile.gender = Some(gender);
        self.profile.weight_kg = Some(weight_kg);
        self.profile.height_cm = Some(height_cm);
        self
    }

    pub fn build(self) -> Profile {
        self.profile
    }

    /// The same attributes as a patch, for seeding a store.
    pub fn as_patch(&self) -> ProfilePatch {
        let p = &self.profile;
        ProfilePatch {
            full_name: Some(p.full_name.clone()),
            birth_date: Some(p.birth_date),
            blood_type: Some(p.blood_type),
            rh_factor: Some(p.rh_factor),
            is_organ_donor: Some(p.is_organ_donor),
            gender: Some(p.gender),
            weight_kg: Some(p.weight_kg),
            height_cm: Some(p.height_cm),
        }
    }
}

pub fn penicillin() -> NewAllergy {
    NewAllergy::new("Penicillin", Severity::Severe).with_kind("medication")
}

pub fn pollen() -> NewAllergy {
    NewAllergy::new("Pollen", Severity::Mild).with_kind("environmental")
}

pub fn metformin() -> NewMedication {
    NewMedication {
        name: "Metformin".into(),
        dosage: "500 mg".into(),
        frequency: "2x daily".into(),
    }
}

pub fn diabetes() -> NewCondition {
    NewCondition {
        name: "Diabetes Type 2".into(),
    }
}

pub fn pacemaker() -> NewImplant {
    NewImplant {
        name: "Pacemaker".into(),
        year: Some(2021),
    }
}

pub fn partner_contact() -> NewEmergencyContact {
    NewEmergencyContact {
        name: "Erika Mustermann".into(),
        relationship: "Partner".into(),
        phone: "+49 170 1234567".into(),
    }
}
