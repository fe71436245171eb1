//! Built-in demo profile for showing the emergency view without an account.
//!
//! The demo never touches the record store and has no access token, so it
//! cannot be confused with a real profile.

use chrono::{NaiveDate, TimeZone, Utc};
use ridersaid_errors::{Result, RidersAidError};
use ridersaid_records::{
    Allergy, BloodType, Condition, EmergencyContact, Implant, Medication, ProfileId,
    PublicProfile, RecordId, RhFactor, Severity,
};

use crate::aggregate::{AggregationInput, Collections};

/// Path segment under `/e/` that serves the demo.
pub const DEMO_SEGMENT: &str = "demo";

fn allergy(id: &ProfileId, kind: &str, name: &str, severity: Severity) -> Allergy {
    Allergy {
        id: RecordId::generate(),
        profile_id: id.clone(),
        kind: kind.into(),
        name: name.into(),
        severity,
    }
}

fn medication(id: &ProfileId, name: &str, dosage: &str, frequency: &str) -> Medication {
    Medication {
        id: RecordId::generate(),
        profile_id: id.clone(),
        name: name.into(),
        dosage: dosage.into(),
        frequency: frequency.into(),
    }
}

fn condition(id: &ProfileId, name: &str) -> Condition {
    Condition {
        id: RecordId::generate(),
        profile_id: id.clone(),
        name: name.into(),
    }
}

fn contact(id: &ProfileId, name: &str, relationship: &str, phone: &str) -> EmergencyContact {
    EmergencyContact {
        id: RecordId::generate(),
        profile_id: id.clone(),
        name: name.into(),
        relationship: relationship.into(),
        phone: phone.into(),
    }
}

/// Max Mustermann with a full set of records.
pub fn demo_input() -> Result<AggregationInput> {
    let id = ProfileId::new(DEMO_SEGMENT)?;
    let updated_at = Utc
        .with_ymd_and_hms(2024, 1, 10, 14, 30, 0)
        .single()
        .ok_or_else(|| RidersAidError::other("invalid demo timestamp"))?;

    let profile = PublicProfile {
        id: id.clone(),
        full_name: Some("Max Mustermann".into()),
        birth_date: NaiveDate::from_ymd_opt(1985, 3, 15),
        blood_type: Some(BloodType::A),
        rh_factor: Some(RhFactor::Positive),
        is_organ_donor: true,
        gender: None,
        weight_kg: None,
        height_cm: None,
        updated_at,
    };

    let collections = Collections {
        allergies: Some(vec![
            allergy(&id, "medication", "Penicillin", Severity::Severe),
            allergy(&id, "food", "Erdnüsse / Peanuts", Severity::Moderate),
        ]),
        medications: Some(vec![
            medication(&id, "Metoprolol", "50mg", "1x täglich / daily"),
            medication(&id, "Aspirin", "100mg", "1x täglich / daily"),
        ]),
        conditions: Some(vec![
            condition(&id, "Hypertonie / Hypertension"),
            condition(&id, "Diabetes Typ 2 / Type 2 Diabetes"),
        ]),
        implants: Some(vec![Implant {
            id: RecordId::generate(),
            profile_id: id.clone(),
            name: "Herzschrittmacher / Pacemaker".into(),
            year: Some(2021),
        }]),
        contacts: Some(vec![
            contact(&id, "Anna Mustermann", "Ehefrau / Wife", "+49 170 1234567"),
            contact(&id, "Dr. Klaus Schmidt", "Hausarzt / Physician", "+49 30 9876543"),
        ]),
    };

    Ok(AggregationInput {
        profile,
        collections,
    })
}
