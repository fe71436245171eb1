//! Profile aggregation.
//!
//! [`aggregate`] turns a public profile and its five collections into the
//! [`EmergencyRecord`] shown to first responders. It is pure: the clock and
//! the display language come in through [`AggregationContext`], so the same
//! input always yields the same record. All display defaulting happens here
//! and nowhere else.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use ridersaid_records::{
    Allergy, Condition, EmergencyContact, Implant, Medication, PublicProfile, Severity,
};
use serde::{Deserialize, Serialize};

use crate::i18n::Language;

const MS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationContext {
    pub language: Language,
    pub now: DateTime<Utc>,
}

impl AggregationContext {
    pub fn new(language: Language, now: DateTime<Utc>) -> Self {
        Self { language, now }
    }
}

/// Fetch state of the five dependent collections. `None` means the read has
/// not completed yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub allergies: Option<Vec<Allergy>>,
    pub medications: Option<Vec<Medication>>,
    pub conditions: Option<Vec<Condition>>,
    pub implants: Option<Vec<Implant>>,
    pub contacts: Option<Vec<EmergencyContact>>,
}

impl Collections {
    /// Every collection fetched and empty.
    pub fn empty() -> Self {
        Self {
            allergies: Some(Vec::new()),
            medications: Some(Vec::new()),
            conditions: Some(Vec::new()),
            implants: Some(Vec::new()),
            contacts: Some(Vec::new()),
        }
    }
}

/// Everything the aggregator needs, produced identically by the owner path
/// and the public token path.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationInput {
    pub profile: PublicProfile,
    pub collections: Collections,
}

impl AggregationInput {
    pub fn aggregate(&self, ctx: &AggregationContext) -> EmergencyRecord {
        aggregate(&self.profile, &self.collections, ctx)
    }
}

/// One collection of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Section<T> {
    Loading,
    Empty { placeholder: String },
    Items { items: Vec<T> },
}

impl<T> Section<T> {
    fn build<R>(rows: Option<&[R]>, placeholder: &str, item: impl Fn(&R) -> T) -> Self {
        match rows {
            None => Section::Loading,
            Some([]) => Section::Empty {
                placeholder: placeholder.to_string(),
            },
            Some(rows) => Section::Items {
                items: rows.iter().map(item).collect(),
            },
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Section::Items { items } => items,
            Section::Loading | Section::Empty { .. } => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Section::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    /// ISO date, or empty when unknown.
    pub birth_date: String,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodInfo {
    #[serde(rename = "type")]
    pub blood_type: String,
    pub rh: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalInfo {
    pub gender: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub severity: Severity,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationItem {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactItem {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    /// Phone number without whitespace, for `tel:` links.
    pub dial: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRecord {
    pub language: Language,
    pub personal: PersonalInfo,
    pub blood: BloodInfo,
    pub physical: PhysicalInfo,
    pub allergies: Section<AllergyItem>,
    pub medications: Section<MedicationItem>,
    pub conditions: Section<String>,
    pub implants: Section<String>,
    pub contacts: Section<ContactItem>,
    pub organ_donor: bool,
    pub last_updated: DateTime<Utc>,
}

/// Whole years between `birth_date` (at UTC midnight) and `now`, using a
/// 365.25-day year. `None` for birth dates in the future.
pub fn age_in_years(birth_date: NaiveDate, now: DateTime<Utc>) -> Option<u32> {
    let born = birth_date.and_time(NaiveTime::MIN).and_utc();
    let elapsed_ms = (now - born).num_milliseconds();
    if elapsed_ms < 0 {
        return None;
    }
    u32::try_from((elapsed_ms as f64 / MS_PER_YEAR).floor() as i64).ok()
}

/// `"{name} ({year})"`, or just the name when the year is unknown.
pub fn implant_label(implant: &Implant) -> String {
    match implant.year {
        Some(year) => format!("{} ({year})", implant.name),
        None => implant.name.clone(),
    }
}

pub fn aggregate(
    profile: &PublicProfile,
    collections: &Collections,
    ctx: &AggregationContext,
) -> EmergencyRecord {
    let labels = ctx.language.labels();

    let name = profile
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(labels.not_specified)
        .to_string();

    let personal = PersonalInfo {
        name,
        birth_date: profile
            .birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        age: profile.birth_date.and_then(|d| age_in_years(d, ctx.now)),
    };

    let blood_type = profile.blood_type.map(|b| b.as_str()).unwrap_or_default();
    let rh = profile.rh_factor.map(|r| r.as_str()).unwrap_or_default();
    let blood = BloodInfo {
        blood_type: blood_type.to_string(),
        rh: rh.to_string(),
        display: format!("{blood_type}{rh}"),
    };

    let physical = PhysicalInfo {
        gender: profile.gender.map(|g| ctx.language.gender(g).to_string()),
        weight_kg: profile.weight_kg,
        height_cm: profile.height_cm,
        has_data: profile.gender.is_some()
            || profile.weight_kg.is_some()
            || profile.height_cm.is_some(),
    };

    EmergencyRecord {
        language: ctx.language,
        personal,
        blood,
        physical,
        allergies: Section::build(collections.allergies.as_deref(), labels.none, |a: &Allergy| {
            AllergyItem {
                kind: a.kind.clone(),
                name: a.name.clone(),
                severity: a.severity,
                critical: a.severity == Severity::Severe,
            }
        }),
        medications: Section::build(
            collections.medications.as_deref(),
            labels.none,
            |m: &Medication| MedicationItem {
                name: m.name.clone(),
                dosage: m.dosage.clone(),
                frequency: m.frequency.clone(),
            },
        ),
        conditions: Section::build(
            collections.conditions.as_deref(),
            labels.none,
            |c: &Condition| c.name.clone(),
        ),
        implants: Section::build(collections.implants.as_deref(), labels.none, implant_label),
        contacts: Section::build(
            collections.contacts.as_deref(),
            labels.not_specified,
            |c: &EmergencyContact| ContactItem {
                name: c.name.clone(),
                relationship: c.relationship.clone(),
                phone: c.phone.clone(),
                dial: c.phone.chars().filter(|ch| !ch.is_whitespace()).collect(),
            },
        ),
        organ_donor: profile.is_organ_donor,
        last_updated: profile.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    #[test]
    fn test_age_uses_quarter_day_year() {
        let birth = NaiveDate::from_ymd_opt(1985, 3, 15);
        assert_eq!(birth.and_then(|b| age_in_years(b, at(2024, 6, 15))), Some(39));
        assert_eq!(birth.and_then(|b| age_in_years(b, at(2024, 3, 14))), Some(38));
    }

    #[test]
    fn test_future_birth_date_has_no_age() {
        let birth = NaiveDate::from_ymd_opt(2030, 1, 1);
        assert_eq!(birth.and_then(|b| age_in_years(b, at(2024, 6, 15))), None);
    }

    #[test]
    fn test_section_states() {
        let loading: Section<String> =
            Section::build(None::<&[Condition]>, "None", |c| c.name.clone());
        assert!(loading.is_loading());

        let empty: Section<String> =
            Section::build(Some(&[][..]), "Keine", |c: &Condition| c.name.clone());
        assert_eq!(
            empty,
            Section::Empty {
                placeholder: "Keine".into()
            }
        );
    }
}
