//! Snapshot tests for the serialized emergency record.
//!
//! The record is the JSON body of `GET /e/{token}`, so its shape is pinned.

use insta::assert_snapshot;
use ridersaid_emergency::{AggregationContext, Collections, Language, Section, aggregate};
use ridersaid_records::{Implant, ProfileId, RecordId};
use ridersaid_test_helpers::fixtures::{ProfileFixture, fixed_now};
use ridersaid_test_helpers::must;

fn max() -> ridersaid_records::PublicProfile {
    ProfileFixture::max_mustermann(must(ProfileId::new("max")))
        .build()
        .public_view()
}

#[test]
fn test_personal_and_blood_json() {
    let record = aggregate(
        &max(),
        &Collections::empty(),
        &AggregationContext::new(Language::En, fixed_now()),
    );
    assert_snapshot!(
        must(serde_json::to_string(&record.personal)),
        @r#"{"name":"Max Mustermann","birthDate":"1985-03-15","age":39}"#
    );
    assert_snapshot!(
        must(serde_json::to_string(&record.blood)),
        @r#"{"type":"A","rh":"+","display":"A+"}"#
    );
}

#[test]
fn test_section_json() {
    let empty: Section<String> = Section::Empty {
        placeholder: "Keine".into(),
    };
    assert_snapshot!(
        must(serde_json::to_string(&empty)),
        @r#"{"state":"empty","placeholder":"Keine"}"#
    );

    let loading: Section<String> = Section::Loading;
    assert_snapshot!(must(serde_json::to_string(&loading)), @r#"{"state":"loading"}"#);
}

#[test]
fn test_implant_section_json() {
    let profile = max();
    let collections = Collections {
        implants: Some(vec![Implant {
            id: RecordId::generate(),
            profile_id: profile.id.clone(),
            name: "Pacemaker".into(),
            year: Some(2021),
        }]),
        ..Collections::empty()
    };
    let record = aggregate(
        &profile,
        &collections,
        &AggregationContext::new(Language::De, fixed_now()),
    );
    assert_snapshot!(
        must(serde_json::to_string(&record.implants)),
        @r#"{"state":"items","items":["Pacemaker (2021)"]}"#
    );
    assert_snapshot!(
        must(serde_json::to_string(&record.physical)),
        @r#"{"gender":"Männlich","weightKg":82.0,"heightCm":180.0,"hasData":true}"#
    );
}
