//! Input validation, run before anything reaches the store.

use ridersaid_errors::ValidationError;

use crate::patch::ProfilePatch;
use crate::record::NewRow;
use crate::types::{
    NewAllergy, NewCondition, NewEmergencyContact, NewImplant, NewMedication,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const IMPLANT_YEAR_MIN: i32 = 1900;
pub const IMPLANT_YEAR_MAX: i32 = 2100;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(())
    }
}

fn positive(field: &str, value: Option<Option<f64>>) -> Result<(), ValidationError> {
    match value {
        Some(Some(v)) if !(v.is_finite() && v > 0.0) => Err(ValidationError::out_of_range(
            field,
            v,
            0.0,
            f64::MAX,
        )),
        _ => Ok(()),
    }
}

impl Validate for ProfilePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("weight_kg", self.weight_kg)?;
        positive("height_cm", self.height_cm)
    }
}

impl Validate for NewAllergy {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

impl Validate for NewMedication {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

impl Validate for NewCondition {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

impl Validate for NewImplant {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        match self.year {
            Some(year) if !(IMPLANT_YEAR_MIN..=IMPLANT_YEAR_MAX).contains(&year) => Err(
                ValidationError::out_of_range("year", year, IMPLANT_YEAR_MIN, IMPLANT_YEAR_MAX),
            ),
            _ => Ok(()),
        }
    }
}

impl Validate for NewEmergencyContact {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("phone", &self.phone)
    }
}

impl Validate for NewRow {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            NewRow::Allergies(n) => n.validate(),
            NewRow::Medications(n) => n.validate(),
            NewRow::Conditions(n) => n.validate(),
            NewRow::Implants(n) => n.validate(),
            NewRow::EmergencyContacts(n) => n.validate(),
        }
    }
}

fn well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Check login credentials.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if !well_formed_email(email) {
        return Err(ValidationError::invalid_format("email", "not a valid email address"));
    }
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::too_short("password", len, MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Check sign-up input. Same as login, plus a display name.
pub fn validate_registration(
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<(), ValidationError> {
    validate_credentials(email, password)?;
    require("full_name", full_name)
}
