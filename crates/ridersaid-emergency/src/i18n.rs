//! German and English labels for placeholders and messages.

use std::fmt;
use std::str::FromStr;

use ridersaid_errors::ValidationError;
use ridersaid_records::Gender;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

/// Fixed strings shown by the emergency view.
#[derive(Debug)]
pub struct Labels {
    pub not_specified: &'static str,
    pub none: &'static str,
    pub male: &'static str,
    pub female: &'static str,
    pub diverse: &'static str,
    pub profile_not_found: &'static str,
    pub profile_not_found_detail: &'static str,
}

static DE: Labels = Labels {
    not_specified: "Nicht angegeben",
    none: "Keine",
    male: "Männlich",
    female: "Weiblich",
    diverse: "Divers",
    profile_not_found: "Profil nicht gefunden",
    profile_not_found_detail: "Dieses Notfall-Profil existiert nicht oder der Link ist ungültig.",
};

static EN: Labels = Labels {
    not_specified: "Not specified",
    none: "None",
    male: "Male",
    female: "Female",
    diverse: "Diverse",
    profile_not_found: "Profile not found",
    profile_not_found_detail: "This emergency profile does not exist or the link is invalid.",
};

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Language::De => &DE,
            Language::En => &EN,
        }
    }

    pub fn gender(&self, gender: Gender) -> &'static str {
        let labels = self.labels();
        match gender {
            Gender::Male => labels.male,
            Gender::Female => labels.female,
            Gender::Diverse => labels.diverse,
        }
    }

    /// Match a language tag such as `de-AT` or `EN` by its primary subtag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        match primary.to_ascii_lowercase().as_str() {
            "de" => Some(Language::De),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    /// Pick the supported language with the highest `q` weight from an
    /// `Accept-Language` header, falling back to `default`.
    pub fn detect(accept_language: Option<&str>, default: Language) -> Language {
        let Some(header) = accept_language else {
            return default;
        };

        let mut best: Option<(f32, Language)> = None;
        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let Some(language) = parts.next().and_then(Language::from_tag) else {
                continue;
            };
            let weight = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if weight <= 0.0 {
                continue;
            }
            if best.is_none_or(|(w, _)| weight > w) {
                best = Some((weight, language));
            }
        }
        best.map(|(_, language)| language).unwrap_or(default)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_tag(s)
            .ok_or_else(|| ValidationError::invalid_enum("language", s, &["de", "en"]))
    }
}
