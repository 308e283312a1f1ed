use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;

/// Locale
///
/// The two languages every piece of catalog content is authored in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "locale", rename_all = "lowercase")]
#[ts(export)]
pub enum Locale {
    #[default]
    En,
    Tr,
}

impl Locale {
    /// Picks the variant for this locale, falling back to English when the
    /// Turkish text was left empty.
    pub fn pick<'a>(self, en: &'a str, tr: &'a str) -> &'a str {
        match self {
            Locale::Tr if !tr.trim().is_empty() => tr,
            _ => en,
        }
    }

    /// Same as [`Locale::pick`] for optional fields.
    pub fn pick_opt(self, en: Option<&str>, tr: Option<&str>) -> Option<String> {
        match (self, tr) {
            (Locale::Tr, Some(tr)) if !tr.trim().is_empty() => Some(tr.to_string()),
            _ => en.map(str::to_string),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "tr" => Ok(Locale::Tr),
            other => Err(format!("Unsupported locale: {other}")),
        }
    }
}
