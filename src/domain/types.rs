//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! bounded scores, enumerated classifications) so that once a value reaches
//! the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::{ops::Deref, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Score fell outside of the inclusive 0..=100 range.
    #[error("score must be between {min} and {max}", min = Score::MIN, max = Score::MAX)]
    ScoreOutOfRange,
    /// Currency amount was negative or not a finite number.
    #[error("lead value must be a non-negative amount")]
    InvalidAmount,
    /// Source name is not one of the known lead sources.
    #[error("unknown lead source: {0}")]
    UnknownSource(String),
    /// Status name is not one of the known pipeline stages.
    #[error("unknown lead status: {0}")]
    UnknownStatus(String),
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(LeadId, "Unique identifier for a lead.");

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = value.into().trim().to_string();
                if trimmed.is_empty() {
                    return Err(TypeConstraintError::EmptyString);
                }
                Ok(Self(trimmed))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(
    UserId,
    "Identifier of the user owning a lead, as issued by the auth service."
);

non_empty_string_newtype!(
    PersonName,
    "First or last name of a lead enforcing trimmed, non-empty values."
);

/// Lower-cased, trimmed, non-empty contact email.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LeadEmail(String);

impl LeadEmail {
    /// Normalizes the email and rejects blank input.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = email.into().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for LeadEmail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for LeadEmail {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for LeadEmail {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LeadEmail> for String {
    fn from(value: LeadEmail) -> Self {
        value.0
    }
}

/// Lead score bounded to `0..=100`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 100;

    /// Creates a score ensuring it lies within the inclusive range.
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            // The range check above guarantees the value fits into a `u8`.
            Ok(Self(value as u8))
        } else {
            Err(TypeConstraintError::ScoreOutOfRange)
        }
    }

    pub const fn get(self) -> i32 {
        self.0 as i32
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Score {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Non-negative currency amount attached to a lead.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct LeadValue(f64);

impl LeadValue {
    /// Creates an amount rejecting negative and non-finite values.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidAmount)
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Display for LeadValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel a lead originated from.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    #[default]
    Website,
    FacebookAds,
    GoogleAds,
    Referral,
    Events,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 6] = [
        LeadSource::Website,
        LeadSource::FacebookAds,
        LeadSource::GoogleAds,
        LeadSource::Referral,
        LeadSource::Events,
        LeadSource::Other,
    ];

    /// Storage and form name of the source.
    pub const fn as_str(self) -> &'static str {
        match self {
            LeadSource::Website => "website",
            LeadSource::FacebookAds => "facebook_ads",
            LeadSource::GoogleAds => "google_ads",
            LeadSource::Referral => "referral",
            LeadSource::Events => "events",
            LeadSource::Other => "other",
        }
    }

    /// Human readable label shown in badges and selects.
    pub const fn label(self) -> &'static str {
        match self {
            LeadSource::Website => "Website",
            LeadSource::FacebookAds => "Facebook Ads",
            LeadSource::GoogleAds => "Google Ads",
            LeadSource::Referral => "Referral",
            LeadSource::Events => "Events",
            LeadSource::Other => "Other",
        }
    }
}

impl Display for LeadSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadSource {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s.trim())
            .ok_or_else(|| TypeConstraintError::UnknownSource(s.to_string()))
    }
}

/// Pipeline stage of a lead.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
    Won,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Lost,
        LeadStatus::Won,
    ];

    /// Storage and form name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Lost => "lost",
            LeadStatus::Won => "won",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Lost => "Lost",
            LeadStatus::Won => "Won",
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| TypeConstraintError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_accepts_inclusive_bounds() {
        assert_eq!(Score::new(0).unwrap().get(), 0);
        assert_eq!(Score::new(100).unwrap().get(), 100);
        assert_eq!(Score::new(-1), Err(TypeConstraintError::ScoreOutOfRange));
        assert_eq!(Score::new(101), Err(TypeConstraintError::ScoreOutOfRange));
    }

    #[test]
    fn lead_value_rejects_negative_and_nan() {
        assert!(LeadValue::new(0.0).is_ok());
        assert!(LeadValue::new(1250.5).is_ok());
        assert_eq!(LeadValue::new(-0.01), Err(TypeConstraintError::InvalidAmount));
        assert_eq!(LeadValue::new(f64::NAN), Err(TypeConstraintError::InvalidAmount));
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = LeadEmail::new("  Jane.Doe@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "jane.doe@example.com");
        assert_eq!(LeadEmail::new("   "), Err(TypeConstraintError::EmptyString));
    }

    #[test]
    fn enumerations_parse_their_storage_names() {
        for source in LeadSource::ALL {
            assert_eq!(source.as_str().parse::<LeadSource>().unwrap(), source);
        }
        for status in LeadStatus::ALL {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), status);
        }
        assert!(matches!(
            "tiktok".parse::<LeadSource>(),
            Err(TypeConstraintError::UnknownSource(_))
        ));
        assert!(matches!(
            "archived".parse::<LeadStatus>(),
            Err(TypeConstraintError::UnknownStatus(_))
        ));
    }

    #[test]
    fn lead_id_must_be_positive() {
        assert!(LeadId::new(1).is_ok());
        assert_eq!(LeadId::new(0), Err(TypeConstraintError::NonPositiveId));
    }
}
