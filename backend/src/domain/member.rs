//! Member profile model.
//!
//! One profile row exists per identity id. Profiles are created at
//! registration, mutated only by the owning member, and never hard-deleted.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the member value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyId,
    InvalidId,
    EmptyFullName,
    FullNameTooLong { max: usize },
    EmptyBatchYear,
    BatchYearTooLong { max: usize },
    ImplausibleDateOfBirth,
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "member id must not be empty"),
            Self::InvalidId => write!(f, "member id must be a valid UUID"),
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::FullNameTooLong { max } => {
                write!(f, "full name must be at most {max} characters")
            }
            Self::EmptyBatchYear => write!(f, "batch year must not be empty"),
            Self::BatchYearTooLong { max } => {
                write!(f, "batch year must be at most {max} characters")
            }
            Self::ImplausibleDateOfBirth => {
                write!(f, "date of birth must correspond to an age between 10 and 120")
            }
        }
    }
}

impl std::error::Error for MemberValidationError {}

/// Stable member identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(Uuid, String);

impl MemberId {
    /// Validate and construct a [`MemberId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`MemberId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, MemberValidationError> {
        if id.is_empty() {
            return Err(MemberValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(MemberValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| MemberValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for MemberId {
    fn from(value: Uuid) -> Self {
        Self(value, value.to_string())
    }
}

impl AsRef<str> for MemberId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<MemberId> for String {
    fn from(value: MemberId) -> Self {
        let MemberId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for MemberId {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for a full name.
pub const FULL_NAME_MAX: usize = 120;

/// Member's display name as shown in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a [`FullName`].
    pub fn new(name: impl Into<String>) -> Result<Self, MemberValidationError> {
        let name: String = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(MemberValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(MemberValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a batch year label.
pub const BATCH_YEAR_MAX: usize = 16;

/// Graduation batch label.
///
/// Batch years are opaque string labels ("1998", "2004-B"); ordering is
/// lexicographic, not numeric.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchYear(String);

impl BatchYear {
    /// Validate and construct a [`BatchYear`].
    pub fn new(label: impl Into<String>) -> Result<Self, MemberValidationError> {
        let label: String = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(MemberValidationError::EmptyBatchYear);
        }
        if trimmed.chars().count() > BATCH_YEAR_MAX {
            return Err(MemberValidationError::BatchYearTooLong {
                max: BATCH_YEAR_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for BatchYear {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BatchYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<BatchYear> for String {
    fn from(value: BatchYear) -> Self {
        value.0
    }
}

impl TryFrom<String> for BatchYear {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Youngest plausible registrant age in whole years.
pub const MIN_AGE_YEARS: i32 = 10;
/// Oldest plausible registrant age in whole years.
pub const MAX_AGE_YEARS: i32 = 120;

/// Date of birth with a plausibility check applied at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DateOfBirth(NaiveDate);

impl DateOfBirth {
    /// Validate a date of birth against the registration date.
    ///
    /// Rejects dates implying an age outside 10..=120 years.
    pub fn new(date: NaiveDate, today: NaiveDate) -> Result<Self, MemberValidationError> {
        let age = today.year() - date.year();
        if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&age) {
            return Err(MemberValidationError::ImplausibleDateOfBirth);
        }
        Ok(Self(date))
    }

    /// Wrap an already-persisted date without re-validating.
    ///
    /// Used when parsing rows that passed the registration check; the
    /// plausibility rule is anchored to the registration date, not to reads.
    pub fn from_stored(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whether the birthday falls on the given calendar day.
    ///
    /// Matches on month and day; a Feb 29 birth date only matches in leap
    /// years, mirroring the record store's month/day equality.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        self.0.month() == date.month() && self.0.day() == date.day()
    }
}

/// Alumni profile row.
///
/// ## Invariants
/// - Exactly one profile exists per identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: MemberId,
    #[schema(value_type = String, example = "Ada Lovelace")]
    pub full_name: FullName,
    #[schema(value_type = String, example = "2004")]
    pub batch_year: BatchYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[schema(value_type = String, format = Date, example = "1995-03-14")]
    pub date_of_birth: DateOfBirth,
}

/// Profile attributes collected at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDraft {
    pub full_name: FullName,
    pub batch_year: BatchYear,
    pub date_of_birth: DateOfBirth,
}

/// Owner-editable profile fields.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    #[case("", MemberValidationError::EmptyId)]
    #[case("not-a-uuid", MemberValidationError::InvalidId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", MemberValidationError::InvalidId)]
    fn member_id_rejects_invalid_input(
        #[case] raw: &str,
        #[case] expected: MemberValidationError,
    ) {
        assert_eq!(MemberId::new(raw), Err(expected));
    }

    #[rstest]
    fn member_id_round_trips() {
        let id = MemberId::random();
        let raw = id.to_string();
        let parsed = MemberId::new(&raw).expect("round trip");
        assert_eq!(parsed, id);
    }

    #[rstest]
    fn full_name_is_trimmed() {
        let name = FullName::new("  Ada Lovelace  ").expect("valid name");
        assert_eq!(name.as_ref(), "Ada Lovelace");
    }

    #[rstest]
    fn full_name_rejects_whitespace_only() {
        assert_eq!(
            FullName::new("   "),
            Err(MemberValidationError::EmptyFullName)
        );
    }

    #[rstest]
    fn batch_year_rejects_oversized_labels() {
        let label = "x".repeat(BATCH_YEAR_MAX + 1);
        assert_eq!(
            BatchYear::new(label),
            Err(MemberValidationError::BatchYearTooLong {
                max: BATCH_YEAR_MAX
            })
        );
    }

    #[rstest]
    #[case(date(2020, 1, 1), date(2025, 6, 1))]
    #[case(date(1890, 1, 1), date(2025, 6, 1))]
    fn date_of_birth_rejects_implausible_ages(
        #[case] dob: NaiveDate,
        #[case] today: NaiveDate,
    ) {
        assert_eq!(
            DateOfBirth::new(dob, today),
            Err(MemberValidationError::ImplausibleDateOfBirth)
        );
    }

    #[rstest]
    fn date_of_birth_accepts_plausible_ages() {
        let dob = DateOfBirth::new(date(1995, 3, 14), date(2025, 6, 1)).expect("plausible");
        assert_eq!(dob.date(), date(1995, 3, 14));
    }

    #[rstest]
    #[case(date(2025, 3, 14), true)]
    #[case(date(2026, 3, 14), true)]
    #[case(date(2025, 3, 15), false)]
    #[case(date(2025, 4, 14), false)]
    fn birthday_match_is_month_and_day(#[case] today: NaiveDate, #[case] expected: bool) {
        let dob = DateOfBirth::from_stored(date(1995, 3, 14));
        assert_eq!(dob.falls_on(today), expected);
    }

    #[rstest]
    fn leap_day_birthday_only_matches_in_leap_years() {
        let dob = DateOfBirth::from_stored(date(1996, 2, 29));
        assert!(dob.falls_on(date(2024, 2, 29)));
        assert!(!dob.falls_on(date(2025, 2, 28)));
    }
}
