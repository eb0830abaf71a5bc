//! Shared builders for the integration suites.

use alumni_backend::domain::{BatchYear, DateOfBirth, FullName, Member, MemberId};
use chrono::NaiveDate;
use tokio::runtime::Runtime;

/// Build a member profile with the given name and batch.
pub fn profile(name: &str, batch: &str, date_of_birth: NaiveDate) -> Member {
    Member {
        id: MemberId::random(),
        full_name: FullName::new(name).expect("valid name"),
        batch_year: BatchYear::new(batch).expect("valid batch"),
        location: None,
        occupation: None,
        avatar_url: None,
        bio: None,
        date_of_birth: DateOfBirth::from_stored(date_of_birth),
    }
}

/// Build a single-threaded runtime for driving async services from
/// synchronous step functions.
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

/// A fixed, valid date of birth for members whose birthday is irrelevant.
pub fn any_birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(1992, 6, 15).expect("valid date")
}
