//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities and the services that
//! operate on them, kept free of transport concerns. Each type documents
//! its invariants and serialisation contract (serde) in its Rustdoc.
//! External dependencies are reached only through the traits in
//! [`ports`].

pub mod auth;
pub mod birthday;
pub mod capabilities;
pub mod directory;
pub mod donations;
pub mod error;
pub mod events;
pub mod member;
pub mod photos;
pub mod ports;

pub use self::auth::{AuthService, AuthenticatedMember, SignUpRequest};
pub use self::birthday::{BirthdaySweep, SweepDetail, SweepOutcome, SweepSummary};
pub use self::capabilities::{Capabilities, CapabilityResolver};
pub use self::directory::{DirectoryFilter, DirectoryService};
pub use self::donations::{
    Amount, Donation, DonationDraft, DonationId, DonationService, DonationValidationError,
    DonorWallEntry, ProofImage,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::events::{
    Event, EventDraft, EventId, EventService, Rsvp, RsvpOutcome, RsvpStatus,
};
pub use self::member::{
    BatchYear, DateOfBirth, FullName, Member, MemberDraft, MemberId, MemberValidationError,
    ProfileUpdate,
};
pub use self::photos::{Photo, PhotoId, PhotoService, PhotoUpload};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use alumni_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
