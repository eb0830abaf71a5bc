//! Outbound adapters for the hosted backend services.
//!
//! Each adapter implements one domain port over HTTP: record persistence
//! through the PostgREST-shaped record store, blobs through the storage
//! API, accounts through the auth API, and greetings through a
//! transactional mail API.

pub mod identity;
pub mod mail;
pub mod rest;
pub mod storage;

pub use identity::RestIdentityProvider;
pub use mail::HttpNotificationSender;
pub use rest::{
    RecordApi, RestBirthdayLedger, RestDonationRepository, RestEventRepository,
    RestMemberRepository, RestPhotoRepository, RestRoleRepository, RestRsvpRepository,
};
pub use storage::RestBlobStore;
