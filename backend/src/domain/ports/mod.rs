//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod birthday_ledger;
mod blob_store;
mod donation_repository;
mod event_repository;
mod identity_provider;
mod member_repository;
mod notification_sender;
mod photo_repository;
mod role_repository;
mod rsvp_repository;

#[cfg(test)]
pub use birthday_ledger::MockBirthdayLedger;
pub use birthday_ledger::{BirthdayLedger, BirthdayLedgerError, FixtureBirthdayLedger};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, FixtureBlobStore};
#[cfg(test)]
pub use donation_repository::MockDonationRepository;
pub use donation_repository::{
    DonationRepository, DonationRepositoryError, FixtureDonationRepository,
};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError, FixtureEventRepository};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use member_repository::MockMemberRepository;
pub use member_repository::{FixtureMemberRepository, MemberRepository, MemberRepositoryError};
#[cfg(test)]
pub use notification_sender::MockNotificationSender;
pub use notification_sender::{
    FixtureNotificationSender, NotificationSender, NotificationSenderError,
};
#[cfg(test)]
pub use photo_repository::MockPhotoRepository;
pub use photo_repository::{FixturePhotoRepository, PhotoRepository, PhotoRepositoryError};
#[cfg(test)]
pub use role_repository::MockRoleRepository;
pub use role_repository::{FixtureRoleRepository, RoleRepository, RoleRepositoryError};
#[cfg(test)]
pub use rsvp_repository::MockRsvpRepository;
pub use rsvp_repository::{FixtureRsvpRepository, RsvpRepository, RsvpRepositoryError};
