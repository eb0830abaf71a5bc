//! Deterministic in-memory port implementations for integration tests.
//!
//! Unlike the per-port fixtures, these actually remember what is written
//! to them, so whole-stack scenarios can observe the behaviour the real
//! adapters would produce. State lives behind mutexes; each instance is
//! independent.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Datelike;
use uuid::Uuid;

use crate::domain::donations::{Donation, DonationId};
use crate::domain::events::{Event, EventId, Rsvp};
use crate::domain::member::{Member, MemberId, ProfileUpdate};
use crate::domain::photos::{Photo, PhotoId};
use crate::domain::ports::{
    BirthdayLedger, BirthdayLedgerError, BlobStore, BlobStoreError, DonationRepository,
    DonationRepositoryError, EventRepository, EventRepositoryError, IdentityProvider,
    IdentityProviderError, MemberRepository, MemberRepositoryError, NotificationSender,
    NotificationSenderError, PhotoRepository, PhotoRepositoryError, RoleRepository,
    RoleRepositoryError, RsvpRepository, RsvpRepositoryError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-memory member repository.
#[derive(Debug, Default)]
pub struct InMemoryMemberRepository {
    rows: Mutex<HashMap<Uuid, Member>>,
}

impl InMemoryMemberRepository {
    /// Seed a profile directly, bypassing the port contract.
    pub fn seed(&self, member: Member) {
        lock(&self.rows).insert(*member.id.as_uuid(), member);
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn insert(&self, member: &Member) -> Result<(), MemberRepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.contains_key(member.id.as_uuid()) {
            return Err(MemberRepositoryError::DuplicateId);
        }
        rows.insert(*member.id.as_uuid(), member.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &MemberId,
    ) -> Result<Option<Member>, MemberRepositoryError> {
        Ok(lock(&self.rows).get(id.as_uuid()).cloned())
    }

    async fn list_ordered(&self) -> Result<Vec<Member>, MemberRepositoryError> {
        let mut members: Vec<Member> = lock(&self.rows).values().cloned().collect();
        members.sort_by(|a, b| {
            b.batch_year
                .as_ref()
                .cmp(a.batch_year.as_ref())
                .then_with(|| a.full_name.as_ref().cmp(b.full_name.as_ref()))
        });
        Ok(members)
    }

    async fn update_profile(
        &self,
        id: &MemberId,
        update: &ProfileUpdate,
    ) -> Result<(), MemberRepositoryError> {
        let mut rows = lock(&self.rows);
        if let Some(member) = rows.get_mut(id.as_uuid()) {
            if let Some(location) = &update.location {
                member.location = Some(location.clone());
            }
            if let Some(occupation) = &update.occupation {
                member.occupation = Some(occupation.clone());
            }
            if let Some(avatar_url) = &update.avatar_url {
                member.avatar_url = Some(avatar_url.clone());
            }
            if let Some(bio) = &update.bio {
                member.bio = Some(bio.clone());
            }
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, MemberRepositoryError> {
        Ok(lock(&self.rows).len() as u64)
    }

    async fn list_with_birthday_on(
        &self,
        month: u32,
        day: u32,
    ) -> Result<Vec<Member>, MemberRepositoryError> {
        Ok(lock(&self.rows)
            .values()
            .filter(|member| {
                let date = member.date_of_birth.date();
                date.month() == month && date.day() == day
            })
            .cloned()
            .collect())
    }
}

/// In-memory role repository.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    grants: Mutex<HashSet<(Uuid, String)>>,
}

impl InMemoryRoleRepository {
    /// Grant the admin role directly.
    pub fn grant_admin(&self, member: &MemberId) {
        lock(&self.grants).insert((*member.as_uuid(), "admin".to_owned()));
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn is_admin(&self, member: &MemberId) -> Result<bool, RoleRepositoryError> {
        Ok(lock(&self.grants).contains(&(*member.as_uuid(), "admin".to_owned())))
    }

    async fn grant_member_role(&self, member: &MemberId) -> Result<(), RoleRepositoryError> {
        lock(&self.grants).insert((*member.as_uuid(), "member".to_owned()));
        Ok(())
    }
}

/// In-memory event repository.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    rows: Mutex<Vec<Event>>,
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        lock(&self.rows).push(event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError> {
        Ok(lock(&self.rows).iter().find(|event| event.id == id).cloned())
    }

    async fn list_by_start_time(&self) -> Result<Vec<Event>, EventRepositoryError> {
        let mut events = lock(&self.rows).clone();
        events.sort_by_key(|event| event.starts_at);
        Ok(events)
    }
}

/// In-memory RSVP repository enforcing the (event, member) unique key.
#[derive(Debug, Default)]
pub struct InMemoryRsvpRepository {
    rows: Mutex<Vec<Rsvp>>,
}

#[async_trait]
impl RsvpRepository for InMemoryRsvpRepository {
    async fn find(
        &self,
        event: EventId,
        member: &MemberId,
    ) -> Result<Option<Rsvp>, RsvpRepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|rsvp| rsvp.event_id == event && &rsvp.member_id == member)
            .cloned())
    }

    async fn insert(&self, rsvp: &Rsvp) -> Result<(), RsvpRepositoryError> {
        let mut rows = lock(&self.rows);
        if rows
            .iter()
            .any(|row| row.event_id == rsvp.event_id && row.member_id == rsvp.member_id)
        {
            return Err(RsvpRepositoryError::DuplicateKey);
        }
        rows.push(rsvp.clone());
        Ok(())
    }

    async fn delete(
        &self,
        event: EventId,
        member: &MemberId,
    ) -> Result<(), RsvpRepositoryError> {
        lock(&self.rows)
            .retain(|rsvp| !(rsvp.event_id == event && &rsvp.member_id == member));
        Ok(())
    }

    async fn list_for_member(
        &self,
        member: &MemberId,
    ) -> Result<Vec<Rsvp>, RsvpRepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|rsvp| &rsvp.member_id == member)
            .cloned()
            .collect())
    }
}

/// In-memory donation repository.
#[derive(Debug, Default)]
pub struct InMemoryDonationRepository {
    rows: Mutex<HashMap<Uuid, Donation>>,
}

#[async_trait]
impl DonationRepository for InMemoryDonationRepository {
    async fn insert(&self, donation: &Donation) -> Result<(), DonationRepositoryError> {
        lock(&self.rows).insert(donation.id.0, donation.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(lock(&self.rows).get(&id.0).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<Donation>, DonationRepositoryError> {
        let mut pending: Vec<Donation> = lock(&self.rows)
            .values()
            .filter(|donation| !donation.verified)
            .cloned()
            .collect();
        pending.sort_by_key(|donation| std::cmp::Reverse(donation.created_at));
        Ok(pending)
    }

    async fn list_verified(&self) -> Result<Vec<Donation>, DonationRepositoryError> {
        let mut verified: Vec<Donation> = lock(&self.rows)
            .values()
            .filter(|donation| donation.verified)
            .cloned()
            .collect();
        verified.sort_by_key(|donation| std::cmp::Reverse(donation.created_at));
        Ok(verified)
    }

    async fn mark_verified(&self, id: DonationId) -> Result<(), DonationRepositoryError> {
        let mut rows = lock(&self.rows);
        let donation = rows
            .get_mut(&id.0)
            .ok_or(DonationRepositoryError::NotFound)?;
        donation.verified = true;
        Ok(())
    }

    async fn delete(&self, id: DonationId) -> Result<(), DonationRepositoryError> {
        lock(&self.rows).remove(&id.0);
        Ok(())
    }
}

/// In-memory photo repository.
#[derive(Debug, Default)]
pub struct InMemoryPhotoRepository {
    rows: Mutex<HashMap<Uuid, Photo>>,
}

#[async_trait]
impl PhotoRepository for InMemoryPhotoRepository {
    async fn insert(&self, photo: &Photo) -> Result<(), PhotoRepositoryError> {
        lock(&self.rows).insert(photo.id.0, photo.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PhotoId) -> Result<Option<Photo>, PhotoRepositoryError> {
        Ok(lock(&self.rows).get(&id.0).cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<Photo>, PhotoRepositoryError> {
        let mut photos: Vec<Photo> = lock(&self.rows).values().cloned().collect();
        photos.sort_by_key(|photo| std::cmp::Reverse(photo.uploaded_at));
        Ok(photos)
    }

    async fn count_for_member(
        &self,
        member: &MemberId,
    ) -> Result<u64, PhotoRepositoryError> {
        Ok(lock(&self.rows)
            .values()
            .filter(|photo| &photo.owner_id == member)
            .count() as u64)
    }

    async fn delete(&self, id: PhotoId) -> Result<(), PhotoRepositoryError> {
        lock(&self.rows).remove(&id.0);
        Ok(())
    }
}

/// In-memory birthday ledger enforcing the (member, year) unique key.
#[derive(Debug, Default)]
pub struct InMemoryBirthdayLedger {
    entries: Mutex<HashSet<(Uuid, i32)>>,
}

#[async_trait]
impl BirthdayLedger for InMemoryBirthdayLedger {
    async fn was_notified(
        &self,
        member: &MemberId,
        year: i32,
    ) -> Result<bool, BirthdayLedgerError> {
        Ok(lock(&self.entries).contains(&(*member.as_uuid(), year)))
    }

    async fn record_notified(
        &self,
        member: &MemberId,
        year: i32,
    ) -> Result<(), BirthdayLedgerError> {
        if !lock(&self.entries).insert((*member.as_uuid(), year)) {
            return Err(BirthdayLedgerError::AlreadyRecorded);
        }
        Ok(())
    }
}

/// In-memory blob store that remembers stored objects.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, usize>>,
}

impl InMemoryBlobStore {
    /// Number of objects currently stored.
    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }

    /// Whether an object exists under the given bucket and key.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        lock(&self.objects).contains_key(&format!("{bucket}/{key}"))
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobStoreError> {
        lock(&self.objects).insert(format!("{bucket}/{key}"), bytes.len());
        Ok(format!("https://blobs.test/{bucket}/{key}"))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), BlobStoreError> {
        lock(&self.objects).remove(&format!("{bucket}/{key}"));
        Ok(())
    }
}

/// In-memory identity provider with real email and password semantics.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, (Uuid, String)>>,
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityProviderError> {
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(email) {
            return Err(IdentityProviderError::EmailTaken);
        }
        if password.len() < 8 {
            return Err(IdentityProviderError::weak_password(
                "password must be at least 8 characters",
            ));
        }
        let subject = Uuid::new_v4();
        accounts.insert(email.to_owned(), (subject, password.to_owned()));
        Ok(subject)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityProviderError> {
        match lock(&self.accounts).get(email) {
            Some((subject, stored)) if stored == password => Ok(*subject),
            _ => Err(IdentityProviderError::InvalidCredentials),
        }
    }

    async fn email_for(
        &self,
        subject: Uuid,
    ) -> Result<Option<String>, IdentityProviderError> {
        Ok(lock(&self.accounts)
            .iter()
            .find(|(_, (id, _))| *id == subject)
            .map(|(email, _)| email.clone()))
    }
}

/// Notification sender that records every greeting instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotificationSender {
    sent: Mutex<Vec<(String, Uuid)>>,
}

impl RecordingNotificationSender {
    /// The (address, member) pairs greeted so far.
    pub fn sent(&self) -> Vec<(String, Uuid)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send_birthday_greeting(
        &self,
        to: &str,
        member: &Member,
    ) -> Result<(), NotificationSenderError> {
        lock(&self.sent).push((to.to_owned(), *member.id.as_uuid()));
        Ok(())
    }
}

/// A bundle of shared in-memory ports wired the way the server wires the
/// real adapters.
#[derive(Default)]
pub struct InMemoryPorts {
    pub members: Arc<InMemoryMemberRepository>,
    pub roles: Arc<InMemoryRoleRepository>,
    pub events: Arc<InMemoryEventRepository>,
    pub rsvps: Arc<InMemoryRsvpRepository>,
    pub donations: Arc<InMemoryDonationRepository>,
    pub photos: Arc<InMemoryPhotoRepository>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub ledger: Arc<InMemoryBirthdayLedger>,
    pub sender: Arc<RecordingNotificationSender>,
}
