//! The member directory.
//!
//! The repository returns profiles ordered by batch year (descending)
//! then full name; batch and search filters are applied in memory over
//! that ordered listing, matching case-insensitively against name,
//! location, and occupation.

use std::sync::Arc;

use crate::domain::member::{Member, MemberId, ProfileUpdate};
use crate::domain::ports::{MemberRepository, MemberRepositoryError};
use crate::domain::Error;

/// Optional narrowing of the directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
    /// Exact batch year label to keep.
    pub batch_year: Option<String>,
    /// Case-insensitive term matched against name, location, occupation.
    pub search: Option<String>,
}

/// Directory listing and profile maintenance service.
#[derive(Clone)]
pub struct DirectoryService {
    members: Arc<dyn MemberRepository>,
}

fn map_member_error(error: MemberRepositoryError) -> Error {
    match error {
        MemberRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("member store unavailable: {message}"))
        }
        MemberRepositoryError::Query { message } => {
            Error::internal(format!("member store error: {message}"))
        }
        MemberRepositoryError::DuplicateId => {
            Error::conflict("member profile already exists")
        }
        MemberRepositoryError::InvalidRow { message } => {
            Error::internal(format!("member row failed validation: {message}"))
        }
    }
}

fn matches_search(member: &Member, needle: &str) -> bool {
    let haystacks = [
        Some(member.full_name.as_ref()),
        member.location.as_deref(),
        member.occupation.as_deref(),
    ];
    haystacks
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(needle))
}

impl DirectoryService {
    /// Create the service over the member store.
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    /// List profiles in directory order, narrowed by the filter.
    pub async fn list(&self, filter: &DirectoryFilter) -> Result<Vec<Member>, Error> {
        let mut members = self.members.list_ordered().await.map_err(map_member_error)?;

        if let Some(batch) = filter
            .batch_year
            .as_deref()
            .map(str::trim)
            .filter(|batch| !batch.is_empty())
        {
            members.retain(|member| member.batch_year.as_ref() == batch);
        }
        if let Some(needle) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        {
            let needle = needle.to_lowercase();
            members.retain(|member| matches_search(member, &needle));
        }
        Ok(members)
    }

    /// Fetch one profile.
    pub async fn get(&self, id: &MemberId) -> Result<Member, Error> {
        self.members
            .find_by_id(id)
            .await
            .map_err(map_member_error)?
            .ok_or_else(|| Error::not_found(format!("member {id} not found")))
    }

    /// Apply a partial update to a profile. Only the owner may edit it.
    pub async fn update_profile(
        &self,
        caller: &MemberId,
        target: &MemberId,
        update: ProfileUpdate,
    ) -> Result<Member, Error> {
        if caller != target {
            return Err(Error::forbidden("members may only edit their own profile"));
        }
        self.get(target).await?;
        self.members
            .update_profile(target, &update)
            .await
            .map_err(map_member_error)?;
        self.get(target).await
    }

    /// Total number of member profiles.
    pub async fn member_count(&self) -> Result<u64, Error> {
        self.members.count().await.map_err(map_member_error)
    }
}
