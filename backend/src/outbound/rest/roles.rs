//! Record-store adapter for member roles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordApi, RecordApiError};
use crate::domain::member::MemberId;
use crate::domain::ports::{RoleRepository, RoleRepositoryError};

const TABLE: &str = "member_roles";
const ADMIN_ROLE: &str = "admin";
const MEMBER_ROLE: &str = "member";

/// Row shape of the `member_roles` table.
#[derive(Debug, Serialize, Deserialize)]
struct RoleRow {
    member_id: Uuid,
    role: String,
}

/// Role repository backed by the hosted record store.
#[derive(Debug, Clone)]
pub struct RestRoleRepository {
    api: RecordApi,
}

impl RestRoleRepository {
    pub fn new(api: RecordApi) -> Self {
        Self { api }
    }
}

fn map_api_error(error: RecordApiError) -> RoleRepositoryError {
    match error {
        RecordApiError::Transport { message } => RoleRepositoryError::connection(message),
        RecordApiError::Status { status, message } => {
            RoleRepositoryError::query(format!("status {status}: {message}"))
        }
        RecordApiError::Duplicate => {
            RoleRepositoryError::query("unexpected unique key conflict")
        }
        RecordApiError::Decode { message } => RoleRepositoryError::query(message),
    }
}

#[async_trait]
impl RoleRepository for RestRoleRepository {
    async fn is_admin(&self, member: &MemberId) -> Result<bool, RoleRepositoryError> {
        let rows: Vec<RoleRow> = self
            .api
            .select(
                TABLE,
                &[
                    ("member_id", format!("eq.{}", member.as_uuid())),
                    ("role", format!("eq.{ADMIN_ROLE}")),
                ],
            )
            .await
            .map_err(map_api_error)?;
        Ok(!rows.is_empty())
    }

    async fn grant_member_role(&self, member: &MemberId) -> Result<(), RoleRepositoryError> {
        let row = RoleRow {
            member_id: *member.as_uuid(),
            role: MEMBER_ROLE.to_owned(),
        };
        match self.api.insert(TABLE, &row).await {
            // The pair is already granted; the port promises idempotence.
            Err(RecordApiError::Duplicate) | Ok(()) => Ok(()),
            Err(error) => Err(map_api_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_map_to_connection_errors() {
        let mapped = map_api_error(RecordApiError::Transport {
            message: "dns failure".to_owned(),
        });
        assert!(matches!(mapped, RoleRepositoryError::Connection { .. }));
    }

    #[test]
    fn status_failures_map_to_query_errors() {
        let mapped = map_api_error(RecordApiError::Status {
            status: 500,
            message: "boom".to_owned(),
        });
        assert!(matches!(mapped, RoleRepositoryError::Query { .. }));
    }
}
