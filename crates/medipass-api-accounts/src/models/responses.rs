//! Response payloads.

use medipass_provisioning::{AccountRow, RelinkReport};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome envelope for provisioning-style operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionAccountResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl ProvisionAccountResponse {
    #[must_use]
    pub fn new(message: impl Into<String>, user_id: Option<Uuid>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user_id,
        }
    }
}

/// Generic acknowledgement for operations with no payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

impl AckResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// One row of `GET /accounts`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountRowResponse {
    pub user_id: Uuid,
    pub role: String,
    pub account_number: String,
    pub display_name: String,
}

impl From<AccountRow> for AccountRowResponse {
    fn from(row: AccountRow) -> Self {
        Self {
            user_id: *row.identity_id.as_uuid(),
            role: row.role.to_string(),
            account_number: row.account_number,
            display_name: row.display_name,
        }
    }
}

/// Outcome of a relink sweep.
#[derive(Debug, Serialize, ToSchema)]
pub struct RelinkResponse {
    pub examined: usize,
    pub linked_direct: usize,
    pub linked_suffix: usize,
    pub linked_name: usize,
    pub unmatched: usize,
}

impl From<RelinkReport> for RelinkResponse {
    fn from(report: RelinkReport) -> Self {
        Self {
            examined: report.examined,
            linked_direct: report.linked_direct,
            linked_suffix: report.linked_suffix,
            linked_name: report.linked_name,
            unmatched: report.unmatched,
        }
    }
}
