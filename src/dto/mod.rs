//! Wire shapes exchanged with the backend collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body-level success marker used by the backend; distinct from the HTTP
/// status (a 200 with a non-zero code still means rejection).
pub const SUCCESS_CODE: &str = "0";

/// Response body of the code eligibility lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl LookupResponse {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Generic create/update response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            msg: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// One record per accepted code. The backend expects the container
/// identity as its ordinal position rendered as a string; `record_id` is
/// the prior persisted identifier in edit mode (absent means insert).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub code: String,
    pub container_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
}

/// Assembled submission payload: header fields plus one [`CodeRecord`]
/// per code across all containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPayload {
    pub reference_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order_no: Option<String>,
    pub document_date: NaiveDate,
    pub container_count: u32,
    pub piece_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub records: Vec<CodeRecord>,
}

/// A persisted batch as returned by the backend, used to hydrate an
/// edit-mode session.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistedBatch {
    pub id: Uuid,
    pub reference_no: String,
    #[serde(default)]
    pub work_order_no: Option<String>,
    pub document_date: NaiveDate,
    #[serde(default)]
    pub remarks: Option<String>,
    pub records: Vec<PersistedRecord>,
}

/// One persisted code record inside a [`PersistedBatch`].
#[derive(Debug, Clone, Deserialize)]
pub struct PersistedRecord {
    pub id: Uuid,
    pub code: String,
    pub container_no: String,
}
