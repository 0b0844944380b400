use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::code::CodeValue;

/// Which entry workflow a session runs.
///
/// Receiving validates codes against a work order and caps the container
/// count at the declared target; sales validates against received stock
/// and leaves the container count uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryFlow {
    Receive,
    Sales,
}

/// Create vs. edit variant of a session. Edit carries the persisted batch
/// id used for updates and guarded deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Create,
    Edit { batch_id: Uuid },
}

/// Source document a candidate code is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    /// Receiving: the code must belong to this work order.
    WorkOrder(String),
    /// Sales: the code must exist in received stock.
    ReceivedStock,
}

/// One accepted unit code. `record_id` is filled for codes hydrated from
/// a persisted batch and stays `None` for codes added in this session,
/// which is how the backend tells updates from inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCode {
    pub value: CodeValue,
    pub record_id: Option<Uuid>,
}

impl UnitCode {
    pub fn new(value: CodeValue) -> Self {
        Self {
            value,
            record_id: None,
        }
    }

    pub fn persisted(value: CodeValue, record_id: Uuid) -> Self {
        Self {
            value,
            record_id: Some(record_id),
        }
    }
}

/// One physical carton (receiving) or logical grouping (sales) within a
/// batch. Ordinals are 1-based and kept contiguous by the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub ordinal: u32,
    pub codes: Vec<UnitCode>,
    /// True while an eligibility lookup for this container is in flight;
    /// the UI disables the container's Add control off this flag.
    #[serde(skip)]
    pub loading: bool,
}

impl Container {
    pub fn new(ordinal: u32) -> Self {
        Self {
            ordinal,
            codes: Vec::new(),
            loading: false,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.codes.len()
    }

    pub fn has_persisted_codes(&self) -> bool {
        self.codes.iter().any(|c| c.record_id.is_some())
    }
}

/// Operator-entered batch metadata plus the two declared totals that gate
/// submission. In the edit flow the declared totals are recomputed from
/// live container state rather than being independently editable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchHeader {
    #[validate(length(min = 1, message = "reference number is required"))]
    pub reference_no: String,

    /// Work order being received against; required in the receive flow,
    /// unused in sales.
    pub work_order_no: Option<String>,

    #[validate(required(message = "document date is required"))]
    pub document_date: Option<NaiveDate>,

    #[validate(range(min = 1, message = "declared container count must be at least 1"))]
    pub declared_container_count: u32,

    #[validate(range(min = 1, message = "declared piece count must be at least 1"))]
    pub declared_piece_count: u32,

    pub remarks: Option<String>,
}
