//! Entry session orchestration.
//!
//! One `EntrySession` owns the buffer for the duration of one create or
//! edit form. It runs the code validation pipeline, the guarded deletions
//! of edit mode, and the submission gate; every failure comes back as a
//! typed [`EntryError`] for the UI to surface as a notification.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::buffer::EntryBuffer;
use crate::client::EntryApi;
use crate::dto::{ApiResponse, BatchPayload, CodeRecord, PersistedBatch};
use crate::errors::{collect_violations, EntryError, FieldViolation};
use crate::models::{
    BatchHeader, CodeSource, CodeValue, Container, EntryFlow, EntryMode, UnitCode,
};
use crate::reconcile;

const GENERIC_ELIGIBILITY_MSG: &str = "code does not belong to the source document";
const GENERIC_SUBMISSION_MSG: &str = "the server rejected the submission";

/// One active entry form: header, buffer, flow/mode variant, and the
/// backend collaborator.
pub struct EntrySession<A: EntryApi> {
    api: Arc<A>,
    flow: EntryFlow,
    mode: EntryMode,
    header: BatchHeader,
    buffer: EntryBuffer,
}

impl<A: EntryApi> EntrySession<A> {
    /// Starts a create-mode session with an empty buffer (one container).
    pub fn new(api: Arc<A>, flow: EntryFlow, header: BatchHeader) -> Self {
        Self {
            api,
            flow,
            mode: EntryMode::Create,
            header,
            buffer: EntryBuffer::new(),
        }
    }

    /// Starts an edit-mode session from a persisted batch.
    ///
    /// Records are grouped by their stored container ordinal and the
    /// declared totals are recomputed read-only from the live state, as
    /// the edit screens do.
    pub fn hydrate(
        api: Arc<A>,
        flow: EntryFlow,
        batch: PersistedBatch,
    ) -> Result<Self, EntryError> {
        let mut grouped: BTreeMap<u32, Container> = BTreeMap::new();
        for record in &batch.records {
            let ordinal: u32 = record.container_no.parse().map_err(|_| {
                EntryError::Validation(vec![FieldViolation::new(
                    "container_no",
                    format!("container number {:?} is not numeric", record.container_no),
                )])
            })?;
            let value = CodeValue::parse(&record.code)?;
            grouped
                .entry(ordinal)
                .or_insert_with(|| Container::new(ordinal))
                .codes
                .push(UnitCode::persisted(value, record.id));
        }

        let buffer = EntryBuffer::from_containers(grouped.into_values().collect());
        let header = BatchHeader {
            reference_no: batch.reference_no,
            work_order_no: batch.work_order_no,
            document_date: Some(batch.document_date),
            declared_container_count: buffer.len() as u32,
            declared_piece_count: buffer.total_codes() as u32,
            remarks: batch.remarks,
        };

        Ok(Self {
            api,
            flow,
            mode: EntryMode::Edit { batch_id: batch.id },
            header,
            buffer,
        })
    }

    pub fn flow(&self) -> EntryFlow {
        self.flow
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn header(&self) -> &BatchHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut BatchHeader {
        &mut self.header
    }

    pub fn containers(&self) -> &[Container] {
        self.buffer.containers()
    }

    pub fn total_pieces(&self) -> usize {
        self.buffer.total_codes()
    }

    /// Duplicate warning data for the whole batch.
    pub fn duplicates(&self) -> BTreeMap<CodeValue, usize> {
        reconcile::global_duplicates(self.buffer.containers())
    }

    /// Appends a new empty container.
    ///
    /// The receive flow caps the container count at the declared target
    /// while creating; sales is uncapped, and in edit mode the declared
    /// totals follow live state so no cap applies either.
    pub fn add_container(&mut self) -> Result<u32, EntryError> {
        let caps = (self.flow == EntryFlow::Receive && self.mode == EntryMode::Create)
            .then_some(&self.header);
        self.buffer.add_container(caps)
    }

    /// Validates one candidate code and, on success, appends it to the
    /// container at `container_index`.
    ///
    /// The pipeline is: local format gate, local capacity gate, then the
    /// remote eligibility lookup. The container's loading flag is display
    /// state for the UI's Add control: it is set for the duration of the
    /// lookup and cleared on every exit path, while the exclusive borrow
    /// of the session is what actually serializes adds. A flag left set
    /// by an abandoned in-flight call never blocks the next add.
    /// Duplicates are accepted; the reconciler surfaces them as warnings.
    #[instrument(skip(self, raw), fields(container = container_index))]
    pub async fn add_code(
        &mut self,
        container_index: usize,
        raw: &str,
    ) -> Result<CodeValue, EntryError> {
        let code = CodeValue::parse(raw)?;

        // In edit mode the declared piece count tracks live state, so the
        // target gate only binds while creating.
        if self.mode == EntryMode::Create
            && self.buffer.total_codes() as u32 >= self.header.declared_piece_count
        {
            return Err(EntryError::capacity(format!(
                "declared piece count of {} already reached",
                self.header.declared_piece_count
            )));
        }

        let ordinal = self.buffer.container(container_index)?.ordinal;
        let source = self.lookup_source()?;

        self.buffer.set_loading(container_index, true);
        let result = self.api.lookup_code(&source, &code).await;
        self.buffer.set_loading(container_index, false);

        let response = result?;
        if !response.is_success() {
            let msg = response
                .msg
                .unwrap_or_else(|| GENERIC_ELIGIBILITY_MSG.to_string());
            warn!(%code, container = ordinal, %msg, "code rejected");
            return Err(EntryError::eligibility(msg));
        }

        info!(%code, container = ordinal, "code accepted");
        self.buffer
            .push_code(container_index, UnitCode::new(code.clone()))?;
        Ok(code)
    }

    /// Removes the container at `container_index`.
    ///
    /// If any of its codes were already persisted, the server-side
    /// container deletion must succeed first; on failure local state is
    /// left untouched so the operator can retry. The minimum of one
    /// container is checked before any network call so a successful
    /// remote deletion is never followed by a failing local removal.
    #[instrument(skip(self))]
    pub async fn remove_container(&mut self, container_index: usize) -> Result<(), EntryError> {
        if self.buffer.len() == 1 {
            return Err(EntryError::capacity(
                "at least one container is required".to_string(),
            ));
        }
        let container = self.buffer.container(container_index)?;
        if container.has_persisted_codes() {
            let ordinal = container.ordinal;
            let batch_ref = self.batch_ref()?;
            self.api.delete_container(&batch_ref, ordinal).await?;
            info!(container = ordinal, "persisted container deleted");
        }
        self.buffer.remove_container_local(container_index)?;
        Ok(())
    }

    /// Removes one code occurrence by position.
    ///
    /// Persisted codes require a successful per-record deletion call
    /// first; purely local codes are removed with no network traffic.
    #[instrument(skip(self))]
    pub async fn remove_code(
        &mut self,
        container_index: usize,
        code_index: usize,
    ) -> Result<UnitCode, EntryError> {
        let record_id = {
            let container = self.buffer.container(container_index)?;
            container
                .codes
                .get(code_index)
                .ok_or_else(|| {
                    EntryError::not_found(format!(
                        "container {} has no code at index {code_index}",
                        container.ordinal
                    ))
                })?
                .record_id
        };
        if let Some(id) = record_id {
            self.api.delete_code(id).await?;
            info!(record_id = %id, "persisted code deleted");
        }
        self.buffer.remove_code_local(container_index, code_index)
    }

    /// Runs the submission gates and, when both pass, assembles the
    /// payload and executes the create or update call.
    ///
    /// Gate 1 is the header schema check (all violations collected);
    /// gate 2 is the declared-vs-actual count match. Neither gate issues
    /// any network call. On failure of the write the buffer is preserved
    /// so the operator can retry without re-entering anything.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<ApiResponse, EntryError> {
        if let EntryMode::Edit { .. } = self.mode {
            // Edit screens show the declared totals read-only, recomputed
            // from live state.
            self.header.declared_container_count = self.buffer.len() as u32;
            self.header.declared_piece_count = self.buffer.total_codes() as u32;
        }

        self.validate_header()?;
        reconcile::check_declared_totals(&self.header, self.buffer.containers())?;

        let payload = self.assemble_payload()?;
        let response = match self.mode {
            EntryMode::Create => self.api.create_batch(&payload).await?,
            EntryMode::Edit { batch_id } => self.api.update_batch(batch_id, &payload).await?,
        };

        if !response.is_success() {
            let msg = response
                .msg
                .clone()
                .unwrap_or_else(|| GENERIC_SUBMISSION_MSG.to_string());
            warn!(%msg, "submission rejected");
            return Err(EntryError::submission(msg));
        }

        info!(
            containers = self.buffer.len(),
            pieces = self.buffer.total_codes(),
            "batch submitted"
        );
        Ok(response)
    }

    /// One record per code across all containers, tagged with the
    /// container ordinal as a string; `record_id` rides along for edit
    /// mode so the backend can tell updates from inserts.
    fn assemble_payload(&self) -> Result<BatchPayload, EntryError> {
        let document_date = self.header.document_date.ok_or_else(|| {
            EntryError::Validation(vec![FieldViolation::new(
                "document_date",
                "document date is required",
            )])
        })?;

        let records = self
            .buffer
            .containers()
            .iter()
            .flat_map(|container| {
                container.codes.iter().map(move |code| CodeRecord {
                    code: code.value.as_str().to_string(),
                    container_no: container.ordinal.to_string(),
                    record_id: code.record_id,
                })
            })
            .collect();

        Ok(BatchPayload {
            reference_no: self.header.reference_no.clone(),
            work_order_no: self.header.work_order_no.clone(),
            document_date,
            container_count: self.header.declared_container_count,
            piece_count: self.header.declared_piece_count,
            remarks: self.header.remarks.clone(),
            records,
        })
    }

    fn validate_header(&self) -> Result<(), EntryError> {
        let mut violations = match self.header.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => collect_violations(&errors),
        };
        if self.flow == EntryFlow::Receive
            && self
                .header
                .work_order_no
                .as_deref()
                .map_or(true, |wo| wo.trim().is_empty())
        {
            violations.push(FieldViolation::new(
                "work_order_no",
                "work order number is required when receiving",
            ));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(EntryError::Validation(violations))
        }
    }

    fn lookup_source(&self) -> Result<CodeSource, EntryError> {
        match self.flow {
            EntryFlow::Receive => {
                let wo = self
                    .header
                    .work_order_no
                    .as_deref()
                    .map(str::trim)
                    .filter(|wo| !wo.is_empty())
                    .ok_or_else(|| {
                        EntryError::Validation(vec![FieldViolation::new(
                            "work_order_no",
                            "work order number is required when receiving",
                        )])
                    })?;
                Ok(CodeSource::WorkOrder(wo.to_string()))
            }
            EntryFlow::Sales => Ok(CodeSource::ReceivedStock),
        }
    }

    fn batch_ref(&self) -> Result<String, EntryError> {
        match self.mode {
            EntryMode::Edit { batch_id } => Ok(batch_id.to_string()),
            EntryMode::Create => Err(EntryError::deletion(
                "no persisted batch to delete from".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::dto::LookupResponse;

    struct StubApi;

    #[async_trait]
    impl EntryApi for StubApi {
        async fn lookup_code(
            &self,
            _source: &CodeSource,
            _code: &CodeValue,
        ) -> Result<LookupResponse, EntryError> {
            Ok(LookupResponse {
                code: "0".into(),
                msg: None,
            })
        }

        async fn create_batch(&self, _payload: &BatchPayload) -> Result<ApiResponse, EntryError> {
            Ok(ApiResponse::ok())
        }

        async fn update_batch(
            &self,
            _batch_id: Uuid,
            _payload: &BatchPayload,
        ) -> Result<ApiResponse, EntryError> {
            Ok(ApiResponse::ok())
        }

        async fn delete_container(&self, _batch_ref: &str, _ordinal: u32) -> Result<(), EntryError> {
            Ok(())
        }

        async fn delete_code(&self, _record_id: Uuid) -> Result<(), EntryError> {
            Ok(())
        }
    }

    fn session() -> EntrySession<StubApi> {
        let header = BatchHeader {
            reference_no: "WR-1".into(),
            work_order_no: Some("WO-1".into()),
            document_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            declared_container_count: 1,
            declared_piece_count: 5,
            remarks: None,
        };
        EntrySession::new(Arc::new(StubApi), EntryFlow::Receive, header)
    }

    #[tokio::test]
    async fn stale_loading_flag_does_not_block_the_next_add() {
        let mut session = session();
        // simulate a lookup whose continuation was abandoned mid-flight
        session.buffer.set_loading(0, true);

        session.add_code(0, "ABC123").await.unwrap();
        assert_eq!(session.total_pieces(), 1);
        assert!(!session.containers()[0].loading);
    }
}
