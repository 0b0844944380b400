//! In-memory batch entry buffer.
//!
//! Holds the authoritative container/code state for one create or edit
//! session. Codes accumulate monotonically until explicitly removed;
//! there is no expiry. All network-guarded mutations (container and code
//! deletions in edit mode) live in [`crate::services::entry`], which only
//! calls the `_local` operations here after the guard has succeeded.

use crate::errors::EntryError;
use crate::models::{BatchHeader, Container, UnitCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryBuffer {
    containers: Vec<Container>,
}

impl EntryBuffer {
    /// A fresh buffer starts with one empty container, matching the entry
    /// screens which always render box 1.
    pub fn new() -> Self {
        Self {
            containers: vec![Container::new(1)],
        }
    }

    /// Rebuilds a buffer from already-grouped containers (edit-mode
    /// hydration). Ordinals are renumbered to stay contiguous from 1.
    pub(crate) fn from_containers(mut containers: Vec<Container>) -> Self {
        if containers.is_empty() {
            containers.push(Container::new(1));
        }
        let mut buffer = Self { containers };
        buffer.renumber();
        buffer
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn container(&self, index: usize) -> Result<&Container, EntryError> {
        self.containers
            .get(index)
            .ok_or_else(|| EntryError::not_found(format!("no container at index {index}")))
    }

    /// Sum of code-list lengths across all containers.
    pub fn total_codes(&self) -> usize {
        self.containers.iter().map(Container::piece_count).sum()
    }

    /// Appends a new empty container at the next ordinal position.
    ///
    /// When `caps` carries the batch header (receive flow, create mode)
    /// the declared container target must not be reached yet and the
    /// declared piece target must not already be met (a new box would
    /// have nothing left to hold). With `caps: None` the count is
    /// unrestricted.
    pub fn add_container(&mut self, caps: Option<&BatchHeader>) -> Result<u32, EntryError> {
        if let Some(header) = caps {
            if self.containers.len() as u32 >= header.declared_container_count {
                return Err(EntryError::capacity(format!(
                    "declared container count of {} already reached",
                    header.declared_container_count
                )));
            }
            if self.total_codes() as u32 >= header.declared_piece_count {
                return Err(EntryError::capacity(format!(
                    "declared piece count of {} already reached",
                    header.declared_piece_count
                )));
            }
        }
        let ordinal = self.containers.len() as u32 + 1;
        self.containers.push(Container::new(ordinal));
        Ok(ordinal)
    }

    /// Drops the container at `index` and renumbers the remainder to stay
    /// contiguous from 1. At least one container must remain.
    pub(crate) fn remove_container_local(
        &mut self,
        index: usize,
    ) -> Result<Container, EntryError> {
        if index >= self.containers.len() {
            return Err(EntryError::not_found(format!(
                "no container at index {index}"
            )));
        }
        if self.containers.len() == 1 {
            return Err(EntryError::capacity(
                "at least one container is required".to_string(),
            ));
        }
        let removed = self.containers.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Removes one code occurrence by position. Positional removal keeps
    /// duplicate values intact except for the targeted occurrence.
    pub(crate) fn remove_code_local(
        &mut self,
        container_index: usize,
        code_index: usize,
    ) -> Result<UnitCode, EntryError> {
        let container = self
            .containers
            .get_mut(container_index)
            .ok_or_else(|| EntryError::not_found(format!("no container at index {container_index}")))?;
        if code_index >= container.codes.len() {
            return Err(EntryError::not_found(format!(
                "container {} has no code at index {code_index}",
                container.ordinal
            )));
        }
        Ok(container.codes.remove(code_index))
    }

    pub(crate) fn push_code(
        &mut self,
        container_index: usize,
        code: UnitCode,
    ) -> Result<(), EntryError> {
        let container = self
            .containers
            .get_mut(container_index)
            .ok_or_else(|| EntryError::not_found(format!("no container at index {container_index}")))?;
        container.codes.push(code);
        Ok(())
    }

    pub(crate) fn set_loading(&mut self, container_index: usize, loading: bool) {
        if let Some(container) = self.containers.get_mut(container_index) {
            container.loading = loading;
        }
    }

    fn renumber(&mut self) {
        for (i, container) in self.containers.iter_mut().enumerate() {
            container.ordinal = i as u32 + 1;
        }
    }
}

impl Default for EntryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
