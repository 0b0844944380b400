//! Garment Entry Library
//!
//! Batch entry, validation, and reconciliation engine for the garment
//! receiving and retail sales workflows: operators scan fixed-length unit
//! codes (T-codes) into cartons, each code is checked against its source
//! document, duplicates and declared totals are reconciled, and the
//! resulting batch is shaped into per-code records for submission.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod buffer;
pub mod client;
pub mod config;
pub mod dto;
pub mod errors;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod services;

pub use buffer::EntryBuffer;
pub use client::{EntryApi, HttpEntryApi};
pub use errors::{CountKind, EntryError, FieldViolation};
pub use models::{BatchHeader, CodeSource, CodeValue, Container, EntryFlow, EntryMode, UnitCode};
pub use services::EntrySession;
