//! Common test utilities and helpers.
//!
//! Shared by the integration tests:
//! - PDF and DOCX fixture builders
//! - Assertions that inspect outputs independently of the library

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

use std::sync::{Mutex, MutexGuard};

/// MuPDF is not safe to drive from several test threads at once.
static MUPDF_LOCK: Mutex<()> = Mutex::new(());

/// Serializes MuPDF use; hold the guard for the whole test.
pub fn mupdf_guard() -> MutexGuard<'static, ()> {
    MUPDF_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
