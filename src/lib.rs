#![doc(test(attr(deny(warnings))))]

//! Balance Core tracks the value of named accounts across a shared set of
//! dates, persists the grid as CSV, and drives interactive edit and report
//! sessions over it.

pub mod cli;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Balance Core tracing initialized.");
    });
}
