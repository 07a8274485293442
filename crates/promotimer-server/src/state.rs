//! Shared application state.

use std::sync::{Arc, Mutex};

use promotimer_core::CandidateSupplier;

/// Handle to the candidate supplier shared across request handlers.
///
/// Resolution itself is pure; the supplier is the only shared-mutable piece
/// (the impression counter), and its increments are single atomic UPDATEs.
#[derive(Clone)]
pub struct AppState {
    pub supplier: Arc<Mutex<dyn CandidateSupplier + Send>>,
}

impl AppState {
    pub fn new(supplier: impl CandidateSupplier + Send + 'static) -> Self {
        Self {
            supplier: Arc::new(Mutex::new(supplier)),
        }
    }
}
