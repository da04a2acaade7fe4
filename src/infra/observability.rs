//! Operation observers.
//!
//! Operations never log through global state of their own; callers hand each
//! call an [`OperationObserver`] that receives stage milestones, skipped
//! enrichments and the final outcome. [`LogObserver`] forwards to the `log`
//! facade, [`SilentObserver`] drops everything.
//!
//! Observers only ever see sizes, algorithm names and key types. Key
//! material, passwords and payload bytes never reach them.

use crate::domain::types::Operation;
use crate::infra::error::{ServiceError, Stage};

/// Observer trait for encryption and signing operations
pub trait OperationObserver: Send + Sync {
    /// A validation or processing stage completed
    fn stage_completed(&self, operation: Operation, stage: Stage, detail: &str);

    /// A best-effort XAdES enrichment was not applied
    fn enrichment_skipped(&self, enrichment: &str, reason: &str);

    /// Non-fatal condition worth surfacing (e.g. discarded link segments)
    fn warning(&self, operation: Operation, message: &str);

    /// The operation produced its result
    fn succeeded(&self, operation: Operation, algorithm: &str);

    /// The operation failed and the error is about to be returned
    fn failed(&self, operation: Operation, error: &ServiceError);
}

/// Observer writing to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl OperationObserver for LogObserver {
    fn stage_completed(&self, operation: Operation, stage: Stage, detail: &str) {
        log::debug!("{operation}: {stage} ok ({detail})");
    }

    fn enrichment_skipped(&self, enrichment: &str, reason: &str) {
        log::warn!("XAdES enrichment '{enrichment}' skipped: {reason}");
    }

    fn warning(&self, operation: Operation, message: &str) {
        log::warn!("{operation}: {message}");
    }

    fn succeeded(&self, operation: Operation, algorithm: &str) {
        log::info!("{operation} completed using {algorithm}");
    }

    fn failed(&self, operation: Operation, error: &ServiceError) {
        log::warn!(
            "{operation} failed at stage {} [{}]: {error}",
            error.stage(),
            error.category()
        );
    }
}

/// Observer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl OperationObserver for SilentObserver {
    fn stage_completed(&self, _operation: Operation, _stage: Stage, _detail: &str) {}
    fn enrichment_skipped(&self, _enrichment: &str, _reason: &str) {}
    fn warning(&self, _operation: Operation, _message: &str) {}
    fn succeeded(&self, _operation: Operation, _algorithm: &str) {}
    fn failed(&self, _operation: Operation, _error: &ServiceError) {}
}

/// Report `result` to the observer and pass it through unchanged.
pub(crate) fn finish<T>(
    observer: &dyn OperationObserver,
    operation: Operation,
    algorithm: &str,
    result: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match &result {
        Ok(_) => observer.succeeded(operation, algorithm),
        Err(error) => observer.failed(operation, error),
    }
    result
}
