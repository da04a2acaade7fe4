//! Observer that records every callback for assertions.

use std::sync::Mutex;

use ksef_signer::{Operation, OperationObserver, ServiceError, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Stage(Operation, Stage),
    Skipped(String, String),
    Warning(Operation, String),
    Succeeded(Operation, String),
    Failed(Operation, String),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Stage(_, stage) => Some(stage),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Warning(_, message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Failed(_, category) => Some(category),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl OperationObserver for RecordingObserver {
    fn stage_completed(&self, operation: Operation, stage: Stage, _detail: &str) {
        self.push(Event::Stage(operation, stage));
    }

    fn enrichment_skipped(&self, enrichment: &str, reason: &str) {
        self.push(Event::Skipped(enrichment.to_string(), reason.to_string()));
    }

    fn warning(&self, operation: Operation, message: &str) {
        self.push(Event::Warning(operation, message.to_string()));
    }

    fn succeeded(&self, operation: Operation, algorithm: &str) {
        self.push(Event::Succeeded(operation, algorithm.to_string()));
    }

    fn failed(&self, operation: Operation, error: &ServiceError) {
        self.push(Event::Failed(operation, error.category().to_string()));
    }
}
