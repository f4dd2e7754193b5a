//! Extraction orchestration and its diagnostic log.

pub mod diagnostics;
pub mod orchestrator;

pub use diagnostics::{DiagnosticLog, DiagnosticSink, TracingSink};
pub use orchestrator::{
    classify_failure, AttemptOutcome, Extraction, ExtractionSettings, ExtractionSource,
    Orchestrator,
};
