use crate::{postprocess::PayloadSource, service::FileRef};
use serde::Serialize;

/// Summary of one successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub job_id: String,
    pub locator_kind: String,
    pub input: FileRef,
    pub status: String,
    pub polls: u32,
    pub elapsed_ms: u64,
    pub payload_source: PayloadSource,
    pub payload_bytes: usize,
    pub options_fingerprint: String,
    pub started: String,
    pub finished: String,
}

