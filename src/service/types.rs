use crate::translate::OptionBundles;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty or whitespace-only value.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Document reference carried by a parse request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRef {
    FileId(String),
    FileUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseRequest {
    pub input: FileRef,
    pub bundles: OptionBundles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Successful,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "successful" | "success" => JobStatus::Successful,
            "failed" | "failure" => JobStatus::Failed,
            _ => JobStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => f.write_str("PENDING"),
            JobStatus::Processing => f.write_str("PROCESSING"),
            JobStatus::Successful => f.write_str("SUCCESSFUL"),
            JobStatus::Failed => f.write_str("FAILED"),
            JobStatus::Other(s) => f.write_str(s),
        }
    }
}

/// One status observation of a remote parse job.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseJob {
    pub job_id: String,
    pub status: JobStatus,
    /// Full job record as returned by the service.
    pub record: serde_json::Value,
}
