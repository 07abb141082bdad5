//! Failure kinds of a document conversion. Each renders to the text an agent
//! sees as the tool observation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    /// Checked before any network call.
    #[error("Error: {var} environment variable is not set")]
    MissingCredential { var: String },

    #[error("Error: invalid parsing configuration: {0:#}")]
    InvalidConfiguration(anyhow::Error),

    /// Upload or job start failed.
    #[error("Error processing document: {0:#}")]
    Submission(anyhow::Error),

    /// A status query failed while polling.
    #[error("Error processing document: {0:#}")]
    Service(anyhow::Error),

    #[error("Document parsing failed with status: {status}")]
    RemoteTerminalFailure { status: String },

    #[error("Document processing timeout after {timeout_seconds} seconds. Job ID: {job_id}")]
    Timeout { job_id: String, timeout_seconds: u64 },

    /// The blocking worker behind the async entry point did not complete.
    #[error("Error processing document: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;
