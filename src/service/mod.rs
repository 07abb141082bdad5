pub mod http;
pub mod types;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub use types::{ApiKey, FileRef, JobStatus, ParseJob, ParseRequest};

/// Remote Document AI service. Implementations hold no per-job state.
pub trait DocumentAi: Send + Sync {
    /// Opens a session for one conversion, on the thread that will run it.
    fn connect(&self, key: &ApiKey) -> Result<Box<dyn DocumentAiSession + '_>>;
}

/// Operations available within one conversion.
pub trait DocumentAiSession {
    /// Uploads a local file and returns the provider file id.
    fn upload(&self, path: &Path) -> Result<String>;
    /// Starts a parse job and returns its id.
    fn submit_parse(&self, req: &ParseRequest) -> Result<String>;
    fn get_parse(&self, job_id: &str) -> Result<ParseJob>;
}

impl<T: DocumentAi + ?Sized> DocumentAi for Arc<T> {
    fn connect(&self, key: &ApiKey) -> Result<Box<dyn DocumentAiSession + '_>> {
        (**self).connect(key)
    }
}

impl<T: DocumentAiSession + ?Sized> DocumentAiSession for &T {
    fn upload(&self, path: &Path) -> Result<String> {
        (**self).upload(path)
    }

    fn submit_parse(&self, req: &ParseRequest) -> Result<String> {
        (**self).submit_parse(req)
    }

    fn get_parse(&self, job_id: &str) -> Result<ParseJob> {
        (**self).get_parse(job_id)
    }
}
