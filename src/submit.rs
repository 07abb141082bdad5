use crate::{
    error::{Result, ToolError},
    locator::Locator,
    poll::Clock,
    service::{DocumentAiSession, FileRef, ParseRequest},
    translate::OptionBundles,
};
use anyhow::Context;
use std::time::Duration;
use tracing::{debug, info};

/// A submitted job, identified by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
    /// Clock reading taken right after submission.
    pub submitted_at: Duration,
    pub input: FileRef,
}

/// Resolves the locator to a file reference, uploading local files first,
/// and starts a parse job.
pub fn submit(
    session: &dyn DocumentAiSession,
    locator: &Locator,
    bundles: &OptionBundles,
    clock: &dyn Clock,
) -> Result<JobHandle> {
    let input = match locator {
        Locator::Url(url) => FileRef::FileUrl(url.clone()),
        Locator::RemoteId(id) => FileRef::FileId(id.clone()),
        Locator::LocalFile(path) => {
            info!("uploading {}", path.display());
            let file_id = session
                .upload(path)
                .with_context(|| format!("upload failed for {}", path.display()))
                .map_err(ToolError::Submission)?;
            debug!("upload {} -> file_id={file_id}", path.display());
            FileRef::FileId(file_id)
        }
    };

    let req = ParseRequest {
        input,
        bundles: bundles.clone(),
    };
    let job_id = session
        .submit_parse(&req)
        .with_context(|| "starting parse job")
        .map_err(ToolError::Submission)?;
    let submitted_at = clock.now();

    info!("parse job started job_id={job_id} input={:?}", req.input);
    Ok(JobHandle {
        job_id,
        submitted_at,
        input: req.input,
    })
}
