use crate::{
    config::{Config, Output},
    error::{Result, ToolError},
    locator::Locator,
    options::ParsingConfiguration,
    poll::{poll, Clock, PollSettings},
    postprocess::{clean_text, extract_payload},
    report::RunReport,
    service::{ApiKey, DocumentAi},
    submit::submit,
    translate::translate,
    util::now_rfc3339,
};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub api_key_env: String,
    pub poll_interval: Duration,
    pub output: Output,
}

impl PipelineSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            api_key_env: cfg.service.api_key_env.clone(),
            poll_interval: Duration::from_secs(cfg.service.poll_interval_seconds),
            output: cfg.output.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// One blocking upload, submit and poll sequence per call. Holds no job state.
pub struct Pipeline<S: DocumentAi, C: Clock> {
    service: S,
    clock: C,
    credential: Option<ApiKey>,
    settings: PipelineSettings,
}

pub struct JobOutput {
    pub markdown: String,
    pub report: RunReport,
}

impl<S: DocumentAi, C: Clock> Pipeline<S, C> {
    pub fn new(
        service: S,
        clock: C,
        credential: Option<ApiKey>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            service,
            clock,
            credential,
            settings,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn run_job(&self, locator: &str, options: &ParsingConfiguration) -> Result<JobOutput> {
        let key = self
            .credential
            .as_ref()
            .ok_or_else(|| ToolError::MissingCredential {
                var: self.settings.api_key_env.clone(),
            })?;

        options.validate().map_err(ToolError::InvalidConfiguration)?;
        let bundles = translate(options).map_err(ToolError::InvalidConfiguration)?;
        let fingerprint = bundles.fingerprint();
        debug!(bundles = %bundles.to_json(), %fingerprint, "translated options");

        let locator = Locator::classify(locator);
        info!("converting {} ({})", locator, locator.kind());

        let started = now_rfc3339();
        let session = self.service.connect(key).map_err(ToolError::Submission)?;
        let handle = submit(session.as_ref(), &locator, &bundles, &self.clock)?;
        let outcome = poll(
            session.as_ref(),
            &self.clock,
            &handle,
            &PollSettings {
                interval: self.settings.poll_interval,
                timeout_seconds: options.timeout_seconds,
            },
        )?;

        let payload = extract_payload(&outcome.job.record);
        let markdown = clean_text(&self.settings.output, &payload.text);
        debug!(
            "job {} payload source={:?} structured={} bytes={}",
            handle.job_id,
            payload.source,
            payload.structured,
            markdown.len()
        );

        let report = RunReport {
            job_id: handle.job_id,
            locator_kind: locator.kind().to_string(),
            input: handle.input,
            status: outcome.job.status.to_string(),
            polls: outcome.polls,
            elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            payload_source: payload.source,
            payload_bytes: markdown.len(),
            options_fingerprint: fingerprint,
            started,
            finished: now_rfc3339(),
        };

        Ok(JobOutput { markdown, report })
    }
}
