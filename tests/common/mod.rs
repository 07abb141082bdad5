#![allow(dead_code)]

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tensorlake_tool::{
    pipeline::PipelineSettings,
    poll::Clock,
    service::{ApiKey, DocumentAi, DocumentAiSession, JobStatus, ParseJob, ParseRequest},
    ToolAdapter,
};

pub const JOB_ID: &str = "parse_abc123";
pub const FILE_ID: &str = "file_xyz789";

/// Records every call; replays a scripted list of job records. The last
/// record repeats once the script is exhausted.
pub struct MockService {
    records: Mutex<VecDeque<Value>>,
    pub uploads: Mutex<Vec<PathBuf>>,
    pub submissions: Mutex<Vec<ParseRequest>>,
    pub status_queries: Mutex<u32>,
    pub connects: Mutex<u32>,
    pub fail_upload: Option<String>,
    pub fail_submit: Option<String>,
}

impl MockService {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records: Mutex::new(records.into()),
            uploads: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            status_queries: Mutex::new(0),
            connects: Mutex::new(0),
            fail_upload: None,
            fail_submit: None,
        }
    }

    pub fn with_statuses(statuses: &[&str]) -> Self {
        Self::new(statuses.iter().map(|s| status(s)).collect())
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn submit_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn query_count(&self) -> u32 {
        *self.status_queries.lock().unwrap()
    }

    pub fn connect_count(&self) -> u32 {
        *self.connects.lock().unwrap()
    }

    pub fn total_calls(&self) -> usize {
        self.connect_count() as usize
            + self.upload_count()
            + self.submit_count()
            + self.query_count() as usize
    }

    pub fn last_submission(&self) -> ParseRequest {
        self.submissions
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no submission recorded")
    }
}

impl DocumentAi for MockService {
    fn connect(&self, _key: &ApiKey) -> Result<Box<dyn DocumentAiSession + '_>> {
        *self.connects.lock().unwrap() += 1;
        Ok(Box::new(self))
    }
}

impl DocumentAiSession for MockService {
    fn upload(&self, path: &Path) -> Result<String> {
        self.uploads.lock().unwrap().push(path.to_path_buf());
        match &self.fail_upload {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(FILE_ID.to_string()),
        }
    }

    fn submit_parse(&self, req: &ParseRequest) -> Result<String> {
        self.submissions.lock().unwrap().push(req.clone());
        match &self.fail_submit {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(JOB_ID.to_string()),
        }
    }

    fn get_parse(&self, job_id: &str) -> Result<ParseJob> {
        *self.status_queries.lock().unwrap() += 1;
        let mut records = self.records.lock().unwrap();
        let record = if records.len() > 1 {
            records.pop_front()
        } else {
            records.front().cloned()
        }
        .ok_or_else(|| anyhow!("no scripted record"))?;
        let status = record["status"].as_str().unwrap_or_default().to_string();
        Ok(ParseJob {
            job_id: job_id.to_string(),
            status: JobStatus::parse(&status),
            record,
        })
    }
}

/// Simulated time; `sleep` advances the clock instantly.
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    pub sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, d: Duration) {
        self.sleeps.lock().unwrap().push(d);
        *self.now.lock().unwrap() += d;
    }
}

pub fn status(s: &str) -> Value {
    json!({ "parse_id": JOB_ID, "status": s })
}

pub fn key() -> ApiKey {
    ApiKey::new("tl_test_key").unwrap()
}

pub type MockAdapter = ToolAdapter<Arc<MockService>, Arc<ManualClock>>;

pub fn adapter(service: &Arc<MockService>, clock: &Arc<ManualClock>) -> MockAdapter {
    ToolAdapter::new(
        Arc::clone(service),
        Arc::clone(clock),
        Some(key()),
        PipelineSettings::default(),
    )
}
