use super::{types::*, DocumentAi, DocumentAiSession};
use crate::config::ServiceConfig;
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Tensorlake Document AI over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpDocumentAi {
    cfg: ServiceConfig,
}

#[derive(Debug, Deserialize)]
struct UploadOut {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct SubmitOut {
    parse_id: String,
}

impl HttpDocumentAi {
    pub fn new(cfg: &ServiceConfig) -> Self {
        Self { cfg: cfg.clone() }
    }
}

impl DocumentAi for HttpDocumentAi {
    fn connect(&self, key: &ApiKey) -> Result<Box<dyn DocumentAiSession + '_>> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.cfg.request_timeout_seconds))
            .user_agent(concat!("tensorlake-tool/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "building HTTP client")?;
        Ok(Box::new(HttpSession {
            client,
            key: key.clone(),
            base_url: self.cfg.base_url.trim_end_matches('/'),
        }))
    }
}

/// One blocking client shared by every request of a conversion, created and
/// dropped on the thread running it.
struct HttpSession<'a> {
    client: Client,
    key: ApiKey,
    base_url: &'a str,
}

impl HttpSession<'_> {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn send_json<O: for<'de> Deserialize<'de>>(
        &self,
        what: &str,
        req: RequestBuilder,
    ) -> Result<O> {
        let resp = req
            .bearer_auth(self.key.expose())
            .send()
            .with_context(|| format!("{what}: request failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .with_context(|| format!("{what}: reading response body"))?;
        debug!("{what} -> {status} ({} bytes)", body.len());

        if !status.is_success() {
            return Err(anyhow!("{what} failed with HTTP {status}: {}", body.trim()));
        }

        serde_json::from_str(&body).with_context(|| format!("{what}: parsing JSON response"))
    }
}

impl DocumentAiSession for HttpSession<'_> {
    fn upload(&self, path: &Path) -> Result<String> {
        let form = multipart::Form::new()
            .file("file", path)
            .with_context(|| format!("opening upload: {}", path.display()))?;
        let req = self.client.put(self.url("files")).multipart(form);
        let out: UploadOut = self.send_json("upload", req)?;
        Ok(out.file_id)
    }

    fn submit_parse(&self, req: &ParseRequest) -> Result<String> {
        let body = request_body(req)?;
        let http = self.client.post(self.url("parse")).json(&body);
        let out: SubmitOut = self.send_json("submit parse", http)?;
        Ok(out.parse_id)
    }

    fn get_parse(&self, job_id: &str) -> Result<ParseJob> {
        let req = self.client.get(self.url(&format!("parse/{job_id}")));
        let record: Value = self.send_json("get parse", req)?;
        let status = record
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("parse record for {job_id} has no status field"))?;
        Ok(ParseJob {
            job_id: record
                .get("parse_id")
                .and_then(Value::as_str)
                .unwrap_or(job_id)
                .to_string(),
            status: JobStatus::parse(status),
            record,
        })
    }
}

/// JSON body of `POST /parse`. The page range is a top-level field on the
/// wire, so it is lifted out of the parsing options.
pub fn request_body(req: &ParseRequest) -> Result<Value> {
    let mut body = Map::new();
    match &req.input {
        FileRef::FileId(id) => body.insert("file_id".into(), json!(id)),
        FileRef::FileUrl(url) => body.insert("file_url".into(), json!(url)),
    };

    let mut parsing = serde_json::to_value(&req.bundles.parsing)?;
    if let Some(obj) = parsing.as_object_mut() {
        if let Some(range) = obj.remove("page_range") {
            body.insert("page_range".into(), range);
        }
    }
    body.insert("parsing_options".into(), parsing);
    body.insert(
        "enrichment_options".into(),
        serde_json::to_value(&req.bundles.enrichment)?,
    );

    if let Some(extraction) = &req.bundles.extraction {
        let mut opts = serde_json::to_value(extraction)?;
        if let Some(schema) = opts.get_mut("json_schema") {
            // Mapping schemas travel as objects; free-form text stays a string.
            if let Some(parsed) = schema
                .as_str()
                .and_then(|s| serde_json::from_str::<Value>(s).ok())
                .filter(Value::is_object)
            {
                *schema = parsed;
            }
        }
        body.insert("structured_extraction_options".into(), json!([opts]));
    }

    Ok(Value::Object(body))
}
