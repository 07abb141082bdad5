//! Agent-facing tool: a document locator plus parsing options in, a string out.
//!
//! Both entry points always return text. Failures are rendered as messages
//! because agent frameworks feed tool output back to the model as an
//! observation.

use crate::{
    config::Config,
    error::{Result, ToolError},
    options::{
        ChunkingStrategy, FormDetectionMode, ModelProvider, ParsingConfiguration, TableOutputMode,
        TableParsingStrategy,
    },
    pipeline::{JobOutput, Pipeline, PipelineSettings},
    poll::{Clock, SystemClock},
    service::{http::HttpDocumentAi, ApiKey, DocumentAi},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

pub const TOOL_NAME: &str = "DocumentToMarkdownConverter";
pub const TOOL_DESCRIPTION: &str = "Convert documents (PDF, DOCX, images, etc.) to markdown using Tensorlake AI. Supports tables, figures, signatures, and structured extraction.";
pub const TOOL_ERROR_HINT: &str =
    "Document parsing failed. Please verify the file path and your Tensorlake API key.";

/// What an agent framework needs to register the tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Arguments of a tool call as emitted by a model.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolCall {
    #[serde(alias = "locator")]
    pub path: String,
    #[serde(default)]
    pub options: ParsingConfiguration,
}

pub struct ToolAdapter<S: DocumentAi, C: Clock> {
    inner: Arc<Pipeline<S, C>>,
}

impl<S: DocumentAi, C: Clock> Clone for ToolAdapter<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ToolAdapter<HttpDocumentAi, SystemClock> {
    /// HTTP-backed adapter. The API key is read from the environment here,
    /// once; later changes to the variable are not observed.
    pub fn from_config(cfg: &Config) -> Self {
        let credential = ApiKey::from_env(&cfg.service.api_key_env);
        if credential.is_none() {
            warn!("{} is not set; conversions will fail", cfg.service.api_key_env);
        }
        Self::new(
            HttpDocumentAi::new(&cfg.service),
            SystemClock::new(),
            credential,
            PipelineSettings::from_config(cfg),
        )
    }
}

impl<S: DocumentAi + 'static, C: Clock + 'static> ToolAdapter<S, C> {
    pub fn new(
        service: S,
        clock: C,
        credential: Option<ApiKey>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Pipeline::new(service, clock, credential, settings)),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.inner.has_credential()
    }

    /// Typed variant of [`Self::convert_document_to_markdown`].
    pub fn run(&self, locator: &str, options: &ParsingConfiguration) -> Result<JobOutput> {
        self.inner.run_job(locator, options)
    }

    /// Runs the blocking sequence on a tokio blocking worker.
    pub async fn run_async(
        &self,
        locator: &str,
        options: &ParsingConfiguration,
    ) -> Result<JobOutput> {
        let this = self.clone();
        let locator = locator.to_string();
        let options = options.clone();
        tokio::task::spawn_blocking(move || this.run(&locator, &options))
            .await
            .map_err(|e| ToolError::Worker(format!("conversion worker failed: {e}")))?
    }

    pub fn convert_document_to_markdown(
        &self,
        locator: &str,
        options: &ParsingConfiguration,
    ) -> String {
        render(self.run(locator, options))
    }

    pub async fn convert_document_to_markdown_async(
        &self,
        locator: &str,
        options: &ParsingConfiguration,
    ) -> String {
        render(self.run_async(locator, options).await)
    }

    pub fn invoke_json(&self, args: &Value) -> String {
        match parse_call(args) {
            Ok(call) => self.convert_document_to_markdown(&call.path, &call.options),
            Err(msg) => msg,
        }
    }

    pub async fn invoke_json_async(&self, args: &Value) -> String {
        match parse_call(args) {
            Ok(call) => {
                self.convert_document_to_markdown_async(&call.path, &call.options)
                    .await
            }
            Err(msg) => msg,
        }
    }
}

fn render(res: Result<JobOutput>) -> String {
    match res {
        Ok(out) => out.markdown,
        Err(err) => {
            warn!("conversion failed: {err}");
            err.to_string()
        }
    }
}

fn parse_call(args: &Value) -> std::result::Result<ToolCall, String> {
    serde_json::from_value::<ToolCall>(args.clone())
        .map_err(|e| format!("{TOOL_ERROR_HINT} Invalid arguments: {e}"))
}

fn names<T: std::fmt::Display>(all: &[T]) -> Vec<String> {
    all.iter().map(|v| v.to_string()).collect()
}

pub fn descriptor() -> ToolDescriptor {
    let d = ParsingConfiguration::default();
    let options = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "chunking_strategy": {
                "type": "string",
                "enum": names(ChunkingStrategy::ALL),
                "default": d.chunking_strategy.to_string(),
                "description": "Strategy for chunking the document (NONE, PAGE, or SECTION_HEADER)"
            },
            "table_parsing_strategy": {
                "type": "string",
                "enum": names(TableParsingStrategy::ALL),
                "default": d.table_parsing_strategy.to_string(),
                "description": "Algorithm for parsing tables (TSR for structured tables, VLM for complex/unstructured tables)"
            },
            "table_output_mode": {
                "type": "string",
                "enum": names(TableOutputMode::ALL),
                "default": d.table_output_mode.to_string(),
                "description": "Format for table output (JSON, MARKDOWN, or HTML)"
            },
            "table_summarization_prompt": {
                "type": "string",
                "description": "Custom prompt to guide table summarization"
            },
            "table_summarization": {
                "type": "boolean",
                "default": false,
                "description": "Whether to generate summaries of tables"
            },
            "figure_summarization": {
                "type": "boolean",
                "default": false,
                "description": "Whether to generate summaries of figures and images"
            },
            "figure_summarization_prompt": {
                "type": "string",
                "description": "Custom prompt for figure summarization"
            },
            "page_range": {
                "type": "string",
                "description": "Specific page range to parse (e.g., '1-5' or '1,3,5')"
            },
            "skew_correction": {
                "type": "boolean",
                "default": false,
                "description": "Whether to apply skew correction to scanned documents"
            },
            "disable_layout_detection": {
                "type": "boolean",
                "default": false,
                "description": "Whether to disable automatic layout detection"
            },
            "signature_detection": {
                "type": "boolean",
                "default": false,
                "description": "Whether to detect the presence of signatures in the document"
            },
            "remove_strikethrough_lines": {
                "type": "boolean",
                "default": false,
                "description": "Whether to remove strikethrough text from the document"
            },
            "form_detection_mode": {
                "type": "string",
                "enum": names(FormDetectionMode::ALL),
                "default": d.form_detection_mode.to_string()
            },
            "extraction_schema": {
                "type": ["object", "string"],
                "description": "JSON Schema for structured extraction"
            },
            "extraction_schema_name": {
                "type": "string",
                "default": d.extraction_schema_name
            },
            "extraction_prompt": {
                "type": "string",
                "description": "Guidance for structured extraction"
            },
            "extraction_model_provider": {
                "type": "string",
                "enum": names(ModelProvider::ALL),
                "default": d.extraction_model_provider.to_string()
            },
            "skip_ocr": {
                "type": "boolean",
                "default": false
            },
            "timeout_seconds": {
                "type": "integer",
                "minimum": 1,
                "default": d.timeout_seconds,
                "description": "Maximum time to wait for processing completion (in seconds)"
            }
        }
    });

    ToolDescriptor {
        name: TOOL_NAME,
        description: TOOL_DESCRIPTION,
        parameters: json!({
            "type": "object",
            "required": ["path"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the document file to parse (supports PDF, DOCX, images, etc.) or HTTP, HTTPS URL"
                },
                "options": options
            }
        }),
    }
}
