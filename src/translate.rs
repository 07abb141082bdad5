//! Maps a [`ParsingConfiguration`] onto the option groups of a parse request.

use crate::options::{
    ChunkingStrategy, FormDetectionMode, ModelProvider, ParsingConfiguration, TableOutputMode,
    TableParsingStrategy,
};
use crate::page_range::normalize_page_spec;
use crate::util::sha256_hex;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingOptions {
    pub chunking_strategy: ChunkingStrategy,
    pub table_parsing_format: TableParsingStrategy,
    pub table_output_mode: TableOutputMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_range: Option<String>,
    pub skew_detection: bool,
    pub disable_layout_detection: bool,
    pub signature_detection: bool,
    pub remove_strikethrough_lines: bool,
    pub form_detection_mode: FormDetectionMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentOptions {
    pub figure_summarization: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure_summarization_prompt: Option<String>,
    pub table_summarization: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_summarization_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    pub schema_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub model_provider: ModelProvider,
    pub skip_ocr: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionBundles {
    pub parsing: ParsingOptions,
    pub enrichment: EnrichmentOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionOptions>,
}

impl OptionBundles {
    /// Canonical JSON form of all bundles. Field order is fixed by the struct
    /// definitions, so equal bundles always render to identical bytes.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn fingerprint(&self) -> String {
        sha256_hex(self.to_json().as_bytes())
    }
}

/// Builds the request bundles. Fails only when the page range is malformed.
pub fn translate(cfg: &ParsingConfiguration) -> Result<OptionBundles> {
    let page_range = cfg
        .page_range
        .as_deref()
        .map(normalize_page_spec)
        .transpose()?;

    let parsing = ParsingOptions {
        chunking_strategy: cfg.chunking_strategy,
        table_parsing_format: cfg.table_parsing_strategy,
        table_output_mode: cfg.table_output_mode,
        page_range,
        skew_detection: cfg.skew_correction,
        disable_layout_detection: cfg.disable_layout_detection,
        signature_detection: cfg.signature_detection,
        remove_strikethrough_lines: cfg.remove_strikethrough_lines,
        form_detection_mode: cfg.form_detection_mode,
    };

    let enrichment = EnrichmentOptions {
        figure_summarization: cfg.figure_summarization,
        figure_summarization_prompt: non_blank(cfg.figure_summarization_prompt.as_deref()),
        table_summarization: cfg.table_summarization,
        table_summarization_prompt: non_blank(cfg.table_summarization_prompt.as_deref()),
    };

    let extraction = cfg.wants_extraction().then(|| ExtractionOptions {
        schema_name: cfg.extraction_schema_name.trim().to_string(),
        json_schema: cfg
            .extraction_schema
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| s.serialized()),
        prompt: non_blank(cfg.extraction_prompt.as_deref()),
        model_provider: cfg.extraction_model_provider,
        skip_ocr: cfg.skip_ocr,
    });

    Ok(OptionBundles {
        parsing,
        enrichment,
        extraction,
    })
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
