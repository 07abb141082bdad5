//! Parsing knobs accepted by the Document AI service.
//!
//! Every enumerable option is a closed set. Values are read case-insensitively
//! from either the canonical name (`SECTION_HEADER`) or the service's wire name
//! (`section`); anything else is rejected when the configuration is built.

use crate::page_range::parse_page_spec;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value {value:?}; expected one of {expected:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $canonical:literal, $wire:literal $(| $alias:literal)*;
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used in request bodies sent to the service.
            pub fn as_wire(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn canonical_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $canonical,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.canonical_name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let key = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
                $(
                    if key == $canonical
                        || key.eq_ignore_ascii_case($wire)
                        $(|| key.eq_ignore_ascii_case($alias))*
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(UnknownVariant {
                    kind: stringify!($name),
                    value: s.to_string(),
                    expected: &[$($canonical),+],
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownVariant;

            fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                v.as_wire().to_string()
            }
        }
    };
}

wire_enum! {
    /// How parsed output is segmented into chunks.
    pub enum ChunkingStrategy {
        None => "NONE", "none";
        #[default]
        Page => "PAGE", "page";
        SectionHeader => "SECTION_HEADER", "section" | "section_header";
    }
}

wire_enum! {
    /// Table extraction algorithm.
    pub enum TableParsingStrategy {
        Tsr => "TSR", "tsr";
        #[default]
        Vlm => "VLM", "vlm";
    }
}

wire_enum! {
    pub enum TableOutputMode {
        Json => "JSON", "json";
        #[default]
        Markdown => "MARKDOWN", "markdown";
        Html => "HTML", "html";
    }
}

wire_enum! {
    pub enum FormDetectionMode {
        #[default]
        ObjectDetection => "OBJECT_DETECTION", "object_detection";
        Vlm => "VLM", "vlm";
    }
}

wire_enum! {
    /// Model used by the service for structured extraction.
    pub enum ModelProvider {
        #[default]
        Tensorlake => "TENSORLAKE", "tensorlake";
        Sonnet => "SONNET", "sonnet";
        Gpt4oMini => "GPT_4O_MINI", "gpt_4o_mini" | "gpt4o_mini";
    }
}

/// Schema driving structured extraction: a JSON Schema mapping or a raw string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionSchema {
    Text(String),
    Mapping(serde_json::Map<String, Value>),
}

impl ExtractionSchema {
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s)),
            Value::Object(m) => Ok(Self::Mapping(m)),
            other => Err(anyhow!(
                "extraction schema must be an object or a string, got {other}"
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Mapping(m) => m.is_empty(),
        }
    }

    /// String form sent to the service. Mappings are rendered as compact JSON
    /// with keys sorted at every level.
    pub fn serialized(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Mapping(m) => sorted(&Value::Object(m.clone())).to_string(),
        }
    }
}

fn sorted(v: &Value) -> Value {
    match v {
        Value::Object(m) => {
            let mut keys: Vec<&String> = m.keys().collect();
            keys.sort();
            Value::Object(keys.into_iter().map(|k| (k.clone(), sorted(&m[k]))).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParsingConfiguration {
    pub chunking_strategy: ChunkingStrategy,
    #[serde(alias = "table_parsing_format")]
    pub table_parsing_strategy: TableParsingStrategy,
    pub table_output_mode: TableOutputMode,
    pub table_summarization_prompt: Option<String>,
    pub table_summarization: bool,
    pub figure_summarization: bool,
    pub figure_summarization_prompt: Option<String>,
    pub page_range: Option<String>,
    #[serde(alias = "skew_detection")]
    pub skew_correction: bool,
    pub disable_layout_detection: bool,
    #[serde(alias = "detect_signature")]
    pub signature_detection: bool,
    pub remove_strikethrough_lines: bool,
    pub form_detection_mode: FormDetectionMode,
    pub extraction_schema: Option<ExtractionSchema>,
    pub extraction_schema_name: String,
    pub extraction_prompt: Option<String>,
    pub extraction_model_provider: ModelProvider,
    pub skip_ocr: bool,
    pub timeout_seconds: u64,
}

impl Default for ParsingConfiguration {
    fn default() -> Self {
        Self {
            chunking_strategy: ChunkingStrategy::default(),
            table_parsing_strategy: TableParsingStrategy::default(),
            table_output_mode: TableOutputMode::default(),
            table_summarization_prompt: None,
            table_summarization: false,
            figure_summarization: false,
            figure_summarization_prompt: None,
            page_range: None,
            skew_correction: false,
            disable_layout_detection: false,
            signature_detection: false,
            remove_strikethrough_lines: false,
            form_detection_mode: FormDetectionMode::default(),
            extraction_schema: None,
            extraction_schema_name: "extraction".into(),
            extraction_prompt: None,
            extraction_model_provider: ModelProvider::default(),
            skip_ocr: false,
            timeout_seconds: 300,
        }
    }
}

impl ParsingConfiguration {
    /// Builds a configuration from tool-call style JSON arguments.
    pub fn from_json(value: Value) -> Result<Self> {
        let cfg: Self = serde_json::from_value(value)
            .map_err(|e| anyhow!("invalid parsing options: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than zero"));
        }
        if let Some(range) = self.page_range.as_deref() {
            parse_page_spec(range)?;
        }
        if self.wants_extraction() && self.extraction_schema_name.trim().is_empty() {
            return Err(anyhow!("extraction_schema_name must not be empty"));
        }
        Ok(())
    }

    /// Structured extraction runs when a schema is given or OCR is skipped.
    pub fn wants_extraction(&self) -> bool {
        let has_schema = self
            .extraction_schema
            .as_ref()
            .is_some_and(|s| !s.is_empty());
        has_schema || self.skip_ocr
    }
}
