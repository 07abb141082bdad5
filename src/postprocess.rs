use crate::config::Output;
use serde::Serialize;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadSource {
    Chunks,
    Content,
    Markdown,
    /// No recognized payload field; the whole record is rendered.
    FullRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub text: String,
    pub source: PayloadSource,
    /// Structured extraction results were appended to `text`.
    pub structured: bool,
}

/// Picks the result text out of a successful job record: non-empty chunks,
/// then non-empty content, then markdown, then the full record. Structured
/// extraction results, when present, follow the text as a JSON block.
pub fn extract_payload(record: &Value) -> Payload {
    let (text, source) = document_text(record);
    if source == PayloadSource::FullRecord {
        return Payload {
            text,
            source,
            structured: false,
        };
    }

    match record.get("structured_data").filter(|v| has_data(v)) {
        Some(data) => {
            let rendered = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
            Payload {
                text: format!("{text}{STRUCTURED_DATA_HEADING}```json\n{rendered}\n```"),
                source,
                structured: true,
            }
        }
        None => Payload {
            text,
            source,
            structured: false,
        },
    }
}

pub const STRUCTURED_DATA_HEADING: &str = "\n\n## Structured data\n\n";

fn has_data(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(m) => !m.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn document_text(record: &Value) -> (String, PayloadSource) {
    if let Some(parts) = record.get("chunks").and_then(chunk_texts) {
        return (parts.join(CHUNK_SEPARATOR), PayloadSource::Chunks);
    }

    if let Some(content) = record
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
    {
        return (content.to_string(), PayloadSource::Content);
    }

    if let Some(md) = record.get("markdown").and_then(Value::as_str) {
        return (md.to_string(), PayloadSource::Markdown);
    }

    (
        serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string()),
        PayloadSource::FullRecord,
    )
}

fn chunk_texts(chunks: &Value) -> Option<Vec<String>> {
    let items = chunks.as_array()?;
    let parts: Vec<String> = items
        .iter()
        .filter_map(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => c.get("content").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect();
    if parts.is_empty() { None } else { Some(parts) }
}

/// Text cleanup applied to the extracted payload, as configured.
pub fn clean_text(cfg: &Output, text: &str) -> String {
    let mut out = text.to_string();

    if cfg.normalize_newlines {
        out = out.replace("\r\n", "\n");
    }

    if cfg.normalize_unicode {
        out = out.nfkc().collect::<String>();
    }

    if cfg.trim_trailing_whitespace {
        out = out
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
    }

    out
}
