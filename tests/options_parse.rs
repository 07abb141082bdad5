use serde_json::json;
use tensorlake_tool::{
    config::Config,
    options::{
        ChunkingStrategy, ExtractionSchema, FormDetectionMode, ModelProvider, ParsingConfiguration,
        TableOutputMode, TableParsingStrategy,
    },
};

#[test]
fn defaults_need_no_fields() {
    let cfg: ParsingConfiguration = serde_json::from_value(json!({})).unwrap();
    assert_eq!(cfg, ParsingConfiguration::default());
    assert_eq!(cfg.chunking_strategy, ChunkingStrategy::Page);
    assert_eq!(cfg.table_parsing_strategy, TableParsingStrategy::Vlm);
    assert_eq!(cfg.table_output_mode, TableOutputMode::Markdown);
    assert_eq!(cfg.form_detection_mode, FormDetectionMode::ObjectDetection);
    assert_eq!(cfg.extraction_model_provider, ModelProvider::Tensorlake);
    assert_eq!(cfg.timeout_seconds, 300);
    assert!(!cfg.signature_detection);
    assert!(cfg.extraction_schema.is_none());
    assert!(cfg.validate().is_ok());
}

#[test]
fn enum_values_accept_canonical_and_wire_names() {
    let chunking = |s: &str| s.parse::<ChunkingStrategy>().unwrap();
    assert_eq!(chunking("SECTION_HEADER"), ChunkingStrategy::SectionHeader);
    assert_eq!(chunking("section"), ChunkingStrategy::SectionHeader);
    assert_eq!(
        "tsr".parse::<TableParsingStrategy>().unwrap(),
        TableParsingStrategy::Tsr
    );
    assert_eq!(
        "Html".parse::<TableOutputMode>().unwrap(),
        TableOutputMode::Html
    );
    assert_eq!(
        "object-detection".parse::<FormDetectionMode>().unwrap(),
        FormDetectionMode::ObjectDetection
    );
    assert_eq!(
        "gpt-4o-mini".parse::<ModelProvider>().unwrap(),
        ModelProvider::Gpt4oMini
    );
}

#[test]
fn unknown_enum_value_fails_fast() {
    let err = "PARAGRAPH".parse::<ChunkingStrategy>().unwrap_err();
    assert!(err.to_string().contains("PARAGRAPH"));
    assert!(err.to_string().contains("SECTION_HEADER"));

    let res: Result<ParsingConfiguration, _> =
        serde_json::from_value(json!({ "table_output_mode": "CSV" }));
    assert!(res.is_err());
}

#[test]
fn unknown_field_is_rejected() {
    let res = ParsingConfiguration::from_json(json!({ "signatures_please": true }));
    assert!(res.is_err());
}

#[test]
fn legacy_field_names_are_aliases() {
    let cfg = ParsingConfiguration::from_json(json!({
        "detect_signature": true,
        "skew_detection": true,
        "table_parsing_format": "TSR",
    }))
    .unwrap();
    assert!(cfg.signature_detection);
    assert!(cfg.skew_correction);
    assert_eq!(cfg.table_parsing_strategy, TableParsingStrategy::Tsr);
}

#[test]
fn zero_timeout_is_invalid() {
    let cfg = ParsingConfiguration {
        timeout_seconds: 0,
        ..Default::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn malformed_page_range_is_invalid() {
    let res = ParsingConfiguration::from_json(json!({ "page_range": "5-1" }));
    assert!(res.is_err());
}

#[test]
fn extraction_schema_accepts_mapping_or_text() {
    let cfg = ParsingConfiguration::from_json(json!({
        "extraction_schema": { "name": "string" }
    }))
    .unwrap();
    assert!(matches!(cfg.extraction_schema, Some(ExtractionSchema::Mapping(_))));

    let cfg = ParsingConfiguration::from_json(json!({
        "extraction_schema": "{\"type\":\"object\"}"
    }))
    .unwrap();
    assert!(matches!(cfg.extraction_schema, Some(ExtractionSchema::Text(_))));

    assert!(ExtractionSchema::from_json(json!(42)).is_err());
}

#[test]
fn serialized_enums_use_wire_names() {
    let v = serde_json::to_value(ParsingConfiguration::default()).unwrap();
    assert_eq!(v["chunking_strategy"], "page");
    assert_eq!(v["form_detection_mode"], "object_detection");
}

#[test]
fn parse_example_config() {
    let raw = include_str!("../tensorlake-tool.example.toml");
    let cfg = Config::from_toml(raw).expect("parse TOML");
    assert_eq!(cfg.service.api_key_env, "TENSORLAKE_API_KEY");
    assert_eq!(cfg.service.poll_interval_seconds, 5);
    assert!(cfg.parsing.signature_detection);
}

#[test]
fn config_schema_table_becomes_mapping() {
    let raw = r#"
[parsing]
timeout_seconds = 60

[parsing.extraction_schema]
type = "object"
properties = { signer = { type = "string" } }
"#;
    let cfg = Config::from_toml(raw).unwrap();
    assert_eq!(cfg.parsing.timeout_seconds, 60);
    assert!(cfg.parsing.wants_extraction());
}

#[test]
fn config_rejects_invalid_parsing_section() {
    assert!(Config::from_toml("[parsing]\ntimeout_seconds = 0\n").is_err());
    assert!(Config::from_toml("[parsing]\nchunking_strategy = \"WORDS\"\n").is_err());
}

#[test]
fn config_rejects_zero_service_intervals() {
    let err = Config::from_toml("[service]\npoll_interval_seconds = 0\n").unwrap_err();
    assert!(format!("{err:#}").contains("poll_interval_seconds"));

    let err = Config::from_toml("[service]\nrequest_timeout_seconds = 0\n").unwrap_err();
    assert!(format!("{err:#}").contains("request_timeout_seconds"));

    let cfg = Config::from_toml("[service]\npoll_interval_seconds = 2\n").unwrap();
    assert_eq!(cfg.service.poll_interval_seconds, 2);
    assert_eq!(cfg.service.request_timeout_seconds, 120);
}
