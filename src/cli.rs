use crate::{
    config::Config,
    locator::Locator,
    options::{
        ChunkingStrategy, ExtractionSchema, ModelProvider, ParsingConfiguration, TableOutputMode,
        TableParsingStrategy,
    },
    tool::{descriptor, ToolAdapter},
    translate::translate,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "tensorlake-tool")]
#[command(
    about = "Convert documents to markdown with Tensorlake Document AI (upload + parse + poll)"
)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./tensorlake-tool.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show effective settings and whether the API key is available.
    Doctor {},
    /// Print the locator classification and request bundles without submitting.
    Options {
        #[arg(long)]
        input: String,
        #[command(flatten)]
        overrides: ParseOverrides,
    },
    /// Convert one document and print (or write) the result.
    Parse {
        /// Local path, http(s) URL or Tensorlake file id.
        #[arg(long)]
        input: String,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Run through the async entry point.
        #[arg(long = "async")]
        use_async: bool,
        /// Print a JSON run summary to stderr.
        #[arg(long)]
        report: bool,
        #[command(flatten)]
        overrides: ParseOverrides,
    },
    /// Print the tool descriptor registered with agent frameworks.
    ToolSpec {},
    /// Invoke the tool with JSON arguments, as an agent framework would.
    Invoke {
        /// JSON object `{"path": ..., "options": {...}}`, or @FILE.
        #[arg(long)]
        args: String,
    },
}

/// Command-line overrides for the `[parsing]` section. Boolean switches take
/// an optional value, so `--skip-ocr=false` turns off a config-enabled flag.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ParseOverrides {
    #[arg(long)]
    pub chunking: Option<ChunkingStrategy>,
    #[arg(long)]
    pub table_parsing: Option<TableParsingStrategy>,
    #[arg(long)]
    pub table_output: Option<TableOutputMode>,
    #[arg(long)]
    pub page_range: Option<String>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub signature_detection: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub skew_correction: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub disable_layout_detection: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub remove_strikethrough_lines: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub table_summarization: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub figure_summarization: Option<bool>,
    /// Extraction JSON schema, inline or @FILE.
    #[arg(long)]
    pub schema: Option<String>,
    #[arg(long)]
    pub schema_name: Option<String>,
    #[arg(long)]
    pub extraction_prompt: Option<String>,
    #[arg(long)]
    pub model_provider: Option<ModelProvider>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    pub skip_ocr: Option<bool>,
    #[arg(long)]
    pub timeout_seconds: Option<u64>,
}

impl ParseOverrides {
    pub fn apply(&self, base: &ParsingConfiguration) -> Result<ParsingConfiguration> {
        let mut cfg = base.clone();
        if let Some(v) = self.chunking {
            cfg.chunking_strategy = v;
        }
        if let Some(v) = self.table_parsing {
            cfg.table_parsing_strategy = v;
        }
        if let Some(v) = self.table_output {
            cfg.table_output_mode = v;
        }
        if let Some(v) = &self.page_range {
            cfg.page_range = Some(v.clone());
        }
        let switches = [
            (&mut cfg.signature_detection, self.signature_detection),
            (&mut cfg.skew_correction, self.skew_correction),
            (&mut cfg.disable_layout_detection, self.disable_layout_detection),
            (&mut cfg.remove_strikethrough_lines, self.remove_strikethrough_lines),
            (&mut cfg.table_summarization, self.table_summarization),
            (&mut cfg.figure_summarization, self.figure_summarization),
            (&mut cfg.skip_ocr, self.skip_ocr),
        ];
        for (field, value) in switches {
            if let Some(v) = value {
                *field = v;
            }
        }
        if let Some(raw) = &self.schema {
            let text = read_arg(raw)?;
            let schema = match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(v) => ExtractionSchema::from_json(v)?,
                Err(_) => ExtractionSchema::Text(text),
            };
            cfg.extraction_schema = Some(schema);
        }
        if let Some(v) = &self.schema_name {
            cfg.extraction_schema_name = v.clone();
        }
        if let Some(v) = &self.extraction_prompt {
            cfg.extraction_prompt = Some(v.clone());
        }
        if let Some(v) = self.model_provider {
            cfg.extraction_model_provider = v;
        }
        if let Some(v) = self.timeout_seconds {
            cfg.timeout_seconds = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match &cfg_path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg, cfg_path.as_deref()),
        Command::Options { input, overrides } => options(&cfg, input, overrides),
        Command::Parse {
            input,
            out,
            use_async,
            report,
            overrides,
        } => parse(&cfg, input, out.as_deref(), *use_async, *report, overrides),
        Command::ToolSpec {} => {
            println!("{}", serde_json::to_string_pretty(&descriptor())?);
            Ok(())
        }
        Command::Invoke { args } => invoke(&cfg, args),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("tensorlake-tool.toml");
    if default.exists() { Some(default) } else { None }
}

fn init_logging(
    args: &Args,
    cfg: &Config,
    file_path: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the conversion result, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("tensorlake-tool.log"))
}

fn doctor(cfg: &Config, cfg_path: Option<&Path>) -> Result<()> {
    let adapter = ToolAdapter::from_config(cfg);
    let parsing = match cfg.parsing.validate() {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("{e:#}"),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "config": cfg_path.map(|p| p.display().to_string()),
            "base_url": cfg.service.base_url,
            "api_key_env": cfg.service.api_key_env,
            "api_key_present": adapter.has_credential(),
            "poll_interval_seconds": cfg.service.poll_interval_seconds,
            "parsing": parsing,
            "effective_parsing": cfg.parsing,
        }))?
    );
    Ok(())
}

fn options(cfg: &Config, input: &str, overrides: &ParseOverrides) -> Result<()> {
    let parsing = overrides.apply(&cfg.parsing)?;
    let bundles = translate(&parsing)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "locator": Locator::classify(input),
            "bundles": bundles,
            "fingerprint": bundles.fingerprint(),
        }))?
    );
    Ok(())
}

fn parse(
    cfg: &Config,
    input: &str,
    out: Option<&Path>,
    use_async: bool,
    report: bool,
    overrides: &ParseOverrides,
) -> Result<()> {
    let parsing = overrides.apply(&cfg.parsing)?;
    let adapter = ToolAdapter::from_config(cfg);

    let result = if use_async {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .with_context(|| "building tokio runtime")?;
        rt.block_on(adapter.run_async(input, &parsing))
    } else {
        adapter.run(input, &parsing)
    };
    let output = result.map_err(|e| anyhow!("{e}"))?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_dir(parent)?;
            }
            std::fs::write(path, &output.markdown)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {} bytes to {}", output.markdown.len(), path.display());
        }
        None => println!("{}", output.markdown),
    }

    if report {
        eprintln!("{}", serde_json::to_string_pretty(&output.report)?);
    }
    Ok(())
}

fn invoke(cfg: &Config, raw: &str) -> Result<()> {
    let text = read_arg(raw)?;
    let args: serde_json::Value =
        serde_json::from_str(&text).with_context(|| "parsing --args JSON")?;
    let adapter = ToolAdapter::from_config(cfg);
    println!("{}", adapter.invoke_json(&args));
    Ok(())
}

/// `@path` reads the value from a file.
fn read_arg(raw: &str) -> Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(raw.to_string()),
    }
}
