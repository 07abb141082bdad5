pub mod cli;
pub mod config;
pub mod error;
pub mod locator;
pub mod options;
pub mod page_range;
pub mod pipeline;
pub mod poll;
pub mod postprocess;
pub mod report;
pub mod service;
pub mod submit;
pub mod tool;
pub mod translate;
pub mod util;

pub use error::ToolError;
pub use options::ParsingConfiguration;
pub use tool::{ToolAdapter, ToolDescriptor};
