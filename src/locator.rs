use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A caller-supplied document reference, classified once before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// Dereferenced by the service itself.
    Url(String),
    /// Uploaded first; the returned file id is submitted instead of the path.
    LocalFile(PathBuf),
    /// Already a provider-side identifier.
    RemoteId(String),
}

impl Locator {
    /// URL scheme first, then an existing local file, else an opaque remote id.
    /// The input is carried verbatim; surrounding whitespace is not stripped.
    pub fn classify(raw: &str) -> Self {
        if looks_like_url(raw) {
            return Locator::Url(raw.to_string());
        }
        let path = Path::new(raw);
        if path.is_file() {
            return Locator::LocalFile(path.to_path_buf());
        }
        Locator::RemoteId(raw.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Locator::Url(_) => "url",
            Locator::LocalFile(_) => "local_file",
            Locator::RemoteId(_) => "remote_id",
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Url(u) => f.write_str(u),
            Locator::LocalFile(p) => write!(f, "{}", p.display()),
            Locator::RemoteId(id) => f.write_str(id),
        }
    }
}

pub fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://")
}
