//! Format-agnostic document loading and saving
//!
//! Graphs and payloads may be authored as JSON, TOML or YAML. The format is
//! detected from the file extension:
//!
//! - `.json` -> JSON
//! - `.toml` -> TOML
//! - `.yaml`, `.yml` -> YAML

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::schema::{Payload, TokenGraph};
use crate::{Error, Result};

/// Serialization format of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
        }
    }

    fn parse<T: DeserializeOwned>(&self, content: &str) -> std::result::Result<T, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    fn render<T: Serialize>(&self, value: &T) -> std::result::Result<String, String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        }
    }
}

/// Load and deserialize a document.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DocumentFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    format.parse(&content).map_err(|message| Error::Parse {
        path: path.to_path_buf(),
        format: format.name().to_string(),
        message,
    })
}

/// Serialize and write a document, creating parent directories.
pub fn save_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let format = DocumentFormat::from_path(path)?;
    let content = format.render(value).map_err(|message| Error::Serialize {
        format: format.name().to_string(),
        message,
    })?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))
}

/// A sync input: either an unresolved graph or an already resolved payload.
#[derive(Debug, Clone)]
pub enum Input {
    Graph(TokenGraph),
    Payload(Payload),
}

/// Load a sync input, telling graphs and payloads apart by shape.
///
/// A document whose top level carries both `brands` and `components`
/// objects is a graph; anything else is read as a payload. Pass
/// `force_payload` when a brand is literally named `brands`.
pub fn load_input(path: &Path, force_payload: bool) -> Result<Input> {
    let raw: serde_json::Value = load_document(path)?;
    let parse_error = |e: serde_json::Error| Error::Parse {
        path: path.to_path_buf(),
        format: "document".to_string(),
        message: e.to_string(),
    };

    let looks_like_graph = raw.get("brands").is_some_and(|v| v.is_object())
        && raw.get("components").is_some_and(|v| v.is_object());

    if looks_like_graph && !force_payload {
        tracing::debug!(path = %path.display(), "Loaded token graph");
        serde_json::from_value(raw).map(Input::Graph).map_err(parse_error)
    } else {
        tracing::debug!(path = %path.display(), "Loaded resolved payload");
        serde_json::from_value(raw).map(Input::Payload).map_err(parse_error)
    }
}
