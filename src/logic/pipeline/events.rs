//! Download Events
//!
//! Event model + structural validation. Invalid events are rejected before
//! any fingerprinting happens.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

use crate::logic::features::FileMetadata;

pub const FILE_DOWNLOAD: &str = "file_download";

fn default_event_type() -> String {
    FILE_DOWNLOAD.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadEvent {
    /// Generated (UUID v4) when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default = "default_event_type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub data: DownloadData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadData {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub download_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventRejected {
    #[error("malformed event: {0}")]
    Malformed(String),
    #[error("unsupported event type: {0}")]
    UnsupportedType(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0} must be non-empty")]
    EmptyField(&'static str),
}

impl DownloadEvent {
    pub fn parse(line: &str) -> Result<Self, EventRejected> {
        serde_json::from_str(line).map_err(|e| EventRejected::Malformed(e.to_string()))
    }

    /// Structural checks: type, filename, file_size, source_url, download_path
    pub fn validate(&self) -> Result<(), EventRejected> {
        if self.event_type != FILE_DOWNLOAD {
            return Err(EventRejected::UnsupportedType(self.event_type.clone()));
        }

        let data = &self.data;
        match data.filename.as_deref() {
            None => return Err(EventRejected::MissingField("filename")),
            Some(name) if name.trim().is_empty() => {
                return Err(EventRejected::EmptyField("filename"))
            }
            Some(_) => {}
        }
        if data.file_size.is_none() {
            return Err(EventRejected::MissingField("file_size"));
        }
        match data.source_url.as_deref() {
            None => return Err(EventRejected::MissingField("source_url")),
            Some(url) if url.trim().is_empty() => {
                return Err(EventRejected::EmptyField("source_url"))
            }
            Some(_) => {}
        }
        match &data.download_path {
            None => return Err(EventRejected::MissingField("download_path")),
            Some(path) if path.as_os_str().is_empty() => {
                return Err(EventRejected::EmptyField("download_path"))
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Existing non-blank id, or a fresh UUID written back into the event
    pub fn ensure_event_id(&mut self) -> String {
        match self.event_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                self.event_id = Some(id.clone());
                id
            }
        }
    }

    pub fn filename(&self) -> &str {
        self.data.filename.as_deref().unwrap_or("unknown")
    }

    /// Input of the semantic text surrogate
    pub fn file_metadata(&self) -> FileMetadata {
        FileMetadata {
            filename: self.data.filename.clone(),
            mime_type: self.data.mime_type.clone(),
            source_url: self.data.source_url.clone(),
            description: self.data.description.clone(),
        }
    }

    /// Metadata sent along with the lookup request
    pub fn lookup_metadata(&self) -> Value {
        json!({
            "filename": self.data.filename,
            "file_size": self.data.file_size,
            "mime_type": self.data.mime_type,
            "source_url": self.data.source_url,
        })
    }
}
