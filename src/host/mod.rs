//! Contains the contract the host editor has to fulfil. The editor side only
//! reports raw signals (focus, selection movement, content changes); mapping
//! them to projects and metrics happens in the tracker. [stdio::StdioHost] is
//! the main artifact of this module for production use.

pub mod stdio;

use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

/// The document currently holding focus, already resolved by the host to its
/// owning project root. Documents outside any recognized root never show up
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusedDocument {
    pub project_root: PathBuf,
    pub language_id: String,
    /// Path relative to `project_root`.
    pub relative_path: String,
}

/// One replacement inside a content-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChange {
    /// Replacement text; newlines in here count as added lines.
    pub text: String,
    pub start_line: u32,
    /// Last line of the replaced range; lines spanned count as deleted.
    pub end_line: u32,
}

/// A raw content-change notification for one document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChange {
    /// None when the document lies outside every recognized project root.
    pub project_root: Option<PathBuf>,
    pub file_backed: bool,
    pub changes: Vec<ContentChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Focus or selection movement. Only refreshes the activity timestamp.
    Activity,
    DocumentChanged(DocumentChange),
}

/// Intended to serve as the contract any host editor integration must
/// implement. Both methods are polled once per sampler tick.
#[cfg_attr(test, mockall::automock)]
pub trait EditorHost: Send {
    /// Drains events observed since the previous call.
    fn drain_events(&mut self) -> Result<Vec<HostEvent>>;

    /// Resolves the currently focused file-backed document, if any.
    fn focused_document(&mut self) -> Result<Option<FocusedDocument>>;
}
