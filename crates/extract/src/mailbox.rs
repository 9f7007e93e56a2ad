//! Mailbox sources: where candidate notification e-mails come from.
//!
//! Only a file-backed source exists: a JSON export of messages. Messages are
//! never reconciled here; the caller feeds each one through extraction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque token returned by a mailbox login step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One e-mail that might describe a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMessage {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body_preview: String,
    #[serde(default)]
    pub full_body: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub sender_address: String,
    /// Folder/label names the message is filed under.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl CandidateMessage {
    /// Text handed to the extraction service: headers plus the full body
    /// (or the preview when the body is empty).
    pub fn extraction_text(&self) -> String {
        let body = if self.full_body.trim().is_empty() {
            &self.body_preview
        } else {
            &self.full_body
        };
        format!(
            "From: {} <{}>\nSubject: {}\n\n{}",
            self.sender_name, self.sender_address, self.subject, body
        )
    }
}

#[derive(Debug)]
pub enum MailError {
    Io(String),
    Parse(String),
    /// Token does not belong to this source.
    InvalidToken,
}

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailError::Io(msg) => write!(f, "I/O error: {}", msg),
            MailError::Parse(msg) => write!(f, "Parse error: {}", msg),
            MailError::InvalidToken => write!(f, "access token does not match this mailbox"),
        }
    }
}

impl std::error::Error for MailError {}

/// A place candidate messages can be listed from.
pub trait MailboxSource {
    fn obtain_access_token(&self) -> Result<AccessToken, MailError>;
    fn list_candidate_messages(
        &self,
        token: &AccessToken,
        folder_label: &str,
    ) -> Result<Vec<CandidateMessage>, MailError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportFile {
    Wrapped { messages: Vec<CandidateMessage> },
    Bare(Vec<CandidateMessage>),
}

/// Mailbox read from a JSON export: either `{"messages": [...]}` or a bare
/// array of messages.
#[derive(Debug, Clone)]
pub struct ExportedMailbox {
    path: PathBuf,
}

impl ExportedMailbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn token_value(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

impl MailboxSource for ExportedMailbox {
    fn obtain_access_token(&self) -> Result<AccessToken, MailError> {
        if !self.path.is_file() {
            return Err(MailError::Io(format!("{}: no such file", self.path.display())));
        }
        Ok(AccessToken(self.token_value()))
    }

    /// Messages carrying `folder_label` (case-insensitive). An empty label
    /// lists every message.
    fn list_candidate_messages(
        &self,
        token: &AccessToken,
        folder_label: &str,
    ) -> Result<Vec<CandidateMessage>, MailError> {
        if token.as_str() != self.token_value() {
            return Err(MailError::InvalidToken);
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| MailError::Io(format!("{}: {}", self.path.display(), e)))?;
        let messages = match serde_json::from_str::<ExportFile>(&contents)
            .map_err(|e| MailError::Parse(e.to_string()))?
        {
            ExportFile::Wrapped { messages } | ExportFile::Bare(messages) => messages,
        };

        let folder = folder_label.trim();
        Ok(messages
            .into_iter()
            .filter(|m| folder.is_empty() || m.labels.iter().any(|l| l.eq_ignore_ascii_case(folder)))
            .collect())
    }
}
