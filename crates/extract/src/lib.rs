//! Extraction client: turns notification text or screenshots into a
//! best-effort `ParseResult` via a hosted generative model.
//!
//! Blocking HTTP, one request per call. No retries, no queueing.

mod client;
mod mailbox;
mod reply;

pub use client::{ApiFlavor, ClientConfig, ExtractClient, ExtractError, Extractor};
pub use mailbox::{AccessToken, CandidateMessage, ExportedMailbox, MailError, MailboxSource};
pub use reply::{parse_reply, EXTRACTION_PROMPT};
