//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `parcels` exit codes.
//! Scripts rely on them, so treat them as part of the shell contract.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                                |
//! |---------|------------|--------------------------------------------|
//! | 0       | Universal  | Success                                    |
//! | 1       | Universal  | General error (unspecified)                |
//! | 2       | Universal  | CLI usage error (bad args, unreadable file)|
//! | 3-9     | packages   | Lookup and reconciliation outcomes         |
//! | 10-19   | extraction | Provider, keychain and session codes       |
//! | 20-29   | storage    | Local persistence                          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `exit_code` or the relevant command

use parceltrack_recon::LookupError;

use crate::tracker::TrackerError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable input file, declined prompt.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Packages (3-9)
// =============================================================================

/// No package matches the given id, or the id prefix is ambiguous.
pub const EXIT_NOT_FOUND: u8 = 3;

/// Submission rejected: no package data or no tracking number.
pub const EXIT_REJECTED: u8 = 4;

// =============================================================================
// Extraction (10-19)
// =============================================================================

/// Extraction disabled (provider = none).
pub const EXIT_EXTRACTION_DISABLED: u8 = 10;

/// Extraction provider configured but API key missing.
pub const EXIT_EXTRACTION_MISSING_KEY: u8 = 11;

/// A submission is already in flight.
pub const EXIT_BUSY: u8 = 12;

/// Keychain error (cannot write or delete credentials).
pub const EXIT_KEYCHAIN: u8 = 13;

// =============================================================================
// Storage (20-29)
// =============================================================================

/// Could not write the package file.
pub const EXIT_STORAGE_WRITE: u8 = 20;

/// Map a TrackerError to its exit code.
pub fn exit_code(err: &TrackerError) -> u8 {
    match err {
        TrackerError::Busy => EXIT_BUSY,
        TrackerError::ExtractionUnavailable => EXIT_EXTRACTION_DISABLED,
        TrackerError::Lookup(LookupError::NotFound(_) | LookupError::Ambiguous { .. }) => {
            EXIT_NOT_FOUND
        }
        TrackerError::Store(_) => EXIT_STORAGE_WRITE,
    }
}
