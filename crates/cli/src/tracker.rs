// Tracker session
//
// Owns the in-memory collection for one `parcels` invocation and wires the
// pure engine to its collaborators: extraction before, persistence after.
// Every accepted mutation is saved immediately. A failed save is reported
// but the in-memory collection keeps the change.

use log::{info, warn};

use parceltrack_core::{Package, PackageStatus, ParseResult, ViewMode};
use parceltrack_extract::Extractor;
use parceltrack_io::{PackageStore, StoreError};
use parceltrack_recon::{
    delete_package, filter_view, matcher::find_by_id_prefix, reconcile_now, toggle_status,
    LookupError, Outcome,
};

#[derive(Debug)]
pub enum TrackerError {
    /// A submission is already outstanding.
    Busy,
    /// No extraction client is configured.
    ExtractionUnavailable,
    Lookup(LookupError),
    /// The change was applied in memory but could not be written.
    Store(StoreError),
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::Busy => write!(f, "a submission is already being processed"),
            TrackerError::ExtractionUnavailable => write!(f, "extraction is not configured"),
            TrackerError::Lookup(e) => write!(f, "{}", e),
            TrackerError::Store(e) => write!(f, "could not save packages: {}", e),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<LookupError> for TrackerError {
    fn from(e: LookupError) -> Self {
        TrackerError::Lookup(e)
    }
}

impl From<StoreError> for TrackerError {
    fn from(e: StoreError) -> Self {
        TrackerError::Store(e)
    }
}

/// A submission between "sent to extraction" and "result arrived".
#[derive(Debug)]
#[must_use]
pub struct Submission {
    source_text: String,
}

pub struct Tracker {
    store: PackageStore,
    packages: Vec<Package>,
    extractor: Option<Box<dyn Extractor>>,
    busy: bool,
}

impl Tracker {
    /// Open a session over `store`, loading whatever it holds.
    pub fn open(store: PackageStore, extractor: Option<Box<dyn Extractor>>) -> Self {
        let packages = store.load();
        info!("loaded {} package(s) from {}", packages.len(), store.path().display());
        Self {
            store,
            packages,
            extractor,
            busy: false,
        }
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn store(&self) -> &PackageStore {
        &self.store
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn view(&self, mode: ViewMode) -> Vec<&Package> {
        filter_view(&self.packages, mode)
    }

    /// Resolve an id or unique id prefix.
    pub fn find(&self, id_or_prefix: &str) -> Result<&Package, TrackerError> {
        Ok(find_by_id_prefix(&self.packages, id_or_prefix)?)
    }

    // ── Submissions ─────────────────────────────────────────────────

    /// Mark the session busy. Fails while another submission is pending.
    pub fn begin_submission(&mut self, source_text: impl Into<String>) -> Result<Submission, TrackerError> {
        if self.busy {
            return Err(TrackerError::Busy);
        }
        self.busy = true;
        Ok(Submission {
            source_text: source_text.into(),
        })
    }

    /// Reconcile the extraction result of `submission` and persist.
    ///
    /// A rejected outcome is returned as `Ok`; nothing is saved for it.
    pub fn complete_submission(
        &mut self,
        submission: Submission,
        result: Option<ParseResult>,
    ) -> Result<Outcome, TrackerError> {
        self.busy = false;

        let packages = std::mem::take(&mut self.packages);
        let rec = reconcile_now(result.as_ref(), &submission.source_text, packages);
        self.packages = rec.packages;

        match &rec.outcome {
            Outcome::Created { id } => info!("created package {}", id),
            Outcome::Updated { id } => info!("updated package {}", id),
            Outcome::Rejected { reason } => {
                info!("submission rejected: {}", reason);
                return Ok(rec.outcome);
            }
        }

        self.persist()?;
        Ok(rec.outcome)
    }

    /// Extract from notification text and reconcile.
    pub fn submit_text(&mut self, text: &str) -> Result<Outcome, TrackerError> {
        if self.extractor.is_none() {
            return Err(TrackerError::ExtractionUnavailable);
        }
        let submission = self.begin_submission(text)?;
        let result = self
            .extractor
            .as_ref()
            .and_then(|x| x.extract_from_text(text).map_err(|e| warn!("text extraction failed: {}", e)).ok());
        self.complete_submission(submission, result)
    }

    /// Extract from a screenshot and reconcile. The stored original text is
    /// `Screenshot: <file_name>`.
    pub fn submit_image(&mut self, bytes: &[u8], mime_type: &str, file_name: &str) -> Result<Outcome, TrackerError> {
        if self.extractor.is_none() {
            return Err(TrackerError::ExtractionUnavailable);
        }
        let submission = self.begin_submission(format!("Screenshot: {}", file_name))?;
        let result = self.extractor.as_ref().and_then(|x| {
            x.extract_from_image(bytes, mime_type)
                .map_err(|e| warn!("image extraction failed: {}", e))
                .ok()
        });
        self.complete_submission(submission, result)
    }

    /// Reconcile a result obtained elsewhere (no extraction call).
    pub fn apply_result(&mut self, result: Option<ParseResult>, source_text: &str) -> Result<Outcome, TrackerError> {
        let submission = self.begin_submission(source_text)?;
        self.complete_submission(submission, result)
    }

    // ── Edits ───────────────────────────────────────────────────────

    /// Toggle the status of the package matching `id_or_prefix`.
    pub fn toggle(&mut self, id_or_prefix: &str) -> Result<(String, PackageStatus), TrackerError> {
        let id = self.find(id_or_prefix)?.id.clone();
        let status = toggle_status(&mut self.packages, &id)
            .ok_or_else(|| LookupError::NotFound(id.clone()))?;
        info!("package {} is now {}", id, status.as_str());
        self.persist()?;
        Ok((id, status))
    }

    /// Delete the package matching `id_or_prefix`.
    pub fn delete(&mut self, id_or_prefix: &str) -> Result<Package, TrackerError> {
        let id = self.find(id_or_prefix)?.id.clone();
        let removed = delete_package(&mut self.packages, &id).ok_or(LookupError::NotFound(id))?;
        info!("deleted package {}", removed.id);
        self.persist()?;
        Ok(removed)
    }

    /// Drop every package and remove the stored file. Returns how many were
    /// dropped.
    pub fn clear(&mut self) -> Result<usize, TrackerError> {
        let count = self.packages.len();
        self.packages.clear();
        self.store.clear()?;
        info!("cleared {} package(s)", count);
        Ok(count)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.packages).map_err(|e| {
            warn!("save failed: {}", e);
            e
        })
    }
}
