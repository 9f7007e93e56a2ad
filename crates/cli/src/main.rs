// parcels - track incoming parcels from delivery notifications

mod exit_codes;
mod tracker;

use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{debug, warn};

use parceltrack_config::{ai, ExtractionConfigStatus, ExtractionProvider, ResolvedExtractionConfig, Settings};
use parceltrack_core::{Package, ParseResult, ViewMode};
use parceltrack_extract::{
    parse_reply, ApiFlavor, ClientConfig, ExportedMailbox, ExtractClient, ExtractError, Extractor, MailboxSource,
};
use parceltrack_io::PackageStore;
use parceltrack_recon::{CollectionSummary, LookupError, Outcome, RejectReason};

use exit_codes::{
    exit_code, EXIT_ERROR, EXIT_EXTRACTION_DISABLED, EXIT_EXTRACTION_MISSING_KEY, EXIT_KEYCHAIN,
    EXIT_REJECTED, EXIT_SUCCESS, EXIT_USAGE,
};
use tracker::{Tracker, TrackerError};

#[derive(Parser)]
#[command(name = "parcels")]
#[command(about = "Track incoming parcels from delivery notifications")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Directory holding packages.json (overrides storage.dataDir)
    #[arg(long, global = true, env = "PARCELTRACK_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a package from notification text (SMS, e-mail) and track it
    #[command(after_help = "\
Examples:
  parcels add 'Din pakke 00370716483957214 fra Zalando er klar til afhentning'
  pbpaste | parcels add -")]
    Add {
        /// Notification text, or - to read stdin
        text: String,
    },

    /// Extract a package from a screenshot and track it
    AddImage {
        /// Image file (png, jpg, webp, gif, heic)
        path: PathBuf,
    },

    /// Reconcile an extraction result JSON produced elsewhere (no network)
    #[command(after_help = "\
Input is a JSON object:
  {\"trackingNumber\": \"TNT123\", \"carrier\": \"GLS\", \"sender\": \"ACME\", \"status\": \"READY_FOR_PICKUP\"}
or null (nothing found).

Examples:
  parcels apply result.json
  echo '{\"trackingNumber\":\"TNT123\"}' | parcels apply - --source 'sms from GLS'")]
    Apply {
        /// Result file, or - to read stdin
        file: String,

        /// Text stored as the package's original text
        #[arg(long, default_value = "manual entry")]
        source: String,
    },

    /// List tracked packages (current view by default)
    List {
        /// Show picked-up packages instead
        #[arg(long, conflicts_with = "all")]
        history: bool,

        /// Show every package
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle a package between picked up and ready for pickup
    Toggle {
        /// Package id or unique id prefix
        id: String,
    },

    /// Delete a package
    Delete {
        /// Package id or unique id prefix
        id: String,

        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Delete all locally stored packages
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Run messages from an exported mailbox through extraction
    ImportMail {
        /// Mailbox export (JSON)
        file: PathBuf,

        /// Folder/label to import (default: mail.folderLabel setting)
        #[arg(long)]
        folder: Option<String>,
    },

    /// Check extraction configuration and storage
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Manage extraction API keys in the system keychain
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Store an API key (read from stdin)
    #[command(after_help = "\
On Linux the key is kept in the kernel keyring and does not survive a reboot.
Set PARCELTRACK_<PROVIDER>_KEY in your shell profile for a persistent key.")]
    Set {
        /// Provider name (gemini, openai)
        provider: String,
    },
    /// Remove a stored API key
    Delete {
        /// Provider name (gemini, openai)
        provider: String,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
            "\nstore_format_version: 1",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
            "\nstore_format_version: 1",
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load();
    let data_dir = cli
        .data_dir
        .or_else(|| settings.data_dir.clone())
        .unwrap_or_else(PackageStore::default_dir);
    debug!("data directory: {}", data_dir.display());

    let result = match cli.command {
        Commands::Add { text } => cmd_add(&settings, &data_dir, text),
        Commands::AddImage { path } => cmd_add_image(&settings, &data_dir, path),
        Commands::Apply { file, source } => cmd_apply(&data_dir, file, source),
        Commands::List { history, all, json } => {
            let mode = match (history, all) {
                (_, true) => None,
                (true, false) => Some(ViewMode::History),
                (false, false) => Some(ViewMode::Current),
            };
            cmd_list(&data_dir, mode, json)
        }
        Commands::Toggle { id } => cmd_toggle(&data_dir, id),
        Commands::Delete { id, yes } => cmd_delete(&data_dir, id, yes),
        Commands::Clear { yes } => cmd_clear(&data_dir, yes),
        Commands::ImportMail { file, folder } => {
            let folder = folder.unwrap_or_else(|| settings.mail_folder_label.clone());
            cmd_import_mail(&settings, &data_dir, file, folder)
        }
        Commands::Doctor { json } => cmd_doctor(&settings, &data_dir, json),
        Commands::Key { command } => match command {
            KeyCommands::Set { provider } => cmd_key_set(provider),
            KeyCommands::Delete { provider } => cmd_key_delete(provider),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Create error from a tracker error with proper exit code.
    pub fn tracker(err: TrackerError) -> Self {
        let code = exit_code(&err);
        let hint = match &err {
            TrackerError::Lookup(LookupError::Ambiguous { .. }) => {
                Some("use more characters of the id (see `parcels list --all`)".to_string())
            }
            TrackerError::Lookup(LookupError::NotFound(_)) => {
                Some("run `parcels list --all` to see package ids".to_string())
            }
            TrackerError::ExtractionUnavailable => {
                Some(format!("set extraction.provider in {}", Settings::config_path_display()))
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<TrackerError> for CliError {
    fn from(err: TrackerError) -> Self {
        CliError::tracker(err)
    }
}

// ============================================================================
// Session setup
// ============================================================================

fn open_tracker(data_dir: &Path) -> Tracker {
    Tracker::open(PackageStore::in_dir(data_dir), None)
}

fn open_tracker_with_extraction(settings: &Settings, data_dir: &Path) -> Result<Tracker, CliError> {
    let extractor = build_extractor(settings)?;
    Ok(Tracker::open(PackageStore::in_dir(data_dir), Some(extractor)))
}

fn build_extractor(settings: &Settings) -> Result<Box<dyn Extractor>, CliError> {
    let config = ResolvedExtractionConfig::from_settings(&settings.extraction);

    let flavor = match config.provider {
        ExtractionProvider::None => {
            return Err(CliError::new(EXIT_EXTRACTION_DISABLED, "extraction is disabled")
                .with_hint(format!(
                    "set extraction.provider to \"gemini\" or \"openai\" in {}, or use `parcels apply`",
                    Settings::config_path_display()
                )));
        }
        ExtractionProvider::Gemini => ApiFlavor::Gemini,
        ExtractionProvider::OpenAI => ApiFlavor::OpenAI,
    };

    let Some(api_key) = config.api_key.clone() else {
        let hint = config
            .blocking_reason
            .clone()
            .unwrap_or_else(|| format!("set {}", ai::env_var_name(config.provider_name())));
        return Err(CliError::new(
            EXIT_EXTRACTION_MISSING_KEY,
            format!("no API key for {}", config.provider_name()),
        )
        .with_hint(hint));
    };

    let client = ExtractClient::new(ClientConfig {
        flavor,
        endpoint: config.endpoint.clone(),
        model: config.model.clone(),
        api_key,
        timeout: Duration::from_secs(config.timeout_secs),
    })
    .map_err(|e| CliError::io(e.to_string()))?;

    Ok(Box::new(client))
}

fn read_input(arg: &str) -> Result<String, CliError> {
    if arg == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("cannot read stdin: {}", e)))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(arg).map_err(|e| CliError::args(format!("{}: {}", arg, e)))
    }
}

/// Ask a yes/no question on stderr; anything but y/yes is a no.
fn confirm(question: &str) -> Result<bool, CliError> {
    eprint!("{} [y/N] ", question);
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CliError::io(format!("cannot read stdin: {}", e)))?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn describe(p: &Package) -> String {
    format!("{} {} ({}, {}) from {}", p.short_id(), p.tracking_number, p.carrier, p.status.label(), p.sender)
}

fn report_outcome(tracker: &Tracker, outcome: &Outcome) -> Result<(), CliError> {
    let find = |id: &str| tracker.packages().iter().find(|p| p.id == id);
    match outcome {
        Outcome::Created { id } => {
            if let Some(p) = find(id) {
                println!("added   {}", describe(p));
            }
            Ok(())
        }
        Outcome::Updated { id } => {
            if let Some(p) = find(id) {
                println!("updated {}", describe(p));
            }
            Ok(())
        }
        Outcome::Rejected { reason } => Err(rejection(*reason)),
    }
}

fn short_id_of<'a>(tracker: &'a Tracker, id: &'a str) -> &'a str {
    tracker
        .packages()
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.short_id())
        .unwrap_or(id)
}

fn rejection(reason: RejectReason) -> CliError {
    let hint = match reason {
        RejectReason::NoResult => "the input did not look like a delivery notification",
        RejectReason::MissingTrackingNumber => "no tracking number was found in the input",
    };
    CliError::new(EXIT_REJECTED, "could not find package data").with_hint(hint)
}

// ============================================================================
// add / add-image / apply
// ============================================================================

fn cmd_add(settings: &Settings, data_dir: &Path, text: String) -> Result<(), CliError> {
    let text = if text == "-" { read_input("-")? } else { text };
    if text.trim().is_empty() {
        return Err(CliError::args("nothing to add: text is empty"));
    }

    let mut tracker = open_tracker_with_extraction(settings, data_dir)?;
    let outcome = tracker.submit_text(&text)?;
    report_outcome(&tracker, &outcome)
}

/// Mime type for a screenshot, from its extension.
fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

fn cmd_add_image(settings: &Settings, data_dir: &Path, path: PathBuf) -> Result<(), CliError> {
    let mime_type = image_mime_type(&path).ok_or_else(|| {
        CliError::args(format!("unsupported image type: {}", path.display()))
            .with_hint("supported: png, jpg, jpeg, webp, gif, heic")
    })?;
    let bytes = std::fs::read(&path).map_err(|e| CliError::args(format!("{}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let mut tracker = open_tracker_with_extraction(settings, data_dir)?;
    let outcome = tracker.submit_image(&bytes, mime_type, &file_name)?;
    report_outcome(&tracker, &outcome)
}

fn cmd_apply(data_dir: &Path, file: String, source: String) -> Result<(), CliError> {
    let input = read_input(&file)?;
    let result = parse_external_result(&input)?;

    let mut tracker = open_tracker(data_dir);
    let outcome = tracker.apply_result(result, &source)?;
    report_outcome(&tracker, &outcome)
}

/// Lenient parse of an externally produced result. Fields get the same
/// defaults as extraction replies: unknown carrier is Other, unknown status is
/// InTransit. `null` means nothing was found.
fn parse_external_result(input: &str) -> Result<Option<ParseResult>, CliError> {
    match parse_reply(input) {
        Ok(result) => Ok(Some(result)),
        Err(ExtractError::NoData) => Ok(None),
        Err(e) => Err(CliError::args(format!("invalid extraction result: {}", e))),
    }
}

// ============================================================================
// list
// ============================================================================

fn cmd_list(data_dir: &Path, mode: Option<ViewMode>, json: bool) -> Result<(), CliError> {
    let tracker = open_tracker(data_dir);
    let packages: Vec<&Package> = match mode {
        Some(mode) => tracker.view(mode),
        None => tracker.packages().iter().collect(),
    };
    let view_name = mode.map(|m| m.title()).unwrap_or("All");
    let summary = CollectionSummary::from_packages(tracker.packages());

    if json {
        let output = serde_json::json!({
            "schema_version": 1,
            "view": view_name.to_lowercase(),
            "count": packages.len(),
            "packages": packages,
            "summary": summary,
        });
        let text = serde_json::to_string_pretty(&output).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let write_err = |e: io::Error| CliError::io(e.to_string());

    if packages.is_empty() {
        writeln!(out, "{}: no packages", view_name).map_err(write_err)?;
    } else {
        writeln!(
            out,
            "{:<8}  {:<16}  {:<8}  {:<24}  {:<20}  {}",
            "ID", "STATUS", "CARRIER", "TRACKING", "SENDER", "RECEIVED"
        )
        .map_err(write_err)?;
        for p in &packages {
            writeln!(
                out,
                "{:<8}  {:<16}  {:<8}  {:<24}  {:<20}  {}",
                p.short_id(),
                p.status.label(),
                p.carrier.name(),
                p.tracking_number,
                p.sender,
                p.received_date.format("%Y-%m-%d"),
            )
            .map_err(write_err)?;
        }
    }

    writeln!(
        out,
        "\n{} package(s): {} in transit, {} ready for pickup, {} picked up",
        summary.total, summary.in_transit, summary.ready_for_pickup, summary.picked_up
    )
    .map_err(write_err)?;

    Ok(())
}

// ============================================================================
// toggle / delete / clear
// ============================================================================

fn cmd_toggle(data_dir: &Path, id: String) -> Result<(), CliError> {
    let mut tracker = open_tracker(data_dir);
    let (id, status) = tracker.toggle(&id)?;
    if let Some(p) = tracker.packages().iter().find(|p| p.id == id) {
        println!("{} {} is now {}", p.short_id(), p.tracking_number, status.label());
    }
    Ok(())
}

fn cmd_delete(data_dir: &Path, id: String, yes: bool) -> Result<(), CliError> {
    let mut tracker = open_tracker(data_dir);
    let target = tracker.find(&id)?;

    if !yes && !confirm(&format!("Delete {}?", describe(target)))? {
        return Err(CliError::new(EXIT_USAGE, "not deleted"));
    }

    let removed = tracker.delete(&id)?;
    println!("deleted {}", describe(&removed));
    Ok(())
}

fn cmd_clear(data_dir: &Path, yes: bool) -> Result<(), CliError> {
    let mut tracker = open_tracker(data_dir);
    let count = tracker.packages().len();

    if !yes && !confirm(&format!("Delete all {} package(s)? This cannot be undone.", count))? {
        return Err(CliError::new(EXIT_USAGE, "nothing cleared"));
    }

    let cleared = tracker.clear()?;
    println!("cleared {} package(s) from {}", cleared, tracker.store().path().display());
    Ok(())
}

// ============================================================================
// import-mail
// ============================================================================

fn cmd_import_mail(settings: &Settings, data_dir: &Path, file: PathBuf, folder: String) -> Result<(), CliError> {
    let mailbox = ExportedMailbox::new(file);
    let token = mailbox
        .obtain_access_token()
        .map_err(|e| CliError::args(e.to_string()))?;
    let messages = mailbox
        .list_candidate_messages(&token, &folder)
        .map_err(|e| CliError::args(format!("{}: {}", mailbox.path().display(), e)))?;

    if messages.is_empty() {
        println!("no messages in folder \"{}\"", folder);
        return Ok(());
    }

    let mut tracker = open_tracker_with_extraction(settings, data_dir)?;
    let (mut created, mut updated, mut skipped) = (0usize, 0usize, 0usize);
    let total = messages.len();

    for (i, msg) in messages.iter().enumerate() {
        let outcome = tracker.submit_text(&msg.extraction_text())?;
        let line = match &outcome {
            Outcome::Created { id } => {
                created += 1;
                format!("added {}", short_id_of(&tracker, id))
            }
            Outcome::Updated { id } => {
                updated += 1;
                format!("updated {}", short_id_of(&tracker, id))
            }
            Outcome::Rejected { reason } => {
                skipped += 1;
                warn!("message \"{}\" skipped: {}", msg.subject, reason);
                format!("skipped ({})", reason)
            }
        };
        println!("[{}/{}] {}: {}", i + 1, total, msg.subject, line);
    }

    println!("\n{} added, {} updated, {} skipped", created, updated, skipped);
    Ok(())
}

// ============================================================================
// doctor
// ============================================================================

fn cmd_doctor(settings: &Settings, data_dir: &Path, json: bool) -> Result<(), CliError> {
    let config = ResolvedExtractionConfig::from_settings(&settings.extraction);
    let store = PackageStore::in_dir(data_dir);
    let package_count = store.load().len();
    let keychain = ai::keychain_available();

    if json {
        let output = serde_json::json!({
            "schema_version": 1,
            "config_path": Settings::config_path_display(),
            "extraction": {
                "status": config.status.as_str(),
                "blocking_reason": config.blocking_reason,
                "provider": config.provider_name(),
                "model": config.model,
                "endpoint": config.endpoint,
                "timeout_secs": config.timeout_secs,
                "key": if config.api_key.is_some() { "present" } else { "missing" },
                "key_source": config.key_source.as_str(),
                "keychain": if keychain { "ok" } else { "unavailable" },
            },
            "storage": {
                "path": store.path().display().to_string(),
                "exists": store.path().exists(),
                "packages": package_count,
            },
            "mail": {
                "folder_label": settings.mail_folder_label,
            },
        });
        let text = serde_json::to_string_pretty(&output).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}", config);
    println!("keychain:        {}", if keychain { "ok" } else { "unavailable" });
    println!();
    println!("Storage");
    println!("──────────────────────────────");
    println!("path:            {}", store.path().display());
    println!("packages:        {}", package_count);
    println!("settings:        {}", Settings::config_path_display());
    println!("mail folder:     {}", settings.mail_folder_label);

    match config.status {
        ExtractionConfigStatus::Disabled => {
            println!();
            println!("Extraction is disabled. To enable:");
            println!("  Set extraction.provider in {}", Settings::config_path_display());
            println!("  `parcels apply` works without extraction");
        }
        ExtractionConfigStatus::MissingKey => {
            println!();
            println!(
                "Fix: run `parcels key set {}` or set {}",
                config.provider_name(),
                ai::env_var_name(config.provider_name())
            );
        }
        ExtractionConfigStatus::Ready => {}
    }

    Ok(())
}

// ============================================================================
// key
// ============================================================================

fn parse_provider(name: &str) -> Result<ExtractionProvider, CliError> {
    match ExtractionProvider::from_name(name) {
        Some(p) if p.is_enabled() => Ok(p),
        _ => Err(CliError::args(format!("unknown provider: {}", name)).with_hint("use gemini or openai")),
    }
}

fn cmd_key_set(provider: String) -> Result<(), CliError> {
    let provider = parse_provider(&provider)?;
    let key = read_input("-")?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::args("no key on stdin"));
    }

    ai::set_api_key(provider.name(), key).map_err(|e| {
        CliError::new(EXIT_KEYCHAIN, e).with_hint(format!(
            "set {} instead",
            ai::env_var_name(provider.name())
        ))
    })?;
    println!("stored {} key in keychain", provider.name());
    Ok(())
}

fn cmd_key_delete(provider: String) -> Result<(), CliError> {
    let provider = parse_provider(&provider)?;
    ai::delete_api_key(provider.name()).map_err(|e| CliError::new(EXIT_KEYCHAIN, e))?;
    println!("removed {} key from keychain", provider.name());
    Ok(())
}
