// Configuration loading

pub mod ai;
pub mod settings;

pub use ai::{ExtractionConfigStatus, KeySource, ResolvedExtractionConfig};
pub use settings::{ExtractionProvider, ExtractionSettings, Settings};
