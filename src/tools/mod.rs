mod cpu_monitor;
mod engine;
mod file_scanner;
mod media_classifier;
mod path_validator;
mod timestamp;

pub use cpu_monitor::{CpuMonitor, default_concurrency};
pub use engine::{Engine, FfmpegEngine, ensure_engine_available};
pub use file_scanner::list_files;
pub use media_classifier::{MediaKind, MediaSelection, classify};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use timestamp::{current_run_timestamp, format_duration, run_timestamp};
