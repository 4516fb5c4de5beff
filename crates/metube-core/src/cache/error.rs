use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Subscription cache not found at {}; run with --reload-subs first", .0.display())]
    Missing(PathBuf),

    #[error("Malformed subscription cache at line {line}: {message}")]
    Format { line: u64, message: String },
}
