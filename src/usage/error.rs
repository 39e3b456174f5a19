use std::path::PathBuf;

/// Errors raised while writing or scanning the usage log
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Usage log I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode usage row: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed usage log row{}: {reason}", .line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    MalformedRow { line: Option<u64>, reason: String },

    #[error("Usage log header does not match expected columns, found: {found}")]
    SchemaMismatch { found: String },
}
