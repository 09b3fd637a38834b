use thiserror::Error;

/// Error taxonomy for the derivation pipeline.
///
/// `SourceNotFound` and `SchemaMismatch` are data-availability problems and
/// are contained at the per-measure derivation boundary: the affected
/// measure is omitted from the output and the pipeline continues.
/// `ReducerConfiguration` is a programming defect in the measure catalog and
/// aborts at registry-load time.
#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("source file not found: {file}")]
    SourceNotFound { file: String },

    #[error("{file}: required column {column} is missing")]
    SchemaMismatch { file: String, column: String },

    #[error("{file}: {detail}")]
    Read { file: String, detail: String },

    #[error("measure {measure}: {detail}")]
    ReducerConfiguration { measure: String, detail: String },

    #[error("duplicate score for participant {participant}, visit {visit}, test {test}")]
    DuplicateKey {
        participant: i64,
        visit: String,
        test: String,
    },

    #[error("unknown measure: {name}")]
    UnknownMeasure { name: String },

    #[error("table error: {0}")]
    Table(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeriveError {
    /// True for errors that degrade to "measure omitted from output" rather
    /// than aborting the pipeline.
    pub fn is_containable(&self) -> bool {
        matches!(
            self,
            DeriveError::SourceNotFound { .. } | DeriveError::SchemaMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DeriveError>;
