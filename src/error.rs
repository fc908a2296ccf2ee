use thiserror::Error;

/// Error taxonomy surfaced by this crate (spec ss7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A buffer length is inconsistent with the stated width/height, or a
    /// calibration frame differs in shape from the light frame it applies to.
    #[error("dimension mismatch: expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An operation was requested without a precondition it depends on
    /// (e.g. star detection with no global location/scale stats, or an
    /// aligner built from too few reference stars).
    #[error("missing precondition: {0}")]
    MissingPrecondition(String),

    /// Three alignment points were collinear; the affine system is singular.
    ///
    /// Recovered locally inside the aligner by skipping the candidate match;
    /// only escapes to the caller if it folds into `NoAlignment`.
    #[error("three alignment points are collinear")]
    NumericallySingular,

    /// No candidate triangle match produced a transform with residual below
    /// the acceptance sentinel.
    #[error("no candidate alignment produced an acceptable transform")]
    NoAlignment,
}

pub type Result<T> = std::result::Result<T, CoreError>;
