use std::path::PathBuf;

use thiserror::Error;

/// Hard failures surfaced by the metadata reader.
#[derive(Error, Debug)]
pub enum BdmtError {
    /// The descriptor path handed to [`crate::MetadataFile::new`] does not
    /// exist.
    #[error("BDMT file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, BdmtError>;

/// Why a descriptor could not be read. Never leaves the crate; every variant
/// collapses to "no title".
#[derive(Error, Debug)]
pub(crate) enum ParseFailure {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
}
