//! Single-file archive format for a [`Song`](loopgrid_model::Song): a zip
//! container holding a `metadata.ini` text entry plus one float WAV entry
//! per pooled audio buffer, entries named by sanitized basename.

mod load;
mod save;

pub use load::load;
pub use save::{save, save_to};

use loopgrid_model::SongError;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("no file bound to song")]
    NoFileBound,

    #[error("archive has no metadata.ini entry")]
    MissingMetadata,

    #[error("malformed metadata: {0}")]
    Parse(String),

    #[error("section [{section}] is missing required field '{field}'")]
    MissingField { section: String, field: String },

    #[error("metadata references audio entry '{0}' not present in the archive")]
    MissingAudioEntry(String),

    #[error("failed to decode audio entry '{name}': {source}")]
    UnsupportedAudio {
        name: String,
        source: anyhow::Error,
    },

    #[error("failed to encode audio entry '{name}': {source}")]
    AudioEncode {
        name: String,
        source: anyhow::Error,
    },

    #[error(transparent)]
    Song(#[from] SongError),
}
