use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the low-level file move helpers
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Remove failed: {0}")]
    RemoveFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a [`crate::core::mover::Mover`]
#[derive(Debug, Error)]
pub enum MoverError {
    #[error("Folder does not exist: {0}")]
    FolderNotFound(PathBuf),

    #[error("Path is not a folder: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Target folder does not exist: {0}")]
    TargetFolderNotFound(PathBuf),

    #[error("Got {paths} image paths but {labels} labels")]
    LengthMismatch { paths: usize, labels: usize },

    #[error("Invalid label name: {0:?}")]
    InvalidLabel(String),

    #[error("Mover rejected the request")]
    Rejected,

    #[error("File operation failed: {0}")]
    FileOp(#[from] FileOpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MoverError {
    /// Map an I/O error on `path` to the closest listing error
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => MoverError::FolderNotFound(path),
            std::io::ErrorKind::PermissionDenied => MoverError::PermissionDenied(path),
            _ => MoverError::Io(error),
        }
    }
}

/// Errors surfaced by the classification committer
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Select at least one image to classify")]
    NothingSelected,

    #[error("No target folder is set")]
    NoTargetFolder,

    #[error("There is no file move to undo")]
    NothingToUndo,

    #[error("Another file operation is still running")]
    Busy,

    #[error(transparent)]
    Mover(#[from] MoverError),
}

impl ClassifyError {
    /// True for conditions caused by user input, detected before any mover call
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ClassifyError::Mover(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_classified() {
        assert!(ClassifyError::NothingSelected.is_user_error());
        assert!(ClassifyError::NoTargetFolder.is_user_error());
        assert!(ClassifyError::NothingToUndo.is_user_error());
        assert!(ClassifyError::Busy.is_user_error());
        assert!(!ClassifyError::Mover(MoverError::Rejected).is_user_error());
    }

    #[test]
    fn test_from_io_maps_kinds() {
        let path = PathBuf::from("/missing");
        let err = MoverError::from_io(
            path.clone(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, MoverError::FolderNotFound(p) if p == path));

        let err = MoverError::from_io(
            path.clone(),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no"),
        );
        assert!(matches!(err, MoverError::PermissionDenied(_)));
    }
}
