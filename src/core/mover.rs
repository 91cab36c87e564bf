use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::batch::ImageRef;
use super::error::MoverError;
use super::operations::{self, file_ops};

/// One file relocated by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub source: String,
    pub destination: String,
}

/// One file moved back by an undo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredFile {
    pub from: String,
    pub to: String,
}

/// `labels[i]` is the label for `image_paths[i]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocateRequest {
    pub image_paths: Vec<String>,
    pub labels: Vec<String>,
    pub target_folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocateResponse {
    pub success: bool,
    /// May hold fewer entries than requested when images were skipped
    pub moved_files: Vec<MoveRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseRequest {
    pub moved_files: Vec<MoveRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseResponse {
    pub success: bool,
    pub restored_files: Vec<RestoredFile>,
}

/// The collaborator that lists folders and moves files on disk
pub trait Mover: Send + Sync {
    fn list_images(&self, folder: &Path) -> Result<Vec<ImageRef>, MoverError>;

    fn relocate(&self, request: &RelocateRequest) -> Result<RelocateResponse, MoverError>;

    fn reverse_relocate(&self, request: &ReverseRequest) -> Result<ReverseResponse, MoverError>;
}

/// [`Mover`] backed by the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMover;

impl LocalMover {
    pub fn new() -> Self {
        Self
    }
}

impl Mover for LocalMover {
    fn list_images(&self, folder: &Path) -> Result<Vec<ImageRef>, MoverError> {
        operations::list_images(folder)
    }

    #[instrument(skip_all, fields(count = request.image_paths.len()))]
    fn relocate(&self, request: &RelocateRequest) -> Result<RelocateResponse, MoverError> {
        if request.image_paths.len() != request.labels.len() {
            return Err(MoverError::LengthMismatch {
                paths: request.image_paths.len(),
                labels: request.labels.len(),
            });
        }
        for label in &request.labels {
            file_ops::validate_label(label)?;
        }

        let target_folder = PathBuf::from(&request.target_folder);
        if !target_folder.is_dir() {
            return Err(MoverError::TargetFolderNotFound(target_folder));
        }

        let mut moved_files = Vec::with_capacity(request.image_paths.len());
        for (image_path, label) in request.image_paths.iter().zip(&request.labels) {
            if let Some(record) =
                file_ops::move_image_to_label_folder(Path::new(image_path), label, &target_folder)?
            {
                moved_files.push(record);
            }
        }

        let skipped = request.image_paths.len() - moved_files.len();
        if skipped > 0 {
            warn!("Skipped {} of {} images", skipped, request.image_paths.len());
        }
        info!("Relocated {} images into {:?}", moved_files.len(), target_folder);

        Ok(RelocateResponse {
            success: true,
            moved_files,
        })
    }

    #[instrument(skip_all, fields(count = request.moved_files.len()))]
    fn reverse_relocate(&self, request: &ReverseRequest) -> Result<ReverseResponse, MoverError> {
        let mut restored_files = Vec::with_capacity(request.moved_files.len());
        for record in &request.moved_files {
            if let Some(restored) = file_ops::restore_file(record)? {
                restored_files.push(restored);
            }
        }

        info!(
            "Restored {} of {} files",
            restored_files.len(),
            request.moved_files.len()
        );

        Ok(ReverseResponse {
            success: true,
            restored_files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TempDir) {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        for name in ["a.png", "b.jpg", "c.jpeg"] {
            fs::write(source.path().join(name), name).unwrap();
        }
        (source, target)
    }

    fn path_of(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_relocate_moves_into_label_folders() {
        let (source, target) = setup();
        let mover = LocalMover::new();

        let response = mover
            .relocate(&RelocateRequest {
                image_paths: vec![path_of(&source, "a.png"), path_of(&source, "b.jpg")],
                labels: vec!["text".into(), "photo".into()],
                target_folder: target.path().to_string_lossy().into_owned(),
            })
            .unwrap();

        assert!(response.success);
        assert_eq!(response.moved_files.len(), 2);
        assert!(target.path().join("text").join("a.png").exists());
        assert!(target.path().join("photo").join("b.jpg").exists());
        assert!(!source.path().join("a.png").exists());

        let listing = mover.list_images(source.path()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].filename, "c.jpeg");
    }

    #[test]
    fn test_relocate_reports_only_moved_files() {
        let (source, target) = setup();
        let mover = LocalMover::new();

        let response = mover
            .relocate(&RelocateRequest {
                image_paths: vec![path_of(&source, "a.png"), path_of(&source, "ghost.png")],
                labels: vec!["x".into(), "x".into()],
                target_folder: target.path().to_string_lossy().into_owned(),
            })
            .unwrap();

        assert_eq!(response.moved_files.len(), 1);
        assert_eq!(response.moved_files[0].source, path_of(&source, "a.png"));
    }

    #[test]
    fn test_relocate_validates_request() {
        let (source, target) = setup();
        let mover = LocalMover::new();
        let target_folder = target.path().to_string_lossy().into_owned();

        let mismatch = mover.relocate(&RelocateRequest {
            image_paths: vec![path_of(&source, "a.png")],
            labels: vec![],
            target_folder: target_folder.clone(),
        });
        assert!(matches!(
            mismatch,
            Err(MoverError::LengthMismatch { paths: 1, labels: 0 })
        ));

        let escaping = mover.relocate(&RelocateRequest {
            image_paths: vec![path_of(&source, "a.png")],
            labels: vec!["..".into()],
            target_folder,
        });
        assert!(matches!(escaping, Err(MoverError::InvalidLabel(_))));

        let missing_target = mover.relocate(&RelocateRequest {
            image_paths: vec![path_of(&source, "a.png")],
            labels: vec!["x".into()],
            target_folder: path_of(&target, "missing"),
        });
        assert!(matches!(
            missing_target,
            Err(MoverError::TargetFolderNotFound(_))
        ));
        assert!(source.path().join("a.png").exists());
    }

    #[test]
    fn test_reverse_relocate_restores_files() {
        let (source, target) = setup();
        let mover = LocalMover::new();
        let moved = mover
            .relocate(&RelocateRequest {
                image_paths: vec![path_of(&source, "a.png"), path_of(&source, "b.jpg")],
                labels: vec!["x".into(), "y".into()],
                target_folder: target.path().to_string_lossy().into_owned(),
            })
            .unwrap()
            .moved_files;

        // Someone deletes one of the moved files before undo
        fs::remove_file(&moved[1].destination).unwrap();

        let response = mover
            .reverse_relocate(&ReverseRequest {
                moved_files: moved.clone(),
            })
            .unwrap();

        assert!(response.success);
        assert_eq!(response.restored_files.len(), 1);
        assert_eq!(response.restored_files[0].to, moved[0].source);
        assert!(source.path().join("a.png").exists());
    }

    #[test]
    fn test_wire_format_field_names() {
        let json = serde_json::to_value(RelocateResponse {
            success: true,
            moved_files: vec![MoveRecord {
                source: "/a.png".into(),
                destination: "/x/a.png".into(),
            }],
        })
        .unwrap();
        assert_eq!(json["moved_files"][0]["destination"], "/x/a.png");

        let restored: ReverseResponse = serde_json::from_str(
            r#"{"success":true,"restored_files":[{"from":"/x/a.png","to":"/a.png"}]}"#,
        )
        .unwrap();
        assert_eq!(restored.restored_files[0].to, "/a.png");
    }
}
