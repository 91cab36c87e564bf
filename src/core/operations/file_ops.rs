use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::core::batch::ImageRef;
use crate::core::error::{FileOpError, MoverError};
use crate::core::mover::{MoveRecord, RestoredFile};

/// Result type for file operations
pub type FileOpResult<T> = Result<T, FileOpError>;

/// Extensions the sorter lists and moves (lowercase, without the dot)
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Move a file, falling back to copy + remove when a plain rename fails
/// (for example across drives).
pub fn move_file(src: &Path, dest: &Path) -> FileOpResult<()> {
    debug!("Moving file from {:?} to {:?}", src, dest);

    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }

    if let Err(e) = fs::copy(src, dest) {
        error!("Failed to copy file from {:?} to {:?}: {}", src, dest, e);
        return Err(FileOpError::CopyFailed(format!(
            "Failed to copy from {:?} to {:?}: {}",
            src, dest, e
        )));
    }

    if let Err(e) = fs::remove_file(src) {
        error!("Failed to remove original file {:?} after copy: {}", src, e);
        let _ = fs::remove_file(dest);
        return Err(FileOpError::RemoveFailed(format!(
            "Failed to remove original file {:?}: {}",
            src, e
        )));
    }

    Ok(())
}

/// List the supported images directly inside `folder`, sorted by path
pub fn list_images(folder: &Path) -> Result<Vec<ImageRef>, MoverError> {
    let metadata =
        fs::metadata(folder).map_err(|e| MoverError::from_io(folder.to_path_buf(), e))?;
    if !metadata.is_dir() {
        return Err(MoverError::NotADirectory(folder.to_path_buf()));
    }

    let entries =
        fs::read_dir(folder).map_err(|e| MoverError::from_io(folder.to_path_buf(), e))?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();
    paths.sort();

    let images: Vec<ImageRef> = paths
        .into_iter()
        .map(|path| {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ImageRef::new(path.to_string_lossy().into_owned(), filename)
        })
        .collect();

    info!("Found {} images in {:?}", images.len(), folder);
    Ok(images)
}

/// Reject label names that would escape the target folder
pub fn validate_label(label: &str) -> Result<(), MoverError> {
    let mut components = Path::new(label).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    let has_separator = label.contains('/') || label.contains('\\');
    if label.trim().is_empty() || !single_normal || has_separator {
        return Err(MoverError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

/// First free path of the form `stem.ext`, `stem_1.ext`, `stem_2.ext`, ...
pub fn unique_destination(folder: &Path, filename: &str) -> PathBuf {
    let candidate = folder.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let original = Path::new(filename);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = folder.join(format!("{}_{}{}", stem, counter, suffix));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Move one image into `target/label/`.
///
/// Returns `Ok(None)` when the image is skipped: the source is gone or is not
/// a supported image.
pub fn move_image_to_label_folder(
    image_path: &Path,
    label: &str,
    target_folder: &Path,
) -> Result<Option<MoveRecord>, MoverError> {
    if !image_path.is_file() {
        warn!("Skipping missing image: {:?}", image_path);
        return Ok(None);
    }
    if !is_supported_image(image_path) {
        warn!("Skipping unsupported file: {:?}", image_path);
        return Ok(None);
    }
    if !target_folder.is_dir() {
        return Err(MoverError::TargetFolderNotFound(target_folder.to_path_buf()));
    }

    let label_folder = target_folder.join(label);
    fs::create_dir_all(&label_folder)?;

    let Some(filename) = image_path.file_name().map(|n| n.to_string_lossy().into_owned())
    else {
        return Ok(None);
    };
    let destination = unique_destination(&label_folder, &filename);

    move_file(image_path, &destination)?;
    debug!("Moved {:?} -> {:?}", image_path, destination);

    Ok(Some(MoveRecord {
        source: image_path.to_string_lossy().into_owned(),
        destination: destination.to_string_lossy().into_owned(),
    }))
}

/// Move a previously relocated file back to where it came from.
///
/// Returns `Ok(None)` when the file is no longer at its destination, the
/// original folder is gone, or something already occupies the original path.
pub fn restore_file(record: &MoveRecord) -> FileOpResult<Option<RestoredFile>> {
    let current = Path::new(&record.destination);
    let original = Path::new(&record.source);

    if !current.exists() {
        warn!("Cannot restore, file no longer exists: {:?}", current);
        return Ok(None);
    }
    if !original.parent().is_some_and(|parent| parent.is_dir()) {
        warn!("Cannot restore, original folder is gone: {:?}", original);
        return Ok(None);
    }
    if original.exists() {
        warn!("Cannot restore, original path is occupied: {:?}", original);
        return Ok(None);
    }

    move_file(current, original)?;
    debug!("Restored {:?} -> {:?}", current, original);

    Ok(Some(RestoredFile {
        from: record.destination.clone(),
        to: record.source.clone(),
    }))
}
