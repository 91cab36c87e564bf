use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::batch::{BatchManager, Direction, GridSize, ImageRef, LabelState};
use super::classifier::{
    ClassificationCommitter, ClassifyOutcome, ClassifyTicket, UndoOutcome, UndoTicket,
};
use super::error::{ClassifyError, MoverError};
use super::labels::LabelSet;
use super::mover::{Mover, RelocateResponse, ReverseResponse};

/// A finished undo plus the result of re-listing the folder afterwards
#[derive(Debug)]
pub struct UndoReport {
    pub outcome: UndoOutcome,
    pub reload: Result<usize, MoverError>,
}

/// The working set for one opened folder: listing, current page and commit
/// bookkeeping. Label clicks are refused while a commit or undo is in flight.
#[derive(Debug, Default)]
pub struct SortingSession {
    folder: Option<PathBuf>,
    total_images: usize,
    batch: BatchManager,
    committer: ClassificationCommitter,
}

impl SortingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// List `folder` and show its first page. On error the previous state is kept.
    #[instrument(skip(self, mover))]
    pub fn open_folder(
        &mut self,
        folder: &Path,
        mover: &dyn Mover,
        grid: GridSize,
    ) -> Result<usize, MoverError> {
        let images = mover.list_images(folder)?;
        let count = images.len();

        self.batch.clear_batch();
        self.committer.reset_progress();
        self.folder = Some(folder.to_path_buf());
        self.total_images = count;
        self.batch.load_next_batch(images, grid);

        info!("Opened {:?} with {} images", folder, count);
        Ok(count)
    }

    /// Re-list the current folder and start again from its first page
    pub fn reload(&mut self, mover: &dyn Mover, grid: GridSize) -> Result<usize, MoverError> {
        let Some(folder) = self.folder.clone() else {
            return Ok(0);
        };
        let images = mover.list_images(&folder)?;
        let count = images.len();

        // Images already committed no longer count towards the total
        self.total_images = count + self.committer.total_processed();
        self.batch.load_next_batch(images, grid);
        Ok(count)
    }

    pub fn close_folder(&mut self) {
        self.folder = None;
        self.total_images = 0;
        self.batch.clear_batch();
        self.committer.reset_progress();
    }

    /// Cycle the label of one image. Returns the new numeric state.
    pub fn toggle(
        &mut self,
        path: &str,
        direction: Direction,
        labels: &LabelSet,
    ) -> Result<usize, ClassifyError> {
        if self.committer.is_busy() {
            return Err(ClassifyError::Busy);
        }
        Ok(self.batch.toggle_image_state(path, direction, labels))
    }

    pub fn set_state(&mut self, path: &str, state: LabelState) -> Result<(), ClassifyError> {
        if self.committer.is_busy() {
            return Err(ClassifyError::Busy);
        }
        self.batch.set_image_state(path, state);
        Ok(())
    }

    /// Drop assignments to labels that were removed from the list
    pub fn apply_labels(&mut self, labels: &LabelSet) -> usize {
        self.batch.reconcile_labels(labels)
    }

    /// Re-page the current listing after the grid size changed. Assignments on
    /// the current page are discarded.
    pub fn regrid(&mut self, grid: GridSize) {
        let mut images = self.batch.page().to_vec();
        images.extend_from_slice(self.batch.remaining());
        self.batch.load_next_batch(images, grid);
    }

    pub fn begin_classify(
        &mut self,
        labels: &LabelSet,
        target_folder: Option<&Path>,
    ) -> Result<ClassifyTicket, ClassifyError> {
        self.committer
            .begin_classify(self.batch.snapshot(), labels, target_folder)
    }

    pub fn finish_classify(
        &mut self,
        ticket: ClassifyTicket,
        result: Result<RelocateResponse, MoverError>,
        grid: GridSize,
    ) -> Result<ClassifyOutcome, ClassifyError> {
        let batch = &mut self.batch;
        self.committer
            .finish_classify(ticket, result, |remaining| {
                batch.load_next_batch(remaining, grid)
            })
    }

    /// Commit synchronously through `mover`
    #[cfg(test)]
    pub fn classify(
        &mut self,
        labels: &LabelSet,
        target_folder: Option<&Path>,
        grid: GridSize,
        mover: &dyn Mover,
    ) -> Result<ClassifyOutcome, ClassifyError> {
        let ticket = self.begin_classify(labels, target_folder)?;
        let result = mover.relocate(&ticket.request);
        self.finish_classify(ticket, result, grid)
    }

    pub fn begin_undo(&mut self) -> Result<UndoTicket, ClassifyError> {
        self.committer.begin_undo()
    }

    /// Finish an undo and re-list the folder, since the restored files are
    /// back in it. A failed re-list does not undo the undo: it is returned in
    /// the report next to the outcome.
    pub fn finish_undo(
        &mut self,
        ticket: UndoTicket,
        result: Result<ReverseResponse, MoverError>,
        mover: &dyn Mover,
        grid: GridSize,
    ) -> Result<UndoReport, ClassifyError> {
        let outcome = self.committer.finish_undo(ticket, result, || {})?;
        let reload = self.reload(mover, grid);
        if let Err(e) = &reload {
            warn!("Undo succeeded but re-listing the folder failed: {}", e);
        }
        Ok(UndoReport { outcome, reload })
    }

    /// Undo synchronously and reload the listing
    #[cfg(test)]
    pub fn undo(&mut self, mover: &dyn Mover, grid: GridSize) -> Result<UndoReport, ClassifyError> {
        let ticket = self.begin_undo()?;
        let result = mover.reverse_relocate(&ticket.request);
        self.finish_undo(ticket, result, mover, grid)
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn page(&self) -> &[ImageRef] {
        self.batch.page()
    }

    pub fn state(&self, path: &str) -> Option<&LabelState> {
        self.batch.state(path)
    }

    pub fn assigned_count(&self) -> usize {
        self.batch.assigned_count()
    }

    pub fn remaining_count(&self) -> usize {
        self.batch.remaining().len()
    }

    pub fn total_images(&self) -> usize {
        self.total_images
    }

    pub fn total_processed(&self) -> usize {
        self.committer.total_processed()
    }

    pub fn can_undo(&self) -> bool {
        self.committer.can_undo()
    }

    pub fn is_busy(&self) -> bool {
        self.committer.is_busy()
    }
}
