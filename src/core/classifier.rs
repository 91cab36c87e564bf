use std::path::Path;
use tracing::{debug, info, warn};

use super::batch::{BatchSnapshot, ImageRef, LabelState};
use super::error::{ClassifyError, MoverError};
use super::labels::LabelSet;
use super::mover::{
    MoveRecord, Mover, RelocateRequest, RelocateResponse, ReverseRequest, ReverseResponse,
};

/// A commit that has been sent to the mover and not yet finished
#[derive(Debug, Clone)]
pub struct ClassifyTicket {
    pub request: RelocateRequest,
    remaining: Vec<ImageRef>,
}

impl ClassifyTicket {
    pub fn classified(&self) -> usize {
        self.request.image_paths.len()
    }
}

/// An undo that has been sent to the mover and not yet finished
#[derive(Debug, Clone)]
pub struct UndoTicket {
    pub request: ReverseRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyOutcome {
    pub classified: usize,
    pub moved: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    /// Number of recorded moves sent back
    pub requested: usize,
    /// Number of files the mover reports as restored
    pub restored: usize,
}

/// Turns the labeled page into a relocate request and keeps one level of undo.
///
/// At most one commit or undo is in flight at a time; `begin_*` sets the guard
/// and `finish_*` always clears it.
#[derive(Debug, Default)]
pub struct ClassificationCommitter {
    total_processed: usize,
    last_moves: Option<Vec<MoveRecord>>,
    in_flight: bool,
}

impl ClassificationCommitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the snapshot and build the relocate request. No mover call is
    /// made here.
    pub fn begin_classify(
        &mut self,
        snapshot: BatchSnapshot,
        labels: &LabelSet,
        target_folder: Option<&Path>,
    ) -> Result<ClassifyTicket, ClassifyError> {
        if self.in_flight {
            return Err(ClassifyError::Busy);
        }

        let mut image_paths = Vec::new();
        let mut label_names = Vec::new();
        for image in &snapshot.page {
            let Some(LabelState::Assigned(id)) = snapshot.states.get(&image.path) else {
                continue;
            };
            match labels.get(id) {
                Some(label) => {
                    image_paths.push(image.path.clone());
                    label_names.push(label.name.clone());
                }
                None => warn!("Ignoring {} assigned to unknown label {}", image.path, id),
            }
        }

        if image_paths.is_empty() {
            return Err(ClassifyError::NothingSelected);
        }
        let Some(target_folder) = target_folder else {
            return Err(ClassifyError::NoTargetFolder);
        };

        self.in_flight = true;
        debug!("Starting commit of {} images", image_paths.len());

        Ok(ClassifyTicket {
            request: RelocateRequest {
                image_paths,
                labels: label_names,
                target_folder: target_folder.to_string_lossy().into_owned(),
            },
            remaining: snapshot.remaining,
        })
    }

    /// Apply the mover's answer. On success the returned moves become the undo
    /// slot and `advance` receives the images not yet shown.
    pub fn finish_classify<F>(
        &mut self,
        ticket: ClassifyTicket,
        result: Result<RelocateResponse, MoverError>,
        advance: F,
    ) -> Result<ClassifyOutcome, ClassifyError>
    where
        F: FnOnce(Vec<ImageRef>),
    {
        self.in_flight = false;

        let response = result?;
        if !response.success {
            return Err(MoverError::Rejected.into());
        }

        let classified = ticket.classified();
        let moved = response.moved_files.len();
        self.last_moves = Some(response.moved_files);
        self.total_processed += classified;
        info!(
            "Committed {} images ({} moved), total processed {}",
            classified, moved, self.total_processed
        );

        advance(ticket.remaining);
        Ok(ClassifyOutcome { classified, moved })
    }

    /// Commit synchronously through `mover`
    #[cfg(test)]
    pub fn classify<F>(
        &mut self,
        snapshot: BatchSnapshot,
        labels: &LabelSet,
        target_folder: Option<&Path>,
        mover: &dyn Mover,
        advance: F,
    ) -> Result<ClassifyOutcome, ClassifyError>
    where
        F: FnOnce(Vec<ImageRef>),
    {
        let ticket = self.begin_classify(snapshot, labels, target_folder)?;
        let result = mover.relocate(&ticket.request);
        self.finish_classify(ticket, result, advance)
    }

    pub fn begin_undo(&mut self) -> Result<UndoTicket, ClassifyError> {
        if self.in_flight {
            return Err(ClassifyError::Busy);
        }
        let moved_files = match &self.last_moves {
            Some(moves) if !moves.is_empty() => moves.clone(),
            _ => return Err(ClassifyError::NothingToUndo),
        };

        self.in_flight = true;
        Ok(UndoTicket {
            request: ReverseRequest { moved_files },
        })
    }

    /// Apply the mover's answer to an undo. The counter drops by the number of
    /// recorded moves, not by the number the mover reports as restored.
    pub fn finish_undo<F>(
        &mut self,
        ticket: UndoTicket,
        result: Result<ReverseResponse, MoverError>,
        on_complete: F,
    ) -> Result<UndoOutcome, ClassifyError>
    where
        F: FnOnce(),
    {
        self.in_flight = false;

        let response = result?;
        if !response.success {
            return Err(MoverError::Rejected.into());
        }

        let requested = ticket.request.moved_files.len();
        let restored = response.restored_files.len();
        if restored != requested {
            warn!(
                "Undo restored {} of {} recorded moves",
                restored, requested
            );
        }

        self.last_moves = None;
        self.total_processed = self.total_processed.saturating_sub(requested);
        info!(
            "Undid {} moves, total processed {}",
            requested, self.total_processed
        );

        on_complete();
        Ok(UndoOutcome {
            requested,
            restored,
        })
    }

    /// Undo the last commit synchronously through `mover`
    #[cfg(test)]
    pub fn undo<F>(&mut self, mover: &dyn Mover, on_complete: F) -> Result<UndoOutcome, ClassifyError>
    where
        F: FnOnce(),
    {
        let ticket = self.begin_undo()?;
        let result = mover.reverse_relocate(&ticket.request);
        self.finish_undo(ticket, result, on_complete)
    }

    pub fn total_processed(&self) -> usize {
        self.total_processed
    }

    #[cfg(test)]
    pub fn last_moves(&self) -> Option<&[MoveRecord]> {
        self.last_moves.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        !self.in_flight && self.last_moves.as_ref().is_some_and(|m| !m.is_empty())
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Forget the counter and undo slot, e.g. when a different folder is opened
    pub fn reset_progress(&mut self) {
        self.total_processed = 0;
        self.last_moves = None;
    }
}
