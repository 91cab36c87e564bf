use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::labels::{LabelId, LabelSet};

/// One listed image. Identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub path: String,
    pub filename: String,
}

impl ImageRef {
    pub fn new(path: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
        }
    }
}

/// Classification state of a single image on the current page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelState {
    #[default]
    Unclassified,
    Assigned(LabelId),
}

impl LabelState {
    pub fn is_assigned(&self) -> bool {
        matches!(self, LabelState::Assigned(_))
    }

    /// Numeric view: 0 is unclassified, `k` is the label at position `k - 1`.
    /// Assignments to labels no longer in the set read as 0.
    pub fn index_in(&self, labels: &LabelSet) -> usize {
        match self {
            LabelState::Unclassified => 0,
            LabelState::Assigned(id) => labels.position(id).map(|p| p + 1).unwrap_or(0),
        }
    }

    /// Inverse of [`LabelState::index_in`]; out-of-range indices are unclassified
    pub fn from_index(index: usize, labels: &LabelSet) -> Self {
        match index.checked_sub(1).and_then(|p| labels.at(p)) {
            Some(label) => LabelState::Assigned(label.id.clone()),
            None => LabelState::Unclassified,
        }
    }
}

/// Click direction on a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Grid dimensions that decide the page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub cols: usize,
    pub rows: usize,
}

impl GridSize {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    pub fn capacity(&self) -> usize {
        self.cols * self.rows
    }
}

/// Step a numeric label state one click.
///
/// There are `label_count + 1` states: 0 (unclassified) and one per label.
/// With no labels the state is returned unchanged.
pub fn cycle_state(current: usize, direction: Direction, label_count: usize) -> usize {
    if label_count == 0 {
        return current;
    }
    let states = label_count + 1;
    let current = current % states;
    match direction {
        Direction::Forward => (current + 1) % states,
        Direction::Backward => {
            if current == 0 {
                label_count
            } else {
                current - 1
            }
        }
    }
}

/// Owned copy of the page taken when a commit starts
#[derive(Debug, Clone, Default)]
pub struct BatchSnapshot {
    pub page: Vec<ImageRef>,
    pub states: HashMap<String, LabelState>,
    pub remaining: Vec<ImageRef>,
}

/// Splits the image listing into grid-sized pages and tracks per-image labels
/// for the page on screen.
#[derive(Debug, Default)]
pub struct BatchManager {
    page: Vec<ImageRef>,
    remaining: Vec<ImageRef>,
    states: HashMap<String, LabelState>,
}

impl BatchManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next page from the front of `images`; the rest becomes the
    /// remaining queue. Every page image starts unclassified.
    pub fn load_next_batch(&mut self, mut images: Vec<ImageRef>, grid: GridSize) {
        let batch_size = grid.capacity().min(images.len());
        let remaining = images.split_off(batch_size);

        self.states = images
            .iter()
            .map(|image| (image.path.clone(), LabelState::Unclassified))
            .collect();
        self.page = images;
        self.remaining = remaining;

        debug!(
            "Loaded page of {} images, {} remaining",
            self.page.len(),
            self.remaining.len()
        );
    }

    /// Advance the label of `path` by one click and return the new numeric state.
    /// Paths without an entry are treated as unclassified.
    pub fn toggle_image_state(
        &mut self,
        path: &str,
        direction: Direction,
        labels: &LabelSet,
    ) -> usize {
        let current = self
            .states
            .get(path)
            .map(|state| state.index_in(labels))
            .unwrap_or(0);
        if labels.is_empty() {
            return current;
        }
        let next = cycle_state(current, direction, labels.len());
        self.states
            .insert(path.to_string(), LabelState::from_index(next, labels));
        next
    }

    /// Overwrite the state of `path` without validation
    pub fn set_image_state(&mut self, path: &str, state: LabelState) {
        self.states.insert(path.to_string(), state);
    }

    pub fn clear_batch(&mut self) {
        self.page.clear();
        self.remaining.clear();
        self.states.clear();
    }

    /// Drop assignments to labels that no longer exist. Returns how many were reset.
    pub fn reconcile_labels(&mut self, labels: &LabelSet) -> usize {
        let mut reset = 0;
        for state in self.states.values_mut() {
            if let LabelState::Assigned(id) = state {
                if !labels.contains(id) {
                    *state = LabelState::Unclassified;
                    reset += 1;
                }
            }
        }
        if reset > 0 {
            debug!("Reset {} image states after label change", reset);
        }
        reset
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot {
            page: self.page.clone(),
            states: self.states.clone(),
            remaining: self.remaining.clone(),
        }
    }

    pub fn page(&self) -> &[ImageRef] {
        &self.page
    }

    pub fn remaining(&self) -> &[ImageRef] {
        &self.remaining
    }

    pub fn state(&self, path: &str) -> Option<&LabelState> {
        self.states.get(path)
    }

    pub fn states(&self) -> &HashMap<String, LabelState> {
        &self.states
    }

    pub fn assigned_count(&self) -> usize {
        self.states.values().filter(|s| s.is_assigned()).count()
    }
}
