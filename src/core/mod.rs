pub mod batch;
pub mod classifier;
pub mod error;
pub mod labels;
pub mod mover;
pub mod operations;
pub mod session;

pub use batch::{Direction, GridSize, ImageRef, LabelState};
pub use error::{ClassifyError, MoverError};
pub use labels::{Label, LabelId, LabelSet};
pub use mover::{LocalMover, Mover};
pub use session::SortingSession;
