pub mod action;
pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod storage;
pub mod task;
pub mod tracker;

pub use action::Action;
pub use collection::{ActionList, SortOrder, TaskList};
pub use error::{Result, TrackerError};
pub use storage::Storage;
pub use task::{Task, TaskChanges};
pub use tracker::{RunOutcome, Tracker};
