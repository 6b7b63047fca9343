mod error;
mod library;
mod persist;

pub use error::StoreError;
pub use library::TriviaStore;
pub use persist::{read_snapshot, write_snapshot, Snapshot};
