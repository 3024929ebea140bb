//! Debounced undo/redo history for the compose form

mod debounce;
mod manager;

pub use debounce::Debouncer;
pub use manager::EditHistoryManager;
