pub mod export;
pub mod note_ops;
pub mod search;
pub mod selection;
pub mod session;
pub mod sync;
