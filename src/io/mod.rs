pub mod config_io;
pub mod local_store;
pub mod lock;
pub mod notebook_io;
pub mod remote;
pub mod state;
pub mod watcher;
