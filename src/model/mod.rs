pub mod config;
pub mod note;
pub mod notebook;

pub use config::*;
pub use note::*;
pub use notebook::*;
