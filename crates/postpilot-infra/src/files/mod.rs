//! Uploaded image storage.

mod local;
mod sanitize;

pub use local::LocalFileStore;
pub use sanitize::secure_filename;
