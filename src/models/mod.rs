pub mod file;

pub use file::{FileRecord, FileSubmission, FileType, Metadata, Technology};
