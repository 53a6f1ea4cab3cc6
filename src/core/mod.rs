pub mod clock;
pub mod directory;
pub mod log;
pub mod report;
pub mod status;
pub mod summary;
