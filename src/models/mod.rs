pub mod drive;
pub mod format;
pub mod volume;
