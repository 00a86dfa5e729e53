pub mod ranking;
pub mod summary;
