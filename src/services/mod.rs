pub mod blob;
pub mod media;
pub mod metadata;
pub mod preview;
pub mod upload;
