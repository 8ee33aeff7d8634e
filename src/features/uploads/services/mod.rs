mod upload_service;

pub use upload_service::{IncomingFile, UploadMetadata, UploadService};
