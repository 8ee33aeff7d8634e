pub mod anfrage_service;

pub use anfrage_service::*;
