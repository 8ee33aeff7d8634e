pub mod anfrage_dto;

pub use anfrage_dto::*;
