pub mod anfrage_handler;

pub use anfrage_handler::*;
