mod document;

pub use document::{Document, DokumentArt};
