mod anfrage;
mod details;

pub use anfrage::{Anfrage, AnfrageStatus, AnfrageTyp, DokumentRef};
pub use details::{
    AnfrageDetails, BussgeldDetails, KfzGutachtenDetails, VerkehrsunfallDetails,
};
