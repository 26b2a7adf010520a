//! Parsing of a dictionary row: header variants, sense splitting and
//! loanword enrichment.

pub mod enrich;
pub mod senses;
pub mod variants;

pub use variants::{CharacterHeader, VariantBreakdown};
