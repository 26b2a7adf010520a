//! Gloss and reading matching shared by every lookup family.

pub mod keywords;
pub mod matcher;

pub use matcher::{
    best_cantonese, best_english, best_middle_chinese, select_best, Candidate, GlossTarget,
    ENGLISH_SEPARATOR, READING_SEPARATOR,
};
