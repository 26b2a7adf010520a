//! Fusion of Chinese lexicographic sources into per-sense study cards.
//!
//! A dictionary row is split into senses ([`entry`]), each sense is matched
//! against bilingual, historical and Cantonese sources ([`matching`],
//! [`sources`]) and fused into a [`types::FusedRecord`] ([`fusion`]). Gaps
//! can be filled by batched LLM requests ([`llm`]) whose answers persist in
//! JSON caches ([`cache`]). [`audit`] cross-checks dictionary pinyin against
//! CEDICT to produce correction candidates.

pub mod audit;
pub mod cache;
pub mod config;
pub mod entry;
pub mod fusion;
pub mod llm;
pub mod matching;
pub mod pinyin;
pub mod segment;
pub mod sources;
pub mod types;
