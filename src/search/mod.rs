//! Tag search: substring matching, category filtering and popularity ranking

pub mod engine;

pub use engine::{compare_rank, matches_term, CategoryFilter, SearchEngine};
