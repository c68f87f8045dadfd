#![allow(clippy::missing_docs_in_private_items)]

pub mod pipeline;
pub mod tagger;
pub mod wikipedia;

pub use pipeline::{LearnOutcome, LearnPipeline, LearnStatus};
