//! Synthetic T-SQL insert script generation for rowsmith.
//!
//! Reads a table from a schema snapshot, samples parent values for its
//! foreign keys once, and emits a seeded, transactional batch of
//! `INSERT` statements.

pub mod checks;
pub mod engine;
pub mod errors;
pub mod foreign;
pub mod generators;
pub mod literal;
pub mod model;

pub use engine::{BatchComposer, GeneratedScript, GenerationEngine, GenerationOutput};
pub use errors::GenerationError;
pub use foreign::{
    FkValueCache, MemorySampleSource, SampleConnection, SampleQuery, SampleSource,
};
pub use generators::{GeneratedValue, ValueSynthesizer};
pub use model::{GenerationConfig, GenerationReport};
