#![deny(missing_docs)]
#![doc = "Core error taxonomy, deterministic sampling and provenance types for the dyaa generator."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, GenError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RandomSampler, RngHandle, SequenceSampler};
