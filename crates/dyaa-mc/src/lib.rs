#![deny(missing_docs)]
#![doc = "Leading-order Monte Carlo generator for photon-initiated Drell-Yan lepton pairs, filling order- and channel-resolved grids for later PDF convolution."]

/// YAML configuration schema and defaults.
pub mod config;
/// Derived dilepton observables and fiducial cuts.
pub mod cuts;
/// `build_grid` and the `run` entry points.
pub mod driver;
/// The event loop and its summary.
pub mod filler;
/// Mandelstam invariants and phase-space points.
pub mod kinematics;
/// Run manifest serialization helpers.
pub mod manifest;
/// Partonic matrix elements and crossing conventions.
pub mod matrix_element;
/// Hadronic phase-space generation.
pub mod phase_space;
/// Partitioned multi-threaded filling.
pub mod workers;

pub use config::{GridLayout, MassWindow, OutputConfig, RunConfig, SeedPolicy};
pub use cuts::{DerivedObservables, EventFilter, FiducialCuts, Selection};
pub use driver::{build_filler, build_grid, run, run_cancellable, RunOutcome};
pub use filler::{fill_grid, EventOutcome, FillSummary, GridFiller, ScaleChoice};
pub use kinematics::{KinematicPoint, Mandelstam};
pub use manifest::RunManifest;
pub use matrix_element::{Crossing, MatrixElement, PhotonPhotonToLeptons};
pub use phase_space::{hadronic_pspgen, HadronicPhaseSpace, PhaseSpaceGenerator};
pub use workers::{partition_calls, run_partitioned, worker_seed};
