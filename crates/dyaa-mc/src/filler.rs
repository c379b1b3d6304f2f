use std::sync::atomic::{AtomicBool, Ordering};

use dyaa_core::{ErrorInfo, GenError, RandomSampler};
use dyaa_grid::{GridAccumulator, Ntuple};
use serde::{Deserialize, Serialize};

use crate::cuts::{DerivedObservables, EventFilter, FiducialCuts, Selection};
use crate::matrix_element::{Crossing, MatrixElement, PhotonPhotonToLeptons};
use crate::phase_space::{HadronicPhaseSpace, PhaseSpaceGenerator};

/// Factorization/renormalization scale assigned to each filled event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScaleChoice {
    /// The same `q2` for every event.
    Fixed {
        /// Scale squared in GeV^2.
        #[serde(default = "default_fixed_q2")]
        q2: f64,
    },
    /// `q2 = mll^2` per event.
    Dynamic,
}

fn default_fixed_q2() -> f64 {
    ScaleChoice::DEFAULT_Q2
}

impl ScaleChoice {
    /// `90^2`, close to the Z mass.
    pub const DEFAULT_Q2: f64 = 8100.0;

    /// Scale for an accepted event.
    pub fn q2(&self, obs: &DerivedObservables) -> f64 {
        match self {
            ScaleChoice::Fixed { q2 } => *q2,
            ScaleChoice::Dynamic => obs.mll * obs.mll,
        }
    }
}

impl Default for ScaleChoice {
    fn default() -> Self {
        ScaleChoice::Fixed {
            q2: Self::DEFAULT_Q2,
        }
    }
}

/// What happened to a single sampled event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    /// The event passed the cuts and carries a finite weight.
    Accepted {
        /// Value binned by the grid, `|yll|`.
        observable: f64,
        /// Kinematics, scale and weight forwarded to the grid.
        ntuple: Ntuple,
    },
    /// Cut away.
    Rejected,
    /// Degenerate kinematics or a non-finite weight.
    Degenerate,
}

/// Counters and weight moments collected while filling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillSummary {
    /// Events processed.
    pub calls: u64,
    /// Call count used to normalize weights (`1 / normalization`).
    pub normalization: u64,
    /// Events forwarded to the grid.
    pub accepted: u64,
    /// Events failing the cuts.
    pub rejected: u64,
    /// Events with degenerate kinematics.
    pub degenerate: u64,
    /// Sum of forwarded weights in pb.
    pub weight_sum: f64,
    /// Sum of squared forwarded weights.
    pub weight_sq_sum: f64,
    /// Whether the loop stopped early on request.
    pub cancelled: bool,
}

impl FillSummary {
    /// Monte Carlo estimate of the fiducial partonic integral and its
    /// statistical error, `sqrt(sum w^2 - (sum w)^2 / N)`.
    pub fn estimate(&self) -> (f64, f64) {
        if self.normalization == 0 {
            return (0.0, 0.0);
        }
        let n = self.normalization as f64;
        let variance = self.weight_sq_sum - self.weight_sum * self.weight_sum / n;
        (self.weight_sum, variance.max(0.0).sqrt())
    }

    /// Fraction of processed events that were forwarded to the grid.
    pub fn acceptance(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.accepted as f64 / self.calls as f64
        }
    }

    /// Adds the counters of a partial run sharing the same normalization.
    pub fn merge(&mut self, other: &FillSummary) {
        self.calls += other.calls;
        self.normalization = self.normalization.max(other.normalization);
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.degenerate += other.degenerate;
        self.weight_sum += other.weight_sum;
        self.weight_sq_sum += other.weight_sq_sum;
        self.cancelled |= other.cancelled;
    }

    fn record(&mut self, outcome: &EventOutcome) {
        self.calls += 1;
        match outcome {
            EventOutcome::Accepted { ntuple, .. } => {
                self.accepted += 1;
                self.weight_sum += ntuple.weight;
                self.weight_sq_sum += ntuple.weight * ntuple.weight;
            }
            EventOutcome::Rejected => self.rejected += 1,
            EventOutcome::Degenerate => self.degenerate += 1,
        }
    }
}

/// Drives the event loop: sample, select, weight and fill.
#[derive(Debug, Clone)]
pub struct GridFiller<P = HadronicPhaseSpace, M = PhotonPhotonToLeptons, F = FiducialCuts> {
    phase_space: P,
    matrix_element: M,
    filter: F,
    crossing: Crossing,
    scale: ScaleChoice,
    order_index: usize,
    channel_index: usize,
}

impl GridFiller {
    /// Filler for `gamma gamma -> l+ l-` with the default cuts in `[mmin, mmax]`.
    pub fn drell_yan_aa(mmin: f64, mmax: f64) -> Result<Self, GenError> {
        Ok(GridFiller::new(
            HadronicPhaseSpace::new(mmin, mmax)?,
            PhotonPhotonToLeptons::new(),
            FiducialCuts::default(),
        ))
    }
}

impl<P, M, F> GridFiller<P, M, F>
where
    P: PhaseSpaceGenerator,
    M: MatrixElement,
    F: EventFilter,
{
    /// Conversion from GeV^-2 to picobarn.
    pub const HBARC2: f64 = 389379372.1;

    /// Creates a filler targeting order 0 and channel 0 at the default scale.
    pub fn new(phase_space: P, matrix_element: M, filter: F) -> Self {
        Self {
            phase_space,
            matrix_element,
            filter,
            crossing: Crossing::default(),
            scale: ScaleChoice::default(),
            order_index: 0,
            channel_index: 0,
        }
    }

    /// Sets the crossing handed to the matrix element.
    pub fn with_crossing(mut self, crossing: Crossing) -> Self {
        self.crossing = crossing;
        self
    }

    /// Sets the scale assigned to filled events.
    pub fn with_scale(mut self, scale: ScaleChoice) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the grid slice receiving the events.
    pub fn with_slot(mut self, order_index: usize, channel_index: usize) -> Self {
        self.order_index = order_index;
        self.channel_index = channel_index;
        self
    }

    /// Processes one event from its three variates; weights are normalized
    /// by `normalization` calls.
    pub fn process(&self, r: [f64; 3], normalization: u64) -> EventOutcome {
        let point = self.phase_space.generate(r);
        let jacobian = point.jacobian() * Self::HBARC2 / normalization as f64;

        let obs = match self.filter.select(&point) {
            Selection::Accepted(obs) => obs,
            Selection::Rejected => return EventOutcome::Rejected,
            Selection::Degenerate => return EventOutcome::Degenerate,
        };

        let mandelstam = self.crossing.apply(point.mandelstam());
        let weight = jacobian * self.matrix_element.evaluate(&mandelstam);
        if !weight.is_finite() {
            return EventOutcome::Degenerate;
        }

        EventOutcome::Accepted {
            observable: obs.yll.abs(),
            ntuple: Ntuple::new(point.x1(), point.x2(), self.scale.q2(&obs), weight),
        }
    }

    /// Runs `calls` events into `grid`.
    pub fn run<S, G>(&self, sampler: &mut S, grid: &mut G, calls: u64) -> Result<FillSummary, GenError>
    where
        S: RandomSampler,
        G: GridAccumulator + ?Sized,
    {
        self.check(grid, calls)?;
        self.fill_events(sampler, grid, calls, calls, None)
    }

    /// Like [`GridFiller::run`], but stops before the next event once `cancel`
    /// is set. Events already processed stay committed.
    pub fn run_cancellable<S, G>(
        &self,
        sampler: &mut S,
        grid: &mut G,
        calls: u64,
        cancel: &AtomicBool,
    ) -> Result<FillSummary, GenError>
    where
        S: RandomSampler,
        G: GridAccumulator + ?Sized,
    {
        self.check(grid, calls)?;
        self.fill_events(sampler, grid, calls, calls, Some(cancel))
    }

    pub(crate) fn check<G>(&self, grid: &G, calls: u64) -> Result<(), GenError>
    where
        G: GridAccumulator + ?Sized,
    {
        check_calls(calls)?;
        grid.check_layout(self.order_index, self.channel_index)
    }

    pub(crate) fn fill_events<S, G>(
        &self,
        sampler: &mut S,
        grid: &mut G,
        events: u64,
        normalization: u64,
        cancel: Option<&AtomicBool>,
    ) -> Result<FillSummary, GenError>
    where
        S: RandomSampler,
        G: GridAccumulator + ?Sized,
    {
        let mut summary = FillSummary {
            normalization,
            ..FillSummary::default()
        };
        for _ in 0..events {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                summary.cancelled = true;
                log::warn!(
                    "fill cancelled after {} of {} events",
                    summary.calls,
                    events
                );
                break;
            }
            let outcome = self.process(sampler.next_triple(), normalization);
            if let EventOutcome::Accepted { observable, ntuple } = &outcome {
                grid.fill(self.order_index, *observable, self.channel_index, ntuple)?;
            }
            summary.record(&outcome);
        }
        Ok(summary)
    }
}

pub(crate) fn check_calls(calls: u64) -> Result<(), GenError> {
    if calls == 0 {
        return Err(GenError::Config(
            ErrorInfo::new("zero-calls", "at least one Monte Carlo call is required")
                .with_hint("set `calls` to a positive number"),
        ));
    }
    Ok(())
}

/// Fills `grid` with `calls` photon-photon events generated in `[mmin, mmax]`
/// using the default cuts, scale and crossing.
pub fn fill_grid<S, G>(
    sampler: &mut S,
    grid: &mut G,
    calls: u64,
    mmin: f64,
    mmax: f64,
) -> Result<FillSummary, GenError>
where
    S: RandomSampler,
    G: GridAccumulator + ?Sized,
{
    GridFiller::drell_yan_aa(mmin, mmax)?.run(sampler, grid, calls)
}
