use serde::{Deserialize, Serialize};

use crate::kinematics::Mandelstam;

/// Leading-order partonic differential cross section.
pub trait MatrixElement {
    /// Evaluates the matrix element in GeV^-2 for the given invariants.
    fn evaluate(&self, mandelstam: &Mandelstam) -> f64;
}

/// `gamma gamma -> l+ l-` at O(alpha^2), massless leptons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotonPhotonToLeptons {
    alpha: f64,
}

impl PhotonPhotonToLeptons {
    /// Fine-structure constant in the Thomson limit.
    pub const ALPHA0: f64 = 1.0 / 137.03599911;

    /// Matrix element with the coupling fixed to [`Self::ALPHA0`].
    pub const fn new() -> Self {
        Self {
            alpha: Self::ALPHA0,
        }
    }
}

impl Default for PhotonPhotonToLeptons {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixElement for PhotonPhotonToLeptons {
    fn evaluate(&self, mandelstam: &Mandelstam) -> f64 {
        let Mandelstam { s, t, u } = *mandelstam;
        self.alpha * self.alpha / 2.0 / s * (t / u + u / t)
    }
}

/// Which crossing of the generated invariants is handed to the matrix element.
///
/// The default passes `(s, u, t)`. Both choices give the same value for the
/// t/u-symmetric photon-photon process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Crossing {
    /// Pass `(s, t, u)` as generated.
    AsGenerated,
    /// Pass `(s, u, t)`.
    #[default]
    #[serde(rename = "swap-tu")]
    SwapTU,
}

impl Crossing {
    /// Applies the crossing to generated invariants.
    pub fn apply(&self, mandelstam: &Mandelstam) -> Mandelstam {
        match self {
            Crossing::AsGenerated => *mandelstam,
            Crossing::SwapTU => mandelstam.swapped(),
        }
    }
}
