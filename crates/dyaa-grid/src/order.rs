use std::fmt;

use serde::{Deserialize, Serialize};

/// Perturbative order of a grid slice, as powers of the couplings and scale logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Power of the strong coupling.
    pub alphas: u32,
    /// Power of the electromagnetic coupling.
    pub alpha: u32,
    /// Power of `ln(xi_R^2)`.
    pub logxir: u32,
    /// Power of `ln(xi_F^2)`.
    pub logxif: u32,
}

impl Order {
    /// Creates a new order descriptor.
    pub const fn new(alphas: u32, alpha: u32, logxir: u32, logxif: u32) -> Self {
        Self {
            alphas,
            alpha,
            logxir,
            logxif,
        }
    }

    /// Whether the order carries no renormalization or factorization log.
    pub fn is_central(&self) -> bool {
        self.logxir == 0 && self.logxif == 0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.alphas, self.alpha) {
            (0, alpha) => write!(f, "O(a^{alpha})")?,
            (alphas, 0) => write!(f, "O(as^{alphas})")?,
            (alphas, alpha) => write!(f, "O(as^{alphas} a^{alpha})")?,
        }
        if self.logxir > 0 {
            write!(f, " lr^{}", self.logxir)?;
        }
        if self.logxif > 0 {
            write!(f, " lf^{}", self.logxif)?;
        }
        Ok(())
    }
}
