use std::fmt;

use dyaa_core::{ErrorInfo, GenError};
use serde::{Deserialize, Serialize};

/// One partonic channel: a weighted sum of initial-state parton pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumiEntry {
    entry: Vec<(i32, i32, f64)>,
}

impl LumiEntry {
    /// Builds a channel from `(pdg_id_a, pdg_id_b, factor)` triples.
    pub fn new(entry: Vec<(i32, i32, f64)>) -> Result<Self, GenError> {
        if entry.is_empty() {
            return Err(GenError::Config(ErrorInfo::new(
                "lumi-empty",
                "a luminosity channel needs at least one parton pair",
            )));
        }
        if let Some(index) = entry.iter().position(|(_, _, factor)| !factor.is_finite()) {
            return Err(GenError::Config(
                ErrorInfo::new("lumi-factor", "luminosity factors must be finite")
                    .with_context("index", index.to_string()),
            ));
        }
        Ok(Self { entry })
    }

    /// The parton pairs with their factors.
    pub fn entry(&self) -> &[(i32, i32, f64)] {
        &self.entry
    }

    /// Evaluates the parton luminosity `sum f * xfx1(a) * xfx2(b) / (x1 * x2)`.
    pub fn evaluate(
        &self,
        xfx1: &dyn Fn(i32, f64, f64) -> f64,
        xfx2: &dyn Fn(i32, f64, f64) -> f64,
        x1: f64,
        x2: f64,
        q2: f64,
    ) -> f64 {
        self.entry
            .iter()
            .map(|&(a, b, factor)| factor * xfx1(a, x1, q2) * xfx2(b, x2, q2))
            .sum::<f64>()
            / (x1 * x2)
    }
}

impl fmt::Display for LumiEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (a, b, factor)) in self.entry.iter().enumerate() {
            if index > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{factor} \u{d7} ({a}, {b})")?;
        }
        Ok(())
    }
}

/// Builds a [`LumiEntry`] from `a, b, factor` triples separated by `;`.
#[macro_export]
macro_rules! lumi_entry {
    ($a:expr, $b:expr, $factor:expr $(; $c:expr, $d:expr, $fac:expr)*) => {
        $crate::lumi::LumiEntry::new(vec![($a, $b, $factor), $(($c, $d, $fac)),*])
    };
}
