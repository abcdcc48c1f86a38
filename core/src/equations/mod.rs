//! Linear expressions over measure unknowns and the system solver.
//!
//! Theorems register expressions of the form `Σ coeff·measure + constant = 0`
//! into a pending set. [`EquationSet::solve`] assembles the pending
//! expressions together with every already-bound measure into one linear
//! system, binds each unknown the system determines uniquely, and keeps the
//! under-determined remainder pending for future solves.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::measure::{MeasureId, MeasureTable};

/// Coefficients at or below this magnitude are treated as zero.
const COEFF_EPS: f64 = 1e-9;
/// Residual tolerance for contradiction detection after elimination.
const RESIDUAL_EPS: f64 = 1e-6;

/// Builder for one linear relation, read as `terms + constant = 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(MeasureId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, measure: MeasureId, coeff: f64) -> Self {
        self.terms.push((measure, coeff));
        self
    }

    pub fn plus(self, measure: MeasureId) -> Self {
        self.term(measure, 1.0)
    }

    pub fn minus(self, measure: MeasureId) -> Self {
        self.term(measure, -1.0)
    }

    pub fn offset(mut self, constant: f64) -> Self {
        self.constant += constant;
        self
    }

    /// `self = rhs`, expressed as `self - rhs = 0`.
    pub fn equals(mut self, rhs: LinearExpr) -> Self {
        for (m, c) in rhs.terms {
            self.terms.push((m, -c));
        }
        self.constant -= rhs.constant;
        self
    }
}

/// A normalized equation: unknowns resolved to class roots, bound roots
/// folded into the constant, like terms combined, terms sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Equation {
    terms: Vec<(MeasureId, f64)>,
    constant: f64,
}

impl Equation {
    fn normalize(
        raw: impl IntoIterator<Item = (MeasureId, f64)>,
        constant: f64,
        measures: &MeasureTable,
    ) -> Equation {
        let mut combined: std::collections::BTreeMap<MeasureId, f64> =
            std::collections::BTreeMap::new();
        let mut constant = constant;
        for (m, c) in raw {
            let root = measures.find(m);
            match measures.value(root) {
                Some(v) => constant += c * v,
                None => *combined.entry(root).or_insert(0.0) += c,
            }
        }
        let terms: Vec<(MeasureId, f64)> = combined
            .into_iter()
            .filter(|(_, c)| c.abs() > COEFF_EPS)
            .collect();
        Equation { terms, constant }
    }

    fn is_satisfied(&self) -> bool {
        self.terms.is_empty() && self.constant.abs() <= RESIDUAL_EPS
    }

    fn is_impossible(&self) -> bool {
        self.terms.is_empty() && self.constant.abs() > RESIDUAL_EPS
    }

    /// Structural identity up to a scalar multiple.
    fn same_as(&self, other: &Equation) -> bool {
        if self.terms.len() != other.terms.len() {
            return false;
        }
        if self.terms.is_empty() {
            return (self.constant - other.constant).abs() <= RESIDUAL_EPS;
        }
        let scale = other.terms[0].1 / self.terms[0].1;
        let close = |a: f64, b: f64| (a * scale - b).abs() <= COEFF_EPS * b.abs().max(1.0);
        self.terms
            .iter()
            .zip(&other.terms)
            .all(|((m, c), (om, oc))| m == om && close(*c, *oc))
            && close(self.constant, other.constant)
    }
}

/// The pending set of registered expressions.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EquationSet {
    pending: Vec<Equation>,
}

impl EquationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Register an expression. Returns `false` when it adds nothing new:
    /// already satisfied by bound values, or a structural duplicate of a
    /// pending equation. An expression that reduces to a nonzero constant
    /// is rejected outright.
    pub fn post(&mut self, expr: LinearExpr, measures: &MeasureTable) -> Result<bool> {
        let eq = Equation::normalize(expr.terms, expr.constant, measures);
        if eq.is_satisfied() {
            return Ok(false);
        }
        if eq.is_impossible() {
            return Err(GeometryError::SystemContradiction(format!(
                "expression reduces to {} = 0",
                eq.constant
            )));
        }
        if self.pending.iter().any(|p| p.same_as(&eq)) {
            return Ok(false);
        }
        self.pending.push(eq);
        Ok(true)
    }

    /// Solve the pending system against the current measure state.
    ///
    /// Binds every unknown the system determines uniquely and drops the
    /// equations that become satisfied; under-determined equations stay
    /// pending. Returns the newly bound class representatives. On
    /// contradiction nothing is modified.
    pub fn solve(&mut self, measures: &mut MeasureTable) -> Result<Vec<MeasureId>> {
        // Bindings and unifications may postdate registration, so
        // re-normalize before assembling the system.
        let mut eqs: Vec<Equation> = self
            .pending
            .iter()
            .map(|e| Equation::normalize(e.terms.iter().copied(), e.constant, measures))
            .collect();
        if let Some(bad) = eqs.iter().find(|e| e.is_impossible()) {
            return Err(GeometryError::SystemContradiction(format!(
                "registered expression reduces to {} = 0",
                bad.constant
            )));
        }
        eqs.retain(|e| !e.is_satisfied());
        if eqs.is_empty() {
            self.pending = eqs;
            return Ok(Vec::new());
        }

        let mut vars: Vec<MeasureId> = eqs
            .iter()
            .flat_map(|e| e.terms.iter().map(|(m, _)| *m))
            .collect();
        vars.sort();
        vars.dedup();
        let columns: std::collections::BTreeMap<MeasureId, usize> =
            vars.iter().enumerate().map(|(i, m)| (*m, i)).collect();
        let ncols = vars.len();
        debug!(equations = eqs.len(), unknowns = ncols, "solving system");

        // Augmented matrix [A | -constant], reduced by Gauss-Jordan
        // elimination with partial pivoting.
        let mut aug = DMatrix::<f64>::zeros(eqs.len(), ncols + 1);
        for (r, eq) in eqs.iter().enumerate() {
            for (m, c) in &eq.terms {
                aug[(r, columns[m])] = *c;
            }
            aug[(r, ncols)] = -eq.constant;
        }
        let mut pivots: Vec<(usize, usize)> = Vec::new();
        let mut row = 0;
        for col in 0..ncols {
            let pivot_row = (row..eqs.len())
                .max_by(|a, b| aug[(*a, col)].abs().total_cmp(&aug[(*b, col)].abs()));
            let Some(pr) = pivot_row else { break };
            if aug[(pr, col)].abs() <= COEFF_EPS {
                continue;
            }
            aug.swap_rows(row, pr);
            let p = aug[(row, col)];
            for k in col..=ncols {
                aug[(row, k)] /= p;
            }
            for r in 0..eqs.len() {
                if r == row {
                    continue;
                }
                let f = aug[(r, col)];
                if f.abs() <= COEFF_EPS {
                    continue;
                }
                for k in col..=ncols {
                    aug[(r, k)] -= f * aug[(row, k)];
                }
            }
            pivots.push((row, col));
            row += 1;
        }
        for r in row..eqs.len() {
            if aug[(r, ncols)].abs() > RESIDUAL_EPS {
                return Err(GeometryError::SystemContradiction(format!(
                    "equations require 0 = {}",
                    aug[(r, ncols)]
                )));
            }
        }

        // A pivot row with no support on free columns pins its variable
        // down uniquely; anything else stays open. Multiple valid solutions
        // are never resolved by fiat.
        let mut determined: Vec<(MeasureId, f64)> = Vec::new();
        for &(r, col) in &pivots {
            let lone = (0..ncols).all(|k| k == col || aug[(r, k)].abs() <= COEFF_EPS);
            if lone {
                determined.push((vars[col], aug[(r, ncols)]));
            }
        }
        for (m, v) in &determined {
            if measures.kind(*m).check(*v).is_err() {
                return Err(GeometryError::SystemContradiction(format!(
                    "solution requires {} = {v}, outside its domain",
                    measures.name(*m)
                )));
            }
        }

        // Consistent from here on; apply bindings, then drop the equations
        // they satisfy.
        for (m, v) in &determined {
            measures.bind(*m, *v)?;
        }
        let remaining: Vec<Equation> = eqs
            .into_iter()
            .map(|e| Equation::normalize(e.terms.iter().copied(), e.constant, measures))
            .filter(|e| !e.is_satisfied())
            .collect();
        debug!(
            bound = determined.len(),
            pending = remaining.len(),
            "system solved"
        );
        self.pending = remaining;
        Ok(determined.into_iter().map(|(m, _)| m).collect())
    }
}
