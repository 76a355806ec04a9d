//! Fitted correction mapping and its least-squares solver.

use crate::method::{MappingMethod, MAX_TERMS};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Smallest accepted ratio between the smallest and largest singular value of
/// a design matrix.
pub const MIN_RECIPROCAL_CONDITION: f64 = 1e-10;

/// Errors fitting a correction mapping.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FittingError {
    #[error("observed ({observed}) and reference ({reference}) color counts differ")]
    LengthMismatch { observed: usize, reference: usize },
    #[error("{method} needs at least {parameters} patches, got {patches}")]
    NotEnoughPatches {
        method: MappingMethod,
        patches: usize,
        parameters: usize,
    },
    #[error("patch {patch} has a non-finite observed or reference value")]
    NonFinite { patch: usize },
    #[error("{method} fit for band {band} is ill-conditioned (condition number {condition:.3e})")]
    IllConditioned {
        method: MappingMethod,
        band: usize,
        condition: f64,
    },
    #[error("least-squares solve failed for output band {band}: {reason}")]
    Solver { band: usize, reason: &'static str },
    #[error("band {band} has {got} coefficients, {method} needs {expected}")]
    CoefficientCount {
        method: MappingMethod,
        band: usize,
        expected: usize,
        got: usize,
    },
}

/// Per-band polynomial mapping from normalized device color to the reference
/// color space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MappingSpec")]
pub struct CorrectionMapping {
    method: MappingMethod,
    coefficients: [Vec<f64>; 3],
}

#[derive(Deserialize)]
struct MappingSpec {
    method: MappingMethod,
    coefficients: [Vec<f64>; 3],
}

impl TryFrom<MappingSpec> for CorrectionMapping {
    type Error = FittingError;

    fn try_from(spec: MappingSpec) -> Result<Self, Self::Error> {
        CorrectionMapping::new(spec.method, spec.coefficients)
    }
}

impl CorrectionMapping {
    /// Wrap explicit coefficients, checking their count against `method`.
    pub fn new(method: MappingMethod, coefficients: [Vec<f64>; 3]) -> Result<Self, FittingError> {
        let expected = method.n_terms();
        if let Some((band, c)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != expected)
        {
            return Err(FittingError::CoefficientCount {
                method,
                band,
                expected,
                got: c.len(),
            });
        }
        Ok(Self {
            method,
            coefficients,
        })
    }

    /// Least-squares fit of `reference ≈ f(observed)` for every output band.
    ///
    /// Deterministic: the same inputs always give the same coefficients.
    pub fn fit(
        method: MappingMethod,
        observed: &[[f64; 3]],
        reference: &[[f64; 3]],
    ) -> Result<Self, FittingError> {
        if observed.len() != reference.len() {
            return Err(FittingError::LengthMismatch {
                observed: observed.len(),
                reference: reference.len(),
            });
        }
        let n = observed.len();
        let parameters = method.n_terms();
        if n < parameters {
            return Err(FittingError::NotEnoughPatches {
                method,
                patches: n,
                parameters,
            });
        }
        if let Some(patch) = observed
            .iter()
            .zip(reference)
            .position(|(o, r)| o.iter().chain(r).any(|v| !v.is_finite()))
        {
            return Err(FittingError::NonFinite { patch });
        }

        let mut buf = [0.0; MAX_TERMS];
        let mut coefficients: [Vec<f64>; 3] = Default::default();
        for (band, out) in coefficients.iter_mut().enumerate() {
            let mut a = DMatrix::<f64>::zeros(n, parameters);
            for (row, x) in observed.iter().enumerate() {
                let terms = method.fill_terms(band, *x, &mut buf);
                for (col, t) in terms.iter().enumerate() {
                    a[(row, col)] = *t;
                }
            }
            let b = DVector::from_iterator(n, reference.iter().map(|r| r[band]));
            let solution = solve_least_squares(a, &b).map_err(|e| match e {
                SolveError::IllConditioned { condition } => FittingError::IllConditioned {
                    method,
                    band,
                    condition,
                },
                SolveError::Solver(reason) => FittingError::Solver { band, reason },
            })?;
            *out = solution.iter().copied().collect();
        }

        Ok(Self {
            method,
            coefficients,
        })
    }

    #[inline]
    pub fn method(&self) -> MappingMethod {
        self.method
    }

    pub fn coefficients(&self) -> &[Vec<f64>; 3] {
        &self.coefficients
    }

    /// Map one normalized device color into the reference space.
    #[inline]
    pub fn map_color(&self, x: [f64; 3]) -> [f64; 3] {
        let mut buf = [0.0; MAX_TERMS];
        std::array::from_fn(|band| {
            let terms = self.method.fill_terms(band, x, &mut buf);
            terms
                .iter()
                .zip(&self.coefficients[band])
                .map(|(t, c)| t * c)
                .sum()
        })
    }
}

#[derive(Debug)]
enum SolveError {
    IllConditioned { condition: f64 },
    Solver(&'static str),
}

/// Minimum-norm least-squares solution of `a x = b` through SVD, refusing
/// rank-deficient or near-singular systems.
fn solve_least_squares(a: DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    let svd = a.svd(true, true);
    let s_max = svd.singular_values.max();
    let s_min = svd.singular_values.min();
    if s_max <= 0.0 || s_min <= s_max * MIN_RECIPROCAL_CONDITION {
        let condition = if s_min > 0.0 { s_max / s_min } else { f64::INFINITY };
        return Err(SolveError::IllConditioned { condition });
    }
    svd.solve(b, 0.0).map_err(SolveError::Solver)
}
