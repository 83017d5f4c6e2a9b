//! Singular value decomposition solvers and elbow-based dimension selection.

use std::f64::consts::PI;

use anomaly_api::SvdAlgorithm;
use anomaly_spi::{AnomalyError, Result};
use nalgebra::{DMatrix, DVector, SymmetricEigen, SVD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Extra sketch columns for the randomized solver.
const N_OVERSAMPLES: usize = 10;

/// Singular values below this are treated as zero when recovering vectors.
const RANK_EPS: f64 = 1e-12;

/// Iteration cap for the nalgebra decompositions; `0` would mean unbounded.
const MAX_ITERATIONS: usize = 1000;

/// Leading singular triplets, sorted by descending singular value.
#[derive(Debug, Clone, PartialEq)]
pub struct SvdResult {
    /// Left singular vectors, one per column.
    pub u: DMatrix<f64>,
    pub singular_values: DVector<f64>,
    /// Right singular vectors, one per row.
    pub v_t: DMatrix<f64>,
}

impl SvdResult {
    pub fn n_components(&self) -> usize {
        self.singular_values.len()
    }

    /// `U * diag(sqrt(s))`, the adjacency spectral embedding of the left vectors.
    pub fn scaled_left(&self) -> DMatrix<f64> {
        let mut scaled = self.u.clone();
        for (j, mut col) in scaled.column_iter_mut().enumerate() {
            col *= self.singular_values[j].sqrt();
        }
        scaled
    }
}

/// Options for [`select_svd`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvdOptions {
    pub n_components: Option<usize>,
    pub n_elbows: usize,
    pub algorithm: SvdAlgorithm,
    pub n_iter: usize,
    pub seed: u64,
}

/// Decompose `x` and keep the leading components.
///
/// With `n_components: None` the count is the last elbow found by
/// [`select_dimension`] on the full spectrum.
pub fn select_svd(x: &DMatrix<f64>, options: &SvdOptions) -> Result<SvdResult> {
    let max_k = x.nrows().min(x.ncols());
    if max_k == 0 {
        return Err(AnomalyError::InsufficientData {
            required: 1,
            got: 0,
        });
    }

    ensure_finite(x, "input matrix")?;

    let k = match options.n_components {
        Some(k) if k == 0 || k > max_k => {
            return Err(AnomalyError::invalid_parameter(
                "n_components",
                format!("must be within [1, {}], got {}", max_k, k),
            ));
        }
        Some(k) => k,
        None => {
            let spectrum = singular_values(x)?;
            select_dimension(spectrum.as_slice(), options.n_elbows)
                .last()
                .copied()
                .unwrap_or(1)
                .clamp(1, max_k)
        }
    };

    // solve on x / max|x| so products and Gram matrices cannot overflow
    let scale = x.amax();
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let unit = x / scale;

    let mut result = match options.algorithm {
        SvdAlgorithm::Full => full_svd(&unit, k)?,
        SvdAlgorithm::Truncated => truncated_svd(&unit, k)?,
        SvdAlgorithm::Randomized => randomized_svd(&unit, k, options.n_iter, options.seed)?,
    };
    result.singular_values *= scale;
    ensure_finite(&result.u, "left singular vectors")?;
    ensure_finite(&result.v_t, "right singular vectors")?;
    flip_signs(&mut result);
    Ok(result)
}

/// All singular values of `x`, descending.
pub fn singular_values(x: &DMatrix<f64>) -> Result<DVector<f64>> {
    ensure_finite(x, "input matrix")?;
    let svd = SVD::try_new(x.clone(), false, false, f64::EPSILON, MAX_ITERATIONS)
        .ok_or_else(|| AnomalyError::Embedding("SVD did not converge".to_string()))?;
    let mut values: Vec<f64> = svd.singular_values.iter().copied().collect();
    values.sort_by(|a, b| b.total_cmp(a));
    Ok(DVector::from_vec(values))
}

fn full_svd(x: &DMatrix<f64>, k: usize) -> Result<SvdResult> {
    let svd = SVD::try_new(x.clone(), true, true, f64::EPSILON, MAX_ITERATIONS)
        .ok_or_else(|| AnomalyError::Embedding("SVD did not converge".to_string()))?;
    let u = svd
        .u
        .ok_or_else(|| AnomalyError::Embedding("SVD returned no left vectors".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| AnomalyError::Embedding("SVD returned no right vectors".to_string()))?;
    Ok(leading(&u, svd.singular_values.as_slice(), &v_t, k))
}

/// Top `k` triplets from the eigendecomposition of the smaller Gram matrix.
fn truncated_svd(x: &DMatrix<f64>, k: usize) -> Result<SvdResult> {
    let tall = x.nrows() >= x.ncols();
    let gram = if tall { x.transpose() * x } else { x * x.transpose() };
    ensure_finite(&gram, "Gram matrix")?;
    let eigen = SymmetricEigen::try_new(gram, f64::EPSILON, MAX_ITERATIONS).ok_or_else(|| {
        AnomalyError::Embedding("eigendecomposition did not converge".to_string())
    })?;

    let order = descending_order(eigen.eigenvalues.as_slice());
    let singular: Vec<f64> = order
        .iter()
        .take(k)
        .map(|&j| eigen.eigenvalues[j].max(0.0).sqrt())
        .collect();
    let basis = DMatrix::from_fn(eigen.eigenvectors.nrows(), k, |i, c| {
        eigen.eigenvectors[(i, order[c])]
    });

    // recover the other side as x * v / sigma (or x^T * u / sigma)
    let mut other = if tall { x * &basis } else { x.transpose() * &basis };
    for (j, mut col) in other.column_iter_mut().enumerate() {
        if singular[j] > RANK_EPS {
            col /= singular[j];
        } else {
            col.fill(0.0);
        }
    }

    let (u, v) = if tall { (other, basis) } else { (basis, other) };
    Ok(SvdResult {
        u,
        singular_values: DVector::from_vec(singular),
        v_t: v.transpose(),
    })
}

/// Randomized range finder followed by an exact SVD of the projection.
fn randomized_svd(x: &DMatrix<f64>, k: usize, n_iter: usize, seed: u64) -> Result<SvdResult> {
    let (m, n) = x.shape();
    let n_random = (k + N_OVERSAMPLES).min(m.min(n));

    let mut rng = StdRng::seed_from_u64(seed);
    let omega = DMatrix::from_fn(n, n_random, |_, _| rng.sample::<f64, _>(StandardNormal));

    let mut q = (x * omega).qr().q();
    for _ in 0..n_iter {
        q = (x.transpose() * &q).qr().q();
        q = (x * &q).qr().q();
    }

    ensure_finite(&q, "range basis")?;
    let projected = q.transpose() * x;
    let svd = SVD::try_new(projected, true, true, f64::EPSILON, MAX_ITERATIONS)
        .ok_or_else(|| AnomalyError::Embedding("SVD did not converge".to_string()))?;
    let u_small = svd
        .u
        .ok_or_else(|| AnomalyError::Embedding("SVD returned no left vectors".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| AnomalyError::Embedding("SVD returned no right vectors".to_string()))?;
    Ok(leading(&(q * u_small), svd.singular_values.as_slice(), &v_t, k))
}

fn ensure_finite(m: &DMatrix<f64>, what: &str) -> Result<()> {
    if m.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(AnomalyError::Embedding(format!("{} contains non-finite values", what)))
    }
}

fn descending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

fn leading(u: &DMatrix<f64>, singular: &[f64], v_t: &DMatrix<f64>, k: usize) -> SvdResult {
    let order = descending_order(singular);
    let k = k.min(order.len());
    SvdResult {
        u: DMatrix::from_fn(u.nrows(), k, |i, c| u[(i, order[c])]),
        singular_values: DVector::from_fn(k, |c, _| singular[order[c]]),
        v_t: DMatrix::from_fn(k, v_t.ncols(), |r, j| v_t[(order[r], j)]),
    }
}

/// Make the largest-magnitude entry of each left vector positive.
fn flip_signs(result: &mut SvdResult) {
    for j in 0..result.u.ncols() {
        let column = result.u.column(j);
        let pivot = column.iamax();
        if column[pivot] < 0.0 {
            result.u.column_mut(j).neg_mut();
            result.v_t.row_mut(j).neg_mut();
        }
    }
}

// ============================================================================
// Elbow Selection
// ============================================================================

/// Profile-likelihood elbows of a spectrum (Zhu & Ghodsi, 2006).
///
/// Returns up to `n_elbows` cumulative component counts; the last one is the
/// suggested dimensionality. Always returns at least one elbow for a
/// non-empty spectrum.
pub fn select_dimension(values: &[f64], n_elbows: usize) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut elbows = Vec::with_capacity(n_elbows);
    let mut idx = 0;
    for _ in 0..n_elbows {
        let tail = &sorted[idx..];
        if tail.len() <= 1 {
            break;
        }
        idx += argmax(&profile_likelihood(tail)) + 1;
        elbows.push(idx);
    }

    if elbows.is_empty() && !sorted.is_empty() {
        elbows.push(1);
    }
    elbows
}

/// Log likelihood of splitting `values` after each position into two
/// Gaussian groups with a pooled variance.
fn profile_likelihood(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    (1..=n)
        .map(|split| {
            let (head, tail) = values.split_at(split);
            if head.len() == 1 && tail.len() == 1 {
                return f64::NEG_INFINITY;
            }

            let head_mean = mean(head);
            let tail_mean = if tail.is_empty() { 0.0 } else { mean(tail) };
            let dof = (n - 1 - usize::from(split < n)) as f64;
            let variance =
                (squared_deviation(head, head_mean) + squared_deviation(tail, tail_mean)) / dof;
            let std = variance.sqrt();

            normal_log_pdf_sum(head, head_mean, std) + normal_log_pdf_sum(tail, tail_mean, std)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn squared_deviation(values: &[f64], center: f64) -> f64 {
    values.iter().map(|x| (x - center).powi(2)).sum()
}

fn normal_log_pdf_sum(values: &[f64], loc: f64, scale: f64) -> f64 {
    let norm = -0.5 * (2.0 * PI).ln() - scale.ln();
    values
        .iter()
        .map(|x| norm - (x - loc).powi(2) / (2.0 * scale * scale))
        .sum()
}

/// First index of the maximum; NaN never wins.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}
