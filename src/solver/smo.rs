//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! This implements Platt's SMO algorithm for binary SVM classification: the
//! dual problem is solved by repeatedly optimizing a pair of Lagrange
//! multipliers analytically, while an error cache for the non-bound examples
//! is maintained incrementally.

use crate::cache::ErrorCache;
use crate::core::{Result, SVMError, SolverConfig, TrainingReport, EPSILON};
use crate::kernel::Kernel;
use crate::svm::SVM;
use crate::utils::{approx_eq, clamp, geq, leq};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Relative tolerance for rounding noise in the curvature along the
/// constraint line
const CURVATURE_TOLERANCE: f64 = 1e-12;

/// SMO solver for SVM optimization
///
/// The random generator picks the starting offset of the fallback scans in
/// `examine_example`. It only affects how fast training converges, not the
/// quality of the solution; seed it to make runs reproducible.
pub struct SMOSolver<R: Rng> {
    config: SolverConfig,
    rng: R,
}

impl SMOSolver<StdRng> {
    /// Create a solver with the default budget and a seeded generator
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SolverConfig::default(), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SMOSolver<R> {
    /// Create a new SMO solver with the given budget and random generator
    pub fn new(config: SolverConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Get the solver configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Train the given SVM
    ///
    /// The SVM must not have been trained before: every multiplier and the
    /// threshold must still be zero. The multipliers and threshold are
    /// updated in place; the caller is expected to [`SVM::prune`] afterwards.
    ///
    /// Returns with `converged == false` if the pass or time budget ran out
    /// first. Fails with [`SVMError::NonMercerKernel`] if the kernel is not
    /// positive semi-definite on the training set, leaving the SVM in an
    /// unspecified partially trained state.
    pub fn train<K: Kernel>(&mut self, svm: &mut SVM<K>) -> Result<TrainingReport> {
        if svm.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        if !svm.is_untrained() {
            return Err(SVMError::NotInitialState);
        }

        info!("{} training examples", svm.size());
        let started = Instant::now();
        let config = &self.config;
        let mut state = Optimization::new(svm, &mut self.rng);

        let mut passes = 0;
        let mut num_changed = 0;
        let mut examine_all = true; // examine entire training set initially

        while num_changed > 0 || examine_all {
            if config.max_passes.is_some_and(|max| passes >= max) {
                warn!("SMO stopped after {passes} passes without converging (pass limit)");
                return Ok(state.report(passes, false));
            }
            if config
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                warn!("SMO stopped after {passes} passes without converging (time limit)");
                return Ok(state.report(passes, false));
            }

            num_changed = state.sweep(examine_all)?;
            passes += 1;
            debug!(
                "pass {passes}: examine_all={examine_all} changed={num_changed} non_bound={}",
                state.cache.len()
            );

            if examine_all {
                // only examine non-bound examples in the next pass
                examine_all = false;
            } else if num_changed == 0 {
                // every non-bound example satisfies KKT, verify the whole set
                examine_all = true;
            }
        }

        let report = state.report(passes, true);
        info!(
            "SMO converged after {} passes ({} steps, {:.3}s)",
            report.passes,
            report.steps,
            started.elapsed().as_secs_f64()
        );
        Ok(report)
    }
}

/// Mutable state of one training run
struct Optimization<'a, K: Kernel, R: Rng> {
    svm: &'a mut SVM<K>,
    cache: ErrorCache,
    rng: &'a mut R,
    steps: usize,
}

impl<'a, K: Kernel, R: Rng> Optimization<'a, K, R> {
    fn new(svm: &'a mut SVM<K>, rng: &'a mut R) -> Self {
        let cache = ErrorCache::new(svm.size());
        Self {
            svm,
            cache,
            rng,
            steps: 0,
        }
    }

    fn report(&self, passes: usize, converged: bool) -> TrainingReport {
        TrainingReport {
            passes,
            steps: self.steps,
            converged,
        }
    }

    /// One outer-loop pass; returns the number of examples that made progress
    fn sweep(&mut self, examine_all: bool) -> Result<usize> {
        let mut num_changed = 0;
        for i in 0..self.svm.size() {
            if (examine_all || !self.svm.vectors[i].bound) && self.examine_example(i)? {
                num_changed += 1;
            }
        }
        Ok(num_changed)
    }

    /// Attempt to optimize example `i2`; true iff positive progress was made
    fn examine_example(&mut self, i2: usize) -> Result<bool> {
        let e2 = self.error(i2)?;
        if self.satisfies_kkt(i2, e2) {
            return Ok(false);
        }

        // second choice heuristic
        if let Some(i1) = self.second_choice(e2) {
            if self.take_step(i1, i2)? {
                return Ok(true);
            }
        }

        // no progress, so try every non-bound example and then every bound
        // one, both scans starting from the same random position
        let n = self.svm.size();
        let offset = self.rng.gen_range(0..n);
        for i1 in (offset..n).chain(0..offset) {
            if !self.svm.vectors[i1].bound && self.take_step(i1, i2)? {
                return Ok(true);
            }
        }
        for i1 in (offset..n).chain(0..offset) {
            if self.svm.vectors[i1].bound && self.take_step(i1, i2)? {
                return Ok(true);
            }
        }

        // no adequate partner exists
        Ok(false)
    }

    /// E = u - y, from the cache for non-bound examples
    fn error(&self, i: usize) -> Result<f64> {
        if let Some(e) = self.cache.get(i) {
            return Ok(e);
        }
        let v = &self.svm.vectors[i];
        Ok(self.svm.output(&v.x)? - v.y)
    }

    /// KKT conditions, to within EPSILON:
    ///
    /// ```text
    ///         alpha = 0 => y u >= 1
    ///     0 < alpha < C => y u  = 1
    ///         alpha = C => y u <= 1
    /// ```
    fn satisfies_kkt(&self, i: usize, error: f64) -> bool {
        let v = &self.svm.vectors[i];
        let c = self.svm.c();
        let r = error * v.y; // (u - y) y = y u - 1
        (geq(r, 0.0, EPSILON) || geq(v.alpha, c, EPSILON))
            && (leq(r, 0.0, EPSILON) || leq(v.alpha, 0.0, EPSILON))
    }

    /// Cached example that approximately maximizes |E1 - E2|
    fn second_choice(&self, error: f64) -> Option<usize> {
        if error > 0.0 {
            self.cache.argmin()
        } else {
            self.cache.argmax()
        }
    }

    /// Jointly optimize the multipliers of examples `i1` and `i2`
    ///
    /// Returns `Ok(false)` when no positive progress is possible.
    fn take_step(&mut self, i1: usize, i2: usize) -> Result<bool> {
        if i1 == i2 {
            return Ok(false);
        }
        let (v1, v2) = (&self.svm.vectors[i1], &self.svm.vectors[i2]);
        if v1.x == v2.x {
            // identical inputs make the objective semi-definite
            return Ok(false);
        }

        let (alpha1, alpha2) = (v1.alpha, v2.alpha);
        let (y1, y2) = (v1.y, v2.y);
        let s = y1 * y2;
        let c = self.svm.c();

        // ends of the segment alpha2 may move along
        let (low, high) = if s < 0.0 {
            ((alpha2 - alpha1).max(0.0), c.min(c + alpha2 - alpha1))
        } else {
            ((alpha2 + alpha1 - c).max(0.0), c.min(alpha2 + alpha1))
        };
        // no step on a shorter segment can pass the progress test below
        if approx_eq(low, high, EPSILON * EPSILON) {
            return Ok(false);
        }

        let kernel = self.svm.kernel();
        let k11 = kernel.compute(&v1.x, &v1.x)?;
        let k12 = kernel.compute(&v1.x, &v2.x)?;
        let k22 = kernel.compute(&v2.x, &v2.x)?;
        let e1 = self.error(i1)?;
        let e2 = self.error(i2)?;

        // second derivative of the objective along the segment
        let eta = k11 + k22 - 2.0 * k12;
        let tolerance = CURVATURE_TOLERANCE * (k11.abs() + k22.abs()).max(1.0);
        if !geq(eta, 0.0, tolerance) {
            return Err(SVMError::NonMercerKernel { eta });
        }
        if leq(eta, 0.0, tolerance) {
            return Ok(false);
        }

        let a2 = clamp(alpha2 + y2 * (e1 - e2) / eta, low, high);
        if approx_eq(a2, alpha2, EPSILON * (a2 + alpha2 + EPSILON)) {
            return Ok(false);
        }
        let a1 = alpha1 + s * (alpha2 - a2);

        self.svm.vectors[i1].set_alpha(a1, c);
        self.svm.vectors[i2].set_alpha(a2, c);
        let bound1 = self.svm.vectors[i1].bound;
        let bound2 = self.svm.vectors[i2].bound;

        // update threshold
        let delta1 = y1 * (a1 - alpha1);
        let delta2 = y2 * (a2 - alpha2);
        let b1 = e1 + delta1 * k11 + delta2 * k12;
        let b2 = e2 + delta1 * k12 + delta2 * k22;
        let shift = if !bound1 {
            b1
        } else if !bound2 {
            b2
        } else {
            (b1 + b2) / 2.0
        };
        self.svm.b += shift;

        // update error cache
        let svm = &*self.svm;
        let (x1, x2) = (&svm.vectors[i1].x, &svm.vectors[i2].x);
        for (k, error) in self.cache.iter_mut() {
            if k == i1 || k == i2 {
                continue;
            }
            let x = &svm.vectors[k].x;
            *error += delta1 * svm.kernel().compute(x1, x)? + delta2 * svm.kernel().compute(x2, x)?
                - shift;
        }
        for (i, bound) in [(i1, bound1), (i2, bound2)] {
            if bound {
                self.cache.remove(i);
            } else {
                self.cache.put(i, 0.0);
            }
        }

        self.steps += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SVMModel, SupportVector};
    use crate::kernel::{GaussianKernel, LinearKernel};
    use crate::vector::{BitVector, DataVector};
    use std::time::Duration;

    fn separable_1d() -> SVM<LinearKernel> {
        let mut svm = SVM::hard_margin(LinearKernel::new());
        for (x, y) in [(-2.0, -1), (-1.0, -1), (1.0, 1), (2.0, 1)] {
            svm.add(vec![x], y).unwrap();
        }
        svm
    }

    fn xor<K: Kernel>(kernel: K, c: f64) -> SVM<K> {
        let mut svm = SVM::new(kernel, c).unwrap();
        for (x, y) in xor_points() {
            svm.add(x, y).unwrap();
        }
        svm
    }

    fn xor_points() -> [(Vec<f64>, i32); 4] {
        [
            (vec![-1.0, -1.0], -1),
            (vec![1.0, -1.0], 1),
            (vec![-1.0, 1.0], 1),
            (vec![1.0, 1.0], -1),
        ]
    }

    /// Two interleaved noisy clusters that need a soft margin
    fn noisy_clusters() -> SVM<GaussianKernel> {
        let mut svm = SVM::new(GaussianKernel::new(0.5).unwrap(), 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..40 {
            let y = if i % 2 == 0 { 1 } else { -1 };
            let centre = f64::from(y) * 0.5;
            let x = vec![
                centre + rng.gen_range(-1.0..1.0),
                centre + rng.gen_range(-1.0..1.0),
            ];
            svm.add(x, y).unwrap();
        }
        svm
    }

    fn equality_constraint<K: Kernel>(svm: &SVM<K>) -> f64 {
        svm.vectors().iter().map(|v| v.alpha * v.y).sum()
    }

    fn assert_box_and_equality<K: Kernel>(svm: &SVM<K>) {
        for v in svm.vectors() {
            assert!(geq(v.alpha, 0.0, 1e-9), "alpha {} below 0", v.alpha);
            assert!(leq(v.alpha, svm.c(), 1e-9), "alpha {} above C", v.alpha);
        }
        let sum = equality_constraint(svm);
        assert!(sum.abs() < 1e-9, "sum of alpha_i y_i drifted to {sum}");
    }

    #[test]
    fn test_smo_solver_creation() {
        let solver = SMOSolver::with_seed(1);
        assert_eq!(solver.config().max_passes, Some(10_000));
    }

    #[test]
    fn test_smo_solver_empty_dataset() {
        let mut svm = SVM::default();
        let result = SMOSolver::with_seed(1).train(&mut svm);
        assert!(matches!(result, Err(SVMError::EmptyDataset)));
    }

    #[test]
    fn test_smo_solver_requires_initial_state() {
        let mut svm = separable_1d();
        let mut solver = SMOSolver::with_seed(1);
        solver.train(&mut svm).expect("first training run");

        assert!(matches!(
            solver.train(&mut svm),
            Err(SVMError::NotInitialState)
        ));
    }

    #[test]
    fn test_smo_solver_linearly_separable() {
        let mut svm = separable_1d();
        let report = SMOSolver::with_seed(3).train(&mut svm).expect("should train");
        assert!(report.converged);
        assert!(report.steps > 0);
        assert_box_and_equality(&svm);

        svm.prune();
        for (x, y) in [(-2.0, -1), (-1.0, -1), (1.0, 1), (2.0, 1)] {
            let u = svm.output(&DataVector::from(vec![x])).unwrap();
            assert!(u * f64::from(y) > 0.0, "{x} misclassified: u = {u}");
        }
        // margin condition on every support vector
        assert!(svm.size() > 0);
        for v in svm.vectors() {
            let u = svm.output(v.x()).unwrap();
            assert!(u.abs() >= 1.0 - EPSILON, "support vector output {u}");
        }
        assert!((svm.threshold()).abs() < 0.01);
    }

    #[test]
    fn test_smo_solver_gaussian_xor() {
        let mut svm = xor(GaussianKernel::unit_variance(), 100.0);
        let report = SMOSolver::with_seed(11).train(&mut svm).expect("should train");
        assert!(report.converged);
        svm.prune();

        for (x, y) in xor_points() {
            let u = svm.output(&DataVector::from(x)).unwrap();
            assert!(u * f64::from(y) > 0.0, "XOR point misclassified: u = {u}");
        }
        assert_eq!(svm.size(), 4);
    }

    #[test]
    fn test_smo_solver_linear_xor_fails() {
        let mut svm = xor(LinearKernel::new(), 100.0);
        SMOSolver::with_seed(11).train(&mut svm).expect("should train");
        svm.prune();

        let correct = xor_points()
            .into_iter()
            .filter(|(x, y)| {
                let u = svm.output(&DataVector::from(x.clone())).unwrap();
                u * f64::from(*y) > 0.0
            })
            .count();
        assert!(correct < 4, "a linear kernel cannot separate XOR");
    }

    #[test]
    fn test_smo_solver_bit_vectors() {
        // the class is decided by the first bit
        let patterns = [
            ([true, false, false, true], 1),
            ([true, true, false, false], 1),
            ([true, false, true, false], 1),
            ([false, true, false, true], -1),
            ([false, false, true, true], -1),
            ([false, true, true, false], -1),
        ];
        let mut svm = SVM::new(GaussianKernel::new(2.0).unwrap(), 10.0).unwrap();
        for (bits, y) in &patterns {
            svm.add(BitVector::from_bits(bits), *y).unwrap();
        }
        let report = SMOSolver::with_seed(5).train(&mut svm).expect("should train");
        assert!(report.converged);
        svm.prune();

        for (bits, y) in &patterns {
            let x = DataVector::from(BitVector::from_bits(bits));
            assert_eq!(svm.predict(&x).unwrap().label, *y);
        }
    }

    #[test]
    fn test_smo_solver_soft_margin_bounds() {
        let mut svm = noisy_clusters();
        let report = SMOSolver::with_seed(9).train(&mut svm).expect("should train");
        assert!(report.converged);
        assert_box_and_equality(&svm);
    }

    #[test]
    fn test_kkt_conditions_after_training() {
        let mut svm = noisy_clusters();
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = Optimization::new(&mut svm, &mut rng);

        let mut num_changed = 0;
        let mut examine_all = true;
        while num_changed > 0 || examine_all {
            num_changed = state.sweep(examine_all).unwrap();
            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }
        }
        let steps = state.steps;

        // an example outside the EPSILON band is one for which no partner
        // passes the progress test, so examining it again changes nothing
        for i in 0..state.svm.size() {
            let error = state.error(i).unwrap();
            if !state.satisfies_kkt(i, error) {
                assert!(
                    !state.examine_example(i).unwrap(),
                    "example {i} violates KKT and can still make progress"
                );
            }
        }
        assert_eq!(state.steps, steps);
    }

    /// E = u - y over every multiplier, including those below EPSILON
    fn exact_error<K: Kernel>(svm: &SVM<K>, i: usize) -> f64 {
        let x = &svm.vectors[i].x;
        let u: f64 = svm
            .vectors()
            .iter()
            .map(|v| v.alpha * v.y * svm.kernel().compute(&v.x, x).unwrap())
            .sum();
        u - svm.threshold() - svm.vectors[i].y
    }

    #[test]
    fn test_error_cache_consistency() {
        let mut svm = noisy_clusters();
        let n = svm.size();
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = Optimization::new(&mut svm, &mut rng);

        let mut examine_all = true;
        for _ in 0..20 {
            let changed = state.sweep(examine_all).unwrap();
            examine_all = !examine_all && changed == 0;

            for i in 0..n {
                assert_eq!(state.cache.contains(i), !state.svm.vectors[i].bound);
                if let Some(cached) = state.cache.get(i) {
                    let exact = exact_error(&*state.svm, i);
                    assert!(
                        (cached - exact).abs() < 1e-9,
                        "example {i}: cached {cached}, recomputed {exact}"
                    );
                }
            }
            assert_box_and_equality(&*state.svm);
        }
    }

    #[test]
    fn test_take_step_progress() {
        let mut svm = separable_1d();
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = Optimization::new(&mut svm, &mut rng);

        // x = -1 and x = 1, opposite labels
        assert!(state.take_step(1, 2).unwrap());
        assert_box_and_equality(&*state.svm);
        assert!(state.svm.vectors[1].alpha > 0.0);
        assert_eq!(state.steps, 1);

        // repeating the same pair has nothing left to gain
        assert!(!state.take_step(1, 2).unwrap());
        assert_eq!(state.steps, 1);
    }

    #[test]
    fn test_take_step_degenerate_pairs() {
        let mut svm = SVM::new(LinearKernel::new(), 1.0).unwrap();
        svm.add(vec![1.0], 1).unwrap();
        svm.add(vec![1.0], -1).unwrap();
        svm.add(vec![2.0], 1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = Optimization::new(&mut svm, &mut rng);

        // same record
        assert!(!state.take_step(0, 0).unwrap());
        // identical inputs
        assert!(!state.take_step(0, 1).unwrap());
        // same labels with both multipliers at zero: L == H == 0
        assert!(!state.take_step(0, 2).unwrap());
        assert!(state.svm.is_untrained());
        assert!(state.cache.is_empty());
    }

    #[test]
    fn test_take_step_zero_curvature() {
        // K(x, y) = 1 everywhere: PSD but flat, eta = 0 for every pair
        struct ConstantKernel;
        impl Kernel for ConstantKernel {
            fn compute(&self, _: &DataVector, _: &DataVector) -> Result<f64> {
                Ok(1.0)
            }
        }

        let mut svm = SVM::new(ConstantKernel, 1.0).unwrap();
        svm.add(vec![0.0], 1).unwrap();
        svm.add(vec![1.0], -1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = Optimization::new(&mut svm, &mut rng);
        assert!(!state.take_step(0, 1).unwrap());
        assert!(state.svm.is_untrained());
    }

    #[test]
    fn test_take_step_rounding_noise_curvature() {
        // a near-duplicate pair: eta is a rounding error below zero, not a
        // property of the kernel
        let x1 = vec![-1.714, -6.54, 0.976];
        let x2 = vec![-1.714, -6.54, 0.976000001];
        let (a, b) = (DataVector::from(x1.clone()), DataVector::from(x2.clone()));
        let kernel = LinearKernel::new();
        let eta = kernel.compute(&a, &a).unwrap() + kernel.compute(&b, &b).unwrap()
            - 2.0 * kernel.compute(&a, &b).unwrap();
        assert!(eta < 0.0 && eta > -1e-12, "eta = {eta}");

        let mut svm = SVM::new(kernel, 1.0).unwrap();
        svm.add(x1, 1).unwrap();
        svm.add(x2, -1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = Optimization::new(&mut svm, &mut rng);
        assert!(!state.take_step(0, 1).unwrap());
        assert!(state.svm.is_untrained());
    }

    #[test]
    fn test_non_mercer_kernel_is_fatal() {
        struct NegatedLinear;
        impl Kernel for NegatedLinear {
            fn compute(&self, x: &DataVector, y: &DataVector) -> Result<f64> {
                Ok(-x.dot_product(y)?)
            }
        }

        let mut svm = SVM::new(NegatedLinear, 1.0).unwrap();
        svm.add(vec![1.0, 0.0], 1).unwrap();
        svm.add(vec![0.0, 1.0], -1).unwrap();

        let result = SMOSolver::with_seed(1).train(&mut svm);
        match result {
            Err(SVMError::NonMercerKernel { eta }) => assert!(eta < 0.0),
            other => panic!("expected a non-Mercer error, got {other:?}"),
        }
    }

    #[test]
    fn test_smo_solver_pass_limit() {
        let mut svm = noisy_clusters();
        let config = SolverConfig {
            max_passes: Some(1),
            time_limit: None,
        };
        let mut solver = SMOSolver::new(config, StdRng::seed_from_u64(1));
        let report = solver.train(&mut svm).expect("should stop cleanly");

        assert_eq!(report.passes, 1);
        assert!(!report.converged);
    }

    #[test]
    fn test_smo_solver_time_limit() {
        let mut svm = noisy_clusters();
        let config = SolverConfig {
            max_passes: None,
            time_limit: Some(Duration::ZERO),
        };
        let mut solver = SMOSolver::new(config, StdRng::seed_from_u64(1));
        let report = solver.train(&mut svm).expect("should stop cleanly");

        assert_eq!(report.passes, 0);
        assert!(!report.converged);
        assert!(svm.is_untrained());
    }

    #[test]
    fn test_smo_solver_reproducible_with_seed() {
        let mut a = noisy_clusters();
        let mut b = noisy_clusters();
        SMOSolver::with_seed(42).train(&mut a).unwrap();
        SMOSolver::with_seed(42).train(&mut b).unwrap();

        let alphas = |svm: &SVM<GaussianKernel>| -> Vec<f64> {
            svm.vectors().iter().map(SupportVector::alpha).collect()
        };
        assert_eq!(alphas(&a), alphas(&b));
        assert_eq!(a.threshold(), b.threshold());
    }
}
