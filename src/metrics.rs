//! Running training/evaluation statistics (§4.6): a position-wise absolute
//! error accumulator across a sequence of `compute` calls, plus an optional
//! match rate decided by a pluggable `Matcher`.

use crate::errors::{GraphError, GraphResult};

/// Decides whether a list of `expected`/`actual` output vectors "agree,"
/// independent of how close their raw values are — e.g. classification
/// agreement by arg-max rather than elementwise closeness.
pub trait Matcher {
    fn matches(&self, expected: &[Vec<f32>], actual: &[Vec<f32>]) -> bool;
}

/// Agrees iff every output vector agrees: for each `i`, the arg-max index of
/// `expected[i]` must equal that of `actual[i]`. Ties within either vector
/// resolve to the first (lowest-index) occurrence of the maximum, matching
/// the natural `Iterator::max_by` scan order.
pub struct CategoryMatcher;

fn arg_max(v: &[f32]) -> Option<usize> {
    v.iter()
        .enumerate()
        .fold(None, |best, (i, &x)| match best {
            Some((_, bx)) if bx >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}

impl Matcher for CategoryMatcher {
    fn matches(&self, expected: &[Vec<f32>], actual: &[Vec<f32>]) -> bool {
        expected.len() == actual.len()
            && expected
                .iter()
                .zip(actual.iter())
                .all(|(e, a)| arg_max(e) == arg_max(a))
    }
}

/// Accumulates a position-wise absolute-error sum and, optionally, a match
/// rate across a sequence of `compute` calls — one per pattern, typically
/// one per epoch or for a held-out evaluation pass.
///
/// The accumulator has one vector per configured output-vector length (the
/// `lengths` schedule, usually the network's output edge sizes). `errorAvg`
/// and `errorStd` are not statistics over call history: each call flattens
/// the accumulator (divided by the call count) into one vector and
/// recomputes mean/stddev over *that vector's positions*.
pub struct Metrics {
    label: String,
    lengths: Vec<usize>,
    matcher: Option<Box<dyn Matcher>>,
    calls: u64,
    matches: u64,
    error_sum: Vec<Vec<f64>>,
    error_avg: f64,
    error_std: f64,
}

impl Metrics {
    pub fn new(label: impl Into<String>, lengths: Vec<usize>) -> Self {
        let error_sum = lengths.iter().map(|&n| vec![0.0; n]).collect();
        Self {
            label: label.into(),
            lengths,
            matcher: None,
            calls: 0,
            matches: 0,
            error_sum,
            error_avg: 0.0,
            error_std: 0.0,
        }
    }

    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Folds one `expected`/`actual` pair of output-vector lists into the
    /// running accumulator. Both lists must have one vector per entry in the
    /// configured `lengths` schedule, each of the matching length.
    pub fn compute(&mut self, expected: &[Vec<f32>], actual: &[Vec<f32>]) -> GraphResult<()> {
        if expected.len() != self.lengths.len() || actual.len() != self.lengths.len() {
            return Err(GraphError::PatternShapeMismatch(format!(
                "expected {} output vector(s), got {} expected / {} actual",
                self.lengths.len(),
                expected.len(),
                actual.len()
            )));
        }
        for (i, &len) in self.lengths.iter().enumerate() {
            if expected[i].len() != len || actual[i].len() != len {
                return Err(GraphError::PatternShapeMismatch(format!(
                    "output vector {i} expects length {len}, got expected={} actual={}",
                    expected[i].len(),
                    actual[i].len()
                )));
            }
        }

        for (i, row) in self.error_sum.iter_mut().enumerate() {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot += (expected[i][j] as f64 - actual[i][j] as f64).abs();
            }
        }

        if let Some(m) = &self.matcher {
            if m.matches(expected, actual) {
                self.matches += 1;
            }
        }

        self.calls += 1;
        let flat: Vec<f64> = self
            .error_sum
            .iter()
            .flatten()
            .map(|&sum| sum / self.calls as f64)
            .collect();
        let n = flat.len().max(1) as f64;
        let mean = flat.iter().sum::<f64>() / n;
        let variance = flat.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
        self.error_avg = mean;
        self.error_std = variance.max(0.0).sqrt();

        Ok(())
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn matches(&self) -> u64 {
        self.matches
    }

    pub fn match_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.matches as f64 / self.calls as f64
        }
    }

    pub fn error_avg(&self) -> f64 {
        self.error_avg
    }

    pub fn error_std(&self) -> f64 {
        self.error_std
    }

    /// Raw absolute-error accumulator, one vector per configured output
    /// length, summed (not averaged) across every `compute` call so far.
    pub fn accumulated_error(&self) -> &[Vec<f64>] {
        &self.error_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_matcher_breaks_ties_on_first_occurrence() {
        let m = CategoryMatcher;
        assert!(m.matches(&[vec![1.0, 1.0, 0.0]], &[vec![1.0, 1.0, 0.0]]));
        assert!(m.matches(&[vec![0.0, 1.0, 1.0]], &[vec![0.5, 2.0, 2.0]]));
    }

    #[test]
    fn category_matcher_requires_every_output_vector_to_agree() {
        let m = CategoryMatcher;
        let expected = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let agrees = vec![vec![0.1, 0.9], vec![0.8, 0.2]];
        let disagrees_on_second = vec![vec![0.1, 0.9], vec![0.2, 0.8]];
        assert!(m.matches(&expected, &agrees));
        assert!(!m.matches(&expected, &disagrees_on_second));
    }

    #[test]
    fn category_match_accumulates_position_wise_error() {
        // Scenario 5 in §8.
        let mut metrics = Metrics::new("xor", vec![3, 3]).with_matcher(CategoryMatcher);
        let expected = vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 0.0]];
        let actual = vec![vec![0.1, 0.7, 0.2], vec![0.8, 0.1, 0.1]];

        metrics.compute(&expected, &actual).unwrap();

        assert_eq!(metrics.calls(), 1);
        assert_eq!(metrics.matches(), 1);
        assert_eq!(metrics.match_rate(), 1.0);

        let acc = metrics.accumulated_error();
        let approx = |a: f64, b: f64| assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        approx(acc[0][0], 0.1);
        approx(acc[0][1], 0.3);
        approx(acc[0][2], 0.2);
        approx(acc[1][0], 0.2);
        approx(acc[1][1], 0.1);
        approx(acc[1][2], 0.1);

        let flat = [0.1, 0.3, 0.2, 0.2, 0.1, 0.1];
        let mean = flat.iter().sum::<f64>() / flat.len() as f64;
        let variance = flat.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / flat.len() as f64;
        assert!((metrics.error_avg() - mean).abs() < 1e-9);
        assert!((metrics.error_std() - variance.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn perfect_agreement_has_zero_error_and_full_match_rate() {
        let mut metrics = Metrics::new("xor", vec![2]).with_matcher(CategoryMatcher);
        for _ in 0..4 {
            metrics.compute(&[vec![1.0, 0.0]], &[vec![1.0, 0.0]]).unwrap();
        }
        assert_eq!(metrics.calls(), 4);
        assert_eq!(metrics.matches(), 4);
        assert_eq!(metrics.match_rate(), 1.0);
        assert_eq!(metrics.error_avg(), 0.0);
        assert_eq!(metrics.error_std(), 0.0);
    }

    #[test]
    fn disagreement_lowers_match_rate_and_raises_error() {
        let mut metrics = Metrics::new("xor", vec![2]).with_matcher(CategoryMatcher);
        metrics.compute(&[vec![1.0, 0.0]], &[vec![1.0, 0.0]]).unwrap();
        metrics.compute(&[vec![1.0, 0.0]], &[vec![0.0, 1.0]]).unwrap();
        assert_eq!(metrics.match_rate(), 0.5);
        assert!(metrics.error_avg() > 0.0);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let mut metrics = Metrics::new("xor", vec![2]);
        assert!(metrics.compute(&[vec![1.0, 0.0, 0.0]], &[vec![1.0, 0.0, 0.0]]).is_err());
        assert!(metrics.compute(&[vec![1.0, 0.0], vec![1.0]], &[vec![1.0, 0.0], vec![1.0]]).is_err());
    }
}
