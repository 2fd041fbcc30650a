//! Training patterns and the source abstraction the trainer pulls from.

use crate::errors::{GraphError, GraphResult};

/// One labeled input/expected-output pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub inputs: Vec<Vec<f32>>,
    pub expected: Vec<Vec<f32>>,
}

impl Pattern {
    pub fn new(inputs: Vec<Vec<f32>>, expected: Vec<Vec<f32>>) -> Self {
        Self { inputs, expected }
    }
}

/// A sequential, resettable source of patterns. One epoch pulls from `reset`
/// through exhaustion (`has_next` false); the trainer never looks ahead.
pub trait PatternSource {
    fn reset(&mut self);
    fn has_next(&self) -> bool;
    fn next(&mut self) -> GraphResult<Pattern>;
    fn size(&self) -> usize;
}

/// An in-memory, `Vec`-backed pattern source — iterates in insertion order,
/// looping back to the start on `reset`.
pub struct VecPatternSource {
    patterns: Vec<Pattern>,
    cursor: usize,
}

impl VecPatternSource {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns, cursor: 0 }
    }
}

impl PatternSource for VecPatternSource {
    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn has_next(&self) -> bool {
        self.cursor < self.patterns.len()
    }

    fn next(&mut self) -> GraphResult<Pattern> {
        let p = self
            .patterns
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| GraphError::PatternShapeMismatch("pattern source exhausted".into()))?;
        self.cursor += 1;
        Ok(p)
    }

    fn size(&self) -> usize {
        self.patterns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_rewinds_to_the_start() {
        let mut src = VecPatternSource::new(vec![
            Pattern::new(vec![vec![0.0]], vec![vec![0.0]]),
            Pattern::new(vec![vec![1.0]], vec![vec![1.0]]),
        ]);
        assert!(src.has_next());
        src.next().unwrap();
        src.next().unwrap();
        assert!(!src.has_next());
        src.reset();
        assert!(src.has_next());
        assert_eq!(src.size(), 2);
    }

    #[test]
    fn exhausted_source_errors_on_next() {
        let mut src = VecPatternSource::new(Vec::new());
        assert!(!src.has_next());
        assert!(src.next().is_err());
    }
}
