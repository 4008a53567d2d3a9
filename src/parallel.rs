//======================================================================
// src/parallel.rs
// Sizing and validation of the parallel CTR driver.
//======================================================================

use crate::error::CryptoError;

/// Default per-task working set, sized for the L1 data cache.
const DEF_DATA_CACHE: usize = 32768;

/// Upper bound on the parallel block size.
const MAX_PARALLEL_SIZE: usize = 100_000_000;

/// Per-instance parallel processing profile.
///
/// A transform call splits into rounds of `parallel_block_size` bytes, each
/// fanned out over `max_degree` tasks with striped counters. The profile is
/// validated at `initialize` time; a degree of 1 is the explicit sequential
/// fall-back.
#[derive(Clone, Debug)]
pub(crate) struct ParallelProfile {
    block_size: usize,
    parallel_block_size: usize,
    max_degree: usize,
    processor_count: usize,
    is_parallel: bool,
}

impl ParallelProfile {
    /// Builds the default profile for a cipher with the given block size:
    /// the largest even degree the thread pool supports.
    pub(crate) fn new(block_size: usize) -> Self {
        let processor_count = rayon::current_num_threads().max(1);
        let mut degree = processor_count;
        if degree % 2 != 0 {
            degree -= 1;
        }
        if degree == 0 {
            degree = 1;
        }

        let mut profile = Self {
            block_size,
            parallel_block_size: 0,
            max_degree: degree,
            processor_count,
            is_parallel: false,
        };
        profile.calculate();
        profile
    }

    fn calculate(&mut self) {
        self.is_parallel = self.max_degree > 1 && self.processor_count > 1;
        self.parallel_block_size = self.max_degree * DEF_DATA_CACHE;
    }

    pub(crate) fn is_parallel(&self) -> bool {
        self.is_parallel
    }

    pub(crate) fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub(crate) fn processor_count(&self) -> usize {
        self.processor_count
    }

    pub(crate) fn parallel_block_size(&self) -> usize {
        self.parallel_block_size
    }

    /// Smallest legal parallel block: one cipher block per task.
    pub(crate) fn parallel_minimum_size(&self) -> usize {
        self.max_degree * self.block_size
    }

    pub(crate) fn parallel_maximum_size(&self) -> usize {
        MAX_PARALLEL_SIZE
    }

    /// Sets the task fan-out. The degree must be even (or exactly 1) and
    /// within the processor count. Resets the block size to its default
    /// for the new degree.
    pub(crate) fn set_max_degree(&mut self, degree: usize) -> Result<(), CryptoError> {
        if degree == 0 || (degree != 1 && degree % 2 != 0) || degree > self.processor_count {
            return Err(CryptoError::NotSupported);
        }
        self.max_degree = degree;
        self.calculate();
        Ok(())
    }

    /// Sets the bytes processed per parallel round. Must lie within the
    /// min/max bounds and align to the parallel minimum size.
    pub(crate) fn set_parallel_block_size(&mut self, size: usize) -> Result<(), CryptoError> {
        if size < self.parallel_minimum_size() || size > self.parallel_maximum_size() {
            return Err(CryptoError::InvalidSize);
        }
        if size % self.parallel_minimum_size() != 0 {
            return Err(CryptoError::InvalidParam);
        }
        self.parallel_block_size = size;
        Ok(())
    }

    /// Initialize-time validation of the current profile.
    pub(crate) fn validate(&self) -> Result<(), CryptoError> {
        if self.is_parallel {
            if self.parallel_block_size < self.parallel_minimum_size()
                || self.parallel_block_size > self.parallel_maximum_size()
            {
                return Err(CryptoError::InvalidSize);
            }
            if self.parallel_block_size % self.parallel_minimum_size() != 0 {
                return Err(CryptoError::InvalidParam);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let profile = ParallelProfile::new(32);
        assert!(profile.validate().is_ok());
        assert!(profile.max_degree() >= 1);
        assert_eq!(profile.parallel_block_size() % profile.parallel_minimum_size(), 0);
    }

    #[test]
    fn degree_validation() {
        let mut profile = ParallelProfile::new(64);
        assert_eq!(profile.set_max_degree(0), Err(CryptoError::NotSupported));
        if profile.processor_count() >= 3 {
            assert_eq!(profile.set_max_degree(3), Err(CryptoError::NotSupported));
        }
        let beyond = profile.processor_count() + 1;
        assert_eq!(profile.set_max_degree(beyond), Err(CryptoError::NotSupported));
        // degree 1 is the explicit sequential fall-back
        assert!(profile.set_max_degree(1).is_ok());
        assert!(!profile.is_parallel());
    }

    #[test]
    fn block_size_must_align() {
        let mut profile = ParallelProfile::new(32);
        if profile.set_max_degree(2).is_err() {
            return; // single-threaded pool
        }
        let min = profile.parallel_minimum_size();
        assert!(profile.set_parallel_block_size(min * 4).is_ok());
        assert_eq!(profile.parallel_block_size(), min * 4);
        assert_eq!(
            profile.set_parallel_block_size(min * 4 + 1),
            Err(CryptoError::InvalidParam)
        );
        assert_eq!(
            profile.set_parallel_block_size(min - min / 2),
            Err(CryptoError::InvalidSize)
        );
    }
}
