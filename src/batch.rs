//! Partitioning of primary inputs for batch-mode compilation.

use crate::{mode::BatchModeInfo, path::TypedVirtualPath};
use std::collections::HashMap;

/// Default upper bound on the number of primary files per batch job.
///
/// In multi-file compiles the frontend's memory cost is dominated by
/// primary-file AST state (roughly 10 MB per primary vs. roughly 512 kB per
/// non-primary), and the outer build system may run up to NCPU drivers at
/// once. Uncapped, the expected memory pressure scales as
/// NCPU * (nonprimary_cost * N + primary_cost * N / NCPU); capping N / NCPU
/// at 25 keeps the dominant term bounded.
pub const DEFAULT_BATCH_SIZE_LIMIT: usize = 25;

/// The computed batches: `assignment[f] == i` iff `partitions[i]` contains
/// `f`. Every partition is non-empty and sizes differ by at most one.
#[derive(Clone, Debug)]
pub struct BatchPartitions {
    pub partitions: Vec<Vec<TypedVirtualPath>>,
    pub assignment: HashMap<TypedVirtualPath, usize>,
}

/// The number of batch jobs to spread `num_inputs` primaries over: the
/// user's explicit count, or `max(parallelism, N / size_limit)`.
pub(crate) fn number_of_partitions(
    num_inputs: usize,
    info: &BatchModeInfo,
    parallelism: usize,
) -> usize {
    if let Some(count) = info.count {
        return count;
    }
    let size_limit = info.size_limit.unwrap_or(DEFAULT_BATCH_SIZE_LIMIT);
    parallelism.max(1).max(num_inputs / size_limit.max(1))
}

/// Assigns the Swift inputs to partitions, in input order. Returns `None`
/// when only one partition would exist; the planner then falls back to one
/// compile job per input rather than a single oversized batch.
pub(crate) fn partition(
    swift_inputs: &[TypedVirtualPath],
    info: &BatchModeInfo,
    parallelism: usize,
) -> Option<BatchPartitions> {
    let n = swift_inputs.len();
    if n == 0 {
        return None;
    }
    // A partition must hold at least one file.
    let k = number_of_partitions(n, info, parallelism).min(n);
    if k <= 1 {
        return None;
    }

    // The first `remainder` partitions take one extra file each.
    let target_size = n / k;
    let remainder = n % k;

    let mut partitions: Vec<Vec<TypedVirtualPath>> = Vec::with_capacity(k);
    let mut assignment = HashMap::with_capacity(n);
    let mut inputs = swift_inputs.iter();
    for index in 0..k {
        let size = target_size + usize::from(index < remainder);
        let files: Vec<TypedVirtualPath> = inputs.by_ref().take(size).cloned().collect();
        for file in &files {
            assignment.insert(file.clone(), index);
        }
        partitions.push(files);
    }

    debug!(inputs = n, partitions = k, "computed batch partitions");
    Some(BatchPartitions { partitions, assignment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file_types::FileType, path::VirtualPath};

    fn inputs(n: usize) -> Vec<TypedVirtualPath> {
        (0..n)
            .map(|i| {
                TypedVirtualPath::new(
                    VirtualPath::from_arg(&format!("f{i}.swift"), None).unwrap(),
                    FileType::Swift,
                )
            })
            .collect()
    }

    #[test]
    fn count_formula_uses_the_default_size_limit() {
        let info = BatchModeInfo::default();
        assert_eq!(number_of_partitions(100, &info, 4), 4);
        assert_eq!(number_of_partitions(100, &info, 1), 4);
        assert_eq!(number_of_partitions(10, &info, 1), 1);
        assert_eq!(number_of_partitions(260, &info, 4), 10);
    }

    #[test]
    fn explicit_count_and_size_limit_override() {
        let info = BatchModeInfo { count: Some(7), ..Default::default() };
        assert_eq!(number_of_partitions(100, &info, 4), 7);

        let info = BatchModeInfo { size_limit: Some(10), ..Default::default() };
        assert_eq!(number_of_partitions(100, &info, 2), 10);
    }

    #[test]
    fn partitions_cover_all_inputs_exactly_once() {
        let files = inputs(103);
        let info = BatchModeInfo::default();
        let batches = partition(&files, &info, 4).unwrap();

        assert_eq!(batches.partitions.len(), 4);
        let flattened: Vec<_> = batches.partitions.iter().flatten().cloned().collect();
        assert_eq!(flattened, files, "input order is preserved across partitions");

        for (index, part) in batches.partitions.iter().enumerate() {
            assert!(!part.is_empty());
            for file in part {
                assert_eq!(batches.assignment[file], index);
            }
        }

        // 103 over 4: sizes differ by at most one, big partitions first.
        let sizes: Vec<_> = batches.partitions.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![26, 26, 26, 25]);
    }

    #[test]
    fn single_partition_means_no_batching() {
        let files = inputs(10);
        assert!(partition(&files, &BatchModeInfo::default(), 1).is_none());
        assert!(partition(&[], &BatchModeInfo::default(), 4).is_none());
    }

    #[test]
    fn partition_count_never_exceeds_input_count() {
        let files = inputs(3);
        let info = BatchModeInfo { count: Some(10), ..Default::default() };
        let batches = partition(&files, &info, 1).unwrap();
        assert_eq!(batches.partitions.len(), 3);
    }
}
