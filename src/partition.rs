use crate::data_frame::*;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::utils::worker_pool;
use indicatif::ProgressBar;
use log::*;
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Derives numeric feature matrices from a dataset.
pub trait Partitioner {
    /// Splits the loci of `dataset` into `count` groups, rotated by
    /// `feature_group`, and returns one `[samples, features]` matrix per group.
    /// `service_path` is scratch space, `workers` the degree of parallelism.
    fn partition(
        &self,
        dataset: &dyn Dataset,
        service_path: &Path,
        count: usize,
        feature_group: usize,
        workers: usize,
    ) -> Result<Vec<DataFrame>>;
}

/// Uses the allele dosage of every locus as a feature, missing calls are
/// replaced with the locus mean.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DosagePartitioner {
    /// Write each partition to the service directory
    pub persist: bool,
    /// Show a progress bar over loci
    pub progress: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub enum PartitionConfig {
    Persist(bool),
    Progress(bool),
}

impl DosagePartitioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: Vec<PartitionConfig>) -> Self {
        let mut partitioner = Self::new();
        for config in configs {
            match config {
                PartitionConfig::Persist(p) => partitioner.persist = p,
                PartitionConfig::Progress(p) => partitioner.progress = p,
            }
        }
        partitioner
    }
}

impl Partitioner for DosagePartitioner {
    fn partition(
        &self,
        dataset: &dyn Dataset,
        service_path: &Path,
        count: usize,
        feature_group: usize,
        workers: usize,
    ) -> Result<Vec<DataFrame>> {
        if count == 0 {
            return Err(Error::partition("partition count must be at least 1"));
        }
        let genotypes = dataset.genotypes();
        let (samples, n_loci) = genotypes.dim();
        debug!(
            "Partitioning {} samples x {} loci into {} group(s) on {} worker(s)",
            samples, n_loci, count, workers
        );

        let bar = if self.progress {
            ProgressBar::new(n_loci as u64)
        } else {
            ProgressBar::hidden()
        };
        let pool = worker_pool(workers)?;
        // collect keeps locus order whatever the scheduling
        let columns: Vec<Array1<V>> = pool.install(|| {
            (0..n_loci)
                .into_par_iter()
                .map(|j| {
                    let column = impute_column(genotypes.column(j));
                    bar.inc(1);
                    column
                })
                .collect()
        });
        bar.finish_and_clear();

        let mut partitions = Vec::with_capacity(count);
        for (g, loci) in assign_loci(n_loci, count, feature_group)
            .into_iter()
            .enumerate()
        {
            let mut frame = DataFrame::zeros((samples, loci.len()));
            for (k, &j) in loci.iter().enumerate() {
                frame.column_mut(k).assign(&columns[j]);
            }
            if self.persist {
                fs::create_dir_all(service_path)?;
                let file = service_path.join(format!("partition_{}_{}.csv", feature_group, g));
                save_csv(&frame, &file, &[])?;
                debug!("Wrote {}", file.display());
            }
            partitions.push(frame);
        }
        Ok(partitions)
    }
}

/// Locus `j` goes to group `(j + feature_group) % count`
fn assign_loci(n_loci: usize, count: usize, feature_group: usize) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); count];
    for j in 0..n_loci {
        groups[(j + feature_group) % count].push(j);
    }
    groups
}

fn impute_column(column: ArrayView1<V>) -> Array1<V> {
    let (sum, called) = column
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0 as V, 0usize), |(sum, n), v| (sum + *v, n + 1));
    let mean = if called == 0 { 0.0 } else { sum / called as V };
    column.mapv(|v| if v.is_nan() { mean } else { v })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dataset::GenotypeDataset;
    use ndarray::array;

    fn dataset() -> GenotypeDataset {
        let ids = (0..3).map(|i| format!("s{}", i)).collect();
        let genotypes = array![
            [0.0, 2.0, V::NAN, 1.0],
            [1.0, V::NAN, V::NAN, 1.0],
            [2.0, 0.0, V::NAN, 0.0]
        ];
        GenotypeDataset::from_parts(ids, &["a", "b", "a"], genotypes).unwrap()
    }

    #[test]
    fn single_group_covers_all_loci() {
        let dir = tempfile::tempdir().unwrap();
        let parts = DosagePartitioner::new()
            .partition(&dataset(), dir.path(), 1, 0, 2)
            .unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(
            parts[0],
            array![[0.0, 2.0, 0.0, 1.0], [1.0, 1.0, 0.0, 1.0], [2.0, 0.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn groups_rotate_with_feature_group() {
        assert_eq!(assign_loci(5, 2, 0), vec![vec![0, 2, 4], vec![1, 3]]);
        assert_eq!(assign_loci(5, 2, 1), vec![vec![1, 3], vec![0, 2, 4]]);
        assert_eq!(assign_loci(3, 1, 7), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn output_does_not_depend_on_workers() {
        let dir = tempfile::tempdir().unwrap();
        let partitioner = DosagePartitioner::new();
        let one = partitioner.partition(&dataset(), dir.path(), 2, 1, 1).unwrap();
        let many = partitioner.partition(&dataset(), dir.path(), 2, 1, 4).unwrap();
        assert_eq!(one, many);
        assert_eq!(one[0].ncols(), 2);
    }

    #[test]
    fn persisted_partitions_can_be_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let service = dir.path().join("service");
        let partitioner = DosagePartitioner::from_configs(vec![PartitionConfig::Persist(true)]);
        let parts = partitioner.partition(&dataset(), &service, 1, 0, 1).unwrap();

        let back = read_csv(service.join("partition_0_0.csv")).unwrap();
        assert_eq!(back, parts[0]);
    }

    #[test]
    fn zero_groups_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DosagePartitioner::new()
            .partition(&dataset(), dir.path(), 0, 0, 1)
            .unwrap_err();
        assert!(matches!(err, Error::Partition { .. }));
    }
}
