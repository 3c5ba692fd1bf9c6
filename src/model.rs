//! Adapts genotype datasets to a fit/predict classifier.
//!
//! A [`Model`] turns its [`Inputs`] into a single partition matrix, applies the
//! requested [`RowFilter`] and forwards the result to the wrapped
//! [`Classifier`]. All fitted state lives in the classifier.

use crate::classifier::Classifier;
use crate::data_frame::*;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::partition::{DosagePartitioner, Partitioner};
use log::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Precomputed partitions handed to the model instead of a dataset
#[derive(Clone, Copy, Debug)]
pub enum Partitions<'a> {
    /// Only the first partition is used
    List(&'a [DataFrame]),
    Single(&'a DataFrame),
}

/// Rows of the partition (and populations) passed on to the classifier
#[derive(Clone, Debug, PartialEq)]
pub enum RowFilter {
    All,
    /// Exactly these rows, in this order
    Include(Vec<usize>),
    /// Every row but these, in original order
    Exclude(Vec<usize>),
}

impl Default for RowFilter {
    fn default() -> Self {
        RowFilter::All
    }
}

impl RowFilter {
    /// Resolves the filter against a partition of `rows` rows.
    /// `None` keeps every row untouched.
    pub fn rows(&self, rows: usize) -> Result<Option<Vec<usize>>> {
        match self {
            RowFilter::All => Ok(None),
            RowFilter::Include(indices) => {
                check_bounds("include", indices, rows)?;
                Ok(Some(indices.clone()))
            }
            RowFilter::Exclude(indices) => {
                check_bounds("exclude", indices, rows)?;
                let mut keep = vec![true; rows];
                for &i in indices {
                    keep[i] = false;
                }
                Ok(Some((0..rows).filter(|&i| keep[i]).collect()))
            }
        }
    }
}

/// Indices are rows of the partition
fn check_bounds(kind: &str, indices: &[usize], partition_rows: usize) -> Result<()> {
    match indices.iter().find(|&&i| i >= partition_rows) {
        Some(i) => Err(Error::config(format!(
            "{} index {} is out of bounds for a partition of {} rows",
            kind, i, partition_rows
        ))),
        None => Ok(()),
    }
}

/// Where the partition comes from and which of its rows to use.
///
/// A dataset, when given, takes precedence over partitions.
pub struct Inputs<'a> {
    dataset: Option<&'a mut dyn Dataset>,
    partitions: Option<Partitions<'a>>,
    workers: usize,
    filter: RowFilter,
}

impl<'a> Inputs<'a> {
    pub fn new() -> Self {
        Self {
            dataset: None,
            partitions: None,
            workers: 1,
            filter: RowFilter::All,
        }
    }

    pub fn dataset(mut self, dataset: &'a mut dyn Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn partitions(mut self, partitions: &'a [DataFrame]) -> Self {
        self.partitions = Some(Partitions::List(partitions));
        self
    }

    pub fn partition(mut self, partition: &'a DataFrame) -> Self {
        self.partitions = Some(Partitions::Single(partition));
        self
    }

    /// Workers used to derive the partition from a dataset, 0 means one per cpu
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Takes priority over `exclude`
    pub fn include(mut self, indices: Vec<usize>) -> Self {
        if let RowFilter::Exclude(_) = self.filter {
            warn!("Both include and exclude indices given, exclude indices are ignored");
        }
        self.filter = RowFilter::Include(indices);
        self
    }

    pub fn exclude(mut self, indices: Vec<usize>) -> Self {
        if let RowFilter::Include(_) = self.filter {
            warn!("Both include and exclude indices given, exclude indices are ignored");
        } else {
            self.filter = RowFilter::Exclude(indices);
        }
        self
    }

    /// Same precedence as `include`/`exclude`; `RowFilter::All` clears any filter
    pub fn filter(mut self, filter: RowFilter) -> Self {
        match filter {
            RowFilter::Include(indices) => self.include(indices),
            RowFilter::Exclude(indices) => self.exclude(indices),
            RowFilter::All => {
                self.filter = RowFilter::All;
                self
            }
        }
    }
}

impl Default for Inputs<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// A classifier fed from genotype datasets or precomputed partitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model<C, P = DosagePartitioner> {
    clf: C,
    partitioner: P,
    /// Scratch space for partition generation
    service_path: PathBuf,
}

impl<C: Classifier> Model<C> {
    /// Builds the classifier as `factory(args)`
    pub fn new<F, A, S>(factory: F, args: A, service_path: S) -> Self
    where
        F: FnOnce(A) -> C,
        S: Into<PathBuf>,
    {
        Self::from_classifier(factory(args), service_path)
    }

    pub fn from_classifier<S: Into<PathBuf>>(clf: C, service_path: S) -> Self {
        Self {
            clf,
            partitioner: DosagePartitioner::default(),
            service_path: service_path.into(),
        }
    }
}

impl<C: Classifier, P: Partitioner> Model<C, P> {
    pub fn with_partitioner<F, A, S>(factory: F, args: A, service_path: S, partitioner: P) -> Self
    where
        F: FnOnce(A) -> C,
        S: Into<PathBuf>,
    {
        Self {
            clf: factory(args),
            partitioner,
            service_path: service_path.into(),
        }
    }

    pub fn classifier(&self) -> &C {
        &self.clf
    }

    pub fn partitioner(&self) -> &P {
        &self.partitioner
    }

    pub fn service_path(&self) -> &Path {
        &self.service_path
    }

    pub fn into_classifier(self) -> C {
        self.clf
    }

    /// Fails if the classifier is not fitted
    pub fn base_estimator(&self) -> Result<&C::Estimator> {
        self.clf.base_estimator()
    }

    /// The fitted sub-estimators, fails if the classifier is not fitted
    pub fn estimators(&self) -> Result<&[C::Estimator]> {
        self.clf.estimators()
    }

    /// Population labels seen by `fit`, fails if the classifier is not fitted
    pub fn classes(&self) -> Result<&Labels> {
        self.clf.classes()
    }

    pub fn n_classes(&self) -> Result<usize> {
        self.clf.n_classes()
    }

    pub fn n_features(&self) -> Result<usize> {
        self.clf.n_features()
    }

    pub fn n_outputs(&self) -> Result<usize> {
        self.clf.n_outputs()
    }

    /// Fails if the classifier is not fitted
    pub fn feature_importances(&self) -> Result<Labels> {
        self.clf.feature_importances()
    }

    pub fn oob_score(&self) -> Result<V> {
        self.clf.oob_score()
    }

    pub fn oob_decision_function(&self) -> Result<&DataFrame> {
        self.clf.oob_decision_function()
    }

    /// Trains the classifier.
    ///
    /// With a dataset, populations default to the dataset's own and any
    /// partitions in `inputs` are ignored. With partitions only, populations
    /// are required.
    ///
    /// Deriving a partition is the expensive step; when fitting repeatedly on
    /// the same dataset, compute it once with [`Model::get_partition`] and pass
    /// it as a partition instead.
    pub fn fit(&mut self, inputs: Inputs<'_>, populations: Option<Labels>) -> Result<&mut Self> {
        let (partition, dataset_populations, filter) = self.resolve(inputs)?;
        let populations = populations
            .or(dataset_populations)
            .ok_or_else(|| Error::config("populations must be provided"))?;

        // misaligned populations go to the classifier as is, it reports the mismatch
        if populations.len() != partition.nrows() {
            debug!(
                "{} populations for {} rows, row filter not applied",
                populations.len(),
                partition.nrows()
            );
            self.clf.fit(&partition, &populations)?;
            return Ok(self);
        }

        match filter.rows(partition.nrows())? {
            Some(rows) => {
                debug!("Fitting on {} of {} rows", rows.len(), partition.nrows());
                let x = select_rows(&partition, &rows);
                let y = select_labels(&populations, &rows);
                self.clf.fit(&x, &y)?;
            }
            None => {
                debug!("Fitting on {} rows", partition.nrows());
                self.clf.fit(&partition, &populations)?;
            }
        }
        Ok(self)
    }

    /// One predicted population per selected row
    pub fn predict(&self, inputs: Inputs<'_>) -> Result<Labels> {
        let x = self.prepare(inputs)?;
        self.clf.predict(&x)
    }

    /// `[rows, classes]` membership probabilities
    pub fn predict_proba(&self, inputs: Inputs<'_>) -> Result<DataFrame> {
        let x = self.prepare(inputs)?;
        self.clf.predict_proba(&x)
    }

    /// A single partition over all loci of `dataset`.
    pub fn get_partition(&self, dataset: &dyn Dataset, workers: usize) -> Result<DataFrame> {
        self.partitioner
            .partition(dataset, &self.service_path, 1, 0, workers)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::partition("partitioner returned no partitions"))
    }

    fn prepare<'a>(&self, inputs: Inputs<'a>) -> Result<Cow<'a, DataFrame>> {
        let (partition, _, filter) = self.resolve(inputs)?;
        Ok(match filter.rows(partition.nrows())? {
            Some(rows) => Cow::Owned(select_rows(&partition, &rows)),
            None => partition,
        })
    }

    fn resolve<'a>(
        &self,
        inputs: Inputs<'a>,
    ) -> Result<(Cow<'a, DataFrame>, Option<Labels>, RowFilter)> {
        let Inputs {
            dataset,
            partitions,
            workers,
            filter,
        } = inputs;

        let (partition, populations) = match (dataset, partitions) {
            (Some(dataset), supplied) => {
                if supplied.is_some() {
                    debug!("Dataset given, ignoring supplied partitions");
                }
                if dataset.num_samples() == 0 {
                    dataset.load()?;
                }
                let partition = self.get_partition(&*dataset, workers)?;
                (Cow::Owned(partition), Some(dataset.populations()))
            }
            (None, Some(Partitions::List(list))) => match list.first() {
                Some(first) => (Cow::Borrowed(first), None),
                None => return Err(Error::config("partitions list is empty")),
            },
            (None, Some(Partitions::Single(partition))) => (Cow::Borrowed(partition), None),
            (None, None) => {
                return Err(Error::config(
                    "either dataset or partitions must be provided",
                ))
            }
        };
        Ok((partition, populations, filter))
    }
}

impl<C, P> Model<C, P>
where
    C: Serialize + DeserializeOwned,
    P: Serialize + DeserializeOwned,
{
    pub fn save_json<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_json<T: AsRef<Path>>(path: T) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exclude_keeps_complement_in_order() {
        let filter = RowFilter::Exclude(vec![3, 0, 3]);
        assert_eq!(filter.rows(5).unwrap(), Some(vec![1, 2, 4]));
    }

    #[test]
    fn include_keeps_order_and_duplicates() {
        let filter = RowFilter::Include(vec![2, 0, 2]);
        assert_eq!(filter.rows(3).unwrap(), Some(vec![2, 0, 2]));
        assert_eq!(RowFilter::All.rows(3).unwrap(), None);
    }

    #[test]
    fn out_of_bounds_is_a_config_error() {
        let err = RowFilter::Include(vec![0, 3]).rows(3).unwrap_err();
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: include index 3 is out of bounds for a partition of 3 rows"
        );
        assert!(RowFilter::Exclude(vec![9]).rows(3).unwrap_err().is_config());
    }

    #[test]
    fn filter_follows_include_precedence() {
        let inputs = Inputs::new().include(vec![0]).filter(RowFilter::Exclude(vec![1]));
        assert_eq!(inputs.filter, RowFilter::Include(vec![0]));

        let inputs = Inputs::new().exclude(vec![1]).filter(RowFilter::Include(vec![2]));
        assert_eq!(inputs.filter, RowFilter::Include(vec![2]));

        let inputs = Inputs::new().include(vec![0]).filter(RowFilter::All);
        assert_eq!(inputs.filter, RowFilter::All);
    }

    #[test]
    fn include_wins_over_exclude() {
        let inputs = Inputs::new().exclude(vec![1]).include(vec![0]);
        assert_eq!(inputs.filter, RowFilter::Include(vec![0]));

        let inputs = Inputs::new().include(vec![0]).exclude(vec![1]);
        assert_eq!(inputs.filter, RowFilter::Include(vec![0]));
    }

    #[test]
    fn inputs_default_to_one_worker() {
        let inputs = Inputs::new();
        assert_eq!(inputs.workers, 1);
        assert_eq!(inputs.filter, RowFilter::All);
    }
}
