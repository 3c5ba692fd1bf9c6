//! Population assignment on top of any fit/predict classifier.
//!
//! - `model`: the [`Model`] adapter and its [`Inputs`]
//! - `classifier`: the capability a wrapped classifier provides
//! - `dataset`, `partition`: genotype datasets and how partitions are derived from them
//! - `utils`: worker pools, logging, cross validation

pub mod classifier;
pub mod data_frame;
pub mod dataset;
pub mod error;
pub mod model;
pub mod partition;
pub mod utils;

pub use classifier::Classifier;
pub use data_frame::{DataFrame, Labels, V};
pub use dataset::{Dataset, GenotypeDataset};
pub use error::{Error, Result};
pub use model::{Inputs, Model, Partitions, RowFilter};
pub use partition::{DosagePartitioner, PartitionConfig, Partitioner};
