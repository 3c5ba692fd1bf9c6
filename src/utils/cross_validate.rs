use crate::classifier::Classifier;
use crate::data_frame::*;
use crate::error::{Error, Result};
use crate::model::{Inputs, Model, RowFilter};
use crate::partition::Partitioner;
use log::*;
use rand::prelude::*;
use rand::rngs::StdRng;

use std::time;

pub struct KFold {
    pub splits: usize,
    /// Fixed shuffling seed, random when `None`
    pub seed: Option<u64>,
}

#[derive(Debug)]
pub struct CrossValidateScore {
    pub train_time: Vec<u128>,
    pub predict_time: Vec<u128>,
    pub train_score: Vec<V>,
    pub validation_score: Vec<V>,
}

impl KFold {
    pub fn new(k: usize) -> Self {
        Self {
            splits: k,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validation rows of every fold. Rows left over by an uneven split go
    /// to the last fold.
    pub fn folds(&self, samples: usize) -> Result<Vec<Vec<usize>>> {
        if self.splits < 2 || self.splits > samples {
            return Err(Error::config(format!(
                "cannot split {} samples into {} folds",
                samples, self.splits
            )));
        }
        // Shuffle sample order
        let mut sample_orders: Vec<usize> = (0..samples).collect();
        match self.seed {
            Some(seed) => sample_orders.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => sample_orders.shuffle(&mut rand::thread_rng()),
        }

        let fold_size = samples / self.splits;
        Ok((0..self.splits)
            .map(|i| {
                let end = if i + 1 == self.splits {
                    samples
                } else {
                    fold_size * (i + 1)
                };
                sample_orders[fold_size * i..end].to_vec()
            })
            .collect())
    }

    /// Trains on all folds but one and scores the held out fold, for every fold.
    /// The model is left fitted on the last training split.
    pub fn cross_validate<C, P, M>(
        &self,
        model: &mut Model<C, P>,
        partition: &DataFrame,
        populations: &Labels,
        metric: M,
    ) -> Result<CrossValidateScore>
    where
        C: Classifier,
        P: Partitioner,
        M: Fn(&Labels, &Labels) -> V,
    {
        let samples = partition.nrows();
        if populations.len() != samples {
            return Err(Error::config(format!(
                "{} populations for a partition of {} rows",
                populations.len(),
                samples
            )));
        }
        let mut results = CrossValidateScore {
            train_time: vec![],
            predict_time: vec![],
            train_score: vec![],
            validation_score: vec![],
        };

        for (i, fold) in self.folds(samples)?.into_iter().enumerate() {
            let train = RowFilter::Exclude(fold.clone());
            let train_rows = train.rows(samples)?.unwrap_or_default();
            let train_labels = select_labels(populations, &train_rows);
            let test_labels = select_labels(populations, &fold);

            let start = time::Instant::now();
            model.fit(
                Inputs::new().partition(partition).filter(train.clone()),
                Some(populations.clone()),
            )?;
            results.train_time.push(start.elapsed().as_millis());

            let train_pred = model.predict(Inputs::new().partition(partition).filter(train))?;
            check_predictions(&train_labels, &train_pred)?;
            results.train_score.push(metric(&train_labels, &train_pred));

            let start = time::Instant::now();
            let test_pred = model.predict(Inputs::new().partition(partition).include(fold))?;
            results.predict_time.push(start.elapsed().as_millis());
            check_predictions(&test_labels, &test_pred)?;
            results
                .validation_score
                .push(metric(&test_labels, &test_pred));

            info!(
                "fold {}: train time: {}ms, predict time: {}ms",
                i,
                results.train_time[i],
                results.predict_time[i],
            );
            info!(
                "fold {}: train: {}, validation: {}",
                i, results.train_score[i], results.validation_score[i],
            );
        }

        Ok(results)
    }
}

// metrics assume one prediction per label
fn check_predictions(labels: &Labels, predictions: &Labels) -> Result<()> {
    if labels.len() != predictions.len() {
        return Err(Error::classifier(format!(
            "{} predictions for {} rows",
            predictions.len(),
            labels.len()
        )));
    }
    Ok(())
}
