use crate::data_frame::*;
use crate::error::{Error, Result};

/// Capability of the classifier wrapped by a [`Model`](crate::model::Model).
///
/// Fitted attributes return [`Error::NotFitted`] before `fit`; attributes an
/// implementation does not track default to [`Error::AttributeUnavailable`].
pub trait Classifier {
    /// Type of the fitted sub-estimators (and of the template they are cloned from)
    type Estimator;

    /// x: `[samples, features]`, y: one population label per sample
    fn fit(&mut self, x: &DataFrame, y: &Labels) -> Result<()>;

    /// One label per row of `x`
    fn predict(&self, x: &DataFrame) -> Result<Labels>;

    /// `[samples, classes]`, columns ordered as `classes()`
    fn predict_proba(&self, x: &DataFrame) -> Result<DataFrame>;

    /// The child estimator template used to create the fitted sub-estimators
    fn base_estimator(&self) -> Result<&Self::Estimator> {
        Err(Error::AttributeUnavailable {
            name: "base_estimator",
        })
    }

    fn estimators(&self) -> Result<&[Self::Estimator]> {
        Err(Error::AttributeUnavailable { name: "estimators" })
    }

    fn classes(&self) -> Result<&Labels>;

    fn n_classes(&self) -> Result<usize> {
        self.classes().map(|c| c.len())
    }

    /// Number of features seen by `fit`
    fn n_features(&self) -> Result<usize>;

    fn n_outputs(&self) -> Result<usize> {
        Ok(1)
    }

    /// Higher is more important; one value per feature
    fn feature_importances(&self) -> Result<Labels> {
        Err(Error::AttributeUnavailable {
            name: "feature_importances",
        })
    }

    fn oob_score(&self) -> Result<V> {
        Err(Error::AttributeUnavailable { name: "oob_score" })
    }

    fn oob_decision_function(&self) -> Result<&DataFrame> {
        Err(Error::AttributeUnavailable {
            name: "oob_decision_function",
        })
    }
}
