/// HTTP client for the prediction service.
///
/// Communicates with the service using the synchronous `ureq` HTTP client.
/// Provides:
///
/// - **Predict**: `POST /predict` with a sample index, returning running
///   correctness counts.
/// - **Reset**: `POST /reset`, zeroing the service-side counters and
///   deleting its stored miss images.
/// - **Miss-image fetch**: `GET /static/images/incorrect_<id>.png`.
/// - **Health check**: verify the service is reachable.
///
/// The sweep controller depends on the [`Predictor`] trait rather than the
/// concrete client, so tests can substitute a scripted fake.
pub mod predict;

pub use predict::{PredictClient, Prediction, ResetAck};

use crate::error::StepError;

/// The prediction collaborator as the sweep controller sees it.
pub trait Predictor {
    /// Issue a prediction request for the sample at `index`.
    fn predict(&mut self, index: u64) -> Result<Prediction, StepError>;

    /// Fetch the PNG bytes of the miss image identified by `id`.
    fn fetch_miss_image(&mut self, id: u64) -> Result<Vec<u8>, StepError>;
}
