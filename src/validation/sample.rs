use crate::core::GeoSample;
use thiserror::Error;
use tracing::debug;

/// Reasons a sample is refused at the ingestion boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("latitude {value} outside [-90, 90]")]
    LatitudeOutOfRange { value: f64 },
    #[error("longitude {value} outside [-180, 180]")]
    LongitudeOutOfRange { value: f64 },
    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("cannot parse {field} from '{raw}'")]
    Unparseable { field: String, raw: String },
}

/// Outcome of validating a batch of samples
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid_samples: Vec<GeoSample>,
    pub rejected_samples: Vec<(GeoSample, SampleError)>,
}

impl ValidationResult {
    pub fn rejected_count(&self) -> usize {
        self.rejected_samples.len()
    }
}

/// Coordinate range checks applied before a sample may enter a track
#[derive(Debug, Clone, Default)]
pub struct SampleValidator;

impl SampleValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check a single sample, returning it normalized.
    ///
    /// A non-finite speed is not a reason to refuse the fix; it is treated
    /// as missing so statistics skip it.
    pub fn validate(&self, mut sample: GeoSample) -> Result<GeoSample, SampleError> {
        check_coordinate("latitude", sample.latitude, 90.0, |value| {
            SampleError::LatitudeOutOfRange { value }
        })?;
        check_coordinate("longitude", sample.longitude, 180.0, |value| {
            SampleError::LongitudeOutOfRange { value }
        })?;

        if matches!(sample.speed, Some(speed) if !speed.is_finite()) {
            debug!(speed = ?sample.speed, "dropping non-finite speed");
            sample.speed = None;
        }
        Ok(sample)
    }

    /// Validate each sample independently, keeping input order
    pub fn validate_batch(&self, samples: Vec<GeoSample>) -> ValidationResult {
        let mut result = ValidationResult::default();
        for sample in samples {
            match self.validate(sample.clone()) {
                Ok(valid) => result.valid_samples.push(valid),
                Err(error) => result.rejected_samples.push((sample, error)),
            }
        }
        result
    }
}

/// Range check; non-finite values are reported as such, out-of-range values
/// are handed to `out_of_range` to build the field-specific error
fn check_coordinate(
    field: &'static str,
    value: f64,
    limit: f64,
    out_of_range: impl FnOnce(f64) -> SampleError,
) -> Result<(), SampleError> {
    if !value.is_finite() {
        debug!(field, value, "non-finite coordinate");
        return Err(SampleError::NonFinite { field, value });
    }
    if value < -limit || value > limit {
        return Err(out_of_range(value));
    }
    Ok(())
}
