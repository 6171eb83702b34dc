use tubely_core::models::{AspectClass, StreamGeometry};
use tubely_core::ToleranceMode;

use crate::error::PipelineError;

const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Aspect Classifier: buckets a geometry by its reduced width:height ratio.
#[derive(Debug, Clone, Copy)]
pub struct AspectClassifier {
    tolerance: f64,
    mode: ToleranceMode,
}

impl Default for AspectClassifier {
    fn default() -> Self {
        Self::new(0.01, ToleranceMode::Absolute)
    }
}

impl AspectClassifier {
    pub fn new(tolerance: f64, mode: ToleranceMode) -> Self {
        Self { tolerance, mode }
    }

    pub fn classify(&self, geometry: StreamGeometry) -> Result<AspectClass, PipelineError> {
        if !geometry.is_positive() {
            return Err(PipelineError::InvalidGeometry(geometry));
        }

        let g = gcd(geometry.width, geometry.height);
        let ratio = f64::from(geometry.width / g) / f64::from(geometry.height / g);

        if self.matches(ratio, PORTRAIT_RATIO) {
            Ok(AspectClass::Portrait)
        } else if self.matches(ratio, LANDSCAPE_RATIO) {
            Ok(AspectClass::Landscape)
        } else {
            Ok(AspectClass::Other)
        }
    }

    fn matches(&self, ratio: f64, target: f64) -> bool {
        let diff = (ratio - target).abs();
        match self.mode {
            ToleranceMode::Absolute => diff <= self.tolerance,
            ToleranceMode::Relative => diff / target <= self.tolerance,
        }
    }
}
