//! Response normalizers.
//!
//! Each normalizer turns one raw upstream envelope into the fixed-shape body
//! the front end relies on. They are permissive about what upstream sends and
//! strict about what they return:
//!
//! - [`weather`]: current conditions, or an in-band `error` body
//! - [`restaurants`]: at most five nearby places in upstream order
//! - [`image_analysis`]: a six-key object salvaged from free-form model text

pub mod image_analysis;
pub mod restaurants;
pub mod weather;

use thiserror::Error;

pub use image_analysis::{normalize_image_analysis, FallbackReason, ImageAnalysisResult};
pub use restaurants::{normalize_restaurants, Rating, RestaurantSummary};
pub use weather::{normalize_weather, WeatherFailure, WeatherOutcome, WeatherResult};

/// Upstream payload could not be mapped onto the response contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Upstream response is missing '{0}'")]
    MissingField(&'static str),

    #[error("Upstream result {index} is missing '{field}'")]
    MissingEntryField { index: usize, field: &'static str },
}
