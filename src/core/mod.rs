pub mod distance;
pub mod engine;
pub mod export;
pub mod input;
pub mod pipeline;

pub use crate::domain::model::{Coordinate, DistancePair, Leg, PostalCode, ZipInputs};
pub use crate::domain::ports::{
    ConfigProvider, DistanceProvider, Pipeline, ProgressSink, Storage,
};
pub use crate::utils::error::Result;
