//! Data models shared by the classifier and the operator workflow

pub mod classification;

pub use classification::{
    ClassificationReport, DetectionMethod, PiiClassification, PiiOverrides, PiiType,
};
