use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unrecognized file format: {path:?}, expected .net or .gexf")]
    UnsupportedFormat { path: PathBuf },

    #[error("Not a valid ISO 8601 date: {input:?}")]
    InvalidDate { input: String },

    #[error("Invalid number sequence {input:?}: {reason}")]
    InvalidSequence { input: String, reason: String },

    #[error("Value {value} in {input:?} is outside of {min}-{max}")]
    OutOfLimits {
        input: String,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("startdate {start} must not be after enddate {end}")]
    DateOrder { start: NaiveDate, end: NaiveDate },
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Could not access graph file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Pajek syntax error on line {line}: {reason}")]
    Pajek { line: usize, reason: String },

    #[error("GEXF structure error: {0}")]
    Gexf(String),

    #[error("Vertex {label:?} is defined more than once")]
    DuplicateVertex { label: String },

    #[error("Vertex label {label:?} cannot be written as {format}")]
    UnwritableLabel { label: String, format: &'static str },

    #[error("Edge refers to unknown vertex {vertex:?}")]
    UnknownEndpoint { vertex: String },
}

#[derive(Error, Debug)]
pub enum RecordErrorKind {
    #[error("Malformed CSV row: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not a valid ISO 8601 date: {0:?}")]
    Date(String),

    #[error("Hour is not an integer: {0:?}")]
    Hour(String),

    #[error("Passenger count is not a non-negative integer: {0:?}")]
    Passengers(String),

    #[error("No such station code {0:?}")]
    UnknownStation(String),

    #[error("Station {0:?} is not a vertex of the base graph")]
    UnknownVertex(String),

    #[error("No path from {from:?} to {to:?} in the base graph")]
    NoPath { from: String, to: String },
}

/// A fatal problem with a single ridership record, tied to where it came from.
#[derive(Error, Debug)]
#[error("Line {line} of {file:?}: {kind}")]
pub struct RecordError {
    pub line: u64,
    pub file: PathBuf,
    #[source]
    pub kind: RecordErrorKind,
}
