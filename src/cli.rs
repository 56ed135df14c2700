use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use log::LevelFilter;

use crate::accumulate::Baseline;
use crate::error::ConfigError;
use crate::filter::{NumberSet, RecordFilter, HOURS, WEEKDAYS};
use crate::formats::GraphFormat;

/// Take in BART origin-destination data and a source graph. Output a weighted graph.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Graph to use as the basis. Supports GEXF and Pajek NET, guessed from the extension.
    #[arg(value_name = "input.[gexf,net]")]
    pub inputfile: PathBuf,

    /// BART origin-destination data to read from.
    #[arg(value_name = "input.csv")]
    pub csvfile: PathBuf,

    /// Graph output file to write to. Supports GEXF and Pajek NET, guessed from the extension.
    #[arg(value_name = "output.[gexf,net]")]
    pub outputfile: PathBuf,

    /// Consider only entries within these hours. Example: 0-5,7,11-21.
    #[arg(long, value_name = "[0-23]", default_value = "0-23", value_parser = parse_hours)]
    pub hours: NumberSet,

    /// Consider only selected days. Monday = 0, Sunday = 6. Example: 0-3,5.
    #[arg(long, value_name = "[0-6]", default_value = "0-6", value_parser = parse_weekdays)]
    pub weekday: NumberSet,

    /// First date to consider, in ISO 8601 format. Example: 2011-05-23.
    #[arg(long, value_parser = parse_date)]
    pub startdate: Option<NaiveDate>,

    /// Last date to consider, in ISO 8601 format. Example: 2011-06-19.
    #[arg(long, value_parser = parse_date)]
    pub enddate: Option<NaiveDate>,

    /// Create a directed graph instead of an undirected one.
    #[arg(short, long)]
    pub directed: bool,

    /// Keep original weights from inputfile. Useful if adding to an existing graph.
    #[arg(short, long)]
    pub keepweights: bool,

    #[arg(short('l'), long("log-level"), env("RIDERSHIP_GRAPH_LOG_LEVEL"), default_value_t, value_enum)]
    pub log_level: LogLevel,
}

fn parse_hours(input: &str) -> Result<NumberSet, ConfigError> {
    NumberSet::parse(input, HOURS)
}

fn parse_weekdays(input: &str) -> Result<NumberSet, ConfigError> {
    NumberSet::parse(input, WEEKDAYS)
}

fn parse_date(input: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        input: input.to_owned(),
    })
}

/// Everything a run needs, checked before any file is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub input_format: GraphFormat,
    pub csv: PathBuf,
    pub output: PathBuf,
    pub output_format: GraphFormat,
    pub directed: bool,
    pub baseline: Baseline,
    pub filter: RecordFilter,
}

impl Args {
    pub fn read() -> Self {
        Args::parse()
    }

    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        Ok(RunConfig {
            input_format: GraphFormat::from_path(&self.inputfile)?,
            output_format: GraphFormat::from_path(&self.outputfile)?,
            filter: RecordFilter::new(self.hours, self.weekday, self.startdate, self.enddate)?,
            input: self.inputfile,
            csv: self.csvfile,
            output: self.outputfile,
            directed: self.directed,
            baseline: Baseline::keep_original(self.keepweights),
        })
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}
