use std::fs::File;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::RecordErrorKind;
use crate::stations::StationDirectory;

fn builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).trim(csv::Trim::All);
    builder
}

/// Headerless five column ridership CSV.
pub fn open(path: &Path) -> csv::Result<csv::Reader<File>> {
    builder().from_path(path)
}

pub fn from_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    builder().from_reader(reader)
}

/// One row of the BART hourly origin-destination data, as text.
#[derive(Deserialize, Debug, Clone)]
pub struct RidershipRow {
    pub date: String,
    pub hour: String,
    pub origin: String,
    pub destination: String,
    pub passengers: String,
}

/// A row with its fields parsed and its station codes resolved to display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RidershipRecord<'a> {
    pub date: NaiveDate,
    pub hour: i64,
    pub origin: &'a str,
    pub destination: &'a str,
    pub passengers: u64,
}

impl RidershipRow {
    pub fn parse<'a>(
        &self,
        directory: &'a StationDirectory,
    ) -> Result<RidershipRecord<'a>, RecordErrorKind> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| RecordErrorKind::Date(self.date.to_owned()))?;
        let hour = self
            .hour
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordErrorKind::Hour(self.hour.to_owned()))?;
        let origin = Self::station(directory, &self.origin)?;
        let destination = Self::station(directory, &self.destination)?;
        let passengers = self
            .passengers
            .trim()
            .parse::<u64>()
            .map_err(|_| RecordErrorKind::Passengers(self.passengers.to_owned()))?;

        Ok(RidershipRecord {
            date,
            hour,
            origin,
            destination,
            passengers,
        })
    }

    fn station<'a>(directory: &'a StationDirectory, code: &str) -> Result<&'a str, RecordErrorKind> {
        directory
            .resolve(code.trim())
            .ok_or_else(|| RecordErrorKind::UnknownStation(code.to_owned()))
    }
}
