use std::fmt::{Display, Formatter};
use std::process::ExitCode;

use clap::CommandFactory;
use log::{debug, error, info};

use crate::accumulate::WeightAccumulator;
use crate::cli::{Args, RunConfig};
use crate::error::{GraphError, RecordError};
use crate::paths::PathIndex;
use crate::stations::StationDirectory;

mod accumulate;
mod cli;
mod error;
mod filter;
mod formats;
mod graph;
mod logging;
mod paths;
mod ridership;
mod stations;

fn main() -> ExitCode {
    let args = Args::read();
    logging::initialize_logging(args.log_level.into());

    let config = match args.into_config() {
        Ok(config) => config,
        Err(err) => Args::command()
            .error(clap::error::ErrorKind::ValueValidation, err)
            .exit(),
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "main", "{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: RunConfig) -> Result<(), AppError> {
    debug!(target: "main", "Filtering records by {}", config.filter);

    let mut graph = logging::timed("graph", "Loading base graph", || {
        formats::read_graph(&config.input, config.input_format, config.directed)
    })
    .map_err(AppError::Load)?;
    info!(
        target: "graph",
        "Base graph has {} stations and {} {}",
        graph.node_count(),
        graph.edge_count(),
        if graph.is_directed() { "arcs" } else { "edges" }
    );

    let paths = logging::timed("paths", "Computing shortest paths", || {
        PathIndex::compute(&graph)
    });

    let directory = StationDirectory::bart();
    debug!(target: "main", "Station directory knows {} stations", directory.len());

    let mut reader = ridership::open(&config.csv).map_err(AppError::Open)?;
    logging::timed("accumulate", "Accumulating ridership", || {
        WeightAccumulator::new(&mut graph, &paths, &directory, &config.filter, config.baseline)
            .run(&mut reader, &config.csv)
    })
    .map_err(AppError::Ridership)?;

    logging::timed("graph", "Writing weighted graph", || {
        formats::write_graph(&config.output, config.output_format, &graph)
    })
    .map_err(AppError::Write)?;
    info!(target: "main", "Wrote {:?}", config.output);

    Ok(())
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    Load(#[source] GraphError),
    Open(#[source] csv::Error),
    Ridership(#[source] RecordError),
    Write(#[source] GraphError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let err: &dyn Display = match self {
            AppError::Load(err) => err,
            AppError::Open(err) => err,
            AppError::Ridership(err) => err,
            AppError::Write(err) => err,
        };
        let prefix = match self {
            AppError::Load(_) => "Loading base graph",
            AppError::Open(_) => "Opening ridership data",
            AppError::Ridership(_) => "Processing ridership data",
            AppError::Write(_) => "Writing weighted graph",
        };
        write!(f, "{}: {}", prefix, err)
    }
}
