use std::fs;
use std::io::Write;
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use crate::error::{ConfigError, GraphError};
use crate::graph::{RawGraph, StationGraph};

pub mod gexf;
pub mod pajek;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Pajek,
    Gexf,
}

impl GraphFormat {
    /// Guesses the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("net") => Ok(GraphFormat::Pajek),
            Some("gexf") => Ok(GraphFormat::Gexf),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn parse(&self, content: &str) -> Result<RawGraph, GraphError> {
        match self {
            GraphFormat::Pajek => pajek::parse(content),
            GraphFormat::Gexf => gexf::parse(content),
        }
    }

    pub fn render(&self, graph: &StationGraph) -> Result<String, GraphError> {
        match self {
            GraphFormat::Pajek => pajek::render(graph),
            GraphFormat::Gexf => Ok(gexf::render(graph)),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GraphError + '_ {
    move |source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Loads a graph file and turns it into a simple directed or undirected graph.
pub fn read_graph(
    path: &Path,
    format: GraphFormat,
    directed: bool,
) -> Result<StationGraph, GraphError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let raw = format.parse(&content)?;
    debug!(
        target: "graph",
        "Parsed {} vertices and {} edges from {:?}",
        raw.vertices.len(),
        raw.edges.len(),
        path
    );

    StationGraph::from_raw(raw, directed)
}

/// Writes the graph next to `path` first and only moves it into place once it is
/// complete, so an existing file is never left half written.
pub fn write_graph(path: &Path, format: GraphFormat, graph: &StationGraph) -> Result<(), GraphError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let rendered = format.render(graph)?;
    let mut file = NamedTempFile::new_in(directory).map_err(io_error(path))?;
    file.write_all(rendered.as_bytes())
        .map_err(io_error(path))?;
    file.persist(path)
        .map_err(|err| io_error(path)(err.error))?;

    Ok(())
}
