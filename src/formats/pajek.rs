//! Pajek `.net` networks: a `*Vertices` list of numbered, labelled vertices
//! followed by `*Arcs` (directed) or `*Edges` (undirected) sections.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::error::GraphError;
use crate::graph::{RawEdge, RawGraph, StationGraph, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Vertices,
    Edges { directed: bool },
}

/// Splits a line at whitespace, keeping double quoted labels together.
fn tokens(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.peek() {
            None => break,
            Some('"') => {
                chars.next();
                let mut token = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => token.push(c),
                        None => return Err("unterminated quoted label".to_owned()),
                    }
                }
                tokens.push(token);
            }
            Some(_) => {
                let mut token = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    token.push(c);
                }
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}

pub fn parse(content: &str) -> Result<RawGraph, GraphError> {
    let mut raw = RawGraph::default();
    let mut labels: HashMap<String, String> = HashMap::new();
    let mut section = Section::Preamble;

    for (index, line) in content.lines().enumerate() {
        let error = |reason: String| GraphError::Pajek {
            line: index + 1,
            reason,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        if let Some(keyword) = trimmed.strip_prefix('*') {
            let keyword = keyword
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            section = match keyword.as_str() {
                "network" => Section::Preamble,
                "vertices" => Section::Vertices,
                "arcs" => Section::Edges { directed: true },
                "edges" => Section::Edges { directed: false },
                other => return Err(error(format!("unsupported section *{}", other))),
            };
            continue;
        }

        let fields = tokens(trimmed).map_err(error)?;
        match section {
            Section::Preamble => {
                return Err(error("data before the *Vertices section".to_owned()));
            }
            Section::Vertices => {
                let id = fields[0].to_owned();
                let label = fields.get(1).cloned().unwrap_or_else(|| id.clone());
                if labels.insert(id.clone(), label.clone()).is_some() {
                    return Err(error(format!("vertex number {} is used twice", id)));
                }
                raw.vertices.push(label);
            }
            Section::Edges { directed } => {
                let [source, target] = [0, 1].map(|i| fields.get(i));
                let (Some(source), Some(target)) = (source, target) else {
                    return Err(error("edge needs two vertex numbers".to_owned()));
                };
                let weight = fields
                    .get(2)
                    .map(|w| {
                        w.parse::<Weight>()
                            .map_err(|_| error(format!("weight {:?} is not a number", w)))
                    })
                    .transpose()?;
                let label = |id: &String| labels.get(id).unwrap_or(id).to_owned();

                raw.edges.push(RawEdge {
                    source: label(source),
                    target: label(target),
                    weight,
                    directed,
                });
            }
        }
    }

    Ok(raw)
}

/// A graph in Pajek syntax, ready to be formatted.
pub struct Network<'a>(pub &'a StationGraph);

impl Display for Network<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let graph = self.0;
        let numbers = graph
            .vertices()
            .enumerate()
            .map(|(i, name)| (name, i + 1))
            .collect::<HashMap<_, _>>();

        writeln!(f, "*Vertices {}", graph.node_count())?;
        for (number, name) in graph.vertices().enumerate() {
            writeln!(f, "{} \"{}\"", number + 1, name)?;
        }

        writeln!(f, "{}", if graph.is_directed() { "*Arcs" } else { "*Edges" })?;
        for (source, target, weight) in graph.edges() {
            writeln!(f, "{} {} {}", numbers[source], numbers[target], weight)?;
        }

        Ok(())
    }
}

/// Pajek labels are quoted and line based, so they cannot hold quotes or line breaks.
pub fn render(graph: &StationGraph) -> Result<String, GraphError> {
    if let Some(label) = graph
        .vertices()
        .find(|label| label.contains(|c: char| matches!(c, '"' | '\n' | '\r')))
    {
        return Err(GraphError::UnwritableLabel {
            label: label.to_owned(),
            format: "Pajek",
        });
    }

    Ok(Network(graph).to_string())
}
