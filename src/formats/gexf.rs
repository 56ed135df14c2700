//! GEXF graph exchange files. Only the static structure is read: node labels,
//! edge endpoints and edge weights.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use roxmltree::{Document, Node};

use crate::error::GraphError;
use crate::graph::{RawEdge, RawGraph, StationGraph, Weight};

fn attribute<'a>(node: &Node<'a, '_>, name: &str) -> Result<&'a str, GraphError> {
    node.attribute(name).ok_or_else(|| {
        GraphError::Gexf(format!(
            "<{}> element without {:?} attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn elements<'a, 'input>(
    parent: Node<'a, 'input>,
    list: &'static str,
    item: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent
        .children()
        .filter(move |n| n.has_tag_name(list))
        .flat_map(move |n| n.children().filter(move |c| c.has_tag_name(item)))
}

/// Whether an edge type names a one-way arc. `mutual` edges work both ways.
fn is_directed(edge_type: &str) -> Result<bool, GraphError> {
    match edge_type {
        "directed" => Ok(true),
        "undirected" | "mutual" => Ok(false),
        other => Err(GraphError::Gexf(format!("unknown edge type {:?}", other))),
    }
}

pub fn parse(content: &str) -> Result<RawGraph, GraphError> {
    let doc = Document::parse(content)?;
    let graph = doc
        .descendants()
        .find(|n| n.has_tag_name("graph"))
        .ok_or_else(|| GraphError::Gexf("no <graph> element".to_owned()))?;

    let default_directed =
        is_directed(graph.attribute("defaultedgetype").unwrap_or("undirected"))?;

    let mut raw = RawGraph::default();
    let mut labels: HashMap<&str, &str> = HashMap::new();

    for node in elements(graph, "nodes", "node") {
        let id = attribute(&node, "id")?;
        let label = node.attribute("label").unwrap_or(id);
        if labels.insert(id, label).is_some() {
            return Err(GraphError::Gexf(format!("node id {:?} is used twice", id)));
        }
        raw.vertices.push(label.to_owned());
    }

    for edge in elements(graph, "edges", "edge") {
        let label = |end: &str| -> Result<String, GraphError> {
            let id = attribute(&edge, end)?;
            Ok(labels.get(id).copied().unwrap_or(id).to_owned())
        };
        let weight = edge
            .attribute("weight")
            .map(|w| {
                w.trim()
                    .parse::<Weight>()
                    .map_err(|_| GraphError::Gexf(format!("edge weight {:?} is not a number", w)))
            })
            .transpose()?;
        let directed = match edge.attribute("type") {
            Some(edge_type) => is_directed(edge_type)?,
            None => default_directed,
        };

        raw.edges.push(RawEdge {
            source: label("source")?,
            target: label("target")?,
            weight,
            directed,
        });
    }

    Ok(raw)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // attribute values would otherwise come back with spaces
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A graph as a GEXF 1.2 document, ready to be formatted.
pub struct GexfDocument<'a>(pub &'a StationGraph);

impl Display for GexfDocument<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let graph = self.0;
        let ids = graph
            .vertices()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect::<HashMap<_, _>>();
        let edge_type = if graph.is_directed() {
            "directed"
        } else {
            "undirected"
        };

        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(f, r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#)?;
        writeln!(f, r#"  <graph defaultedgetype="{}" mode="static">"#, edge_type)?;

        writeln!(f, "    <nodes>")?;
        for (id, name) in graph.vertices().enumerate() {
            writeln!(f, r#"      <node id="{}" label="{}" />"#, id, escape(name))?;
        }
        writeln!(f, "    </nodes>")?;

        writeln!(f, "    <edges>")?;
        for (id, (source, target, weight)) in graph.edges().enumerate() {
            writeln!(
                f,
                r#"      <edge id="{}" source="{}" target="{}" weight="{}" />"#,
                id, ids[source], ids[target], weight
            )?;
        }
        writeln!(f, "    </edges>")?;

        writeln!(f, "  </graph>")?;
        writeln!(f, "</gexf>")
    }
}

pub fn render(graph: &StationGraph) -> String {
    GexfDocument(graph).to_string()
}
