//! Plain-text graph loading
//!
//! # Format
//!
//! Two files describe a web graph:
//! - nodes: one label (typically a URL) per line; line `i` (0-based) is
//!   node `i`, blank lines included, so indices always match line positions
//! - links: one `<source> <target>` pair of node indices per line,
//!   whitespace separated; further columns are ignored
//!
//! Trailing blank lines of the node file and all blank lines of the link file
//! are skipped.

use super::{LinkGraph, NodeId};
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Parse a node list into labels, in index order
///
/// An interior blank line is a node with an empty label; dropping it would
/// shift every later index the link file refers to.
#[must_use]
pub fn parse_nodes(text: &str) -> Vec<String> {
    let mut labels: Vec<String> = text
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect();
    while labels.last().is_some_and(String::is_empty) {
        labels.pop();
    }
    labels
}

/// Parse a link list into `(source, target)` pairs
///
/// Bounds are not checked here; [`LinkGraph::from_links`] rejects
/// out-of-range indices.
///
/// # Errors
///
/// Returns error naming the 1-based line number if a line has fewer than two
/// columns or a column is not a node index
pub fn parse_links(text: &str) -> Result<Vec<(NodeId, NodeId)>> {
    let mut links = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let Some(src) = fields.next() else {
            continue;
        };
        let dst = fields
            .next()
            .ok_or_else(|| anyhow!("line {}: expected `<source> <target>`", line_no + 1))?;

        let src: u32 = src
            .parse()
            .with_context(|| format!("line {}: invalid source index {src:?}", line_no + 1))?;
        let dst: u32 = dst
            .parse()
            .with_context(|| format!("line {}: invalid target index {dst:?}", line_no + 1))?;

        links.push((NodeId(src), NodeId(dst)));
    }

    Ok(links)
}

/// Build a labeled graph from in-memory node and link lists
///
/// # Errors
///
/// Returns error if the link list is malformed or references a node index
/// outside the node list
pub fn parse_graph(nodes: &str, links: &str) -> Result<LinkGraph> {
    let labels = parse_nodes(nodes);
    let links = parse_links(links)?;
    let num_nodes = labels.len();

    LinkGraph::from_labeled_links(labels, &links)
        .with_context(|| format!("link list does not fit a graph of {num_nodes} nodes"))
}

/// Load a labeled graph from a node file and a link file
///
/// # Errors
///
/// Returns error if either file cannot be read or parsed
pub async fn load_text_graph<P, Q>(nodes_path: P, links_path: Q) -> Result<LinkGraph>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let nodes_path = nodes_path.as_ref();
    let links_path = links_path.as_ref();

    let nodes = tokio::fs::read_to_string(nodes_path)
        .await
        .with_context(|| format!("Failed to read nodes from {}", nodes_path.display()))?;
    let links = tokio::fs::read_to_string(links_path)
        .await
        .with_context(|| format!("Failed to read links from {}", links_path.display()))?;

    let labels = parse_nodes(&nodes);
    let links = parse_links(&links)
        .with_context(|| format!("Failed to parse links in {}", links_path.display()))?;
    let num_nodes = labels.len();

    let graph = LinkGraph::from_labeled_links(labels, &links).with_context(|| {
        format!(
            "{} references nodes missing from {} ({num_nodes} nodes)",
            links_path.display(),
            nodes_path.display()
        )
    })?;

    log::info!(
        "Loaded {} nodes and {} links from {} / {}",
        graph.num_nodes(),
        graph.num_links(),
        nodes_path.display(),
        links_path.display()
    );

    Ok(graph)
}
