//! Ranking report
//!
//! Joins a rank vector with node labels and orders it for presentation.
//! Kept apart from the numeric core: the solver returns scores in index
//! order, sorting happens here.

use crate::algorithms::PageRankResult;
use crate::storage::{LinkGraph, NodeId};
use std::fmt;

/// Default number of entries shown by the reporter
pub const DEFAULT_TOP: usize = 10;

/// One ranked node
#[derive(Debug, Clone, PartialEq)]
pub struct RankedNode {
    /// Node index
    pub node: NodeId,
    /// Node label (`node_<i>` when the graph has none)
    pub label: String,
    /// `PageRank` score
    pub score: f64,
}

/// Nodes sorted by descending score
#[derive(Debug, Clone)]
pub struct Ranking {
    entries: Vec<RankedNode>,
    shown: usize,
}

impl Ranking {
    /// Build a ranking from a result computed on `graph`
    ///
    /// Ties keep node index order.
    #[must_use]
    pub fn new(graph: &LinkGraph, result: &PageRankResult) -> Self {
        let mut entries: Vec<RankedNode> = result
            .indexed()
            .map(|(node, score)| RankedNode {
                node,
                label: graph
                    .label(node)
                    .map_or_else(|| format!("node_{}", node.0), str::to_string),
                score,
            })
            .collect();

        entries.sort_by(|a, b| b.score.total_cmp(&a.score));

        Self {
            entries,
            shown: DEFAULT_TOP,
        }
    }

    /// Limit how many entries [`Display`](fmt::Display) prints
    #[must_use]
    pub fn with_shown(mut self, shown: usize) -> Self {
        self.shown = shown;
        self
    }

    /// The `k` highest-ranked nodes
    #[must_use]
    pub fn top(&self, k: usize) -> &[RankedNode] {
        &self.entries[..k.min(self.entries.len())]
    }

    /// All nodes, highest first
    #[must_use]
    pub fn entries(&self) -> &[RankedNode] {
        &self.entries
    }

    /// Number of ranked nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ranking is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---------Algorithm Page Rank Results--------------")?;
        for (pos, entry) in self.top(self.shown).iter().enumerate() {
            writeln!(f, "{:<2}: {:<45} {:.16}", pos + 1, entry.label, entry.score)?;
        }
        Ok(())
    }
}

#[cfg(feature = "storage")]
mod export {
    use super::Ranking;
    use crate::storage::parquet::write_batch;
    use anyhow::Result;
    use arrow::array::{ArrayRef, Float64Array, StringArray, UInt32Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::path::Path;
    use std::sync::Arc;

    impl Ranking {
        /// Write the full ranking to `{path}_ranks.parquet`
        ///
        /// Columns: `position` (1-based), `node_id`, `label`, `score`.
        ///
        /// # Errors
        ///
        /// Returns error if file I/O fails or Arrow conversion fails
        #[allow(clippy::unused_async)] // Async API for future I/O operations
        pub async fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
            let ranks_path = format!("{}_ranks.parquet", path.as_ref().display());

            #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
            let positions: Vec<u32> = (1..=self.entries.len()).map(|p| p as u32).collect();
            let node_ids: Vec<u32> = self.entries.iter().map(|e| e.node.0).collect();
            let labels: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
            let scores: Vec<f64> = self.entries.iter().map(|e| e.score).collect();

            let schema = Arc::new(Schema::new(vec![
                Field::new("position", DataType::UInt32, false),
                Field::new("node_id", DataType::UInt32, false),
                Field::new("label", DataType::Utf8, false),
                Field::new("score", DataType::Float64, false),
            ]));

            let columns: Vec<ArrayRef> = vec![
                Arc::new(UInt32Array::from(positions)),
                Arc::new(UInt32Array::from(node_ids)),
                Arc::new(StringArray::from(labels)),
                Arc::new(Float64Array::from(scores)),
            ];

            write_batch(&ranks_path, schema, columns)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(scores: Vec<f64>) -> PageRankResult {
        PageRankResult {
            scores,
            iterations: 1,
            delta: 0.0,
            converged: true,
        }
    }

    fn labeled(labels: &[&str]) -> LinkGraph {
        LinkGraph::from_labeled_links(labels.iter().map(|l| (*l).to_string()).collect(), &[])
            .unwrap()
    }

    #[test]
    fn test_sorted_descending() {
        let graph = labeled(&["a", "b", "c"]);
        let ranking = Ranking::new(&graph, &result(vec![0.2, 0.5, 0.3]));

        let order: Vec<_> = ranking.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let graph = labeled(&["a", "b", "c"]);
        let ranking = Ranking::new(&graph, &result(vec![0.25, 0.5, 0.25]));

        let order: Vec<_> = ranking.entries().iter().map(|e| e.node).collect();
        assert_eq!(order, vec![NodeId(1), NodeId(0), NodeId(2)]);
    }

    #[test]
    fn test_missing_labels_get_placeholder() {
        let graph = LinkGraph::from_links(2, &[]).unwrap();
        let ranking = Ranking::new(&graph, &result(vec![0.4, 0.6]));
        assert_eq!(ranking.top(1)[0].label, "node_1");
    }

    #[test]
    fn test_top_clamps() {
        let graph = labeled(&["a", "b"]);
        let ranking = Ranking::new(&graph, &result(vec![0.5, 0.5]));

        assert_eq!(ranking.top(10).len(), 2);
        assert_eq!(ranking.top(1).len(), 1);
        assert_eq!(ranking.len(), 2);
        assert!(!ranking.is_empty());
    }

    #[test]
    fn test_display_layout() {
        let graph = labeled(&["https://a.example", "https://b.example"]);
        let text = Ranking::new(&graph, &result(vec![0.25, 0.75])).to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            format!("1 : {:<45} 0.7500000000000000", "https://b.example")
        );
        assert!(lines[2].starts_with("2 : https://a.example"));
    }

    #[test]
    fn test_display_respects_shown() {
        let graph = labeled(&["a", "b", "c"]);
        let text = Ranking::new(&graph, &result(vec![0.2, 0.5, 0.3]))
            .with_shown(1)
            .to_string();
        assert_eq!(text.lines().count(), 2);
    }

    #[cfg(feature = "storage")]
    #[tokio::test]
    async fn test_write_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run");

        let graph = labeled(&["a", "b"]);
        Ranking::new(&graph, &result(vec![0.4, 0.6]))
            .write_parquet(&path)
            .await
            .unwrap();

        assert!(std::path::Path::new(&format!("{}_ranks.parquet", path.display())).exists());
    }
}
