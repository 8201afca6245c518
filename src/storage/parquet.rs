//! Parquet I/O for link graphs
//!
//! Based on `DuckDB` (Raasveldt et al., SIGMOD 2019) columnar storage patterns.
//!
//! # Format
//!
//! Graphs are stored as two Parquet files:
//! - `{path}_links.parquet`: (source, target)
//! - `{path}_nodes.parquet`: (`node_id`, label)
//!
//! The node file is authoritative for the node count, so nodes without any
//! link survive a round trip.

use super::{LinkGraph, NodeId};
use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

impl LinkGraph {
    /// Write graph to Parquet files
    ///
    /// Creates two files:
    /// - `{path}_links.parquet`: Link list (source, target)
    /// - `{path}_nodes.parquet`: Node labels (`node_id`, label)
    ///
    /// # Errors
    ///
    /// Returns error if file I/O fails or Arrow conversion fails
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let base_path = path.as_ref();

        self.write_links_parquet(base_path)?;
        self.write_nodes_parquet(base_path)?;

        Ok(())
    }

    /// Read graph from Parquet files
    ///
    /// # Errors
    ///
    /// Returns error if files don't exist, Arrow conversion fails, or a link
    /// references a node missing from the node file
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref();

        let mut nodes = Self::read_nodes_parquet(base_path)?;
        nodes.sort_by_key(|(node_id, _)| *node_id);
        for (expected, (node_id, _)) in nodes.iter().enumerate() {
            if node_id.index() != expected {
                bail!(
                    "node ids in {}_nodes.parquet are not contiguous (expected {expected}, found {})",
                    base_path.display(),
                    node_id.0
                );
            }
        }

        let links = Self::read_links_parquet(base_path)?;
        let labels = nodes.into_iter().map(|(_, label)| label).collect();

        Ok(Self::from_labeled_links(labels, &links)?)
    }

    fn write_links_parquet(&self, base_path: &Path) -> Result<()> {
        let links_path = format!("{}_links.parquet", base_path.display());

        let (sources, targets): (Vec<u32>, Vec<u32>) =
            self.iter_links().map(|(src, dst)| (src.0, dst.0)).unzip();

        let schema = Arc::new(Schema::new(vec![
            Field::new("source", DataType::UInt32, false),
            Field::new("target", DataType::UInt32, false),
        ]));

        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from(sources)),
            Arc::new(UInt32Array::from(targets)),
        ];

        write_batch(&links_path, schema, columns)
    }

    fn write_nodes_parquet(&self, base_path: &Path) -> Result<()> {
        let nodes_path = format!("{}_nodes.parquet", base_path.display());

        let mut node_ids = Vec::with_capacity(self.num_nodes());
        let mut labels = Vec::with_capacity(self.num_nodes());

        for node_id in 0..self.num_nodes() {
            #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
            let node = NodeId(node_id as u32);
            node_ids.push(node.0);
            labels.push(
                self.label(node)
                    .map_or_else(|| format!("node_{node_id}"), str::to_string),
            );
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("node_id", DataType::UInt32, false),
            Field::new("label", DataType::Utf8, false),
        ]));

        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from(node_ids)),
            Arc::new(StringArray::from(labels)),
        ];

        write_batch(&nodes_path, schema, columns)
    }

    fn read_links_parquet(base_path: &Path) -> Result<Vec<(NodeId, NodeId)>> {
        let links_path = format!("{}_links.parquet", base_path.display());

        let file =
            File::open(&links_path).with_context(|| format!("Failed to open {links_path}"))?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut links = Vec::new();

        for batch_result in reader {
            let batch: RecordBatch = batch_result?;

            let sources = batch
                .column(0)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid source column type")?;

            let targets = batch
                .column(1)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid target column type")?;

            for i in 0..batch.num_rows() {
                links.push((NodeId(sources.value(i)), NodeId(targets.value(i))));
            }
        }

        Ok(links)
    }

    fn read_nodes_parquet(base_path: &Path) -> Result<Vec<(NodeId, String)>> {
        let nodes_path = format!("{}_nodes.parquet", base_path.display());

        let file =
            File::open(&nodes_path).with_context(|| format!("Failed to open {nodes_path}"))?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut nodes = Vec::new();

        for batch_result in reader {
            let batch: RecordBatch = batch_result?;

            let node_ids = batch
                .column(0)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid node_id column type")?;

            let labels = batch
                .column(1)
                .as_any()
                .downcast_ref::<StringArray>()
                .context("Invalid label column type")?;

            for i in 0..batch.num_rows() {
                nodes.push((NodeId(node_ids.value(i)), labels.value(i).to_string()));
            }
        }

        Ok(nodes)
    }
}

/// Write a single ZSTD-compressed record batch to `path`
pub(crate) fn write_batch(path: &str, schema: SchemaRef, columns: Vec<ArrayRef>) -> Result<()> {
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .with_context(|| format!("Failed to create RecordBatch for {path}"))?;

    let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::try_new(3)?,
        ))
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}
