//! CSV node and edge tables.
//!
//! Nodes: `ID[,Longitude,Latitude]`. Edges: `Source,Target[,Weight]`.

use crate::{Error, Result, SocialGraph, UserId};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Which optional columns to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Write `Longitude,Latitude` when any node carries coordinates.
    pub include_geo: bool,
    /// Write the `Weight` column.
    pub include_weights: bool,
}

/// CSV format handler.
pub struct Csv;

impl Csv {
    /// Write the node table.
    pub fn write_nodes<W: Write>(
        graph: &SocialGraph,
        writer: W,
        options: CsvOptions,
    ) -> Result<()> {
        let geo = options.include_geo && graph.nodes().any(|n| n.coordinates.is_some());
        let mut writer = csv::Writer::from_writer(writer);
        if geo {
            writer.write_record(["ID", "Longitude", "Latitude"])?;
        } else {
            writer.write_record(["ID"])?;
        }
        for node in graph.nodes() {
            if geo {
                let (lon, lat) = match node.coordinates {
                    Some(c) => (c.longitude.to_string(), c.latitude.to_string()),
                    None => (String::new(), String::new()),
                };
                writer.write_record([node.id.as_str(), lon.as_str(), lat.as_str()])?;
            } else {
                writer.write_record([node.id.as_str()])?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the edge table.
    pub fn write_edges<W: Write>(
        graph: &SocialGraph,
        writer: W,
        options: CsvOptions,
    ) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        if options.include_weights {
            writer.write_record(["Source", "Target", "Weight"])?;
        } else {
            writer.write_record(["Source", "Target"])?;
        }
        for (a, b, w) in graph.edges() {
            if options.include_weights {
                writer.write_record([a.as_str(), b.as_str(), w.to_string().as_str()])?;
            } else {
                writer.write_record([a.as_str(), b.as_str()])?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Write `nodes.csv` and `edges.csv` into `dir`.
    pub fn export(graph: &SocialGraph, dir: impl AsRef<Path>, options: CsvOptions) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Self::write_nodes(graph, File::create(dir.join("nodes.csv"))?, options)?;
        Self::write_edges(graph, File::create(dir.join("edges.csv"))?, options)?;
        tracing::info!(
            dir = %dir.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "exported csv tables"
        );
        Ok(())
    }

    /// Rebuild graph topology from an edge table.
    ///
    /// A missing `Weight` column gives every edge weight 1.0. Node attributes
    /// are not part of the table and come back empty.
    pub fn read_edges<R: Read>(reader: R) -> Result<SocialGraph> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut graph = SocialGraph::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // header is line 1
            let line = i + 2;
            if record.len() < 2 {
                return Err(Error::MalformedRecord {
                    line,
                    reason: "expected Source,Target".to_string(),
                });
            }
            let weight = match record.get(2) {
                Some(raw) => raw.trim().parse::<f64>().map_err(|_| Error::MalformedRecord {
                    line,
                    reason: format!("bad weight {raw:?}"),
                })?,
                None => 1.0,
            };
            graph.add_edge(UserId::from(&record[0]), UserId::from(&record[1]), weight);
        }
        Ok(graph)
    }
}
