//! Memoization of betweenness centrality, keyed by a graph fingerprint.
//!
//! Betweenness is the most expensive step of an analysis run and depends only
//! on the graph, so results are stored under a SHA-256 digest of the sorted
//! node and edge lists. Two graphs with the same users, edges and weights share
//! a fingerprint regardless of insertion order.

use crate::algo::centrality::{betweenness_centrality, BetweennessConfig};
use crate::algo::ImportanceScores;
use crate::{Result, SocialGraph};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Stable hex fingerprint of a graph's nodes, edges and weights.
pub fn graph_fingerprint(graph: &SocialGraph) -> String {
    let mut nodes: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
    nodes.sort_unstable();

    let mut edges: Vec<(&str, &str, u64)> = graph
        .edges()
        .map(|(a, b, w)| {
            let (a, b) = if a <= b { (a, b) } else { (b, a) };
            (a.as_str(), b.as_str(), w.to_bits())
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update((nodes.len() as u64).to_le_bytes());
    for id in nodes {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update((edges.len() as u64).to_le_bytes());
    for (a, b, bits) in edges {
        hasher.update(a.as_bytes());
        hasher.update([0u8]);
        hasher.update(b.as_bytes());
        hasher.update([0u8]);
        hasher.update(bits.to_le_bytes());
    }

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Storage for centrality results.
pub trait CentralityCache: Send + Sync {
    /// Look up scores stored under `key`.
    fn get(&self, key: &str) -> Result<Option<ImportanceScores>>;

    /// Store scores under `key`.
    fn put(&self, key: &str, scores: &ImportanceScores) -> Result<()>;
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CentralityCache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<ImportanceScores>> {
        Ok(None)
    }

    fn put(&self, _key: &str, _scores: &ImportanceScores) -> Result<()> {
        Ok(())
    }
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, ImportanceScores>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CentralityCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<ImportanceScores>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, scores: &ImportanceScores) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), scores.clone());
        Ok(())
    }
}

/// Directory-backed cache with one bincode file per key.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Use `dir` for cache files. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.bin"))
    }
}

impl CentralityCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<ImportanceScores>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(Some(bincode::deserialize_from(reader)?))
    }

    fn put(&self, key: &str, scores: &ImportanceScores) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut writer = BufWriter::new(File::create(self.path_for(key))?);
        bincode::serialize_into(&mut writer, scores)?;
        writer.flush()?;
        Ok(())
    }
}

/// Betweenness centrality served from `cache` when available.
pub fn cached_betweenness(
    graph: &SocialGraph,
    config: BetweennessConfig,
    cache: &dyn CentralityCache,
) -> Result<ImportanceScores> {
    let variant = if config.normalized { "norm" } else { "raw" };
    let key = format!("betweenness-{variant}-{}", graph_fingerprint(graph));

    if let Some(scores) = cache.get(&key)? {
        tracing::info!(key = %key, "betweenness served from cache");
        return Ok(scores);
    }

    let scores = betweenness_centrality(graph, config);
    cache.put(&key, &scores)?;
    tracing::info!(key = %key, nodes = scores.len(), "betweenness computed");
    Ok(scores)
}
