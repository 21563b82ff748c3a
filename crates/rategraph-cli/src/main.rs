//! rategraph CLI - build rating-similarity graphs and measure influence.
//!
//! # Usage
//!
//! ```bash
//! # Build a graph from ratings.txt / friendships.txt / users.txt
//! rategraph build data/ -o graph.bin
//!
//! # Summary statistics, for the similarity graph or the friendship graph
//! rategraph stats graph.bin
//! rategraph stats data/friendships.txt --friendships
//!
//! # Neighbor influence for the top 10% and 10-20% by betweenness
//! rategraph influence graph.bin --band 0:0.1 --band 0.1:0.2
//!
//! # Followee influence
//! rategraph friends graph.bin
//!
//! # Sample 1000 users and export for visualization
//! rategraph sample graph.bin -n 1000 --seed 7 -o small.bin
//! rategraph export small.bin --out-dir csv/ --weights
//!
//! # Random baseline
//! rategraph null-model --samples 20 --seed 1
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use rategraph_core::algo::cache::FileCache;
use rategraph_core::algo::clustering::{
    clustering_coefficients, degree_distribution, degree_sequence,
};
use rategraph_core::algo::sampling::sample_subgraph;
use rategraph_core::formats::{dat, text, Csv, CsvOptions};
use rategraph_core::generator::{generate_dataset, null_model_report, Dataset, NULL_MODEL_BANDS};
use rategraph_core::{
    AgreementTolerance, AnalysisContext, FriendshipIndex, GraphConfig, Polygon,
    RandomDatasetConfig, RankingKind, RatingIndex, RatingRecord, SocialGraph, UserId, VenueId,
};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rategraph")]
#[command(about = "Rating-similarity social graph CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from a dataset directory
    Build {
        /// Directory with ratings.txt and optional friendships.txt / users.txt
        data_dir: PathBuf,

        /// Output graph file (.json for JSON, anything else binary)
        #[arg(short, long)]
        output: PathBuf,

        /// Attach user coordinates from users.txt
        #[arg(long)]
        geo: bool,

        /// Do not attach followings
        #[arg(long)]
        no_friendships: bool,

        /// JSON graph configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the judgement validity limit
        #[arg(long)]
        validity_limit: Option<usize>,
    },

    /// Show statistics about a graph
    Stats {
        /// Graph file, or a friendships file with --friendships
        graph: PathBuf,

        /// Read GRAPH as `follower followee` lines and analyse the friendship graph
        #[arg(long)]
        friendships: bool,
    },

    /// Neighbor influence per importance band
    Influence {
        /// Graph file
        graph: PathBuf,

        /// Importance ranking
        #[arg(long, default_value = "structural")]
        ranking: Ranking,

        /// Percentile band START:END, 0 = top (repeatable)
        #[arg(long = "band", value_parser = parse_band, default_value = "0:1")]
        bands: Vec<(f64, f64)>,

        /// Rating agreement policy
        #[arg(long, default_value = "exact")]
        tolerance: Tolerance,

        /// Ratings file for the consensus population (default: graph nodes)
        #[arg(long)]
        ratings: Option<PathBuf>,

        /// Directory for cached centrality scores
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Average influence of followees on their followers
    Friends {
        /// Graph file
        graph: PathBuf,

        /// Rating agreement policy
        #[arg(long, default_value = "exact")]
        tolerance: Tolerance,
    },

    /// Draw a random induced subgraph
    Sample {
        /// Graph file
        graph: PathBuf,

        /// Number of users to draw
        #[arg(short = 'n', long)]
        nodes: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output graph file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write nodes.csv and edges.csv
    Export {
        /// Graph file
        graph: PathBuf,

        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,

        /// Include Longitude/Latitude columns
        #[arg(long)]
        geo: bool,

        /// Include the Weight column
        #[arg(long)]
        weights: bool,
    },

    /// Degree distribution and clustering coefficients
    Degrees {
        /// Graph file, or a friendships file with --friendships
        graph: PathBuf,

        /// Read GRAPH as `follower followee` lines and analyse the friendship graph
        #[arg(long)]
        friendships: bool,

        /// Number of highest-degree users to list
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Filter raw .dat dumps to a polygon and write text files
    Clean {
        /// Users dump
        #[arg(long)]
        users: PathBuf,

        /// Venues dump
        #[arg(long)]
        venues: PathBuf,

        /// Ratings dump
        #[arg(long)]
        ratings: PathBuf,

        /// Checkins dump, cleaned into checkins.txt
        #[arg(long)]
        checkins: Option<PathBuf>,

        /// Polygon as "lon,lat;lon,lat;..."
        #[arg(long, allow_hyphen_values = true)]
        polygon: String,

        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Write a random dataset
    Generate {
        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        #[command(flatten)]
        size: DatasetSize,
    },

    /// Average metrics over random datasets
    NullModel {
        /// Number of datasets
        #[arg(long, default_value = "20")]
        samples: usize,

        /// Seed of the first dataset
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Rating agreement policy
        #[arg(long, default_value = "exact")]
        tolerance: Tolerance,

        #[command(flatten)]
        size: DatasetSize,
    },
}

#[derive(clap::Args)]
struct DatasetSize {
    /// Number of users
    #[arg(long, default_value = "5600")]
    users: usize,

    /// Number of venues
    #[arg(long, default_value = "8000")]
    venues: usize,

    /// Number of ratings
    #[arg(long = "ratings-count", default_value = "21000")]
    ratings: usize,

    /// Probability of each directed friendship
    #[arg(long, default_value = "0.0008")]
    friendship_probability: f64,
}

impl From<DatasetSize> for RandomDatasetConfig {
    fn from(size: DatasetSize) -> Self {
        Self {
            users: size.users,
            venues: size.venues,
            ratings: size.ratings,
            friendship_probability: size.friendship_probability,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Ranking {
    /// Betweenness centrality
    Structural,
    /// Rating consensus
    Consensus,
}

impl From<Ranking> for RankingKind {
    fn from(r: Ranking) -> Self {
        match r {
            Ranking::Structural => RankingKind::Structural,
            Ranking::Consensus => RankingKind::Consensus,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Tolerance {
    /// Ratings must be equal
    Exact,
    /// Ratings may differ by one
    WithinOne,
}

impl From<Tolerance> for AgreementTolerance {
    fn from(t: Tolerance) -> Self {
        match t {
            Tolerance::Exact => AgreementTolerance::Exact,
            Tolerance::WithinOne => AgreementTolerance::WithinOne,
        }
    }
}

fn parse_band(raw: &str) -> std::result::Result<(f64, f64), String> {
    let (start, end) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {raw:?}"))?;
    let start: f64 = start.trim().parse().map_err(|_| format!("bad start {start:?}"))?;
    let end: f64 = end.trim().parse().map_err(|_| format!("bad end {end:?}"))?;
    Ok((start, end))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            data_dir,
            output,
            geo,
            no_friendships,
            config,
            validity_limit,
        } => cmd_build(&data_dir, &output, geo, no_friendships, config.as_deref(), validity_limit),
        Commands::Stats { graph, friendships } => cmd_stats(&graph, friendships),
        Commands::Influence {
            graph,
            ranking,
            bands,
            tolerance,
            ratings,
            cache_dir,
        } => cmd_influence(
            &graph,
            ranking.into(),
            &bands,
            tolerance.into(),
            ratings.as_deref(),
            cache_dir,
        ),
        Commands::Friends { graph, tolerance } => cmd_friends(&graph, tolerance.into()),
        Commands::Sample {
            graph,
            nodes,
            seed,
            output,
        } => cmd_sample(&graph, nodes, seed, &output),
        Commands::Export {
            graph,
            out_dir,
            geo,
            weights,
        } => cmd_export(&graph, &out_dir, geo, weights),
        Commands::Degrees {
            graph,
            top,
            friendships,
        } => cmd_degrees(&graph, top, friendships),
        Commands::Clean {
            users,
            venues,
            ratings,
            checkins,
            polygon,
            out_dir,
        } => cmd_clean(
            &users,
            &venues,
            &ratings,
            checkins.as_deref(),
            &polygon,
            &out_dir,
        ),
        Commands::Generate {
            out_dir,
            seed,
            size,
        } => cmd_generate(&out_dir, seed, size.into()),
        Commands::NullModel {
            samples,
            seed,
            tolerance,
            size,
        } => cmd_null_model(samples, seed, tolerance.into(), size.into()),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

fn load_graph(path: &Path) -> Result<SocialGraph> {
    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Loading {}...", path.display()));

    let graph = if is_json(path) {
        SocialGraph::load_json(path)
    } else {
        SocialGraph::load_binary(path)
    }
    .with_context(|| format!("Failed to load graph {}", path.display()))?;

    pb.finish_with_message(format!("Loaded in {:.2?}", start.elapsed()));
    Ok(graph)
}

fn save_graph(graph: &SocialGraph, path: &Path) -> Result<()> {
    if is_json(path) {
        graph.save_json(path)
    } else {
        graph.save_binary(path)
    }
    .with_context(|| format!("Failed to write graph {}", path.display()))
}

fn cmd_build(
    data_dir: &Path,
    output: &Path,
    geo: bool,
    no_friendships: bool,
    config_path: Option<&Path>,
    validity_limit: Option<usize>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => GraphConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => GraphConfig::default(),
    };
    config.include_geo |= geo;
    if no_friendships {
        config.include_friendships = false;
    }
    if let Some(limit) = validity_limit {
        config.judgement_validity_limit = limit;
    }
    tracing::debug!(?config, "graph config");

    let dataset = Dataset::load_dir(data_dir)
        .with_context(|| format!("Failed to read dataset {}", data_dir.display()))?;

    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message("Building similarity graph...");
    let graph = dataset.into_context(config).into_graph();
    pb.finish_with_message(format!("Built in {:.2?}", start.elapsed()));

    save_graph(&graph, output)?;
    println!(
        "Wrote {} ({} users, {} edges)",
        output.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

/// Load a saved graph, or the undirected friendship graph of a friendships file.
fn load_topology(path: &Path, friendships: bool) -> Result<SocialGraph> {
    if !friendships {
        return load_graph(path);
    }
    let records = text::read_friendships_file(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(SocialGraph::from_friendships(&FriendshipIndex::build(records)))
}

fn cmd_stats(path: &Path, friendships: bool) -> Result<()> {
    let graph = load_topology(path, friendships)?;
    let stats = graph.stats();

    println!("Graph Statistics");
    println!("================");
    println!("Users:          {}", stats.node_count);
    println!("Edges:          {}", stats.edge_count);
    println!("Avg degree:     {:.4}", stats.avg_degree);
    println!("Components:     {}", stats.component_count);
    println!("Avg clustering: {:.4}", stats.avg_clustering);
    Ok(())
}

/// Population ratings reconstructed from the graph's own nodes.
fn ratings_from_graph(graph: &SocialGraph) -> RatingIndex {
    RatingIndex::build(graph.nodes().flat_map(|node| {
        node.venue_ratings
            .iter()
            .map(|(venue, &rating)| RatingRecord::new(node.id.clone(), venue.clone(), rating))
    }))
}

fn cmd_influence(
    path: &Path,
    ranking: RankingKind,
    bands: &[(f64, f64)],
    tolerance: AgreementTolerance,
    ratings_path: Option<&Path>,
    cache_dir: Option<PathBuf>,
) -> Result<()> {
    let graph = load_graph(path)?;
    let ratings = match ratings_path {
        Some(p) => RatingIndex::build(
            text::read_ratings_file(p).with_context(|| format!("Failed to read {}", p.display()))?,
        ),
        None => ratings_from_graph(&graph),
    };
    let config = GraphConfig {
        agreement_tolerance: tolerance,
        ..GraphConfig::default()
    };
    let mut ctx = AnalysisContext::new(graph, ratings, config);
    if let Some(dir) = cache_dir {
        ctx = ctx.with_cache(Box::new(FileCache::new(dir)));
    }

    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message("Ranking users...");
    let ranker = ctx.ranker(ranking);
    let report = ctx
        .band_report(ranker.as_ref(), bands)
        .context("Failed to rank users")?;
    pb.finish_with_message(format!("Ranked in {:.2?}", start.elapsed()));

    println!("Influence by {} band", ranker.name());
    println!("=====================");
    for band in report {
        match band.influence {
            Ok(v) => println!(
                "{:>5.1}%-{:>5.1}%: {:.6} ({} users)",
                band.start * 100.0,
                band.end * 100.0,
                v,
                band.users
            ),
            Err(e) => println!(
                "{:>5.1}%-{:>5.1}%: undefined ({e})",
                band.start * 100.0,
                band.end * 100.0
            ),
        }
    }
    Ok(())
}

fn cmd_friends(path: &Path, tolerance: AgreementTolerance) -> Result<()> {
    let graph = load_graph(path)?;
    let config = GraphConfig {
        agreement_tolerance: tolerance,
        ..GraphConfig::default()
    };
    let ctx = AnalysisContext::new(graph, RatingIndex::default(), config);
    let by_user = ctx.evaluator().friend_influence_by_user();
    let defined = by_user.values().filter(|v| v.is_some()).count();

    match ctx.average_friend_influence() {
        Ok(v) => println!("Friend influence: {v:.6} ({defined} of {} users)", by_user.len()),
        Err(e) => println!("Friend influence: undefined ({e})"),
    }
    Ok(())
}

fn cmd_sample(path: &Path, nodes: usize, seed: u64, output: &Path) -> Result<()> {
    let graph = load_graph(path)?;
    let sub = sample_subgraph(&graph, nodes, seed).context("Failed to sample graph")?;
    save_graph(&sub, output)?;
    println!(
        "Sampled {} users, {} edges -> {}",
        sub.node_count(),
        sub.edge_count(),
        output.display()
    );
    Ok(())
}

fn cmd_export(path: &Path, out_dir: &Path, geo: bool, weights: bool) -> Result<()> {
    let graph = load_graph(path)?;
    let options = CsvOptions {
        include_geo: geo,
        include_weights: weights,
    };
    Csv::export(&graph, out_dir, options)
        .with_context(|| format!("Failed to export to {}", out_dir.display()))?;
    println!("Exported nodes.csv and edges.csv to {}", out_dir.display());
    Ok(())
}

fn cmd_degrees(path: &Path, top: usize, friendships: bool) -> Result<()> {
    let graph = load_topology(path, friendships)?;

    println!("Degree distribution");
    println!("===================");
    for (degree, fraction) in degree_distribution(&graph) {
        println!("{degree:>6} {fraction:.6}");
    }

    println!("\nTop {top} users by degree");
    for (i, (user, degree)) in degree_sequence(&graph).iter().take(top).enumerate() {
        println!("{}. {} ({})", i + 1, user, degree);
    }

    let coefficients = clustering_coefficients(&graph);
    let mut histogram = [0usize; 10];
    for &c in coefficients.values() {
        let bucket = ((c * 10.0) as usize).min(9);
        histogram[bucket] += 1;
    }
    println!("\nClustering coefficients");
    for (i, count) in histogram.iter().enumerate() {
        let close = if i == 9 { ']' } else { ')' };
        println!(
            "[{:.1}, {:.1}{close} {count}",
            i as f64 / 10.0,
            (i + 1) as f64 / 10.0
        );
    }
    Ok(())
}

fn cmd_clean(
    users_path: &Path,
    venues_path: &Path,
    ratings_path: &Path,
    checkins_path: Option<&Path>,
    polygon: &str,
    out_dir: &Path,
) -> Result<()> {
    let polygon = Polygon::parse(polygon).context("Invalid polygon")?;

    let users = dat::read_geo_file(users_path)
        .with_context(|| format!("Failed to read {}", users_path.display()))?;
    let venues = dat::read_geo_file(venues_path)
        .with_context(|| format!("Failed to read {}", venues_path.display()))?;
    let ratings = dat::read_ratings_file(ratings_path)
        .with_context(|| format!("Failed to read {}", ratings_path.display()))?;
    let (total_users, total_venues, total_ratings) = (users.len(), venues.len(), ratings.len());

    let users = dat::limit_by_polygon(users, &polygon);
    let venues = dat::limit_by_polygon(venues, &polygon);
    let ratings = dat::limit_by_user_venue(ratings, &users, &venues);
    let checkins = match checkins_path {
        Some(path) => {
            let all = dat::read_checkins_file(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let total = all.len();
            Some((dat::limit_by_user_venue(all, &users, &venues), total))
        }
        None => None,
    };

    println!("users:    {} of {}", users.len(), total_users);
    println!("venues:   {} of {}", venues.len(), total_venues);
    println!("ratings:  {} of {}", ratings.len(), total_ratings);
    if let Some((kept, total)) = &checkins {
        println!("checkins: {} of {}", kept.len(), total);
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let create = |name: &str| {
        let p = out_dir.join(name);
        File::create(&p).with_context(|| format!("Failed to create {}", p.display()))
    };
    let user_positions: HashMap<UserId, _> = dat::coordinates_by_id(&users);
    let venue_positions: HashMap<VenueId, _> = dat::coordinates_by_id(&venues);
    text::write_positions(create("users.txt")?, &user_positions)?;
    text::write_positions(create("venues.txt")?, &venue_positions)?;
    text::write_ratings(create("ratings.txt")?, &ratings)?;
    if let Some((kept, _)) = &checkins {
        text::write_checkins(create("checkins.txt")?, kept)?;
    }
    Ok(())
}

fn cmd_generate(out_dir: &Path, seed: u64, config: RandomDatasetConfig) -> Result<()> {
    let dataset = generate_dataset(&config, seed);
    dataset
        .save_dir(out_dir)
        .with_context(|| format!("Failed to write dataset to {}", out_dir.display()))?;
    println!(
        "Generated {} ratings, {} friendships in {}",
        dataset.ratings.len(),
        dataset.friendships.len(),
        out_dir.display()
    );
    Ok(())
}

fn cmd_null_model(
    samples: usize,
    seed: u64,
    tolerance: AgreementTolerance,
    config: RandomDatasetConfig,
) -> Result<()> {
    if samples == 0 {
        bail!("--samples must be at least 1");
    }
    let graph_config = GraphConfig {
        agreement_tolerance: tolerance,
        ..GraphConfig::default()
    };

    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Evaluating {samples} random datasets..."));
    let report = null_model_report(&config, samples, seed, graph_config)
        .context("Failed to evaluate random datasets")?;
    pb.finish_with_message(format!("Done in {:.2?}", start.elapsed()));

    let show = |v: Option<f64>| v.map_or_else(|| "undefined".to_string(), |v| format!("{v:.6}"));
    println!("Null model ({} samples)", report.samples);
    println!("======================");
    println!("Average degree:   {}", show(report.average_degree));
    for (&(s, e), v) in NULL_MODEL_BANDS.iter().zip(&report.band_influence) {
        println!("Top {:>3.0}-{:>3.0}%:     {}", s * 100.0, e * 100.0, show(*v));
    }
    println!("Friend influence: {}", show(report.friend_influence));
    Ok(())
}
