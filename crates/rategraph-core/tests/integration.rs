//! End-to-end pipeline tests: files in, graph built, metrics out.

use rategraph_core::algo::cache::{FileCache, MemoryCache};
use rategraph_core::algo::centrality::{betweenness_centrality, BetweennessConfig};
use rategraph_core::algo::ranking::ImportanceRanker;
use rategraph_core::algo::sampling::sample_subgraph;
use rategraph_core::formats::{dat, text, Csv, CsvOptions};
use rategraph_core::generator::{generate_dataset, Dataset};
use rategraph_core::{
    AgreementTolerance, AnalysisContext, Error, FriendshipIndex, FriendshipRecord, GraphConfig,
    Polygon, RandomDatasetConfig, RankingKind, RatingIndex, SimilarityGraphBuilder, SocialGraph,
    UserId,
};
use std::fs;

fn id(s: &str) -> UserId {
    UserId::from(s)
}

#[test]
fn test_three_user_scenario() {
    let ratings = RatingIndex::from_raw(vec![("1", "V1", "5"), ("2", "V1", "5"), ("3", "V1", "1")])
        .unwrap();
    let graph = SimilarityGraphBuilder::new(GraphConfig::default()).build(&ratings);

    let w12 = graph.weight(&id("1"), &id("2")).unwrap();
    let w13 = graph.weight(&id("1"), &id("3")).unwrap();
    let w23 = graph.weight(&id("3"), &id("2")).unwrap();
    assert!((w12 - 1.0 / 3.0).abs() < 1e-12);
    assert!((w13 - 0.2 / 3.0).abs() < 1e-12);
    assert_eq!(w13, w23);
}

#[test]
fn test_friendship_scenario() {
    let ratings = RatingIndex::from_raw(vec![("1", "V1", "4"), ("2", "V1", "4")]).unwrap();
    let mut friendships = FriendshipIndex::build(vec![
        FriendshipRecord::new("1", "2"),
        FriendshipRecord::new("1", "2"),
        FriendshipRecord::new("1", "3"),
    ]);
    assert_eq!(friendships.followings(&id("1")).unwrap().len(), 2);

    let ctx = AnalysisContext::build(ratings, Some(&mut friendships), None, GraphConfig::default());
    let followings = ctx.graph().node(&id("1")).unwrap().followings.clone().unwrap();
    assert_eq!(followings.into_iter().collect::<Vec<_>>(), vec![id("2")]);
    assert_eq!(ctx.average_friend_influence().unwrap(), 1.0);
}

#[test]
fn test_text_files_to_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("ratings.txt"),
        "1 a 5\n1 b 3\n2 a 5\n2 b 4\n3 b 3\n3 c 2\n4 c 2\n4 a 1\n",
    )
    .unwrap();
    fs::write(dir.path().join("friendships.txt"), "1 2\n2 1\n3 4\n4 99\n").unwrap();

    let dataset = Dataset::load_dir(dir.path()).unwrap();
    assert!(dataset.users.is_empty());
    let ctx = dataset.into_context(GraphConfig::default());
    assert_eq!(ctx.graph().node_count(), 4);

    for kind in [RankingKind::Structural, RankingKind::Consensus] {
        let ranker = ctx.ranker(kind);
        let report = ctx.band_report(ranker.as_ref(), &[(0.0, 1.0), (0.0, 0.5)]).unwrap();
        assert_eq!(report[0].users, 4);
        assert_eq!(report[1].users, 2);
        let all = report[0].influence.as_ref().unwrap();
        assert!((0.0..=1.0).contains(all));
    }

    // 4 follows only 99, which is not a node
    assert!(ctx.graph().node(&id("4")).unwrap().followings.is_none());
    let friend = ctx.average_friend_influence().unwrap();
    assert!((0.0..=1.0).contains(&friend));
}

#[test]
fn test_malformed_rating_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ratings.txt"), "1 a 5\n2 a 0\n").unwrap();
    let err = Dataset::load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, Error::MalformedRating { .. }));
}

#[test]
fn test_binary_and_json_persistence() {
    let dataset = generate_dataset(
        &RandomDatasetConfig {
            users: 30,
            venues: 10,
            ratings: 120,
            friendship_probability: 0.1,
        },
        3,
    );
    let graph = dataset.into_context(GraphConfig::default()).into_graph();
    let dir = tempfile::tempdir().unwrap();

    let bin = dir.path().join("graph.bin");
    graph.save_binary(&bin).unwrap();
    let from_bin = SocialGraph::load_binary(&bin).unwrap();

    let json = dir.path().join("graph.json");
    graph.save_json(&json).unwrap();
    let from_json = SocialGraph::load_json(&json).unwrap();

    for loaded in [&from_bin, &from_json] {
        assert_eq!(loaded.node_count(), graph.node_count());
        assert_eq!(loaded.edge_count(), graph.edge_count());
        for node in graph.nodes() {
            assert_eq!(loaded.node(&node.id), Some(node));
        }
    }
    for (a, b, w) in graph.edges() {
        assert_eq!(from_bin.weight(a, b).map(f64::to_bits), Some(w.to_bits()));
        assert_eq!(from_json.weight(a, b).map(f64::to_bits), Some(w.to_bits()));
    }
}

#[test]
fn test_file_cache_survives_reload() {
    let dataset = generate_dataset(
        &RandomDatasetConfig {
            users: 25,
            venues: 8,
            ratings: 90,
            friendship_probability: 0.0,
        },
        9,
    );
    let cache_dir = tempfile::tempdir().unwrap();
    let graph = dataset.into_context(GraphConfig::default()).into_graph();
    let expected = betweenness_centrality(&graph, BetweennessConfig::default());

    let first = AnalysisContext::new(graph.clone(), RatingIndex::default(), GraphConfig::default())
        .with_cache(Box::new(FileCache::new(cache_dir.path())));
    let scores = first.structural_ranker().rank().unwrap();
    assert_eq!(scores, expected);
    assert_eq!(fs::read_dir(cache_dir.path()).unwrap().count(), 1);

    let second = AnalysisContext::new(graph, RatingIndex::default(), GraphConfig::default())
        .with_cache(Box::new(FileCache::new(cache_dir.path())));
    let again = second.structural_ranker().rank().unwrap();
    assert_eq!(again, expected);
}

#[test]
fn test_tolerance_changes_influence() {
    let ratings = RatingIndex::from_raw(vec![("1", "V", "4"), ("2", "V", "5")]).unwrap();
    let exact = AnalysisContext::build(ratings.clone(), None, None, GraphConfig::default());
    let loose = AnalysisContext::build(
        ratings,
        None,
        None,
        GraphConfig {
            agreement_tolerance: AgreementTolerance::WithinOne,
            ..GraphConfig::default()
        },
    )
    .with_cache(Box::new(MemoryCache::new()));

    let ranker = exact.consensus_ranker();
    assert_eq!(exact.average_influence_for_band(&ranker, 0.0, 1.0).unwrap(), 0.0);
    let ranker = loose.consensus_ranker();
    assert_eq!(loose.average_influence_for_band(&ranker, 0.0, 1.0).unwrap(), 1.0);
}

#[test]
fn test_sample_then_export() {
    let dataset = generate_dataset(
        &RandomDatasetConfig {
            users: 50,
            venues: 12,
            ratings: 200,
            friendship_probability: 0.05,
        },
        21,
    );
    let graph = dataset.into_context(GraphConfig::default()).into_graph();
    let sub = sample_subgraph(&graph, 10, 4).unwrap();

    let dir = tempfile::tempdir().unwrap();
    Csv::export(
        &sub,
        dir.path(),
        CsvOptions {
            include_geo: false,
            include_weights: true,
        },
    )
    .unwrap();

    let edges = fs::File::open(dir.path().join("edges.csv")).unwrap();
    let topology = Csv::read_edges(edges).unwrap();
    assert_eq!(topology.edge_count(), sub.edge_count());
    for (a, b, w) in sub.edges() {
        assert_eq!(topology.weight(a, b), Some(w));
    }
}

#[test]
fn test_dat_cleaning_pipeline() {
    let users = concat!(
        " id | latitude | longitude\n----+---+---\n",
        " 1 | 37.77 | -122.42\n 2 | 37.76 | -122.43\n 3 | 51.05 | -114.07\n",
    );
    let venues = concat!(
        " id | latitude | longitude\n----+---+---\n",
        " 10 | 37.78 | -122.41\n 11 | 40.71 | -74.00\n",
    );
    let ratings = concat!(
        " user_id | venue_id | rating\n---+---+---\n",
        " 1 | 10 | 5\n 2 | 10 | 5\n 3 | 10 | 1\n 1 | 11 | 2\n",
    );

    let polygon = Polygon::parse(concat!(
        "-122.553454,37.812965;-122.359602,37.817252;",
        "-122.346337,37.708571;-122.523607,37.708332",
    ))
    .unwrap();
    let users = dat::limit_by_polygon(dat::read_geo_records(users.as_bytes()).unwrap(), &polygon);
    let venues =
        dat::limit_by_polygon(dat::read_geo_records(venues.as_bytes()).unwrap(), &polygon);
    let ratings = dat::read_rating_records(ratings.as_bytes()).unwrap();
    let ratings = dat::limit_by_user_venue(ratings, &users, &venues);
    assert_eq!(ratings.len(), 2);

    let mut out = Vec::new();
    text::write_ratings(&mut out, &ratings).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1 10 5\n2 10 5\n");
}
