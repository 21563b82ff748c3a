//! Property-based tests for similarity graph invariants.
//!
//! - Edge symmetry and weight bounds
//! - Judgement validity monotonicity
//! - No isolated nodes after construction
//! - Sampler invariants
//! - Persistence roundtrips

use proptest::prelude::*;
use rategraph_core::{
    edge_weight, GraphConfig, RatingIndex, RatingRecord, SimilarityGraphBuilder, SocialGraph,
    UserId,
};

fn arb_records() -> impl Strategy<Value = Vec<(u8, u8, u8)>> {
    prop::collection::vec((0u8..10, 0u8..6, 1u8..=5), 1..60)
}

fn index(records: &[(u8, u8, u8)]) -> RatingIndex {
    RatingIndex::from_raw(
        records
            .iter()
            .map(|&(u, v, r)| (u64::from(u), u64::from(v), r.to_string())),
    )
    .unwrap()
}

fn build(records: &[(u8, u8, u8)], config: GraphConfig) -> (RatingIndex, SocialGraph) {
    let ratings = index(records);
    let graph = SimilarityGraphBuilder::new(config).build(&ratings);
    (ratings, graph)
}

fn edge_list(graph: &SocialGraph) -> Vec<(UserId, UserId, u64)> {
    let mut edges: Vec<_> = graph
        .edges()
        .map(|(a, b, w)| {
            let (a, b) = if a <= b { (a, b) } else { (b, a) };
            (a.clone(), b.clone(), w.to_bits())
        })
        .collect();
    edges.sort();
    edges
}

mod construction_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn weights_symmetric_and_bounded(records in arb_records(), limit in 0usize..6) {
            let config = GraphConfig { judgement_validity_limit: limit, ..GraphConfig::default() };
            let (ratings, graph) = build(&records, config);

            for (a, b, w) in graph.edges() {
                prop_assert!(w > 0.0 && w <= 1.0, "weight {} out of range", w);
                prop_assert_eq!(graph.weight(a, b), graph.weight(b, a));

                let expected = edge_weight(
                    ratings.ratings_of(a).unwrap(),
                    ratings.ratings_of(b).unwrap(),
                    &config,
                );
                prop_assert_eq!(Some(w), expected);
            }
        }

        #[test]
        fn edges_exist_iff_shared_venue(records in arb_records()) {
            let (ratings, graph) = build(&records, GraphConfig::default());
            let users: Vec<&UserId> = ratings.user_venue_ratings().keys().collect();

            for (i, a) in users.iter().enumerate() {
                for b in &users[i + 1..] {
                    let ra = ratings.ratings_of(a).unwrap();
                    let rb = ratings.ratings_of(b).unwrap();
                    let shares = ra.keys().any(|v| rb.contains_key(v));
                    prop_assert_eq!(graph.weight(a, b).is_some(), shares);
                }
            }
        }

        #[test]
        fn no_isolated_nodes(records in arb_records()) {
            let (_, graph) = build(&records, GraphConfig::default());
            for node in graph.nodes() {
                prop_assert!(graph.degree(&node.id) > 0, "isolated node {}", node.id);
            }
        }

        #[test]
        fn construction_is_deterministic(records in arb_records()) {
            let (_, a) = build(&records, GraphConfig::default());
            let (_, b) = build(&records, GraphConfig::default());
            prop_assert_eq!(edge_list(&a), edge_list(&b));
        }

        #[test]
        fn validity_monotone(limit in 0usize..20, shared in 1usize..40) {
            let config = GraphConfig { judgement_validity_limit: limit, ..GraphConfig::default() };
            let v = config.judgement_validity(shared);
            prop_assert!(v > 0.0 && v <= 1.0);
            prop_assert!(v <= config.judgement_validity(shared + 1));
        }

        #[test]
        fn duplicate_ratings_last_wins(
            user in 0u64..5,
            venue in 0u64..5,
            first in 1u8..=5,
            last in 1u8..=5,
        ) {
            let records = vec![
                RatingRecord::parse(user, venue, &first.to_string()).unwrap(),
                RatingRecord::parse(user, venue, &last.to_string()).unwrap(),
            ];
            let index = RatingIndex::build(records);
            let rating = index.ratings_of(&UserId::from(user)).unwrap().values().next().copied();
            prop_assert_eq!(rating.map(|r| r.value()), Some(last));
            prop_assert_eq!(index.venue_rating_distribution().values().next().unwrap().total(), 1);
        }
    }
}

mod sampling_props {
    use super::*;
    use rategraph_core::algo::sampling::sample_subgraph;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn sample_is_induced_subgraph(
            records in arb_records(),
            k in 1usize..8,
            seed in any::<u64>(),
        ) {
            let (_, graph) = build(&records, GraphConfig::default());
            prop_assume!(k < graph.node_count());

            let sub = sample_subgraph(&graph, k, seed).unwrap();
            prop_assert!(sub.node_count() <= k);
            for node in sub.nodes() {
                prop_assert_eq!(Some(node), graph.node(&node.id));
            }
            for (a, b, w) in sub.edges() {
                prop_assert_eq!(graph.weight(a, b), Some(w));
            }

            let again = sample_subgraph(&graph, k, seed).unwrap();
            prop_assert_eq!(edge_list(&sub), edge_list(&again));
        }

        #[test]
        fn oversized_sample_rejected(records in arb_records(), extra in 0usize..3) {
            let (_, graph) = build(&records, GraphConfig::default());
            prop_assert!(sample_subgraph(&graph, graph.node_count() + extra, 1).is_err());
        }
    }
}

mod persistence_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn binary_roundtrip_is_exact(records in arb_records()) {
            let (_, graph) = build(&records, GraphConfig::default());
            let mut buf = Vec::new();
            graph.write_binary(&mut buf).unwrap();
            let back = SocialGraph::read_binary(buf.as_slice()).unwrap();

            prop_assert_eq!(edge_list(&graph), edge_list(&back));
            for node in graph.nodes() {
                prop_assert_eq!(Some(node), back.node(&node.id));
            }
        }
    }
}

mod influence_props {
    use super::*;
    use rategraph_core::algo::influence::InfluenceEvaluator;
    use rategraph_core::AgreementTolerance;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn influence_in_unit_interval(records in arb_records()) {
            let (_, graph) = build(&records, GraphConfig::default());
            for tolerance in [AgreementTolerance::Exact, AgreementTolerance::WithinOne] {
                let evaluator = InfluenceEvaluator::new(&graph, tolerance);
                for node in graph.nodes() {
                    if let Ok(v) = evaluator.user_influence(&node.id) {
                        prop_assert!((0.0..=1.0).contains(&v));
                    }
                }
            }
        }

        #[test]
        fn within_one_never_below_exact(records in arb_records()) {
            let (_, graph) = build(&records, GraphConfig::default());
            let exact = InfluenceEvaluator::new(&graph, AgreementTolerance::Exact);
            let loose = InfluenceEvaluator::new(&graph, AgreementTolerance::WithinOne);
            for node in graph.nodes() {
                let pair = (exact.user_influence(&node.id), loose.user_influence(&node.id));
                if let (Ok(e), Ok(l)) = pair {
                    prop_assert!(l >= e);
                }
            }
        }
    }
}
