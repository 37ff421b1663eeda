use rand::rngs::StdRng;
use rand::SeedableRng;

use partysim::io::weights::{load_weight_matrix_csv, write_weight_matrix_csv};
use partysim::model::party::{
    DEFAULT_DENSITY, DEFAULT_INVITE_THRESHOLD, DEFAULT_POPULATION, MAX_MEETINGS_PER_GUEST, MAX_ROUNDS,
};
use partysim::{GraphGenerator, PartyConfig, PartyModel, ProbabilityPolicy, RandomGraph, SyntheticGraph, WeightMatrix};

fn small_graph() -> WeightMatrix {
    WeightMatrix::new(vec![
        vec![0.0, 0.95, 0.92, 0.3, 0.0],
        vec![0.95, 0.0, 0.4, 0.0, 0.2],
        vec![0.92, 0.4, 0.0, 0.6, 0.0],
        vec![0.3, 0.0, 0.6, 0.0, 0.7],
        vec![0.0, 0.2, 0.0, 0.7, 0.0],
    ])
    .expect("valid matrix")
}

#[test]
fn matrix_rejects_bad_shapes_and_values() {
    assert!(WeightMatrix::new(vec![]).is_err());
    assert!(WeightMatrix::new(vec![vec![0.0, 1.0]]).is_err());
    assert!(WeightMatrix::new(vec![vec![0.0, 0.5], vec![0.4, 0.0]]).is_err());
    assert!(WeightMatrix::new(vec![vec![0.0, -0.5], vec![-0.5, 0.0]]).is_err());
    assert!(WeightMatrix::new(vec![vec![0.0, f64::NAN], vec![f64::NAN, 0.0]]).is_err());
    // weights above one are allowed
    assert!(WeightMatrix::new(vec![vec![0.0, 1.7], vec![1.7, 0.0]]).is_ok());
}

#[test]
fn matrix_deserialization_validates() {
    let ok: WeightMatrix = serde_json::from_str("[[0.0, 0.5], [0.5, 0.0]]").unwrap();
    assert_eq!(ok.get(1, 0), 0.5);
    assert!(serde_json::from_str::<WeightMatrix>("[[0.0, 0.5], [0.1, 0.0]]").is_err());
    assert_eq!(serde_json::to_string(&ok).unwrap(), "[[0.0,0.5],[0.5,0.0]]");
}

#[test]
fn random_graph_is_symmetric_and_reproducible() {
    let a = RandomGraph::new(StdRng::seed_from_u64(3))
        .generate(DEFAULT_POPULATION, DEFAULT_DENSITY)
        .unwrap();
    let b = RandomGraph::new(StdRng::seed_from_u64(3))
        .generate(DEFAULT_POPULATION, DEFAULT_DENSITY)
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), DEFAULT_POPULATION);
    assert!(a.is_symmetric());
    for i in 0..a.len() {
        assert_eq!(a.get(i, i), 0.0);
        assert!(a.row(i).iter().all(|w| (0.0..1.0).contains(w)));
    }
}

#[test]
fn random_graph_density_extremes() {
    let mut gen = RandomGraph::new(StdRng::seed_from_u64(11));
    assert_eq!(gen.generate(10, 0.0).unwrap().total(), 0.0);
    let full = gen.generate(10, 1.0).unwrap();
    let edges = (0..10)
        .flat_map(|a| (0..10).map(move |b| (a, b)))
        .filter(|&(a, b)| a != b && full.get(a, b) > 0.0)
        .count();
    // a uniform draw of exactly 0.0 is possible in principle, not in practice
    assert!(edges >= 80);
    assert!(gen.generate(0, 0.5).is_err());
    assert!(gen.generate(5, 1.5).is_err());
}

#[test]
fn synthetic_graph_shape() {
    let g = SyntheticGraph.generate(6, 0.4).unwrap();
    assert!(g.is_symmetric());
    // reach = 0.4 * 5 = 2
    assert!((g.get(0, 1) - 0.95).abs() < 1e-12);
    assert!(g.get(0, 2) > 0.0 && g.get(0, 2) < g.get(0, 1));
    assert_eq!(g.get(0, 3), 0.0);
    assert_eq!(g.get(4, 4), 0.0);
}

#[test]
fn config_defaults_match_constants() {
    let cfg = PartyConfig::default();
    assert_eq!(cfg.host, 0);
    assert_eq!(cfg.invite_threshold, DEFAULT_INVITE_THRESHOLD);
    assert_eq!(cfg.base, 0.5);
    assert_eq!(cfg.strengthen, 0.1);
    assert_eq!(cfg.probability_policy, ProbabilityPolicy::Raw);
    cfg.check().unwrap();
}

#[test]
fn config_from_partial_json() {
    let cfg: PartyConfig =
        serde_json::from_str(r#"{"host": 3, "probability_policy": "clamped", "rounds": 4}"#).unwrap();
    assert_eq!(cfg.host, 3);
    assert_eq!(cfg.rounds, 4);
    assert_eq!(cfg.probability_policy, ProbabilityPolicy::Clamped);
    assert_eq!(cfg.base, 0.5);
}

#[test]
fn config_validation() {
    let g = small_graph();
    let bad_host = PartyConfig { host: 5, ..PartyConfig::default() };
    assert!(PartyModel::new(bad_host, g.clone()).is_err());

    let bad_j = PartyConfig { strengthen: 0.0, ..PartyConfig::default() };
    assert!(bad_j.check().is_err());

    let no_rounds = PartyConfig { rounds: 0, ..PartyConfig::default() };
    assert!(no_rounds.check().is_err());

    let max_rounds = PartyConfig { rounds: MAX_ROUNDS, ..PartyConfig::default() };
    assert!(max_rounds.check().is_ok());
    let too_many_rounds = PartyConfig { rounds: MAX_ROUNDS + 1, ..PartyConfig::default() };
    assert!(too_many_rounds.check().is_err());
    let huge_rounds = PartyConfig { rounds: usize::MAX, ..PartyConfig::default() };
    let err = PartyModel::new(huge_rounds, g.clone()).err().expect("huge rounds rejected");
    assert!(err.to_string().contains("rounds"));

    let max_meetings = PartyConfig { meetings_per_guest: MAX_MEETINGS_PER_GUEST, ..PartyConfig::default() };
    assert!(max_meetings.check().is_ok());
    let too_many_meetings = PartyConfig { meetings_per_guest: MAX_MEETINGS_PER_GUEST + 1, ..PartyConfig::default() };
    assert!(too_many_meetings.check().is_err());
    let json_meetings: PartyConfig = serde_json::from_str(r#"{"meetings_per_guest": 1000000000}"#).unwrap();
    assert!(json_meetings.check().is_err());

    let err = PartyModel::new(PartyConfig::default(), WeightMatrix::zeros(4))
        .err()
        .expect("empty graph rejected");
    assert!(err.to_string().contains("total weight is zero"));
}

#[test]
fn host_party_outcome() {
    let model = PartyModel::new(PartyConfig::default(), small_graph()).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let outcome = model.host_party(&mut rng);
    assert_eq!(outcome.host, 0);
    assert_eq!(outcome.invitees, vec![1, 2]);
    assert!(outcome.attendees.iter().all(|a| outcome.invitees.contains(a)));
    assert_eq!(outcome.probabilities.len(), 2);
    assert_eq!(outcome.out_of_range, 0);
    assert!((outcome.probabilities[&2] - (0.5 + 0.5 * (0.92 - 1500.0 / 2215.0))).abs() < 1e-12);
}

#[test]
fn outcome_report_lines() {
    let model = PartyModel::new(PartyConfig::default(), small_graph()).unwrap();
    let outcome = model.host_party(&mut StdRng::seed_from_u64(5));
    let text = outcome.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Invited guests: [1, 2]");
    assert!(lines[1].starts_with("Actual attendees: ["));
    assert!(lines[2].starts_with("Attendance probabilities: {1: "));
}

#[test]
fn clamped_policy_bounds_probabilities() {
    let cfg = PartyConfig {
        base: 1.2,
        probability_policy: ProbabilityPolicy::Clamped,
        ..PartyConfig::default()
    };
    let model = PartyModel::new(cfg, small_graph()).unwrap();
    let outcome = model.host_party(&mut StdRng::seed_from_u64(9));
    assert_eq!(outcome.out_of_range, 2);
    assert!(outcome.probabilities.values().all(|p| *p == 1.0));
    assert_eq!(outcome.attendees, vec![1, 2]);
}

#[test]
fn raw_policy_reports_out_of_range() {
    let cfg = PartyConfig { base: 1.2, ..PartyConfig::default() };
    let model = PartyModel::new(cfg, small_graph()).unwrap();
    let outcome = model.host_party(&mut StdRng::seed_from_u64(9));
    assert_eq!(outcome.out_of_range, 2);
    assert!(outcome.probabilities.values().all(|p| *p > 1.0));
}

#[test]
fn mingle_strengthens_edges_between_present_people() {
    let mut model = PartyModel::new(PartyConfig::default(), small_graph()).unwrap();
    let before = model.graph().clone();
    let meetings = model.mingle(&[1, 2], &mut StdRng::seed_from_u64(21));

    // host, 1 and 2 are all pairwise connected
    assert_eq!(meetings.len(), 3);
    for m in &meetings {
        assert_ne!(m.a, m.b);
        assert!([0, 1, 2].contains(&m.a) && [0, 1, 2].contains(&m.b));
        assert!(m.strengthened);
        assert!(model.graph().get(m.a, m.b) > before.get(m.a, m.b));
    }
    assert!(model.graph().is_symmetric());
    // absent people are untouched
    assert_eq!(model.graph().row(4), before.row(4));
}

#[test]
fn mingle_alone_meets_nobody() {
    let mut model = PartyModel::new(PartyConfig::default(), small_graph()).unwrap();
    assert!(model.mingle(&[], &mut StdRng::seed_from_u64(1)).is_empty());
}

#[test]
fn mingle_with_a_stranger_does_not_create_an_edge() {
    let cfg = PartyConfig { meetings_per_guest: 3, ..PartyConfig::default() };
    let mut model = PartyModel::new(cfg, small_graph()).unwrap();
    // host 0 and person 4 have no relationship
    let meetings = model.mingle(&[4], &mut StdRng::seed_from_u64(2));
    assert_eq!(meetings.len(), 6);
    assert!(meetings.iter().all(|m| !m.strengthened));
    assert_eq!(model.graph().get(0, 4), 0.0);
}

#[test]
fn simulate_is_reproducible() {
    let graph = RandomGraph::new(StdRng::seed_from_u64(8))
        .generate(40, DEFAULT_DENSITY)
        .unwrap();
    let cfg = PartyConfig { rounds: 5, invite_threshold: 0.7, ..PartyConfig::default() };

    let mut a = PartyModel::new(cfg.clone(), graph.clone()).unwrap();
    let mut b = PartyModel::new(cfg, graph).unwrap();
    let ra = a.simulate(&mut StdRng::seed_from_u64(99));
    let rb = b.simulate(&mut StdRng::seed_from_u64(99));
    assert_eq!(ra, rb);
    assert_eq!(ra.len(), 5);
    assert_eq!(ra.iter().map(|r| r.round).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert_eq!(a.graph(), b.graph());
    assert!(a.graph().is_symmetric());
}

#[test]
fn repeated_parties_never_weaken_the_host() {
    let cfg = PartyConfig { rounds: 10, invite_threshold: 0.5, ..PartyConfig::default() };
    let mut model = PartyModel::new(cfg, small_graph()).unwrap();
    let start = model.graph().row_sum(0) / 5.0;
    let rounds = model.simulate(&mut StdRng::seed_from_u64(4));
    let mut prev = start;
    for r in &rounds {
        assert!(r.host_mean_weight >= prev);
        prev = r.host_mean_weight;
    }
}

#[test]
fn weight_csv_round_trip() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("graph.csv");
    let g = small_graph();
    write_weight_matrix_csv(&path, &g).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("p0,p1,p2,p3,p4\n"));
    assert_eq!(load_weight_matrix_csv(&path).unwrap(), g);
}

#[test]
fn weight_csv_with_labels_and_no_header() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let labelled = tmp.path().join("labelled.csv");
    std::fs::write(&labelled, "name,ann,bob\nann,0,0.9\nbob,0.9,0\n").unwrap();
    let g = load_weight_matrix_csv(&labelled).unwrap();
    assert_eq!(g.len(), 2);
    assert_eq!(g.get(0, 1), 0.9);

    let named = tmp.path().join("named.csv");
    std::fs::write(&named, "name,Nan,Inf\nNan,0,0.4\nInf,0.4,0\n").unwrap();
    let g = load_weight_matrix_csv(&named).unwrap();
    assert_eq!(g.len(), 2);
    assert_eq!(g.get(1, 0), 0.4);

    let bare = tmp.path().join("bare.csv");
    std::fs::write(&bare, "0,0.3\n0.3,0\n").unwrap();
    assert_eq!(load_weight_matrix_csv(&bare).unwrap().get(1, 0), 0.3);
}

#[test]
fn weight_csv_rejects_invalid_matrices() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let asym = tmp.path().join("asym.csv");
    std::fs::write(&asym, "0,0.3\n0.4,0\n").unwrap();
    assert!(load_weight_matrix_csv(&asym).is_err());

    let ragged = tmp.path().join("ragged.csv");
    std::fs::write(&ragged, "0,0.3,0.1\n0.3,0\n").unwrap();
    assert!(load_weight_matrix_csv(&ragged).is_err());

    let empty = tmp.path().join("empty.csv");
    std::fs::write(&empty, "a,b\n").unwrap();
    assert!(load_weight_matrix_csv(&empty).is_err());

    assert!(load_weight_matrix_csv(tmp.path().join("missing.csv")).is_err());
}
