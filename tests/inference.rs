mod common;

use approx::assert_abs_diff_eq;
use itertools::iproduct;
use ndarray::array;

use common::{binary, factor, init_logging};
use pgmodel::{
    Assignment,
    BayesianNetwork,
    ConditionalRandomField,
    Edge,
    EliminationOrder,
    MarkovNetwork,
    Mode,
    Model,
    Pgm,
    PgmError,
    Query,
    RandomVariable,
    Var
};


#[test]
/// a -- b -- c with phi(a, b), phi(c, b) and phi(a)
fn three_variable_chain() {
    init_logging();

    let nodes: Vec<Var> = ["a", "b", "c"].iter().map(|id| binary(id)).collect();
    let factors = vec![
        factor("phi_ba", &nodes, &["a", "b"], array![[0.9, 0.1], [0.2, 0.8]].into_dyn()),
        factor("phi_cb", &nodes, &["c", "b"], array![[0.3, 0.5], [0.7, 0.5]].into_dyn()),
        factor("phi_a", &nodes, &["a"], array![0.6, 0.4].into_dyn())
    ];
    let edges = vec![ Edge::undirected("a", "b"), Edge::undirected("b", "c") ];
    let pgm = Pgm::new("chain", nodes, edges, factors).expect("Unexpected error");

    let result = pgm.query(&Query::new(&["c"]).given("a", true)).expect("Unexpected error");
    let assn = Assignment::new().with("c", true);
    assert_abs_diff_eq!(0.32, result.probability(&assn).expect("Unexpected error"), epsilon = 1e-9);
}


/// C -> E, E -> D, E -> F
fn cefd() -> BayesianNetwork {
    let nodes: Vec<Var> = ["C", "E", "F", "D"].iter().map(|id| binary(id)).collect();
    let factors = vec![
        factor("phi_c", &nodes, &["C"], array![0.8, 0.2].into_dyn()),
        factor("phi_ec", &nodes, &["C", "E"], array![[0.9, 0.1], [0.7, 0.3]].into_dyn()),
        factor("phi_fe", &nodes, &["E", "F"], array![[0.9, 0.1], [0.5, 0.5]].into_dyn()),
        factor("phi_de", &nodes, &["E", "D"], array![[0.7, 0.3], [0.4, 0.6]].into_dyn())
    ];
    let edges = vec![ Edge::directed("C", "E"), Edge::directed("E", "D"), Edge::directed("E", "F") ];

    BayesianNetwork::new("cefd", nodes, edges, factors).expect("Unexpected error")
}


#[test]
fn bayesian_network_evidence() {
    init_logging();
    let bn = cefd();

    let result = bn.query(&Query::new(&["E"]).given("F", true)).expect("Unexpected error");
    let assn = Assignment::new().with("E", true);
    assert_abs_diff_eq!(0.774, result.value(&assn).expect("Unexpected error"), epsilon = 1e-9);

    // the constant is P(F = true)
    let z = result.normalization().expect("missing normalization");
    assert_abs_diff_eq!(0.774 + 0.14 * 0.5, z, epsilon = 1e-9);
    assert_abs_diff_eq!(0.774 / z, result.probability(&assn).expect("Unexpected error"), epsilon = 1e-9);
}


#[test]
fn bayesian_network_most_probable_explanation() {
    init_logging();
    let bn = cefd();

    let evidence = Assignment::new().with("F", true);
    let (best, value) = bn.most_probable(&evidence).expect("Unexpected error");
    let expected = Assignment::new().with("C", true).with("E", true).with("D", true).with("F", true);
    assert_eq!(expected, best);
    assert_abs_diff_eq!(0.4536, value, epsilon = 1e-9);

    let query = Query::new(&["E"]).given("F", true).with_mode(Mode::MaxProduct);
    let result = bn.query(&query).expect("Unexpected error");
    assert_abs_diff_eq!(0.4536, result.value(&Assignment::new().with("E", true)).expect("Unexpected error"), epsilon = 1e-9);
    assert_abs_diff_eq!(0.024, result.value(&Assignment::new().with("E", false)).expect("Unexpected error"), epsilon = 1e-9);
    assert_eq!(Some(&expected), result.explanation());
}


/// Koller & Friedman Figure 4.1, the misconception example
fn misconception() -> MarkovNetwork {
    let nodes: Vec<Var> = ["A", "B", "C", "D"].iter().map(|id| binary(id)).collect();
    let factors = vec![
        factor("phi_ab", &nodes, &["A", "B"], array![[10., 1.], [5., 30.]].into_dyn()),
        factor("phi_bc", &nodes, &["B", "C"], array![[100., 1.], [1., 100.]].into_dyn()),
        factor("phi_cd", &nodes, &["C", "D"], array![[1., 100.], [100., 1.]].into_dyn()),
        factor("phi_da", &nodes, &["D", "A"], array![[100., 1.], [1., 100.]].into_dyn())
    ];
    let edges = vec![
        Edge::undirected("A", "B"),
        Edge::undirected("B", "C"),
        Edge::undirected("C", "D"),
        Edge::undirected("D", "A")
    ];

    MarkovNetwork::new("misconception", nodes, edges, factors).expect("Unexpected error")
}


#[test]
fn markov_network_marginal() {
    init_logging();
    let mn = misconception();

    let result = mn.query(&Query::new(&["A", "B"])).expect("Unexpected error");
    let assn = Assignment::new().with("A", false).with("B", true);
    assert_abs_diff_eq!(0.69, result.probability(&assn).expect("Unexpected error"), epsilon = 0.005);

    assert_abs_diff_eq!(7_201_840., mn.partition_function().expect("Unexpected error"), epsilon = 1e-6);
    assert_abs_diff_eq!(7_201_840., result.normalization().expect("missing normalization"), epsilon = 1e-6);

    let full = Assignment::new().with("A", false).with("B", true).with("C", true).with("D", false);
    assert_abs_diff_eq!(5e6 / 7_201_840., mn.probability(&full).expect("Unexpected error"), epsilon = 1e-12);
}


#[test]
fn markov_network_independence() {
    let mn = misconception();

    // opposite corners of the loop are separated by the other two
    assert!(mn.is_conditionally_independent_of("A", "C").expect("Unexpected error"));
    assert!(mn.is_conditionally_independent_of("B", "D").expect("Unexpected error"));
    assert!(! mn.is_conditionally_independent_of("A", "B").expect("Unexpected error"));

    match mn.is_conditionally_independent_of("A", "Z") {
        Err(PgmError::InvalidVariable(_)) => assert!(true),
        _ => panic!("expected invalid variable")
    };

    match mn.is_conditionally_independent_of("A", "A") {
        Err(PgmError::InvalidVariable(_)) => assert!(true),
        _ => panic!("expected invalid variable")
    };
}


#[test]
fn markov_network_order_invariance() {
    let mn = misconception();
    let assn = Assignment::new().with("B", true);

    let policies = vec![
        EliminationOrder::Lexicographic,
        EliminationOrder::MinNeighbours,
        EliminationOrder::MaxCardinality,
        EliminationOrder::Explicit(vec![ String::from("D"), String::from("A"), String::from("C") ])
    ];

    let values: Vec<f64> = policies.into_iter()
        .map(|policy| {
            let result = mn.query(&Query::new(&["B"]).with_order(policy)).expect("Unexpected error");
            result.value(&assn).expect("Unexpected error")
        })
        .collect();

    for v in &values[1..] {
        assert_abs_diff_eq!(values[0], *v, epsilon = 1e-6);
    }
}


#[test]
fn markov_network_most_probable_explanation() {
    let mn = misconception();

    let (best, value) = mn.most_probable(&Assignment::new()).expect("Unexpected error");
    let expected = Assignment::new().with("A", false).with("B", true).with("C", true).with("D", false);
    assert_eq!(expected, best);
    assert_abs_diff_eq!(5e6, value, epsilon = 1e-6);
}


/// Observed X_1, X_2, X_3 each tied to the target Y_1
fn crf() -> ConditionalRandomField {
    let observed: Vec<Var> = ["X_1", "X_2", "X_3"].iter().map(|id| binary(id)).collect();
    let targets = vec![ binary("Y_1") ];
    let all: Vec<Var> = observed.iter().chain(targets.iter()).cloned().collect();

    let mut factors = Vec::new();
    let mut edges = Vec::new();
    for (x, w) in ["X_1", "X_2", "X_3"].iter().zip(&[0.5_f64, 5.0, 9.4]) {
        let weight = w.exp();
        factors.push(factor(
            &format!("phi_{}", x),
            &all,
            &[*x, "Y_1"],
            array![[weight, 1.], [1., 1.]].into_dyn()
        ));
        edges.push(Edge::undirected(x, "Y_1"));
    }
    factors.push(factor("phi_Y_1", &all, &["Y_1"], array![0.6_f64.exp(), 1.].into_dyn()));

    ConditionalRandomField::new("crf", observed, targets, edges, factors).expect("Unexpected error")
}


#[test]
fn crf_with_negative_target() {
    init_logging();
    let crf = crf();

    let query = Query::new(&["X_1", "X_2", "X_3"]).given("Y_1", false);
    let result = crf.query(&query).expect("Unexpected error");

    for (x1, x2, x3) in iproduct!(vec![true, false], vec![true, false], vec![true, false]) {
        let assn = Assignment::new().with("X_1", x1).with("X_2", x2).with("X_3", x3);
        assert_eq!(1.0, result.value(&assn).expect("Unexpected error"));
    }
}


#[test]
fn crf_conditional() {
    let crf = crf();

    let observations = Assignment::new().with("X_1", true).with("X_2", false).with("X_3", false);
    let result = crf.conditional(&observations).expect("Unexpected error");

    // P(Y_1 = true | x) = e^1.1 / (e^1.1 + 1)
    let expected = 1.1_f64.exp() / (1.1_f64.exp() + 1.);
    let assn = Assignment::new().with("Y_1", true);
    assert_abs_diff_eq!(expected, result.probability(&assn).expect("Unexpected error"), epsilon = 1e-9);
}


#[test]
fn invalid_evidence() {
    let bn = cefd();

    match bn.query(&Query::new(&["E"]).given("F", "yes")) {
        Err(PgmError::InvalidEvidence(_)) => assert!(true),
        _ => panic!("expected invalid evidence")
    };

    match bn.query(&Query::new(&["E"]).given("E", true)) {
        Err(PgmError::InvalidEvidence(_)) => assert!(true),
        _ => panic!("expected invalid evidence")
    };
}


/// a -- b with phi(a, b), where a is fixed to true
fn fixed_a() -> Pgm {
    let a = RandomVariable::binary("a", |_| 0.5).with_evidence(true).expect("Unexpected error").shared();
    let nodes = vec![ a, binary("b") ];
    let factors = vec![ factor("phi_ab", &nodes, &["a", "b"], array![[1., 2.], [3., 4.]].into_dyn()) ];

    Pgm::new("fixed", nodes, vec![ Edge::undirected("a", "b") ], factors).expect("Unexpected error")
}


#[test]
fn node_evidence_in_queries() {
    init_logging();
    let pgm = fixed_a();

    let result = pgm.query(&Query::new(&["b"])).expect("Unexpected error");
    let assn = Assignment::new().with("b", true);
    assert_abs_diff_eq!(1. / 3., result.probability(&assn).expect("Unexpected error"), epsilon = 1e-9);

    match pgm.query(&Query::new(&["a", "b"])) {
        Err(PgmError::InvalidEvidence(_)) => assert!(true),
        _ => panic!("expected invalid evidence")
    };

    match pgm.query(&Query::new(&["b"]).given("a", false)) {
        Err(PgmError::InvalidEvidence(_)) => assert!(true),
        _ => panic!("expected invalid evidence")
    };
}


#[test]
fn node_evidence_in_joint() {
    let pgm = fixed_a();

    let contradicting = Assignment::new().with("a", false).with("b", true);
    assert_eq!(0., pgm.joint_value(&contradicting).expect("Unexpected error"));
    assert_eq!(0., pgm.probability(&contradicting).expect("Unexpected error"));

    let agreeing = Assignment::new().with("a", true).with("b", true);
    assert_abs_diff_eq!(1., pgm.joint_value(&agreeing).expect("Unexpected error"), epsilon = 1e-12);
    assert_abs_diff_eq!(1. / 3., pgm.probability(&agreeing).expect("Unexpected error"), epsilon = 1e-12);

    let total: f64 = iproduct!(vec![true, false], vec![true, false])
        .map(|(a, b)| pgm.probability(&Assignment::new().with("a", a).with("b", b)).expect("Unexpected error"))
        .sum();
    assert_abs_diff_eq!(1., total, epsilon = 1e-12);
}
