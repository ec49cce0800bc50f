use markplan_model::{
    compile_yaml, load_yaml, save_yaml, BeliefSet, MdpBuilder, MdpSpec, ModelError, PomdpBuilder,
};

const VALID_MDP_YAML: &str = r#"
version: 1
discount: 0.9
horizon: 100
epsilon: 0.001
states:
  - id: s0
    actions:
      - id: a0
        reward: 1.0
        outcomes:
          - next: s1
            prob: 0.7
          - next: s0
            prob: 0.3
      - id: a1
        reward: -0.2
        outcomes:
          - next: s1
            prob: 1.0
  - id: s1
    actions:
      - id: a0
        reward: 0.0
        outcomes:
          - next: s1
            prob: 1.0
      - id: a1
        reward: 0.0
        outcomes: []
"#;

#[test]
fn yaml_parse_and_compile_success() {
    let spec: MdpSpec = serde_yaml::from_str(VALID_MDP_YAML).expect("valid yaml");
    let mdp = spec.compile().expect("compile should succeed");

    assert_eq!(mdp.num_states(), 2);
    assert_eq!(mdp.num_actions(), 2);
    assert_eq!(mdp.max_successors(), 2);
    assert!((mdp.discount() - 0.9).abs() < 1e-12);
    assert_eq!(mdp.horizon(), 100);

    let entries: Vec<(usize, f64)> = mdp.successors(0, 0).collect();
    assert_eq!(entries, vec![(1, 0.7), (0, 0.3)]);
    assert!((mdp.reward(0, 1) + 0.2).abs() < 1e-12);

    // The empty action row on s1 terminates immediately.
    assert_eq!(mdp.successors(1, 1).count(), 0);
}

#[test]
fn yaml_round_trip_preserves_the_model() {
    let spec: MdpSpec = serde_yaml::from_str(VALID_MDP_YAML).expect("valid yaml");
    let serialized = serde_yaml::to_string(&spec).expect("serialize");
    let reparsed: MdpSpec = serde_yaml::from_str(&serialized).expect("reparse");

    let first = spec.compile().expect("compile");
    let second = reparsed.compile().expect("compile");
    assert_eq!(first.num_states(), second.num_states());
    assert_eq!(first.max_successors(), second.max_successors());
    let lhs: Vec<(usize, f64)> = first.successors(0, 0).collect();
    let rhs: Vec<(usize, f64)> = second.successors(0, 0).collect();
    assert_eq!(lhs, rhs);
}

#[test]
fn yaml_files_round_trip_through_disk() {
    let spec: MdpSpec = serde_yaml::from_str(VALID_MDP_YAML).expect("valid yaml");
    let path = std::env::temp_dir().join(format!("markplan-model-{}.yaml", std::process::id()));

    save_yaml(&path, &spec).expect("save should succeed");
    let loaded = load_yaml(&path).expect("load should succeed");
    let compiled = compile_yaml(&path).expect("compile should succeed");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.states.len(), spec.states.len());
    assert_eq!(compiled.num_states(), 2);
    assert_eq!(compiled.num_actions(), 2);
}

#[test]
fn validation_fails_for_probability_sum() {
    let yaml = r#"
discount: 0.9
horizon: 100
epsilon: 0.001
states:
  - id: s0
    actions:
      - id: a0
        reward: 0.0
        outcomes:
          - next: s0
            prob: 0.9
"#;
    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");
    assert!(matches!(err, ModelError::ProbabilitySum { .. }));
}

#[test]
fn validation_fails_for_unknown_state_reference() {
    let yaml = r#"
discount: 0.9
horizon: 100
epsilon: 0.001
states:
  - id: s0
    actions:
      - id: a0
        reward: 0.0
        outcomes:
          - next: missing
            prob: 1.0
"#;
    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");
    assert!(matches!(err, ModelError::UnknownNextState { .. }));
}

#[test]
fn validation_fails_for_uneven_action_counts() {
    let yaml = r#"
discount: 0.9
horizon: 100
epsilon: 0.001
states:
  - id: s0
    actions:
      - id: a0
        reward: 0.0
        outcomes:
          - next: s0
            prob: 1.0
      - id: a1
        reward: 0.0
        outcomes:
          - next: s1
            prob: 1.0
  - id: s1
    actions:
      - id: a0
        reward: 0.0
        outcomes:
          - next: s1
            prob: 1.0
"#;
    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");
    assert!(matches!(err, ModelError::ActionCountMismatch { .. }));
}

#[test]
fn builder_rejects_out_of_range_indices() {
    let mut builder = MdpBuilder::new(2, 2);
    let err = builder
        .transition(5, 0, 0, 1.0)
        .expect_err("state range should fail");
    assert!(matches!(err, ModelError::BuilderStateRange { .. }));

    let err = builder
        .reward(0, 9, 1.0)
        .expect_err("action range should fail");
    assert!(matches!(err, ModelError::BuilderActionRange { .. }));
}

#[test]
fn builder_rejects_invalid_discount() {
    let mut builder = MdpBuilder::new(1, 1);
    builder.discount(1.5);
    builder.transition(0, 0, 0, 1.0).expect("transition");
    let err = builder.build().expect_err("build should fail");
    assert!(matches!(err, ModelError::InvalidDiscount { .. }));
}

#[test]
fn belief_set_round_trips_through_dense_form() {
    let dense = [0.25, 0.75, 0.0, 1.0, 0.5, 0.5];
    let beliefs = BeliefSet::from_dense(2, &dense, 3).expect("conversion should succeed");

    assert_eq!(beliefs.len(), 3);
    assert_eq!(beliefs.max_support(), 2);
    assert_eq!(beliefs.dense(0), Some(vec![0.25, 0.75]));
    assert_eq!(beliefs.dense(1), Some(vec![0.0, 1.0]));
    assert_eq!(beliefs.dense(2), Some(vec![0.5, 0.5]));

    // The all-zero middle entry is dropped from the support.
    let support: Vec<(usize, f64)> = beliefs.support(1).collect();
    assert_eq!(support, vec![(1, 1.0)]);
}

#[test]
fn belief_set_rejects_a_zero_row() {
    let dense = [0.0, 0.0];
    let err = BeliefSet::from_dense(2, &dense, 1).expect_err("zero row should fail");
    assert!(matches!(err, ModelError::EmptyBelief { .. }));
}

#[test]
fn pomdp_builder_rejects_bad_observation_rows() {
    let mut builder = PomdpBuilder::new(1, 1, 2);
    builder
        .transition(0, 0, 0, 1.0)
        .expect("transition")
        .observation(0, 0, 0, 0.4)
        .expect("observation")
        .observation(0, 0, 1, 0.4)
        .expect("observation")
        .belief(&[(0, 1.0)])
        .expect("belief");
    let err = builder.build().expect_err("build should fail");
    assert!(matches!(err, ModelError::ProbabilitySum { .. }));
}

#[test]
fn pomdp_builder_requires_a_belief() {
    let mut builder = PomdpBuilder::new(1, 1, 1);
    builder
        .transition(0, 0, 0, 1.0)
        .expect("transition")
        .observation(0, 0, 0, 1.0)
        .expect("observation");
    let err = builder.build().expect_err("build should fail");
    assert!(matches!(err, ModelError::EmptyDimension { what: "belief" }));
}
