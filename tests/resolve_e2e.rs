use std::io::Write;

use corelax::{
    resolve, CorefError, CorefResolver, Mention, MentionId, MentionKind, PairWeights, RelaxConfig, UpdateRule,
    ValidationError,
};

fn mention(id: u32, kind: MentionKind, sentence: u32, begin: u32, end: u32) -> Mention {
    Mention::new(MentionId::new(id), kind, sentence, begin, end)
}

/// Three noun phrases and a trailing pronoun. 1 points at 0, the pronoun
/// points at 1, 2 has no evidence at all.
fn four_mention_document() -> (Vec<Mention>, PairWeights) {
    let mentions = vec![
        mention(0, MentionKind::NounPhrase, 0, 0, 1),
        mention(1, MentionKind::NounPhrase, 0, 3, 4),
        mention(2, MentionKind::NounPhrase, 0, 6, 6),
        mention(3, MentionKind::Pronoun, 1, 0, 0),
    ];
    let weights = PairWeights::new().with(1, 0, 0.8).with(3, 1, 0.6);
    (mentions, weights)
}

fn ids_and_groups(out: &[corelax::ResolvedMention]) -> Vec<(u32, u32)> {
    out.iter().map(|m| (m.id.get(), m.group.get())).collect()
}

#[test]
fn four_mention_document_links_chain_and_drops_singleton() {
    let (mentions, weights) = four_mention_document();
    let out = resolve(mentions, &weights, &RelaxConfig::default()).unwrap();

    assert_eq!(ids_and_groups(&out), vec![(0, 0), (1, 0), (3, 0)]);
    assert_eq!(out[2].kind, MentionKind::Pronoun);
    assert_eq!(out[2].sentence_index, 1);
}

#[test]
fn four_mention_document_with_singletons() {
    let (mentions, weights) = four_mention_document();
    let config = RelaxConfig::builder().provide_singletons(true).build().unwrap();
    let out = resolve(mentions, &weights, &config).unwrap();

    assert_eq!(ids_and_groups(&out), vec![(0, 0), (1, 0), (2, 2), (3, 0)]);
}

#[test]
fn resolution_carries_diagnostics() {
    let (mentions, weights) = four_mention_document();
    let resolution = CorefResolver::new(RelaxConfig::default())
        .unwrap()
        .resolve_document(mentions, &weights)
        .unwrap();

    let report = resolution.report.unwrap();
    assert!(report.converged);
    assert!(report.iterations > 1);
    assert!(report.max_change < 1e-3);

    assert_eq!(resolution.stats.vertices, 4);
    assert_eq!(resolution.stats.candidate_edges, 2);
    assert_eq!(resolution.stats.kept_edges, 2);
    assert_eq!(resolution.stats.pruned_edges(), 0);

    // Every mention gets a group, singletons included.
    let groups: Vec<_> = resolution.mentions.iter().map(|m| m.group.unwrap().get()).collect();
    assert_eq!(groups, vec![0, 0, 2, 0]);
    assert_eq!(resolution.chains.len(), 2);
    assert_eq!(resolution.chains.size(MentionId::new(0)), 3);
    assert_eq!(resolution.chains.non_singletons().count(), 1);

    let json = serde_json::to_value(&resolution).unwrap();
    assert_eq!(json["output"].as_array().unwrap().len(), 3);
    assert_eq!(json["output"][2]["kind"], "pronoun");
}

#[test]
fn clamped_rule_agrees_on_the_four_mention_document() {
    let (mentions, weights) = four_mention_document();
    let config = RelaxConfig::builder().update_rule(UpdateRule::Clamped).build().unwrap();
    let out = resolve(mentions, &weights, &config).unwrap();

    assert_eq!(ids_and_groups(&out), vec![(0, 0), (1, 0), (3, 0)]);
}

#[test]
fn proper_nouns_are_solved_before_earlier_pronouns() {
    // The pronoun is detected first but the name becomes vertex 0, so the
    // pronoun can still point at it.
    let mentions = vec![
        mention(0, MentionKind::Pronoun, 1, 0, 0),
        mention(1, MentionKind::ProperNoun, 0, 0, 1),
    ];
    let weights = PairWeights::new().with(1, 0, 0.9);
    let out = resolve(mentions, &weights, &RelaxConfig::default()).unwrap();

    assert_eq!(ids_and_groups(&out), vec![(0, 1), (1, 1)]);
}

#[test]
fn pruning_keeps_the_strongest_positive_edge() {
    let mentions = vec![
        mention(0, MentionKind::ProperNoun, 0, 0, 1),
        mention(1, MentionKind::NounPhrase, 0, 4, 5),
        mention(2, MentionKind::Pronoun, 1, 0, 0),
    ];
    let weights = PairWeights::new().with(2, 0, 0.9).with(2, 1, 0.2);
    let config = RelaxConfig::builder().nprune(1).build().unwrap();
    let resolution = CorefResolver::new(config)
        .unwrap()
        .resolve_document(mentions, &weights)
        .unwrap();

    assert_eq!(resolution.stats.candidate_edges, 2);
    assert_eq!(resolution.stats.kept_edges, 1);
    assert_eq!(ids_and_groups(&resolution.output), vec![(0, 0), (2, 0)]);
}

#[test]
fn repulsion_only_vertex_stays_alone() {
    let mentions = vec![
        mention(0, MentionKind::NounPhrase, 0, 0, 1),
        mention(1, MentionKind::NounPhrase, 0, 3, 4),
    ];
    let weights = PairWeights::new().with(1, 0, -0.7);
    let resolution = CorefResolver::default().resolve_document(mentions, &weights).unwrap();

    assert_eq!(resolution.stats.negative_only_vertices, 1);
    assert_eq!(resolution.stats.kept_edges, 0);
    assert!(resolution.output.is_empty());
    assert_eq!(resolution.chains.len(), 2);
}

#[test]
fn single_mention_document_groups_with_itself() {
    let config = RelaxConfig::builder().provide_singletons(true).build().unwrap();
    let out = resolve(vec![mention(7, MentionKind::ProperNoun, 0, 0, 2)], &PairWeights::new(), &config).unwrap();

    assert_eq!(ids_and_groups(&out), vec![(7, 7)]);
}

#[test]
fn closure_weight_models_are_accepted() {
    let (mentions, _) = four_mention_document();
    let model = |a: MentionId, b: MentionId| match (a.get(), b.get()) {
        (1, 0) => 0.8,
        (3, 1) => 0.6,
        _ => 0.0,
    };
    let out = resolve(mentions, &model, &RelaxConfig::default()).unwrap();

    assert_eq!(ids_and_groups(&out), vec![(0, 0), (1, 0), (3, 0)]);
}

#[test]
fn infinite_weight_rejects_the_document() {
    let (mentions, _) = four_mention_document();
    let model = |a: MentionId, _: MentionId| if a.get() == 3 { f64::INFINITY } else { 0.0 };
    let err = resolve(mentions, &model, &RelaxConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        CorefError::Validation(ValidationError::NonFiniteWeight { .. })
    ));
}

#[test]
fn inverted_span_rejects_the_document() {
    let mentions = vec![
        mention(0, MentionKind::NounPhrase, 0, 5, 2),
        mention(1, MentionKind::NounPhrase, 0, 6, 6),
    ];
    let err = resolve(mentions, &PairWeights::new(), &RelaxConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        CorefError::Validation(ValidationError::InvalidSpan { .. })
    ));
}

#[test]
fn config_from_json_drives_resolution() {
    let config = RelaxConfig::from_json_str(r#"{"nprune": 0, "provide_singletons": true}"#).unwrap();
    assert_eq!(config.max_iter, 2000);

    let (mentions, weights) = four_mention_document();
    let out = resolve(mentions, &weights, &config).unwrap();
    assert_eq!(ids_and_groups(&out), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
}

#[test]
fn config_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"update_rule": "clamped", "epsilon": 0.0001}}"#).unwrap();

    let config = RelaxConfig::from_json_path(file.path()).unwrap();
    assert_eq!(config.update_rule, UpdateRule::Clamped);
    assert!((config.epsilon - 1e-4).abs() < f64::EPSILON);

    let (mentions, weights) = four_mention_document();
    let out = resolve(mentions, &weights, &config).unwrap();
    assert_eq!(ids_and_groups(&out), vec![(0, 0), (1, 0), (3, 0)]);
}
