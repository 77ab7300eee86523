// tests/text_scorer_gate.rs
//
// Exercises the combiner through the `TextScorer` seam with a counting stub:
// the text scorer must be invoked exactly once per request (batched), and
// not at all when the candidate set is empty after the open filter.

use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use program_recommender::{
    EngineConfig, HybridRecommender, Program, RecommendOptions, TextScorer, UserProfile,
};

/// Stub scorer: fixed score for every candidate, counts invocations.
struct CountingScorer {
    calls: AtomicUsize,
    fixed: f32,
}

impl CountingScorer {
    fn new(fixed: f32) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fixed,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextScorer for &CountingScorer {
    fn score_batch(&self, _user: &UserProfile, programs: &[&Program]) -> Vec<f32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        vec![self.fixed; programs.len()]
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn user() -> UserProfile {
    UserProfile::new(vec!["CS".into()], 2, vec!["contest".into()], vec![]).unwrap()
}

#[test]
fn empty_input_never_reaches_the_text_scorer() {
    let stub = CountingScorer::new(50.0);
    let engine = HybridRecommender::with_scorer(EngineConfig::default(), &stub);

    let out = engine.recommend_on(&user(), &[], &RecommendOptions::default(), d(2025, 11, 15));
    assert!(out.is_empty());
    assert_eq!(stub.calls(), 0, "empty batch must short-circuit");
}

#[test]
fn all_closed_candidates_also_short_circuit() {
    let stub = CountingScorer::new(50.0);
    let engine = HybridRecommender::with_scorer(EngineConfig::default(), &stub);

    let closed = Program::new(1, "t", "c")
        .with_departments(vec!["CS".into()])
        .with_window(None, Some(d(2025, 11, 1)));
    let out = engine.recommend_on(
        &user(),
        &[closed],
        &RecommendOptions::default(),
        d(2025, 11, 15),
    );
    assert!(out.is_empty());
    assert_eq!(stub.calls(), 0, "fully-filtered batch must short-circuit");
}

#[test]
fn one_batched_call_per_request() {
    let stub = CountingScorer::new(50.0);
    let engine = HybridRecommender::with_scorer(EngineConfig::default(), &stub);

    let programs: Vec<Program> = (1..=5)
        .map(|i| {
            Program::new(i, "t", "c")
                .with_departments(vec!["CS".into()])
                .with_grades(vec![2])
        })
        .collect();

    let out = engine.recommend_on(
        &user(),
        &programs,
        &RecommendOptions::default(),
        d(2025, 11, 15),
    );
    assert_eq!(out.len(), 5);
    assert_eq!(stub.calls(), 1, "text similarity is batched, once per request");
}

#[test]
fn blend_arithmetic_through_the_seam() {
    // Rule score here is 40 (dept) + 30 (grade) = 70; stub text is 50.
    // Total must be 70 * 0.6 + 50 * 0.4 = 62.
    let stub = CountingScorer::new(50.0);
    let engine = HybridRecommender::with_scorer(EngineConfig::default(), &stub);

    let p = Program::new(1, "t", "c")
        .with_departments(vec!["CS".into()])
        .with_grades(vec![2]);
    let out = engine.recommend_on(
        &user(),
        &[p],
        &RecommendOptions::default(),
        d(2025, 11, 15),
    );
    assert_eq!(out.len(), 1);
    assert!((out[0].score - 62.0).abs() < 1e-5);
}

#[test]
fn zero_text_signal_leaves_pure_rule_ranking() {
    // A degenerate corpus is recovered as all-zero text scores; the engine
    // must still rank on the rule component alone.
    let stub = CountingScorer::new(0.0);
    let engine = HybridRecommender::with_scorer(EngineConfig::default(), &stub);

    let strong = Program::new(1, "t", "c")
        .with_departments(vec!["CS".into()])
        .with_grades(vec![2]);
    let weak = Program::new(2, "t", "c").with_departments(vec!["unrestricted".into()]);

    let opts = RecommendOptions {
        min_score: 10.0,
        ..Default::default()
    };
    let out = engine.recommend_on(&user(), &[weak, strong], &opts, d(2025, 11, 15));
    assert_eq!(out[0].program.id, 1);
    assert!((out[0].score - 70.0 * 0.6).abs() < 1e-5);
    assert!((out[1].score - 20.0 * 0.6).abs() < 1e-5);
}
