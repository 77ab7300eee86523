//! # Hybrid Combiner
//! Pure, testable logic that blends the rule score with the text-similarity
//! score, then filters, sorts and truncates. No I/O; the clock enters only
//! through the thin `recommend`/`explain` wrappers, so the `*_on` variants
//! are fully deterministic for unit tests and offline evaluation.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::config::EngineConfig;
use crate::model::{Program, RecommendOptions, RecommendationResult, UserProfile};
use crate::rules::{RuleScore, RuleScorer};
use crate::textsim::{TextScorer, TfidfScorer};

/// One rule term inside a breakdown: raw points plus the reason, if it fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermBreakdown {
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One blended component: raw score, its fixed weight, and the weighted
/// contribution to the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentBreakdown {
    pub score: f32,
    pub weight: f32,
    pub weighted: f32,
}

/// Full explanation of one (user, program) score. Purely derived; must be
/// bit-for-bit consistent with what `recommend` computes for the same inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total_score: f32,
    pub rule: ComponentBreakdown,
    pub text: ComponentBreakdown,
    pub department: TermBreakdown,
    pub grade: TermBreakdown,
    pub interests: TermBreakdown,
}

/// The hybrid recommendation engine. Stateless across calls; safe to share.
#[derive(Debug, Clone)]
pub struct HybridRecommender<S = TfidfScorer> {
    cfg: EngineConfig,
    rules: RuleScorer,
    text: S,
}

impl HybridRecommender<TfidfScorer> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(cfg: EngineConfig) -> Self {
        Self {
            rules: RuleScorer::new(cfg.rule),
            text: TfidfScorer::new(cfg.text),
            cfg,
        }
    }
}

impl Default for HybridRecommender<TfidfScorer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TextScorer> HybridRecommender<S> {
    /// Swap in another text-similarity implementation (tests use a stub here).
    pub fn with_scorer(cfg: EngineConfig, text: S) -> Self {
        Self {
            rules: RuleScorer::new(cfg.rule),
            text,
            cfg,
        }
    }

    /// Ranked recommendations against the current UTC date.
    pub fn recommend(
        &self,
        user: &UserProfile,
        programs: &[Program],
        opts: &RecommendOptions,
    ) -> Vec<RecommendationResult> {
        self.recommend_on(user, programs, opts, Utc::now().date_naive())
    }

    /// Same logic with the date injected; the deterministic core.
    pub fn recommend_on(
        &self,
        user: &UserProfile,
        programs: &[Program],
        opts: &RecommendOptions,
        today: NaiveDate,
    ) -> Vec<RecommendationResult> {
        // 1) Open/closed filter. The storage collaborator may pre-filter as
        //    an optimization, but correctness is re-checked here.
        let candidates: Vec<&Program> = if opts.include_closed {
            programs.iter().collect()
        } else {
            programs.iter().filter(|p| p.is_open_on(today)).collect()
        };

        // Short-circuit: never invoke the text scorer on an empty batch.
        if candidates.is_empty() {
            debug!(supplied = programs.len(), "no candidates after open filter");
            return Vec::new();
        }

        // 2) Rule score per candidate, text similarity batched once.
        let rule_scores: Vec<RuleScore> = candidates
            .iter()
            .map(|p| self.rules.score(user, p))
            .collect();
        let text_scores = self.text.score_batch(user, &candidates);
        debug_assert_eq!(text_scores.len(), candidates.len());

        // 3) Blend and gate on the minimum score.
        let mut results: Vec<RecommendationResult> = Vec::with_capacity(candidates.len());
        for ((program, rule), text) in candidates
            .into_iter()
            .zip(rule_scores)
            .zip(text_scores)
        {
            let total = rule.score * self.cfg.blend.rule + text * self.cfg.blend.text;
            if total < opts.min_score {
                continue;
            }
            results.push(RecommendationResult {
                program: program.clone(),
                score: total,
                reasons: rule.reasons,
            });
        }

        // 4) Stable descending sort: equal totals keep candidate order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(opts.limit);

        debug!(
            supplied = programs.len(),
            returned = results.len(),
            "recommendation complete"
        );
        results
    }

    /// Full score breakdown for exactly one program. The text corpus is
    /// {query, program}, identical to `recommend(user, [program], ..)`.
    /// Open/closed state is not consulted here.
    pub fn explain(&self, user: &UserProfile, program: &Program) -> ScoreBreakdown {
        let (dept_score, dept_reason) = self.rules.department_term(user, program);
        let (grade_score, grade_reason) = self.rules.grade_term(user, program);
        let (interest_score, interest_reason) = self.rules.interest_term(user, program);
        let rule_score = dept_score + grade_score + interest_score;

        let text_score = self
            .text
            .score_batch(user, &[program])
            .first()
            .copied()
            .unwrap_or(0.0);

        let total = rule_score * self.cfg.blend.rule + text_score * self.cfg.blend.text;

        ScoreBreakdown {
            total_score: total,
            rule: ComponentBreakdown {
                score: rule_score,
                weight: self.cfg.blend.rule,
                weighted: rule_score * self.cfg.blend.rule,
            },
            text: ComponentBreakdown {
                score: text_score,
                weight: self.cfg.blend.text,
                weighted: text_score * self.cfg.blend.text,
            },
            department: TermBreakdown {
                score: dept_score,
                reason: dept_reason,
            },
            grade: TermBreakdown {
                score: grade_score,
                reason: grade_reason,
            },
            interests: TermBreakdown {
                score: interest_score,
                reason: interest_reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn cs_user() -> UserProfile {
        UserProfile::new(
            vec!["CS".into()],
            2,
            vec!["contest".into(), "career".into()],
            vec!["ai".into(), "machine learning".into()],
        )
        .unwrap()
    }

    #[test]
    fn blend_uses_documented_weights() {
        // Program matching every rule term, text left to do what it will.
        let engine = HybridRecommender::new();
        let p = Program::new(1, "ai contest", "machine learning challenge")
            .with_departments(vec!["CS".into()])
            .with_grades(vec![2])
            .with_categories(vec!["contest".into()]);

        let b = engine.explain(&cs_user(), &p);
        assert_eq!(b.rule.score, 40.0 + 30.0 + 5.0);
        // 75 rule points * 0.6 = 45 before the text contribution.
        assert_eq!(b.rule.weighted, b.rule.score * 0.6);
        assert_eq!(b.text.weight, 0.4);
        assert!(
            (b.total_score - (b.rule.weighted + b.text.weighted)).abs() < 1e-6,
            "total must be the sum of weighted components"
        );
    }

    #[test]
    fn breakdown_terms_sum_to_rule_score() {
        let engine = HybridRecommender::new();
        let p = Program::new(1, "lecture series", "weekly lecture")
            .with_departments(vec!["unrestricted".into()])
            .with_grades(vec![0])
            .with_categories(vec!["lecture".into()]);

        let b = engine.explain(&cs_user(), &p);
        assert_eq!(
            b.rule.score,
            b.department.score + b.grade.score + b.interests.score
        );
        assert_eq!(b.department.score, 20.0);
        assert_eq!(b.grade.score, 15.0);
        assert_eq!(b.interests.score, 0.0);
        assert!(b.interests.reason.is_none());
    }

    #[test]
    fn closed_filter_applies_before_scoring() {
        let engine = HybridRecommender::new();
        let today = d(2025, 11, 15);
        let open = Program::new(1, "ai contest", "")
            .with_departments(vec!["CS".into()])
            .with_grades(vec![2])
            .with_window(None, Some(d(2025, 11, 30)));
        let closed = Program::new(2, "ai contest", "")
            .with_departments(vec!["CS".into()])
            .with_grades(vec![2])
            .with_window(None, Some(d(2025, 11, 14)));

        let opts = RecommendOptions::default();
        let out = engine.recommend_on(&cs_user(), &[open, closed.clone()], &opts, today);
        assert!(out.iter().all(|r| r.program.id != 2));

        // include_closed brings it back.
        let opts = RecommendOptions {
            include_closed: true,
            ..Default::default()
        };
        let out = engine.recommend_on(&cs_user(), &[closed], &opts, today);
        assert_eq!(out.len(), 1);
    }
}
