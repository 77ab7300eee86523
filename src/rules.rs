//! rules.rs — rule-based compatibility scoring.
//!
//! Pure and deterministic: additive department/grade/interest terms, each
//! capped independently, plus a reason string per fired term. Missing
//! attributes on either side simply contribute zero; there are no error
//! conditions here.

use serde::Serialize;

use crate::config::RuleWeights;
use crate::model::{
    grade_name, Program, UserProfile, DEPARTMENT_UNRESTRICTED, GRADE_UNRESTRICTED,
};

/// Result of rule evaluation for one (user, program) pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuleScore {
    pub score: f32,
    pub reasons: Vec<String>,
}

/// The rule scorer. Holds only the weight table; safe to share.
#[derive(Debug, Clone, Default)]
pub struct RuleScorer {
    weights: RuleWeights,
}

impl RuleScorer {
    pub fn new(weights: RuleWeights) -> Self {
        Self { weights }
    }

    /// Unweighted sum of the fired terms. The ceiling is data-dependent,
    /// bounded only by construction of the weight table.
    pub fn score(&self, user: &UserProfile, program: &Program) -> RuleScore {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        // 1) Department term
        let (dept_score, dept_reason) = self.department_term(user, program);
        score += dept_score;
        reasons.extend(dept_reason);

        // 2) Grade term
        let (grade_score, grade_reason) = self.grade_term(user, program);
        score += grade_score;
        reasons.extend(grade_reason);

        // 3) Interest term (capped)
        let (interest_score, interest_reason) = self.interest_term(user, program);
        score += interest_score;
        reasons.extend(interest_reason);

        RuleScore { score, reasons }
    }

    /// Exact match takes precedence over the unrestricted sentinel; only the
    /// first applicable branch fires, regardless of how many departments
    /// overlap.
    pub fn department_term(&self, user: &UserProfile, program: &Program) -> (f32, Option<String>) {
        if program.departments.is_empty() {
            return (0.0, None);
        }

        if let Some(matched) = user
            .departments
            .iter()
            .find(|d| program.departments.contains(d))
        {
            return (
                self.weights.department_exact,
                Some(format!("department match: {}", matched)),
            );
        }

        if program
            .departments
            .iter()
            .any(|d| d == DEPARTMENT_UNRESTRICTED)
        {
            return (
                self.weights.department_unrestricted,
                Some("open to all departments".to_string()),
            );
        }

        (0.0, None)
    }

    pub fn grade_term(&self, user: &UserProfile, program: &Program) -> (f32, Option<String>) {
        if program.grades.is_empty() {
            return (0.0, None);
        }

        if program.grades.contains(&user.grade) {
            return (
                self.weights.grade_exact,
                Some(format!("grade match: {}", grade_name(user.grade))),
            );
        }

        if program.grades.contains(&GRADE_UNRESTRICTED) {
            return (
                self.weights.grade_unrestricted,
                Some("open to all grades".to_string()),
            );
        }

        (0.0, None)
    }

    /// Per-match points capped at `max_interest`. The reason lists the
    /// matched categories in the user's declared order.
    pub fn interest_term(&self, user: &UserProfile, program: &Program) -> (f32, Option<String>) {
        if user.interests.is_empty() || program.categories.is_empty() {
            return (0.0, None);
        }

        let matched: Vec<&str> = user
            .interests
            .iter()
            .filter(|i| program.categories.contains(i))
            .map(String::as_str)
            .collect();

        if matched.is_empty() {
            return (0.0, None);
        }

        let score = (matched.len() as f32 * self.weights.interest_per_match)
            .min(self.weights.max_interest);
        (
            score,
            Some(format!("interest match: {}", matched.join(", "))),
        )
    }
}
