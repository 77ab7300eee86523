//! model.rs — boundary value types for the recommendation core.
//!
//! `UserProfile` and `Program` are immutable snapshots handed in by the
//! request/storage collaborators for the duration of one call; the core never
//! mutates or persists them. Validation (grade domain, dedupe-on-write)
//! happens here, in the constructors, so the scorers can assume clean input.

use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Literal department value meaning "open to all departments".
/// Scored distinctly from (and lower than) an exact department match.
pub const DEPARTMENT_UNRESTRICTED: &str = "unrestricted";

/// Grade code meaning "open to all grades" (on programs) or
/// "no preference" (on users).
pub const GRADE_UNRESTRICTED: u8 = 0;

/// Upper end of the grade domain: 1..=5 undergraduate years,
/// 6 alumni, 7 graduate students.
pub const GRADE_MAX: u8 = 7;

/// Closed category vocabulary shared by program classification and user
/// interest intake. "other" is the catch-all assigned when classification
/// matched nothing.
pub const CATEGORY_VOCABULARY: [&str; 7] = [
    "contest",
    "mentoring",
    "volunteer",
    "career",
    "field-trip",
    "lecture",
    "other",
];

/// Human-readable name for a grade code.
pub fn grade_name(grade: u8) -> String {
    match grade {
        0 => "any grade".to_string(),
        1 => "1st year".to_string(),
        2 => "2nd year".to_string(),
        3 => "3rd year".to_string(),
        4 => "4th year".to_string(),
        5 => "5th year".to_string(),
        6 => "alumni".to_string(),
        7 => "graduate student".to_string(),
        other => format!("year {}", other),
    }
}

/// Drop duplicates while keeping first-occurrence order.
fn dedup_preserving_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// One student's profile, built per request from the intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Declared major(s); multi-major users list every department.
    /// Empty means no department bonus can fire.
    #[serde(default)]
    pub departments: Vec<String>,
    /// Grade code in 0..=7 (0 = no preference).
    pub grade: u8,
    /// Category tags from [`CATEGORY_VOCABULARY`].
    #[serde(default)]
    pub interests: Vec<String>,
    /// Free-text keywords ("AI", "machine learning", ...). Feed only the
    /// text-similarity path.
    #[serde(default)]
    pub interest_fields: Vec<String>,
}

impl UserProfile {
    /// Validating constructor: rejects out-of-domain grades and interest
    /// tags outside [`CATEGORY_VOCABULARY`], and dedupes the tag lists.
    /// This is the boundary; the scorers never re-validate. `interest_fields`
    /// is open vocabulary and passes through untouched.
    pub fn new(
        departments: Vec<String>,
        grade: u8,
        interests: Vec<String>,
        interest_fields: Vec<String>,
    ) -> anyhow::Result<Self> {
        ensure!(
            grade <= GRADE_MAX,
            "grade {} outside the 0..={} domain",
            grade,
            GRADE_MAX
        );
        let interests = dedup_preserving_order(interests);
        for tag in &interests {
            ensure!(
                CATEGORY_VOCABULARY.contains(&tag.as_str()),
                "unknown interest category: {}",
                tag
            );
        }
        Ok(Self {
            departments: dedup_preserving_order(departments),
            grade,
            interests,
            interest_fields,
        })
    }
}

/// One extracurricular/career notice candidate for recommendation.
/// Read-only snapshot supplied by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub link: String,
    /// May be arbitrarily long; the text scorer caps how much of it is used.
    #[serde(default)]
    pub content: String,
    /// Tags from [`CATEGORY_VOCABULARY`]. No duplicates (deduped on write).
    #[serde(default)]
    pub categories: Vec<String>,
    /// Target departments; may contain [`DEPARTMENT_UNRESTRICTED`].
    #[serde(default)]
    pub departments: Vec<String>,
    /// Target grade codes; may contain [`GRADE_UNRESTRICTED`].
    #[serde(default)]
    pub grades: Vec<u8>,
    /// Enrollment window. Both absent means no window is enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<NaiveDate>,
}

impl Program {
    pub fn new(id: u64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            link: String::new(),
            content: content.into(),
            categories: Vec::new(),
            departments: Vec::new(),
            grades: Vec::new(),
            application_start: None,
            application_end: None,
            posted_date: None,
        }
    }

    /// Builder-style setters; each dedupes on write.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = dedup_preserving_order(categories);
        self
    }

    pub fn with_departments(mut self, departments: Vec<String>) -> Self {
        self.departments = dedup_preserving_order(departments);
        self
    }

    pub fn with_grades(mut self, grades: Vec<u8>) -> Self {
        self.grades = dedup_preserving_order(grades);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.application_start = start;
        self.application_end = end;
        self
    }

    pub fn with_posted_date(mut self, posted: NaiveDate) -> Self {
        self.posted_date = Some(posted);
        self
    }

    /// Derived open-state, never stored: open iff the window has started
    /// (or has no start) and has not closed (or has no end).
    pub fn is_open_on(&self, today: NaiveDate) -> bool {
        if let Some(start) = self.application_start {
            if start > today {
                return false;
            }
        }
        if let Some(end) = self.application_end {
            if end < today {
                return false;
            }
        }
        true
    }

    /// Open-state against the current UTC date.
    pub fn is_open(&self) -> bool {
        self.is_open_on(chrono::Utc::now().date_naive())
    }
}

/// Tunables supplied by the request collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendOptions {
    /// Maximum number of results returned.
    pub limit: usize,
    /// When false, programs whose window has closed are dropped before scoring.
    pub include_closed: bool,
    /// Results below this total score are dropped.
    pub min_score: f32,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            include_closed: false,
            min_score: 20.0,
        }
    }
}

/// One ranked recommendation. Purely derived — recomputed on demand,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub program: Program,
    /// Blended total on the 0–100 scale.
    pub score: f32,
    /// Rule-term reason strings for the fired terms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}
