//! Demo that runs the hybrid engine over an inline candidate set and prints
//! the ranked results plus the breakdown of the top hit as JSON.

use anyhow::Result;
use chrono::NaiveDate;
use program_recommender::{
    EngineConfig, HybridRecommender, Program, RecommendOptions, UserProfile,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid demo date")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let engine = HybridRecommender::with_config(EngineConfig::load_or_default());

    let user = UserProfile::new(
        vec!["Computer Science".into()],
        2,
        vec!["contest".into(), "career".into()],
        vec!["AI".into(), "machine learning".into(), "data analysis".into()],
    )?;

    let programs = vec![
        Program::new(1, "AI Hackathon 2025", "Two-day hackathon on AI and machine learning topics, teams of up to four.")
            .with_categories(vec!["contest".into()])
            .with_departments(vec!["Computer Science".into(), "Electrical Engineering".into()])
            .with_grades(vec![1, 2, 3, 4])
            .with_window(Some(date(2025, 11, 1)), Some(date(2025, 12, 31))),
        Program::new(2, "Career Mentoring Week", "Alumni mentors share interview and resume advice for all majors.")
            .with_categories(vec!["career".into(), "mentoring".into()])
            .with_departments(vec!["unrestricted".into()])
            .with_grades(vec![0])
            .with_window(None, Some(date(2025, 12, 15))),
        Program::new(3, "Community Volunteer Day", "One-day volunteering at the city library.")
            .with_categories(vec!["volunteer".into()])
            .with_departments(vec!["unrestricted".into()])
            .with_grades(vec![0])
            .with_window(None, Some(date(2025, 10, 1))), // already closed
    ];

    let opts = RecommendOptions {
        limit: 5,
        min_score: 10.0,
        ..Default::default()
    };
    let results = engine.recommend(&user, &programs, &opts);

    println!("{}", serde_json::to_string_pretty(&results)?);

    if let Some(top) = results.first() {
        let breakdown = engine.explain(&user, &top.program);
        println!("--- breakdown of #{} ---", top.program.id);
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    }

    Ok(())
}
