//! About-section statistics: reading the model's stats and computing defaults when absent.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::portfolio::{Experience, Stat};
use crate::portfolio::normalizer::text;

/// Smallest magnitude a computed stat may show.
pub const MIN_STAT_VALUE: i64 = 1;

pub const YEARS_LABEL: &str = "Years Experience";
pub const PROJECTS_LABEL: &str = "Projects";
pub const COMPANIES_LABEL: &str = "Companies";

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year regex"));

/// Reads `[{label, value, icon?}]`; numeric values are stringified, incomplete entries dropped.
pub fn stats_from_value(value: Option<&Value>) -> Vec<Stat> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            Some(Stat {
                label: text(item.get("label"))?,
                value: text(item.get("value"))?,
                icon: text(item.get("icon")),
            })
        })
        .collect()
}

/// Current year minus the earliest four-digit year found in any experience date string.
pub fn years_of_experience(experience: &[Experience], current_year: i32) -> i64 {
    let earliest = experience
        .iter()
        .filter_map(|e| e.dates.as_deref())
        .flat_map(|dates| YEAR_PATTERN.find_iter(dates))
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .min();

    match earliest {
        Some(year) => (i64::from(current_year) - i64::from(year)).max(MIN_STAT_VALUE),
        None => MIN_STAT_VALUE,
    }
}

/// The three fallback stats: years of experience, project count, distinct companies.
pub fn default_stats(experience: &[Experience], project_count: usize, current_year: i32) -> Vec<Stat> {
    let companies: HashSet<String> = experience
        .iter()
        .map(|e| e.company.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    vec![
        Stat {
            label: YEARS_LABEL.to_string(),
            value: format!("{}+", years_of_experience(experience, current_year)),
            icon: Some("fa-solid fa-calendar-days".to_string()),
        },
        Stat {
            label: PROJECTS_LABEL.to_string(),
            value: format!("{}+", floor_count(project_count)),
            icon: Some("fa-solid fa-diagram-project".to_string()),
        },
        Stat {
            label: COMPANIES_LABEL.to_string(),
            value: format!("{}+", floor_count(companies.len())),
            icon: Some("fa-solid fa-building".to_string()),
        },
    ]
}

/// Value of a stat that reads as years of experience, if the model produced one.
pub fn years_stat_value(stats: &[Stat]) -> Option<&str> {
    stats
        .iter()
        .find(|s| s.label.to_lowercase().contains("year"))
        .map(|s| s.value.as_str())
}

fn floor_count(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX).max(MIN_STAT_VALUE)
}
