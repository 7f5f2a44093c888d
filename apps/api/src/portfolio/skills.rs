//! Skill consolidation: merges categories case-insensitively, dedups tags, fixes order.
//!
//! # Ordering
//! Categories whose lowercased name contains a `PRIORITY_KEYWORDS` entry sort first, in
//! keyword order; everything else follows alphabetically. Running `consolidate_skills`
//! on its own output returns it unchanged.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::models::portfolio::SkillCategory;
use crate::portfolio::normalizer::{string_list, text};

/// Earlier entries sort first. Matched as substrings of the lowercased category.
pub const PRIORITY_KEYWORDS: &[&str] = &["security", "programming", "language"];

/// Category used for skills the model listed without a group.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Reads skills in any of the shapes models actually produce:
/// `[{category, tags|items|skills}]`, `{category: [tags]}`, or a flat `["tag", ..]`.
pub fn skills_from_value(value: &Value) -> Vec<SkillCategory> {
    match value {
        Value::Array(items) => {
            let mut categories = Vec::new();
            let mut loose = Vec::new();
            for item in items {
                match item {
                    Value::Object(obj) => {
                        let category = ["category", "name", "title"]
                            .iter()
                            .find_map(|k| text(obj.get(*k)))
                            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
                        let tags = ["tags", "items", "skills", "keywords"]
                            .iter()
                            .map(|k| string_list(obj.get(*k), &[',', '\n']))
                            .find(|tags| !tags.is_empty())
                            .unwrap_or_default();
                        categories.push(SkillCategory { category, tags });
                    }
                    other => loose.extend(text(Some(other))),
                }
            }
            if !loose.is_empty() {
                categories.push(SkillCategory {
                    category: FALLBACK_CATEGORY.to_string(),
                    tags: loose,
                });
            }
            categories
        }
        Value::Object(map) => map
            .iter()
            .map(|(category, tags)| SkillCategory {
                category: category.clone(),
                tags: string_list(Some(tags), &[',', '\n']),
            })
            .collect(),
        Value::String(_) => vec![SkillCategory {
            category: FALLBACK_CATEGORY.to_string(),
            tags: string_list(Some(value), &[',', '\n']),
        }],
        _ => Vec::new(),
    }
}

/// Merges, dedups, re-titles, and orders skill categories. Empty categories are dropped.
pub fn consolidate_skills(skills: Vec<SkillCategory>) -> Vec<SkillCategory> {
    struct Group {
        key: String,
        category: String,
        tags: Vec<String>,
        seen: HashSet<String>,
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for skill in skills {
        let mut display = collapse_whitespace(&skill.category);
        if display.is_empty() {
            display = FALLBACK_CATEGORY.to_string();
        }
        let category = title_case(&display);
        // Keyed on the stored spelling so a second pass groups and sorts identically.
        let key = category.to_lowercase();

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                category,
                tags: Vec::new(),
                seen: HashSet::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];

        for tag in skill.tags {
            let tag = collapse_whitespace(&tag);
            if tag.is_empty() {
                continue;
            }
            if group.seen.insert(tag.to_lowercase()) {
                group.tags.push(tag);
            }
        }
    }

    groups.retain(|g| !g.tags.is_empty());
    groups.sort_by(|a, b| {
        priority_rank(&a.key)
            .cmp(&priority_rank(&b.key))
            .then_with(|| a.key.cmp(&b.key))
    });

    groups
        .into_iter()
        .map(|g| SkillCategory {
            category: g.category,
            tags: g.tags,
        })
        .collect()
}

fn priority_rank(key: &str) -> usize {
    PRIORITY_KEYWORDS
        .iter()
        .position(|kw| key.contains(kw))
        .unwrap_or(PRIORITY_KEYWORDS.len())
}

/// Upper-cases the first letter of each word and keeps the rest as written,
/// so "frontend" becomes "Frontend" while "DevOps" stays "DevOps".
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
