//! Normalizer / Enricher: turns the parsed, untrusted object into a `PortfolioRecord`.
//!
//! Steps run in a fixed order because later ones read earlier results:
//! 1. field hygiene (trim, URL schemes, caller photo overrides the model)
//! 2. name-derived initials
//! 3. list clamping (responsibilities, project descriptions and tags)
//! 4. skill consolidation
//! 5. stats fallback
//! 6. title fallback (most recent job title)
//! 7. bio fallback (templated from name, title, years, top skills)
//!
//! Missing data never fails this stage. The only hard failure is a missing full name,
//! without which the record is unusable.

use serde_json::Value;

use crate::models::portfolio::{
    About, Award, Certification, Education, Experience, Language, PersonalInfo, PortfolioRecord,
    Project, SkillCategory, Stat,
};
use crate::portfolio::error::ExtractError;
use crate::portfolio::response_parser::JsonObject;
use crate::portfolio::skills::{consolidate_skills, skills_from_value};
use crate::portfolio::stats::{default_stats, stats_from_value, years_of_experience, years_stat_value};

pub const MAX_RESPONSIBILITIES: usize = 6;
pub const MAX_PROJECT_TAGS: usize = 6;
pub const MAX_DESCRIPTION_CHARS: usize = 300;

const LIST_SEPARATORS: &[char] = &[',', '\n'];
const LINE_SEPARATORS: &[char] = &['\n'];

/// Builds the final record. `photo_url`, when given, replaces anything the model produced.
pub fn normalize(
    raw: &JsonObject,
    photo_url: Option<&str>,
    current_year: i32,
) -> Result<PortfolioRecord, ExtractError> {
    let root = Value::Object(raw.clone());
    let empty = Value::Null;
    let personal = root.get("personalInfo").unwrap_or(&empty);
    let about = root.get("about").unwrap_or(&empty);

    let full_name = text(personal.get("fullName"))
        .or_else(|| text(personal.get("name")))
        .or_else(|| text(root.get("fullName")))
        .or_else(|| text(root.get("name")))
        .map(|name| collapse(&name))
        .ok_or_else(|| {
            ExtractError::parse(
                "response has no personalInfo.fullName",
                &serde_json::to_string(raw).unwrap_or_default(),
            )
        })?;

    // Steps 1–3
    let mut personal_info = personal_info(personal, full_name, photo_url);
    let experience: Vec<Experience> = objects(root.get("experience"))
        .filter_map(experience_entry)
        .collect();
    let projects: Vec<Project> = objects(root.get("projects")).filter_map(project_entry).collect();

    // Step 4
    let raw_skills = about
        .get("skills")
        .or_else(|| root.get("skills"))
        .map(skills_from_value)
        .unwrap_or_default();
    let skills = consolidate_skills(raw_skills);

    // Step 5
    let mut stats = stats_from_value(about.get("stats"));
    if stats.is_empty() {
        stats = default_stats(&experience, projects.len(), current_year);
    }

    // Step 6
    if personal_info.title.is_none() {
        personal_info.title = experience
            .iter()
            .map(|e| e.job_title.clone())
            .find(|t| !t.is_empty());
    }

    // Step 7
    let extended_bio = text(about.get("extendedBio"))
        .or_else(|| text(about.get("bio")))
        .or_else(|| text(root.get("summary")))
        .unwrap_or_else(|| {
            synthesize_bio(&personal_info, &stats, &skills, &experience, current_year)
        });

    Ok(PortfolioRecord {
        personal_info,
        about: About {
            extended_bio,
            stats,
            skills,
        },
        experience,
        projects,
        education: objects(root.get("education"))
            .filter_map(education_entry)
            .collect(),
        certifications: objects(root.get("certifications"))
            .filter_map(certification_entry)
            .collect(),
        awards: objects(root.get("awards")).filter_map(award_entry).collect(),
        languages: languages(root.get("languages")),
        interests: string_list(root.get("interests"), LIST_SEPARATORS),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tolerant field access
// ────────────────────────────────────────────────────────────────────────────

/// Trimmed, non-empty string. Numbers and booleans are stringified; anything else is absent.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// First present alias of a field.
fn field(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| text(obj.get(*k)))
}

/// Accepts an array of scalars or one string split on `separators`; drops blanks and bullets.
pub(crate) fn string_list(value: Option<&Value>, separators: &[char]) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| text(Some(item)))
            .map(|s| strip_bullet(&s))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(|c| separators.contains(&c))
            .map(strip_bullet)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn objects(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|v| v.is_object())
}

fn strip_bullet(s: &str) -> String {
    s.trim()
        .trim_start_matches(['•', '-', '*', '–', '·'])
        .trim()
        .to_string()
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Adds `https://` to bare domains; leaves anything with a scheme or without a dot alone.
fn url(value: Option<String>) -> Option<String> {
    value.map(|u| {
        let lower = u.to_lowercase();
        let bare_email = u.contains('@') && !u.contains('/');
        if lower.contains("://")
            || lower.starts_with("mailto:")
            || bare_email
            || !u.contains('.')
            || u.contains(' ')
        {
            u
        } else {
            format!("https://{}", u.trim_start_matches('/'))
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Section builders
// ────────────────────────────────────────────────────────────────────────────

fn personal_info(personal: &Value, full_name: String, photo_url: Option<&str>) -> PersonalInfo {
    let initials = field(personal, &["initials"]).unwrap_or_else(|| derive_initials(&full_name));
    PersonalInfo {
        title: field(personal, &["title", "professionalTitle", "headline"]),
        tagline: field(personal, &["tagline"]),
        email: field(personal, &["email"]).map(|e| e.to_lowercase()),
        phone: field(personal, &["phone"]),
        location: field(personal, &["location"]),
        website: url(field(personal, &["website", "portfolio"])),
        linkedin: url(field(personal, &["linkedin", "linkedIn"])),
        github: url(field(personal, &["github", "gitHub"])),
        twitter: url(field(personal, &["twitter", "x"])),
        initials,
        photo_url: photo_url
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from),
        full_name,
    }
}

/// First letter of each whitespace-delimited token, upper-cased.
pub fn derive_initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

fn experience_entry(obj: &Value) -> Option<Experience> {
    let job_title = field(obj, &["jobTitle", "title", "role", "position"]);
    let company = field(obj, &["company", "organization", "employer"]);
    if job_title.is_none() && company.is_none() {
        return None;
    }
    let job_title = job_title.unwrap_or_default();
    let company = company.unwrap_or_default();

    let mut responsibilities = ["responsibilities", "highlights", "bullets", "description"]
        .iter()
        .map(|k| string_list(obj.get(*k), LINE_SEPARATORS))
        .find(|list| !list.is_empty())
        .unwrap_or_default();
    responsibilities.truncate(MAX_RESPONSIBILITIES);
    if responsibilities.is_empty() {
        let line = match (job_title.is_empty(), company.is_empty()) {
            (false, false) => format!("{job_title} at {company}."),
            (false, true) => format!("{job_title}."),
            _ => format!("Worked at {company}."),
        };
        responsibilities.push(line);
    }

    Some(Experience {
        location: field(obj, &["location"]),
        dates: field(obj, &["dates", "duration", "period"]),
        responsibilities,
        tags: string_list(obj.get("tags"), LIST_SEPARATORS),
        job_title,
        company,
    })
}

fn project_entry(obj: &Value) -> Option<Project> {
    let name = field(obj, &["name", "title"])?;
    let mut tags = string_list(
        obj.get("tags").or_else(|| obj.get("technologies")),
        LIST_SEPARATORS,
    );
    tags.truncate(MAX_PROJECT_TAGS);

    Some(Project {
        name,
        category: field(obj, &["category"]),
        description: field(obj, &["description", "summary"]).map(|d| clamp_chars(&d, MAX_DESCRIPTION_CHARS)),
        tags,
        image_url: url(field(obj, &["imageURL", "imageUrl", "image"])),
        details_url: url(field(obj, &["detailsURL", "detailsUrl", "url", "link"])),
    })
}

/// Cuts to at most `max` characters, ending in `…` when shortened.
fn clamp_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}

fn education_entry(obj: &Value) -> Option<Education> {
    let degree = field(obj, &["degree", "title", "qualification"]);
    let institution = field(obj, &["institution", "school", "university"]);
    // A school with no degree named is still worth showing.
    let (degree, institution) = match (degree, institution) {
        (Some(d), i) => (d, i),
        (None, Some(i)) => (i, None),
        (None, None) => return None,
    };
    Some(Education {
        degree,
        institution,
        location: field(obj, &["location"]),
        dates: field(obj, &["dates", "duration", "year"]),
        details: field(obj, &["details", "description"]),
    })
}

fn certification_entry(obj: &Value) -> Option<Certification> {
    Some(Certification {
        name: field(obj, &["name", "title"])?,
        issuer: field(obj, &["issuer", "organization"]),
        date: field(obj, &["date", "year"]),
        url: url(field(obj, &["url", "link"])),
    })
}

fn award_entry(obj: &Value) -> Option<Award> {
    Some(Award {
        title: field(obj, &["title", "name"])?,
        issuer: field(obj, &["issuer", "organization"]),
        date: field(obj, &["date", "year"]),
        description: field(obj, &["description"]),
    })
}

fn languages(value: Option<&Value>) -> Vec<Language> {
    let Some(Value::Array(items)) = value else {
        return string_list(value, LIST_SEPARATORS)
            .into_iter()
            .map(|language| Language {
                language,
                proficiency: None,
            })
            .collect();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(_) => Some(Language {
                language: field(item, &["language", "name"])?,
                proficiency: field(item, &["proficiency", "level"]),
            }),
            other => text(Some(other)).map(|language| Language {
                language,
                proficiency: None,
            }),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Bio fallback
// ────────────────────────────────────────────────────────────────────────────

fn synthesize_bio(
    personal: &PersonalInfo,
    stats: &[Stat],
    skills: &[SkillCategory],
    experience: &[Experience],
    current_year: i32,
) -> String {
    let years = years_stat_value(stats)
        .map(String::from)
        .unwrap_or_else(|| format!("{}+", years_of_experience(experience, current_year)));

    let role = match personal.title.as_deref() {
        Some(title) => format!("{} {title}", indefinite_article(title)),
        None => "a professional".to_string(),
    };

    let mut bio = format!(
        "{} is {role} with {years} years of experience",
        personal.full_name
    );

    let top: Vec<&str> = skills
        .iter()
        .take(2)
        .filter_map(|c| c.tags.first().map(String::as_str))
        .collect();
    match top.as_slice() {
        [a, b] => bio.push_str(&format!(", specializing in {a} and {b}")),
        [a] => bio.push_str(&format!(", specializing in {a}")),
        _ => {}
    }
    bio.push('.');
    bio
}

fn indefinite_article(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
