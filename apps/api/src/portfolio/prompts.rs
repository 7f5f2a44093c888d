// Extraction Contract text. The instructions and the schema below are versioned together:
// bump CONTRACT_VERSION whenever either one changes.

pub const CONTRACT_VERSION: &str = "2024-06.1";

pub const EXTRACTION_SYSTEM: &str = "\
You are a precise résumé data extractor that builds personal portfolio websites. \
You read one résumé and return one JSON object that follows the provided schema. \
You MUST respond with valid JSON only — no markdown fences, no commentary, no apologies. \
Never invent employers, degrees, dates, or metrics that the résumé does not support. \
When a field is genuinely absent, omit it; never emit null placeholders or empty strings.";

pub const EXTRACTION_TASK: &str = r#"Extract a portfolio profile from the résumé {document_ref}.

RULES:
1. Scan headers, footers, sidebars, and contact blocks for email, phone, location, website, LinkedIn, GitHub, and Twitter/X links — not just the main body.
2. about.extendedBio must never be blank. If the résumé has no summary, write 2–3 sentences derived from the title, experience, and skills.
3. Compute years of experience from the earliest listed start date to the current year ({current_year}) and report it in about.stats.
4. Group skills into named categories (e.g. "Programming Languages", "Frontend", "Cloud & DevOps", "Security") instead of a flat list.
5. Normalize every date range to "YYYY-MM – YYYY-MM", or "YYYY-MM – Present" for current roles.
6. At most 6 responsibilities per experience entry and at most 6 tags per project; keep each project description under 300 characters.
7. Omit fields that are genuinely absent rather than inventing placeholders.
8. Return ONLY the JSON object — nothing else, no code fences.

OUTPUT SCHEMA:
{schema}"#;

pub const PORTFOLIO_SCHEMA: &str = r#"{
  "personalInfo": {
    "fullName": "string (required)",
    "title": "string — professional title",
    "tagline": "string — one line",
    "email": "string", "phone": "string", "location": "string",
    "website": "string (URL)", "linkedin": "string (URL)", "github": "string (URL)", "twitter": "string (URL)",
    "initials": "string — e.g. \"JD\""
  },
  "about": {
    "extendedBio": "string (required)",
    "stats": [{ "label": "string", "value": "string, e.g. \"5+\"", "icon": "string" }],
    "skills": [{ "category": "string", "tags": ["string"] }]
  },
  "experience": [{
    "jobTitle": "string", "company": "string", "location": "string",
    "dates": "YYYY-MM – YYYY-MM | YYYY-MM – Present",
    "responsibilities": ["string (1-6 items)"],
    "tags": ["string"]
  }],
  "projects": [{
    "name": "string", "category": "string", "description": "string (<300 chars)",
    "tags": ["string (max 6)"], "imageURL": "string (URL)", "detailsURL": "string (URL)"
  }],
  "education": [{ "degree": "string", "institution": "string", "location": "string", "dates": "string", "details": "string" }],
  "certifications": [{ "name": "string", "issuer": "string", "date": "string", "url": "string" }],
  "awards": [{ "title": "string", "issuer": "string", "date": "string", "description": "string" }],
  "languages": [{ "language": "string", "proficiency": "string" }],
  "interests": ["string"]
}"#;

/// Appended to the task for text-only providers.
pub const DOCUMENT_TEXT_BLOCK: &str = "\n\nRÉSUMÉ TEXT:\n{document_text}";
