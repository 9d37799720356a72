use crate::domain::Taxonomy;

/// Maps free model text onto exactly one taxonomy entry. Never fails.
///
/// Exact (case-sensitive) match first, then the first entry in taxonomy order where
/// either lower-cased string contains the other, then the catch-all.
pub fn normalize<'t>(taxonomy: &'t Taxonomy, raw: &str) -> &'t str {
    let text = raw.trim();

    if let Some(exact) = taxonomy.categories().iter().find(|c| c.as_str() == text) {
        return exact;
    }

    let text_lower = text.to_lowercase();
    taxonomy
        .categories()
        .iter()
        .find(|c| {
            let candidate = c.to_lowercase();
            text_lower.contains(&candidate) || candidate.contains(&text_lower)
        })
        .map(String::as_str)
        .unwrap_or_else(|| taxonomy.catch_all())
}
