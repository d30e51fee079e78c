//! Resolution of typed family names against the catalog.

use crate::{
    error::{Error, Result},
    variant::normalize_family,
};

/// Clean up a search keyword: drop doubled spaces, trim, lowercase.
fn clean_keyword(keyword: &str) -> String {
    keyword.replace("  ", "").trim().to_lowercase()
}

/// True when `family_lower` satisfies a single cleaned keyword.
fn keyword_matches(family_lower: &str, keyword: &str, exact: bool) -> bool {
    if exact {
        family_lower == keyword
    } else {
        family_lower.contains(keyword)
    }
}

/// Resolve user input to a canonical family name.
///
/// An exact, case-sensitive hit on the normalized input wins immediately.
/// Otherwise names are scanned in catalog order for a case-insensitive
/// match (equality when `exact`, substring otherwise) and the first hit wins.
pub fn resolve<'a, I>(names: I, raw: &str, exact: bool) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate = normalize_family(raw);
    let names: Vec<&str> = names.into_iter().collect();

    if names.contains(&candidate.as_str()) {
        return Ok(candidate);
    }

    let keyword = clean_keyword(&candidate);
    if !keyword.is_empty()
        && let Some(found) = names
            .iter()
            .find(|name| keyword_matches(&name.to_lowercase(), &keyword, exact))
    {
        return Ok((*found).to_string());
    }

    Err(Error::FamilyNotFound {
        name: raw.to_string(),
    })
}

/// Return every family matching all `keywords`, in catalog order.
pub fn search<'a, I, S>(names: I, keywords: &[S], exact: bool) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
    S: AsRef<str>,
{
    let keywords: Vec<String> = keywords
        .iter()
        .map(|keyword| clean_keyword(keyword.as_ref()))
        .filter(|keyword| !keyword.is_empty())
        .collect();

    if keywords.is_empty() {
        return Vec::new();
    }

    names
        .into_iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            keywords
                .iter()
                .all(|keyword| keyword_matches(&lower, keyword, exact))
        })
        .map(str::to_string)
        .collect()
}
