//! Normalization of family names and variant tokens.
//!
//! Catalog entries spell variants as `regular`, `italic` or `700italic`, while
//! everything on disk and on the command line uses the short canonical form
//! (`400`, `400i`, `700i`). The verbose form (`BoldItalic`) names font files.

use crate::error::{Error, Result};

/// Canonical short tokens paired with their standard weight names.
const STANDARD_NAMES: [(&str, &str); 18] = [
    ("100", "Thin"),
    ("100i", "ThinItalic"),
    ("200", "ExtraLight"),
    ("200i", "ExtraLightItalic"),
    ("300", "Light"),
    ("300i", "LightItalic"),
    ("400", "Regular"),
    ("400i", "Italic"),
    ("500", "Medium"),
    ("500i", "MediumItalic"),
    ("600", "SemiBold"),
    ("600i", "SemiBoldItalic"),
    ("700", "Bold"),
    ("700i", "BoldItalic"),
    ("800", "ExtraBold"),
    ("800i", "ExtraBoldItalic"),
    ("900", "Black"),
    ("900i", "BlackItalic"),
];

/// Turn loosely typed family input into a candidate catalog name.
///
/// Underscores, hyphens and plus signs become spaces. Case is left alone;
/// case folding belongs to the resolver.
pub fn normalize_family(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '_' | '-' | '+' => ' ',
            other => other,
        })
        .collect()
}

/// Normalize a variant token to its short form, or to the standard name when
/// `verbose` is set.
pub fn normalize_variant(token: &str, verbose: bool) -> Result<String> {
    let short = match token {
        "regular" => "400".to_string(),
        "italic" => "400i".to_string(),
        other => other.replace("italic", "i"),
    };

    let Some((short, name)) = STANDARD_NAMES.iter().find(|(key, _)| *key == short) else {
        return Err(Error::InvalidVariant {
            variant: token.to_string(),
        });
    };

    Ok(if verbose { name } else { short }.to_string())
}

/// Normalize a list of variant tokens, failing on the first invalid one.
pub fn normalize_variants<S: AsRef<str>>(tokens: &[S], verbose: bool) -> Result<Vec<String>> {
    tokens
        .iter()
        .map(|token| normalize_variant(token.as_ref(), verbose))
        .collect()
}

/// Split a short token into its numeric weight and italic flag.
pub fn weight_and_italic(token: &str) -> Result<(u16, bool)> {
    let short = normalize_variant(token, false)?;
    let italic = short.ends_with('i');
    let weight = short
        .trim_end_matches('i')
        .parse()
        .map_err(|_| Error::InvalidVariant {
            variant: token.to_string(),
        })?;
    Ok((weight, italic))
}

/// Lowercase a name and join words with hyphens.
pub fn kebab_case(text: &str) -> String {
    text.to_lowercase().replace(' ', "-")
}

/// Lowercase a name and join words with underscores.
pub fn snake_case(text: &str) -> String {
    text.to_lowercase().replace(' ', "_")
}

/// Directory name used for an installed family.
pub fn family_dir_name(family: &str) -> String {
    family.replace(' ', "_")
}

/// Recover a family name from an install directory name.
pub fn family_from_dir_name(dir_name: &str) -> String {
    dir_name.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn maps_legacy_tokens() {
        assert_eq!(normalize_variant("regular", false).expect("regular"), "400");
        assert_eq!(normalize_variant("italic", false).expect("italic"), "400i");
        assert_eq!(normalize_variant("700italic", false).expect("700italic"), "700i");
        assert_eq!(normalize_variant("700italic", true).expect("verbose"), "BoldItalic");
        assert_eq!(normalize_variant("regular", true).expect("verbose"), "Regular");
    }

    #[test]
    fn standard_names_are_unique() {
        let mut shorts = HashSet::new();
        let mut names = HashSet::new();
        for (short, _) in STANDARD_NAMES {
            let name = normalize_variant(short, true).expect("known token");
            assert_eq!(normalize_variant(short, false).expect("short"), short);
            assert!(shorts.insert(short));
            assert!(names.insert(name));
        }
        assert_eq!(names.len(), 18);
    }

    #[test]
    fn rejects_unknown_tokens() {
        for token in ["450", "bold", "1000i", "", "Regular"] {
            let error = normalize_variant(token, false).expect_err("should fail");
            assert!(matches!(error, Error::InvalidVariant { .. }), "{token}");
        }
    }

    #[test]
    fn normalizes_family_separators() {
        assert_eq!(normalize_family("roboto_condensed"), "roboto condensed");
        assert_eq!(normalize_family("Open-Sans+Condensed"), "Open Sans Condensed");
        assert_eq!(normalize_family("PT Sans"), "PT Sans");
    }

    #[test]
    fn splits_weight_and_style() {
        assert_eq!(weight_and_italic("700italic").expect("token"), (700, true));
        assert_eq!(weight_and_italic("regular").expect("token"), (400, false));
    }

    #[test]
    fn builds_file_system_names() {
        assert_eq!(family_dir_name("Roboto Condensed"), "Roboto_Condensed");
        assert_eq!(family_from_dir_name("Roboto_Condensed"), "Roboto Condensed");
        assert_eq!(kebab_case("Open Sans"), "open-sans");
        assert_eq!(snake_case("Open Sans"), "open_sans");
    }
}
