//! Noun/phrase normalization (spec.md §4.1).

/// Punctuation stripped by [`normalize_noun`] and [`normalize_phrase`].
const STRIP_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '\'', '"'];

/// Lowercases, strips punctuation, and applies a minimal English
/// singularizer to a single word (spec.md §4.1).
///
/// Rules, applied in order:
/// 1. `-ies` -> `-y`
/// 2. `-ses`/`-xes`/`-zes`/`-ches`/`-shes` -> drop `-es`
/// 3. `-les`/`-res`/`-nes` -> drop `-s`
/// 4. generic `-es` -> drop `-es`
/// 5. trailing `-s` -> drop, except `-ss`
#[must_use]
pub fn normalize_noun(word: &str) -> String {
    let cleaned: String = word
        .trim()
        .chars()
        .filter(|c| !STRIP_PUNCT.contains(c))
        .collect::<String>()
        .to_lowercase();

    singularize(&cleaned)
}

fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if ["ses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|suf| word.ends_with(suf))
    {
        return word[..word.len() - 2].to_string();
    }
    for suffix in ["les", "res", "nes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}e");
        }
    }
    if word.ends_with("es") && !word.ends_with("ss") {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Lowercase + punctuation-to-space + collapse whitespace (spec.md §4.1).
#[must_use]
pub fn normalize_phrase(phrase: &str) -> String {
    let replaced: String = phrase
        .chars()
        .map(|c| if STRIP_PUNCT.contains(&c) { ' ' } else { c })
        .collect();
    replaced
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_noun_basic() {
        assert_eq!(normalize_noun("Report."), "report");
        assert_eq!(normalize_noun("\"Reports\""), "report");
    }

    #[test]
    fn test_normalize_noun_ies() {
        assert_eq!(normalize_noun("companies"), "company");
        assert_eq!(normalize_noun("entries"), "entry");
    }

    #[test]
    fn test_normalize_noun_sibilant_es() {
        assert_eq!(normalize_noun("classes"), "class");
        assert_eq!(normalize_noun("boxes"), "box");
        assert_eq!(normalize_noun("churches"), "church");
        assert_eq!(normalize_noun("dishes"), "dish");
    }

    #[test]
    fn test_normalize_noun_les_res_nes() {
        assert_eq!(normalize_noun("tables"), "table");
        assert_eq!(normalize_noun("stores"), "store");
        assert_eq!(normalize_noun("scenes"), "scene");
    }

    #[test]
    fn test_normalize_noun_generic_es() {
        // "codes" matches none of the -ies/sibilant/les-res-nes special
        // cases, so the generic "-es -> drop -es" rule applies.
        assert_eq!(normalize_noun("codes"), "cod");
    }

    #[test]
    fn test_normalize_noun_trailing_s() {
        assert_eq!(normalize_noun("lists"), "list");
        assert_eq!(normalize_noun("items"), "item");
    }

    #[test]
    fn test_normalize_noun_ss_preserved() {
        assert_eq!(normalize_noun("process"), "process");
        assert_eq!(normalize_noun("glass"), "glass");
    }

    #[test]
    fn test_normalize_noun_no_change_needed() {
        assert_eq!(normalize_noun("report"), "report");
        assert_eq!(normalize_noun("data"), "data");
    }

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(
            normalize_phrase("The Report, please!"),
            "the report please"
        );
        assert_eq!(normalize_phrase("  multiple   spaces  "), "multiple spaces");
    }
}
