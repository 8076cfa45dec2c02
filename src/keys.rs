use crate::config::{COMPAT_DIR_SEP, LEAD_TOKEN_SEP, TOKEN_SEP};
use crate::models::ConvertOptions;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses whitespace runs and underscores into the token separator and
/// trims separators from both ends.
fn squash_separators(key: &str) -> String {
    let sep = TOKEN_SEP.to_string();
    WHITESPACE_RUN
        .replace_all(key, sep.as_str())
        .replace('_', sep.as_str())
        .trim_matches(TOKEN_SEP)
        .to_string()
}

/// Canonical lookup key for `raw` under the active separator regime.
///
/// Default mode only rewrites separators when keys will later be tokenized;
/// otherwise the key passes through unchanged. Compatibility mode drops any
/// `#` fragment (unless the key is nothing but a fragment) and swaps path
/// separators for the compatibility directory separator first.
pub fn normalize(raw: &str, opts: &ConvertOptions) -> String {
    if opts.compat {
        let truncated = match raw.split_once('#') {
            Some((before, _)) if !before.is_empty() => before,
            _ => raw,
        };
        let swapped = truncated.replace('/', &COMPAT_DIR_SEP.to_string());
        if opts.tokenize {
            squash_separators(&swapped)
        } else {
            swapped
        }
    } else if opts.tokenize {
        squash_separators(raw)
    } else {
        raw.to_string()
    }
}

/// Lookup key set for `canonical`: the canonical key first, then one
/// secondary key per significant segment, deduplicated.
///
/// The first segment is skipped (it names the topic category rather than a
/// distinguishing word), as are empty segments and segments on the filter
/// list. Every returned key maps to the same content.
pub fn tokenize(canonical: &str, opts: &ConvertOptions) -> Vec<String> {
    let extra_sep = if opts.compat { COMPAT_DIR_SEP } else { '/' };
    let mut keys = vec![canonical.to_string()];

    for segment in canonical.split([TOKEN_SEP, extra_sep]).skip(1) {
        let trimmed = segment.trim();
        if trimmed.is_empty() || opts.filtered.contains(&trimmed.to_lowercase()) {
            continue;
        }
        let secondary = format!("{segment}{LEAD_TOKEN_SEP}{canonical}");
        if !keys.contains(&secondary) {
            keys.push(secondary);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(tokenize: bool, compat: bool) -> ConvertOptions {
        ConvertOptions::new(tokenize, compat, String::new(), "")
    }

    #[test]
    fn default_mode_without_tokenize_passes_through() {
        let key = "Array prototype_map/weird  spacing";
        assert_eq!(normalize(key, &opts(false, false)), key);
    }

    #[test]
    fn default_mode_with_tokenize_squashes_separators() {
        assert_eq!(
            normalize("Array  prototype_map", &opts(true, false)),
            "Array-prototype-map"
        );
        assert_eq!(normalize("_trimmed_ ", &opts(true, false)), "trimmed");
    }

    #[test]
    fn normalization_is_idempotent() {
        for key in ["js array_map", "already-normal", "  spaced  "] {
            let once = normalize(key, &opts(true, false));
            assert_eq!(normalize(&once, &opts(true, false)), once);
        }
    }

    #[test]
    fn compat_truncates_fragment_and_swaps_slashes() {
        assert_eq!(
            normalize("path/to/page#section", &opts(false, true)),
            "path:to:page"
        );
    }

    #[test]
    fn compat_keeps_fragment_only_keys() {
        assert_eq!(
            normalize("#onlyfragment", &opts(false, true)),
            "#onlyfragment"
        );
    }

    #[test]
    fn compat_without_tokenize_keeps_whitespace() {
        assert_eq!(normalize("a b/c_d", &opts(false, true)), "a b:c_d");
    }

    #[test]
    fn compat_with_tokenize_also_squashes() {
        assert_eq!(normalize("a b/c_d", &opts(true, true)), "a-b:c-d");
    }

    #[test]
    fn tokenize_skips_first_segment() {
        assert_eq!(
            tokenize("js-array-map", &opts(true, false)),
            vec!["js-array-map", "array~js-array-map", "map~js-array-map"]
        );
    }

    #[test]
    fn tokenize_splits_on_path_separator_in_default_mode() {
        assert_eq!(
            tokenize("dom/events-overview", &opts(true, false)),
            vec![
                "dom/events-overview",
                "events~dom/events-overview",
                "overview~dom/events-overview"
            ]
        );
    }

    #[test]
    fn tokenize_splits_on_compat_separator_in_compat_mode() {
        assert_eq!(
            tokenize("dom:events-overview", &opts(true, true)),
            vec![
                "dom:events-overview",
                "events~dom:events-overview",
                "overview~dom:events-overview"
            ]
        );
    }

    #[test]
    fn tokenize_respects_filter_list() {
        let opts = ConvertOptions::new(true, false, String::new(), "Array");
        assert_eq!(
            tokenize("js-array-map", &opts),
            vec!["js-array-map", "map~js-array-map"]
        );
    }

    #[test]
    fn tokenize_skips_empty_segments() {
        assert_eq!(
            tokenize("js--map", &opts(true, false)),
            vec!["js--map", "map~js--map"]
        );
    }

    #[test]
    fn tokenize_deduplicates_repeated_segments() {
        assert_eq!(
            tokenize("js-map-map", &opts(true, false)),
            vec!["js-map-map", "map~js-map-map"]
        );
    }

    #[test]
    fn tokenized_keys_never_look_canonical() {
        for key in tokenize("js-array-map", &opts(true, false)).iter().skip(1) {
            assert!(key.contains(LEAD_TOKEN_SEP));
        }
    }
}
