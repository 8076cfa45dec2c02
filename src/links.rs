use crate::keys;
use crate::models::ConvertOptions;
use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use url::Url;

/// Synthetic base scheme so entry keys (plain relative paths) can act as the
/// base of a standards-compliant URL resolution.
static RESOLVE_BASE: Lazy<Url> = Lazy::new(|| Url::parse("entry:///").unwrap());

/// Resolves `href` against the entry's own key, the way a reader would
/// resolve a relative link from the entry's location in the flat namespace.
///
/// Absolute URLs come back unchanged; relative references are merged with the
/// key's path and percent-decoded again so keys containing spaces survive.
fn resolve(entry_key: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    let base = match RESOLVE_BASE.join(entry_key) {
        Ok(base) => base,
        Err(_) => return href.to_string(),
    };
    let joined = match base.join(href) {
        Ok(joined) => joined,
        Err(_) => return href.to_string(),
    };

    let path = percent_decode_str(joined.path()).decode_utf8_lossy();
    let mut resolved = match joined.host_str() {
        // protocol-relative reference: keep the authority
        Some(host) if !host.is_empty() => format!("//{host}{path}"),
        _ => path.trim_start_matches('/').to_string(),
    };
    if let Some(query) = joined.query() {
        resolved.push('?');
        resolved.push_str(query);
    }
    if let Some(fragment) = joined.fragment() {
        resolved.push('#');
        resolved.push_str(&percent_decode_str(fragment).decode_utf8_lossy());
    }
    resolved
}

/// Scheme-prefix test only; protocol-relative and other absolute forms are
/// not treated as external.
fn is_external(href: Option<&str>) -> bool {
    href.is_some_and(|href| href.starts_with("http://") || href.starts_with("https://"))
}

/// Replaces the link's visible content with `prefix` followed by its text,
/// flattening any markup inside the element.
fn prefix_text(node: &NodeRef, prefix: &str) {
    let text = node.text_contents();
    let children: Vec<_> = node.children().collect();
    for child in children {
        child.detach();
    }
    node.append(NodeRef::new_text(format!("{prefix}{text}")));
}

/// Serializes only the `<body>` children so the parser's document wrapper
/// does not leak into stored fragments.
fn serialize_fragment(document: &NodeRef) -> String {
    let mut out = Vec::new();
    if let Ok(body) = document.select_first("body") {
        for child in body.as_node().children() {
            if child.serialize(&mut out).is_err() {
                break;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Rewrites every hyperlink of `html` for the flat dictionary namespace and
/// reports whether any link element was present.
///
/// When no links are found the original fragment is returned verbatim, so
/// callers can skip the re-serialized form. Exactly one transform applies per
/// link: external-prefixing wins over compatibility rewriting, which wins
/// over the default rewrite. Malformed markup never fails; the parser is
/// tolerant by construction and the entry keeps whatever was parseable.
pub fn rewrite_links(html: &str, entry_key: &str, opts: &ConvertOptions) -> (String, bool) {
    let document = kuchiki::parse_html().one(html);

    let anchors: Vec<_> = match document.select("a") {
        Ok(selection) => selection.collect(),
        Err(()) => Vec::new(),
    };
    if anchors.is_empty() {
        return (html.to_string(), false);
    }

    for anchor in &anchors {
        let href = anchor.attributes.borrow().get("href").map(str::to_string);

        if !opts.external_prefix.is_empty() && is_external(href.as_deref()) {
            prefix_text(anchor.as_node(), &opts.external_prefix);
        } else if opts.compat {
            let mut attributes = anchor.attributes.borrow_mut();
            attributes.remove("title");
            if let Some(href) = href {
                attributes.insert("href", keys::normalize(&resolve(entry_key, &href), opts));
            }
        } else if let Some(href) = href {
            anchor
                .attributes
                .borrow_mut()
                .insert("href", keys::normalize(&resolve(entry_key, &href), opts));
        }
    }

    (serialize_fragment(&document), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(tokenize: bool, compat: bool, external_prefix: &str) -> ConvertOptions {
        ConvertOptions::new(tokenize, compat, external_prefix.to_string(), "")
    }

    #[test]
    fn fragment_without_links_is_returned_verbatim() {
        let html = "<p>plain   <em>text</em></p>";
        let (out, has_links) = rewrite_links(html, "js/array", &opts(false, false, ""));
        assert!(!has_links);
        assert_eq!(out, html);
    }

    #[test]
    fn relative_href_is_resolved_against_entry_key() {
        let (out, has_links) = rewrite_links(
            r#"<p>see <a href="every">every</a></p>"#,
            "js/array/map",
            &opts(false, false, ""),
        );
        assert!(has_links);
        assert!(out.contains(r#"href="js/array/every""#), "got: {out}");
    }

    #[test]
    fn fragment_only_href_keeps_entry_path() {
        let (out, _) = rewrite_links(
            r##"<a href="#syntax">syntax</a>"##,
            "js/array/map",
            &opts(false, false, ""),
        );
        assert!(out.contains(r#"href="js/array/map#syntax""#), "got: {out}");
    }

    #[test]
    fn parent_references_are_collapsed() {
        let (out, _) = rewrite_links(
            r#"<a href="../string/at">at</a>"#,
            "js/array/map",
            &opts(false, false, ""),
        );
        assert!(out.contains(r#"href="js/string/at""#), "got: {out}");
    }

    #[test]
    fn keys_with_spaces_survive_resolution() {
        let (out, _) = rewrite_links(
            r#"<a href="other page">other</a>"#,
            "guide/first page",
            &opts(false, false, ""),
        );
        assert!(out.contains(r#"href="guide/other page""#), "got: {out}");
    }

    #[test]
    fn default_mode_with_tokenize_normalizes_resolved_href() {
        let (out, _) = rewrite_links(
            r#"<a href="other_page">other</a>"#,
            "guide/intro",
            &opts(true, false, ""),
        );
        assert!(out.contains(r#"href="guide/other-page""#), "got: {out}");
    }

    #[test]
    fn external_link_text_is_prefixed_and_href_untouched() {
        let (out, _) = rewrite_links(
            r#"<a href="https://example.com/x">docs</a>"#,
            "js/array",
            &opts(false, false, "[ext] "),
        );
        assert!(out.contains(r#"href="https://example.com/x""#), "got: {out}");
        assert!(out.contains("[ext] docs"), "got: {out}");
    }

    #[test]
    fn protocol_relative_links_are_not_external() {
        let (out, _) = rewrite_links(
            r#"<a href="//example.com/x">docs</a>"#,
            "js/array",
            &opts(false, false, "[ext] "),
        );
        assert!(!out.contains("[ext] docs"), "got: {out}");
        assert!(out.contains(r#"href="//example.com/x""#), "got: {out}");
    }

    #[test]
    fn compat_mode_drops_title_and_rewrites_href() {
        let (out, _) = rewrite_links(
            r#"<a title="tooltip" href="other#frag">other</a>"#,
            "path/to/page",
            &opts(false, true, ""),
        );
        assert!(out.contains(r#"href="path:to:other""#), "got: {out}");
        assert!(!out.contains("title="), "got: {out}");
    }

    #[test]
    fn external_prefix_wins_over_compat_rewriting() {
        let (out, _) = rewrite_links(
            r#"<a href="https://example.com/a/b">docs</a>"#,
            "path/to/page",
            &opts(false, true, "[ext] "),
        );
        // exactly one transform: text prefixed, href neither resolved nor
        // compat-normalized
        assert!(out.contains(r#"href="https://example.com/a/b""#), "got: {out}");
        assert!(out.contains("[ext] docs"), "got: {out}");
    }

    #[test]
    fn anchor_without_href_still_counts_as_link() {
        let (_, has_links) = rewrite_links(
            r#"<a name="anchor">here</a>"#,
            "js/array",
            &opts(false, false, ""),
        );
        assert!(has_links);
    }

    #[test]
    fn nested_markup_is_flattened_when_prefixing() {
        let (out, _) = rewrite_links(
            r#"<a href="http://example.com"><code>fn</code> docs</a>"#,
            "js/array",
            &opts(false, false, "* "),
        );
        assert!(out.contains("* fn docs"), "got: {out}");
        assert!(!out.contains("<code>"), "got: {out}");
    }

    #[test]
    fn malformed_markup_does_not_panic() {
        let (out, has_links) = rewrite_links(
            r#"<div><a href="x">broken<span></div>"#,
            "js/array",
            &opts(false, false, ""),
        );
        assert!(has_links);
        assert!(out.contains(r#"href="js/x""#), "got: {out}");
    }

    #[test]
    fn multiple_links_are_each_rewritten_once() {
        let (out, _) = rewrite_links(
            r#"<a href="a">a</a> <a href="https://x.io">x</a> <a href="b#f">b</a>"#,
            "ns/page",
            &opts(false, false, "[ext] "),
        );
        assert!(out.contains(r#"href="ns/a""#), "got: {out}");
        assert!(out.contains("[ext] x"), "got: {out}");
        assert!(out.contains(r#"href="ns/b#f""#), "got: {out}");
    }
}
