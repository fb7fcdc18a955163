//! Parsing of RFC 5988 `Link` headers as returned by the GitHub REST API:
//!
//! `<https://api.github.com/orgs/x/repos?page=2>; rel="next", <...?page=5>; rel="last"`

use std::collections::HashMap;
use url::Url;

/// One entry of a `Link` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Value of the `page` query parameter, if the URL has a numeric one.
    pub page: Option<u64>,
}

/// Parses a `Link` header into a map keyed by relation name (`next`, `last`,
/// `prev`, `first`, or anything else the server sends).
///
/// Missing or empty headers yield an empty map. Malformed entries are skipped.
pub fn parse_link_header(header: Option<&str>) -> HashMap<String, Link> {
    let mut links = HashMap::new();
    let Some(header) = header else {
        return links;
    };

    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let Some(target) = parts.next().map(str::trim) else {
            continue;
        };
        let Some(url) = target
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            continue;
        };

        let link = Link {
            url: url.to_string(),
            page: page_param(url),
        };

        // A single entry may carry several space-separated relations.
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if key.trim() != "rel" {
                continue;
            }
            for rel in value.trim().trim_matches('"').split_whitespace() {
                links.insert(rel.to_string(), link.clone());
            }
        }
    }

    links
}

fn page_param(url: &str) -> Option<u64> {
    let parsed = Url::parse(url).ok()?;
    let page = parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok());
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_relations() {
        let header = r#"<https://api.github.com/orgs/test-org/repos?page=2>; rel="next", <https://api.github.com/orgs/test-org/repos?page=5>; rel="last", <https://api.github.com/orgs/test-org/repos?page=1>; rel="first""#;

        let links = parse_link_header(Some(header));

        assert_eq!(links.len(), 3);
        assert_eq!(
            links["next"],
            Link {
                url: "https://api.github.com/orgs/test-org/repos?page=2".to_string(),
                page: Some(2),
            }
        );
        assert_eq!(links["last"].page, Some(5));
        assert_eq!(links["first"].page, Some(1));
    }

    #[test]
    fn test_missing_or_empty_header_is_empty() {
        assert!(parse_link_header(None).is_empty());
        assert!(parse_link_header(Some("")).is_empty());
        assert!(parse_link_header(Some("   ")).is_empty());
    }

    #[test]
    fn test_page_absent_when_url_has_no_page_param() {
        let links = parse_link_header(Some(
            r#"<https://api.github.com/repositories/1/pulls?after=abc>; rel="next""#,
        ));
        assert_eq!(links["next"].page, None);
    }

    #[test]
    fn test_page_found_among_other_params() {
        let links = parse_link_header(Some(
            r#"<https://api.github.com/repos/o/r/pulls?state=all&page=7&per_page=30>; rel="last""#,
        ));
        assert_eq!(links["last"].page, Some(7));
    }

    #[test]
    fn test_unknown_relations_are_kept() {
        let links = parse_link_header(Some(r#"<https://example.com/x?page=3>; rel="alternate""#));
        assert_eq!(links["alternate"].page, Some(3));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let links = parse_link_header(Some(
            r#"garbage, <https://example.com/x?page=2>; rel="next""#,
        ));
        assert_eq!(links.len(), 1);
        assert_eq!(links["next"].page, Some(2));
    }
}
