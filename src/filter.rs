use crate::types::{FetchResult, NewsEntry};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Strip HTML tags and collapse whitespace. Feed summaries routinely embed
/// markup; entry text is stored and matched in plain form.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .fold((String::new(), false), |(mut out, in_tag), c| match c {
            '<' => (out, true),
            '>' => (out, false),
            _ if !in_tag => {
                out.push(c);
                (out, in_tag)
            }
            _ => (out, in_tag),
        })
        .0
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalization applied to both haystack and keyword before matching:
/// lowercase, plus folding Arabic letter forms to their Persian
/// equivalents (U+064A -> U+06CC, U+0643 -> U+06A9). Feeds mix the two
/// scripts for the same words. No diacritic stripping.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace('\u{064A}', "\u{06CC}")
        .replace('\u{0643}', "\u{06A9}")
}

/// Flatten all fetch results, keep entries whose title or summary contains
/// the topic keyword, order by publish time descending and cap to `limit`.
///
/// Entries without a timestamp sort after all timestamped entries in their
/// original per-source order (the sort is stable). Equal timestamps also
/// keep arrival order.
pub fn filter(results: Vec<FetchResult>, keyword: &str, limit: usize) -> Vec<NewsEntry> {
    let needle = normalize(keyword);

    let mut kept = Vec::new();
    let mut seen = 0usize;
    for result in results {
        for item in result.entries {
            seen += 1;
            if normalize(&item.title).contains(&needle)
                || normalize(&item.summary).contains(&needle)
            {
                kept.push(item);
            }
        }
    }

    debug!(seen, kept = kept.len(), keyword, "topic filter applied");

    kept.sort_by(|a, b| match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    kept.truncate(limit);

    info!(entries = kept.len(), keyword, "batch assembled");

    kept.into_iter()
        .enumerate()
        .map(|(id, item)| NewsEntry::from_item(id, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeedItem, FetchResult, NewsError, Source};
    use chrono::{TimeZone, Utc};

    fn source(id: &str) -> Source {
        Source {
            id: id.to_string(),
            name: id.to_uppercase(),
            feed_url: format!("https://{}.example/rss", id),
        }
    }

    fn item(source_id: &str, title: &str, ts: Option<i64>) -> FeedItem {
        FeedItem {
            source_id: source_id.to_string(),
            title: title.to_string(),
            summary: String::new(),
            url: format!("https://{}.example/{}", source_id, title.len()),
            published_at: ts.map(|t| Utc.timestamp_opt(t, 0).unwrap()),
        }
    }

    #[test]
    fn clean_text_strips_tags_and_collapses_whitespace() {
        assert_eq!(clean_text("<p>hello   <b>world</b></p>\n"), "hello world");
    }

    #[test]
    fn normalize_folds_arabic_letters() {
        // Arabic yeh and kaf fold to the Persian forms used in the keyword.
        assert_eq!(normalize("استقلال\u{064A}"), "استقلال\u{06CC}");
        assert_eq!(normalize("\u{0643}اپ"), "\u{06A9}اپ");
        assert_eq!(normalize("Esteghlal WINS"), "esteghlal wins");
    }

    #[test]
    fn only_matching_entries_survive_despite_newer_off_topic_news() {
        let results = vec![
            FetchResult::ok(source("a"), vec![item("a", "Esteghlal wins", Some(10))]),
            FetchResult::ok(source("b"), vec![item("b", "Other club news", Some(20))]),
        ];
        let entries = filter(results, "Esteghlal", 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_id, "a");
    }

    #[test]
    fn matching_checks_summary_too() {
        let mut it = item("a", "عنوان خبر", Some(5));
        it.summary = "تمرین امروز استقلال".to_string();
        let entries = filter(vec![FetchResult::ok(source("a"), vec![it])], "استقلال", 10);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn ordering_is_recency_descending_with_untimed_last() {
        let results = vec![
            FetchResult::ok(
                source("a"),
                vec![
                    item("a", "Esteghlal one", Some(10)),
                    item("a", "Esteghlal untimed first", None),
                ],
            ),
            FetchResult::ok(
                source("b"),
                vec![
                    item("b", "Esteghlal two", Some(30)),
                    item("b", "Esteghlal untimed second", None),
                ],
            ),
        ];
        let entries = filter(results, "Esteghlal", 10);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Esteghlal two",
                "Esteghlal one",
                "Esteghlal untimed first",
                "Esteghlal untimed second",
            ]
        );
    }

    #[test]
    fn equal_timestamps_keep_arrival_order() {
        let results = vec![FetchResult::ok(
            source("a"),
            vec![
                item("a", "Esteghlal first", Some(10)),
                item("a", "Esteghlal second", Some(10)),
            ],
        )];
        let entries = filter(results, "Esteghlal", 10);
        assert_eq!(entries[0].title, "Esteghlal first");
        assert_eq!(entries[1].title, "Esteghlal second");
    }

    #[test]
    fn cap_keeps_the_most_recent() {
        let results = vec![FetchResult::ok(
            source("a"),
            vec![
                item("a", "Esteghlal old", Some(1)),
                item("a", "Esteghlal mid", Some(2)),
                item("a", "Esteghlal new", Some(3)),
            ],
        )];
        let entries = filter(results, "Esteghlal", 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Esteghlal new");
        assert_eq!(entries[1].title, "Esteghlal mid");
    }

    #[test]
    fn entry_ids_are_positional_within_the_batch() {
        let results = vec![FetchResult::ok(
            source("a"),
            vec![
                item("a", "Esteghlal x", Some(2)),
                item("a", "Esteghlal y", Some(1)),
            ],
        )];
        let entries = filter(results, "Esteghlal", 10);
        assert_eq!(entries[0].id, 0);
        assert_eq!(entries[1].id, 1);
    }

    #[test]
    fn failed_sources_contribute_nothing() {
        let results = vec![
            FetchResult::failed(
                source("a"),
                NewsError::Timeout {
                    source: "a".to_string(),
                },
            ),
            FetchResult::ok(source("b"), vec![item("b", "Esteghlal ok", Some(1))]),
        ];
        let entries = filter(results, "Esteghlal", 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_id, "b");
    }
}
