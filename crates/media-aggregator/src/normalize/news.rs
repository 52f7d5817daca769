//! Feed documents → news items.

use super::{clean_text, non_empty, truncate_chars};
use crate::api::feeds::PROVIDER;
use crate::error::UpstreamError;
use feed_rs::model::Entry;
use shared::NewsItem;
use tracing::debug;

/// Description length cap, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 300;

fn thumbnail(entry: &Entry) -> Option<String> {
    let from_thumbnails = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.clone())
        .find(|uri| !uri.trim().is_empty());

    from_thumbnails.or_else(|| {
        entry
            .media
            .iter()
            .flat_map(|m| m.content.iter())
            .filter(|c| {
                c.content_type
                    .as_ref()
                    .map_or(false, |mime| mime.essence_str().starts_with("image/"))
            })
            .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
    })
}

fn description(entry: &Entry) -> String {
    let raw = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default();

    truncate_chars(&clean_text(&raw), DESCRIPTION_MAX_CHARS)
}

fn news_item(entry: Entry, source: &str) -> Option<NewsItem> {
    let title = non_empty(entry.title.as_ref().map(|t| clean_text(&t.content)))?;
    let link = non_empty(entry.links.first().map(|l| l.href.clone()))?;

    Some(NewsItem {
        thumbnail: thumbnail(&entry),
        description: description(&entry),
        published: entry.published.or(entry.updated),
        title,
        link,
        source: source.to_string(),
    })
}

/// Parse an RSS, Atom or JSON Feed document.
///
/// Entries without a title or link are dropped. Items keep document order.
pub fn parse_feed(document: &[u8], source: &str) -> Result<Vec<NewsItem>, UpstreamError> {
    let feed = feed_rs::parser::parse(document)
        .map_err(|e| UpstreamError::malformed(PROVIDER, format!("{}: {}", source, e)))?;

    let total = feed.entries.len();
    let items: Vec<NewsItem> = feed
        .entries
        .into_iter()
        .filter_map(|entry| news_item(entry, source))
        .collect();

    debug!(source = %source, entries = total, kept = items.len(), "Parsed feed");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Anime News</title>
    <link>https://example.com</link>
    <description>News</description>
    <item>
      <title>Season 2 announced</title>
      <link>https://example.com/news/1</link>
      <description>&lt;p&gt;The &lt;b&gt;sequel&lt;/b&gt; airs in April.&lt;/p&gt;</description>
      <pubDate>Tue, 15 Oct 2024 10:00:00 GMT</pubDate>
      <media:thumbnail url="https://example.com/thumb1.jpg"/>
    </item>
    <item>
      <title>Trailer released</title>
      <link>https://example.com/news/2</link>
      <description>Watch it now.</description>
      <enclosure url="https://example.com/cover2.jpg" type="image/jpeg" length="1000"/>
    </item>
    <item>
      <description>No title here</description>
      <link>https://example.com/news/3</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss() {
        let items = parse_feed(RSS.as_bytes(), "Anime News Network").unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Season 2 announced");
        assert_eq!(first.link, "https://example.com/news/1");
        assert_eq!(first.description, "The sequel airs in April.");
        assert_eq!(first.thumbnail.as_deref(), Some("https://example.com/thumb1.jpg"));
        assert_eq!(first.source, "Anime News Network");
        assert_eq!(
            first.published,
            Some(Utc.with_ymd_and_hms(2024, 10, 15, 10, 0, 0).unwrap())
        );

        let second = &items[1];
        assert_eq!(second.published, None);
        assert_eq!(second.thumbnail.as_deref(), Some("https://example.com/cover2.jpg"));
    }

    #[test]
    fn test_long_description_is_truncated() {
        let body = "word ".repeat(200);
        let rss = format!(
            r#"<rss version="2.0"><channel><title>t</title><item><title>Long</title><link>https://example.com/l</link><description>{}</description></item></channel></rss>"#,
            body
        );

        let items = parse_feed(rss.as_bytes(), "Feed").unwrap();
        assert_eq!(items[0].description.chars().count(), DESCRIPTION_MAX_CHARS);
        assert!(items[0].description.ends_with("..."));
    }

    #[test]
    fn test_atom_entries() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom News</title>
  <id>urn:feed</id>
  <updated>2024-10-16T08:00:00Z</updated>
  <entry>
    <title>Atom entry</title>
    <id>urn:entry:1</id>
    <link href="https://example.com/atom/1"/>
    <updated>2024-10-16T08:00:00Z</updated>
    <summary>Summary text</summary>
  </entry>
</feed>"#;

        let items = parse_feed(atom.as_bytes(), "Atom").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 10, 16, 8, 0, 0).unwrap())
        );
        assert_eq!(items[0].description, "Summary text");
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = parse_feed(b"<html>not a feed", "Broken").unwrap_err();
        assert_eq!(err.status, crate::error::UpstreamStatus::Malformed);
    }
}
