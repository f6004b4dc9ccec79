//! RSS 2.0 serialization of an [`OutputFeed`].
//!
//! ```text
//! <rss version="2.0">
//!   <channel>
//!     <title/> <link/> <description/> <lastBuildDate/> <generator/> <docs/>
//!     <item>
//!       <title/> <link/> <description/> <guid isPermaLink="false"/> <pubDate/>
//!     </item>
//!   </channel>
//! </rss>
//! ```

use crate::error::OutputError;
use crate::models::{NormalizedItem, OutputFeed};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

const GENERATOR: &str = concat!("tweed ", env!("CARGO_PKG_VERSION"));
const DOCS: &str = "https://www.rssboard.org/rss-specification";

pub fn render(feed: &OutputFeed) -> Result<Vec<u8>, OutputError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &feed.title)?;
    write_text_element(&mut writer, "link", &feed.link)?;
    write_text_element(&mut writer, "description", &feed.description)?;
    write_text_element(&mut writer, "lastBuildDate", &feed.last_build_date.to_rfc2822())?;
    write_text_element(&mut writer, "generator", GENERATOR)?;
    write_text_element(&mut writer, "docs", DOCS)?;

    for item in &feed.items {
        write_item(&mut writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn write_item<W: Write>(w: &mut Writer<W>, item: &NormalizedItem) -> Result<(), OutputError> {
    w.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(w, "title", &item.title)?;
    write_text_element(w, "link", &item.link)?;
    write_text_element(w, "description", &item.description)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    w.write_event(Event::Start(guid))?;
    w.write_event(Event::Text(BytesText::new(&sanitize_text(&item.guid))))?;
    w.write_event(Event::End(BytesEnd::new("guid")))?;

    write_text_element(w, "pubDate", &item.pub_date.to_rfc2822())?;
    w.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<(), OutputError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(&sanitize_text(text))))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

// XML 1.0 forbids C0 controls other than tab, LF and CR.
fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> OutputFeed {
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        OutputFeed {
            title: "Example & Co".into(),
            link: "http://example.com".into(),
            description: "desc\u{1}".into(),
            last_build_date: date,
            items: vec![NormalizedItem {
                title: "<First>".into(),
                link: "http://example.com/page1".into(),
                description: "one".into(),
                guid: "http://example.com/page1".into(),
                pub_date: date,
            }],
        }
    }

    #[test]
    fn test_render_rss_document() {
        let xml = String::from_utf8(render(&sample()).unwrap()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<rss version=\"2.0\">"));
        assert!(xml.contains("<title>Example &amp; Co</title>"));
        assert!(xml.contains("<description>desc</description>"));
        assert!(xml.contains("<lastBuildDate>Fri, 15 Mar 2024 10:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("<title>&lt;First&gt;</title>"));
        assert!(xml.contains("<guid isPermaLink=\"false\">http://example.com/page1</guid>"));
        assert!(xml.contains("<pubDate>Fri, 15 Mar 2024 10:00:00 +0000</pubDate>"));
    }

    #[test]
    fn test_rendered_output_parses_back() {
        let xml = render(&sample()).unwrap();
        let parsed = crate::fetch::parse_feed(&xml).unwrap();

        assert_eq!(parsed.meta.title.as_deref(), Some("Example & Co"));
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].id.as_deref(), Some("http://example.com/page1"));
    }

    #[test]
    fn test_sanitize_keeps_whitespace_controls() {
        assert_eq!(sanitize_text("a\tb\nc\u{0}d\u{1f}"), "a\tb\ncd");
    }
}
