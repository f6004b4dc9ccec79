//! Link values exactly as written in the source document.
//!
//! feed-rs hands back links after URL normalization (`http://example.com`
//! becomes `http://example.com/`), which breaks relative-link joining and
//! changes cache keys. This pass re-reads the channel and item links
//! verbatim: RSS `<link>` text and Atom `<link href>` attributes.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RawLinks {
    pub feed: Option<String>,
    /// One slot per `<item>`/`<entry>`, in document order.
    pub entries: Vec<Option<String>>,
}

/// `(rel, href)` pairs seen inside one container.
type Candidates = Vec<(Option<String>, String)>;

/// Scan `xml` for feed- and entry-level links. `None` if the XML is malformed.
pub fn raw_links(xml: &[u8]) -> Option<RawLinks> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut feed_links = Candidates::new();
    let mut entry_links: Option<Candidates> = None;
    let mut entries = Vec::new();
    // Text of the RSS <link> currently open, if any
    let mut text: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if is_entry(&name) {
                    entry_links = Some(Candidates::new());
                } else if name == b"link" && stack.last().is_some_and(|p| is_container(p)) {
                    match atom_link(&e) {
                        Some(link) => push(&mut feed_links, &mut entry_links, link),
                        None => text = Some(String::new()),
                    }
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"link" && stack.last().is_some_and(|p| is_container(p)) {
                    if let Some(link) = atom_link(&e) {
                        push(&mut feed_links, &mut entry_links, link);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(s) = text.as_mut() {
                    s.push_str(&unescape(&String::from_utf8_lossy(&t)).ok()?);
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some(s) = text.as_mut() {
                    let entity = format!("&{};", String::from_utf8_lossy(&r));
                    s.push_str(&unescape(&entity).ok()?);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(s) = text.as_mut() {
                    s.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::End(_)) => {
                let name = stack.pop()?;
                if name == b"link" {
                    if let Some(s) = text.take() {
                        push(&mut feed_links, &mut entry_links, (None, s));
                    }
                } else if is_entry(&name) {
                    entries.push(entry_links.take().and_then(|c| pick(&c)));
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    Some(RawLinks {
        feed: pick(&feed_links),
        entries,
    })
}

fn is_entry(name: &[u8]) -> bool {
    name == b"item" || name == b"entry"
}

fn is_container(name: &[u8]) -> bool {
    name == b"channel" || name == b"feed" || is_entry(name)
}

fn push(feed: &mut Candidates, entry: &mut Option<Candidates>, link: (Option<String>, String)) {
    match entry {
        Some(links) => links.push(link),
        None => feed.push(link),
    }
}

/// `(rel, href)` of an Atom-style `<link href=".."/>`.
fn atom_link(e: &BytesStart<'_>) -> Option<(Option<String>, String)> {
    let mut rel = None;
    let mut href = None;
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        let value = unescape(&value).map(|v| v.into_owned()).unwrap_or_else(|_| value.to_string());
        match attr.key.as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel = Some(value),
            _ => {}
        }
    }
    href.map(|h| (rel, h))
}

/// The alternate (or unqualified) link, falling back to the first one.
fn pick(links: &[(Option<String>, String)]) -> Option<String> {
    links
        .iter()
        .find(|(rel, _)| matches!(rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|(_, href)| href.trim().to_string())
        .filter(|href| !href.is_empty())
}
