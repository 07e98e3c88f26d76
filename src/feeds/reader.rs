//! Recovering XML reader and channel-level feed parsing

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::feeds::entry::FeedEntry;

/// One element of the recovered XML tree.
///
/// Names are stored lower-cased with their namespace prefix intact
/// (`media:thumbnail`); lookups match either the qualified name or the
/// local part, since feeds bind the same vocabularies to arbitrary
/// prefixes.
#[derive(Debug, Clone, Default)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// First child with this exact qualified name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child whose local name matches, regardless of prefix.
    pub fn child_local(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    /// All children whose local name matches.
    pub fn children_local<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed text content, `None` when empty.
    pub fn text_value(&self) -> Option<String> {
        let t = self.text.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    }

    /// Ordered lookup: first non-empty text among the named children.
    /// Names with a `:` match qualified names; bare names match the exact
    /// name first and any-prefix local name second.
    pub fn first_text(&self, names: &[&str]) -> Option<String> {
        for name in names {
            let hit = if name.contains(':') {
                self.child(name)
            } else {
                self.child(name).or_else(|| self.child_local(name))
            };
            if let Some(text) = hit.and_then(|el| el.text_value()) {
                return Some(text);
            }
        }
        None
    }

    /// Depth-first collection of descendants by local name.
    pub fn descendants_local<'a>(&'a self, local: &str, out: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.local_name() == local {
                out.push(child);
            }
            child.descendants_local(local, out);
        }
    }
}

/// Channel-level fields of a feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedHeader {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub published: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

/// Lenient RSS/Atom parser.
///
/// `parse` never fails: malformed markup terminates the tree walk early and
/// whatever was recovered is used. The entry sequence is finite and
/// restartable only by calling [`FeedReader::entries`] again.
pub struct FeedReader {
    raw: String,
    root: XmlElement,
}

impl FeedReader {
    /// Parse raw document text that is expected to look like a feed.
    pub fn parse(text: &str) -> Self {
        let raw = unwrap_payload(text);
        let root = build_tree(&raw);
        Self { raw, root }
    }

    /// The unwrapped source text the tree was built from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The synthetic document root of the recovered tree.
    pub(crate) fn root_element(&self) -> &XmlElement {
        &self.root
    }

    /// The `<rss>`/`<feed>` element, or the synthetic document root when
    /// the document carries neither.
    fn feed_root(&self) -> &XmlElement {
        self.root
            .children
            .iter()
            .find(|c| matches!(c.local_name(), "rss" | "feed"))
            .unwrap_or(&self.root)
    }

    /// The element holding channel-level fields: `<channel>` for RSS,
    /// the `<feed>` element itself for Atom.
    fn channel(&self) -> &XmlElement {
        let feed = self.feed_root();
        feed.child_local("channel").unwrap_or(feed)
    }

    /// Channel-level field with the fixed RSS2 -> Atom -> `channel/`
    /// fallback order.
    fn field(&self, names: &[&str]) -> Option<String> {
        if let Some(text) = self.channel().first_text(names) {
            return Some(text);
        }
        // channel/-prefixed path for documents where the channel element
        // ended up somewhere unexpected in the recovered tree.
        let mut channels = Vec::new();
        self.root.descendants_local("channel", &mut channels);
        channels.iter().find_map(|ch| ch.first_text(names))
    }

    /// Read the channel header.
    pub fn header(&self) -> FeedHeader {
        let channel = self.channel();

        let author = channel
            .first_text(&["author"])
            .map(|t| t.to_string())
            .or_else(|| {
                // Atom <author><name>...</name></author>
                channel
                    .child_local("author")
                    .and_then(|a| a.child_local("name"))
                    .and_then(|n| n.text_value())
            })
            .or_else(|| {
                channel
                    .child("itunes:owner")
                    .and_then(|o| o.child_local("name"))
                    .and_then(|n| n.text_value())
            })
            .or_else(|| self.field(&["managingeditor", "dc:creator"]));

        let image = channel
            .child_local("image")
            .and_then(|img| img.first_text(&["url"]))
            .or_else(|| {
                channel
                    .child("itunes:image")
                    .and_then(|el| el.attr("href"))
                    .map(str::to_string)
            })
            .or_else(|| self.field(&["logo", "icon"]));

        let mut tags: Vec<String> = Vec::new();
        for cat in channel.children_local("category") {
            if let Some(text) = cat.text_value() {
                tags.push(text);
            } else if let Some(term) = cat.attr("term") {
                tags.push(term.to_string());
            }
        }

        FeedHeader {
            title: self.field(&["title"]),
            subtitle: self.field(&["subtitle"]),
            description: self.field(&["description", "subtitle", "tagline"]),
            language: self.field(&["language"]).or_else(|| {
                self.feed_root().attr("xml:lang").map(str::to_string)
            }),
            published: self.field(&["pubdate", "lastbuilddate", "updated", "published"]),
            author,
            image,
            tags,
        }
    }

    /// Enumerate entries: `entry` (Atom), then `item` (RSS), then their
    /// namespaced forms. The sequence is finite; re-invoke to restart.
    pub fn entries(&self) -> Vec<FeedEntry> {
        let mut nodes: Vec<&XmlElement> = Vec::new();
        self.root.descendants_local("entry", &mut nodes);
        let marker = if nodes.is_empty() {
            self.root.descendants_local("item", &mut nodes);
            "<item"
        } else {
            "<entry"
        };

        if nodes.is_empty() {
            debug!("no feed entries recovered from document");
            return Vec::new();
        }

        let spans = raw_spans(&self.raw, marker, nodes.len());
        nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let raw = spans.get(index).cloned().unwrap_or_default();
                FeedEntry::new(node.clone(), raw, index)
            })
            .collect()
    }
}

/// Split the source text into per-entry spans: the Nth span starts at the
/// Nth occurrence of the marker tag and runs to the next occurrence (or the
/// end of the document). Structured extraction of `<link>` is unreliable
/// for some real feeds, so entries keep this raw span for fallback scans.
fn raw_spans(raw: &str, marker: &str, count: usize) -> Vec<String> {
    // ASCII-only lowering keeps byte offsets aligned with the source.
    let lower: String = raw.chars().map(|c| c.to_ascii_lowercase()).collect();
    let mut starts = Vec::new();
    let mut at = 0;
    while let Some(pos) = lower[at..].find(marker) {
        starts.push(at + pos);
        at = at + pos + marker.len();
        if starts.len() == count {
            break;
        }
    }

    let mut spans = Vec::with_capacity(starts.len());
    for (i, start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(raw.len());
        spans.push(raw[*start..end].to_string());
    }
    spans
}

/// Undo the two common serving mistakes before XML parsing: an HTML wrapper
/// around the actual feed, and an HTML-entity-escaped feed payload.
fn unwrap_payload(text: &str) -> String {
    let mut current = text.to_string();

    let lower = current.to_lowercase();
    if !lower.contains("<rss") && !lower.contains("<feed") {
        if lower.contains("&lt;rss") || lower.contains("&lt;feed") {
            current = html_escape::decode_html_entities(&current).into_owned();
        }
    }

    let lower = current.to_lowercase();
    if lower.contains("<html") {
        if let Some(start) = lower.find("<rss").or_else(|| lower.find("<feed")) {
            current = current[start..].to_string();
        }
    }

    current
}

/// Build a recovered element tree. Parse errors stop the walk; the partial
/// tree built so far is returned.
fn build_tree(text: &str) -> XmlElement {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = false;

    let mut root = XmlElement {
        name: String::from("#document"),
        ..Default::default()
    };
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(element_from_tag(
                    &String::from_utf8_lossy(e.name().as_ref()),
                    e.attributes().flatten().map(|a| {
                        (
                            String::from_utf8_lossy(a.key.as_ref()).to_lowercase(),
                            String::from_utf8_lossy(&a.value).to_string(),
                        )
                    }),
                ));
            }
            Ok(Event::Empty(e)) => {
                let el = element_from_tag(
                    &String::from_utf8_lossy(e.name().as_ref()),
                    e.attributes().flatten().map(|a| {
                        (
                            String::from_utf8_lossy(a.key.as_ref()).to_lowercase(),
                            String::from_utf8_lossy(&a.value).to_string(),
                        )
                    }),
                );
                attach(&mut stack, &mut root, el);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map(|t| t.into_owned()).unwrap_or_else(|_| {
                    String::from_utf8_lossy(e.as_ref()).into_owned()
                });
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::End(_)) => {
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut root, done);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(error = %err, "xml recovery stopped early");
                break;
            }
        }
        buf.clear();
    }

    // Unclosed elements at EOF: fold them back into the tree.
    while let Some(done) = stack.pop() {
        attach(&mut stack, &mut root, done);
    }

    root
}

fn element_from_tag(
    name: &str,
    attrs: impl Iterator<Item = (String, String)>,
) -> XmlElement {
    XmlElement {
        name: name.to_lowercase(),
        attrs: attrs.collect(),
        ..Default::default()
    }
}

fn attach(stack: &mut [XmlElement], root: &mut XmlElement, el: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(el);
    } else {
        root.children.push(el);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS2: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Example Feed</title>
  <description>Things happening</description>
  <language>en</language>
  <pubDate>Tue, 09 Jan 2024 10:00:00 GMT</pubDate>
  <category>tech</category>
  <item><title>First</title><link>https://example.com/1</link></item>
  <item><title>Second</title><link>https://example.com/2</link></item>
</channel></rss>"#;

    const ATOM: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Feed</title>
  <subtitle>A subtitle</subtitle>
  <updated>2024-01-09T10:00:00Z</updated>
  <author><name>Jo Writer</name></author>
  <entry>
    <title>Entry One</title>
    <link rel="alternate" href="https://example.com/a1"/>
  </entry>
</feed>"#;

    #[test]
    fn test_rss2_header() {
        let reader = FeedReader::parse(RSS2);
        let header = reader.header();
        assert_eq!(header.title.as_deref(), Some("Example Feed"));
        assert_eq!(header.description.as_deref(), Some("Things happening"));
        assert_eq!(header.language.as_deref(), Some("en"));
        assert_eq!(header.tags, vec!["tech".to_string()]);
        assert!(header.published.is_some());
    }

    #[test]
    fn test_rss2_entries() {
        let reader = FeedReader::parse(RSS2);
        let entries = reader.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title().as_deref(), Some("First"));
        assert_eq!(entries[1].link().as_deref(), Some("https://example.com/2"));
        assert_eq!(entries[1].index(), 1);
    }

    #[test]
    fn test_atom_header_and_entries() {
        let reader = FeedReader::parse(ATOM);
        let header = reader.header();
        assert_eq!(header.title.as_deref(), Some("Atom Feed"));
        assert_eq!(header.subtitle.as_deref(), Some("A subtitle"));
        assert_eq!(header.author.as_deref(), Some("Jo Writer"));

        let entries = reader.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link().as_deref(), Some("https://example.com/a1"));
    }

    #[test]
    fn test_html_wrapped_feed() {
        let wrapped = format!("<html><body>{RSS2}</body></html>");
        let reader = FeedReader::parse(&wrapped);
        assert_eq!(reader.entries().len(), 2);
        assert_eq!(reader.header().title.as_deref(), Some("Example Feed"));
    }

    #[test]
    fn test_entity_escaped_feed() {
        let escaped = html_escape::encode_text(RSS2).into_owned();
        let reader = FeedReader::parse(&escaped);
        assert_eq!(reader.entries().len(), 2);
    }

    #[test]
    fn test_malformed_degrades_to_empty() {
        let reader = FeedReader::parse("this is not xml at all");
        assert!(reader.entries().is_empty());
        assert_eq!(reader.header(), FeedHeader::default());
    }

    #[test]
    fn test_unclosed_markup_partial_recovery() {
        let broken = r#"<rss><channel><title>Broken</title>
<item><title>Only</title><link>https://example.com/x</link></item>"#;
        let reader = FeedReader::parse(broken);
        assert_eq!(reader.header().title.as_deref(), Some("Broken"));
        let entries = reader.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link().as_deref(), Some("https://example.com/x"));
    }

    #[test]
    fn test_raw_spans_alignment() {
        let spans = raw_spans(RSS2, "<item", 2);
        assert_eq!(spans.len(), 2);
        assert!(spans[0].contains("https://example.com/1"));
        assert!(spans[1].contains("https://example.com/2"));
    }
}
