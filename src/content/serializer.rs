//! MDX body serialization into a render tree

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

use super::render_tree::{Element, Node, RenderTree};
use super::transforms::{AutolinkHeadings, HeadingSlugs, HighlightCode, Transform};
use super::ContentError;

/// Bumped whenever the serialized tree layout changes
pub const FORMAT_VERSION: u32 = 1;

/// A fully processed document, ready to be stored and re-hydrated later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedContent {
    pub version: u32,
    /// Highlight theme the code blocks were coloured with
    pub theme: String,
    /// Heading outline in document order
    pub headings: Vec<HeadingEntry>,
    pub tree: RenderTree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

impl SerializedContent {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ContentError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_html(&self) -> String {
        self.tree.to_html()
    }
}

/// Content serializer: markdown/MDX body -> transformed render tree.
///
/// The transform pipeline is fixed: heading slugs, then code highlighting,
/// then heading autolinks.
pub struct ContentSerializer {
    pipeline: Vec<Box<dyn Transform>>,
    theme: String,
}

impl ContentSerializer {
    pub fn new(theme: &str) -> Self {
        let highlight = HighlightCode::new(theme);
        let theme = highlight.theme_name().to_string();

        Self {
            pipeline: vec![
                Box::new(HeadingSlugs),
                Box::new(highlight),
                Box::new(AutolinkHeadings),
            ],
            theme,
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Parse and transform a document body
    pub fn serialize(&self, markdown: &str) -> Result<SerializedContent, ContentError> {
        let mut tree = parse_tree(markdown)?;

        for step in &self.pipeline {
            tracing::trace!(step = step.name(), "Applying transform");
            step.apply(&mut tree)?;
        }

        Ok(SerializedContent {
            version: FORMAT_VERSION,
            theme: self.theme.clone(),
            headings: outline(&tree),
            tree,
        })
    }

    /// Serialize straight to the opaque string stored on a post
    pub fn serialize_to_string(&self, markdown: &str) -> Result<String, ContentError> {
        self.serialize(markdown)?.to_json()
    }

    /// Serialize on the blocking pool; highlighting is CPU-bound
    pub async fn serialize_async(self: Arc<Self>, markdown: String) -> Result<String, ContentError> {
        tokio::task::spawn_blocking(move || self.serialize_to_string(&markdown)).await?
    }
}

impl Default for ContentSerializer {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

fn outline(tree: &RenderTree) -> Vec<HeadingEntry> {
    let mut headings = Vec::new();
    tree.for_each_element(|el| {
        if let (Some(level), Some(id)) = (el.heading_level(), el.attr("id")) {
            headings.push(HeadingEntry {
                level,
                id: id.to_string(),
                text: el.text_content(),
            });
        }
    });
    headings
}

/// Parse markdown into an untransformed render tree
pub fn parse_tree(markdown: &str) -> Result<RenderTree, ContentError> {
    // Front-matter is split off before this point, so no metadata blocks
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_GFM;

    let mut builder = TreeBuilder::new(markdown);
    for (event, range) in Parser::new_ext(markdown, options).into_offset_iter() {
        builder.event(event, range)?;
    }
    builder.finish()
}

/// Builds the tree from the parser's event stream
struct TreeBuilder<'a> {
    source: &'a str,
    root: Vec<Node>,
    stack: Vec<Element>,
    in_code_block: bool,
    in_table_head: bool,
    table_alignments: Vec<Alignment>,
    table_cell: usize,
    /// Offsets of currently unclosed `{` expression braces
    open_braces: Vec<usize>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            root: Vec::new(),
            stack: Vec::new(),
            in_code_block: false,
            in_table_head: false,
            table_alignments: Vec::new(),
            table_cell: 0,
            open_braces: Vec::new(),
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) -> Result<(), ContentError> {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if !self.in_code_block {
                    self.check_braces(range)?;
                }
                self.push(Node::text(text.to_string()));
            }
            Event::Code(code) => {
                self.push(
                    Element::new("code")
                        .with_children(vec![Node::text(code.to_string())])
                        .into(),
                );
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.check_braces(range)?;
                self.push(Node::raw(html.to_string()));
            }
            Event::FootnoteReference(label) => {
                let label = label.to_string();
                let link = Element::new("a")
                    .with_attr("href", format!("#{}", label))
                    .with_children(vec![Node::text(label)]);
                self.push(
                    Element::new("sup")
                        .with_attr("class", "footnote-reference")
                        .with_children(vec![link.into()])
                        .into(),
                );
            }
            Event::SoftBreak => self.push(Node::text("\n")),
            Event::HardBreak => self.push(Element::new("br").into()),
            Event::Rule => self.push(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input = input.with_attr("checked", "");
                }
                self.push(input.into());
            }
            other => {
                tracing::debug!("Unsupported markdown event dropped: {:?}", other);
            }
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) {
        let el = match tag {
            Tag::Paragraph => Element::new("p"),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut el = Element::new(format!("h{}", level as usize));
                if let Some(id) = id {
                    el = el.with_attr("id", id.to_string());
                }
                if !classes.is_empty() {
                    let classes: Vec<_> = classes.iter().map(|c| c.to_string()).collect();
                    el = el.with_attr("class", classes.join(" "));
                }
                for (name, value) in attrs {
                    el = el.with_attr(
                        name.to_string(),
                        value.map(|v| v.to_string()).unwrap_or_default(),
                    );
                }
                el
            }
            Tag::BlockQuote(_) => Element::new("blockquote"),
            Tag::CodeBlock(kind) => {
                self.in_code_block = true;
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|l| !l.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                self.stack.push(Element::new("pre"));
                let mut code = Element::new("code");
                if let Some(lang) = lang {
                    code = code.with_attr("class", format!("language-{}", lang));
                }
                code
            }
            Tag::HtmlBlock => return,
            Tag::List(Some(start)) => {
                let ol = Element::new("ol");
                if start != 1 {
                    ol.with_attr("start", start.to_string())
                } else {
                    ol
                }
            }
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(label) => Element::new("div")
                .with_attr("class", "footnote-definition")
                .with_attr("id", label.to_string()),
            Tag::DefinitionList => Element::new("dl"),
            Tag::DefinitionListTitle => Element::new("dt"),
            Tag::DefinitionListDefinition => Element::new("dd"),
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                Element::new("table")
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.table_cell = 0;
                self.stack.push(Element::new("thead"));
                Element::new("tr")
            }
            Tag::TableRow => {
                self.table_cell = 0;
                Element::new("tr")
            }
            Tag::TableCell => {
                let mut cell = Element::new(if self.in_table_head { "th" } else { "td" });
                let align = match self.table_alignments.get(self.table_cell) {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    _ => None,
                };
                if let Some(align) = align {
                    cell = cell.with_attr("style", format!("text-align:{}", align));
                }
                self.table_cell += 1;
                cell
            }
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let a = Element::new("a").with_attr("href", dest_url.to_string());
                if title.is_empty() {
                    a
                } else {
                    a.with_attr("title", title.to_string())
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let img = Element::new("img").with_attr("src", dest_url.to_string());
                if title.is_empty() {
                    img
                } else {
                    img.with_attr("title", title.to_string())
                }
            }
            _ => Element::new("div"),
        };
        self.stack.push(el);
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock => {}
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.close();
                self.close();
            }
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.close();
                self.close();
            }
            TagEnd::Table => {
                self.table_alignments.clear();
                self.close();
            }
            _ => self.close(),
        }
    }

    fn close(&mut self) {
        let Some(mut el) = self.stack.pop() else {
            return;
        };
        if el.tag == "img" {
            let alt = el.text_content();
            el.children.clear();
            el.attrs.insert("alt".to_string(), alt);
        }
        self.push(el.into());
    }

    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Track MDX expression braces; backslash-escaped braces are literal
    fn check_braces(&mut self, range: Range<usize>) -> Result<(), ContentError> {
        let Some(slice) = self.source.get(range.clone()) else {
            return Ok(());
        };

        // The parser drops the backslash of `\{` from the text range
        let mut escaped = range.start > 0 && self.source.as_bytes()[range.start - 1] == b'\\';
        for (i, c) in slice.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '{' => self.open_braces.push(range.start + i),
                '}' => {
                    if self.open_braces.pop().is_none() {
                        return Err(ContentError::Malformed {
                            line: line_of(self.source, range.start + i),
                            reason: "Unexpected closing brace `}` without an opening `{`"
                                .to_string(),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<RenderTree, ContentError> {
        if let Some(&offset) = self.open_braces.first() {
            return Err(ContentError::Malformed {
                line: line_of(self.source, offset),
                reason: "Unexpected end of file in expression, expected a closing brace for `{`"
                    .to_string(),
            });
        }

        while !self.stack.is_empty() {
            self.close();
        }
        Ok(RenderTree::new(self.root))
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}
