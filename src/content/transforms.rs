//! Render-tree transforms applied by the content serializer

use std::collections::HashMap;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::render_tree::{Element, Node, RenderTree};
use super::ContentError;

/// A single step of the serializer pipeline
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, tree: &mut RenderTree) -> Result<(), ContentError>;
}

/// GitHub-compatible slug generator with per-document de-duplication
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug `value`, suffixing `-1`, `-2`, ... for repeats
    pub fn slug(&mut self, value: &str) -> String {
        let original = slugify(value);
        let mut result = original.clone();

        while self.occurrences.contains_key(&result) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            result = format!("{}-{}", original, count);
        }

        self.occurrences.insert(result.clone(), 0);
        result
    }

    /// Register an id that is already taken
    fn reserve(&mut self, id: &str) {
        self.occurrences.entry(id.to_string()).or_insert(0);
    }
}

/// Lowercase, drop punctuation and symbols, turn spaces into hyphens
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// Assign `id` attributes to headings
pub struct HeadingSlugs;

impl Transform for HeadingSlugs {
    fn name(&self) -> &'static str {
        "heading-slugs"
    }

    fn apply(&self, tree: &mut RenderTree) -> Result<(), ContentError> {
        let mut slugger = Slugger::new();

        // Explicit `{#id}` attributes win and block their slug for later headings
        tree.for_each_element(|el| {
            if el.heading_level().is_some() {
                if let Some(id) = el.attr("id") {
                    slugger.reserve(id);
                }
            }
        });

        tree.for_each_element_mut(|el| {
            if el.heading_level().is_some() && el.attr("id").is_none() {
                let id = slugger.slug(&el.text_content());
                el.attrs.insert("id".to_string(), id);
            }
            Ok::<(), ContentError>(())
        })
    }
}

/// Syntax-highlight fenced code blocks with a fixed theme.
///
/// `pre > code.language-x` becomes
/// `figure > pre[data-language][data-theme] > code > span.line > span[style]`.
pub struct HighlightCode {
    syntax_set: SyntaxSet,
    theme: Theme,
    theme_name: String,
}

impl HighlightCode {
    pub fn new(theme_name: &str) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let (theme_name, theme) = match theme_set.themes.remove(theme_name) {
            Some(theme) => (theme_name.to_string(), theme),
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, falling back to base16-ocean.dark",
                    theme_name
                );
                let fallback = "base16-ocean.dark";
                let theme = theme_set
                    .themes
                    .remove(fallback)
                    .unwrap_or_default();
                (fallback.to_string(), theme)
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            theme_name,
        }
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    fn visit(&self, nodes: &mut [Node]) -> Result<(), ContentError> {
        for node in nodes.iter_mut() {
            if let Node::Element(el) = node {
                if let Some((lang, code)) = code_block(el) {
                    let figure = self.highlight_block(&lang, &code)?;
                    *node = Node::Element(figure);
                    continue;
                }
                self.visit(&mut el.children)?;
            }
        }
        Ok(())
    }

    fn highlight_block(&self, lang: &str, code: &str) -> Result<Element, ContentError> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &self.syntax_set)
                .map_err(|e| ContentError::Highlight(e.to_string()))?;

            let tokens = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    if text.is_empty() {
                        return None;
                    }
                    let mut css = format!("color:{}", hex(style.foreground));
                    if style.font_style.contains(FontStyle::ITALIC) {
                        css.push_str(";font-style:italic");
                    }
                    if style.font_style.contains(FontStyle::BOLD) {
                        css.push_str(";font-weight:bold");
                    }
                    Some(
                        Element::new("span")
                            .with_attr("style", css)
                            .with_children(vec![Node::text(text)])
                            .into(),
                    )
                })
                .collect();

            if !lines.is_empty() {
                lines.push(Node::text("\n"));
            }
            lines.push(
                Element::new("span")
                    .with_attr("data-line", "")
                    .with_children(tokens)
                    .into(),
            );
        }

        let background = self
            .theme
            .settings
            .background
            .map(hex)
            .unwrap_or_else(|| "#000000".to_string());

        let code_el = Element::new("code")
            .with_attr("data-language", lang)
            .with_attr("data-theme", self.theme_name.as_str())
            .with_children(lines);

        let pre = Element::new("pre")
            .with_attr("tabindex", "0")
            .with_attr("data-language", lang)
            .with_attr("data-theme", self.theme_name.as_str())
            .with_attr("style", format!("background-color:{}", background))
            .with_children(vec![code_el.into()]);

        Ok(Element::new("figure")
            .with_attr("data-rehype-pretty-code-figure", "")
            .with_children(vec![pre.into()]))
    }
}

impl Transform for HighlightCode {
    fn name(&self) -> &'static str {
        "highlight-code"
    }

    fn apply(&self, tree: &mut RenderTree) -> Result<(), ContentError> {
        self.visit(&mut tree.children)
    }
}

/// Match an un-highlighted `pre > code` block, returning (language, source)
fn code_block(el: &Element) -> Option<(String, String)> {
    if el.tag != "pre" || el.children.len() != 1 {
        return None;
    }
    let code = el.children[0].as_element().filter(|c| c.tag == "code")?;
    let lang = code
        .attr("class")
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
        })
        .unwrap_or("plaintext")
        .to_string();
    let source = code.text_content();
    let source = source.strip_suffix('\n').unwrap_or(&source);
    // Highlighting works line by line and needs the terminating newline back
    Some((lang, format!("{}\n", source)))
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Wrap heading contents in a link to the heading itself
pub struct AutolinkHeadings;

impl Transform for AutolinkHeadings {
    fn name(&self) -> &'static str {
        "autolink-headings"
    }

    fn apply(&self, tree: &mut RenderTree) -> Result<(), ContentError> {
        tree.for_each_element_mut(|el| {
            if el.heading_level().is_none() {
                return Ok(());
            }
            let Some(id) = el.attr("id").map(str::to_string) else {
                return Ok(());
            };
            let children = std::mem::take(&mut el.children);
            el.children = vec![Element::new("a")
                .with_attr("href", format!("#{}", id))
                .with_children(children)
                .into()];
            Ok::<(), ContentError>(())
        })
    }
}
