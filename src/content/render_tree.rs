//! Serializable render tree produced by the content serializer

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// Elements rendered without a closing tag
const VOID_ELEMENTS: [&str; 5] = ["br", "hr", "img", "input", "col"];

/// A node in the render tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text { value: String },
    /// Markup passed through untouched (inline HTML / JSX)
    Raw { value: String },
}

/// An element node with ordered attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Node::Raw {
            value: value.into(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn push_text_content(&self, out: &mut String) {
        match self {
            Node::Element(el) => {
                for child in &el.children {
                    child.push_text_content(out);
                }
            }
            Node::Text { value } => out.push_str(value),
            Node::Raw { .. } => {}
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text { value } => out.push_str(&html_escape(value)),
            Node::Raw { value } => out.push_str(value),
        }
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Heading level for `h1`..`h6`
    pub fn heading_level(&self) -> Option<u8> {
        match self.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Concatenated text of all descendants, raw markup excluded
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_text_content(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html_escape(value));
            out.push('"');
        }

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            out.push_str(" />");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// Root of a processed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderTree {
    pub children: Vec<Node>,
}

impl RenderTree {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Visit every element depth-first, parents before children
    pub fn for_each_element<F>(&self, mut f: F)
    where
        F: FnMut(&Element),
    {
        fn walk<F: FnMut(&Element)>(nodes: &[Node], f: &mut F) {
            for node in nodes {
                if let Node::Element(el) = node {
                    f(el);
                    walk(&el.children, f);
                }
            }
        }
        walk(&self.children, &mut f);
    }

    /// Mutable depth-first visit; the callback runs before the children are visited
    pub fn for_each_element_mut<F, E>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut Element) -> Result<(), E>,
    {
        fn walk<F, E>(nodes: &mut [Node], f: &mut F) -> Result<(), E>
        where
            F: FnMut(&mut Element) -> Result<(), E>,
        {
            for node in nodes {
                if let Node::Element(el) = node {
                    f(el)?;
                    walk(&mut el.children, f)?;
                }
            }
            Ok(())
        }
        walk(&mut self.children, &mut f)
    }

    /// Re-hydrate the tree into HTML markup
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.write_html(&mut out);
        }
        out
    }
}
