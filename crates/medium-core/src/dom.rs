use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ops::Path;

pub type Attrs = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.text.clone(),
            Node::Element(el) => el.text_content(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self, &mut out);
        out
    }
}

impl From<ElementNode> for Node {
    fn from(value: ElementNode) -> Self {
        Node::Element(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Attrs::default(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::text(text))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.remove(name)
    }

    pub fn class_list(&self) -> Vec<&str> {
        self.attr("class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().contains(&class)
    }

    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        let next = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr("class", next);
    }

    /// The `href` attribute as a browser would report it: absolute URLs are
    /// serialized by the URL parser, anything else is returned verbatim.
    pub fn href(&self) -> Option<String> {
        let raw = self.attr("href")?;
        Some(match url::Url::parse(raw) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => raw.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        self.attr("target").unwrap_or("")
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_html(child, &mut out);
        }
        out
    }

    fn matches(&self, selector: &Selector<'_>) -> bool {
        match selector {
            Selector::Class(class) => self.has_class(class),
            Selector::Id(id) => self.attr("id") == Some(*id),
            Selector::Tag(tag) => self.tag.eq_ignore_ascii_case(tag),
            Selector::Attr(name, value) => match value {
                Some(value) => self.attr(name) == Some(*value),
                None => self.attrs.contains_key(*name),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PathError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector<'a> {
    Class(&'a str),
    Id(&'a str),
    Tag(&'a str),
    Attr(&'a str, Option<&'a str>),
}

impl<'a> Selector<'a> {
    fn parse(input: &'a str) -> Option<Self> {
        let input = input.trim();
        if let Some(class) = input.strip_prefix('.') {
            return Some(Selector::Class(class));
        }
        if let Some(id) = input.strip_prefix('#') {
            return Some(Selector::Id(id));
        }
        if let Some(inner) = input.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return Some(match inner.split_once('=') {
                Some((name, value)) => {
                    Selector::Attr(name.trim(), Some(value.trim().trim_matches('"')))
                }
                None => Selector::Attr(inner.trim(), None),
            });
        }
        (!input.is_empty()).then_some(Selector::Tag(input))
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &ix in rest {
            node = match node {
                Node::Element(el) => el.children.get(ix)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Result<&mut Node, PathError> {
        let Some((first, rest)) = path.split_first() else {
            return Err(PathError("Empty path".into()));
        };
        let len = self.children.len();
        let mut node = self
            .children
            .get_mut(*first)
            .ok_or_else(|| PathError(format!("Path out of bounds at depth 0: {first} >= {len}")))?;
        for (depth, &ix) in rest.iter().enumerate() {
            node = match node {
                Node::Element(el) => {
                    let len = el.children.len();
                    el.children.get_mut(ix).ok_or_else(|| {
                        PathError(format!(
                            "Path out of bounds at depth {}: {ix} >= {len}",
                            depth + 1
                        ))
                    })?
                }
                Node::Text(_) => {
                    return Err(PathError(format!("Non-container node at depth {depth}")));
                }
            };
        }
        Ok(node)
    }

    pub fn element(&self, path: &[usize]) -> Option<&ElementNode> {
        self.node(path).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Result<&mut ElementNode, PathError> {
        match self.node_mut(path)? {
            Node::Element(el) => Ok(el),
            Node::Text(_) => Err(PathError("Expected element node".into())),
        }
    }

    pub fn text_mut(&mut self, path: &[usize]) -> Result<&mut TextNode, PathError> {
        match self.node_mut(path)? {
            Node::Text(t) => Ok(t),
            Node::Element(_) => Err(PathError("Expected text node".into())),
        }
    }

    pub fn children(&self, parent: &[usize]) -> Option<&[Node]> {
        if parent.is_empty() {
            return Some(&self.children);
        }
        self.element(parent).map(|el| el.children.as_slice())
    }

    pub fn children_mut(&mut self, parent: &[usize]) -> Result<&mut Vec<Node>, PathError> {
        if parent.is_empty() {
            return Ok(&mut self.children);
        }
        match self.node_mut(parent)? {
            Node::Element(el) => Ok(&mut el.children),
            Node::Text(_) => Err(PathError("Parent is not a container".into())),
        }
    }

    pub fn insert_node(&mut self, path: &[usize], node: Node) -> Result<(), PathError> {
        let Some((index, parent)) = path.split_last() else {
            return Err(PathError("Empty insert path".into()));
        };
        let children = self.children_mut(parent)?;
        if *index > children.len() {
            return Err(PathError(format!(
                "Insert index out of bounds: {index} > {}",
                children.len()
            )));
        }
        children.insert(*index, node);
        Ok(())
    }

    pub fn remove_node(&mut self, path: &[usize]) -> Result<Node, PathError> {
        let Some((index, parent)) = path.split_last() else {
            return Err(PathError("Empty remove path".into()));
        };
        let children = self.children_mut(parent)?;
        if *index >= children.len() {
            return Err(PathError(format!(
                "Remove index out of bounds: {index} >= {}",
                children.len()
            )));
        }
        Ok(children.remove(*index))
    }

    /// Element paths matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Vec<Path> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        walk_elements(&self.children, &mut Vec::new(), &mut |path, el| {
            if el.matches(&selector) {
                found.push(path.to_vec());
            }
        });
        found
    }

    /// First descendant element of `root` (excluding `root`) matching `selector`.
    pub fn query_selector(&self, root: &[usize], selector: &str) -> Option<Path> {
        let selector = Selector::parse(selector)?;
        let children = self.children(root)?;
        let mut found = None;
        let mut prefix = root.to_vec();
        walk_elements(children, &mut prefix, &mut |path, el| {
            if found.is_none() && el.matches(&selector) {
                found = Some(path.to_vec());
            }
        });
        found
    }

    /// Text leaves under `root` in document order. `root` itself is included
    /// when it is a text node.
    pub fn text_paths(&self, root: &[usize]) -> Vec<Path> {
        fn walk(children: &[Node], path: &mut Vec<usize>, out: &mut Vec<Path>) {
            for (ix, node) in children.iter().enumerate() {
                path.push(ix);
                match node {
                    Node::Text(_) => out.push(path.clone()),
                    Node::Element(el) => walk(&el.children, path, out),
                }
                path.pop();
            }
        }

        let mut out = Vec::new();
        match self.node(root) {
            Some(Node::Text(_)) => out.push(root.to_vec()),
            Some(Node::Element(el)) => walk(&el.children, &mut root.to_vec(), &mut out),
            None if root.is_empty() => walk(&self.children, &mut Vec::new(), &mut out),
            None => {}
        }
        out
    }

    pub fn first_text(&self, root: &[usize]) -> Option<Path> {
        self.text_paths(root).into_iter().next()
    }

    pub fn last_text(&self, root: &[usize]) -> Option<Path> {
        self.text_paths(root).pop()
    }

    pub fn text_len(&self, path: &[usize]) -> Option<usize> {
        self.node(path).and_then(Node::as_text).map(|t| t.text.len())
    }

    pub fn inner_html(&self, path: &[usize]) -> Option<String> {
        self.element(path).map(ElementNode::inner_html)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

fn walk_elements(
    children: &[Node],
    path: &mut Vec<usize>,
    visit: &mut dyn FnMut(&[usize], &ElementNode),
) {
    for (ix, node) in children.iter().enumerate() {
        if let Node::Element(el) = node {
            path.push(ix);
            visit(path, el);
            walk_elements(&el.children, path, visit);
            path.pop();
        }
    }
}

fn write_html(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&html_escape::encode_text(&t.text)),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            for child in &el.children {
                write_html(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}
