use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::dom::{Document, ElementNode, Node, PathError};
use crate::ops::{Path, transform_insert, transform_unwrap, transform_wrap};
use crate::selection::{Point, Selection, region_of, selected_texts, text_range};

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "div",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecCommand {
    CreateLink { url: String },
    Unlink,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    FormatBlock { tag: String },
}

impl ExecCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ExecCommand::CreateLink { .. } => "createLink",
            ExecCommand::Unlink => "unlink",
            ExecCommand::Bold => "bold",
            ExecCommand::Italic => "italic",
            ExecCommand::Underline => "underline",
            ExecCommand::Strikethrough => "strikethrough",
            ExecCommand::FormatBlock { .. } => "formatBlock",
        }
    }

    /// Tags an inline toggle treats as "already applied". The first one is
    /// what gets inserted.
    pub fn inline_tags(&self) -> Option<&'static [&'static str]> {
        match self {
            ExecCommand::Bold => Some(&["b", "strong"]),
            ExecCommand::Italic => Some(&["i", "em"]),
            ExecCommand::Underline => Some(&["u"]),
            ExecCommand::Strikethrough => Some(&["strike", "s"]),
            ExecCommand::CreateLink { .. } | ExecCommand::Unlink => Some(&["a"]),
            ExecCommand::FormatBlock { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecOutcome {
    pub selection: Option<Selection>,
    /// Elements inserted by the command, in document order.
    pub created: Vec<Path>,
    pub changed: bool,
}

impl ExecOutcome {
    fn unchanged(selection: Selection) -> Self {
        Self {
            selection: Some(selection),
            created: Vec::new(),
            changed: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("selection is outside every editable region")]
    OutsideRegion,
    #[error(transparent)]
    Path(#[from] PathError),
}

/// The low-level rich-text mutation primitive commands fall back on when they
/// do not build markup themselves.
pub trait CommandExecutor {
    fn exec(
        &mut self,
        doc: &mut Document,
        regions: &[Path],
        selection: &Selection,
        command: &ExecCommand,
    ) -> Result<ExecOutcome, ExecError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeExecutor;

impl CommandExecutor for NativeExecutor {
    fn exec(
        &mut self,
        doc: &mut Document,
        regions: &[Path],
        selection: &Selection,
        command: &ExecCommand,
    ) -> Result<ExecOutcome, ExecError> {
        let (start, _) = selection.ordered();
        let region = region_of(regions, &start.path).ok_or(ExecError::OutsideRegion)?;
        let root = regions[region].clone();
        let Some((start, end)) = region_text_range(doc, &root, selection) else {
            return Ok(ExecOutcome::default());
        };

        let outcome = match command {
            ExecCommand::CreateLink { url } => {
                let unlinked = unwrap_tags(doc, &root, start, end, &["a"])?;
                let (start, end) = unlinked
                    .selection
                    .map(|s| (s.anchor, s.focus))
                    .ok_or(ExecError::OutsideRegion)?;
                let template = ElementNode::new("a").with_attr("href", url.as_str());
                wrap_selection(doc, &root, start, end, &template, &["a"])?
            }
            ExecCommand::Unlink => unwrap_tags(doc, &root, start, end, &["a"])?,
            ExecCommand::Bold
            | ExecCommand::Italic
            | ExecCommand::Underline
            | ExecCommand::Strikethrough => {
                let tags = command.inline_tags().unwrap_or_default();
                let texts = selected_texts(doc, &root, &start, &end);
                if texts.is_empty() {
                    ExecOutcome::unchanged(Selection::new(start, end))
                } else if texts
                    .iter()
                    .all(|text| has_tagged_ancestor(doc, &root, text, tags))
                {
                    unwrap_tags(doc, &root, start, end, tags)?
                } else {
                    let template = ElementNode::new(tags.first().copied().unwrap_or("span"));
                    wrap_selection(doc, &root, start, end, &template, tags)?
                }
            }
            ExecCommand::FormatBlock { tag } => format_block(doc, &root, start, end, tag)?,
        };

        tracing::debug!(target: "editor.exec", command = command.name(), changed = outcome.changed, created = outcome.created.len(), "exec");
        Ok(outcome)
    }
}

/// Whether every text node the selection covers sits inside one of `tags`
/// (below its editable region).
pub fn selection_within(
    doc: &Document,
    regions: &[Path],
    selection: &Selection,
    tags: &[&str],
) -> bool {
    let (start, _) = selection.ordered();
    let Some(region) = region_of(regions, &start.path) else {
        return false;
    };
    let root = &regions[region];
    let Some((start, end)) = region_text_range(doc, root, selection) else {
        return false;
    };
    let texts = selected_texts(doc, root, &start, &end);
    !texts.is_empty()
        && texts
            .iter()
            .all(|text| has_tagged_ancestor(doc, root, text, tags))
}

/// Tag of the block the selection starts in, if it starts inside one.
pub fn block_tag_at(doc: &Document, regions: &[Path], selection: &Selection) -> Option<String> {
    let (start, _) = selection.ordered();
    let region = region_of(regions, &start.path)?;
    let root = &regions[region];
    let child = *start.path.get(root.len())?;
    let mut block_path = root.clone();
    block_path.push(child);
    doc.element(&block_path)
        .filter(|el| BLOCK_TAGS.contains(&el.tag.as_str()))
        .map(|el| el.tag.clone())
}

fn region_text_range(doc: &Document, root: &[usize], selection: &Selection) -> Option<(Point, Point)> {
    let (start, end) = text_range(doc, selection)?;
    if end.path.starts_with(root) {
        return Some((start, end));
    }
    let last = doc.last_text(root)?;
    let len = doc.text_len(&last).unwrap_or(0);
    Some((start, Point::new(last, len)))
}

fn has_tagged_ancestor(doc: &Document, root: &[usize], path: &[usize], tags: &[&str]) -> bool {
    !tagged_ancestors(doc, root, path, tags).is_empty()
}

fn tagged_ancestors(doc: &Document, root: &[usize], path: &[usize], tags: &[&str]) -> Vec<Path> {
    (root.len() + 1..path.len())
        .map(|len| &path[..len])
        .filter(|prefix| {
            doc.element(prefix)
                .is_some_and(|el| tags.contains(&el.tag.as_str()))
        })
        .map(<[usize]>::to_vec)
        .collect()
}

/// Replace the element at `path` by its children. Returns how many children
/// took its place.
fn unwrap_element(doc: &mut Document, path: &[usize]) -> Result<usize, PathError> {
    let Some((&index, parent)) = path.split_last() else {
        return Err(PathError("Empty unwrap path".into()));
    };
    let children = doc.children_mut(parent)?;
    if index >= children.len() {
        return Err(PathError(format!(
            "Unwrap index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    match children.remove(index) {
        Node::Element(el) => {
            let count = el.children.len();
            children.splice(index..index, el.children);
            Ok(count)
        }
        text @ Node::Text(_) => {
            children.insert(index, text);
            Err(PathError("Cannot unwrap a text node".into()))
        }
    }
}

fn unwrap_tags(
    doc: &mut Document,
    root: &[usize],
    mut start: Point,
    mut end: Point,
    tags: &[&str],
) -> Result<ExecOutcome, ExecError> {
    let mut targets: BTreeSet<Path> = BTreeSet::new();
    for text in selected_texts(doc, root, &start, &end) {
        targets.extend(tagged_ancestors(doc, root, &text, tags));
    }

    // Last in document order first: earlier targets keep their paths.
    for target in targets.iter().rev() {
        let count = unwrap_element(doc, target)?;
        start.path = transform_unwrap(&start.path, target, count);
        end.path = transform_unwrap(&end.path, target, count);
    }

    Ok(ExecOutcome {
        selection: Some(Selection::new(start, end)),
        created: Vec::new(),
        changed: !targets.is_empty(),
    })
}

fn split_text(doc: &mut Document, path: &[usize], offset: usize) -> Result<Option<Path>, PathError> {
    let text = doc.text_mut(path)?;
    if offset == 0 || offset >= text.text.len() || !text.text.is_char_boundary(offset) {
        return Ok(None);
    }
    let right = text.text.split_off(offset);
    let mut at = path.to_vec();
    if let Some(last) = at.last_mut() {
        *last += 1;
    }
    doc.insert_node(&at, Node::text(right))?;
    Ok(Some(at))
}

/// Split the text nodes at both boundaries so the range starts at offset 0
/// of its first node and ends at the end of its last one.
fn split_boundaries(
    doc: &mut Document,
    start: Point,
    mut end: Point,
) -> Result<(Point, Point), PathError> {
    split_text(doc, &end.path, end.offset)?;
    let Some(right) = split_text(doc, &start.path, start.offset)? else {
        return Ok((start, end));
    };
    if end.path == start.path {
        end = Point::new(right.clone(), end.offset - start.offset);
    } else {
        end.path = transform_insert(&end.path, &right);
    }
    Ok((Point::new(right, 0), end))
}

fn coverage(node: &Node, path: &mut Vec<usize>, selected: &BTreeSet<Path>) -> (usize, usize) {
    match node {
        Node::Text(_) => (1, selected.contains(path.as_slice()) as usize),
        Node::Element(el) => {
            let mut total = (0, 0);
            for (ix, child) in el.children.iter().enumerate() {
                path.push(ix);
                let (all, hit) = coverage(child, path, selected);
                path.pop();
                total = (total.0 + all, total.1 + hit);
            }
            total
        }
    }
}

fn fully_covered(node: &Node, path: &[usize], selected: &BTreeSet<Path>) -> bool {
    let (all, hit) = coverage(node, &mut path.to_vec(), selected);
    all > 0 && all == hit
}

/// Tagged elements below `root` whose every text node is selected.
fn covered_elements(
    doc: &Document,
    root: &[usize],
    selected: &BTreeSet<Path>,
    tags: &[&str],
) -> Vec<Path> {
    let mut found: Vec<Path> = tagged_paths(doc, root, tags)
        .into_iter()
        .filter(|path| {
            doc.node(path)
                .is_some_and(|node| fully_covered(node, path, selected))
        })
        .collect();
    found.sort();
    found.dedup();
    found
}

fn tagged_paths(doc: &Document, root: &[usize], tags: &[&str]) -> Vec<Path> {
    let mut out = Vec::new();
    for tag in tags {
        out.extend(
            doc.select_all(tag)
                .into_iter()
                .filter(|path| path.starts_with(root) && path.len() > root.len()),
        );
    }
    out
}

/// Maximal nodes below `root` whose text is entirely selected, in document
/// order. Blocks are never units, so each block gets its own wrapper.
fn collect_units(doc: &Document, root: &[usize], selected: &BTreeSet<Path>) -> Vec<Path> {
    fn walk(children: &[Node], path: &mut Vec<usize>, selected: &BTreeSet<Path>, out: &mut Vec<Path>) {
        for (ix, node) in children.iter().enumerate() {
            path.push(ix);
            match node {
                Node::Text(_) => {
                    if selected.contains(path.as_slice()) {
                        out.push(path.clone());
                    }
                }
                Node::Element(el) => {
                    let (all, hit) = coverage(node, path, selected);
                    let block = BLOCK_TAGS.contains(&el.tag.as_str());
                    if all > 0 && all == hit && !block {
                        out.push(path.clone());
                    } else if hit > 0 {
                        walk(&el.children, path, selected, out);
                    }
                }
            }
            path.pop();
        }
    }

    let mut out = Vec::new();
    if let Some(children) = doc.children(root) {
        walk(children, &mut root.to_vec(), selected, &mut out);
    }
    out
}

/// Consecutive sibling units share one wrapper.
fn group_runs(units: &[Path]) -> Vec<(Path, RangeInclusive<usize>)> {
    let mut runs: Vec<(Path, usize, usize)> = Vec::new();
    for unit in units {
        let Some((&ix, parent)) = unit.split_last() else {
            continue;
        };
        match runs.last_mut() {
            Some((run_parent, _, end)) if run_parent.as_slice() == parent && *end + 1 == ix => {
                *end = ix;
            }
            _ => runs.push((parent.to_vec(), ix, ix)),
        }
    }
    runs.into_iter()
        .map(|(parent, start, end)| (parent, start..=end))
        .collect()
}

fn wrap_run(
    doc: &mut Document,
    parent: &[usize],
    range: &RangeInclusive<usize>,
    template: &ElementNode,
) -> Result<(), PathError> {
    let children = doc.children_mut(parent)?;
    if *range.end() >= children.len() {
        return Err(PathError(format!(
            "Wrap range out of bounds: {} >= {}",
            range.end(),
            children.len()
        )));
    }
    let moved: Vec<Node> = children.drain(range.clone()).collect();
    let mut wrapper = template.clone();
    wrapper.children = moved;
    children.insert(*range.start(), Node::Element(wrapper));
    Ok(())
}

fn wrap_selection(
    doc: &mut Document,
    root: &[usize],
    start: Point,
    end: Point,
    template: &ElementNode,
    strip_tags: &[&str],
) -> Result<ExecOutcome, ExecError> {
    if start == end {
        return Ok(ExecOutcome::unchanged(Selection::new(start, end)));
    }
    let (mut start, mut end) = split_boundaries(doc, start, end)?;
    let selected: BTreeSet<Path> = selected_texts(doc, root, &start, &end).into_iter().collect();
    if selected.is_empty() {
        return Ok(ExecOutcome::unchanged(Selection::new(start, end)));
    }

    for path in covered_elements(doc, root, &selected, strip_tags).iter().rev() {
        let count = unwrap_element(doc, path)?;
        start.path = transform_unwrap(&start.path, path, count);
        end.path = transform_unwrap(&end.path, path, count);
    }

    let selected: BTreeSet<Path> = selected_texts(doc, root, &start, &end).into_iter().collect();
    let units = collect_units(doc, root, &selected);
    let runs = group_runs(&units);

    let mut created: Vec<Path> = Vec::new();
    for (parent, range) in runs.iter().rev() {
        wrap_run(doc, parent, range, template)?;
        created = created
            .iter()
            .map(|path| transform_wrap(path, parent, range))
            .collect();
        let mut wrapper = parent.clone();
        wrapper.push(*range.start());
        created.insert(0, wrapper);
    }

    let selection = match (created.first(), created.last()) {
        (Some(first), Some(last)) => {
            let first = doc.first_text(first);
            let last = doc.last_text(last);
            match (first, last) {
                (Some(first), Some(last)) => {
                    let len = doc.text_len(&last).unwrap_or(0);
                    Selection::new(Point::new(first, 0), Point::new(last, len))
                }
                _ => Selection::new(start, end),
            }
        }
        _ => Selection::new(start, end),
    };

    Ok(ExecOutcome {
        selection: Some(selection),
        changed: !created.is_empty(),
        created,
    })
}

fn format_block(
    doc: &mut Document,
    root: &[usize],
    mut start: Point,
    mut end: Point,
    tag: &str,
) -> Result<ExecOutcome, ExecError> {
    let tag = tag.to_ascii_lowercase();
    let Some(&child) = start.path.get(root.len()) else {
        return Ok(ExecOutcome::unchanged(Selection::new(start, end)));
    };
    let mut block_path = root.to_vec();
    block_path.push(child);

    let current = doc
        .element(&block_path)
        .filter(|el| BLOCK_TAGS.contains(&el.tag.as_str()))
        .map(|el| el.tag.clone());

    if let Some(current) = current {
        let next = if current == tag { "p".to_string() } else { tag };
        doc.element_mut(&block_path)?.tag = next;
        return Ok(ExecOutcome {
            selection: Some(Selection::new(start, end)),
            created: Vec::new(),
            changed: true,
        });
    }

    let count = doc.children(root).map(<[Node]>::len).unwrap_or(0);
    if count == 0 {
        return Ok(ExecOutcome::unchanged(Selection::new(start, end)));
    }
    let range = 0..=count - 1;
    wrap_run(doc, root, &range, &ElementNode::new(tag))?;
    start.path = transform_wrap(&start.path, root, &range);
    end.path = transform_wrap(&end.path, root, &range);
    let mut created = root.to_vec();
    created.push(0);

    Ok(ExecOutcome {
        selection: Some(Selection::new(start, end)),
        created: vec![created],
        changed: true,
    })
}
