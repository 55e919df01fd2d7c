use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dom::{Document, Node};
use crate::ops::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Whether the point still addresses something in `doc`: a text node with
    /// `offset` within its length, or an element with `offset` within its
    /// child count.
    pub fn resolves(&self, doc: &Document) -> bool {
        match doc.node(&self.path) {
            Some(Node::Text(t)) => self.offset <= t.text.len() && t.text.is_char_boundary(self.offset),
            Some(Node::Element(el)) => self.offset <= el.children.len(),
            None => false,
        }
    }

    /// Document order of two boundary points. An element point sits between
    /// its children, so against a point inside that element it compares its
    /// offset with the child index on the way down.
    pub fn compare(&self, other: &Point) -> Ordering {
        let common = self
            .path
            .iter()
            .zip(&other.path)
            .take_while(|(a, b)| a == b)
            .count();
        match (self.path.get(common), other.path.get(common)) {
            (Some(a), Some(b)) => a.cmp(b),
            (None, None) => self.offset.cmp(&other.offset),
            (None, Some(&child)) => {
                if self.offset <= child {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Some(&child), None) => {
                if other.offset <= child {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Anchor and focus in document order.
    pub fn ordered(&self) -> (&Point, &Point) {
        if self.focus.compare(&self.anchor) == Ordering::Less {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }
}

/// A snapshot of where the user was selected. Capturing never mutates the
/// document and a handle is never updated after it is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionHandle {
    start: Point,
    end: Point,
    collapsed: bool,
    region: usize,
}

impl SelectionHandle {
    /// Snapshot `live` when both of its ends lie inside one of `regions`.
    pub fn capture(doc: &Document, regions: &[Path], live: Option<&Selection>) -> Option<Self> {
        let live = live?;
        let (start, end) = live.ordered();
        let region = region_of(regions, &start.path)?;
        region_of(regions, &end.path)?;
        if !start.resolves(doc) || !end.resolves(doc) {
            return None;
        }
        Some(Self {
            start: start.clone(),
            end: end.clone(),
            collapsed: live.is_collapsed(),
            region,
        })
    }

    /// Re-resolve the stored points against the current document. `None`
    /// means the snapshot went stale and no selection should be made.
    pub fn restore(&self, doc: &Document) -> Option<Selection> {
        if !self.start.resolves(doc) || !self.end.resolves(doc) {
            tracing::debug!(target: "editor.selection", start=?self.start.path, end=?self.end.path, "restore_stale_handle");
            return None;
        }
        Some(Selection::new(self.start.clone(), self.end.clone()))
    }

    pub fn start(&self) -> &Point {
        &self.start
    }

    pub fn end(&self) -> &Point {
        &self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Index of the editable region the selection starts in.
    pub fn region(&self) -> usize {
        self.region
    }
}

/// Index of the region containing `path` (the region element itself counts).
pub fn region_of(regions: &[Path], path: &[usize]) -> Option<usize> {
    regions
        .iter()
        .position(|region| path.starts_with(region))
}

/// Select everything inside the element at `root`, as `selectNodeContents`
/// followed by boundary normalisation would.
pub fn select_contents(doc: &Document, root: &[usize]) -> Option<Selection> {
    let el = doc.element(root)?;
    let (Some(first), Some(last)) = (doc.first_text(root), doc.last_text(root)) else {
        return Some(Selection::new(
            Point::new(root.to_vec(), 0),
            Point::new(root.to_vec(), el.children.len()),
        ));
    };
    let last_len = doc.text_len(&last).unwrap_or(0);
    Some(Selection::new(Point::new(first, 0), Point::new(last, last_len)))
}

/// Ordered text boundaries of `selection`. Element-addressed points are
/// moved to the nearest text position. `None` when no text is reachable.
pub fn text_range(doc: &Document, selection: &Selection) -> Option<(Point, Point)> {
    let (start, end) = selection.ordered();
    let start = text_point(doc, start, Bias::Forward)?;
    let end = text_point(doc, end, Bias::Backward)?;
    if end.compare(&start) == Ordering::Less {
        return Some((start.clone(), start));
    }
    Some((start, end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bias {
    Forward,
    Backward,
}

fn text_point(doc: &Document, point: &Point, bias: Bias) -> Option<Point> {
    match doc.node(&point.path)? {
        Node::Text(t) => Some(Point::new(point.path.clone(), point.offset.min(t.text.len()))),
        Node::Element(el) => {
            let texts = doc.text_paths(&point.path);
            let mut child_path = point.path.clone();
            child_path.push(point.offset.min(el.children.len()));
            match bias {
                Bias::Forward => texts
                    .into_iter()
                    .find(|p| p.as_slice() >= child_path.as_slice())
                    .map(|p| Point::new(p, 0)),
                Bias::Backward => texts
                    .into_iter()
                    .rev()
                    .find(|p| p.as_slice() < child_path.as_slice())
                    .map(|p| {
                        let len = doc.text_len(&p).unwrap_or(0);
                        Point::new(p, len)
                    }),
            }
        }
    }
}

/// Text leaves that contribute at least one character to the range
/// `start..end`, in document order. A collapsed range yields the text node
/// holding the caret.
pub fn selected_texts(doc: &Document, root: &[usize], start: &Point, end: &Point) -> Vec<Path> {
    if start == end {
        return doc
            .node(&start.path)
            .and_then(Node::as_text)
            .map(|_| vec![start.path.clone()])
            .unwrap_or_default();
    }
    doc.text_paths(root)
        .into_iter()
        .filter(|path| path.as_slice() >= start.path.as_slice() && path.as_slice() <= end.path.as_slice())
        .filter(|path| {
            let len = doc.text_len(path).unwrap_or(0);
            let from = if *path == start.path { start.offset } else { 0 };
            let to = if *path == end.path { end.offset } else { len };
            from < to
        })
        .collect()
}
