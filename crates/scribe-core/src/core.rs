use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::commands::{CommandError, CommandRegistry};
use crate::markup;
use crate::ops::{Op, Path, Transaction};

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
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            tag: tag.into(),
            attrs: Attrs::default(),
            children,
        })
    }

    pub fn element_with_attrs(tag: impl Into<String>, attrs: Attrs, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            tag: tag.into(),
            attrs,
            children,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element("p", vec![Node::text(text)])
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element(el) => Some(&el.tag),
            Node::Text(_) => None,
        }
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

pub fn text_content(node: &Node) -> String {
    match node {
        Node::Text(t) => t.text.clone(),
        Node::Element(el) => {
            let mut out = String::new();
            for child in &el.children {
                out.push_str(&text_content(child));
            }
            out
        }
    }
}

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
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub inverse_ops: Vec<Op>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

#[derive(Debug, Default)]
pub struct EngineConfig {
    pub max_undo: usize,
    pub max_normalize_iterations: usize,
    pub paragraph_separator: String,
}

impl EngineConfig {
    fn with_defaults(mut self) -> Self {
        if self.max_undo == 0 {
            self.max_undo = 200;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        if self.paragraph_separator.is_empty() {
            self.paragraph_separator = "p".to_string();
        }
        self
    }
}

pub struct Engine {
    doc: Document,
    selection: Selection,
    registry: CommandRegistry,
    config: EngineConfig,
    undo_stack: Vec<HistoryRecord>,
    redo_stack: Vec<HistoryRecord>,
}

impl Engine {
    pub fn new(doc: Document, selection: Selection, registry: CommandRegistry) -> Self {
        let config = EngineConfig::default().with_defaults();
        let mut engine = Self {
            doc,
            selection,
            registry,
            config,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        engine.normalize_in_place();
        engine
    }

    pub fn with_builtin_commands() -> Self {
        let doc = Document {
            children: vec![Node::paragraph("")],
        };
        let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
        Self::new(doc, selection, CommandRegistry::builtin())
    }

    pub fn from_markup(markup: &str) -> Self {
        let doc = markup::parse(markup);
        let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
        Self::new(doc, selection, CommandRegistry::builtin())
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.normalize_selection_in_place();
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn to_markup(&self) -> String {
        markup::serialize(&self.doc)
    }

    /// Replaces the whole document, as when the bound field is edited
    /// directly. The history refers to paths in the old tree, so it is
    /// discarded along with the old content.
    pub fn replace_document(&mut self, doc: Document) {
        self.doc = doc;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.selection = Selection::collapsed(Point::new(vec![0], 0));
        self.normalize_in_place();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };

        let HistoryRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut redo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            if let Ok(inv) = self.apply_op(op) {
                redo_ops.push(inv);
            } else {
                // If we can't apply inverse ops, bail out and stop mutating further.
                break;
            }
        }
        redo_ops.reverse();

        self.selection = selection_before.clone();
        self.normalize_in_place();

        self.redo_stack.push(HistoryRecord {
            selection_before,
            selection_after,
            inverse_ops: redo_ops,
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };

        let HistoryRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut undo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            if let Ok(inv) = self.apply_op(op) {
                undo_ops.push(inv);
            } else {
                break;
            }
        }
        undo_ops.reverse();

        self.selection = selection_after.clone();
        self.normalize_in_place();

        self.undo_stack.push(HistoryRecord {
            selection_before,
            selection_after,
            inverse_ops: undo_ops,
        });
        true
    }

    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let selection_before = self.selection.clone();

        let mut inverse_ops: Vec<Op> = Vec::new();
        for op in tx.ops.iter().cloned() {
            let inv = self.apply_op(op)?;
            inverse_ops.push(inv);
        }

        if let Some(sel) = tx.selection_after {
            self.selection = sel;
        }

        let mut inverse_normalize = self.normalize_with_inverse_ops()?;
        inverse_ops.append(&mut inverse_normalize);
        inverse_ops.reverse();

        self.normalize_selection_in_place();

        let selection_after = self.selection.clone();

        self.undo_stack.push(HistoryRecord {
            inverse_ops,
            selection_before,
            selection_after,
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > self.config.max_undo {
            self.undo_stack.remove(0);
        }

        Ok(())
    }

    pub fn exec(&mut self, id: &str, arg: Option<&str>) -> Result<(), CommandError> {
        let Some(command) = self.registry.command(id) else {
            return Err(CommandError::new(format!("Unknown command: {id}")));
        };
        (command.handler)(self, arg)
    }

    pub fn ancestor_with_tag(&self, path: &[usize], tag: &str) -> Option<Path> {
        ancestor_with_tag(&self.doc, path, tag)
    }

    /// Selects the full contents of the element at `path` (the document root
    /// for an empty path). An element with no text descendants leaves the
    /// selection untouched.
    pub fn select_contents_of(&mut self, path: &[usize]) {
        let children = if path.is_empty() {
            &self.doc.children
        } else {
            match node_at(&self.doc, path) {
                Some(Node::Element(el)) => &el.children,
                _ => return,
            }
        };
        let Some(anchor) = first_text_point_in(children, path) else {
            return;
        };
        let focus = last_text_point_in(children, path).unwrap_or_else(|| anchor.clone());
        self.selection = Selection { anchor, focus };
    }

    pub fn select_parent_contents(&mut self) {
        let anchor_path = self.selection.anchor.path.clone();
        if anchor_path.is_empty() {
            return;
        }
        let parent = anchor_path[..anchor_path.len() - 1].to_vec();
        self.select_contents_of(&parent);
    }

    /// The plain text covered by the selection. Ranges spanning more than
    /// one parent element yield an empty string.
    pub fn selection_text(&self) -> String {
        let (start, end) = ordered_range(&self.selection);
        if start.path == end.path {
            let Some(Node::Text(t)) = node_at(&self.doc, &start.path) else {
                return String::new();
            };
            let s = clamp_to_char_boundary(&t.text, start.offset);
            let e = clamp_to_char_boundary(&t.text, end.offset);
            if s >= e {
                return String::new();
            }
            return t.text[s..e].to_string();
        }

        let depth = start.path.len();
        if depth < 2 || end.path.len() != depth || start.path[..depth - 1] != end.path[..depth - 1]
        {
            return String::new();
        }

        let mut out = String::new();
        let first = start.path[depth - 1];
        let last = end.path[depth - 1];
        for ix in first..=last {
            let mut path = start.path[..depth - 1].to_vec();
            path.push(ix);
            let Some(node) = node_at(&self.doc, &path) else {
                continue;
            };
            match node {
                Node::Text(t) => {
                    let from = if ix == first {
                        clamp_to_char_boundary(&t.text, start.offset)
                    } else {
                        0
                    };
                    let to = if ix == last {
                        clamp_to_char_boundary(&t.text, end.offset)
                    } else {
                        t.text.len()
                    };
                    if from < to {
                        out.push_str(&t.text[from..to]);
                    }
                }
                Node::Element(_) => out.push_str(&text_content(node)),
            }
        }
        out
    }

    pub fn replace_node(&mut self, path: &[usize], node: Node) -> Result<(), CommandError> {
        let point = match &node {
            Node::Text(_) => Point::new(path.to_vec(), 0),
            Node::Element(el) => {
                first_text_point_in(&el.children, path).unwrap_or(Point::new(path.to_vec(), 0))
            }
        };
        let tx = Transaction::new(vec![
            Op::RemoveNode {
                path: path.to_vec(),
            },
            Op::InsertNode {
                path: path.to_vec(),
                node,
            },
        ])
        .selection_after(Selection::collapsed(point))
        .source("engine:replace_node");
        self.apply(tx)
            .map_err(|e| CommandError::new(format!("Failed to replace node: {e:?}")))
    }

    /// Replaces the element at `path` with its own plain text content.
    pub fn replace_with_text_content(&mut self, path: &[usize]) -> Result<(), CommandError> {
        let Some(node) = node_at(&self.doc, path) else {
            return Err(CommandError::new("Replace target not found"));
        };
        let text = text_content(node);
        self.replace_node(path, Node::text(text))
    }

    pub fn set_attr(
        &mut self,
        path: &[usize],
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CommandError> {
        let mut set = Attrs::new();
        set.insert(name.into(), value.into());
        let tx = Transaction::new(vec![Op::SetAttrs {
            path: path.to_vec(),
            patch: AttrPatch {
                set,
                remove: Vec::new(),
            },
        }])
        .source("engine:set_attr");
        self.apply(tx)
            .map_err(|e| CommandError::new(format!("Failed to set attribute: {e:?}")))
    }

    fn normalize_in_place(&mut self) {
        let _ = self.normalize_with_inverse_ops();
        self.normalize_selection_in_place();
    }

    fn normalize_selection_in_place(&mut self) {
        self.selection = normalize_selection(&self.doc, &self.selection);
    }

    fn normalize_with_inverse_ops(&mut self) -> Result<Vec<Op>, ApplyError> {
        let mut inverse_ops: Vec<Op> = Vec::new();
        for _ in 0..self.config.max_normalize_iterations {
            let ops = normalize_ops(&self.doc, &self.config);
            if ops.is_empty() {
                return Ok(inverse_ops);
            }
            for op in ops {
                let inv = self.apply_op(op)?;
                inverse_ops.push(inv);
            }
        }
        Err(ApplyError::NormalizeDidNotConverge)
    }

    fn apply_op(&mut self, op: Op) -> Result<Op, ApplyError> {
        apply_op_to(&mut self.doc, &mut self.selection, op)
    }
}

fn apply_op_to(doc: &mut Document, selection: &mut Selection, op: Op) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let text_node = node_text_mut(doc, &path)?;
            let offset = clamp_to_char_boundary(&text_node.text, offset);
            text_node.text.insert_str(offset, &text);
            transform_selection_insert_text(selection, &path, offset, text.len());
            Ok(Op::RemoveText {
                path,
                range: offset..offset + text.len(),
            })
        }
        Op::RemoveText { path, range } => {
            let text_node = node_text_mut(doc, &path)?;
            let start =
                clamp_to_char_boundary(&text_node.text, range.start.min(text_node.text.len()));
            let end = clamp_to_char_boundary(&text_node.text, range.end.min(text_node.text.len()));
            if start >= end {
                return Ok(Op::InsertText {
                    path,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = text_node.text[start..end].to_string();
            text_node.text.replace_range(start..end, "");
            transform_selection_remove_text(selection, &path, start..end);
            Ok(Op::InsertText {
                path,
                offset: start,
                text: removed,
            })
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            transform_selection_insert_node(selection, &path);
            Ok(Op::RemoveNode { path })
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            transform_selection_remove_node(selection, &path, &removed, doc);
            Ok(Op::InsertNode {
                path,
                node: removed,
            })
        }
        Op::SetAttrs { path, patch } => {
            let node = node_mut(doc, &path)?;
            let old = match node {
                Node::Element(el) => patch_apply(&mut el.attrs, &patch),
                Node::Text(_) => {
                    return Err(ApplyError::InvalidPath(
                        "Text has no attributes".to_string(),
                    ));
                }
            };
            Ok(Op::SetAttrs { path, patch: old })
        }
    }
}

#[derive(Debug)]
pub enum ApplyError {
    InvalidPath(String),
    NormalizeDidNotConverge,
}

impl From<PathError> for ApplyError {
    fn from(value: PathError) -> Self {
        ApplyError::InvalidPath(value.0)
    }
}

#[derive(Debug)]
pub struct PathError(pub String);

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

pub(crate) fn ordered_range(selection: &Selection) -> (Point, Point) {
    let anchor = selection.anchor.clone();
    let focus = selection.focus.clone();
    if (&anchor.path, anchor.offset) <= (&focus.path, focus.offset) {
        (anchor, focus)
    } else {
        (focus, anchor)
    }
}

fn transform_selection_insert_text(
    selection: &mut Selection,
    path: &[usize],
    offset: usize,
    len: usize,
) {
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path == path && point.offset >= offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

fn transform_selection_remove_text(
    selection: &mut Selection,
    path: &[usize],
    range: std::ops::Range<usize>,
) {
    let removed_len = range.end.saturating_sub(range.start);
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path != path {
            continue;
        }
        if point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}

fn transform_selection_insert_node(selection: &mut Selection, path: &[usize]) {
    if path.is_empty() {
        return;
    }
    let (parent_path, index) = path.split_at(path.len() - 1);
    let index = index[0];

    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() <= parent_path.len() {
            continue;
        }
        if !point.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        if point.path[depth] >= index {
            point.path[depth] += 1;
        }
    }
}

fn transform_selection_remove_node(
    selection: &mut Selection,
    path: &[usize],
    removed: &Node,
    doc_after_remove: &Document,
) {
    if path.is_empty() {
        return;
    }
    let (parent_path, index) = path.split_at(path.len() - 1);
    let index = index[0];

    let merge_prefix_len = match (removed, index.checked_sub(1)) {
        (Node::Text(removed_text), Some(left_index)) => {
            let mut left_path = parent_path.to_vec();
            left_path.push(left_index);
            match node_at(doc_after_remove, &left_path) {
                Some(Node::Text(left_text)) if left_text.text.ends_with(&removed_text.text) => {
                    Some(left_text.text.len().saturating_sub(removed_text.text.len()))
                }
                _ => None,
            }
        }
        _ => None,
    };

    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() <= parent_path.len() {
            continue;
        }
        if !point.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        let ix = point.path[depth];
        if ix > index {
            point.path[depth] = ix - 1;
            continue;
        }
        if ix < index {
            continue;
        }

        // Point was inside the removed subtree. Map it to a nearby point.
        if let (Some(prefix), Node::Text(removed_text)) = (merge_prefix_len, removed) {
            point.path.truncate(depth + 1);
            point.path[depth] = index - 1;
            point.offset = (prefix + point.offset).min(prefix + removed_text.text.len());
        } else {
            point.path.truncate(depth + 1);
            point.path[depth] = index.saturating_sub(1);
            point.offset = 0;
        }
    }
}

pub fn node_at<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    if path.is_empty() {
        return None;
    }

    let mut node = doc.children.get(path[0])?;
    for &ix in path.iter().skip(1) {
        node = match node {
            Node::Element(el) => el.children.get(ix)?,
            Node::Text(_) => return None,
        };
    }
    Some(node)
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    if path.is_empty() {
        return Err(PathError("Empty path".to_string()));
    }

    let mut children = &mut doc.children;
    for (depth, &ix) in path[..path.len() - 1].iter().enumerate() {
        let len = children.len();
        let node = children
            .get_mut(ix)
            .ok_or_else(|| PathError(format!("Path out of bounds at depth {depth}: {ix} >= {len}")))?;
        children = match node {
            Node::Element(el) => &mut el.children,
            Node::Text(_) => {
                return Err(PathError(format!("Non-container node at depth {depth}")));
            }
        };
    }

    let last = *path.last().expect("path is non-empty");
    let len = children.len();
    children
        .get_mut(last)
        .ok_or_else(|| PathError(format!("Path out of bounds: {last} >= {len}")))
}

fn node_text_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextNode, PathError> {
    match node_mut(doc, path)? {
        Node::Text(t) => Ok(t),
        Node::Element(_) => Err(PathError("Expected Text node".to_string())),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError("Empty insert path".to_string()));
    }

    let (parent_path, index) = path.split_at(path.len() - 1);
    let index = index[0];

    let children = if parent_path.is_empty() {
        &mut doc.children
    } else {
        match node_mut(doc, parent_path)? {
            Node::Element(el) => &mut el.children,
            Node::Text(_) => {
                return Err(PathError("Insert parent is not a container".to_string()));
            }
        }
    };

    if index > children.len() {
        return Err(PathError(format!(
            "Insert index out of bounds: {index} > {}",
            children.len()
        )));
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    if path.is_empty() {
        return Err(PathError("Empty remove path".to_string()));
    }

    let (parent_path, index) = path.split_at(path.len() - 1);
    let index = index[0];

    let children = if parent_path.is_empty() {
        &mut doc.children
    } else {
        match node_mut(doc, parent_path)? {
            Node::Element(el) => &mut el.children,
            Node::Text(_) => {
                return Err(PathError("Remove parent is not a container".to_string()));
            }
        }
    };

    if index >= children.len() {
        return Err(PathError(format!(
            "Remove index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    Ok(children.remove(index))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrPatch {
    #[serde(default)]
    pub set: Attrs,
    #[serde(default)]
    pub remove: Vec<String>,
}

fn patch_apply(attrs: &mut Attrs, patch: &AttrPatch) -> AttrPatch {
    let mut old_set: Attrs = Attrs::new();
    let mut old_remove: Vec<String> = Vec::new();

    for (k, v) in &patch.set {
        if let Some(prev) = attrs.insert(k.clone(), v.clone()) {
            old_set.insert(k.clone(), prev);
        } else {
            old_remove.push(k.clone());
        }
    }

    for key in &patch.remove {
        if let Some(prev) = attrs.remove(key) {
            old_set.insert(key.clone(), prev);
        }
    }

    AttrPatch {
        set: old_set,
        remove: old_remove,
    }
}

/// Walks the proper ancestors of `path`, nearest first, and returns the
/// first one whose element tag matches.
pub fn ancestor_with_tag(doc: &Document, path: &[usize], tag: &str) -> Option<Path> {
    for len in (1..path.len()).rev() {
        let prefix = &path[..len];
        if let Some(Node::Element(el)) = node_at(doc, prefix) {
            if el.tag.eq_ignore_ascii_case(tag) {
                return Some(prefix.to_vec());
            }
        }
    }
    None
}

pub(crate) fn first_text_point_in(children: &[Node], base: &[usize]) -> Option<Point> {
    for (ix, node) in children.iter().enumerate() {
        let mut path = base.to_vec();
        path.push(ix);
        match node {
            Node::Text(_) => return Some(Point::new(path, 0)),
            Node::Element(el) => {
                if let Some(point) = first_text_point_in(&el.children, &path) {
                    return Some(point);
                }
            }
        }
    }
    None
}

pub(crate) fn last_text_point_in(children: &[Node], base: &[usize]) -> Option<Point> {
    for (ix, node) in children.iter().enumerate().rev() {
        let mut path = base.to_vec();
        path.push(ix);
        match node {
            Node::Text(t) => return Some(Point::new(path, t.text.len())),
            Node::Element(el) => {
                if let Some(point) = last_text_point_in(&el.children, &path) {
                    return Some(point);
                }
            }
        }
    }
    None
}

fn first_text_point(doc: &Document) -> Option<Point> {
    first_text_point_in(&doc.children, &[])
}

fn normalize_selection(doc: &Document, selection: &Selection) -> Selection {
    let fallback = first_text_point(doc).unwrap_or(Point {
        path: vec![0],
        offset: 0,
    });

    let anchor = normalize_point(doc, &selection.anchor).unwrap_or_else(|| {
        normalize_point(doc, &selection.focus).unwrap_or_else(|| fallback.clone())
    });
    let focus = normalize_point(doc, &selection.focus).unwrap_or_else(|| anchor.clone());

    Selection { anchor, focus }
}

fn normalize_point(doc: &Document, point: &Point) -> Option<Point> {
    if point.path.is_empty() || doc.children.is_empty() {
        return None;
    }

    let mut resolved: Path = Vec::new();
    let mut children: &[Node] = &doc.children;

    for &wanted in &point.path {
        if children.is_empty() {
            break;
        }
        let ix = wanted.min(children.len() - 1);
        resolved.push(ix);
        match &children[ix] {
            Node::Text(t) => {
                return Some(Point {
                    path: resolved,
                    offset: clamp_to_char_boundary(&t.text, point.offset),
                });
            }
            Node::Element(el) => {
                children = &el.children;
            }
        }
    }

    match node_at(doc, &resolved)? {
        Node::Text(t) => Some(Point {
            offset: clamp_to_char_boundary(&t.text, point.offset),
            path: resolved,
        }),
        Node::Element(el) => first_text_point_in(&el.children, &resolved),
    }
}

/// One batch of normalization fixes for the first defect found; the engine
/// reapplies until the document is clean.
fn normalize_ops(doc: &Document, config: &EngineConfig) -> Vec<Op> {
    if doc.children.is_empty() {
        return vec![Op::InsertNode {
            path: vec![0],
            node: Node::element(config.paragraph_separator.clone(), vec![Node::text("")]),
        }];
    }

    fn walk(children: &[Node], path: &mut Vec<usize>, ops: &mut Vec<Op>) {
        // Merge the first adjacent pair of text siblings.
        for ix in 0..children.len().saturating_sub(1) {
            let (Node::Text(left), Node::Text(right)) = (&children[ix], &children[ix + 1]) else {
                continue;
            };
            if !right.text.is_empty() {
                let mut left_path = path.clone();
                left_path.push(ix);
                ops.push(Op::InsertText {
                    path: left_path,
                    offset: left.text.len(),
                    text: right.text.clone(),
                });
            }
            let mut right_path = path.clone();
            right_path.push(ix + 1);
            ops.push(Op::RemoveNode { path: right_path });
            return;
        }

        // Drop an empty text node that has siblings.
        if children.len() >= 2 {
            for (ix, node) in children.iter().enumerate() {
                let Node::Text(t) = node else {
                    continue;
                };
                if t.text.is_empty() {
                    let mut remove_path = path.clone();
                    remove_path.push(ix);
                    ops.push(Op::RemoveNode { path: remove_path });
                    return;
                }
            }
        }

        for (ix, node) in children.iter().enumerate() {
            let Node::Element(el) = node else {
                continue;
            };
            path.push(ix);
            if el.children.is_empty() && !markup::is_void_tag(&el.tag) {
                let mut insert_path = path.clone();
                insert_path.push(0);
                ops.push(Op::InsertNode {
                    path: insert_path,
                    node: Node::text(""),
                });
                path.pop();
                return;
            }
            walk(&el.children, path, ops);
            path.pop();
            if !ops.is_empty() {
                return;
            }
        }
    }

    let mut ops = Vec::new();
    walk(&doc.children, &mut Vec::new(), &mut ops);
    ops
}
