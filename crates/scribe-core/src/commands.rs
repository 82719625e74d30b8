use std::collections::HashMap;

use crate::core::{
    Attrs, Engine, Node, Point, Selection, clamp_to_char_boundary, first_text_point_in,
    last_text_point_in, node_at, ordered_range,
};
use crate::markup;
use crate::ops::{Op, Path, Transaction};

#[derive(Debug, Clone)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone)]
pub struct CommandSpec {
    pub id: String,
    pub label: String,
    pub handler:
        std::sync::Arc<dyn Fn(&mut Engine, Option<&str>) -> Result<(), CommandError> + Send + Sync>,
}

impl CommandSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(&mut Engine, Option<&str>) -> Result<(), CommandError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            handler: std::sync::Arc::new(handler),
        }
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
}

impl CommandRegistry {
    pub fn new(specs: impl IntoIterator<Item = CommandSpec>) -> Result<Self, String> {
        let mut registry = Self::default();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// The named formatting commands a rendered editing surface expects its
    /// markup engine to provide.
    pub fn builtin() -> Self {
        let specs = vec![
            CommandSpec::new("bold", "Bold", |engine, _arg| {
                toggle_inline_tag(engine, "b")
            }),
            CommandSpec::new("italic", "Italic", |engine, _arg| {
                toggle_inline_tag(engine, "i")
            }),
            CommandSpec::new("underline", "Underline", |engine, _arg| {
                toggle_inline_tag(engine, "u")
            }),
            CommandSpec::new("strike_through", "Strike through", |engine, _arg| {
                toggle_inline_tag(engine, "strike")
            }),
            CommandSpec::new("insert_ordered_list", "Ordered list", |engine, _arg| {
                toggle_list(engine, "ol")
            }),
            CommandSpec::new("insert_unordered_list", "Unordered list", |engine, _arg| {
                toggle_list(engine, "ul")
            }),
            CommandSpec::new("create_link", "Create link", create_link),
            CommandSpec::new("unlink", "Remove links", |engine, _arg| unlink(engine)),
            CommandSpec::new("remove_format", "Remove formatting", |engine, _arg| {
                remove_format(engine)
            }),
            CommandSpec::new("undo", "Undo", |engine, _arg| {
                engine.undo();
                Ok(())
            }),
            CommandSpec::new("redo", "Redo", |engine, _arg| {
                engine.redo();
                Ok(())
            }),
            CommandSpec::new("insert_html", "Insert markup", insert_html),
        ];
        Self::new(specs).expect("builtin registry must be valid")
    }

    pub fn register(&mut self, spec: CommandSpec) -> Result<(), String> {
        if self.commands.contains_key(&spec.id) {
            return Err(format!("Duplicate command id: {}", spec.id));
        }
        self.commands.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn commands(&self) -> &HashMap<String, CommandSpec> {
        &self.commands
    }

    pub fn command(&self, id: &str) -> Option<CommandSpec> {
        self.commands.get(id).cloned()
    }
}

const INLINE_FORMAT_TAGS: &[&str] = &["b", "i", "u", "strike", "em", "strong"];

fn apply_tx(engine: &mut Engine, tx: Transaction, what: &str) -> Result<(), CommandError> {
    engine
        .apply(tx)
        .map_err(|e| CommandError::new(format!("Failed to {what}: {e:?}")))
}

/// The shape of the current selection after ordering its boundary points.
enum RangeShape {
    Caret(Point),
    /// Both boundaries inside one text node.
    TextSpan {
        path: Path,
        start: usize,
        end: usize,
    },
    /// Boundaries in different leaf children of the same parent element.
    Siblings {
        parent: Path,
        start: Point,
        end: Point,
    },
}

fn range_shape(engine: &Engine) -> Option<RangeShape> {
    let (start, end) = ordered_range(engine.selection());
    if start == end {
        return Some(RangeShape::Caret(start));
    }
    if start.path == end.path {
        return Some(RangeShape::TextSpan {
            path: start.path,
            start: start.offset,
            end: end.offset,
        });
    }
    let depth = start.path.len();
    if depth >= 1 && end.path.len() == depth && start.path[..depth - 1] == end.path[..depth - 1] {
        return Some(RangeShape::Siblings {
            parent: start.path[..depth - 1].to_vec(),
            start,
            end,
        });
    }
    None
}

fn toggle_inline_tag(engine: &mut Engine, tag: &str) -> Result<(), CommandError> {
    let anchor_path = engine.selection().anchor.path.clone();
    if let Some(path) = engine.ancestor_with_tag(&anchor_path, tag) {
        let tx = unwrap_element_tx(engine, &path)?.source(format!("command:{tag}:unwrap"));
        return apply_tx(engine, tx, "unwrap inline tag");
    }
    let Some(tx) = wrap_range_tx(engine, tag, Attrs::new()) else {
        return Ok(());
    };
    apply_tx(
        engine,
        tx.source(format!("command:{tag}:wrap")),
        "wrap inline tag",
    )
}

/// Replaces the element at `path` with its children, spliced into the
/// parent at the element's index.
fn unwrap_element_tx(engine: &Engine, path: &[usize]) -> Result<Transaction, CommandError> {
    let Some(Node::Element(el)) = node_at(engine.doc(), path) else {
        return Err(CommandError::new("Unwrap target is not an element"));
    };
    let parent = &path[..path.len() - 1];
    let index = *path.last().expect("unwrap path is non-empty");

    let mut ops = vec![Op::RemoveNode {
        path: path.to_vec(),
    }];
    for (k, child) in el.children.iter().enumerate() {
        let mut child_path = parent.to_vec();
        child_path.push(index + k);
        ops.push(Op::InsertNode {
            path: child_path,
            node: child.clone(),
        });
    }

    // Points inside the unwrapped element move up one level.
    let map_point = |point: &Point| -> Point {
        if point.path.len() > path.len() && point.path[..path.len()] == *path {
            let mut mapped = parent.to_vec();
            mapped.push(index + point.path[path.len()]);
            mapped.extend_from_slice(&point.path[path.len() + 1..]);
            Point::new(mapped, point.offset)
        } else {
            point.clone()
        }
    };
    let selection = engine.selection();
    let selection_after = Selection {
        anchor: map_point(&selection.anchor),
        focus: map_point(&selection.focus),
    };

    Ok(Transaction::new(ops).selection_after(selection_after))
}

/// Wraps the selected range in a new element, splitting boundary text nodes
/// as needed. Collapsed or cross-parent ranges wrap nothing.
fn wrap_range_tx(engine: &Engine, tag: &str, attrs: Attrs) -> Option<Transaction> {
    match range_shape(engine)? {
        RangeShape::Caret(_) => None,
        RangeShape::TextSpan { path, start, end } => {
            let Some(Node::Text(t)) = node_at(engine.doc(), &path) else {
                return None;
            };
            let start = clamp_to_char_boundary(&t.text, start);
            let end = clamp_to_char_boundary(&t.text, end);
            if start >= end {
                return None;
            }

            let parent = &path[..path.len() - 1];
            let index = *path.last()?;
            let middle = t.text[start..end].to_string();
            let after = t.text[end..].to_string();
            let middle_len = middle.len();

            let mut ops = vec![Op::RemoveText {
                path: path.clone(),
                range: start..t.text.len(),
            }];
            let mut wrapper_path = parent.to_vec();
            wrapper_path.push(index + 1);
            ops.push(Op::InsertNode {
                path: wrapper_path.clone(),
                node: Node::element_with_attrs(tag, attrs, vec![Node::text(middle)]),
            });
            if !after.is_empty() {
                let mut after_path = parent.to_vec();
                after_path.push(index + 2);
                ops.push(Op::InsertNode {
                    path: after_path,
                    node: Node::text(after),
                });
            }
            if start == 0 {
                // Nothing left of the original text node.
                ops.push(Op::RemoveNode { path: path.clone() });
                *wrapper_path.last_mut()? = index;
            }

            let mut text_path = wrapper_path;
            text_path.push(0);
            let selection_after = Selection {
                anchor: Point::new(text_path.clone(), 0),
                focus: Point::new(text_path, middle_len),
            };
            Some(Transaction::new(ops).selection_after(selection_after))
        }
        RangeShape::Siblings { parent, start, end } => {
            // Boundaries must be direct leaf children of the parent.
            if start.path.len() != parent.len() + 1 || end.path.len() != parent.len() + 1 {
                return None;
            }
            let first = start.path[parent.len()];
            let last = end.path[parent.len()];
            if first >= last {
                return None;
            }

            let mut head = String::new();
            let mut tail = String::new();
            let mut covered: Vec<Node> = Vec::new();
            for ix in first..=last {
                let mut child_path = parent.clone();
                child_path.push(ix);
                let node = node_at(engine.doc(), &child_path)?;
                match node {
                    Node::Text(t) if ix == first => {
                        let s = clamp_to_char_boundary(&t.text, start.offset);
                        head = t.text[..s].to_string();
                        covered.push(Node::text(&t.text[s..]));
                    }
                    Node::Text(t) if ix == last => {
                        let e = clamp_to_char_boundary(&t.text, end.offset);
                        tail = t.text[e..].to_string();
                        covered.push(Node::text(&t.text[..e]));
                    }
                    other => covered.push(other.clone()),
                }
            }

            let mut ops = Vec::new();
            for _ in first..=last {
                let mut remove_path = parent.clone();
                remove_path.push(first);
                ops.push(Op::RemoveNode { path: remove_path });
            }
            let mut insert_at = first;
            if !head.is_empty() {
                let mut head_path = parent.clone();
                head_path.push(insert_at);
                ops.push(Op::InsertNode {
                    path: head_path,
                    node: Node::text(head),
                });
                insert_at += 1;
            }
            let mut wrapper_path = parent.clone();
            wrapper_path.push(insert_at);
            let selection_after = {
                let anchor = first_text_point_in(&covered, &wrapper_path)
                    .unwrap_or_else(|| Point::new(wrapper_path.clone(), 0));
                let focus =
                    last_text_point_in(&covered, &wrapper_path).unwrap_or_else(|| anchor.clone());
                Selection { anchor, focus }
            };
            ops.push(Op::InsertNode {
                path: wrapper_path,
                node: Node::element_with_attrs(tag, attrs, covered),
            });
            if !tail.is_empty() {
                let mut tail_path = parent.clone();
                tail_path.push(insert_at + 1);
                ops.push(Op::InsertNode {
                    path: tail_path,
                    node: Node::text(tail),
                });
            }

            Some(Transaction::new(ops).selection_after(selection_after))
        }
    }
}

fn toggle_list(engine: &mut Engine, list_tag: &str) -> Result<(), CommandError> {
    let anchor_path = engine.selection().anchor.path.clone();
    if let Some(path) = engine.ancestor_with_tag(&anchor_path, list_tag) {
        let tx = unwrap_list_tx(engine, &path)?.source(format!("command:{list_tag}:unwrap"));
        return apply_tx(engine, tx, "unwrap list");
    }
    if anchor_path.is_empty() {
        return Ok(());
    }

    // Wrap the top-level block containing the anchor.
    let block_ix = anchor_path[0];
    let Some(block) = engine.doc().children.get(block_ix) else {
        return Ok(());
    };

    let separator = engine.config().paragraph_separator.clone();
    let block_was_separator =
        matches!(block, Node::Element(el) if el.tag.eq_ignore_ascii_case(&separator));
    let item_children = match block {
        Node::Element(el) if block_was_separator => el.children.clone(),
        other => vec![other.clone()],
    };
    let list = Node::element(list_tag, vec![Node::element("li", item_children)]);

    let map_point = |point: &Point| -> Point {
        if point.path.first() == Some(&block_ix) {
            let mut mapped = vec![block_ix, 0];
            if !block_was_separator {
                mapped.push(0);
            }
            mapped.extend_from_slice(&point.path[1..]);
            Point::new(mapped, point.offset)
        } else {
            point.clone()
        }
    };
    let selection = engine.selection();
    let selection_after = Selection {
        anchor: map_point(&selection.anchor),
        focus: map_point(&selection.focus),
    };

    let tx = Transaction::new(vec![
        Op::RemoveNode {
            path: vec![block_ix],
        },
        Op::InsertNode {
            path: vec![block_ix],
            node: list,
        },
    ])
    .selection_after(selection_after)
    .source(format!("command:{list_tag}:wrap"));
    apply_tx(engine, tx, "wrap list")
}

/// Replaces a list element with its items, each list item demoted to a
/// paragraph-separator block.
fn unwrap_list_tx(engine: &Engine, path: &[usize]) -> Result<Transaction, CommandError> {
    let Some(Node::Element(list_el)) = node_at(engine.doc(), path) else {
        return Err(CommandError::new("Unwrap target is not an element"));
    };
    let parent = &path[..path.len() - 1];
    let index = *path.last().expect("unwrap path is non-empty");
    let separator = engine.config().paragraph_separator.clone();

    let mut ops = vec![Op::RemoveNode {
        path: path.to_vec(),
    }];
    for (k, child) in list_el.children.iter().enumerate() {
        let replacement = match child {
            Node::Element(item) if item.tag.eq_ignore_ascii_case("li") => {
                Node::element(separator.clone(), item.children.clone())
            }
            other => other.clone(),
        };
        let mut child_path = parent.to_vec();
        child_path.push(index + k);
        ops.push(Op::InsertNode {
            path: child_path,
            node: replacement,
        });
    }

    let map_point = |point: &Point| -> Point {
        if point.path.len() > path.len() && point.path[..path.len()] == *path {
            let mut mapped = parent.to_vec();
            mapped.push(index + point.path[path.len()]);
            mapped.extend_from_slice(&point.path[path.len() + 1..]);
            Point::new(mapped, point.offset)
        } else {
            point.clone()
        }
    };
    let selection = engine.selection();
    let selection_after = Selection {
        anchor: map_point(&selection.anchor),
        focus: map_point(&selection.focus),
    };

    Ok(Transaction::new(ops).selection_after(selection_after))
}

fn create_link(engine: &mut Engine, arg: Option<&str>) -> Result<(), CommandError> {
    let url = arg.ok_or_else(|| CommandError::new("create_link requires a URL argument"))?;
    let mut attrs = Attrs::new();
    attrs.insert("href".to_string(), url.to_string());
    let Some(tx) = wrap_range_tx(engine, "a", attrs) else {
        return Ok(());
    };
    apply_tx(engine, tx.source("command:create_link"), "create link")
}

fn unlink(engine: &mut Engine) -> Result<(), CommandError> {
    let anchor_path = engine.selection().anchor.path.clone();
    if let Some(path) = engine.ancestor_with_tag(&anchor_path, "a") {
        let tx = unwrap_element_tx(engine, &path)?.source("command:unlink");
        return apply_tx(engine, tx, "unlink");
    }

    // No enclosing anchor: unwrap anchors directly covered by the range.
    loop {
        let Some(RangeShape::Siblings { parent, start, end }) = range_shape(engine) else {
            return Ok(());
        };
        if start.path.len() != parent.len() + 1 || end.path.len() != parent.len() + 1 {
            return Ok(());
        }
        let first = start.path[parent.len()];
        let last = end.path[parent.len()];

        let mut found: Option<Path> = None;
        for ix in first..=last {
            let mut child_path = parent.clone();
            child_path.push(ix);
            if let Some(Node::Element(el)) = node_at(engine.doc(), &child_path) {
                if el.tag.eq_ignore_ascii_case("a") {
                    found = Some(child_path);
                    break;
                }
            }
        }
        let Some(path) = found else {
            return Ok(());
        };
        let tx = unwrap_element_tx(engine, &path)?.source("command:unlink");
        apply_tx(engine, tx, "unlink")?;
    }
}

fn remove_format(engine: &mut Engine) -> Result<(), CommandError> {
    loop {
        let anchor_path = engine.selection().anchor.path.clone();
        // Innermost formatting ancestor first.
        let target = INLINE_FORMAT_TAGS
            .iter()
            .filter_map(|tag| engine.ancestor_with_tag(&anchor_path, tag))
            .max_by_key(|path| path.len());
        let Some(path) = target else {
            return Ok(());
        };
        let tx = unwrap_element_tx(engine, &path)?.source("command:remove_format");
        apply_tx(engine, tx, "remove formatting")?;
    }
}

fn insert_html(engine: &mut Engine, arg: Option<&str>) -> Result<(), CommandError> {
    let markup = arg.ok_or_else(|| CommandError::new("insert_html requires a markup argument"))?;
    let nodes = markup::parse_fragment(markup);
    if nodes.is_empty() {
        return Ok(());
    }
    let Some(tx) = insert_nodes_tx(engine, nodes) else {
        return Ok(());
    };
    apply_tx(engine, tx.source("command:insert_html"), "insert markup")
}

/// Deletes the selected range and inserts `nodes` at the collapse point.
fn insert_nodes_tx(engine: &Engine, nodes: Vec<Node>) -> Option<Transaction> {
    let mut ops: Vec<Op> = Vec::new();

    let (parent, insert_at): (Path, usize) = match range_shape(engine)? {
        RangeShape::Caret(point) => match node_at(engine.doc(), &point.path) {
            Some(Node::Text(_)) => {
                split_text_for_insert(engine, &point.path, point.offset, point.offset, &mut ops)?
            }
            _ => {
                if point.path.is_empty() {
                    return None;
                }
                (
                    point.path[..point.path.len() - 1].to_vec(),
                    *point.path.last()?,
                )
            }
        },
        RangeShape::TextSpan { path, start, end } => {
            split_text_for_insert(engine, &path, start, end, &mut ops)?
        }
        RangeShape::Siblings { parent, start, end } => {
            if start.path.len() != parent.len() + 1 || end.path.len() != parent.len() + 1 {
                return None;
            }
            let first = start.path[parent.len()];
            let last = end.path[parent.len()];

            for _ in first + 1..last {
                let mut path = parent.clone();
                path.push(first + 1);
                ops.push(Op::RemoveNode { path });
            }
            // Trim or drop the trailing boundary leaf, now at first + 1.
            let mut end_path = parent.clone();
            end_path.push(first + 1);
            match node_at(engine.doc(), &end.path)? {
                Node::Text(t) => {
                    let e = clamp_to_char_boundary(&t.text, end.offset);
                    if e >= t.text.len() {
                        ops.push(Op::RemoveNode { path: end_path });
                    } else if e > 0 {
                        ops.push(Op::RemoveText {
                            path: end_path,
                            range: 0..e,
                        });
                    }
                }
                Node::Element(_) => ops.push(Op::RemoveNode { path: end_path }),
            }
            // Then the leading boundary leaf.
            let mut start_path = parent.clone();
            start_path.push(first);
            match node_at(engine.doc(), &start.path)? {
                Node::Text(t) => {
                    let s = clamp_to_char_boundary(&t.text, start.offset);
                    if s == 0 {
                        ops.push(Op::RemoveNode { path: start_path });
                        (parent, first)
                    } else {
                        ops.push(Op::RemoveText {
                            path: start_path,
                            range: s..t.text.len(),
                        });
                        (parent, first + 1)
                    }
                }
                Node::Element(_) => {
                    ops.push(Op::RemoveNode { path: start_path });
                    (parent, first)
                }
            }
        }
    };

    let caret = {
        let mut last_path = parent.clone();
        last_path.push(insert_at + nodes.len() - 1);
        match nodes.last()? {
            Node::Text(t) => Point::new(last_path, t.text.len()),
            Node::Element(el) => last_text_point_in(&el.children, &last_path)
                .unwrap_or_else(|| Point::new(last_path, 0)),
        }
    };

    for (k, node) in nodes.into_iter().enumerate() {
        let mut path = parent.clone();
        path.push(insert_at + k);
        ops.push(Op::InsertNode { path, node });
    }

    Some(Transaction::new(ops).selection_after(Selection::collapsed(caret)))
}

/// Removes `start..end` from the text node at `path` and yields the child
/// slot where inserted nodes should land, splitting the node when the caret
/// falls strictly inside it.
fn split_text_for_insert(
    engine: &Engine,
    path: &[usize],
    start: usize,
    end: usize,
    ops: &mut Vec<Op>,
) -> Option<(Path, usize)> {
    let Some(Node::Text(t)) = node_at(engine.doc(), path) else {
        return None;
    };
    let s = clamp_to_char_boundary(&t.text, start);
    let e = clamp_to_char_boundary(&t.text, end.max(start));
    let before = &t.text[..s];
    let after = &t.text[e..];
    let parent = path[..path.len() - 1].to_vec();
    let index = *path.last()?;

    if s < e {
        ops.push(Op::RemoveText {
            path: path.to_vec(),
            range: s..e,
        });
    }

    if before.is_empty() && after.is_empty() {
        ops.push(Op::RemoveNode {
            path: path.to_vec(),
        });
        Some((parent, index))
    } else if before.is_empty() {
        Some((parent, index))
    } else if after.is_empty() {
        Some((parent, index + 1))
    } else {
        // Split: the trailing half moves to a fresh node after the
        // insertion point.
        ops.push(Op::RemoveText {
            path: path.to_vec(),
            range: s..s + after.len(),
        });
        let mut after_path = parent.clone();
        after_path.push(index + 1);
        ops.push(Op::InsertNode {
            path: after_path,
            node: Node::text(after.to_string()),
        });
        Some((parent, index + 1))
    }
}
