use crate::core::{Attrs, Document, ElementNode, Node};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

pub fn serialize(doc: &Document) -> String {
    serialize_nodes(&doc.children)
}

pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => escape_text(&t.text, out),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_tag(&el.tag) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

pub fn parse(markup: &str) -> Document {
    Document {
        children: parse_fragment(markup),
    }
}

/// Lenient tag-soup parser for the mirror format. Unknown entities pass
/// through, unmatched close tags are dropped, unclosed elements are closed
/// at end of input.
pub fn parse_fragment(markup: &str) -> Vec<Node> {
    let mut parser = Parser {
        input: markup,
        ix: 0,
        root: Vec::new(),
        stack: Vec::new(),
    };
    parser.run();
    parser.finish()
}

struct Parser<'a> {
    input: &'a str,
    ix: usize,
    root: Vec<Node>,
    stack: Vec<ElementNode>,
}

impl Parser<'_> {
    fn run(&mut self) {
        let bytes = self.input.as_bytes();
        let mut text_start = self.ix;

        while self.ix < bytes.len() {
            if bytes[self.ix] != b'<' {
                self.ix += 1;
                continue;
            }

            let rest = &self.input[self.ix..];
            if rest.starts_with("<!--") {
                self.flush_text(text_start);
                let close = rest.find("-->").map(|p| p + 3).unwrap_or(rest.len());
                self.ix += close;
                text_start = self.ix;
            } else if rest.starts_with("</") {
                self.flush_text(text_start);
                let (raw_name, consumed) = match rest.find('>') {
                    Some(p) => (&rest[2..p], p + 1),
                    None => (&rest[2..], rest.len()),
                };
                let name = raw_name.trim().to_ascii_lowercase();
                self.ix += consumed;
                text_start = self.ix;
                self.close_tag(&name);
            } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.flush_text(text_start);
                self.open_tag();
                text_start = self.ix;
            } else {
                // A stray '<' stays in the text run.
                self.ix += 1;
            }
        }
        self.flush_text(text_start);
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some(el) = self.stack.pop() {
            self.attach(Node::Element(el));
        }
        self.root
    }

    fn flush_text(&mut self, from: usize) {
        if from >= self.ix {
            return;
        }
        let text = unescape(&self.input[from..self.ix]);
        if !text.is_empty() {
            self.attach(Node::text(text));
        }
    }

    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(top) => top.children.push(node),
            None => self.root.push(node),
        }
    }

    fn close_tag(&mut self, name: &str) {
        if name.is_empty() || !self.stack.iter().any(|el| el.tag == name) {
            return;
        }
        while let Some(el) = self.stack.pop() {
            let done = el.tag == name;
            self.attach(Node::Element(el));
            if done {
                return;
            }
        }
    }

    fn open_tag(&mut self) {
        let bytes = self.input.as_bytes();
        self.ix += 1;

        let name_start = self.ix;
        while self.ix < bytes.len()
            && (bytes[self.ix].is_ascii_alphanumeric() || bytes[self.ix] == b'-')
        {
            self.ix += 1;
        }
        let tag = self.input[name_start..self.ix].to_ascii_lowercase();

        let mut attrs = Attrs::new();
        let mut self_closing = false;
        loop {
            while self.ix < bytes.len() && bytes[self.ix].is_ascii_whitespace() {
                self.ix += 1;
            }
            if self.ix >= bytes.len() {
                break;
            }
            match bytes[self.ix] {
                b'>' => {
                    self.ix += 1;
                    break;
                }
                b'/' => {
                    self_closing = true;
                    self.ix += 1;
                }
                _ => {
                    let (name, value) = self.read_attr();
                    if !name.is_empty() {
                        attrs.insert(name, value);
                    }
                }
            }
        }

        let element = ElementNode {
            tag: tag.clone(),
            attrs,
            children: Vec::new(),
        };
        if self_closing || is_void_tag(&tag) {
            self.attach(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn read_attr(&mut self) -> (String, String) {
        let bytes = self.input.as_bytes();

        let name_start = self.ix;
        while self.ix < bytes.len()
            && !bytes[self.ix].is_ascii_whitespace()
            && !matches!(bytes[self.ix], b'=' | b'>' | b'/')
        {
            self.ix += 1;
        }
        let name = self.input[name_start..self.ix].to_ascii_lowercase();

        while self.ix < bytes.len() && bytes[self.ix].is_ascii_whitespace() {
            self.ix += 1;
        }
        if self.ix >= bytes.len() || bytes[self.ix] != b'=' {
            return (name, String::new());
        }
        self.ix += 1;
        while self.ix < bytes.len() && bytes[self.ix].is_ascii_whitespace() {
            self.ix += 1;
        }

        if self.ix < bytes.len() && matches!(bytes[self.ix], b'"' | b'\'') {
            let quote = bytes[self.ix];
            self.ix += 1;
            let value_start = self.ix;
            while self.ix < bytes.len() && bytes[self.ix] != quote {
                self.ix += 1;
            }
            let value = unescape(&self.input[value_start..self.ix]);
            if self.ix < bytes.len() {
                self.ix += 1;
            }
            (name, value)
        } else {
            let value_start = self.ix;
            while self.ix < bytes.len()
                && !bytes[self.ix].is_ascii_whitespace()
                && bytes[self.ix] != b'>'
            {
                self.ix += 1;
            }
            (name, unescape(&self.input[value_start..self.ix]))
        }
    }
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let end = rest.as_bytes().iter().take(8).position(|&b| b == b';');
        match end {
            Some(end) => {
                let entity = &rest[1..end];
                let replacement = match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" | "#39" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                };
                match replacement {
                    Some(ch) => {
                        out.push(ch);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
