use scribe_core::markup;
use scribe_core::{Node, text_content};

#[test]
fn parse_builds_a_tree_with_attributes() {
    let doc = markup::parse("<p>go <a href=\"https://x.dev\" rel='noopener'>here</a></p>");

    assert_eq!(doc.children.len(), 1);
    let Node::Element(p) = &doc.children[0] else {
        panic!("expected element");
    };
    assert_eq!(p.tag, "p");
    let Node::Element(a) = &p.children[1] else {
        panic!("expected anchor element");
    };
    assert_eq!(a.attrs.get("href").map(String::as_str), Some("https://x.dev"));
    assert_eq!(a.attrs.get("rel").map(String::as_str), Some("noopener"));
    assert_eq!(text_content(&p.children[1]), "here");
}

#[test]
fn serialize_writes_sorted_attributes_and_escapes() {
    let mut doc = markup::parse("<a>x</a>");
    let Node::Element(a) = &mut doc.children[0] else {
        panic!("expected element");
    };
    a.attrs
        .insert("rel".to_string(), "noopener noreferrer".to_string());
    a.attrs
        .insert("href".to_string(), "https://x.dev/?a=1&b=2".to_string());

    assert_eq!(
        markup::serialize(&doc),
        "<a href=\"https://x.dev/?a=1&amp;b=2\" rel=\"noopener noreferrer\">x</a>"
    );
}

#[test]
fn text_entities_round_trip() {
    let doc = markup::parse("a &amp; b &lt;c&gt;");
    assert_eq!(text_content(&doc.children[0]), "a & b <c>");
    assert_eq!(markup::serialize(&doc), "a &amp; b &lt;c&gt;");
}

#[test]
fn unknown_entities_pass_through() {
    let doc = markup::parse("x &unknown; y");
    assert_eq!(text_content(&doc.children[0]), "x &unknown; y");
}

#[test]
fn void_tags_have_no_closing_tag() {
    let markup_in = "<p>a<br>b</p>";
    let doc = markup::parse(markup_in);
    assert_eq!(markup::serialize(&doc), markup_in);
}

#[test]
fn unclosed_elements_close_at_end_of_input() {
    let doc = markup::parse("<p>a<b>b");
    assert_eq!(markup::serialize(&doc), "<p>a<b>b</b></p>");
}

#[test]
fn stray_close_tags_are_dropped() {
    let doc = markup::parse("</div>x");
    assert_eq!(markup::serialize(&doc), "x");
}

#[test]
fn comments_are_skipped() {
    let doc = markup::parse("<p>a<!-- note -->b</p>");
    assert_eq!(markup::serialize(&doc), "<p>ab</p>");
}

#[test]
fn mismatched_close_pops_inner_elements() {
    let doc = markup::parse("<p><b>x</p>");
    assert_eq!(markup::serialize(&doc), "<p><b>x</b></p>");
}

#[test]
fn stray_angle_bracket_stays_in_text() {
    let doc = markup::parse("1 < 2");
    assert_eq!(text_content(&doc.children[0]), "1 < 2");
}
