use scribe_core::markup;
use scribe_core::{Document, Node, SurfaceValue};

#[test]
fn surface_value_round_trips_through_json() {
    let doc = markup::parse("<p>go <a href=\"https://x.dev\">here</a></p>");
    let value = SurfaceValue::from_document(doc.clone());

    let json = value.to_json_pretty().unwrap();
    let back = SurfaceValue::from_json_str(&json).unwrap();

    assert_eq!(back.schema, "scribe-markup");
    assert_eq!(back.version, 1);
    assert_eq!(back.into_document(), doc);
}

#[test]
fn missing_envelope_fields_use_defaults() {
    let json = r#"{ "document": { "children": [] } }"#;
    let value = SurfaceValue::from_json_str(json).unwrap();
    assert_eq!(value.schema, "scribe-markup");
    assert_eq!(value.version, 1);
    assert_eq!(value.document, Document::default());
}

#[test]
fn node_serde_tags_variants() {
    let node = Node::paragraph("x");
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["node"], "element");
    assert_eq!(json["tag"], "p");
    assert_eq!(json["children"][0]["node"], "text");
    assert_eq!(json["children"][0]["text"], "x");
}
