use scribe_core::{Engine, Point, Selection};

fn select(engine: &mut Engine, anchor: (Vec<usize>, usize), focus: (Vec<usize>, usize)) {
    engine.set_selection(Selection {
        anchor: Point::new(anchor.0, anchor.1),
        focus: Point::new(focus.0, focus.1),
    });
}

#[test]
fn caret_insert_splits_the_text_node() {
    let mut engine = Engine::from_markup("<p>ac</p>");
    select(&mut engine, (vec![0, 0], 1), (vec![0, 0], 1));

    engine.exec("insert_html", Some("<b>b</b>")).unwrap();

    assert_eq!(engine.to_markup(), "<p>a<b>b</b>c</p>");
    // Caret lands at the end of the inserted markup.
    assert_eq!(engine.selection().anchor, Point::new(vec![0, 1, 0], 1));
    assert!(engine.selection().is_collapsed());
}

#[test]
fn range_insert_replaces_the_selected_text() {
    let mut engine = Engine::from_markup("Title");
    select(&mut engine, (vec![0], 0), (vec![0], 5));

    engine.exec("insert_html", Some("<h4>Title</h4>")).unwrap();

    assert_eq!(engine.to_markup(), "<h4>Title</h4>");
}

#[test]
fn insert_at_start_keeps_the_remainder_after() {
    let mut engine = Engine::from_markup("<p>tail</p>");
    select(&mut engine, (vec![0, 0], 0), (vec![0, 0], 0));

    engine.exec("insert_html", Some("<i>head</i>")).unwrap();

    assert_eq!(engine.to_markup(), "<p><i>head</i>tail</p>");
}

#[test]
fn insert_parses_multiple_root_nodes() {
    let mut engine = Engine::from_markup("<p>x</p>");
    select(&mut engine, (vec![0, 0], 1), (vec![0, 0], 1));

    engine.exec("insert_html", Some("<b>a</b><i>b</i>")).unwrap();

    assert_eq!(engine.to_markup(), "<p>x<b>a</b><i>b</i></p>");
}

#[test]
fn insert_requires_a_markup_argument() {
    let mut engine = Engine::from_markup("<p>x</p>");
    let err = engine.exec("insert_html", None).unwrap_err();
    assert!(err.message().contains("markup"));
}

#[test]
fn empty_fragment_is_a_noop() {
    let mut engine = Engine::from_markup("<p>x</p>");
    select(&mut engine, (vec![0, 0], 0), (vec![0, 0], 1));

    engine.exec("insert_html", Some("")).unwrap();

    assert_eq!(engine.to_markup(), "<p>x</p>");
    assert!(!engine.can_undo());
}
