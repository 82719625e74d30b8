use scribe_core::{Engine, Point, Selection};

fn engine_with(markup: &str) -> Engine {
    Engine::from_markup(markup)
}

fn select(engine: &mut Engine, anchor: (Vec<usize>, usize), focus: (Vec<usize>, usize)) {
    engine.set_selection(Selection {
        anchor: Point::new(anchor.0, anchor.1),
        focus: Point::new(focus.0, focus.1),
    });
}

#[test]
fn bold_wraps_selected_span() {
    let mut engine = engine_with("<p>hello world</p>");
    select(&mut engine, (vec![0, 0], 0), (vec![0, 0], 5));

    engine.exec("bold", None).unwrap();

    assert_eq!(engine.to_markup(), "<p><b>hello</b> world</p>");
    // Selection covers the wrapped run.
    assert_eq!(engine.selection().anchor, Point::new(vec![0, 0, 0], 0));
    assert_eq!(engine.selection().focus.offset, 5);
}

#[test]
fn bold_inside_existing_run_unwraps_it() {
    let mut engine = engine_with("<p>intro <b>hello</b> outro</p>");
    select(&mut engine, (vec![0, 1, 0], 0), (vec![0, 1, 0], 5));

    engine.exec("bold", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>intro hello outro</p>");
}

#[test]
fn wrap_splits_interior_span() {
    let mut engine = engine_with("<p>hello world</p>");
    select(&mut engine, (vec![0, 0], 6), (vec![0, 0], 11));

    engine.exec("italic", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>hello <i>world</i></p>");
}

#[test]
fn wrap_covers_sibling_leaves() {
    let mut engine = engine_with("<p>ab<i>cd</i>ef</p>");
    select(&mut engine, (vec![0, 0], 1), (vec![0, 2], 1));

    engine.exec("bold", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>a<b>b<i>cd</i>e</b>f</p>");
}

#[test]
fn collapsed_selection_without_enclosing_tag_is_a_noop() {
    let mut engine = engine_with("<p>hello</p>");
    select(&mut engine, (vec![0, 0], 2), (vec![0, 0], 2));

    engine.exec("bold", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>hello</p>");
    assert!(!engine.can_undo());
}

#[test]
fn backwards_selection_wraps_the_same_span() {
    let mut engine = engine_with("<p>hello</p>");
    select(&mut engine, (vec![0, 0], 5), (vec![0, 0], 0));

    engine.exec("underline", None).unwrap();

    assert_eq!(engine.to_markup(), "<p><u>hello</u></p>");
}

#[test]
fn strike_through_uses_the_strike_tag() {
    let mut engine = engine_with("<p>gone</p>");
    select(&mut engine, (vec![0, 0], 0), (vec![0, 0], 4));

    engine.exec("strike_through", None).unwrap();

    assert_eq!(engine.to_markup(), "<p><strike>gone</strike></p>");
}

#[test]
fn remove_format_unwraps_nested_formatting() {
    let mut engine = engine_with("<p><b><i>x</i></b></p>");
    select(&mut engine, (vec![0, 0, 0, 0], 0), (vec![0, 0, 0, 0], 1));

    engine.exec("remove_format", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>x</p>");
}

#[test]
fn unknown_command_is_an_error() {
    let mut engine = engine_with("<p>x</p>");
    let err = engine.exec("blink", None).unwrap_err();
    assert!(err.message().contains("Unknown command"));
}
