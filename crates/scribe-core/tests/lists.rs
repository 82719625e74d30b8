use scribe_core::{Engine, Point, Selection};

fn caret(engine: &mut Engine, path: Vec<usize>, offset: usize) {
    engine.set_selection(Selection::collapsed(Point::new(path, offset)));
}

#[test]
fn ordered_list_wraps_the_current_block() {
    let mut engine = Engine::from_markup("<p>item</p>");
    caret(&mut engine, vec![0, 0], 2);

    engine.exec("insert_ordered_list", None).unwrap();

    assert_eq!(engine.to_markup(), "<ol><li>item</li></ol>");
    assert_eq!(engine.selection().anchor, Point::new(vec![0, 0, 0], 2));
}

#[test]
fn ordered_list_inside_a_list_unwraps_it() {
    let mut engine = Engine::from_markup("<ol><li>item</li></ol>");
    caret(&mut engine, vec![0, 0, 0], 2);

    engine.exec("insert_ordered_list", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>item</p>");
    assert_eq!(engine.selection().anchor, Point::new(vec![0, 0], 2));
}

#[test]
fn unordered_list_wraps_a_bare_text_block() {
    let mut engine = Engine::from_markup("item");
    caret(&mut engine, vec![0], 2);

    engine.exec("insert_unordered_list", None).unwrap();

    assert_eq!(engine.to_markup(), "<ul><li>item</li></ul>");
}

#[test]
fn unwrapping_a_multi_item_list_demotes_every_item() {
    let mut engine = Engine::from_markup("<ul><li>one</li><li>two</li></ul>");
    caret(&mut engine, vec![0, 1, 0], 0);

    engine.exec("insert_unordered_list", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>one</p><p>two</p>");
    assert_eq!(engine.selection().anchor, Point::new(vec![1, 0], 0));
}

#[test]
fn list_wrap_only_touches_the_anchor_block() {
    let mut engine = Engine::from_markup("<p>first</p><p>second</p>");
    caret(&mut engine, vec![1, 0], 0);

    engine.exec("insert_ordered_list", None).unwrap();

    assert_eq!(engine.to_markup(), "<p>first</p><ol><li>second</li></ol>");
}
