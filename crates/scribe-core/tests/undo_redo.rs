use scribe_core::{
    CommandRegistry, Document, Engine, Node, Op, Point, Selection, Transaction,
};

fn engine_with_text(text: &str) -> Engine {
    let doc = Document {
        children: vec![Node::paragraph(text)],
    };
    let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
    Engine::new(doc, selection, CommandRegistry::builtin())
}

#[test]
fn undo_redo_handles_multi_op_insert_order() {
    let mut engine = engine_with_text("");

    let tx = Transaction::new(vec![
        Op::InsertText {
            path: vec![0, 0],
            offset: 0,
            text: "a".to_string(),
        },
        Op::InsertText {
            path: vec![0, 0],
            offset: 1,
            text: "b".to_string(),
        },
    ])
    .selection_after(Selection::collapsed(Point::new(vec![0, 0], 2)))
    .source("test:multi_insert");

    engine.apply(tx).unwrap();
    assert_eq!(engine.doc().children, vec![Node::paragraph("ab")]);
    assert_eq!(engine.selection().focus.offset, 2);

    assert!(engine.undo());
    assert_eq!(engine.doc().children, vec![Node::paragraph("")]);
    assert_eq!(engine.selection().focus.offset, 0);

    assert!(engine.redo());
    assert_eq!(engine.doc().children, vec![Node::paragraph("ab")]);
    assert_eq!(engine.selection().focus.offset, 2);
}

#[test]
fn undo_restores_document_and_selection_after_a_wrap() {
    let mut engine = Engine::from_markup("<p>hello</p>");
    engine.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });
    let selection_before = engine.selection().clone();

    engine.exec("bold", None).unwrap();
    assert_eq!(engine.to_markup(), "<p><b>hello</b></p>");

    assert!(engine.undo());
    assert_eq!(engine.to_markup(), "<p>hello</p>");
    assert_eq!(engine.selection(), &selection_before);

    assert!(engine.redo());
    assert_eq!(engine.to_markup(), "<p><b>hello</b></p>");
}

#[test]
fn undo_commands_route_through_the_engine_history() {
    let mut engine = Engine::from_markup("<p>hello</p>");
    engine.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });

    engine.exec("italic", None).unwrap();
    assert_eq!(engine.to_markup(), "<p><i>hello</i></p>");

    engine.exec("undo", None).unwrap();
    assert_eq!(engine.to_markup(), "<p>hello</p>");

    engine.exec("redo", None).unwrap();
    assert_eq!(engine.to_markup(), "<p><i>hello</i></p>");
}

#[test]
fn undo_on_an_empty_history_reports_false() {
    let mut engine = engine_with_text("x");
    assert!(!engine.can_undo());
    assert!(!engine.undo());
    assert!(!engine.redo());
}

#[test]
fn a_new_transaction_clears_the_redo_stack() {
    let mut engine = engine_with_text("");

    let insert = |text: &str| {
        Transaction::new(vec![Op::InsertText {
            path: vec![0, 0],
            offset: 0,
            text: text.to_string(),
        }])
    };

    engine.apply(insert("a")).unwrap();
    assert!(engine.undo());
    assert!(engine.can_redo());

    engine.apply(insert("b")).unwrap();
    assert!(!engine.can_redo());
}
