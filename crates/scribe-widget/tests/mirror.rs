use scribe_core::{Point, Selection};
use scribe_widget::{RichTextEditor, SurfaceId};

#[test]
fn activation_parses_the_field_value_into_the_surface() {
    let editor = RichTextEditor::activate(SurfaceId(0), "<p>go <b>fast</b></p>");
    assert_eq!(editor.surface().markup(), "<p>go <b>fast</b></p>");
    assert_eq!(editor.field().value, "<p>go <b>fast</b></p>");
}

#[test]
fn field_edits_update_the_surface() {
    let mut editor = RichTextEditor::activate(SurfaceId(0), "<p>old</p>");

    editor.set_field_value("<p><i>new</i></p>");

    assert_eq!(editor.surface().markup(), "<p><i>new</i></p>");
    assert_eq!(editor.field().value, "<p><i>new</i></p>");
}

#[test]
fn surface_mutations_update_the_field() {
    let mut editor = RichTextEditor::activate(SurfaceId(0), "<p>hello</p>");

    editor.surface_mut().engine_mut().set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });
    editor
        .surface_mut()
        .engine_mut()
        .exec("bold", None)
        .unwrap();
    editor.notify_input();

    assert_eq!(editor.field().value, "<p><b>hello</b></p>");
}

#[test]
fn one_synchronization_cycle_is_idempotent() {
    let mut editor = RichTextEditor::activate(SurfaceId(0), "<p>seed</p>");

    let markup = "<p>a<b>b</b>c</p>";
    editor.set_field_value(markup);
    let rendered = editor.surface().markup();
    assert_eq!(rendered, markup);

    // Feeding the rendered form back through the field changes nothing.
    editor.set_field_value(&rendered);
    assert_eq!(editor.surface().markup(), rendered);
}

#[test]
fn last_writer_wins_between_the_two_sides() {
    let mut editor = RichTextEditor::activate(SurfaceId(0), "<p>first</p>");

    editor.set_field_value("<p>second</p>");
    editor.surface_mut().set_markup("<p>third</p>");
    editor.notify_input();

    assert_eq!(editor.field().value, "<p>third</p>");
    assert_eq!(editor.surface().markup(), "<p>third</p>");
}
