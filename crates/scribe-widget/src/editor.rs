use scribe_core::{CommandError, Node, Selection, node_at, text_content};

use crate::actions::{Action, ActionDescriptor};
use crate::host::HostPrompter;
use crate::surface::{BoundField, EditableSurface, SurfaceId, ViewMode};
use crate::toolbar::Toolbar;

/// The explicit replacement for the document-wide selection: which surface
/// owns the selection, and where it sits in that surface's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    pub surface: SurfaceId,
    pub selection: Selection,
}

/// One activated editor: toolbar, editable surface and the plain text field
/// it mirrors.
pub struct RichTextEditor {
    surface: EditableSurface,
    field: BoundField,
    toolbar: Toolbar,
    view_mode: ViewMode,
}

impl RichTextEditor {
    pub fn activate(id: SurfaceId, field_value: &str) -> Self {
        Self {
            surface: EditableSurface::new(id, field_value),
            field: BoundField::new(field_value),
            toolbar: Toolbar::new(),
            view_mode: ViewMode::Rendered,
        }
    }

    pub fn surface(&self) -> &EditableSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut EditableSurface {
        &mut self.surface
    }

    pub fn field(&self) -> &BoundField {
        &self.field
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn toolbar_mut(&mut self) -> &mut Toolbar {
        &mut self.toolbar
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Tracker entry point: recompute active flags, but only when the
    /// notifying selection belongs to this editor's surface. Other editors'
    /// selections leave this toolbar untouched.
    pub fn selection_changed(&mut self, ctx: &SelectionContext) {
        if self.view_mode == ViewMode::RawSource {
            return;
        }
        if ctx.surface != self.surface.id() {
            return;
        }
        self.toolbar
            .sync_to_selection(self.surface.engine().doc(), &ctx.selection);
    }

    /// Dispatches a toolbar button activation. Buttons are addressed by
    /// their catalog index.
    pub fn dispatch(
        &mut self,
        button_index: usize,
        prompter: &mut dyn HostPrompter,
    ) -> Result<(), CommandError> {
        if self.view_mode == ViewMode::RawSource {
            return Ok(());
        }
        let Some(button) = self.toolbar.button(button_index) else {
            return Ok(());
        };
        let descriptor: &'static ActionDescriptor = button.descriptor;
        let was_active = button.active;

        self.surface.focused = true;

        // A caret inside an already-active run means "act on the whole run":
        // widen the selection to the caret's parent element before anything
        // else. Otherwise flip the button eagerly; the tracker recomputes the
        // authoritative state on the next selection change.
        if self.surface.engine().selection().is_collapsed() && was_active {
            self.surface.engine_mut().select_parent_contents();
        } else if descriptor.action.has_toggle_state() {
            if let Some(button) = self.toolbar.buttons_mut().get_mut(button_index) {
                button.active = !was_active;
            }
        }

        match descriptor.action {
            Action::CreateLink => self.dispatch_link(prompter),
            Action::InsertHtmlTag => self.dispatch_tagged_block(descriptor.tag.unwrap_or("")),
            action => {
                self.surface
                    .engine_mut()
                    .exec(action.command_id(), None)?;
                self.notify_input();
                Ok(())
            }
        }
    }

    fn dispatch_link(&mut self, prompter: &mut dyn HostPrompter) -> Result<(), CommandError> {
        let anchor_path = self.surface.engine().selection().anchor.path.clone();
        if let Some(link_path) = self.surface.engine().ancestor_with_tag(&anchor_path, "a") {
            // Already inside a link: unwrap it to plain text instead of
            // creating another one.
            self.surface
                .engine_mut()
                .replace_with_text_content(&link_path)?;
            self.notify_input();
            return Ok(());
        }

        let Some(url) = prompter.prompt("Link URL", "https://google.com/") else {
            return Ok(());
        };
        if url.is_empty() {
            return Ok(());
        }
        let nofollow = prompter.confirm("Nofollow?");

        self.surface.engine_mut().exec("create_link", Some(&url))?;

        // Every created link opens without a handle back to this document.
        let anchor_path = self.surface.engine().selection().anchor.path.clone();
        if let Some(link_path) = self.surface.engine().ancestor_with_tag(&anchor_path, "a") {
            let mut rel = String::from("noopener noreferrer");
            if nofollow {
                rel.push_str(" nofollow");
            }
            self.surface.engine_mut().set_attr(&link_path, "rel", rel)?;
        }

        self.surface.engine_mut().select_parent_contents();
        self.notify_input();
        Ok(())
    }

    fn dispatch_tagged_block(&mut self, tag: &str) -> Result<(), CommandError> {
        if tag.is_empty() {
            return Ok(());
        }

        let anchor_path = self.surface.engine().selection().anchor.path.clone();
        if let Some(current) = self.surface.engine().ancestor_with_tag(&anchor_path, tag) {
            // Toggle the block off: demote it to a plain paragraph carrying
            // the same text.
            let engine = self.surface.engine();
            let text = node_at(engine.doc(), &current)
                .map(text_content)
                .unwrap_or_default();
            let separator = engine.config().paragraph_separator.clone();
            let paragraph = Node::element(separator, vec![Node::text(text)]);
            self.surface.engine_mut().replace_node(&current, paragraph)?;
            self.notify_input();
            return Ok(());
        }

        let content = if self.surface.engine().selection().is_collapsed() {
            tag.to_string()
        } else {
            self.surface.engine().selection_text()
        };
        let markup = format!("<{tag}>{content}</{tag}>");
        self.surface.engine_mut().exec("insert_html", Some(&markup))?;
        self.surface.engine_mut().select_parent_contents();
        self.notify_input();
        Ok(())
    }

    /// Synthetic input notification: push the surface's serialized markup
    /// into the bound field. This is the only path by which the field learns
    /// about structural mutations.
    pub fn notify_input(&mut self) {
        self.field.value = self.surface.markup();
    }

    /// Host-side edit of the raw field: mirror it into the surface.
    /// Last writer wins, no diffing.
    pub fn set_field_value(&mut self, value: &str) {
        self.field.value = value.to_string();
        self.surface.set_markup(value);
    }

    /// Switches between the rendered surface and the raw markup field.
    /// Exactly one of the two is visible; action buttons are meaningless
    /// without a live rendered selection, so raw mode hides them all.
    pub fn toggle_view_mode(&mut self) {
        match self.view_mode {
            ViewMode::Rendered => {
                self.view_mode = ViewMode::RawSource;
                self.surface.visible = false;
                self.field.visible = true;
                self.toolbar.set_buttons_visible(false);
                self.toolbar.source_active = true;
            }
            ViewMode::RawSource => {
                self.view_mode = ViewMode::Rendered;
                self.surface.visible = true;
                self.field.visible = false;
                self.toolbar.set_buttons_visible(true);
                self.toolbar.source_active = false;
            }
        }
    }
}
