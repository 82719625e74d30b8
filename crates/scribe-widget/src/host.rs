use scribe_core::Selection;

use crate::editor::{RichTextEditor, SelectionContext};
use crate::surface::SurfaceId;

/// Blocking modal prompts supplied by the host environment.
pub trait HostPrompter {
    /// Free-text entry; `None` means the user dismissed the prompt.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
    fn confirm(&mut self, message: &str) -> bool;
}

/// A text field in the host document. Only fields carrying the rich-editing
/// marker are upgraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostField {
    pub rich_editing: bool,
    pub value: String,
    pub hidden: bool,
}

impl HostField {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            rich_editing: false,
            value: value.into(),
            hidden: false,
        }
    }

    pub fn rich(value: impl Into<String>) -> Self {
        Self {
            rich_editing: true,
            value: value.into(),
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDocument {
    pub fields: Vec<HostField>,
}

impl HostDocument {
    pub fn new(fields: Vec<HostField>) -> Self {
        Self { fields }
    }
}

/// All editors activated in one host document. Selection-change
/// notifications fan out to every editor; each one checks ownership itself.
#[derive(Default)]
pub struct EditorSet {
    editors: Vec<RichTextEditor>,
}

impl EditorSet {
    /// Scans the host document once and upgrades every marked field: the
    /// field is hidden and an editor block takes its place.
    pub fn activate_document(host: &mut HostDocument) -> Self {
        let mut editors = Vec::new();
        for field in host.fields.iter_mut().filter(|f| f.rich_editing) {
            field.hidden = true;
            let id = SurfaceId(editors.len());
            editors.push(RichTextEditor::activate(id, &field.value));
        }
        Self { editors }
    }

    pub fn editors(&self) -> &[RichTextEditor] {
        &self.editors
    }

    pub fn editors_mut(&mut self) -> &mut [RichTextEditor] {
        &mut self.editors
    }

    pub fn editor(&self, index: usize) -> Option<&RichTextEditor> {
        self.editors.get(index)
    }

    pub fn editor_mut(&mut self, index: usize) -> Option<&mut RichTextEditor> {
        self.editors.get_mut(index)
    }

    pub fn editor_by_surface_mut(&mut self, surface: SurfaceId) -> Option<&mut RichTextEditor> {
        self.editors
            .iter_mut()
            .find(|editor| editor.surface().id() == surface)
    }

    /// Moves the document-wide selection into one surface and notifies every
    /// tracker, mirroring a host selection-change event.
    pub fn set_selection(&mut self, surface: SurfaceId, selection: Selection) {
        let Some(editor) = self.editor_by_surface_mut(surface) else {
            return;
        };
        editor.surface_mut().engine_mut().set_selection(selection);
        let normalized = editor.surface().engine().selection().clone();
        self.selection_changed(&SelectionContext {
            surface,
            selection: normalized,
        });
    }

    pub fn selection_changed(&mut self, ctx: &SelectionContext) {
        for editor in &mut self.editors {
            editor.selection_changed(ctx);
        }
    }
}
