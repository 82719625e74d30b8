use scribe_core::{Document, Selection, ancestor_with_tag};

use crate::actions::{ActionDescriptor, actions};

#[derive(Debug, Clone, Copy)]
pub struct ToolbarButton {
    pub descriptor: &'static ActionDescriptor,
    pub active: bool,
    pub visible: bool,
}

pub struct Toolbar {
    buttons: Vec<ToolbarButton>,
    /// The view-source button sits apart from the action catalog and stays
    /// visible in both view modes.
    pub source_active: bool,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolbar {
    pub fn new() -> Self {
        let buttons = actions()
            .iter()
            .map(|descriptor| ToolbarButton {
                descriptor,
                active: false,
                visible: true,
            })
            .collect();
        Self {
            buttons,
            source_active: false,
        }
    }

    pub fn buttons(&self) -> &[ToolbarButton] {
        &self.buttons
    }

    pub fn buttons_mut(&mut self) -> &mut [ToolbarButton] {
        &mut self.buttons
    }

    pub fn button(&self, index: usize) -> Option<&ToolbarButton> {
        self.buttons.get(index)
    }

    /// Recomputes every structural button's active flag from the selection
    /// anchor's ancestor chain. Buttons without a tag are never tracked.
    pub fn sync_to_selection(&mut self, doc: &Document, selection: &Selection) {
        for button in &mut self.buttons {
            let Some(tag) = button.descriptor.tag else {
                continue;
            };
            button.active = ancestor_with_tag(doc, &selection.anchor.path, tag).is_some();
        }
    }

    pub fn set_buttons_visible(&mut self, visible: bool) {
        for button in &mut self.buttons {
            button.visible = visible;
        }
    }
}
