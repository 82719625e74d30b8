use serde::{Deserialize, Serialize};

/// A toolbar formatting action. Identifiers mirror the markup engine's
/// command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    Undo,
    Redo,
    InsertOrderedList,
    InsertUnorderedList,
    InsertHtmlTag,
    CreateLink,
    Unlink,
    RemoveFormat,
}

impl Action {
    pub fn command_id(self) -> &'static str {
        match self {
            Action::Bold => "bold",
            Action::Italic => "italic",
            Action::Underline => "underline",
            Action::StrikeThrough => "strike_through",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::InsertOrderedList => "insert_ordered_list",
            Action::InsertUnorderedList => "insert_unordered_list",
            Action::InsertHtmlTag => "insert_html",
            Action::CreateLink => "create_link",
            Action::Unlink => "unlink",
            Action::RemoveFormat => "remove_format",
        }
    }

    /// Unlink and remove-format have no persistent toggle state; every other
    /// button flips its active flag when clicked.
    pub fn has_toggle_state(self) -> bool {
        !matches!(self, Action::Unlink | Action::RemoveFormat)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActionDescriptor {
    pub action: Action,
    pub label: &'static str,
    /// Present only for actions whose active state is determined by an
    /// enclosing element of this tag. For tagged block insertion it is also
    /// the tag that gets inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<&'static str>,
}

/// The fixed toolbar catalog; order defines rendering order.
pub const ACTIONS: &[ActionDescriptor] = &[
    ActionDescriptor {
        action: Action::Bold,
        label: "B",
        tag: Some("b"),
    },
    ActionDescriptor {
        action: Action::Italic,
        label: "I",
        tag: Some("i"),
    },
    ActionDescriptor {
        action: Action::Underline,
        label: "U",
        tag: Some("u"),
    },
    ActionDescriptor {
        action: Action::StrikeThrough,
        label: "S",
        tag: Some("strike"),
    },
    ActionDescriptor {
        action: Action::Undo,
        label: "Undo",
        tag: None,
    },
    ActionDescriptor {
        action: Action::Redo,
        label: "Redo",
        tag: None,
    },
    ActionDescriptor {
        action: Action::InsertOrderedList,
        label: "OL",
        tag: Some("ol"),
    },
    ActionDescriptor {
        action: Action::InsertUnorderedList,
        label: "UL",
        tag: Some("ul"),
    },
    ActionDescriptor {
        action: Action::InsertHtmlTag,
        label: "H4",
        tag: Some("h4"),
    },
    ActionDescriptor {
        action: Action::InsertHtmlTag,
        label: "H5",
        tag: Some("h5"),
    },
    ActionDescriptor {
        action: Action::CreateLink,
        label: "Link",
        tag: Some("a"),
    },
    ActionDescriptor {
        action: Action::Unlink,
        label: "Remove links",
        tag: None,
    },
    ActionDescriptor {
        action: Action::RemoveFormat,
        label: "Remove formatting",
        tag: None,
    },
];

pub fn actions() -> &'static [ActionDescriptor] {
    ACTIONS
}
