use serde::{Deserialize, Serialize};

use scribe_core::{Engine, markup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Rendered,
    RawSource,
}

/// The live rich-content region generated for one bound text field.
pub struct EditableSurface {
    id: SurfaceId,
    engine: Engine,
    pub visible: bool,
    pub focused: bool,
}

impl EditableSurface {
    pub fn new(id: SurfaceId, markup: &str) -> Self {
        Self {
            id,
            engine: Engine::from_markup(markup),
            visible: true,
            focused: false,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn markup(&self) -> String {
        self.engine.to_markup()
    }

    pub fn set_markup(&mut self, markup: &str) {
        self.engine.replace_document(markup::parse(markup));
    }
}

/// The original plain text field, hidden once a surface takes over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundField {
    pub value: String,
    pub visible: bool,
}

impl BoundField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            visible: false,
        }
    }
}
