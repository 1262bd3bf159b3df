/// Pointer gesture in progress. Lives outside the component tree so pointer-move
/// can update it tens of times a second without re-rendering anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PointerMode {
    #[default]
    Idle,
    Panning {
        last_x: f64,
    },
    DraggingPin {
        item_id: String,
        start_x: f64,
        x: f64,
    },
}

impl PointerMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, PointerMode::Idle)
    }

    pub fn dragged(&self) -> Option<(&str, f64)> {
        match self {
            PointerMode::DraggingPin { item_id, x, .. } => Some((item_id.as_str(), *x)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
}

impl Cursor {
    pub fn css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}
