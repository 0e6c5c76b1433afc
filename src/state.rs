use crate::stroke::MutableStroke;

/// Whether a pointer is currently laying down a stroke.
#[derive(Debug, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing {
        stroke: MutableStroke,
    },
}

impl DrawingState {
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    pub fn stroke(&self) -> Option<&MutableStroke> {
        match self {
            Self::Drawing { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    pub fn stroke_mut(&mut self) -> Option<&mut MutableStroke> {
        match self {
            Self::Drawing { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    /// Return to `Idle`, handing back the stroke that was in progress.
    pub fn take(&mut self) -> Option<MutableStroke> {
        match std::mem::take(self) {
            Self::Drawing { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }
}
