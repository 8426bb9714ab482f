//! Input events the widget consumes, in container-local coordinates.

/// Pointer and visibility events delivered by the host.
#[derive(Debug, Clone)]
pub enum Event {
    /// Pointer entered the container (with entry coordinates)
    PointerEnter { x: f32, y: f32 },
    /// Pointer moved inside the container
    PointerMove { x: f32, y: f32 },
    /// Pointer left the container
    PointerLeave,
    /// The hosting surface became hidden or visible
    VisibilityChanged { visible: bool },
}

impl Event {
    /// Get the coordinates from this event, if any
    pub fn coords(&self) -> Option<(f32, f32)> {
        match self {
            Event::PointerEnter { x, y } => Some((*x, *y)),
            Event::PointerMove { x, y } => Some((*x, *y)),
            Event::PointerLeave | Event::VisibilityChanged { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}
