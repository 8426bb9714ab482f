//! ElementRef: reactive access to a collaborator's live bounds.
//!
//! The widget needs two measurable collaborators from its host: the
//! bounding container and the moving element. Each is represented by an
//! `ElementRef` whose bounds the host writes on layout and resize, and which
//! the animator reads fresh on every tick. Sizes are never cached across
//! ticks, so a resize shows up on the very next frame without any
//! resubscription.

use crate::geometry::{Rect, Size};
use crate::reactive::{create_signal, Signal};

/// A handle to a collaborator's measured bounds.
///
/// Holds `None` until the host attaches the collaborator to a measurable
/// surface; while unattached, geometry-dependent work is skipped.
#[derive(Clone)]
pub struct ElementRef {
    bounds: Signal<Option<Rect>>,
}

impl ElementRef {
    /// The reactive signal holding the measured bounds.
    pub fn bounds(&self) -> Signal<Option<Rect>> {
        self.bounds.clone()
    }

    /// Attach (or re-measure): record the collaborator's current bounds.
    pub fn set_bounds(&self, rect: Rect) {
        self.bounds.set(Some(rect));
    }

    /// Update only the measured size, preserving the recorded origin.
    pub fn set_size(&self, size: Size) {
        let origin = self
            .bounds
            .get_untracked()
            .map(|rect| (rect.x, rect.y))
            .unwrap_or((0.0, 0.0));
        self.bounds
            .set(Some(Rect::new(origin.0, origin.1, size.width, size.height)));
    }

    /// Mark the collaborator as no longer measurable.
    pub fn detach(&self) {
        self.bounds.set(None);
    }

    pub fn is_attached(&self) -> bool {
        self.bounds.with_untracked(|bounds| bounds.is_some())
    }

    /// The current measured size, if attached.
    pub fn size(&self) -> Option<Size> {
        self.bounds.with_untracked(|bounds| bounds.map(|r| r.size()))
    }
}

/// Create a new, unattached `ElementRef`.
pub fn create_element_ref() -> ElementRef {
    ElementRef {
        bounds: create_signal(None),
    }
}

/// The sizes the animator needs for one tick, read together so a tick sees
/// a consistent snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub container: Size,
    pub element: Size,
}

/// Read both collaborators' sizes, or `None` if either is unattached.
pub fn read_geometry(container: &ElementRef, element: &ElementRef) -> Option<Geometry> {
    Some(Geometry {
        container: container.size()?,
        element: element.size()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unattached() {
        let r = create_element_ref();
        assert!(!r.is_attached());
        assert_eq!(r.size(), None);
    }

    #[test]
    fn test_set_bounds_attaches() {
        let r = create_element_ref();
        r.set_bounds(Rect::new(0.0, 0.0, 120.0, 60.0));
        assert!(r.is_attached());
        assert_eq!(r.size(), Some(Size::new(120.0, 60.0)));
    }

    #[test]
    fn test_set_size_preserves_origin() {
        let r = create_element_ref();
        r.set_bounds(Rect::new(10.0, 20.0, 120.0, 60.0));
        r.set_size(Size::new(200.0, 100.0));
        assert_eq!(
            r.bounds().get(),
            Some(Rect::new(10.0, 20.0, 200.0, 100.0))
        );
    }

    #[test]
    fn test_detach_clears_bounds() {
        let r = create_element_ref();
        r.set_bounds(Rect::new(0.0, 0.0, 50.0, 50.0));
        r.detach();
        assert!(!r.is_attached());
    }

    #[test]
    fn test_read_geometry_requires_both() {
        let container = create_element_ref();
        let element = create_element_ref();
        assert_eq!(read_geometry(&container, &element), None);

        container.set_bounds(Rect::new(0.0, 0.0, 500.0, 400.0));
        assert_eq!(read_geometry(&container, &element), None);

        element.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(
            read_geometry(&container, &element),
            Some(Geometry {
                container: Size::new(500.0, 400.0),
                element: Size::new(100.0, 100.0),
            })
        );
    }
}
