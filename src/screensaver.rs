//! The bouncing screensaver widget: drifts a moving element inside a
//! bounding container, reflecting off the edges and counting impacts.
//!
//! The widget owns its [`BounceState`] behind `Rc<RefCell<_>>` and mutates
//! it only from tick and event callbacks, so re-renders of the consuming UI
//! never disturb the animation. The tick is self-perpetuating: every run
//! re-arms itself through the frame scheduler until it is cancelled by a
//! pause reason or by teardown.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bitflags::bitflags;

use crate::bounce::BounceState;
use crate::element_ref::{create_element_ref, read_geometry, ElementRef, Geometry};
use crate::geometry::{Point, Rect};
use crate::input::{Event, EventResponse};
use crate::reactive::{create_signal, ReadSignal, Signal};
use crate::scheduler;

/// Callback for hover transitions (bool = is_hovered)
pub type HoverCallback = Arc<dyn Fn(bool)>;
/// Callback for impact-count updates (the new cumulative total)
pub type ImpactCallback = Arc<dyn Fn(u64)>;

bitflags! {
    /// Independent reasons for the animation to be paused. The widget
    /// animates exactly while this set is empty.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PauseReasons: u8 {
        /// Pointer is over the element and freeze-on-hover is enabled
        const HOVERED = 0b01;
        /// The hosting surface is hidden
        const HIDDEN  = 0b10;
    }
}

const DEFAULT_SPEED: f32 = 5.0;

struct Inner {
    state: RefCell<BounceState>,
    pause: Cell<PauseReasons>,
    mounted: Cell<bool>,

    // Configuration, fixed by the builder before `mount`
    freeze_on_hover: Cell<bool>,
    speed: Cell<f32>,
    seed: Cell<u64>,
    width: Cell<Option<f32>>,
    height: Cell<Option<f32>>,

    // Collaborator geometry
    container: ElementRef,
    element: ElementRef,

    // Observable state
    hovered: Signal<bool>,
    impact_count: Signal<u64>,
    offset: Signal<Point>,

    on_hover: RefCell<Option<HoverCallback>>,
    on_impact: RefCell<Option<ImpactCallback>>,
}

impl Inner {
    fn read_geometry(&self) -> Option<Geometry> {
        read_geometry(&self.container, &self.element)
    }

    /// Arm the next tick, unless paused, unmounted, or already armed.
    fn arm(this: &Rc<Inner>) {
        if !this.mounted.get() || !this.pause.get().is_empty() {
            return;
        }
        let mut state = this.state.borrow_mut();
        if state.scheduled.is_some() {
            return;
        }
        let weak: Weak<Inner> = Rc::downgrade(this);
        state.scheduled = Some(scheduler::request_frame_callback(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::tick(&inner);
            }
        }));
    }

    /// One animation tick: read geometry, advance, publish, re-arm.
    fn tick(this: &Rc<Inner>) {
        this.state.borrow_mut().scheduled = None;
        if !this.mounted.get() {
            return;
        }

        let Some(geometry) = this.read_geometry() else {
            // Not measurable yet: skip the update but keep the loop alive.
            Inner::arm(this);
            return;
        };

        let (position, strikes, total) = {
            let mut state = this.state.borrow_mut();
            if !state.seeded {
                state.seed_within(geometry.container);
            }
            let strikes = state.advance(geometry.container, geometry.element);
            (state.position, strikes, state.impact_count)
        };

        // Publish after releasing the state borrow: subscribers may read
        // back into the widget.
        this.offset.set(position);
        if strikes > 0 {
            this.impact_count.set(total);
            let callback = this.on_impact.borrow().clone();
            if let Some(callback) = callback {
                callback(total);
            }
        }

        Inner::arm(this);
    }

    /// Add or remove one pause reason, cancelling or re-arming the tick on
    /// the empty/non-empty transitions.
    fn set_pause_reason(this: &Rc<Inner>, reason: PauseReasons, active: bool) {
        let before = this.pause.get();
        let after = if active { before | reason } else { before - reason };
        if after == before {
            return;
        }
        this.pause.set(after);

        if before.is_empty() {
            if let Some(handle) = this.state.borrow_mut().scheduled.take() {
                scheduler::cancel_frame_callback(handle);
            }
            log::debug!("screensaver frozen ({:?})", after);
        } else if after.is_empty() {
            log::debug!("screensaver resumed");
            Inner::arm(this);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.state.borrow_mut().scheduled.take() {
            scheduler::cancel_frame_callback(handle);
        }
    }
}

/// The bouncing screensaver widget. Cheap to clone; clones share one
/// animation instance, like any reactive handle.
#[derive(Clone)]
pub struct Screensaver {
    inner: Rc<Inner>,
}

impl Screensaver {
    pub fn new() -> Self {
        let seed = clock_seed();
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(BounceState::new(DEFAULT_SPEED, seed)),
                pause: Cell::new(PauseReasons::empty()),
                mounted: Cell::new(false),
                freeze_on_hover: Cell::new(false),
                speed: Cell::new(DEFAULT_SPEED),
                seed: Cell::new(seed),
                width: Cell::new(None),
                height: Cell::new(None),
                container: create_element_ref(),
                element: create_element_ref(),
                hovered: create_signal(false),
                impact_count: create_signal(0),
                offset: create_signal(Point::ZERO),
                on_hover: RefCell::new(None),
                on_impact: RefCell::new(None),
            }),
        }
    }

    /// Distance travelled per tick on each axis. Positive; negative values
    /// are treated as zero.
    pub fn speed(self, speed: f32) -> Self {
        self.inner.speed.set(speed.max(0.0));
        self
    }

    /// Pause the animation while the pointer is over the moving element.
    pub fn freeze_on_hover(self, freeze: bool) -> Self {
        self.inner.freeze_on_hover.set(freeze);
        self
    }

    /// Container width used when the host attaches no geometry of its own.
    pub fn width(self, width: f32) -> Self {
        self.inner.width.set(Some(width));
        self
    }

    /// Container height used when the host attaches no geometry of its own.
    pub fn height(self, height: f32) -> Self {
        self.inner.height.set(Some(height));
        self
    }

    /// Seed for the pseudo-random start position, for reproducible runs.
    /// Defaults to a clock-derived value.
    pub fn seed(self, seed: u64) -> Self {
        self.inner.seed.set(seed);
        self
    }

    /// Set a callback invoked once per hover transition with the new state.
    pub fn on_hover<F: Fn(bool) + 'static>(self, callback: F) -> Self {
        *self.inner.on_hover.borrow_mut() = Some(Arc::new(callback));
        self
    }

    /// Set a callback invoked with the cumulative impact count whenever it
    /// changes: once per tick, with the tick's resulting total.
    pub fn on_impact<F: Fn(u64) + 'static>(self, callback: F) -> Self {
        *self.inner.on_impact.borrow_mut() = Some(Arc::new(callback));
        self
    }

    /// Geometry handle for the bounding container.
    pub fn container_ref(&self) -> ElementRef {
        self.inner.container.clone()
    }

    /// Geometry handle for the moving element.
    pub fn element_ref(&self) -> ElementRef {
        self.inner.element.clone()
    }

    /// Whether the pointer is currently over the moving element.
    pub fn hovered(&self) -> ReadSignal<bool> {
        self.inner.hovered.reader()
    }

    /// The live cumulative impact count.
    pub fn impact_count(&self) -> ReadSignal<u64> {
        self.inner.impact_count.reader()
    }

    /// The element's offset within the container: the visual transform the
    /// host applies, updated every tick that moves the element.
    pub fn offset(&self) -> ReadSignal<Point> {
        self.inner.offset.reader()
    }

    /// Create the animation state and arm the first tick. Idempotent while
    /// mounted; a fresh mount after [`unmount`](Self::unmount) starts over.
    pub fn mount(&self) {
        if self.inner.mounted.get() {
            return;
        }
        if !self.inner.container.is_attached() {
            if let (Some(width), Some(height)) =
                (self.inner.width.get(), self.inner.height.get())
            {
                self.inner
                    .container
                    .set_bounds(Rect::new(0.0, 0.0, width, height));
            }
        }
        {
            let mut state = self.inner.state.borrow_mut();
            debug_assert!(state.scheduled.is_none());
            *state = BounceState::new(self.inner.speed.get(), self.inner.seed.get());
        }
        // Mirror the fresh state into the observable signals (a no-op on
        // first mount, a reset on remount).
        self.inner.impact_count.set(0);
        self.inner.offset.set(Point::ZERO);
        self.inner.mounted.set(true);
        log::debug!(
            "screensaver mounted (speed {}, freeze_on_hover {})",
            self.inner.speed.get(),
            self.inner.freeze_on_hover.get()
        );
        Inner::arm(&self.inner);
    }

    /// Tear down the animation: cancel any outstanding frame. Dropping the
    /// last handle does the same.
    pub fn unmount(&self) {
        if !self.inner.mounted.get() {
            return;
        }
        self.inner.mounted.set(false);
        if let Some(handle) = self.inner.state.borrow_mut().scheduled.take() {
            scheduler::cancel_frame_callback(handle);
        }
        log::debug!("screensaver unmounted");
    }

    /// Feed a host event to the widget. Pointer coordinates are
    /// container-local; hover is hit-tested against the moving element.
    pub fn handle_event(&self, event: &Event) -> EventResponse {
        match event {
            Event::PointerEnter { x, y } | Event::PointerMove { x, y } => {
                let over = self.element_hit(*x, *y);
                self.apply_hover(over)
            }
            Event::PointerLeave => self.apply_hover(false),
            Event::VisibilityChanged { visible } => {
                Inner::set_pause_reason(&self.inner, PauseReasons::HIDDEN, !*visible);
                EventResponse::Handled
            }
        }
    }

    fn element_hit(&self, x: f32, y: f32) -> bool {
        let Some(size) = self.inner.element.size() else {
            return false;
        };
        let offset = self.inner.offset.get_untracked();
        Rect::new(offset.x, offset.y, size.width, size.height).contains(x, y)
    }

    fn apply_hover(&self, over: bool) -> EventResponse {
        if self.inner.hovered.get_untracked() == over {
            return EventResponse::Ignored;
        }
        self.inner.hovered.set(over);
        let callback = self.inner.on_hover.borrow().clone();
        if let Some(callback) = callback {
            callback(over);
        }
        if self.inner.freeze_on_hover.get() {
            Inner::set_pause_reason(&self.inner, PauseReasons::HOVERED, over);
        }
        EventResponse::Handled
    }
}

impl Default for Screensaver {
    fn default() -> Self {
        Self::new()
    }
}

pub fn screensaver() -> Screensaver {
    Screensaver::new()
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
