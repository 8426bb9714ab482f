//! Frame scheduling: the continuation point of the animation loop.
//!
//! A tick registers a one-shot callback with [`request_frame_callback`] and
//! receives an opaque [`FrameHandle`]; the host drains the registry once per
//! display-refresh interval with [`run_scheduled_frames`]. A callback that
//! re-arms itself while running lands in the *next* frame, never the
//! current one.
//!
//! Scheduling also raises a global frame-request flag and pings the host
//! event loop so an idle host wakes up. The flag can be raised from any
//! thread (signal writes do); the callback registry itself is owned by the
//! host thread.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;

use calloop::ping::Ping;

/// Identifies one pending scheduled callback. Stale handles are harmless:
/// cancelling a handle that already ran (or was already cancelled) is a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

type FrameCallback = Box<dyn FnOnce()>;

thread_local! {
    /// Callbacks armed for the next frame, in scheduling order.
    static SCHEDULED_FRAMES: RefCell<Vec<(u64, FrameCallback)>> = const { RefCell::new(Vec::new()) };
}

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// Schedule `callback` to run on the next frame.
pub fn request_frame_callback<F>(callback: F) -> FrameHandle
where
    F: FnOnce() + 'static,
{
    let id = NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed);
    SCHEDULED_FRAMES.with(|frames| {
        frames.borrow_mut().push((id, Box::new(callback)));
    });
    request_frame();
    FrameHandle(id)
}

/// Cancel a pending callback. Unknown or stale handles are ignored; a
/// callback the host has already started dispatching cannot be aborted.
pub fn cancel_frame_callback(handle: FrameHandle) {
    SCHEDULED_FRAMES.with(|frames| {
        frames.borrow_mut().retain(|(id, _)| *id != handle.0);
    });
}

/// Run every callback armed for this frame, in scheduling order.
///
/// The registry is drained before any callback runs, so re-arming from
/// inside a callback schedules for the following frame.
pub fn run_scheduled_frames() {
    let due = SCHEDULED_FRAMES.with(|frames| std::mem::take(&mut *frames.borrow_mut()));
    for (_, callback) in due {
        callback();
    }
}

/// Whether any callback is armed on this thread.
pub fn has_scheduled_frames() -> bool {
    SCHEDULED_FRAMES.with(|frames| !frames.borrow().is_empty())
}

/// Number of callbacks currently armed on this thread.
pub fn scheduled_frame_count() -> usize {
    SCHEDULED_FRAMES.with(|frames| frames.borrow().len())
}

/// Global flag to indicate a frame is requested
static FRAME_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Global wakeup handle for signaling the event loop
static WAKEUP_PING: OnceLock<Ping> = OnceLock::new();

/// Initialize the wakeup mechanism (called from `App::run`).
pub fn init_wakeup(ping: Ping) {
    let _ = WAKEUP_PING.set(ping);
}

/// Request that the host event loop process a frame.
pub fn request_frame() {
    // Only ping on the first request - avoids redundant syscalls when
    // several signals update in one frame.
    let was_requested = FRAME_REQUESTED.swap(true, Ordering::Relaxed);
    if !was_requested {
        if let Some(ping) = WAKEUP_PING.get() {
            ping.ping();
        }
    }
}

/// Check if a frame has been requested and clear the flag.
pub fn take_frame_request() -> bool {
    FRAME_REQUESTED.swap(false, Ordering::Relaxed)
}
