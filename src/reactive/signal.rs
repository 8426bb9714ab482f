use std::sync::{Arc, RwLock};

use super::runtime::{signal_written, try_with_runtime, with_runtime, SignalId};
use crate::scheduler::request_frame;

struct SignalInner<T> {
    id: SignalId,
    value: RwLock<T>,
}

/// A reactive value cell.
///
/// Signals are the primitive the observable widget state (`hovered`,
/// `impact_count`, the element offset) is built from. Reading a signal inside
/// an effect subscribes the effect; writing a changed value re-runs the
/// subscribers and raises the host frame-request flag so the next frame gets
/// scheduled.
///
/// Values live behind `Arc<RwLock>` and may be read or written from any
/// thread; effect notification only happens on the thread owning the
/// reactive runtime, other writers simply skip it.
#[derive(Clone)]
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        let id = with_runtime(|rt| rt.allocate_signal());
        Self {
            inner: Arc::new(SignalInner {
                id,
                value: RwLock::new(value),
            }),
        }
    }

    /// A read-only handle sharing this signal's value.
    pub fn reader(&self) -> ReadSignal<T> {
        ReadSignal {
            inner: self.inner.clone(),
        }
    }

    /// Split into read-only and write-only handles.
    pub fn split(self) -> (ReadSignal<T>, WriteSignal<T>) {
        (
            ReadSignal {
                inner: self.inner.clone(),
            },
            WriteSignal { inner: self.inner },
        )
    }

    /// Borrow the value through a closure, subscribing the current effect.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        try_with_runtime(|rt| rt.track_read(self.inner.id));
        f(&self.inner.value.read().expect("signal lock poisoned"))
    }

    /// Borrow the value without subscribing.
    pub fn with_untracked<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.value.read().expect("signal lock poisoned"))
    }
}

impl<T: Clone> Signal<T> {
    pub fn get(&self) -> T {
        try_with_runtime(|rt| rt.track_read(self.inner.id));
        self.inner
            .value
            .read()
            .expect("signal lock poisoned")
            .clone()
    }

    pub fn get_untracked(&self) -> T {
        self.inner
            .value
            .read()
            .expect("signal lock poisoned")
            .clone()
    }
}

impl<T: PartialEq> Signal<T> {
    /// Set the value; subscribers run only if the value actually changed.
    pub fn set(&self, value: T) {
        let Ok(mut guard) = self.inner.value.write() else {
            return; // poisoned, skip the update silently
        };
        if *guard != value {
            *guard = value;
            drop(guard);
            signal_written(self.inner.id);
            request_frame();
        }
    }
}

impl<T: PartialEq + Clone> Signal<T> {
    /// Update in place through a closure; subscribers run only on change.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let Ok(mut guard) = self.inner.value.write() else {
            return; // poisoned, skip the update silently
        };
        let old_value = guard.clone();
        f(&mut guard);
        if *guard != old_value {
            drop(guard);
            signal_written(self.inner.id);
            request_frame();
        }
    }
}

/// Read-only handle to a signal.
#[derive(Clone)]
pub struct ReadSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T: Clone> ReadSignal<T> {
    pub fn get(&self) -> T {
        try_with_runtime(|rt| rt.track_read(self.inner.id));
        self.inner
            .value
            .read()
            .expect("signal lock poisoned")
            .clone()
    }

    pub fn get_untracked(&self) -> T {
        self.inner
            .value
            .read()
            .expect("signal lock poisoned")
            .clone()
    }
}

impl<T> ReadSignal<T> {
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        try_with_runtime(|rt| rt.track_read(self.inner.id));
        f(&self.inner.value.read().expect("signal lock poisoned"))
    }
}

/// Write-only handle to a signal.
#[derive(Clone)]
pub struct WriteSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T: PartialEq> WriteSignal<T> {
    pub fn set(&self, value: T) {
        let Ok(mut guard) = self.inner.value.write() else {
            return;
        };
        if *guard != value {
            *guard = value;
            drop(guard);
            signal_written(self.inner.id);
            request_frame();
        }
    }
}

pub fn create_signal<T>(value: T) -> Signal<T> {
    Signal::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::create_effect;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_create_signal_and_get() {
        let signal = create_signal(42);
        assert_eq!(signal.get(), 42);
    }

    #[test]
    fn test_set_updates_value() {
        let signal = create_signal(10);
        signal.set(20);
        assert_eq!(signal.get(), 20);
    }

    #[test]
    fn test_update_with_closure() {
        let signal = create_signal(5);
        signal.update(|v| *v += 10);
        assert_eq!(signal.get(), 15);
    }

    #[test]
    fn test_with_for_borrowing() {
        let signal = create_signal(String::from("hello"));
        let length = signal.with(|s| s.len());
        assert_eq!(length, 5);
    }

    #[test]
    fn test_reader_shares_value() {
        let signal = create_signal(7);
        let reader = signal.reader();
        assert_eq!(reader.get(), 7);
        signal.set(14);
        assert_eq!(reader.get(), 14);
    }

    #[test]
    fn test_split_into_read_write_handles() {
        let signal = create_signal(7);
        let (read, write) = signal.split();

        assert_eq!(read.get(), 7);
        write.set(14);
        assert_eq!(read.get(), 14);
    }

    #[test]
    fn test_clone_shares_underlying_value() {
        let signal1 = create_signal(50);
        let signal2 = signal1.clone();

        signal1.set(75);
        assert_eq!(signal2.get(), 75);

        signal2.set(100);
        assert_eq!(signal1.get(), 100);
    }

    #[test]
    fn test_set_only_triggers_on_change() {
        let signal = create_signal(5);
        let runs = Rc::new(Cell::new(0));

        let effect_runs = runs.clone();
        let tracked = signal.clone();
        let _effect = create_effect(move || {
            tracked.get();
            effect_runs.set(effect_runs.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        signal.set(5); // no actual change
        assert_eq!(runs.get(), 1);

        signal.set(10);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_effect_tracks_dependency() {
        let signal = create_signal(1);
        let seen = Rc::new(Cell::new(0));

        let effect_seen = seen.clone();
        let tracked = signal.clone();
        let _effect = create_effect(move || {
            effect_seen.set(tracked.get());
        });
        assert_eq!(seen.get(), 1);

        signal.set(9);
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn test_batch_flushes_once() {
        let a = create_signal(0);
        let b = create_signal(0);
        let runs = Rc::new(Cell::new(0));

        let effect_runs = runs.clone();
        let (ra, rb) = (a.clone(), b.clone());
        let _effect = create_effect(move || {
            ra.get();
            rb.get();
            effect_runs.set(effect_runs.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        crate::reactive::batch(|| {
            a.set(1);
            b.set(2);
        });
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_get_untracked() {
        let signal = create_signal(100);
        assert_eq!(signal.get_untracked(), 100);
    }
}
