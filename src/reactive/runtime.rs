use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());
}

pub type SignalId = usize;
pub type EffectId = usize;

/// Bookkeeping for one registered effect. The slot is emptied (not removed)
/// on disposal so effect ids stay stable.
struct EffectSlot {
    callback: Box<dyn FnMut()>,
    dependencies: HashSet<SignalId>,
}

/// Thread-local reactive graph: which effects read which signals, and which
/// effects are pending a re-run after a write.
#[derive(Default)]
pub struct Runtime {
    current_effect: Option<EffectId>,
    pending_effects: HashSet<EffectId>,
    effects: Vec<Option<EffectSlot>>,
    signal_subscribers: Vec<HashSet<EffectId>>,
    next_signal_id: SignalId,
    batch_depth: usize,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_signal(&mut self) -> SignalId {
        let id = self.next_signal_id;
        self.next_signal_id += 1;
        self.signal_subscribers.push(HashSet::new());
        id
    }

    pub fn allocate_effect(&mut self, callback: Box<dyn FnMut()>) -> EffectId {
        let id = self.effects.len();
        self.effects.push(Some(EffectSlot {
            callback,
            dependencies: HashSet::new(),
        }));
        id
    }

    /// Record that the currently running effect (if any) read `signal_id`.
    pub fn track_read(&mut self, signal_id: SignalId) {
        // The signal may belong to another thread's runtime; ignore it then.
        if signal_id >= self.signal_subscribers.len() {
            return;
        }

        if let Some(effect_id) = self.current_effect {
            self.signal_subscribers[signal_id].insert(effect_id);
            if let Some(slot) = self.effects[effect_id].as_mut() {
                slot.dependencies.insert(signal_id);
            }
        }
    }

    fn queue_subscribers(&mut self, signal_id: SignalId) {
        if signal_id >= self.signal_subscribers.len() {
            return;
        }
        let subscribers: Vec<_> = self.signal_subscribers[signal_id].iter().copied().collect();
        self.pending_effects.extend(subscribers);
    }

    pub fn dispose_effect(&mut self, effect_id: EffectId) {
        if let Some(slot) = self.effects[effect_id].take() {
            for signal_id in slot.dependencies {
                if signal_id < self.signal_subscribers.len() {
                    self.signal_subscribers[signal_id].remove(&effect_id);
                }
            }
        }
        self.pending_effects.remove(&effect_id);
    }
}

pub fn with_runtime<F, R>(f: F) -> R
where
    F: FnOnce(&mut Runtime) -> R,
{
    RUNTIME.with(|rt| f(&mut rt.borrow_mut()))
}

/// Try to access the runtime. Safe to call from any thread: on the owning
/// thread it runs the callback, elsewhere it does nothing.
pub fn try_with_runtime<F>(f: F)
where
    F: FnOnce(&mut Runtime),
{
    RUNTIME.with(|rt| {
        if let Ok(mut runtime) = rt.try_borrow_mut() {
            f(&mut runtime);
        }
    });
}

/// Run one effect with dependency tracking.
///
/// The callback is lifted out of the runtime before it is invoked, so that
/// signal reads and writes inside the effect can re-borrow the runtime
/// (tracking would otherwise be skipped silently).
pub fn run_effect(effect_id: EffectId) {
    let (callback, prev_effect) = with_runtime(|rt| {
        // Dependencies are rebuilt from scratch on every run.
        if let Some(slot) = rt.effects[effect_id].as_mut() {
            let old_deps = std::mem::take(&mut slot.dependencies);
            for signal_id in old_deps {
                rt.signal_subscribers[signal_id].remove(&effect_id);
            }
        }
        let prev = rt.current_effect;
        rt.current_effect = Some(effect_id);
        let callback = rt.effects[effect_id]
            .as_mut()
            .map(|slot| std::mem::replace(&mut slot.callback, Box::new(|| {})));
        (callback, prev)
    });

    if let Some(mut callback) = callback {
        callback();
        with_runtime(|rt| {
            if let Some(slot) = rt.effects[effect_id].as_mut() {
                slot.callback = callback;
            }
        });
    }

    with_runtime(|rt| rt.current_effect = prev_effect);
}

/// Run pending effects until none are queued. Effects triggered by effects
/// run in the same flush.
pub fn flush_effects() {
    loop {
        let pending: Vec<EffectId> = with_runtime(|rt| rt.pending_effects.drain().collect());
        if pending.is_empty() {
            break;
        }
        for effect_id in pending {
            run_effect(effect_id);
        }
    }
}

/// Called by signals after a value change: queue subscribers, then flush
/// unless a batch is open. No-op when called off the owning thread.
pub(crate) fn signal_written(signal_id: SignalId) {
    let mut flush = false;
    try_with_runtime(|rt| {
        rt.queue_subscribers(signal_id);
        flush = rt.batch_depth == 0;
    });
    if flush {
        flush_effects();
    }
}

/// Defer effect execution until the end of the closure, so several signal
/// writes settle as a single flush.
pub fn batch<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    with_runtime(|rt| rt.batch_depth += 1);
    let result = f();
    let flush = with_runtime(|rt| {
        rt.batch_depth -= 1;
        rt.batch_depth == 0
    });
    if flush {
        flush_effects();
    }
    result
}
