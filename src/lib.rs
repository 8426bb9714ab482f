pub mod bounce;
pub mod element_ref;
pub mod geometry;
pub mod input;
pub mod reactive;
pub mod scheduler;
pub mod screensaver;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use calloop::channel::{channel, Channel, Event as ChannelEvent, Sender};
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;

use geometry::Rect;
use input::Event;
use screensaver::Screensaver;

pub mod prelude {
    pub use crate::element_ref::{create_element_ref, ElementRef};
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::input::{Event, EventResponse};
    pub use crate::reactive::{
        batch, create_effect, create_signal, Effect, ReadSignal, Signal, WriteSignal,
    };
    pub use crate::screensaver::{screensaver, Screensaver};
    pub use crate::{App, AppConfig, EventSender};
}

pub struct AppConfig {
    /// Host surface width in logical units
    pub width: f32,
    /// Host surface height in logical units
    pub height: f32,
    /// Display-refresh stand-in: how often scheduled frames run
    pub frame_rate: u32,
    pub namespace: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            frame_rate: 60,
            namespace: "rimbalzo".to_string(),
        }
    }
}

/// A callback that gets called once per frame, before scheduled frame
/// callbacks run. Use this to process external events and update signals.
pub type UpdateCallback = Box<dyn FnMut()>;

/// The headless animation host: a calloop event loop pacing frames at the
/// configured refresh cadence, with a channel for injecting input events
/// from outside the loop.
pub struct App {
    config: AppConfig,
    on_update: Option<UpdateCallback>,
    event_tx: Sender<Event>,
    event_rx: Option<Channel<Event>>,
}

/// Cheap-to-clone handle for injecting events into a running host loop.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<Event>,
}

impl EventSender {
    /// Send an event to the loop. Silently dropped if the loop is gone.
    pub fn send(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}

static EXIT: AtomicBool = AtomicBool::new(false);

/// Ask the running host loop to stop after the current dispatch.
pub fn request_exit() {
    EXIT.store(true, Ordering::Relaxed);
    scheduler::request_frame();
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let (event_tx, event_rx) = channel();
        Self {
            config,
            on_update: None,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.config.height = height;
        self
    }

    pub fn frame_rate(mut self, frame_rate: u32) -> Self {
        self.config.frame_rate = frame_rate;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set a callback that gets called once per frame, before scheduled
    /// frame callbacks run.
    pub fn on_update<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// A handle for feeding pointer/visibility events into the loop.
    pub fn event_sender(&self) -> EventSender {
        EventSender {
            sender: self.event_tx.clone(),
        }
    }

    /// Run the host loop with `root` as the animated widget. Blocks until
    /// [`request_exit`] is called.
    pub fn run(mut self, root: Screensaver) {
        let _ = env_logger::try_init();
        EXIT.store(false, Ordering::Relaxed);

        let mut event_loop: EventLoop<()> =
            EventLoop::try_new().expect("failed to create event loop");
        let handle = event_loop.handle();

        let (ping, ping_source) = calloop::ping::make_ping().expect("failed to create wakeup ping");
        scheduler::init_wakeup(ping);
        handle
            .insert_source(ping_source, |_, _, _| {})
            .expect("failed to register wakeup source");

        let events = self.event_rx.take().expect("event channel already taken");
        {
            let root = root.clone();
            handle
                .insert_source(events, move |event, _, _| {
                    if let ChannelEvent::Msg(input) = event {
                        root.handle_event(&input);
                    }
                })
                .expect("failed to register event channel");
        }

        let frame_interval = Duration::from_secs_f64(1.0 / f64::from(self.config.frame_rate.max(1)));
        {
            let mut on_update = self.on_update.take();
            handle
                .insert_source(Timer::from_duration(frame_interval), move |_, _, _| {
                    if let Some(callback) = on_update.as_mut() {
                        callback();
                    }
                    if scheduler::take_frame_request() {
                        scheduler::run_scheduled_frames();
                    }
                    TimeoutAction::ToDuration(frame_interval)
                })
                .expect("failed to register frame timer");
        }

        log::info!(
            "{}: host loop running at {} fps ({}x{} logical)",
            self.config.namespace,
            self.config.frame_rate,
            self.config.width,
            self.config.height
        );

        root.mount();

        // The widget fills the host surface unless something already
        // attached container geometry (the widget's own sizing included).
        if !root.container_ref().is_attached() {
            root.container_ref()
                .set_bounds(Rect::new(0.0, 0.0, self.config.width, self.config.height));
        }

        let signal = event_loop.get_signal();
        event_loop
            .run(None, &mut (), move |_| {
                if EXIT.load(Ordering::Relaxed) {
                    signal.stop();
                }
            })
            .expect("event loop failed");

        root.unmount();
        log::info!("{}: host loop stopped", self.config.namespace);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
