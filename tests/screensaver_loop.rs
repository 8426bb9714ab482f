//! Drives the screensaver through manual frames, standing in for the host
//! loop, and checks the animation behavior end to end.

use std::cell::RefCell;
use std::rc::Rc;

use rimbalzo::prelude::*;
use rimbalzo::scheduler;

fn run_frames(count: usize) {
    for _ in 0..count {
        scheduler::take_frame_request();
        scheduler::run_scheduled_frames();
    }
}

fn fixed_saver(seed: u64) -> Screensaver {
    let saver = screensaver().speed(17.0).seed(seed);
    saver
        .container_ref()
        .set_bounds(Rect::new(0.0, 0.0, 300.0, 200.0));
    saver
        .element_ref()
        .set_bounds(Rect::new(0.0, 0.0, 40.0, 40.0));
    saver
}

#[test]
fn test_bounces_stay_in_bounds() {
    let impacts = Rc::new(RefCell::new(Vec::new()));
    let sink = impacts.clone();
    let saver = fixed_saver(5).on_impact(move |count| sink.borrow_mut().push(count));
    saver.mount();

    let offset = saver.offset();
    let mut last_count = 0;
    for _ in 0..400 {
        run_frames(1);
        let p = offset.get();
        assert!((0.0..=260.0).contains(&p.x), "x out of range: {}", p.x);
        assert!((0.0..=160.0).contains(&p.y), "y out of range: {}", p.y);
        let count = saver.impact_count().get();
        assert!(count >= last_count);
        last_count = count;
    }

    // The callback saw every change, strictly increasing, and its last
    // total matches the published signal.
    let log = impacts.borrow();
    assert!(!log.is_empty());
    assert!(log.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*log.last().unwrap(), last_count);
}

#[test]
fn test_resize_clamps_on_next_tick() {
    let saver = fixed_saver(9);
    saver.mount();
    run_frames(50);

    // Shrink the container below the current position; the very next tick
    // clamps back inside the new bound without any resubscription.
    saver
        .container_ref()
        .set_bounds(Rect::new(0.0, 0.0, 60.0, 60.0));
    run_frames(1);
    let p = saver.offset().get();
    assert!(p.x <= 20.0, "x not clamped: {}", p.x);
    assert!(p.y <= 20.0, "y not clamped: {}", p.y);
}

#[test]
fn test_freeze_on_hover_pauses_and_resumes() {
    let saver = screensaver().speed(10.0).seed(3).freeze_on_hover(true);
    saver
        .container_ref()
        .set_bounds(Rect::new(0.0, 0.0, 500.0, 400.0));
    saver
        .element_ref()
        .set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
    saver.mount();
    run_frames(5);

    let p = saver.offset().get();
    saver.handle_event(&Event::PointerEnter {
        x: p.x + 1.0,
        y: p.y + 1.0,
    });
    assert!(saver.hovered().get());

    run_frames(10);
    assert_eq!(saver.offset().get(), p);

    saver.handle_event(&Event::PointerLeave);
    assert!(!saver.hovered().get());
    run_frames(1);
    assert_ne!(saver.offset().get(), p);
}

#[test]
fn test_hidden_surface_freezes_the_loop() {
    let saver = fixed_saver(11);
    saver.mount();
    run_frames(3);

    saver.handle_event(&Event::VisibilityChanged { visible: false });
    let parked = saver.offset().get();
    run_frames(10);
    assert_eq!(saver.offset().get(), parked);
    assert!(!scheduler::has_scheduled_frames());

    saver.handle_event(&Event::VisibilityChanged { visible: true });
    run_frames(1);
    assert_ne!(saver.offset().get(), parked);
}

#[test]
fn test_unmount_stops_and_remount_restarts() {
    let saver = fixed_saver(13);
    saver.mount();
    run_frames(3);
    saver.unmount();
    assert!(!scheduler::has_scheduled_frames());

    let parked = saver.offset().get();
    run_frames(5);
    assert_eq!(saver.offset().get(), parked);

    // A fresh mount starts a fresh animation.
    saver.mount();
    assert!(scheduler::has_scheduled_frames());
    assert_eq!(saver.impact_count().get(), 0);
    run_frames(1);
    let p = saver.offset().get();
    assert!((0.0..=260.0).contains(&p.x));
    assert!((0.0..=160.0).contains(&p.y));
}

#[test]
fn test_reactive_consumers_see_impacts() {
    let saver = fixed_saver(21);
    saver.mount();

    let impacts = saver.impact_count();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _observer = create_effect(move || {
        sink.borrow_mut().push(impacts.get());
    });

    run_frames(300);
    let log = seen.borrow();
    assert!(log.len() > 1, "effect never re-ran");
    assert!(log.windows(2).all(|w| w[0] <= w[1]));
}
