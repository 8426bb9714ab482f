//! Headless bouncing demo: drifts a 120x60 "logo" inside the host surface,
//! logging its position and every impact. Exits after a dozen bounces.
//!
//! Run with `RUST_LOG=debug` to see per-tick positions.

use rimbalzo::prelude::*;

fn main() {
    let saver = screensaver()
        .speed(4.0)
        .seed(7)
        .on_impact(|count| log::info!("impact #{count}"));

    // Stand-in for the host's layout pass: the logo measures 120x60. The
    // container fills the host surface.
    saver
        .element_ref()
        .set_bounds(Rect::new(0.0, 0.0, 120.0, 60.0));

    let offset = saver.offset();
    let _position_log = create_effect(move || {
        let p = offset.get();
        log::debug!("logo at ({:.1}, {:.1})", p.x, p.y);
    });

    let impacts = saver.impact_count();
    let app = App::new().width(640.0).height(360.0).on_update(move || {
        if impacts.get_untracked() >= 12 {
            rimbalzo::request_exit();
        }
    });
    app.run(saver);
}
