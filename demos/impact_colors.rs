//! Impact-driven decoration: cycles the logo color on every bounce, and
//! freezes the animation while a (synthetic) pointer hovers the logo.

use rimbalzo::prelude::*;

const PALETTE: &[u32] = &[
    0xff0000, 0xff8000, 0xffff00, 0x80ff00, 0x00ff40, 0x00ffbf, 0x00bfff, 0x0040ff, 0x8000ff,
    0xff00bf,
];

fn main() {
    let saver = screensaver()
        .speed(6.0)
        .seed(42)
        .freeze_on_hover(true)
        .on_hover(|hovered| {
            if hovered {
                log::info!("* frozen");
            } else {
                log::info!("* resumed");
            }
        });
    saver
        .element_ref()
        .set_bounds(Rect::new(0.0, 0.0, 90.0, 45.0));

    let impacts = saver.impact_count();
    let _palette_cycle = create_effect(move || {
        let count = impacts.get();
        let color = PALETTE[count as usize % PALETTE.len()];
        log::info!("impact {count}: logo color #{color:06x}");
    });

    let app = App::new().width(800.0).height(450.0);
    let events = app.event_sender();
    let offset = saver.offset();
    let mut frame = 0u32;
    let app = app.on_update(move || {
        frame += 1;
        // Hover the logo for a second, mid-run.
        if frame == 120 {
            let p = offset.get_untracked();
            events.send(Event::PointerEnter {
                x: p.x + 1.0,
                y: p.y + 1.0,
            });
        }
        if frame == 180 {
            events.send(Event::PointerLeave);
        }
        if frame == 600 {
            rimbalzo::request_exit();
        }
    });
    app.run(saver);
}
