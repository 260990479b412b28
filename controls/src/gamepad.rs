pub use gilrs::Gilrs;
use gilrs::{Axis, Button, Event, EventType};
use state::RawInput;
use tracing::trace;

/// Latest state of the pad, built up from the gilrs event stream.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Gamepad {
    pub rt2: f32,
    pub lt2: f32,
    pub lsx: f32,

    pub west: bool,
    pub south: bool,
    pub start: bool,
}

/// drain all pending events into `gamepad`
pub fn update_gamepad(gilrs: &mut Gilrs, gamepad: &mut Gamepad) {
    while let Some(Event { id, event, time }) = gilrs.next_event() {
        trace!(?time, %id, ?event, "gamepad event");
        match event {
            EventType::ButtonChanged(button, value, _code) => match button {
                Button::RightTrigger2 => gamepad.rt2 = value,
                Button::LeftTrigger2 => gamepad.lt2 = value,
                _ => {}
            },
            EventType::ButtonPressed(button, _code) => set_button(gamepad, button, true),
            EventType::ButtonReleased(button, _code) => set_button(gamepad, button, false),
            EventType::AxisChanged(Axis::LeftStickX, value, _code) => gamepad.lsx = value,
            _ => {}
        }
    }
}

fn set_button(gamepad: &mut Gamepad, button: Button, pressed: bool) {
    match button {
        Button::West => gamepad.west = pressed,
        Button::South => gamepad.south = pressed,
        Button::Start => gamepad.start = pressed,
        _ => {}
    }
}

/// right trigger drives, left trigger brakes, stick steers, west (or south) is the handbrake
pub fn raw_from_gamepad(gamepad: &Gamepad) -> RawInput {
    RawInput {
        steer: gamepad.lsx,
        throttle: gamepad.rt2,
        brake: gamepad.lt2,
        handbrake: gamepad.west || gamepad.south,
    }
}
