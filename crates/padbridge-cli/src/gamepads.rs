//! Local gamepad handling on top of gilrs.
//!
//! Drains the gilrs event queue each frame to keep slot assignments
//! current, then snapshots every assigned pad into the exchange's state
//! array. Slots are sticky: a pad keeps its player number until it
//! disconnects.

use anyhow::{Result, anyhow};
use gilrs::{Axis, Button, Gamepad, GamepadId, Gilrs, PowerInfo};
use tracing::{debug, info};

use padbridge_core::protocol::layout::MAX_GAMEPADS;
use padbridge_core::{DeviceState, GamepadButtons, GamepadFlags, RumbleCommand, Slots};

use crate::haptics::RumbleDriver;

pub struct GamepadRegistry {
    gilrs: Gilrs,
    slots: Slots<GamepadId>,
}

impl GamepadRegistry {
    pub fn new() -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow!("gamepad backend init failed: {e}"))?;
        let mut slots = Slots::new();
        // Pads already plugged in at startup never produce a Connected
        // event, so seed them here.
        for (id, pad) in gilrs.gamepads() {
            if slots.assign(id).is_some() {
                info!("gamepad attached: {} ({id})", pad.name());
            }
        }
        Ok(Self { gilrs, slots })
    }

    /// Drain pending events, updating slot assignments. Returns the
    /// slot indexes freed by disconnects this pass so the caller can
    /// stop any rumble still playing on them.
    pub fn pump(&mut self) -> Vec<usize> {
        let mut freed = Vec::new();
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                gilrs::EventType::Connected => {
                    if let Some(index) = self.slots.assign(event.id) {
                        let name = self.gilrs.gamepad(event.id).name().to_owned();
                        info!("gamepad attached: {name} (slot {index})");
                    }
                }
                gilrs::EventType::Disconnected => {
                    if let Some(index) = self.slots.release(event.id) {
                        info!("gamepad detached (slot {index})");
                        freed.push(index);
                    }
                }
                other => debug!("gamepad event: {other:?}"),
            }
        }
        freed
    }

    /// Forget all slot assignments and reseed from the pads currently
    /// attached. Runs on connection teardown so a fresh runtime starts
    /// from a clean numbering.
    pub fn reset(&mut self) {
        self.slots.clear();
        let ids: Vec<_> = self.gilrs.gamepads().map(|(id, _)| id).collect();
        for id in ids {
            self.slots.assign(id);
        }
    }

    /// Snapshot every assigned pad for one exchange frame.
    pub fn states(&self) -> [Option<DeviceState>; MAX_GAMEPADS] {
        let mut states = [None; MAX_GAMEPADS];
        for (index, id) in self.slots.iter() {
            states[index] = Some(snapshot(&self.gilrs.gamepad(id)));
        }
        states
    }

    /// Route the frame's rumble commands to the pads occupying each
    /// slot.
    pub fn drive_rumble(
        &mut self,
        driver: &mut RumbleDriver,
        commands: &[Option<RumbleCommand>; MAX_GAMEPADS],
    ) {
        for (index, command) in commands.iter().enumerate() {
            match (self.slots.get(index), command) {
                (Some(id), Some(command)) => {
                    driver.apply(&mut self.gilrs, index, id, *command);
                }
                _ => driver.stop(index),
            }
        }
    }
}

fn snapshot(pad: &Gamepad<'_>) -> DeviceState {
    let mut flags = GamepadFlags::CONNECTED;
    // gilrs's standard mapping always routes a guide button when the
    // pad has one.
    flags |= GamepadFlags::HAS_GUIDE_BUTTON;
    if pad.is_ff_supported() {
        flags |= GamepadFlags::HAS_RUMBLE;
    }

    let battery = match pad.power_info() {
        PowerInfo::Discharging(level) => {
            flags |= GamepadFlags::HAS_BATTERY;
            f32::from(level) / 100.0
        }
        PowerInfo::Charging(level) => {
            flags |= GamepadFlags::HAS_BATTERY | GamepadFlags::CHARGING;
            f32::from(level) / 100.0
        }
        PowerInfo::Charged => {
            flags |= GamepadFlags::HAS_BATTERY;
            1.0
        }
        PowerInfo::Wired | PowerInfo::Unknown => 0.0,
    };

    DeviceState {
        flags,
        buttons: buttons(pad),
        battery,
        left_trigger: trigger(pad, Button::LeftTrigger2),
        right_trigger: trigger(pad, Button::RightTrigger2),
        left_stick_x: pad.value(Axis::LeftStickX),
        // gilrs reports sticks up-positive; device state carries the
        // raw HID convention.
        left_stick_y: -pad.value(Axis::LeftStickY),
        right_stick_x: pad.value(Axis::RightStickX),
        right_stick_y: -pad.value(Axis::RightStickY),
    }
}

fn buttons(pad: &Gamepad<'_>) -> GamepadButtons {
    // South/East/West/North are the positional names for A/B/X/Y.
    let mapping = [
        (Button::DPadUp, GamepadButtons::DPAD_UP),
        (Button::DPadDown, GamepadButtons::DPAD_DOWN),
        (Button::DPadLeft, GamepadButtons::DPAD_LEFT),
        (Button::DPadRight, GamepadButtons::DPAD_RIGHT),
        (Button::Start, GamepadButtons::START),
        (Button::Select, GamepadButtons::BACK),
        (Button::LeftThumb, GamepadButtons::LEFT_STICK),
        (Button::RightThumb, GamepadButtons::RIGHT_STICK),
        (Button::LeftTrigger, GamepadButtons::LEFT_BUMPER),
        (Button::RightTrigger, GamepadButtons::RIGHT_BUMPER),
        (Button::Mode, GamepadButtons::GUIDE),
        (Button::South, GamepadButtons::A),
        (Button::East, GamepadButtons::B),
        (Button::West, GamepadButtons::X),
        (Button::North, GamepadButtons::Y),
    ];
    let mut buttons = GamepadButtons::empty();
    for (button, flag) in mapping {
        if pad.is_pressed(button) {
            buttons |= flag;
        }
    }
    buttons
}

fn trigger(pad: &Gamepad<'_>, button: Button) -> f32 {
    pad.button_data(button).map_or(0.0, |data| data.value())
}
