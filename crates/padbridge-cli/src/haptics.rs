//! Rumble playback via gilrs force feedback.
//!
//! The remote side rewrites its command bytes every frame, so effects
//! are cached per slot and only rebuilt when the commanded intensities
//! actually change. Dropping an effect stops it.

use gilrs::GamepadId;
use gilrs::Gilrs;
use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder};
use tracing::{debug, warn};

use padbridge_core::RumbleCommand;
use padbridge_core::protocol::layout::MAX_GAMEPADS;

struct ActiveEffect {
    effect: Effect,
    command: RumbleCommand,
}

/// Per-slot cache of the currently playing effect.
#[derive(Default)]
pub struct RumbleDriver {
    active: [Option<ActiveEffect>; MAX_GAMEPADS],
    enabled: bool,
}

impl RumbleDriver {
    pub fn new(enabled: bool) -> Self {
        Self {
            active: Default::default(),
            enabled,
        }
    }

    /// Bring the pad in `slot` to the commanded intensities.
    pub fn apply(&mut self, gilrs: &mut Gilrs, slot: usize, target: GamepadId, command: RumbleCommand) {
        if !self.enabled {
            return;
        }
        if command.is_idle() {
            self.stop(slot);
            return;
        }
        if let Some(active) = &self.active[slot] {
            if active.command == command {
                return;
            }
        }
        // Dropping the previous effect stops it before the replacement
        // starts.
        self.active[slot] = None;
        match build_effect(gilrs, target, command) {
            Ok(effect) => {
                debug!(
                    "rumble slot {slot}: lo {:.2} hi {:.2}",
                    command.lo_freq, command.hi_freq
                );
                self.active[slot] = Some(ActiveEffect { effect, command });
            }
            Err(err) => warn!("rumble failed on slot {slot}: {err}"),
        }
    }

    /// Stop whatever is playing in `slot`.
    pub fn stop(&mut self, slot: usize) {
        self.active[slot] = None;
    }

    pub fn stop_all(&mut self) {
        self.active = Default::default();
    }
}

fn build_effect(
    gilrs: &mut Gilrs,
    target: GamepadId,
    command: RumbleCommand,
) -> Result<Effect, gilrs::ff::Error> {
    let effect = EffectBuilder::new()
        .add_effect(BaseEffect {
            kind: BaseEffectType::Strong {
                magnitude: magnitude(command.lo_freq),
            },
            ..Default::default()
        })
        .add_effect(BaseEffect {
            kind: BaseEffectType::Weak {
                magnitude: magnitude(command.hi_freq),
            },
            ..Default::default()
        })
        .gamepads(&[target])
        .finish(gilrs)?;
    effect.play()?;
    Ok(effect)
}

fn magnitude(intensity: f32) -> u16 {
    (intensity.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_spans_full_range() {
        assert_eq!(magnitude(0.0), 0);
        assert_eq!(magnitude(1.0), u16::MAX);
        assert_eq!(magnitude(2.0), u16::MAX);
        assert!(magnitude(0.5) > u16::MAX / 2 - 2);
    }
}
