//! Polling provider built on `device_query`.
//!
//! Samples the pointer at a fixed interval and turns state differences into
//! raw messages. Works wherever `device_query` does (X11, macOS, Windows).

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use device_query::{DeviceQuery, DeviceState, MouseState};

use super::event::Button;
use super::pump::PumpedDevice;
use super::translator::{EventTranslator, MessageKind, RawMessage};
use super::{DeviceProvider, RawDevice};
use crate::config;
use crate::error::{MouseResult, OptionExt, ResultExt};

/// `device_query` button slots (index 0 is unused).
const POLLED_BUTTONS: [(usize, Button); 3] =
    [(1, Button::Left), (2, Button::Right), (3, Button::Middle)];

/// Provider that polls pointer state on a background thread.
#[derive(Debug, Clone)]
pub struct PollingProvider {
    pub interval: Duration,
    pub double_click_time_ms: u64,
    pub full_move_resolution: bool,
}

impl Default for PollingProvider {
    fn default() -> Self {
        let config = config::mouse::get_mouse_config();
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            double_click_time_ms: config.double_click_time_ms,
            full_move_resolution: config.full_move_resolution,
        }
    }
}

impl DeviceProvider for PollingProvider {
    fn acquire_device(self) -> MouseResult<Box<dyn RawDevice>> {
        // DeviceState is not Send on every platform, so it lives on the poll
        // thread and the first sample comes back over the ready channel.
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<MouseResult<MouseState>>(1);
        let (msg_tx, msg_rx) = crossbeam_channel::bounded::<Sender<RawMessage>>(1);
        let interval = self.interval;

        thread::Builder::new()
            .name("mouse-poll".to_string())
            .spawn(move || {
                let device_state = match DeviceState::checked_new()
                    .context("pointer state cannot be queried on this host")
                {
                    Ok(device_state) => device_state,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let initial = device_state.get_mouse();
                if ready_tx.send(Ok(initial.clone())).is_err() {
                    return;
                }
                let Ok(sender) = msg_rx.recv() else {
                    return;
                };
                poll_loop(device_state, initial, interval, sender);
            })
            .context("failed to start poller")?;

        let initial = ready_rx.recv().context("poller exited before reporting")??;

        let mut translator = EventTranslator::new(
            initial.coords.0,
            initial.coords.1,
            self.double_click_time_ms,
        );
        translator.set_full_move_resolution(self.full_move_resolution);

        let (device, sender) = PumpedDevice::spawn(translator)?;
        msg_tx.send(sender).context("poller exited")?;

        log::info!(
            "[MOUSE] Polling provider started at ({}, {}), every {:?}",
            initial.coords.0,
            initial.coords.1,
            interval
        );
        Ok(Box::new(device))
    }
}

/// Raw messages describing the change from `prev` to `next`.
///
/// The move comes first so a button change sampled together with it is
/// reported at the new position.
pub fn diff_states(prev: &MouseState, next: &MouseState, time_ms: u64) -> Vec<RawMessage> {
    let (x, y) = next.coords;
    let mut messages = Vec::new();

    if next.coords != prev.coords {
        messages.push(RawMessage::new(MessageKind::Move, x, y, time_ms));
    }

    for (slot, button) in POLLED_BUTTONS {
        let was = prev.button_pressed.get(slot).copied().unwrap_or(false);
        let is = next.button_pressed.get(slot).copied().unwrap_or(false);
        if was == is {
            continue;
        }
        if let Some(kind) = MessageKind::for_button(button, is) {
            messages.push(RawMessage::new(kind, x, y, time_ms));
        }
    }

    messages
}

fn poll_loop(
    device_state: DeviceState,
    mut last: MouseState,
    interval: Duration,
    sender: Sender<RawMessage>,
) {
    let start = Instant::now();
    loop {
        thread::sleep(interval);

        let state = device_state.get_mouse();
        let time_ms = start.elapsed().as_millis() as u64;
        for message in diff_states(&last, &state, time_ms) {
            if sender.send(message).is_err() {
                log::debug!("[MOUSE] Poller stopped, dispatcher gone");
                return;
            }
        }
        last = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(x: i32, y: i32, left: bool, right: bool, middle: bool) -> MouseState {
        MouseState {
            coords: (x, y),
            button_pressed: vec![false, left, right, middle],
        }
    }

    #[test]
    fn test_no_change_no_messages() {
        let s = state(1, 1, false, false, false);
        assert!(diff_states(&s, &s, 0).is_empty());
    }

    #[test]
    fn test_move_only() {
        let messages = diff_states(
            &state(1, 1, false, false, false),
            &state(4, 2, false, false, false),
            16,
        );
        assert_eq!(messages, vec![RawMessage::new(MessageKind::Move, 4, 2, 16)]);
    }

    #[test]
    fn test_button_transitions() {
        let messages = diff_states(
            &state(0, 0, true, false, false),
            &state(0, 0, false, true, true),
            32,
        );
        let kinds: Vec<_> = messages.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![MessageKind::LeftUp, MessageKind::RightDown, MessageKind::MiddleDown]
        );
    }

    #[test]
    fn test_short_button_vector_is_tolerated() {
        let prev = MouseState {
            coords: (0, 0),
            button_pressed: vec![],
        };
        let messages = diff_states(&prev, &state(0, 0, true, false, false), 0);
        assert_eq!(messages, vec![RawMessage::new(MessageKind::LeftDown, 0, 0, 0)]);
    }

    #[test]
    fn test_default_reads_config() {
        let provider = PollingProvider::default();
        assert!(provider.interval >= Duration::from_millis(1));
        assert!(provider.double_click_time_ms >= 50);
    }
}
