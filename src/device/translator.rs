//! Raw device messages to [`MouseEvent`]s.
//!
//! Providers push low-level messages (button transitions and absolute
//! positions). The translator keeps the pointer state between them and derives
//! button masks, movement deltas, click and double-click detection.
//!
//! Without full move resolution, a burst of moves inside one batch collapses
//! into a single event whose movement is the sum of the burst. The collapsed
//! move is flushed before any non-move event and at the end of the batch.

use super::event::{Button, EventKinds, MouseEvent, MouseEventKind, Which};

/// Kind of low-level message a provider observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    LeftDown,
    LeftUp,
    MiddleDown,
    MiddleUp,
    RightDown,
    RightUp,
    Move,
}

impl MessageKind {
    /// Button transition carried by this message, if any (`true` = pressed).
    fn button_transition(self) -> Option<(Button, bool)> {
        match self {
            MessageKind::LeftDown => Some((Button::Left, true)),
            MessageKind::LeftUp => Some((Button::Left, false)),
            MessageKind::MiddleDown => Some((Button::Middle, true)),
            MessageKind::MiddleUp => Some((Button::Middle, false)),
            MessageKind::RightDown => Some((Button::Right, true)),
            MessageKind::RightUp => Some((Button::Right, false)),
            MessageKind::Move => None,
        }
    }

    /// Message for a button press or release.
    pub fn for_button(button: Button, pressed: bool) -> Option<Self> {
        match (button, pressed) {
            (Button::Left, true) => Some(MessageKind::LeftDown),
            (Button::Left, false) => Some(MessageKind::LeftUp),
            (Button::Middle, true) => Some(MessageKind::MiddleDown),
            (Button::Middle, false) => Some(MessageKind::MiddleUp),
            (Button::Right, true) => Some(MessageKind::RightDown),
            (Button::Right, false) => Some(MessageKind::RightUp),
            (Button::None, _) => None,
        }
    }
}

/// A message with the absolute pointer position and a millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage {
    pub kind: MessageKind,
    pub x: i32,
    pub y: i32,
    pub time_ms: u64,
}

impl RawMessage {
    pub fn new(kind: MessageKind, x: i32, y: i32, time_ms: u64) -> Self {
        Self { kind, x, y, time_ms }
    }
}

/// Stateful message-to-event translator.
#[derive(Debug, Clone)]
pub struct EventTranslator {
    last_event: MouseEvent,
    last_click_which: Which,
    last_click_time: u64,
    pending_move: bool,
    full_move_resolution: bool,
    double_click_time_ms: u64,
}

impl EventTranslator {
    pub fn new(initial_x: i32, initial_y: i32, double_click_time_ms: u64) -> Self {
        Self {
            last_event: MouseEvent::at(initial_x, initial_y),
            last_click_which: Which::None,
            last_click_time: 0,
            pending_move: false,
            full_move_resolution: false,
            double_click_time_ms,
        }
    }

    pub fn full_move_resolution(&self) -> bool {
        self.full_move_resolution
    }

    pub fn set_full_move_resolution(&mut self, value: bool) {
        self.full_move_resolution = value;
    }

    pub fn set_double_click_time_ms(&mut self, value: u64) {
        self.double_click_time_ms = value;
    }

    /// Most recent translated state, emitted or not.
    pub fn last_event(&self) -> MouseEvent {
        self.last_event
    }

    /// Translate one batch of messages, handing finished events to `sink`.
    pub fn translate_batch<I, F>(&mut self, messages: I, mut sink: F)
    where
        I: IntoIterator<Item = RawMessage>,
        F: FnMut(MouseEvent),
    {
        let mut messages = messages.into_iter().peekable();
        while let Some(message) = messages.next() {
            let is_last = messages.peek().is_none();
            self.translate(message, is_last, &mut sink);
        }
    }

    fn translate<F>(&mut self, message: RawMessage, is_last: bool, sink: &mut F)
    where
        F: FnMut(MouseEvent),
    {
        let coalescing = !self.full_move_resolution;
        let mut event = MouseEvent {
            buttons: self.last_event.buttons,
            screen_x: message.x,
            screen_y: message.y,
            ..Default::default()
        };

        match message.kind.button_transition() {
            Some((button, pressed)) => {
                event.button = button;
                event.which = button.which();

                if pressed {
                    event.buttons.insert(button.mask());
                    event.kinds = EventKinds::only(MouseEventKind::Down);
                } else {
                    event.buttons.remove(button.mask());
                    event.kinds = EventKinds::only(MouseEventKind::Up);

                    let elapsed = message.time_ms.saturating_sub(self.last_click_time);
                    if self.last_click_which == event.which && elapsed <= self.double_click_time_ms
                    {
                        self.last_click_which = Which::None;
                        self.last_click_time = 0;
                        event.kinds.insert(MouseEventKind::DblClick);
                    } else {
                        self.last_click_which = event.which;
                        self.last_click_time = message.time_ms;
                        event.kinds.insert(MouseEventKind::Click);
                    }
                }
            }
            None => {
                event.movement_x = message.x.saturating_sub(self.last_event.screen_x);
                event.movement_y = message.y.saturating_sub(self.last_event.screen_y);
                event.kinds = EventKinds::only(MouseEventKind::Move);

                if coalescing && self.pending_move {
                    event.movement_x = event.movement_x.saturating_add(self.last_event.movement_x);
                    event.movement_y = event.movement_y.saturating_add(self.last_event.movement_y);
                }

                self.last_click_which = Which::None;
                self.last_click_time = 0;
            }
        }

        if self.pending_move && (!coalescing || !event.kinds.is_move_only()) {
            sink(self.last_event);
            self.pending_move = false;
        }

        self.last_event = event;

        if !coalescing || !event.kinds.is_move_only() || is_last {
            sink(event);
            self.pending_move = false;
        } else {
            self.pending_move = true;
        }
    }
}
