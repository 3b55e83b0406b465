//! Mouse event types delivered to listeners.
//!
//! Numeric values follow the DOM `MouseEvent` conventions so payloads can be
//! handed to web frontends unchanged.

use serde::{Deserialize, Serialize};

/// Button whose state changed (DOM `button`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Button {
    /// No button involved. Reported as 0, like the left button.
    #[default]
    None,
    Left,
    Middle,
    Right,
}

impl Button {
    pub fn code(self) -> u8 {
        match self {
            Button::None | Button::Left => 0,
            Button::Middle => 1,
            Button::Right => 2,
        }
    }

    /// Bit of this button in [`ButtonMask`].
    pub fn mask(self) -> ButtonMask {
        match self {
            Button::None => ButtonMask::NONE,
            Button::Left => ButtonMask::LEFT,
            Button::Middle => ButtonMask::MIDDLE,
            Button::Right => ButtonMask::RIGHT,
        }
    }

    /// Legacy `which` value of this button.
    pub fn which(self) -> Which {
        match self {
            Button::None => Which::None,
            Button::Left => Which::Left,
            Button::Middle => Which::Middle,
            Button::Right => Which::Right,
        }
    }
}

impl Serialize for Button {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

/// Set of buttons currently held (DOM `buttons`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonMask(pub u8);

impl ButtonMask {
    pub const NONE: ButtonMask = ButtonMask(0x00);
    pub const LEFT: ButtonMask = ButtonMask(0x01);
    pub const RIGHT: ButtonMask = ButtonMask(0x02);
    pub const MIDDLE: ButtonMask = ButtonMask(0x04);

    pub fn contains(self, other: ButtonMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ButtonMask) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ButtonMask) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Legacy 1-based button index (`which`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Which {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

impl Which {
    pub fn code(self) -> u8 {
        match self {
            Which::None => 0,
            Which::Left => 1,
            Which::Middle => 2,
            Which::Right => 3,
        }
    }
}

impl Serialize for Which {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

/// Kinds a single translated event can carry at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Click,
    DblClick,
    Down,
    Move,
    Up,
}

impl MouseEventKind {
    /// Dispatch order used when an event carries several kinds.
    pub const ALL: [MouseEventKind; 5] = [
        MouseEventKind::Click,
        MouseEventKind::DblClick,
        MouseEventKind::Down,
        MouseEventKind::Move,
        MouseEventKind::Up,
    ];

    /// Event name listeners subscribe to.
    pub fn as_str(self) -> &'static str {
        match self {
            MouseEventKind::Click => "click",
            MouseEventKind::DblClick => "dblclick",
            MouseEventKind::Down => "down",
            MouseEventKind::Move => "move",
            MouseEventKind::Up => "up",
        }
    }

    fn bit(self) -> u8 {
        match self {
            MouseEventKind::Click => 0x01,
            MouseEventKind::DblClick => 0x02,
            MouseEventKind::Down => 0x04,
            MouseEventKind::Move => 0x08,
            MouseEventKind::Up => 0x10,
        }
    }
}

impl std::fmt::Display for MouseEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flag set of [`MouseEventKind`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventKinds(u8);

impl EventKinds {
    pub const NONE: EventKinds = EventKinds(0);

    pub fn only(kind: MouseEventKind) -> Self {
        Self(kind.bit())
    }

    pub fn insert(&mut self, kind: MouseEventKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(self, kind: MouseEventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True if `Move` is the only kind set.
    pub fn is_move_only(self) -> bool {
        self.0 == MouseEventKind::Move.bit()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Contained kinds in dispatch order.
    pub fn iter(self) -> impl Iterator<Item = MouseEventKind> {
        MouseEventKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

/// A translated pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseEvent {
    pub button: Button,
    pub buttons: ButtonMask,
    pub movement_x: i32,
    pub movement_y: i32,
    pub screen_x: i32,
    pub screen_y: i32,
    pub which: Which,
    #[serde(skip)]
    pub kinds: EventKinds,
}

impl MouseEvent {
    /// Event at a resting position with nothing pressed.
    pub fn at(screen_x: i32, screen_y: i32) -> Self {
        Self {
            screen_x,
            screen_y,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(Button::None.code(), 0);
        assert_eq!(Button::Left.code(), 0);
        assert_eq!(Button::Middle.code(), 1);
        assert_eq!(Button::Right.code(), 2);

        assert_eq!(Button::Middle.mask(), ButtonMask::MIDDLE);
        assert_eq!(Button::Right.which().code(), 3);
    }

    #[test]
    fn test_button_mask_ops() {
        let mut mask = ButtonMask::NONE;
        mask.insert(ButtonMask::LEFT);
        mask.insert(ButtonMask::MIDDLE);
        assert_eq!(mask.0, 0x05);
        assert!(mask.contains(ButtonMask::LEFT));

        mask.remove(ButtonMask::LEFT);
        assert!(!mask.contains(ButtonMask::LEFT));
        assert!(!mask.is_empty());
    }

    #[test]
    fn test_kinds_iterate_in_dispatch_order() {
        let mut kinds = EventKinds::only(MouseEventKind::Up);
        kinds.insert(MouseEventKind::Click);

        let names: Vec<_> = kinds.iter().map(MouseEventKind::as_str).collect();
        assert_eq!(names, vec!["click", "up"]);
        assert!(!kinds.is_move_only());
        assert!(EventKinds::only(MouseEventKind::Move).is_move_only());
    }

    #[test]
    fn test_event_json_shape() {
        let event = MouseEvent {
            button: Button::Right,
            buttons: ButtonMask::RIGHT,
            movement_x: -3,
            movement_y: 4,
            screen_x: 100,
            screen_y: 200,
            which: Which::Right,
            kinds: EventKinds::only(MouseEventKind::Down),
        };

        let json = serde_json::to_value(event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "button": 2,
                "buttons": 2,
                "movementX": -3,
                "movementY": 4,
                "screenX": 100,
                "screenY": 200,
                "which": 3
            })
        );
    }
}
