//! Pointer events delivered by the shell.

use kurbo::Point;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Pointer event in surface-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: PointerButton,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
    /// The pointer left the drawing surface.
    Leave,
}

impl PointerEvent {
    /// Position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => Some(*position),
            PointerEvent::Leave => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let down = PointerEvent::Down {
            position: Point::new(1.0, 2.0),
            button: PointerButton::Primary,
        };
        assert_eq!(down.position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(PointerEvent::Leave.position(), None);
    }
}
