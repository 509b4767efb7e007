//! Player movement system.
//!
//! Absolute directions on the offset hex grid, relative turns, and the
//! per-player mapping that translates one into the other. The six
//! displacement functions below are the only place neighbour arithmetic is
//! written; everything else goes through them.

use serde::{Serialize, Deserialize};

use crate::game::types::Position;

pub fn upper_left(position: Position) -> Position {
    Position::new(
        position.row - 1,
        if position.is_even_row() { position.column } else { position.column - 1 },
    )
}

pub fn upper_right(position: Position) -> Position {
    Position::new(
        position.row - 1,
        if position.is_even_row() { position.column + 1 } else { position.column },
    )
}

pub fn right(position: Position) -> Position {
    Position::new(position.row, position.column + 1)
}

pub fn lower_right(position: Position) -> Position {
    Position::new(
        position.row + 1,
        if position.is_even_row() { position.column + 1 } else { position.column },
    )
}

pub fn lower_left(position: Position) -> Position {
    Position::new(
        position.row + 1,
        if position.is_even_row() { position.column } else { position.column - 1 },
    )
}

pub fn left(position: Position) -> Position {
    Position::new(position.row, position.column - 1)
}

/// Indexed by `AbsoluteDisplacement as usize`.
pub const DISPLACEMENT_FUNCTIONS: [fn(Position) -> Position; 6] = [
    upper_left,
    upper_right,
    right,
    lower_right,
    lower_left,
    left,
];

/// One of the six fixed directions, numbered clockwise from upper-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbsoluteDisplacement {
    UpperLeft = 0,
    UpperRight = 1,
    Right = 2,
    LowerRight = 3,
    LowerLeft = 4,
    Left = 5,
}

impl AbsoluteDisplacement {
    pub const ALL: [AbsoluteDisplacement; 6] = [
        AbsoluteDisplacement::UpperLeft,
        AbsoluteDisplacement::UpperRight,
        AbsoluteDisplacement::Right,
        AbsoluteDisplacement::LowerRight,
        AbsoluteDisplacement::LowerLeft,
        AbsoluteDisplacement::Left,
    ];

    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(6) as usize]
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    /// Rotate clockwise by `steps` sixths of a turn (negative = counter-clockwise).
    pub fn rotate(self, steps: i32) -> Self {
        Self::from_index(self.index() + steps)
    }

    pub fn invert(self) -> Self {
        self.rotate(3)
    }

    /// Neighbouring position in this direction.
    pub fn apply(self, position: Position) -> Position {
        DISPLACEMENT_FUNCTIONS[self as usize](position)
    }

    /// Direction leading from `from` to the adjacent `to`, if they are neighbours.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| direction.apply(from) == to)
    }
}

/// Heading at the start of a round: players on the left edge face right, everyone else left.
pub fn initial_heading(start: Position) -> AbsoluteDisplacement {
    if start.column == 1 {
        AbsoluteDisplacement::Right
    } else {
        AbsoluteDisplacement::Left
    }
}

/// A turn relative to the current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelativeDisplacement {
    HeavyLeft,
    LightLeft,
    KeepGoing,
    LightRight,
    HeavyRight,
}

impl RelativeDisplacement {
    pub const ALL: [RelativeDisplacement; 5] = [
        RelativeDisplacement::HeavyLeft,
        RelativeDisplacement::LightLeft,
        RelativeDisplacement::KeepGoing,
        RelativeDisplacement::LightRight,
        RelativeDisplacement::HeavyRight,
    ];

    /// Rotation applied to the heading, in sixths of a turn.
    pub fn offset(self) -> i32 {
        match self {
            RelativeDisplacement::HeavyLeft => -2,
            RelativeDisplacement::LightLeft => -1,
            RelativeDisplacement::KeepGoing => 0,
            RelativeDisplacement::LightRight => 1,
            RelativeDisplacement::HeavyRight => 2,
        }
    }

    pub fn invert(self) -> Self {
        match self {
            RelativeDisplacement::HeavyLeft => RelativeDisplacement::HeavyRight,
            RelativeDisplacement::LightLeft => RelativeDisplacement::LightRight,
            RelativeDisplacement::KeepGoing => RelativeDisplacement::KeepGoing,
            RelativeDisplacement::LightRight => RelativeDisplacement::LightLeft,
            RelativeDisplacement::HeavyRight => RelativeDisplacement::HeavyLeft,
        }
    }

    /// Turn that takes a mover heading `heading` towards `target`.
    /// Reversing is not a turn, so the opposite direction yields `None`.
    pub fn between(heading: AbsoluteDisplacement, target: AbsoluteDisplacement) -> Option<Self> {
        let steps = (target.index() - heading.index()).rem_euclid(6);
        Self::ALL
            .into_iter()
            .find(|relative| relative.offset().rem_euclid(6) == steps)
    }
}

/// What a player answers on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Displacement {
    Absolute(AbsoluteDisplacement),
    Relative(RelativeDisplacement),
}

impl Displacement {
    pub fn invert(self) -> Self {
        match self {
            Displacement::Absolute(direction) => Displacement::Absolute(direction.invert()),
            Displacement::Relative(turn) => Displacement::Relative(turn.invert()),
        }
    }
}

impl Default for Displacement {
    fn default() -> Self {
        Displacement::Relative(RelativeDisplacement::KeepGoing)
    }
}

/// Relative label -> absolute direction, for one player's current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementMapping {
    directions: [AbsoluteDisplacement; 5],
}

impl Default for MovementMapping {
    /// Heading right.
    fn default() -> Self {
        Self {
            directions: [
                AbsoluteDisplacement::UpperLeft,
                AbsoluteDisplacement::UpperRight,
                AbsoluteDisplacement::Right,
                AbsoluteDisplacement::LowerRight,
                AbsoluteDisplacement::LowerLeft,
            ],
        }
    }
}

impl MovementMapping {
    /// Mapping whose `KeepGoing` points at `heading`.
    pub fn facing(heading: AbsoluteDisplacement) -> Self {
        let mut mapping = Self::default();
        mapping.turn_towards(heading);
        mapping
    }

    fn slot(turn: RelativeDisplacement) -> usize {
        (turn.offset() + 2) as usize
    }

    pub fn resolve(&self, turn: RelativeDisplacement) -> AbsoluteDisplacement {
        self.directions[Self::slot(turn)]
    }

    pub fn heading(&self) -> AbsoluteDisplacement {
        self.resolve(RelativeDisplacement::KeepGoing)
    }

    /// Rotate every entry by `diff` sixths of a turn.
    pub fn remap(&mut self, diff: i32) {
        for direction in self.directions.iter_mut() {
            *direction = direction.rotate(diff);
        }
    }

    /// Make `direction` the new `KeepGoing`.
    pub fn turn_towards(&mut self, direction: AbsoluteDisplacement) {
        let diff = direction.index() - self.heading().index();
        self.remap(diff);
    }
}
