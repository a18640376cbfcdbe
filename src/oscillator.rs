//! Ping-pong oscillator used for every animated scalar.
//!
//! The value climbs by `step` until it reaches the ceiling, then falls by
//! `step` until it reaches the floor, and so on. It is clamped at each bound,
//! so it never leaves `[floor, ceiling]`.

/// Current travel direction of an [`Oscillator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Oscillator {
    value: u16,
    direction: Direction,
    floor: u16,
    ceiling: u16,
    step: u16,
}

impl Oscillator {
    /// Create an oscillator starting at `value` (clamped) heading up.
    pub const fn new(value: u16, floor: u16, ceiling: u16, step: u16) -> Self {
        let value = if value < floor {
            floor
        } else if value > ceiling {
            ceiling
        } else {
            value
        };
        Self {
            value,
            direction: Direction::Up,
            floor,
            ceiling,
            step,
        }
    }

    /// Advance one step and return the new value.
    pub fn tick(&mut self) -> u16 {
        match self.direction {
            Direction::Up => {
                self.value = self.value.saturating_add(self.step);
                if self.value >= self.ceiling {
                    self.value = self.ceiling;
                    self.direction = Direction::Down;
                }
            }
            Direction::Down => {
                self.value = self.value.saturating_sub(self.step);
                if self.value <= self.floor {
                    self.value = self.floor;
                    self.direction = Direction::Up;
                }
            }
        }
        self.value
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Jump to `value` (clamped into bounds); direction is kept.
    pub fn set_value(&mut self, value: u16) {
        self.value = value.clamp(self.floor, self.ceiling);
    }

    /// Change the step size, e.g. when the blink speed changes.
    pub fn set_step(&mut self, step: u16) {
        self.step = step;
    }

    /// Return to the floor, heading up.
    pub fn reset(&mut self) {
        self.value = self.floor;
        self.direction = Direction::Up;
    }
}
