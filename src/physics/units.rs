//! Unit value types.
//!
//! Each type stores its quantity in one canonical unit and only exposes named
//! constructors and accessors, so callers never touch the raw representation.
//! Arithmetic works directly on the canonical values. Note that `*` and `/`
//! between two values of the same type multiply the canonical magnitudes and
//! keep the type: `Distance * Distance` is a `Distance` holding an area
//! magnitude in centimeters. Callers rely on that, so it stays.
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;
use std::ops::{Div, Mul};

use derive_more::{Add, AddAssign, Neg, Sub, SubAssign, Sum};

/// Meters in one kilometer.
const METERS_PER_KILOMETER: f32 = 1000.0;

/// Centimeters in one meter.
const CENTIMETERS_PER_METER: f32 = 100.0;

/// Grams in one kilogram.
pub const GRAMS_PER_KILOGRAM: f32 = 1000.0;

/// A length, stored in centimeters.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, PartialOrd, Add, Sub, Neg, AddAssign, SubAssign, Sum,
)]
pub struct Distance {
    /// The canonical value.
    centimeters: f32,
}

impl Distance {
    /// A distance of zero.
    pub const ZERO: Distance = Distance { centimeters: 0.0 };

    /// Creates a new distance from meters.
    pub fn from_meters(meters: f32) -> Self {
        Distance {
            centimeters: meters * CENTIMETERS_PER_METER,
        }
    }

    /// Creates a new distance from kilometers.
    pub fn from_kilometers(kilometers: f32) -> Self {
        Self::from_meters(kilometers * METERS_PER_KILOMETER)
    }

    /// Creates a new distance from centimeters.
    pub const fn from_centimeters(centimeters: f32) -> Self {
        Distance { centimeters }
    }

    /// This distance in kilometers.
    pub fn kilometers(&self) -> f32 {
        self.meters() / METERS_PER_KILOMETER
    }

    /// This distance in meters.
    pub fn meters(&self) -> f32 {
        self.centimeters / CENTIMETERS_PER_METER
    }

    /// This distance in centimeters.
    pub fn centimeters(&self) -> f32 {
        self.centimeters
    }
}

impl Mul for Distance {
    type Output = Distance;

    fn mul(self, rhs: Distance) -> Distance {
        Distance::from_centimeters(self.centimeters * rhs.centimeters)
    }
}

impl Div for Distance {
    type Output = Distance;

    fn div(self, rhs: Distance) -> Distance {
        Distance::from_centimeters(self.centimeters / rhs.centimeters)
    }
}

impl Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} cm", self.centimeters)
    }
}

/// A mass, stored in grams.
///
/// Nothing stops a mass from going negative, see
/// [`GravitySource::validate`](crate::physics::gravity::source::GravitySource::validate).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, PartialOrd, Add, Sub, Neg, AddAssign, SubAssign, Sum,
)]
pub struct Mass {
    /// The canonical value.
    grams: f32,
}

impl Mass {
    /// A mass of zero.
    pub const ZERO: Mass = Mass { grams: 0.0 };

    /// Creates a new mass from grams.
    pub const fn from_grams(grams: f32) -> Self {
        Mass { grams }
    }

    /// Creates a new mass from kilograms.
    pub fn from_kilograms(kilograms: f32) -> Self {
        Mass {
            grams: kilograms * GRAMS_PER_KILOGRAM,
        }
    }

    /// This mass in kilograms.
    pub fn kilograms(&self) -> f32 {
        self.grams / GRAMS_PER_KILOGRAM
    }

    /// This mass in grams.
    pub fn grams(&self) -> f32 {
        self.grams
    }
}

impl Mul for Mass {
    type Output = Mass;

    fn mul(self, rhs: Mass) -> Mass {
        Mass::from_grams(self.grams * rhs.grams)
    }
}

impl Div for Mass {
    type Output = Mass;

    fn div(self, rhs: Mass) -> Mass {
        Mass::from_grams(self.grams / rhs.grams)
    }
}

impl Display for Mass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} g", self.grams)
    }
}
