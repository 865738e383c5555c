//! Physical constants used by the gravity model.

/// The Newtonian constant of gravitation $G$ in SI units $m^3 / (kg \cdot s^2)$
pub const GRAVITATIONAL_CONSTANT: f32 = 6.67408E-11;

/// One G of acceleration in $m / s^2$, used to express surface gravity in Gs.
pub const STANDARD_GRAVITY: f32 = 9.8;

/// Earth's gravity in $m / s^2$, the default ambient scene gravity.
pub const EARTH_GRAVITY: f32 = 9.81;
