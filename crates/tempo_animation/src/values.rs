//! Animatable value types
//!
//! Provides the [`Interpolate`] trait used by
//! [`Timeline::tween`](crate::Timeline::tween), with implementations for
//! scalars, 2D positions and RGBA colors.

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    ///
    /// `t` is eased progress and may leave `[0, 1]` for overshooting curves,
    /// in which case the result extrapolates.
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Position Implementation
// ============================================================================

/// A point in 2D space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Interpolate for Position {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Position::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.approx_eq(&other.x, epsilon) && self.y.approx_eq(&other.y, epsilon)
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

/// RGBA color with components in `[0, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Components clamped to `[0, 1]`
    pub fn clamped(self) -> Self {
        Self::rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }
}

impl Interpolate for Color {
    /// Interpolates per component; overshooting curves are clamped so the
    /// result stays a valid color
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::rgba(
            self.r.lerp(&other.r, t),
            self.g.lerp(&other.g, t),
            self.b.lerp(&other.b, t),
            self.a.lerp(&other.a, t),
        )
        .clamped()
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_lerp() {
        assert_eq!(0.0f32.lerp(&10.0, 0.25), 2.5);
        assert_eq!(4.0f32.lerp(&2.0, 1.0), 2.0);
        // Overshooting progress extrapolates
        assert!(0.0f32.lerp(&10.0, 1.1).approx_eq(&11.0, 1e-4));
    }

    #[test]
    fn test_position_lerp() {
        let from = Position::new(0.0, 0.0);
        let to = Position::new(350.0, 80.0);
        let mid = from.lerp(&to, 0.5);
        assert!(mid.approx_eq(&Position::new(175.0, 40.0), 1e-4));
    }

    #[test]
    fn test_color_lerp_clamps() {
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let green = Color::rgb(0.0, 1.0, 0.0);

        let mid = blue.lerp(&green, 0.5);
        assert!(mid.approx_eq(&Color::rgb(0.0, 0.5, 0.5), 1e-6));

        let past = blue.lerp(&green, 1.2);
        assert_eq!(past.g, 1.0);
        assert_eq!(past.b, 0.0);
    }
}
