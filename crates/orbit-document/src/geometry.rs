// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Affine transforms in PDF row-vector convention: [a b c d e f].

/// A 2D affine transform `[a b c d e f]`, applied as `[x y 1] × M`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counter-clockwise rotation by `degrees`.
    pub fn rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// `self` applied first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Transform a displacement, ignoring translation.
    pub fn apply_vector(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.a + y * self.c, x * self.b + y * self.d)
    }

    /// Length of the transformed unit y-vector; approximates glyph height for
    /// a text rendering matrix.
    pub fn vertical_extent(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Length of the transformed unit x-vector.
    pub fn horizontal_extent(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// From a six-element operand list.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4
    }

    #[test]
    fn then_applies_left_to_right() {
        let m = Matrix::scale(2.0, 2.0).then(&Matrix::translate(10.0, 5.0));
        assert!(close(m.apply(1.0, 1.0), (12.0, 7.0)));

        let n = Matrix::translate(10.0, 5.0).then(&Matrix::scale(2.0, 2.0));
        assert!(close(n.apply(1.0, 1.0), (22.0, 12.0)));
    }

    #[test]
    fn rotation_is_counter_clockwise() {
        assert!(close(Matrix::rotate(90.0).apply(1.0, 0.0), (0.0, 1.0)));
    }

    #[test]
    fn extents_track_scale() {
        let m = Matrix::new(12.0, 0.0, 0.0, 14.0, 3.0, 4.0);
        assert_eq!(m.horizontal_extent(), 12.0);
        assert_eq!(m.vertical_extent(), 14.0);
    }
}
