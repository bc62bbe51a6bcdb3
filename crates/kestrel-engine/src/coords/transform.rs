use super::Vec2;

/// 2D affine transform: `x' = a·x + c·y + tx`, `y' = b·x + d·y + ty`.
///
/// Stored in f64 so that chains of camera conversions stay well inside the
/// tolerance callers compare against after the final cast back to f32.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    #[inline]
    pub const fn identity() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 }
    }

    #[inline]
    pub fn translation(by: Vec2) -> Self {
        Self { tx: by.x as f64, ty: by.y as f64, ..Self::identity() }
    }

    /// Uniform scale followed by rotation (radians).
    #[inline]
    pub fn scale_rotate(scale: f64, radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self { a: scale * c, b: scale * s, c: -scale * s, d: scale * c, tx: 0.0, ty: 0.0 }
    }

    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        let (x, y) = self.apply_f64(p.x as f64, p.y as f64);
        Vec2::new(x as f32, y as f32)
    }

    #[inline]
    pub fn apply_f64(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.tx, self.b * x + self.d * y + self.ty)
    }

    /// `self` first, then `next`.
    pub fn then(&self, next: &Transform2D) -> Transform2D {
        Transform2D {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            tx: next.a * self.tx + next.c * self.ty + next.tx,
            ty: next.b * self.tx + next.d * self.ty + next.ty,
        }
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns `None` for singular or non-finite transforms.
    pub fn inverse(&self) -> Option<Transform2D> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(Transform2D {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }

    /// Column layout consumed by the quad shader: `[a, b, c, d]`, `[tx, ty]`.
    #[inline]
    pub fn to_columns(&self) -> ([f32; 4], [f32; 2]) {
        (
            [self.a as f32, self.b as f32, self.c as f32, self.d as f32],
            [self.tx as f32, self.ty as f32],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn inverse_undoes_apply() {
        let t = Transform2D::scale_rotate(2.5, 0.7).then(&Transform2D::translation(Vec2::new(10.0, -4.0)));
        let inv = t.inverse().unwrap();
        let p = Vec2::new(13.0, 77.0);
        assert!(close(inv.apply(t.apply(p)), p));
    }

    #[test]
    fn then_applies_left_to_right() {
        let scale = Transform2D::scale_rotate(2.0, 0.0);
        let shift = Transform2D::translation(Vec2::new(1.0, 0.0));
        assert_eq!(scale.then(&shift).apply(Vec2::new(1.0, 1.0)), Vec2::new(3.0, 2.0));
        assert_eq!(shift.then(&scale).apply(Vec2::new(1.0, 1.0)), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(Transform2D::scale_rotate(0.0, 0.0).inverse().is_none());
    }
}
