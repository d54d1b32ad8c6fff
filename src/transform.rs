use std::ops::Mul;

use crate::geometry::Point;

/// A 2D affine transform stored as the six coefficients `[a, b, c, d, tx, ty]`.
///
/// Maps a point with
/// ```text
/// x' = a * x + c * y + tx
/// y' = b * x + d * y + ty
/// ```
/// which is the layout a canvas-style `setTransform(a, b, c, d, e, f)` expects,
/// so the coefficients can be handed to a [`Surface`](crate::surface::Surface)
/// unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform2D {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Create an identity transform
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create a translation transform
    pub fn translate(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Create a rotation transform (radians, clockwise in y-down space)
    pub fn rotate(angle_radians: f32) -> Self {
        let (sin, cos) = angle_radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Create a non-uniform scale transform
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Build a node's local transform: scale, then rotate, then translate.
    ///
    /// Equivalent to `translate(x, y).then(&rotate(r)).then(&scale(sx, sy))`
    /// but computed directly so the coefficients are exactly
    /// `[cos*sx, sin*sx, -sin*sy, cos*sy, x, y]`.
    pub fn from_components(x: f32, y: f32, rotation: f32, sx: f32, sy: f32) -> Self {
        if rotation == 0.0 {
            return Self::new(sx, 0.0, 0.0, sy, x, y);
        }
        let (sin, cos) = rotation.sin_cos();
        Self::new(cos * sx, sin * sx, -sin * sy, cos * sy, x, y)
    }

    /// Compose this transform with another: `self * other`.
    /// Applies `other` first, then `self`.
    pub fn then(&self, other: &Transform2D) -> Transform2D {
        Transform2D {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// Map a world transform into screen space: scale every coefficient by the
    /// display scale, then offset by the screen-space origin.
    pub fn to_screen(&self, scale: f32, origin_x: f32, origin_y: f32) -> Transform2D {
        Transform2D {
            a: self.a * scale,
            b: self.b * scale,
            c: self.c * scale,
            d: self.d * scale,
            tx: self.tx * scale + origin_x,
            ty: self.ty * scale + origin_y,
        }
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Compute the inverse of this transform, or `None` when it is degenerate.
    pub fn inverse(&self) -> Option<Transform2D> {
        let det = self.determinant();
        if det.abs() < 1e-10 {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Transform2D {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            tx: (self.c * self.ty - self.d * self.tx) * inv_det,
            ty: (self.b * self.tx - self.a * self.ty) * inv_det,
        })
    }

    /// Transform a 2D point by this matrix
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Transform a point back through this matrix. Degenerate transforms
    /// return the point unchanged.
    pub fn inverse_transform_point(&self, p: Point) -> Point {
        match self.inverse() {
            Some(inv) => inv.transform_point(p),
            None => p,
        }
    }

    pub fn translation(&self) -> Point {
        Point::new(self.tx, self.ty)
    }

    pub fn to_array(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    /// Check if this is the identity transform
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform2D {
    type Output = Transform2D;

    fn mul(self, rhs: Transform2D) -> Transform2D {
        self.then(&rhs)
    }
}
