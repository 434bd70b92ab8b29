//! 三维点（位置，齐次坐标 w = 1）

use std::ops::{Add, AddAssign, Sub};

use glam::DVec3;

use super::Vector3d;

/// 三维点
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// p + v * s
    pub fn offset_from(p: Point3d, v: Vector3d, s: f64) -> Self {
        p + v * s
    }

    pub fn distance_to(self, other: Point3d) -> f64 {
        (other - self).length()
    }

    /// 从原点指向此点的向量
    pub fn to_vector(self) -> Vector3d {
        Vector3d::new(self.x, self.y, self.z)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add<Vector3d> for Point3d {
    type Output = Point3d;
    fn add(self, rhs: Vector3d) -> Point3d {
        Point3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign<Vector3d> for Point3d {
    fn add_assign(&mut self, rhs: Vector3d) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

/// 点减点得到向量
impl Sub for Point3d {
    type Output = Vector3d;
    fn sub(self, rhs: Point3d) -> Vector3d {
        Vector3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub<Vector3d> for Point3d {
    type Output = Point3d;
    fn sub(self, rhs: Vector3d) -> Point3d {
        Point3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<DVec3> for Point3d {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Point3d> for DVec3 {
    fn from(p: Point3d) -> Self {
        DVec3::new(p.x, p.y, p.z)
    }
}
