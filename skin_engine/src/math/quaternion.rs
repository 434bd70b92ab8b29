//! 四元数
//!
//! 表示三维旋转时必须是单位四元数。乘法 `q1 * q2` 表示先旋转 q2 再旋转 q1。

use std::ops::{Add, AddAssign, Mul, MulAssign};

use glam::DQuat;

use super::{Matrix4x4, Vector3d, EPSILON};

/// 四元数 (s, v)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub s: f64,
    pub v: Vector3d,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        s: 1.0,
        v: Vector3d::ZERO,
    };

    pub const fn new(s: f64, v: Vector3d) -> Self {
        Self { s, v }
    }

    /// 绕 axis 旋转 angle 弧度
    ///
    /// axis 必须已经单位化，此处不检查；结果会重新单位化。
    pub fn from_axis_angle(angle: f64, axis: Vector3d) -> Self {
        let half = angle * 0.5;
        Self::new(half.cos(), axis * half.sin()).to_unit()
    }

    pub fn conjugate(self) -> Self {
        Self::new(self.s, -self.v)
    }

    /// q * q^-1 = 单位元
    pub fn inverse(self) -> Self {
        let len = self.length();
        self.conjugate() * (1.0 / (len * len))
    }

    pub fn length(self) -> f64 {
        (self.s * self.s + self.v.dot(self.v)).sqrt()
    }

    pub fn dot(self, other: Self) -> f64 {
        self.s * other.s + self.v.dot(other.v)
    }

    pub fn to_unit(self) -> Self {
        self * (1.0 / self.length())
    }

    /// 用当前（单位）四元数旋转向量：q * (0, u) * q'
    pub fn rotate(&self, u: Vector3d) -> Vector3d {
        let t = u * self.s + self.v.cross(u);
        self.v * u.dot(self.v) + t * self.s + self.v.cross(t)
    }

    /// 逆旋转：q' * (0, u) * q
    pub fn inverse_rotate(&self, u: Vector3d) -> Vector3d {
        let t = u * self.s + u.cross(self.v);
        self.v * u.dot(self.v) + t * self.s + t.cross(self.v)
    }

    /// 归一化线性插值，t 限制在 [0, 1]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        (self * (1.0 - t) + other * t).to_unit()
    }

    /// 球面线性插值
    ///
    /// 点积为负时取 -other，保证走最短路径；夹角接近 0 时退化为归一化线性插值。
    pub fn slerp(self, other: Self, t: f64) -> Self {
        let mut other = other;
        let mut dot = self.dot(other);
        if dot < 0.0 {
            other = Self::new(-other.s, -other.v);
            dot = -dot;
        }

        let t = t.clamp(0.0, 1.0);
        let dot = dot.min(1.0);
        let sin_theta = (1.0 - dot * dot).max(0.0).sqrt();
        if sin_theta < EPSILON {
            return self.lerp(other, t);
        }

        let theta = dot.acos();
        (self * (theta * (1.0 - t)).sin() + other * (theta * t).sin()) * (1.0 / sin_theta)
    }

    /// 等价的旋转矩阵
    #[rustfmt::skip]
    pub fn to_rotation_matrix(&self) -> Matrix4x4 {
        let (w, x, y, z) = (self.s, self.v.x, self.v.y, self.v.z);
        Matrix4x4::from_values([
            1.0 - 2.0 * y * y - 2.0 * z * z, 2.0 * x * y - 2.0 * w * z, 2.0 * x * z + 2.0 * w * y, 0.0,
            2.0 * x * y + 2.0 * w * z, 1.0 - 2.0 * x * x - 2.0 * z * z, 2.0 * y * z - 2.0 * w * x, 0.0,
            2.0 * x * z - 2.0 * w * y, 2.0 * y * z + 2.0 * w * x, 1.0 - 2.0 * x * x - 2.0 * y * y, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self::new(
            self.s * other.s - self.v.dot(other.v),
            other.v * self.s + self.v * other.s + self.v.cross(other.v),
        )
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.s * scalar, self.v * scalar)
    }
}

impl Add for Quaternion {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.s + other.s, self.v + other.v)
    }
}

impl AddAssign for Quaternion {
    fn add_assign(&mut self, other: Self) {
        self.s += other.s;
        self.v += other.v;
    }
}

impl From<DQuat> for Quaternion {
    fn from(q: DQuat) -> Self {
        Self::new(q.w, Vector3d::new(q.x, q.y, q.z))
    }
}

impl From<Quaternion> for DQuat {
    fn from(q: Quaternion) -> Self {
        DQuat::from_xyzw(q.v.x, q.v.y, q.v.z, q.s)
    }
}
