//! 4x4 变换矩阵
//!
//! 内部按行主序存储（`data[row * 4 + col]`），与图形 API 交换时使用列主序。

use std::ops::Mul;

use glam::{DMat4, Mat4};

use super::{Point3d, Quaternion, Vector3d};

/// 行列式绝对值低于此值视为奇异矩阵
const SINGULAR_EPSILON: f64 = 1e-12;

/// 4x4 变换矩阵
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4x4 {
    data: [f64; 16],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4x4 {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// 从行主序数据创建
    pub const fn from_values(values: [f64; 16]) -> Self {
        Self { data: values }
    }

    /// 从列主序数据（OpenGL 布局）创建
    pub fn from_ogl_values(values: &[f64; 16]) -> Self {
        let mut data = [0.0; 16];
        for i in 0..4 {
            for j in 0..4 {
                data[i * 4 + j] = values[j * 4 + i];
            }
        }
        Self { data }
    }

    /// 行主序数据
    pub fn to_values(&self) -> [f64; 16] {
        self.data
    }

    /// 列主序数据（OpenGL 布局）
    pub fn to_ogl_values(&self) -> [f64; 16] {
        let mut values = [0.0; 16];
        for i in 0..4 {
            for j in 0..4 {
                values[j * 4 + i] = self.data[i * 4 + j];
            }
        }
        values
    }

    /// 单精度列主序矩阵，供渲染端上传
    pub fn to_gpu_matrix(&self) -> Mat4 {
        DMat4::from(*self).as_mat4()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * 4 + col]
    }

    pub fn from_translation(t: Vector3d) -> Self {
        let mut m = Self::IDENTITY;
        m.set_translation(t);
        m
    }

    /// 绕单位轴 axis 旋转 angle 弧度（Rodrigues 公式）
    ///
    /// axis 未单位化时得到的不是刚体变换，此处不检查。
    #[rustfmt::skip]
    pub fn from_axis_angle(angle: f64, axis: Vector3d) -> Self {
        let (ax, ay, az) = (axis.x, axis.y, axis.z);
        let c = angle.cos();
        let s = angle.sin();
        let k = 1.0 - c;
        Self::from_values([
            c + k * ax * ax, k * ax * ay - s * az, k * ax * az + s * ay, 0.0,
            k * ax * ay + s * az, c + k * ay * ay, k * ay * az - s * ax, 0.0,
            k * ax * az - s * ay, k * ay * az + s * ax, c + k * az * az, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// 先旋转后平移
    pub fn from_rotation_translation(rotation: Quaternion, translation: Vector3d) -> Self {
        let mut m = rotation.to_rotation_matrix();
        m.set_translation(translation);
        m
    }

    /// 变换点：完整 4x4 乘法后除以齐次 w
    pub fn transform_point(&self, p: Point3d) -> Point3d {
        let d = &self.data;
        let x = d[0] * p.x + d[1] * p.y + d[2] * p.z + d[3];
        let y = d[4] * p.x + d[5] * p.y + d[6] * p.z + d[7];
        let z = d[8] * p.x + d[9] * p.y + d[10] * p.z + d[11];
        let w = d[12] * p.x + d[13] * p.y + d[14] * p.z + d[15];
        Point3d::new(x / w, y / w, z / w)
    }

    /// 变换向量：w = 0，不受平移影响
    pub fn transform_vector(&self, v: Vector3d) -> Vector3d {
        let d = &self.data;
        Vector3d::new(
            d[0] * v.x + d[1] * v.y + d[2] * v.z,
            d[4] * v.x + d[5] * v.y + d[6] * v.z,
            d[8] * v.x + d[9] * v.y + d[10] * v.z,
        )
    }

    /// 局部坐标系原点在全局坐标系中的位置
    pub fn translation(&self) -> Vector3d {
        Vector3d::new(self.data[3], self.data[7], self.data[11])
    }

    /// 平移向量在局部坐标中的表示：R^T * t
    pub fn local_coord_translation(&self) -> Vector3d {
        let d = &self.data;
        let t = self.translation();
        Vector3d::new(
            d[0] * t.x + d[4] * t.y + d[8] * t.z,
            d[1] * t.x + d[5] * t.y + d[9] * t.z,
            d[2] * t.x + d[6] * t.y + d[10] * t.z,
        )
    }

    pub fn set_translation(&mut self, t: Vector3d) {
        self.data[3] = t.x;
        self.data[7] = t.y;
        self.data[11] = t.z;
    }

    pub fn clear_translation(&mut self) {
        self.set_translation(Vector3d::ZERO);
    }

    pub fn transpose(&self) -> Self {
        let mut data = self.data;
        for i in 0..4 {
            for j in (i + 1)..4 {
                data.swap(i * 4 + j, j * 4 + i);
            }
        }
        Self { data }
    }

    pub fn determinant(&self) -> f64 {
        DMat4::from(*self).determinant()
    }

    /// 逆矩阵；奇异矩阵返回 None
    pub fn inverse(&self) -> Option<Self> {
        let m = DMat4::from(*self);
        let det = m.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return None;
        }
        Some(Self::from(m.inverse()))
    }
}

impl Mul for Matrix4x4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut data = [0.0; 16];
        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.data[i * 4 + k] * rhs.data[k * 4 + j];
                }
                data[i * 4 + j] = sum;
            }
        }
        Self { data }
    }
}

impl From<Matrix4x4> for DMat4 {
    fn from(m: Matrix4x4) -> Self {
        DMat4::from_cols_array(&m.to_ogl_values())
    }
}

impl From<DMat4> for Matrix4x4 {
    fn from(m: DMat4) -> Self {
        Matrix4x4::from_ogl_values(&m.to_cols_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DQuat, DVec3};

    const EPS: f64 = 1e-9;

    fn assert_mat_eq(a: &Matrix4x4, b: &Matrix4x4) {
        for (x, y) in a.to_values().iter().zip(b.to_values().iter()) {
            assert!((x - y).abs() < EPS, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_ogl_layout_round_trip() {
        let values: [f64; 16] = std::array::from_fn(|i| i as f64);
        let m = Matrix4x4::from_values(values);
        assert_eq!(m.get(0, 3), 3.0);
        assert_eq!(m.get(3, 0), 12.0);

        let ogl = m.to_ogl_values();
        assert_eq!(ogl[3], 12.0);
        assert_eq!(Matrix4x4::from_ogl_values(&ogl), m);
        assert_eq!(m.transpose().to_values(), ogl);
    }

    #[test]
    fn test_translation_affects_points_not_vectors() {
        let m = Matrix4x4::from_translation(Vector3d::new(1.0, 2.0, 3.0));
        assert_eq!(
            m.transform_point(Point3d::new(1.0, 1.0, 1.0)),
            Point3d::new(2.0, 3.0, 4.0)
        );
        assert_eq!(m.transform_vector(Vector3d::X), Vector3d::X);
    }

    #[test]
    fn test_point_transform_divides_by_w() {
        let mut values = Matrix4x4::IDENTITY.to_values();
        values[15] = 2.0;
        let m = Matrix4x4::from_values(values);
        assert_eq!(
            m.transform_point(Point3d::new(2.0, 4.0, 6.0)),
            Point3d::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_axis_angle_matches_quaternion() {
        let axis = Vector3d::new(1.0, -2.0, 0.5).to_unit();
        let angle = 1.234;
        let from_axis = Matrix4x4::from_axis_angle(angle, axis);
        let from_quat = Quaternion::from_axis_angle(angle, axis).to_rotation_matrix();
        assert_mat_eq(&from_axis, &from_quat);

        let expected = DMat4::from_quat(DQuat::from_axis_angle(DVec3::from(axis), angle));
        assert_mat_eq(&from_axis, &Matrix4x4::from(expected));
    }

    #[test]
    fn test_rotation_block_is_orthonormal() {
        let q = Quaternion::from_axis_angle(2.2, Vector3d::new(0.0, 0.6, 0.8));
        let m = Matrix4x4::from_rotation_translation(q, Vector3d::new(5.0, 0.0, -1.0));
        let mut r = m;
        r.clear_translation();
        assert_mat_eq(&(r * r.transpose()), &Matrix4x4::IDENTITY);
        assert!((m.determinant() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_product_matches_glam() {
        let a = Matrix4x4::from_rotation_translation(
            Quaternion::from_axis_angle(0.7, Vector3d::Y),
            Vector3d::new(1.0, 2.0, 3.0),
        );
        let b = Matrix4x4::from_axis_angle(-0.4, Vector3d::Z);
        let expected = DMat4::from(a) * DMat4::from(b);
        assert_mat_eq(&(a * b), &Matrix4x4::from(expected));

        // 先 b 后 a
        let p = Point3d::new(0.5, -1.0, 2.0);
        let composed = (a * b).transform_point(p);
        let stepwise = a.transform_point(b.transform_point(p));
        assert!((composed - stepwise).length() < EPS);
    }

    #[test]
    fn test_inverse() {
        let m = Matrix4x4::from_rotation_translation(
            Quaternion::from_axis_angle(1.1, Vector3d::new(0.0, 0.0, 1.0)),
            Vector3d::new(-3.0, 4.0, 0.5),
        );
        let inv = m.inverse().expect("rigid transform is invertible");
        assert_mat_eq(&(m * inv), &Matrix4x4::IDENTITY);

        let mut singular = Matrix4x4::IDENTITY.to_values();
        singular[0] = 0.0;
        assert!(Matrix4x4::from_values(singular).inverse().is_none());
    }

    #[test]
    fn test_local_coord_translation() {
        let q = Quaternion::from_axis_angle(std::f64::consts::FRAC_PI_2, Vector3d::Z);
        let m = Matrix4x4::from_rotation_translation(q, Vector3d::new(1.0, 0.0, 0.0));
        // R^T * (1,0,0) 对于绕 Z 旋转 90°：(0,-1,0)
        let local = m.local_coord_translation();
        assert!((local - Vector3d::new(0.0, -1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_gpu_matrix_is_column_major() {
        let m = Matrix4x4::from_translation(Vector3d::new(7.0, 8.0, 9.0));
        let gpu = m.to_gpu_matrix();
        assert_eq!(gpu.w_axis.x, 7.0);
        assert_eq!(gpu.w_axis.y, 8.0);
        assert_eq!(gpu.w_axis.z, 9.0);
    }
}
