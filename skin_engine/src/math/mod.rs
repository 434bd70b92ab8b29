//! 数学基础类型
//!
//! 双精度的向量、点、四元数和 4x4 变换矩阵。点与向量是两个独立的值类型：
//! 点在齐次坐标下 w = 1（受平移影响），向量 w = 0（不受平移影响）。
//! 与 glam 的互相转换放在各自文件中，用于和渲染端交换数据。

mod matrix;
mod point;
mod quaternion;
mod vector;

pub use matrix::Matrix4x4;
pub use point::Point3d;
pub use quaternion::Quaternion;
pub use vector::Vector3d;

/// 浮点比较的默认容差
pub const EPSILON: f64 = 1e-9;
