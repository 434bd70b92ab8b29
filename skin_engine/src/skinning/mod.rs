//! 顶点蒙皮计算

mod skinning;

pub use skinning::{compute_skinning, skin_vertices, SkinningContext};

use crate::math::{Matrix4x4, Point3d};
use crate::weighting::WeightTable;

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 绑定姿态顶点位置（只读）
    pub bind_positions: &'a [Point3d],
    /// 顶点权重
    pub weights: &'a WeightTable,
    /// 骨骼变换矩阵（已乘以逆绑定矩阵）
    pub bone_matrices: &'a [Matrix4x4],
}
