//! 顶点骨骼权重分配
//!
//! 对绑定姿态下的每个顶点，计算它到每根骨骼线段（起点到末端）的最近距离，
//! 再按策略得到权重分布。

mod assign;
mod distance;

pub use assign::compute_weights;
pub use distance::{closest_distance, closest_point};

/// 权重策略
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WeightPolicy {
    /// 最近的一根骨骼权重为 1
    #[default]
    NearestBone,
    /// 最近的两根骨骼按距离平方倒数混合
    TwoNearestBones,
}

impl WeightPolicy {
    /// 切换到另一种策略
    pub fn toggled(self) -> Self {
        match self {
            WeightPolicy::NearestBone => WeightPolicy::TwoNearestBones,
            WeightPolicy::TwoNearestBones => WeightPolicy::NearestBone,
        }
    }
}

/// 单个顶点的骨骼权重
#[derive(Clone, Debug, PartialEq)]
pub enum VertexWeight {
    Single { bone: usize },
    Blend { bones: [usize; 2], weights: [f64; 2] },
}

impl VertexWeight {
    /// 非零权重 (骨骼索引, 权重)，按距离从近到远
    pub fn influences(&self) -> Vec<(usize, f64)> {
        match *self {
            VertexWeight::Single { bone } => vec![(bone, 1.0)],
            VertexWeight::Blend { bones, weights } => {
                vec![(bones[0], weights[0]), (bones[1], weights[1])]
            }
        }
    }

    /// 指定骨骼的权重，未参与混合的骨骼为 0
    pub fn weight_of(&self, bone_index: usize) -> f64 {
        match *self {
            VertexWeight::Single { bone } => {
                if bone == bone_index {
                    1.0
                } else {
                    0.0
                }
            }
            VertexWeight::Blend { bones, weights } => (0..2)
                .filter(|&i| bones[i] == bone_index)
                .map(|i| weights[i])
                .sum(),
        }
    }

    /// 权重最大的骨骼
    pub fn dominant_bone(&self) -> usize {
        match *self {
            VertexWeight::Single { bone } => bone,
            VertexWeight::Blend { bones, weights } => {
                if weights[1] > weights[0] {
                    bones[1]
                } else {
                    bones[0]
                }
            }
        }
    }
}

/// 权重表：顶点索引 -> 骨骼权重
#[derive(Clone, Debug, PartialEq)]
pub struct WeightTable {
    policy: WeightPolicy,
    bone_count: usize,
    weights: Vec<VertexWeight>,
}

impl WeightTable {
    pub(crate) fn new(policy: WeightPolicy, bone_count: usize, weights: Vec<VertexWeight>) -> Self {
        Self {
            policy,
            bone_count,
            weights,
        }
    }

    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    /// 计算时骨架的骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn vertex_count(&self) -> usize {
        self.weights.len()
    }

    pub fn get(&self, vertex_index: usize) -> Option<&VertexWeight> {
        self.weights.get(vertex_index)
    }

    pub fn weights(&self) -> &[VertexWeight] {
        &self.weights
    }

    /// 顶点对每根骨骼的权重（稠密形式，长度为骨骼数）
    pub fn dense_row(&self, vertex_index: usize) -> Option<Vec<f64>> {
        let weight = self.weights.get(vertex_index)?;
        Some((0..self.bone_count).map(|b| weight.weight_of(b)).collect())
    }
}
