//! Skin Engine - 线性混合蒙皮引擎
//!
//! 提供：
//! - 双精度向量/点/四元数/矩阵运算
//! - 骨骼层级、绑定姿态和关键帧姿态计算
//! - 基于点到骨骼线段距离的顶点权重分配
//! - 逐帧线性混合蒙皮
//! - OBJ 网格读取和场景上下文

pub mod animation;
pub mod config;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod skeleton;
pub mod skinning;
pub mod weighting;

pub use animation::{AnimationClip, BoneKeyframe, BoneTrack};
pub use config::SkinningConfig;
pub use math::{Matrix4x4, Point3d, Quaternion, Vector3d};
pub use mesh::{load_obj, parse_obj, Triangle, TriangleMesh};
pub use scene::{SceneContext, SceneMode};
pub use skeleton::{Bone, Skeleton};
pub use skinning::{compute_skinning, SkinningInput};
pub use weighting::{closest_distance, compute_weights, VertexWeight, WeightPolicy, WeightTable};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkinError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ parse error at line {line}: {message}")]
    ObjParse { line: usize, message: String },

    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    #[error("Bone index out of range: {0}")]
    BoneIndexOutOfRange(usize),

    #[error("Animation clip not found: {0}")]
    ClipNotFound(String),

    #[error("Invalid bone hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Singular bind matrix for bone: {0}")]
    SingularMatrix(String),

    #[error("Animation time is not finite: {0}")]
    InvalidTime(f64),

    #[error("Skeleton has no bones")]
    NoBones,

    #[error("Vertex count mismatch: expected {expected}, got {actual}")]
    VertexCountMismatch { expected: usize, actual: usize },

    #[error("Weight table is stale: computed for {expected} bones, skeleton has {actual}")]
    StaleWeightTable { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, SkinError>;
