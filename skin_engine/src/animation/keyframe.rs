//! 动画关键帧

use crate::math::{Quaternion, Vector3d};

/// 骨骼关键帧
#[derive(Clone, Debug)]
pub struct BoneKeyframe {
    /// 时间（秒）
    pub time: f64,
    pub translation: Vector3d,
    pub rotation: Quaternion,
}

impl BoneKeyframe {
    pub fn new(time: f64, translation: Vector3d, rotation: Quaternion) -> Self {
        Self {
            time,
            translation,
            rotation,
        }
    }

    /// 只有旋转的关键帧
    pub fn rotation(time: f64, rotation: Quaternion) -> Self {
        Self::new(time, Vector3d::ZERO, rotation)
    }

    /// 在两帧之间插值，t 为 [0, 1] 内的进度
    pub fn interpolate(&self, next: &BoneKeyframe, t: f64) -> (Vector3d, Quaternion) {
        let translation = self.translation + (next.translation - self.translation) * t;
        let rotation = self.rotation.slerp(next.rotation, t);
        (translation, rotation)
    }
}

impl Default for BoneKeyframe {
    fn default() -> Self {
        Self::new(0.0, Vector3d::ZERO, Quaternion::IDENTITY)
    }
}
