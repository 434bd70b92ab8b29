//! 单根骨骼的关键帧轨道

use crate::math::{Quaternion, Vector3d};

use super::BoneKeyframe;

/// 骨骼动画轨道
#[derive(Clone, Debug)]
pub struct BoneTrack {
    pub bone_index: usize,
    keyframes: Vec<BoneKeyframe>,
}

impl BoneTrack {
    pub fn new(bone_index: usize) -> Self {
        Self {
            bone_index,
            keyframes: Vec::new(),
        }
    }

    /// 插入关键帧，保持按时间排序；同一时间的关键帧会被替换
    pub fn insert_keyframe(&mut self, keyframe: BoneKeyframe) {
        match self
            .keyframes
            .binary_search_by(|k| k.time.total_cmp(&keyframe.time))
        {
            Ok(i) => self.keyframes[i] = keyframe,
            Err(i) => self.keyframes.insert(i, keyframe),
        }
    }

    pub fn keyframes(&self) -> &[BoneKeyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// 最后一个关键帧的时间
    pub fn end_time(&self) -> f64 {
        self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// 求值指定时间的局部平移和旋转
    ///
    /// 早于第一帧取第一帧，晚于最后一帧取最后一帧，空轨道返回单位变换。
    /// NaN 按第一帧处理。
    pub fn sample(&self, time: f64) -> (Vector3d, Quaternion) {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return (Vector3d::ZERO, Quaternion::IDENTITY),
        };

        if time.is_nan() || time <= first.time {
            return (first.translation, first.rotation);
        }
        if time >= last.time {
            return (last.translation, last.rotation);
        }

        // 第一个时间大于 time 的关键帧
        let next_idx = self.keyframes.partition_point(|k| k.time <= time);
        let prev = &self.keyframes[next_idx - 1];
        let next = &self.keyframes[next_idx];

        let span = next.time - prev.time;
        let t = if span > 0.0 { (time - prev.time) / span } else { 0.0 };
        prev.interpolate(next, t)
    }
}
