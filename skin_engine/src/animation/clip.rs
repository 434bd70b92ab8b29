//! 动画片段

use std::collections::HashMap;

use crate::math::{Quaternion, Vector3d};

use super::{BoneKeyframe, BoneTrack};

/// 动画片段：一组骨骼轨道
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    /// 片段长度（秒）
    pub length: f64,
    tracks: Vec<BoneTrack>,
    bone_to_track: HashMap<usize, usize>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, length: f64) -> Self {
        Self {
            name: name.into(),
            length,
            tracks: Vec::new(),
            bone_to_track: HashMap::new(),
        }
    }

    /// 获取骨骼的轨道，不存在时创建
    pub fn track_mut(&mut self, bone_index: usize) -> &mut BoneTrack {
        let idx = match self.bone_to_track.get(&bone_index) {
            Some(&idx) => idx,
            None => {
                self.tracks.push(BoneTrack::new(bone_index));
                let idx = self.tracks.len() - 1;
                self.bone_to_track.insert(bone_index, idx);
                idx
            }
        };
        &mut self.tracks[idx]
    }

    /// 添加关键帧；长度小于关键帧时间时自动延长
    pub fn add_keyframe(&mut self, bone_index: usize, keyframe: BoneKeyframe) {
        if keyframe.time > self.length {
            self.length = keyframe.time;
        }
        self.track_mut(bone_index).insert_keyframe(keyframe);
    }

    pub fn track(&self, bone_index: usize) -> Option<&BoneTrack> {
        self.bone_to_track.get(&bone_index).map(|&i| &self.tracks[i])
    }

    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    /// 把时间映射到片段范围内：循环时取模，否则钳制到 [0, length]
    pub fn wrap_time(&self, time: f64, looping: bool) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        if looping {
            time.rem_euclid(self.length)
        } else {
            time.clamp(0.0, self.length)
        }
    }

    /// 求值骨骼在指定时间的局部偏移；没有轨道的骨骼返回 None
    pub fn sample(&self, bone_index: usize, time: f64) -> Option<(Vector3d, Quaternion)> {
        self.track(bone_index).map(|track| track.sample(time))
    }
}
