//! 骨架：骨骼层级、动画片段和姿态计算

use std::collections::HashMap;

use crate::animation::AnimationClip;
use crate::math::{Matrix4x4, Point3d};
use crate::{Result, SkinError};

use super::Bone;

/// 骨架
#[derive(Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
    name_to_index: HashMap<String, usize>,
    /// 父骨骼在前的求值顺序
    sorted_indices: Vec<usize>,
    clips: Vec<AnimationClip>,
    loop_clips: bool,
    /// build_hierarchy 成功后为 true，add_bone 会清除
    built: bool,
}

impl Skeleton {
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            name_to_index: HashMap::new(),
            sorted_indices: Vec::new(),
            clips: Vec::new(),
            loop_clips: true,
            built: false,
        }
    }

    /// 添加骨骼，返回其索引；之后必须重新调用 build_hierarchy
    pub fn add_bone(&mut self, bone: Bone) -> usize {
        self.built = false;
        let index = self.bones.len();
        self.name_to_index.entry(bone.name.clone()).or_insert(index);
        self.bones.push(bone);
        index
    }

    /// 构建骨骼层级并计算绑定矩阵和逆绑定矩阵
    pub fn build_hierarchy(&mut self) -> Result<()> {
        self.built = false;
        let bone_count = self.bones.len();

        if self.name_to_index.len() != bone_count {
            return Err(SkinError::InvalidHierarchy(
                "duplicate bone names".to_string(),
            ));
        }

        for (i, bone) in self.bones.iter().enumerate() {
            if let Some(parent) = bone.parent_index {
                if parent >= bone_count || parent == i {
                    return Err(SkinError::InvalidHierarchy(format!(
                        "bone '{}' has invalid parent {}",
                        bone.name, parent
                    )));
                }
            }
        }

        // 子骨骼列表（按骨骼顺序，第一个子骨骼决定骨骼末端）
        for bone in &mut self.bones {
            bone.children.clear();
        }
        for i in 0..bone_count {
            if let Some(parent) = self.bones[i].parent_index {
                self.bones[parent].children.push(i);
            }
        }

        // 层级深度；沿父链走超过骨骼数说明有环
        let mut depths = Vec::with_capacity(bone_count);
        for i in 0..bone_count {
            let mut depth = 0usize;
            let mut current = self.bones[i].parent_index;
            while let Some(parent) = current {
                depth += 1;
                if depth > bone_count {
                    return Err(SkinError::InvalidHierarchy(format!(
                        "cycle through bone '{}'",
                        self.bones[i].name
                    )));
                }
                current = self.bones[parent].parent_index;
            }
            depths.push(depth);
        }

        self.sorted_indices = (0..bone_count).collect();
        self.sorted_indices.sort_by_key(|&i| depths[i]);

        for k in 0..bone_count {
            let idx = self.sorted_indices[k];
            let bind = match self.bones[idx].parent_index {
                Some(parent) => self.bones[parent].bind_matrix * self.bones[idx].bind_local,
                None => self.bones[idx].bind_local,
            };
            let inverse = bind
                .inverse()
                .ok_or_else(|| SkinError::SingularMatrix(self.bones[idx].name.clone()))?;

            let bone = &mut self.bones[idx];
            bone.bind_matrix = bind;
            bone.inverse_bind_matrix = inverse;
            bone.matrix = bind;
        }
        self.built = true;

        log::info!(
            "Skeleton hierarchy built: {} bones, {} roots",
            bone_count,
            self.bones.iter().filter(|b| b.is_root()).count()
        );
        Ok(())
    }

    /// 通过名称查找骨骼
    pub fn get_bone_index_of(&self, name: &str) -> Result<usize> {
        self.name_to_index
            .get(name)
            .copied()
            .ok_or_else(|| SkinError::BoneNotFound(name.to_string()))
    }

    /// 层级是否已构建且之后没有再添加骨骼
    pub fn is_built(&self) -> bool {
        self.built
    }

    fn ensure_built(&self) -> Result<()> {
        if self.built {
            Ok(())
        } else {
            Err(SkinError::InvalidHierarchy("hierarchy not built".to_string()))
        }
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// 获取骨骼
    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    fn bone(&self, index: usize) -> Result<&Bone> {
        self.ensure_built()?;
        self.bones
            .get(index)
            .ok_or(SkinError::BoneIndexOutOfRange(index))
    }

    // ========== 动画片段 ==========

    pub fn add_clip(&mut self, clip: AnimationClip) -> usize {
        self.clips.push(clip);
        self.clips.len() - 1
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn clip(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index)
    }

    pub fn clip_index_of(&self, name: &str) -> Result<usize> {
        self.clips
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| SkinError::ClipNotFound(name.to_string()))
    }

    /// 时间超出片段长度时是否循环
    pub fn set_looping(&mut self, looping: bool) {
        self.loop_clips = looping;
    }

    // ========== 姿态 ==========

    /// 按片段和时间设置姿态，重新计算每根骨骼的当前世界矩阵
    ///
    /// 局部变换 = 绑定局部变换 * 平移 * 旋转；没有轨道的骨骼保持绑定局部变换。
    pub fn set_pose(&mut self, clip_index: usize, time: f64) -> Result<()> {
        self.ensure_built()?;
        if !time.is_finite() {
            return Err(SkinError::InvalidTime(time));
        }
        let clip = self
            .clips
            .get(clip_index)
            .ok_or_else(|| SkinError::ClipNotFound(format!("#{}", clip_index)))?;
        let time = clip.wrap_time(time, self.loop_clips);

        for &idx in &self.sorted_indices {
            let local = match clip.sample(idx, time) {
                Some((translation, rotation)) => {
                    self.bones[idx].bind_local
                        * Matrix4x4::from_rotation_translation(rotation, translation)
                }
                None => self.bones[idx].bind_local,
            };
            let world = match self.bones[idx].parent_index {
                Some(parent) => self.bones[parent].matrix * local,
                None => local,
            };
            self.bones[idx].matrix = world;
        }
        Ok(())
    }

    /// 恢复绑定姿态
    pub fn reset_pose(&mut self) {
        for bone in &mut self.bones {
            bone.matrix = bone.bind_matrix;
        }
    }

    /// 获取蒙皮矩阵数组（当前全局变换 * 逆绑定矩阵）
    pub fn skinning_matrices(&self) -> Vec<Matrix4x4> {
        self.bones.iter().map(Bone::skinning_matrix).collect()
    }

    // ========== 骨骼线段 ==========

    /// 当前姿态下的骨骼起点（世界坐标）
    pub fn bone_head(&self, index: usize) -> Result<Point3d> {
        Ok(self.bone(index)?.head())
    }

    /// 当前姿态下的骨骼末端：有子骨骼时取第一个子骨骼的起点，否则用 pos 伪造
    pub fn bone_tail(&self, index: usize) -> Result<Point3d> {
        let bone = self.bone(index)?;
        match bone.children.first() {
            Some(&child) => self.bone_head(child),
            None => Ok(bone.matrix.transform_point(bone.pos)),
        }
    }

    /// 绑定姿态下的骨骼起点
    pub fn bind_head(&self, index: usize) -> Result<Point3d> {
        Ok(self.bone(index)?.bind_head())
    }

    /// 绑定姿态下的骨骼末端
    pub fn bind_tail(&self, index: usize) -> Result<Point3d> {
        let bone = self.bone(index)?;
        match bone.children.first() {
            Some(&child) => self.bind_head(child),
            None => Ok(bone.bind_matrix.transform_point(bone.pos)),
        }
    }

    /// 绑定姿态下所有骨骼的 (起点, 末端)
    pub fn bind_segments(&self) -> Result<Vec<(Point3d, Point3d)>> {
        (0..self.bones.len())
            .map(|i| Ok((self.bind_head(i)?, self.bind_tail(i)?)))
            .collect()
    }

    /// 当前姿态下所有骨骼的 (起点, 末端)，用于绘制骨架
    pub fn current_segments(&self) -> Result<Vec<(Point3d, Point3d)>> {
        (0..self.bones.len())
            .map(|i| Ok((self.bone_head(i)?, self.bone_tail(i)?)))
            .collect()
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}
