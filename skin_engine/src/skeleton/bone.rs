//! 骨骼节点

use crate::math::{Matrix4x4, Point3d, Quaternion, Vector3d};

/// 骨骼节点
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent_index: Option<usize>,
    /// 子骨骼索引（在 build_hierarchy 中计算，按骨骼顺序）
    pub children: Vec<usize>,

    // 相对于父骨骼的绑定变换
    pub bind_local: Matrix4x4,
    // 绑定姿态下骨骼到世界的变换（在build_hierarchy中计算）
    pub bind_matrix: Matrix4x4,
    // 逆绑定矩阵（在build_hierarchy中计算）
    pub inverse_bind_matrix: Matrix4x4,

    // 当前帧骨骼到世界的变换
    pub matrix: Matrix4x4,

    /// 没有子骨骼时用于伪造骨骼末端的局部坐标点
    pub pos: Point3d,
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_index: None,
            children: Vec::new(),
            bind_local: Matrix4x4::IDENTITY,
            bind_matrix: Matrix4x4::IDENTITY,
            inverse_bind_matrix: Matrix4x4::IDENTITY,
            matrix: Matrix4x4::IDENTITY,
            pos: Point3d::ORIGIN,
        }
    }

    /// 从相对父骨骼的静止平移和旋转创建
    pub fn from_rest(
        name: impl Into<String>,
        parent_index: Option<usize>,
        translation: Vector3d,
        rotation: Quaternion,
    ) -> Self {
        let mut bone = Self::new(name);
        bone.parent_index = parent_index;
        bone.bind_local = Matrix4x4::from_rotation_translation(rotation, translation);
        bone
    }

    pub fn with_tail(mut self, pos: Point3d) -> Self {
        self.pos = pos;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_index.is_none()
    }

    /// 世界坐标 -> 绑定姿态下的骨骼局部坐标
    pub fn to_bone_space(&self, world: Point3d) -> Point3d {
        self.inverse_bind_matrix.transform_point(world)
    }

    /// 骨骼局部坐标 -> 当前姿态下的世界坐标
    pub fn to_world_space(&self, local: Point3d) -> Point3d {
        self.matrix.transform_point(local)
    }

    /// 获取蒙皮矩阵 = 当前全局变换 * 逆绑定矩阵
    pub fn skinning_matrix(&self) -> Matrix4x4 {
        self.matrix * self.inverse_bind_matrix
    }

    /// 当前姿态下的骨骼起点
    pub fn head(&self) -> Point3d {
        self.matrix.transform_point(Point3d::ORIGIN)
    }

    /// 绑定姿态下的骨骼起点
    pub fn bind_head(&self) -> Point3d {
        self.bind_matrix.transform_point(Point3d::ORIGIN)
    }
}

impl Default for Bone {
    fn default() -> Self {
        Self::new(String::new())
    }
}
