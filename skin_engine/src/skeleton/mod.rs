//! 骨骼系统
//!
//! 骨骼层级、绑定姿态和逐帧姿态。骨骼文件的读取由外部加载器完成，
//! 加载器通过 `Skeleton::add_bone` / `build_hierarchy` / `add_clip` 构建骨架。

mod bone;
mod manager;

pub use bone::Bone;
pub use manager::Skeleton;
