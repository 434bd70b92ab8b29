//! 骨骼动画
//!
//! 关键帧按时间（秒）存储在每根骨骼的轨道里，平移线性插值，旋转球面插值。
//! 关键帧相对于骨骼的绑定局部变换。

mod clip;
mod keyframe;
mod track;

pub use clip::AnimationClip;
pub use keyframe::BoneKeyframe;
pub use track::BoneTrack;
