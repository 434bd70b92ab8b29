//! 场景上下文
//!
//! 持有网格、骨架、权重表和动画时间等全部运行时状态，
//! 由外部控制层（键盘/界面）和渲染器显式调用。

mod context;

pub use context::SceneContext;

/// 场景模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SceneMode {
    /// 绑定姿态，不播放动画
    #[default]
    BindPose,
    /// 播放当前动画片段并逐帧蒙皮
    Animate,
}
