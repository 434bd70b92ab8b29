//! 蒙皮配置
//!
//! 参数扁平化。进程级默认配置通过 `get_config` / `set_config` 读写，
//! `SceneContext::with_global_config` 从这里取值；其余组件显式接收一份配置值。

use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::weighting::WeightPolicy;

/// 蒙皮配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct SkinningConfig {
    /// 场景创建时使用的权重策略，默认 NearestBone
    pub default_policy: WeightPolicy,
    /// 双骨骼混合时的最小距离，顶点正好落在骨骼上时距离被钳制到此值，默认 1e-6
    pub min_bone_distance: f64,
    /// 权重计算和蒙皮是否用 rayon 并行，默认 false
    pub parallel: bool,
    /// 时间超过动画长度时是否循环，默认 true
    pub loop_clips: bool,
    /// 动画时间缩放，默认 1.0
    pub time_scale: f64,
    /// 是否输出逐帧调试日志，默认 false
    pub debug_log: bool,
}

impl Default for SkinningConfig {
    fn default() -> Self {
        Self {
            default_policy: WeightPolicy::NearestBone,
            min_bone_distance: 1e-6,
            parallel: false,
            loop_clips: true,
            time_scale: 1.0,
            debug_log: false,
        }
    }
}

/// 全局配置实例
static SKINNING_CONFIG: Lazy<RwLock<SkinningConfig>> =
    Lazy::new(|| RwLock::new(SkinningConfig::default()));

/// 获取当前配置（只读副本）
pub fn get_config() -> SkinningConfig {
    match SKINNING_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// 手动设置配置
pub fn set_config(config: SkinningConfig) {
    match SKINNING_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(SkinningConfig::default());
}

/// 修改全局配置的测试之间互斥
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
