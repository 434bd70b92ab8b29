//! 场景运行时

use std::path::Path;

use crate::config::{get_config, SkinningConfig};
use crate::math::{Point3d, Vector3d};
use crate::mesh::{load_obj, TriangleMesh};
use crate::skeleton::Skeleton;
use crate::skinning::{skin_vertices, SkinningContext};
use crate::weighting::{compute_weights, WeightPolicy, WeightTable};
use crate::{Result, SkinError};

use super::SceneMode;

/// 场景上下文
pub struct SceneContext {
    // 静态数据
    mesh: TriangleMesh,
    /// 加载后立即保存的绑定姿态顶点，蒙皮只读取它
    bind_positions: Vec<Point3d>,
    skeleton: Skeleton,

    // 权重（策略变化时整体重算）
    weights: WeightTable,
    policy: WeightPolicy,

    // 动画状态
    mode: SceneMode,
    clip_index: usize,
    current_time: f64,
    paused: bool,

    config: SkinningConfig,
    frame_count: u64,
}

impl SceneContext {
    /// 创建场景：保存绑定姿态并按默认策略计算权重
    pub fn new(mesh: TriangleMesh, mut skeleton: Skeleton, config: SkinningConfig) -> Result<Self> {
        skeleton.set_looping(config.loop_clips);
        skeleton.reset_pose();

        let bind_positions = mesh.vertices.clone();
        let policy = config.default_policy;
        let weights = compute_weights(&bind_positions, &skeleton, policy, &config)?;

        log::info!(
            "Scene ready: mesh {} ({} vertices), {} bones, {} clips",
            mesh.name,
            mesh.vertex_count(),
            skeleton.bone_count(),
            skeleton.clip_count()
        );

        Ok(Self {
            mesh,
            bind_positions,
            skeleton,
            weights,
            policy,
            mode: SceneMode::default(),
            clip_index: 0,
            current_time: 0.0,
            paused: false,
            config,
            frame_count: 0,
        })
    }

    /// 使用进程级默认配置（`config::set_config` 设置）创建场景
    pub fn with_global_config(mesh: TriangleMesh, skeleton: Skeleton) -> Result<Self> {
        Self::new(mesh, skeleton, get_config())
    }

    /// 从 OBJ 文件加载网格并创建场景
    pub fn load<P: AsRef<Path>>(
        obj_path: P,
        skeleton: Skeleton,
        config: SkinningConfig,
    ) -> Result<Self> {
        let mesh = load_obj(obj_path)?;
        Self::new(mesh, skeleton, config)
    }

    // ========== 查询 ==========

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// 当前（变形后）的顶点
    pub fn vertices(&self) -> &[Point3d] {
        &self.mesh.vertices
    }

    pub fn bind_positions(&self) -> &[Point3d] {
        &self.bind_positions
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn clip_index(&self) -> usize {
        self.clip_index
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &SkinningConfig {
        &self.config
    }

    // ========== 控制 ==========

    /// 切换权重策略并完整重算权重表
    pub fn set_policy(&mut self, policy: WeightPolicy) -> Result<()> {
        self.weights = compute_weights(&self.bind_positions, &self.skeleton, policy, &self.config)?;
        self.policy = policy;
        self.update()
    }

    /// 在两种策略之间切换，返回新策略
    pub fn toggle_policy(&mut self) -> Result<WeightPolicy> {
        self.set_policy(self.policy.toggled())?;
        Ok(self.policy)
    }

    /// 切换模式：时间归零，恢复绑定姿态后更新
    ///
    /// 没有可播放的片段时切换到 Animate 失败，场景保持原状态。
    pub fn set_mode(&mut self, mode: SceneMode) -> Result<()> {
        if mode == SceneMode::Animate && self.skeleton.clip(self.clip_index).is_none() {
            return Err(SkinError::ClipNotFound(format!("#{}", self.clip_index)));
        }
        self.mode = mode;
        self.current_time = 0.0;
        self.skeleton.reset_pose();
        self.update()
    }

    /// 选择动画片段，时间归零
    pub fn set_clip(&mut self, clip_index: usize) -> Result<()> {
        if self.skeleton.clip(clip_index).is_none() {
            return Err(SkinError::ClipNotFound(format!("#{}", clip_index)));
        }
        self.clip_index = clip_index;
        self.current_time = 0.0;
        self.update()
    }

    /// 时间归零并继续播放
    pub fn reset_time(&mut self) {
        self.current_time = 0.0;
        self.paused = false;
    }

    /// 暂停/继续，返回是否处于暂停
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// 推进动画时间（秒）并更新；暂停时不做任何事
    pub fn advance(&mut self, delta_time: f64) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        if !delta_time.is_finite() {
            return Err(SkinError::InvalidTime(delta_time));
        }
        self.current_time += delta_time * self.config.time_scale;
        self.update()
    }

    /// 按当前模式和时间更新骨架姿态和网格顶点
    pub fn update(&mut self) -> Result<()> {
        match self.mode {
            SceneMode::BindPose => {
                self.skeleton.reset_pose();
                self.mesh.vertices.clone_from(&self.bind_positions);
            }
            SceneMode::Animate => {
                self.skeleton.set_pose(self.clip_index, self.current_time)?;
                let context = SkinningContext::from(&self.config);
                skin_vertices(
                    &self.skeleton,
                    &self.bind_positions,
                    &self.weights,
                    &context,
                    &mut self.mesh.vertices,
                )?;
            }
        }

        self.frame_count += 1;
        if self.config.debug_log {
            log::debug!(
                "Frame {}: mode={:?}, clip={}, time={:.3}",
                self.frame_count,
                self.mode,
                self.clip_index,
                self.current_time
            );
        }
        Ok(())
    }

    // ========== 渲染接口 ==========

    /// 当前姿态下每根骨骼的 (起点, 末端)
    pub fn bone_segments(&self) -> Result<Vec<(Point3d, Point3d)>> {
        self.skeleton.current_segments()
    }

    /// 平铺的 f32 顶点缓冲区（xyz 连续）
    pub fn vertex_buffer_f32(&self) -> Vec<f32> {
        self.mesh
            .vertices
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// 根据当前顶点重新计算法线
    pub fn compute_normals(&mut self) -> &[Vector3d] {
        self.mesh.compute_normals();
        &self.mesh.normals
    }
}
