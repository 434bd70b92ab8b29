//! 线性混合蒙皮
//!
//! p' = Σ w_i * (M_i_current * M_i_bind^-1 * p_bind)，始终从绑定姿态位置计算，
//! 不会在帧之间累积误差。

use rayon::prelude::*;

use crate::config::SkinningConfig;
use crate::math::{Matrix4x4, Point3d, Vector3d};
use crate::skeleton::Skeleton;
use crate::weighting::{VertexWeight, WeightTable};
use crate::{Result, SkinError};

use super::SkinningInput;

/// 蒙皮上下文
#[derive(Clone, Debug, Default)]
pub struct SkinningContext {
    pub parallel: bool,
}

impl From<&SkinningConfig> for SkinningContext {
    fn from(config: &SkinningConfig) -> Self {
        Self {
            parallel: config.parallel,
        }
    }
}

/// 计算蒙皮，结果写入 output（与绑定顶点一一对应）
pub fn compute_skinning(
    input: &SkinningInput,
    context: &SkinningContext,
    output: &mut [Point3d],
) -> Result<()> {
    let vertex_count = input.bind_positions.len();
    if input.weights.vertex_count() != vertex_count {
        return Err(SkinError::VertexCountMismatch {
            expected: vertex_count,
            actual: input.weights.vertex_count(),
        });
    }
    if output.len() != vertex_count {
        return Err(SkinError::VertexCountMismatch {
            expected: vertex_count,
            actual: output.len(),
        });
    }
    if input.weights.bone_count() != input.bone_matrices.len() {
        return Err(SkinError::StaleWeightTable {
            expected: input.weights.bone_count(),
            actual: input.bone_matrices.len(),
        });
    }

    let matrices = input.bone_matrices;
    let weights = input.weights.weights();

    if context.parallel {
        output
            .par_iter_mut()
            .zip(input.bind_positions.par_iter())
            .zip(weights.par_iter())
            .for_each(|((out, &position), weight)| {
                *out = compute_single_vertex(position, weight, matrices);
            });
    } else {
        for ((out, &position), weight) in output
            .iter_mut()
            .zip(input.bind_positions.iter())
            .zip(weights.iter())
        {
            *out = compute_single_vertex(position, weight, matrices);
        }
    }

    Ok(())
}

/// 用骨架当前姿态对绑定顶点蒙皮；骨架层级必须已构建
pub fn skin_vertices(
    skeleton: &Skeleton,
    bind_positions: &[Point3d],
    weights: &WeightTable,
    context: &SkinningContext,
    output: &mut [Point3d],
) -> Result<()> {
    if !skeleton.is_built() {
        return Err(SkinError::InvalidHierarchy("hierarchy not built".to_string()));
    }
    let bone_matrices = skeleton.skinning_matrices();
    let input = SkinningInput {
        bind_positions,
        weights,
        bone_matrices: &bone_matrices,
    };
    compute_skinning(&input, context, output)
}

/// 计算单个顶点的蒙皮
fn compute_single_vertex(
    position: Point3d,
    weight: &VertexWeight,
    matrices: &[Matrix4x4],
) -> Point3d {
    match weight {
        VertexWeight::Single { bone } => matrices[*bone].transform_point(position),
        VertexWeight::Blend { bones, weights } => {
            let mut acc = Vector3d::ZERO;
            for i in 0..2 {
                let m = &matrices[bones[i]];
                acc += m.transform_point(position).to_vector() * weights[i];
            }
            acc.to_point()
        }
    }
}
