//! 权重计算

use rayon::prelude::*;

use crate::config::SkinningConfig;
use crate::math::Point3d;
use crate::skeleton::Skeleton;
use crate::{Result, SkinError};

use super::{closest_distance, VertexWeight, WeightPolicy, WeightTable};

/// 为每个绑定姿态顶点计算骨骼权重
///
/// 骨骼线段取绑定姿态下的起点和末端。每次调用都完整重算，
/// 复杂度 O(顶点数 × 骨骼数)，不要放在逐帧更新里。
pub fn compute_weights(
    vertices: &[Point3d],
    skeleton: &Skeleton,
    policy: WeightPolicy,
    config: &SkinningConfig,
) -> Result<WeightTable> {
    if skeleton.is_empty() {
        return Err(SkinError::NoBones);
    }
    if vertices.is_empty() {
        log::warn!("Computing weights for an empty mesh");
    }

    let segments = skeleton.bind_segments()?;
    let min_distance = config.min_bone_distance;

    let assign = |vertex: &Point3d| -> (VertexWeight, bool) {
        match policy {
            WeightPolicy::NearestBone => (nearest_bone(*vertex, &segments), false),
            WeightPolicy::TwoNearestBones => two_nearest_bones(*vertex, &segments, min_distance),
        }
    };

    let results: Vec<(VertexWeight, bool)> = if config.parallel {
        vertices.par_iter().map(assign).collect()
    } else {
        vertices.iter().map(assign).collect()
    };

    let clamped = results.iter().filter(|(_, c)| *c).count();
    if clamped > 0 {
        log::warn!(
            "{} vertices lie on a bone segment, distance clamped to {}",
            clamped,
            min_distance
        );
    }

    let weights: Vec<VertexWeight> = results.into_iter().map(|(w, _)| w).collect();

    log::info!(
        "Vertex weights computed: {} vertices, {} bones, policy {:?}",
        weights.len(),
        segments.len(),
        policy
    );

    Ok(WeightTable::new(policy, segments.len(), weights))
}

/// 最近单骨骼
///
/// 使用 `<=` 比较，距离完全相同时后遍历到的骨骼胜出。
fn nearest_bone(vertex: Point3d, segments: &[(Point3d, Point3d)]) -> VertexWeight {
    let mut bone = 0;
    let mut closest = f64::INFINITY;
    for (i, &(head, tail)) in segments.iter().enumerate() {
        let dist = closest_distance(head, tail, vertex);
        if dist <= closest {
            closest = dist;
            bone = i;
        }
    }
    VertexWeight::Single { bone }
}

/// 最近两根骨骼，按距离平方倒数混合
///
/// 距离小于 min_distance 时钳制，返回值第二项表示是否发生了钳制。
/// 只有一根骨骼时退化为单骨骼。
fn two_nearest_bones(
    vertex: Point3d,
    segments: &[(Point3d, Point3d)],
    min_distance: f64,
) -> (VertexWeight, bool) {
    if segments.len() < 2 {
        return (VertexWeight::Single { bone: 0 }, false);
    }

    let distances: Vec<f64> = segments
        .iter()
        .map(|&(head, tail)| closest_distance(head, tail, vertex))
        .collect();

    // 稳定排序：距离相同时索引小的在前
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

    let (b1, b2) = (order[0], order[1]);
    let clamped = distances[b1] < min_distance || distances[b2] < min_distance;
    let d1 = distances[b1].max(min_distance);
    let d2 = distances[b2].max(min_distance);

    // (1/d1²) / (1/d1² + 1/d2²) 写成距离比的形式，d1 <= d2，远处顶点不会下溢成 0/0
    let ratio = d1 / d2;
    let ratio = if ratio.is_nan() { 1.0 } else { ratio };
    let w1 = 1.0 / (1.0 + ratio * ratio);

    (
        VertexWeight::Blend {
            bones: [b1, b2],
            weights: [w1, 1.0 - w1],
        },
        clamped,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quaternion, Vector3d};
    use crate::skeleton::Bone;

    /// 两根平行于 X 轴的独立骨骼：y = 0 和 y = 2，长度都是 2
    fn parallel_bones() -> Skeleton {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(
            Bone::from_rest("lower", None, Vector3d::ZERO, Quaternion::IDENTITY)
                .with_tail(Point3d::new(2.0, 0.0, 0.0)),
        );
        skeleton.add_bone(
            Bone::from_rest("upper", None, Vector3d::new(0.0, 2.0, 0.0), Quaternion::IDENTITY)
                .with_tail(Point3d::new(2.0, 0.0, 0.0)),
        );
        skeleton.build_hierarchy().unwrap();
        skeleton
    }

    /// 三根骨骼组成的链
    fn chain() -> Skeleton {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::from_rest("a", None, Vector3d::ZERO, Quaternion::IDENTITY));
        skeleton.add_bone(Bone::from_rest(
            "b",
            Some(0),
            Vector3d::new(1.0, 0.0, 0.0),
            Quaternion::IDENTITY,
        ));
        skeleton.add_bone(
            Bone::from_rest("c", Some(1), Vector3d::new(1.0, 0.0, 0.0), Quaternion::IDENTITY)
                .with_tail(Point3d::new(1.0, 0.0, 0.0)),
        );
        skeleton.build_hierarchy().unwrap();
        skeleton
    }

    fn config() -> SkinningConfig {
        SkinningConfig::default()
    }

    #[test]
    fn test_nearest_bone_is_exact() {
        let skeleton = parallel_bones();
        let vertices = [Point3d::new(1.0, 0.5, 0.0), Point3d::new(1.0, 1.8, 0.3)];
        let table =
            compute_weights(&vertices, &skeleton, WeightPolicy::NearestBone, &config()).unwrap();

        assert_eq!(table.dense_row(0), Some(vec![1.0, 0.0]));
        assert_eq!(table.dense_row(1), Some(vec![0.0, 1.0]));
        assert_eq!(table.policy(), WeightPolicy::NearestBone);
        assert_eq!(table.bone_count(), 2);
    }

    #[test]
    fn test_nearest_bone_tie_goes_to_last() {
        let skeleton = parallel_bones();
        let vertices = [Point3d::new(1.0, 1.0, 0.0)];
        let table =
            compute_weights(&vertices, &skeleton, WeightPolicy::NearestBone, &config()).unwrap();
        assert_eq!(table.get(0), Some(&VertexWeight::Single { bone: 1 }));
    }

    #[test]
    fn test_two_bones_equidistant_half_half() {
        let skeleton = parallel_bones();
        let vertices = [Point3d::new(1.0, 1.0, 0.0)];
        let table = compute_weights(&vertices, &skeleton, WeightPolicy::TwoNearestBones, &config())
            .unwrap();
        let row = table.dense_row(0).unwrap();
        assert!((row[0] - 0.5).abs() < 1e-12);
        assert!((row[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_two_bones_inverse_square_blend() {
        let skeleton = chain();
        // 到 a 垂直投影距离 1，到 b 钳制到起点，距离 sqrt(0.25 + 1)
        let vertex = Point3d::new(0.5, 1.0, 0.0);
        let table =
            compute_weights(&[vertex], &skeleton, WeightPolicy::TwoNearestBones, &config())
                .unwrap();

        let weight = table.get(0).unwrap();
        let influences = weight.influences();
        assert_eq!(influences.len(), 2);
        assert_eq!(influences[0].0, 0);
        assert_eq!(influences[1].0, 1);

        let d1: f64 = 1.0;
        let d2: f64 = (0.25f64 + 1.0).sqrt();
        let expected = (1.0 / (d1 * d1)) / (1.0 / (d1 * d1) + 1.0 / (d2 * d2));
        assert!((influences[0].1 - expected).abs() < 1e-12);
        assert_eq!(weight.weight_of(2), 0.0);

        let sum: f64 = influences.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let skeleton = chain();
        let vertices: Vec<Point3d> = (0..40)
            .map(|i| {
                let t = i as f64 * 0.1;
                Point3d::new(t - 0.5, (t * 1.7).sin(), (t * 0.3).cos())
            })
            .collect();
        for policy in [WeightPolicy::NearestBone, WeightPolicy::TwoNearestBones] {
            let table = compute_weights(&vertices, &skeleton, policy, &config()).unwrap();
            assert_eq!(table.vertex_count(), vertices.len());
            for i in 0..vertices.len() {
                let row = table.dense_row(i).unwrap();
                let sum: f64 = row.iter().sum();
                assert!((sum - 1.0).abs() < 1e-12);
                let nonzero = row.iter().filter(|w| **w > 0.0).count();
                match policy {
                    WeightPolicy::NearestBone => assert_eq!(nonzero, 1),
                    WeightPolicy::TwoNearestBones => assert_eq!(nonzero, 2),
                }
            }
        }
    }

    #[test]
    fn test_vertex_on_bone_is_clamped() {
        let skeleton = chain();
        // 正好落在骨骼 b 上，同时是骨骼 a 的末端
        let vertex = Point3d::new(1.0, 0.0, 0.0);
        let table =
            compute_weights(&[vertex], &skeleton, WeightPolicy::TwoNearestBones, &config())
                .unwrap();
        for (_, w) in table.get(0).unwrap().influences() {
            assert!(w.is_finite());
        }
        let row = table.dense_row(0).unwrap();
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        // 两根骨骼距离都被钳制，平分权重
        assert!((row[0] - 0.5).abs() < 1e-12);
        assert!((row[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_distant_vertex_has_finite_weights() {
        let skeleton = parallel_bones();
        let vertices = [
            Point3d::new(1e160, 0.0, 0.0),
            Point3d::new(0.0, -1e200, 3e180),
            Point3d::new(1.0, f64::INFINITY, 0.0),
        ];
        let table = compute_weights(&vertices, &skeleton, WeightPolicy::TwoNearestBones, &config())
            .unwrap();
        for i in 0..vertices.len() {
            let row = table.dense_row(i).unwrap();
            assert!(row.iter().all(|w| w.is_finite()), "{:?}", row);
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        // 远处两根骨骼距离几乎相同
        let row = table.dense_row(0).unwrap();
        assert!((row[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unbuilt_skeleton_is_rejected() {
        let mut skeleton = parallel_bones();
        skeleton.add_bone(Bone::new("late"));
        let result = compute_weights(
            &[Point3d::ORIGIN],
            &skeleton,
            WeightPolicy::NearestBone,
            &config(),
        );
        assert!(matches!(result, Err(SkinError::InvalidHierarchy(_))));
    }

    #[test]
    fn test_single_bone_skeleton_two_bone_policy() {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("only").with_tail(Point3d::new(0.0, 1.0, 0.0)));
        skeleton.build_hierarchy().unwrap();
        let table = compute_weights(
            &[Point3d::new(3.0, 0.0, 0.0)],
            &skeleton,
            WeightPolicy::TwoNearestBones,
            &config(),
        )
        .unwrap();
        assert_eq!(table.get(0), Some(&VertexWeight::Single { bone: 0 }));
    }

    #[test]
    fn test_no_bones() {
        let skeleton = Skeleton::new();
        let result = compute_weights(
            &[Point3d::ORIGIN],
            &skeleton,
            WeightPolicy::NearestBone,
            &config(),
        );
        assert!(matches!(result, Err(SkinError::NoBones)));
    }

    #[test]
    fn test_deterministic_and_parallel_agree() {
        let skeleton = chain();
        let vertices: Vec<Point3d> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.017;
                Point3d::new(t * 1.5 - 0.2, (t * 5.0).sin() * 0.4, (t * 3.0).cos() * 0.4)
            })
            .collect();
        let serial = config();
        let parallel = SkinningConfig {
            parallel: true,
            ..SkinningConfig::default()
        };
        for policy in [WeightPolicy::NearestBone, WeightPolicy::TwoNearestBones] {
            let first = compute_weights(&vertices, &skeleton, policy, &serial).unwrap();
            let second = compute_weights(&vertices, &skeleton, policy, &serial).unwrap();
            let third = compute_weights(&vertices, &skeleton, policy, &parallel).unwrap();
            assert_eq!(first, second);
            assert_eq!(first, third);
        }
    }
}
