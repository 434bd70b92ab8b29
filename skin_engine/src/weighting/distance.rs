//! 点到线段距离

use crate::math::Point3d;

/// 顶点在线段 [head, tail] 上的最近点
///
/// 投影参数被钳制到 [0, 1]：c1 <= 0 取起点，c2 <= c1 取末端。
/// 零长度线段落入第二个分支，退化为点到点距离。
pub fn closest_point(head: Point3d, tail: Point3d, vertex: Point3d) -> Point3d {
    let v = tail - head;
    let w = vertex - head;

    let c1 = w.dot(v);
    if c1 <= 0.0 {
        return head;
    }
    let c2 = v.dot(v);
    if c2 <= c1 {
        return tail;
    }

    Point3d::offset_from(head, v, c1 / c2)
}

/// 顶点到骨骼线段的最近距离
pub fn closest_distance(head: Point3d, tail: Point3d, vertex: Point3d) -> f64 {
    vertex.distance_to(closest_point(head, tail, vertex))
}
