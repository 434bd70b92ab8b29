//! 三角网格
//!
//! 顶点位置和三角形索引直接公开，修改后重新调用 `compute_normals` 即可。

mod loader;

pub use loader::{load_obj, parse_obj};

use crate::math::{Point3d, Vector3d};

/// 三角形（三个顶点索引）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Triangle {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.a as usize, self.b as usize, self.c as usize]
    }
}

/// 三角网格
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub name: String,
    pub vertices: Vec<Point3d>,
    pub normals: Vec<Vector3d>,
    pub triangles: Vec<Triangle>,
}

impl TriangleMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_parts(
        name: impl Into<String>,
        vertices: Vec<Point3d>,
        triangles: Vec<Triangle>,
    ) -> Self {
        Self {
            name: name.into(),
            vertices,
            normals: Vec::new(),
            triangles,
        }
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// 获取三角形数量
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// 计算顶点法线：每个相邻面的单位法线累加后单位化
    ///
    /// 索引越界的三角形被跳过。
    pub fn compute_normals(&mut self) {
        let n = self.vertices.len();
        self.normals.clear();
        self.normals.resize(n, Vector3d::ZERO);

        for triangle in &self.triangles {
            let [ia, ib, ic] = triangle.indices();
            if ia >= n || ib >= n || ic >= n {
                continue;
            }
            let a = self.vertices[ia];
            let u = self.vertices[ib] - a;
            let v = self.vertices[ic] - a;

            let mut face = u.cross(v);
            let length = face.length();
            if length > 0.0 {
                face /= length;
            }

            self.normals[ia] += face;
            self.normals[ib] += face;
            self.normals[ic] += face;
        }

        for normal in &mut self.normals {
            let length = normal.length();
            if length > 0.0 {
                *normal /= length;
            }
        }
    }

    /// 包围盒 (min, max)，空网格返回 None
    pub fn bounding_box(&self) -> Option<(Point3d, Point3d)> {
        let first = *self.vertices.first()?;
        let (mut min, mut max) = (first, first);
        for p in &self.vertices[1..] {
            min = Point3d::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3d::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some((min, max))
    }

    /// 平移包围盒最小点到原点，并把最长边缩放到 new_size
    pub fn normalize(&mut self, new_size: f64) {
        let Some((min, max)) = self.bounding_box() else {
            return;
        };
        let extent = max - min;
        let max_len = extent.x.max(extent.y).max(extent.z);
        if max_len == 0.0 {
            return;
        }
        let scale = new_size / max_len;
        log::debug!("Normalize mesh {}: max_len={}, scale={}", self.name, max_len, scale);

        for p in &mut self.vertices {
            *p = ((*p - min) * scale).to_point();
        }
    }

    /// 输出网格概要；顶点不超过 50 个时逐个输出
    pub fn log_summary(&self) {
        log::info!(
            "Mesh {}: {} vertices, {} triangles",
            self.name,
            self.vertex_count(),
            self.triangle_count()
        );
        if self.vertex_count() > 50 {
            return;
        }
        for (i, v) in self.vertices.iter().enumerate() {
            log::debug!("vertex {}: {:6.3} {:6.3} {:6.3}", i, v.x, v.y, v.z);
        }
        for (j, t) in self.triangles.iter().enumerate() {
            log::debug!("face {}: {} {} {}", j, t.a, t.b, t.c);
        }
    }
}
