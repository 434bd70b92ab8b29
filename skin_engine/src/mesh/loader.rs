//! OBJ 网格加载器
//!
//! 只读取 `v` 和 `f` 行，多边形按扇形拆成三角形。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::math::Point3d;
use crate::{Result, SkinError};

use super::{Triangle, TriangleMesh};

/// 从 OBJ 文件加载网格
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mesh = parse_obj(BufReader::new(file), &path.to_string_lossy())?;
    mesh.log_summary();
    Ok(mesh)
}

/// 从任意文本源解析 OBJ
pub fn parse_obj<R: BufRead>(reader: R, name: &str) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::new(name);
    // 三角形及其所在行号，全部读完后再检查索引范围
    let mut faces: Vec<([i64; 3], usize)> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&line_type) = words.first() else {
            continue;
        };

        match line_type {
            "v" => {
                if words.len() < 4 {
                    return Err(parse_error(line_no, "vertex needs 3 coordinates"));
                }
                let x = parse_coord(words[1], line_no)?;
                let y = parse_coord(words[2], line_no)?;
                let z = parse_coord(words[3], line_no)?;
                mesh.vertices.push(Point3d::new(x, y, z));
            }
            "f" => {
                let n = words.len() - 1;
                if n < 3 {
                    return Err(parse_error(line_no, "face needs at least 3 vertices"));
                }
                let indices = words[1..]
                    .iter()
                    .map(|w| parse_index(w, mesh.vertices.len(), line_no))
                    .collect::<Result<Vec<i64>>>()?;
                for k in 0..n - 2 {
                    faces.push(([indices[0], indices[k + 1], indices[k + 2]], line_no));
                }
            }
            // 其他行类型不处理
            _ => continue,
        }
    }

    let vertex_count = mesh.vertices.len() as i64;
    for (indices, line_no) in faces {
        if let Some(bad) = indices.iter().find(|&&idx| idx < 0 || idx >= vertex_count) {
            return Err(parse_error(
                line_no,
                &format!("vertex index {} out of range ({} vertices)", bad + 1, vertex_count),
            ));
        }
        mesh.triangles.push(Triangle::new(
            indices[0] as u32,
            indices[1] as u32,
            indices[2] as u32,
        ));
    }

    Ok(mesh)
}

fn parse_error(line: usize, message: &str) -> SkinError {
    SkinError::ObjParse {
        line,
        message: message.to_string(),
    }
}

fn parse_coord(word: &str, line_no: usize) -> Result<f64> {
    word.parse::<f64>()
        .map_err(|_| parse_error(line_no, &format!("invalid coordinate '{}'", word)))
}

/// 解析面索引（`v`、`v/vt`、`v//vn`、`v/vt/vn`），返回 0 起始的索引
///
/// OBJ 索引从 1 开始，负数表示相对于当前已读顶点的倒数位置。
fn parse_index(word: &str, vertex_count: usize, line_no: usize) -> Result<i64> {
    let first = word.split('/').next().unwrap_or_default();
    let idx: i64 = first
        .parse()
        .map_err(|_| parse_error(line_no, &format!("invalid vertex index '{}'", word)))?;
    match idx {
        0 => Err(parse_error(line_no, "vertex index 0 is not allowed")),
        i if i > 0 => Ok(i - 1),
        i => Ok(vertex_count as i64 + i),
    }
}
