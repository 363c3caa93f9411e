use std::collections::HashMap;

use crate::{
    data_structures::model::{
        DEFAULT_NAME, DEFAULT_NORMAL, DEFAULT_TEX_COORDS, GeometryBatch, MeshDocument, ModelVertex,
    },
    error::ParseError,
    resources::record::{Record, records},
};

/// Raw `(position, texcoord, normal)` indices exactly as written in a face
/// reference. `0` means the sub-index was absent.
type VertexKey = (i64, i64, i64);

/**
 * Parses the subset of the OBJ format this pipeline relies on.
 *
 * Faces are fan-triangulated and every distinct `pos/tex/norm` triple becomes
 * exactly one slot in the vertex pool. A new batch opens whenever the active
 * material or object name differs from the current batch.
 */
pub fn parse_obj(text: &str) -> Result<MeshDocument, ParseError> {
    let mut parser = ObjParser::default();
    for record in records(text) {
        parser.record(&record)?;
    }
    Ok(parser.finish())
}

struct ObjParser {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    vertices: Vec<ModelVertex>,
    lookup: HashMap<VertexKey, u32>,
    batches: Vec<GeometryBatch>,
    material_libs: Vec<String>,
    object_name: String,
    material: String,
    // scratch for the current face, reused between faces
    face: Vec<u32>,
}

impl Default for ObjParser {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            vertices: Vec::new(),
            lookup: HashMap::new(),
            batches: Vec::new(),
            material_libs: Vec::new(),
            object_name: DEFAULT_NAME.to_string(),
            material: DEFAULT_NAME.to_string(),
            face: Vec::new(),
        }
    }
}

impl ObjParser {
    fn record(&mut self, record: &Record) -> Result<(), ParseError> {
        match record.keyword {
            "v" => self.positions.push(record.floats::<3>("position")?),
            "vn" => self.normals.push(record.floats::<3>("normal")?),
            // `v` is optional
            "vt" => {
                let uv = record.padded_floats::<2>(1, "texture coordinate")?;
                self.tex_coords.push(uv);
            }
            "mtllib" => {
                let name = record.name("library name")?;
                self.material_libs.push(name.to_string());
            }
            "o" => self.object_name = record.name("object name")?.to_string(),
            "usemtl" => {
                self.material = record.name("material name")?.to_string();
                self.ensure_batch();
            }
            "f" => self.face(record)?,
            _ => {}
        }
        Ok(())
    }

    fn ensure_batch(&mut self) {
        let reuse = self.batches.last().is_some_and(|batch| {
            batch.material == self.material && batch.object_name == self.object_name
        });
        if !reuse {
            let batch = GeometryBatch::new(&self.material, &self.object_name);
            self.batches.push(batch);
        }
    }

    fn face(&mut self, record: &Record) -> Result<(), ParseError> {
        self.ensure_batch();

        let mut face = std::mem::take(&mut self.face);
        face.clear();
        for reference in &record.args {
            let key = parse_reference(reference, record)?;
            face.push(self.resolve(key, record)?);
        }

        if let Some(batch) = self.batches.last_mut() {
            for i in 1..face.len().saturating_sub(1) {
                let triangle = [face[0], face[i], face[i + 1]];
                batch.indices.extend_from_slice(&triangle);
            }
        }
        self.face = face;
        Ok(())
    }

    fn resolve(&mut self, key: VertexKey, record: &Record) -> Result<u32, ParseError> {
        if let Some(&idx) = self.lookup.get(&key) {
            return Ok(idx);
        }
        let (pos, tex, norm) = key;

        let Some(position) = lookup(&self.positions, pos) else {
            return Err(ParseError::FaceIndexOutOfRange {
                line: record.line,
                index: pos,
                available: self.positions.len(),
                text: record.text.to_string(),
            });
        };
        let normal = lookup(&self.normals, norm).unwrap_or(DEFAULT_NORMAL);
        let tex_coords = lookup(&self.tex_coords, tex)
            .map(|[u, v]| [u, 1.0 - v])
            .unwrap_or(DEFAULT_TEX_COORDS);

        let idx = self.vertices.len() as u32;
        self.vertices.push(ModelVertex {
            position,
            normal,
            tex_coords,
        });
        self.lookup.insert(key, idx);
        Ok(idx)
    }

    fn finish(self) -> MeshDocument {
        MeshDocument {
            vertices: self.vertices,
            batches: self.batches,
            material_libs: self.material_libs,
        }
    }
}

/// 1-based lookup; `0`, negative or past-the-end indices resolve to `None`.
fn lookup<T: Copy>(pool: &[T], index: i64) -> Option<T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| pool.get(i))
        .copied()
}

/// Splits `pos[/tex][/norm]`. Empty sub-indices count as absent.
fn parse_reference(reference: &str, record: &Record) -> Result<VertexKey, ParseError> {
    let malformed = || ParseError::MalformedFaceReference {
        line: record.line,
        reference: reference.to_string(),
        text: record.text.to_string(),
    };
    let mut parts = reference.split('/');
    let mut next = |required: bool| -> Result<i64, ParseError> {
        match parts.next() {
            Some("") | None if !required => Ok(0),
            Some(value) => value.parse().map_err(|_| malformed()),
            None => Err(malformed()),
        }
    };
    let pos = next(true)?;
    let tex = next(false)?;
    let norm = next(false)?;
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok((pos, tex, norm))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
o panel
usemtl wood
f 1 2 3 4
";

    #[test]
    fn quad_is_fan_triangulated() {
        let doc = parse_obj(QUAD).unwrap();
        assert_eq!(doc.batches.len(), 1);
        assert_eq!(doc.batches[0].indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(doc.batches[0].triangle_count(), 2);
    }

    #[test]
    fn pentagon_keeps_winding() {
        let text = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let doc = parse_obj(text).unwrap();
        assert_eq!(doc.batches[0].indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn identical_triples_share_a_slot() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
f 2/1/1 4/1/1 3/1/1
";
        let doc = parse_obj(text).unwrap();
        assert_eq!(doc.vertices.len(), 4);
        assert_eq!(doc.batches[0].indices, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn same_position_with_different_normal_is_distinct() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 0 -1
f 1//1 2//1 3//1
f 1//2 3//2 2//2
";
        let doc = parse_obj(text).unwrap();
        assert_eq!(doc.vertices.len(), 6);
    }

    #[test]
    fn missing_normal_and_texcoord_take_defaults() {
        let doc = parse_obj("v 1 2 3\nv 0 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(doc.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(doc.vertices[0].tex_coords, [0.0, 0.0]);
        assert_eq!(doc.vertices[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn texcoord_v_is_flipped() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25 0.25\nf 1/1 2/1 3/1\n";
        let doc = parse_obj(text).unwrap();
        assert_eq!(doc.vertices[0].tex_coords, [0.25, 0.75]);
    }

    #[test]
    fn single_component_texcoord_defaults_v() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5\nf 1/1 2/1 3/1\n";
        let doc = parse_obj(text).unwrap();
        // v defaults to 0, then flips
        assert_eq!(doc.vertices[0].tex_coords, [0.5, 1.0]);
        assert_eq!(doc.vertices.len(), 3);
        assert_eq!(doc.batches[0].triangle_count(), 1);
    }

    #[test]
    fn batches_split_on_object_or_material_change() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
o door.001
usemtl steel
f 1 2 3
f 1 2 3
o cannon.001
f 1 2 3
usemtl brass
f 1 2 3
";
        let doc = parse_obj(text).unwrap();
        let keys: Vec<_> = doc
            .batches
            .iter()
            .map(|b| (b.object_name.as_str(), b.material.as_str(), b.indices.len()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("door.001", "steel", 6),
                ("cannon.001", "steel", 3),
                ("cannon.001", "brass", 3),
            ]
        );
    }

    #[test]
    fn usemtl_opens_a_batch_before_any_face() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl a\no later\nf 1 2 3\n";
        let doc = parse_obj(text).unwrap();
        assert_eq!(doc.batches.len(), 2);
        assert!(doc.batches[0].indices.is_empty());
        assert_eq!(doc.batches[1].object_name, "later");
    }

    #[test]
    fn faces_without_names_use_defaults() {
        let doc = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(doc.batches[0].object_name, "_default");
        assert_eq!(doc.batches[0].material, "_default");
    }

    #[test]
    fn out_of_range_position_is_fatal() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::FaceIndexOutOfRange {
                line: 3,
                index: 3,
                available: 2,
                text: "f 1 2 3".into(),
            }
        );
    }

    #[test]
    fn zero_position_index_is_fatal() {
        let err = parse_obj("v 0 0 0\nf 0 1 1\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::FaceIndexOutOfRange { index: 0, .. }
        ));
    }

    #[test]
    fn garbage_reference_is_fatal() {
        let err = parse_obj("v 0 0 0\nf 1 x 1\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedFaceReference { line: 2, .. }
        ));
    }

    #[test]
    fn unknown_records_are_ignored() {
        let text = "s off\ng group\nv 0 0 0\nv 1 0 0\nv 0 1 0\nl 1 2\nf 1 2 3\n";
        let doc = parse_obj(text).unwrap();
        assert_eq!(doc.vertices.len(), 3);
    }

    #[test]
    fn material_libraries_are_collected() {
        let doc = parse_obj("mtllib scene.mtl\nmtllib extra.mtl\n").unwrap();
        assert_eq!(doc.material_libs, vec!["scene.mtl", "extra.mtl"]);
    }

    #[test]
    fn out_of_range_normal_falls_back_to_default() {
        let doc = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//7 2 3\n").unwrap();
        assert_eq!(doc.vertices[0].normal, DEFAULT_NORMAL);
    }
}
