use std::collections::HashMap;

use crate::{data_structures::model::Material, error::ParseError, resources::record::records};

/// Materials keyed by name. Later definitions with the same name win.
pub type MaterialLibrary = HashMap<String, Material>;

/// Parses the MTL subset used by the scene assets.
///
/// Property records that appear before the first `newmtl` are ignored, as are
/// unknown record types. A `map_Ns` roughness map is only consulted to guess a
/// diffuse map when none has been declared yet.
pub fn parse_mtl(text: &str) -> Result<MaterialLibrary, ParseError> {
    let mut library = MaterialLibrary::new();
    let mut current: Option<Material> = None;

    for record in records(text) {
        match record.keyword {
            "newmtl" => {
                if let Some(done) = current.take() {
                    library.insert(done.name.clone(), done);
                }
                current = Some(Material::new(record.name("material name")?));
            }
            "Kd" => {
                if let Some(material) = current.as_mut() {
                    material.diffuse = record.floats::<3>("diffuse color")?;
                }
            }
            "Ke" => {
                if let Some(material) = current.as_mut() {
                    material.emissive = record.floats::<3>("emissive color")?;
                }
            }
            "map_Kd" => {
                if let Some(material) = current.as_mut() {
                    material.diffuse_map = Some(record.name("texture path")?.to_string());
                }
            }
            "map_Ns" => {
                if let Some(material) = current.as_mut()
                    && material.diffuse_map.is_none()
                {
                    material.diffuse_map = infer_diffuse_map(record.name("texture path")?);
                }
            }
            _ => {}
        }
    }
    if let Some(done) = current {
        library.insert(done.name.clone(), done);
    }
    Ok(library)
}

/// `wood\wood_roughness_1k.jpg` -> `wood/wood_color_1k.jpg`
///
/// Only the first occurrence of `roughness` is substituted.
fn infer_diffuse_map(roughness_map: &str) -> Option<String> {
    roughness_map
        .contains("roughness")
        .then(|| roughness_map.replacen("roughness", "color", 1).replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colors_and_maps() {
        let text = "\
# exported
newmtl hull
Kd 0.2 0.4 0.6
Ke 1 0.5 0
map_Kd textures/hull.png
newmtl plain
";
        let library = parse_mtl(text).unwrap();
        assert_eq!(library.len(), 2);
        let hull = &library["hull"];
        assert_eq!(hull.diffuse, [0.2, 0.4, 0.6]);
        assert_eq!(hull.emissive, [1.0, 0.5, 0.0]);
        assert_eq!(hull.diffuse_map.as_deref(), Some("textures/hull.png"));

        let plain = &library["plain"];
        assert_eq!(plain.diffuse, [1.0, 1.0, 1.0]);
        assert_eq!(plain.emissive, [0.0, 0.0, 0.0]);
        assert_eq!(plain.diffuse_map, None);
    }

    #[test]
    fn roughness_map_infers_color_map() {
        let text = "newmtl wood\nmap_Ns wood_0038_1k\\wood_0038_roughness_1k.jpg\n";
        let library = parse_mtl(text).unwrap();
        assert_eq!(
            library["wood"].diffuse_map.as_deref(),
            Some("wood_0038_1k/wood_0038_color_1k.jpg")
        );
    }

    #[test]
    fn roughness_map_never_overrides_explicit_map() {
        let text = "newmtl a\nmap_Kd a.png\nmap_Ns a_roughness.png\n";
        let library = parse_mtl(text).unwrap();
        assert_eq!(library["a"].diffuse_map.as_deref(), Some("a.png"));
    }

    #[test]
    fn explicit_map_after_inference_wins() {
        let text = "newmtl a\nmap_Ns a_roughness.png\nmap_Kd a.png\n";
        let library = parse_mtl(text).unwrap();
        assert_eq!(library["a"].diffuse_map.as_deref(), Some("a.png"));
    }

    #[test]
    fn roughness_map_without_marker_is_ignored() {
        let text = "newmtl a\nmap_Ns a_gloss.png\n";
        let library = parse_mtl(text).unwrap();
        assert_eq!(library["a"].diffuse_map, None);
    }

    #[test]
    fn records_before_newmtl_and_unknown_records_are_ignored() {
        let text = "Kd 0 0 0\nnewmtl a\nNs 250\nillum 2\nKd 0.5 0.5 0.5\n";
        let library = parse_mtl(text).unwrap();
        assert_eq!(library["a"].diffuse, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn malformed_color_is_an_error() {
        let err = parse_mtl("newmtl a\nKd 1 red 0\n").unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn empty_document_is_empty_library() {
        assert!(parse_mtl("").unwrap().is_empty());
    }
}
