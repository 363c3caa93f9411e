//! Loading of scene text files: fetch, parse, and hand the result to scene
//! assembly. Parsing itself never touches the filesystem or the network.

use anyhow::Context as _;

use crate::data_structures::{light::SceneLighting, scene::Scene};

pub mod material;
pub mod mesh;
mod record;

use material::MaterialLibrary;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("no location origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

/// Reads `file_name` below the asset root.
pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(txt)
}

/// Resolves a library name from an `mtllib` record against the mesh file's directory.
fn sibling(mesh_file: &str, name: &str) -> String {
    match mesh_file.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{name}"),
        None => name.to_string(),
    }
}

/// Never fails: a missing or broken library only costs its materials.
pub async fn load_material_library(file_name: &str) -> MaterialLibrary {
    let text = match load_string(file_name).await {
        Ok(text) => text,
        Err(err) => {
            log::warn!("material library {file_name} unavailable, using defaults: {err:#}");
            return MaterialLibrary::new();
        }
    };
    match material::parse_mtl(&text) {
        Ok(materials) => {
            log::info!("loaded {} materials from {file_name}", materials.len());
            materials
        }
        Err(err) => {
            log::warn!("material library {file_name} is malformed, using defaults: {err}");
            MaterialLibrary::new()
        }
    }
}

/// Loads a mesh file and every material library it references, then assembles the scene.
///
/// A malformed mesh aborts the load; the [`ParseError`](crate::error::ParseError)
/// can be recovered with `downcast_ref`.
pub async fn load_scene(file_name: &str) -> anyhow::Result<Scene> {
    let text = load_string(file_name).await?;
    let document = mesh::parse_obj(&text)
        .with_context(|| format!("failed to parse mesh {file_name}"))?;

    let libraries = futures::future::join_all(
        document
            .material_libs
            .iter()
            .map(|lib| sibling(file_name, lib))
            .map(|path| async move { load_material_library(&path).await }),
    )
    .await;

    let mut materials = MaterialLibrary::new();
    for library in libraries {
        materials.extend(library);
    }

    Ok(Scene::assemble(
        document,
        materials,
        SceneLighting::default(),
    ))
}
