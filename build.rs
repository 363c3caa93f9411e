use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::{Path, PathBuf};

/// Mirrors `assets/` next to the built binaries so `broadside-headless` finds
/// the bundled scene when started from the target directory.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    if !manifest_dir.join("assets").exists() {
        return Ok(());
    }

    // OUT_DIR is target/<profile>/build/<pkg>-<hash>/out
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let profile_dir = out_dir
        .ancestors()
        .nth(3)
        .map(Path::to_path_buf)
        .unwrap_or(out_dir);

    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[manifest_dir.join("assets")], profile_dir, &copy_options)?;

    Ok(())
}
