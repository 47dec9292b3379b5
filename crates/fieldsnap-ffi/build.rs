//! Generates `include/fieldsnap.h` from the exported C API.

use std::env;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    if let Err(message) = write_header(&crate_dir) {
        // The Rust library is still usable without the header.
        println!("cargo:warning=fieldsnap.h not generated: {message}");
    }
}

fn write_header(crate_dir: &Path) -> Result<(), String> {
    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))?;
    let include = crate_dir.join("include");
    std::fs::create_dir_all(&include).map_err(|e| format!("{}: {e}", include.display()))?;
    let bindings = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()
        .map_err(|e| e.to_string())?;
    bindings.write_to_file(include.join("fieldsnap.h"));
    Ok(())
}
