//! Generate `include/pipl_ffi.h` from the `extern "C"` surface.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {e}");
            return;
        }
    };

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("PIPL_FFI_H".to_string()),
        ..Default::default()
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(crate_dir.join("include").join("pipl_ffi.h"));
        }
        Err(e) => println!("cargo:warning=header generation skipped: {e}"),
    }
}
