use std::{env, path::PathBuf};

fn main() {
    println!("cargo:rustc-env=DEFAULT_RPC_URL=http://127.0.0.1:8545");

    let manifest_dir = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .expect("cargo sets CARGO_MANIFEST_DIR for build scripts");
    let artifacts = manifest_dir.join("../build/contracts");
    println!("cargo:rustc-env=DEFAULT_LEASE_ARTIFACTS={}", artifacts.display());

    println!("cargo:rerun-if-changed=build.rs");
}
