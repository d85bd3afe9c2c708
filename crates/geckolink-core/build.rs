//! Build script for geckolink-core
//!
//! Checks the minimum supported Rust version before compilation.

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    match rustc_version::version() {
        Ok(version) => {
            let minimum = rustc_version::Version::new(1, 74, 0);
            if version < minimum {
                panic!("geckolink-core requires Rust {minimum} or newer, found {version}");
            }
        }
        Err(_) => {
            // Some build environments hide rustc; do not fail the build for it.
            println!("cargo:warning=could not verify Rust version");
        }
    }
}
