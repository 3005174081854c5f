//! Selects the `AtomicPointer` backend for the target being compiled.
//!
//! The outcome is passed to the library as `cfg` flags. A target without any usable backend
//! fails the build here rather than compiling into something without ordering guarantees.

use std::env;
use std::error::Error;
use std::process::ExitCode;

#[allow(dead_code)]
#[path = "src/select.rs"]
mod select;

use select::{configure, BACKEND_VAR};

fn main() -> ExitCode {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/select.rs");
    println!("cargo:rerun-if-env-changed={BACKEND_VAR}");
    println!("cargo:rustc-check-cfg=cfg(atomic_pointer_backend, values(\"fence\", \"native\"))");
    println!("cargo:rustc-check-cfg=cfg(atomic_pointer_fence, values(\"compiler\", \"hardware\"))");

    // Every failure of `configure` is covered by `select::test::configure_fails_without_backend`.
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("cargo:warning={e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    // Non-UTF-8 values are kept lossily so that they fail to parse instead of being ignored.
    let selection = configure(|name| {
        env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    })?;
    for (key, value) in selection.backend.cfgs() {
        println!("cargo:rustc-cfg={key}=\"{value}\"");
    }
    if selection.explicit {
        println!(
            "cargo:warning=AtomicPointer backend: {} ({:?})",
            selection.backend, selection.preference
        );
    }
    Ok(())
}
