//! Command: print version information.

/// Version string: the release tag when built by CI, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("ADT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the adt version to stdout.
pub fn run() {
    println!("adt {}", version());
}
