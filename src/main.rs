//! # Voxel Sandbox Application Entry Point
//!
//! This is the main entry point for the native application. It simply
//! calls into the library's `run()` function to initialize and start the
//! sandbox.
//!
//! For web applications, see the `run_web()` function in the library.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! ```

fn main() {
    #[cfg(not(target_family = "wasm"))]
    voxel_sandbox::run();
}
