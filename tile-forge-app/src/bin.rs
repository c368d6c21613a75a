//! # Tile Forge (Binary)
//!
//! Main executable entry point.

fn main() {
    if let Err(e) = tile_forge_app::main() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
