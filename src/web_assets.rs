//! Static resources compiled into the binary.
//!
//! Both files are pulled in via `include_str!`, so `build` and `serve` work
//! from any directory without shipping anything next to the executable.

/// Stylesheet for the generated page. Inlined into a `<style>` element after
/// the edition's `:root` palette block.
///
/// Loaded from `src/assets/page.css` at compile time.
pub const CSS: &str = include_str!("assets/page.css");

/// The 2025 edition, used when no `--config` file is given.
pub const DEFAULT_EDITION: &str = include_str!("assets/edition-2025.yaml");
