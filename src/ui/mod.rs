//! Presentation layer: view models, palettes and the text renderer.
//!
//! # Modules
//!
//! - `viewmodel`: display-ready list and detail view models
//! - `theme`: per-theme color palettes and ANSI helpers
//! - `renderer`: writes view models to any `io::Write`

pub mod renderer;
pub mod theme;
pub mod viewmodel;

pub use renderer::Renderer;
pub use theme::{Palette, PaletteColors};
pub use viewmodel::{DetailViewModel, ListViewModel};
