//! 功能元件模組

pub mod slideshow;

pub use slideshow::Slideshow;
