//! Scrawl Render Library
//!
//! Renderer abstraction and implementations for the Scrawl whiteboard.
//! The default implementation uses Vello for GPU-accelerated rendering.

pub mod display_list;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use display_list::{DisplayList, DrawItem, Primitive, build_display_list};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, ShapeRenderer};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::{PngRenderResult, VelloRenderer};
