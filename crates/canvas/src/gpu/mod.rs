//! wgpu implementation of the canvas graphics backend.
//!
//! - `context` owns instance, device and swapchain wiring.
//! - `pipeline` turns prepared GLSL into modules and strip pipelines.
//! - `blit` scales the offscreen backing texture onto the swapchain.
//! - `state` maps GL-style object names onto wgpu resources.

mod blit;
mod context;
mod pipeline;
mod state;

pub use state::{WgpuBackend, WgpuContextSource};
