//! OpenGL ES backend for the triangle renderer.
//!
//! [`GlowContext`] implements [`GraphicsContext`] on top of a [`glow`]
//! context created by the host (an EGL surface on Android, or any desktop
//! loader). The host keeps ownership of the surface and its lifecycle.
//!
//! # Invariants
//! - The wrapped context is current on the thread that built the
//!   `GlowContext`, and stays there: the type is neither `Send` nor `Sync`.

mod context;

pub use context::GlowContext;
