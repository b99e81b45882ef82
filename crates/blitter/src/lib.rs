//! Terminal blitting for GPU-produced RGBA frames.
//!
//! The crate owns the path from a pixel buffer to glyphs on screen:
//!
//! ```text
//!   cell grid ──▶ resolve() ──▶ RenderSurface (owned RGBA buffer)
//!                                      │ FrameView
//!                                      ▼
//!   TerminalSession::submit_frame ──▶ pack_cell() per cell ──▶ stdout
//! ```
//!
//! [`BlitMode`] selects how many source pixels one character cell covers
//! (half blocks, quadrants, sextants, braille dots), [`RenderSurface`]
//! keeps the buffer sized to the live terminal, and [`TerminalSession`]
//! wraps the raw-mode/alternate-screen lifetime plus non-blocking input.

mod glyph;
mod mode;
mod session;
mod surface;

pub use glyph::{pack_cell, CellGlyph, Rgb};
pub use mode::BlitMode;
pub use session::{SessionError, SessionEvent, TerminalSession};
pub use surface::{resolve, FrameView, RenderSurface, Resolution};
