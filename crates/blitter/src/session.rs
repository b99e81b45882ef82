use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::glyph::{pack_cell, Rgb};
use crate::surface::FrameView;

/// Failures from the terminal layer. Callers treat blit failures as fatal;
/// a failed input poll is the one recoverable case (next tick retries).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Input decoded from the terminal, already mapped to viewer intent so the
/// frame pump never sees raw key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Arrow-key pan, in unit steps (`dx` right, `dy` down).
    Pan { dx: i32, dy: i32 },
    ZoomIn,
    ZoomOut,
    CycleMode,
    ToggleStats,
    /// The terminal reported a resize. Purely advisory: the pump re-queries
    /// the grid every frame anyway.
    Resized,
    Quit,
}

/// RAII terminal session: raw mode, alternate screen, hidden cursor, and
/// mouse capture are entered on construction and restored on drop, so the
/// terminal is handed back on every exit path including `?` propagation
/// and panics.
pub struct TerminalSession {
    out: BufWriter<Stdout>,
}

impl TerminalSession {
    pub fn new() -> Result<Self, SessionError> {
        terminal::enable_raw_mode()?;
        let mut out = BufWriter::with_capacity(1 << 20, io::stdout());
        if let Err(err) = execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableMouseCapture
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(err.into());
        }
        Ok(Self { out })
    }

    /// Current terminal size as `(cols, rows)`.
    pub fn cell_grid(&self) -> Result<(u16, u16), SessionError> {
        Ok(terminal::size()?)
    }

    /// Non-blocking input poll; `None` means no input this tick.
    pub fn poll_input(&mut self) -> Result<Option<SessionEvent>, SessionError> {
        if !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
        Ok(map_event(event::read()?))
    }

    /// Packs the frame into glyphs and writes it to the terminal in one
    /// buffered flush. The optional overlay line is drawn over the top-left
    /// corner after the frame.
    pub fn submit_frame(
        &mut self,
        frame: FrameView<'_>,
        overlay: Option<&str>,
    ) -> Result<(), SessionError> {
        let (x_mult, y_mult) = frame.mode.cell_pixels();
        let cell_cols = frame.width / x_mult;
        let cell_rows = frame.height / y_mult;
        let mut block = vec![Rgb::default(); (x_mult * y_mult) as usize];

        // Redundant SGR writes dominate frame cost, so colors are tracked
        // across the whole frame and only re-emitted on change.
        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;

        for cell_row in 0..cell_rows {
            queue!(self.out, cursor::MoveTo(0, cell_row as u16))?;
            for cell_col in 0..cell_cols {
                for dy in 0..y_mult {
                    for dx in 0..x_mult {
                        let x = cell_col * x_mult + dx;
                        let y = cell_row * y_mult + dy;
                        block[(dy * x_mult + dx) as usize] = pixel_at(&frame, x, y);
                    }
                }
                let cell = pack_cell(frame.mode, &block);
                if last_fg != Some(cell.fg) {
                    queue!(
                        self.out,
                        style::SetForegroundColor(style::Color::Rgb {
                            r: cell.fg.r,
                            g: cell.fg.g,
                            b: cell.fg.b,
                        })
                    )?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(
                        self.out,
                        style::SetBackgroundColor(style::Color::Rgb {
                            r: cell.bg.r,
                            g: cell.bg.g,
                            b: cell.bg.b,
                        })
                    )?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.out, style::Print(cell.glyph))?;
            }
        }

        if let Some(text) = overlay {
            queue!(
                self.out,
                cursor::MoveTo(0, 0),
                style::SetForegroundColor(style::Color::White),
                style::SetBackgroundColor(style::Color::Black),
                style::Print(text)
            )?;
        }

        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let restore = execute!(
            self.out,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            style::ResetColor
        )
        .and_then(|_| terminal::disable_raw_mode());
        if let Err(err) = restore {
            tracing::warn!(error = %err, "failed to restore terminal state");
        }
    }
}

fn pixel_at(frame: &FrameView<'_>, x: u32, y: u32) -> Rgb {
    let offset = (y * frame.row_stride_bytes + x * 4) as usize;
    Rgb::new(
        frame.pixels[offset],
        frame.pixels[offset + 1],
        frame.pixels[offset + 2],
    )
}

fn map_event(event: Event) -> Option<SessionEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(_, _) => Some(SessionEvent::Resized),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<SessionEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(SessionEvent::Quit);
    }
    match key.code {
        KeyCode::Up => Some(SessionEvent::Pan { dx: 0, dy: -1 }),
        KeyCode::Down => Some(SessionEvent::Pan { dx: 0, dy: 1 }),
        KeyCode::Left => Some(SessionEvent::Pan { dx: -1, dy: 0 }),
        KeyCode::Right => Some(SessionEvent::Pan { dx: 1, dy: 0 }),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(SessionEvent::ZoomIn),
        KeyCode::Char('-') => Some(SessionEvent::ZoomOut),
        KeyCode::Char('b') => Some(SessionEvent::CycleMode),
        KeyCode::Char('s') => Some(SessionEvent::ToggleStats),
        KeyCode::Char('q') | KeyCode::Esc => Some(SessionEvent::Quit),
        _ => None,
    }
}

fn map_mouse(mouse: MouseEvent) -> Option<SessionEvent> {
    match mouse.kind {
        MouseEventKind::ScrollUp => Some(SessionEvent::ZoomIn),
        MouseEventKind::ScrollDown => Some(SessionEvent::ZoomOut),
        _ => None,
    }
}
