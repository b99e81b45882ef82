//! The frame pump: owns the render surface and sequences
//! sync → render → blit once per iteration, unconditionally.
//!
//! Setup order matters: the GPU renderer is built *before* the terminal
//! session so adapter/shader failures print to a normal screen instead of
//! a half-initialised alternate screen.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use blitter::{RenderSurface, SessionEvent, TerminalSession};
use renderer::{FrameRenderer, FrameUniforms, PatternRenderer, ShaderRenderer};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::settings::Settings;
use crate::telemetry::FpsCounter;
use crate::view::ViewState;

pub fn initialise_tracing() {
    let default_filter = "warn,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error";
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // stdout belongs to the blitter; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let mode = match cli.mode {
        Some(mode) => mode,
        None => settings.blit_mode()?,
    };
    let fps_cap = match cli.fps {
        Some(fps) if fps > 0.0 => Some(fps),
        Some(_) => None,
        None => settings.fps_cap(),
    };
    let mut stats = settings.stats && !cli.no_stats;

    let mut frame_renderer: Box<dyn FrameRenderer> = if cli.cpu {
        Box::new(PatternRenderer::new())
    } else {
        Box::new(ShaderRenderer::new(cli.shader.as_deref())?)
    };

    let mut session = TerminalSession::new().context("failed to initialise terminal session")?;
    let mut surface = RenderSurface::new(mode, settings.cell_aspect);
    let mut view = ViewState::new(settings.zoom_step, settings.pan_step);
    let mut uniforms = FrameUniforms::new(0, 0);
    let start = Instant::now();
    let mut telemetry = FpsCounter::new(start);
    let mut frame_index: u64 = 0;

    tracing::info!(%mode, cpu = cli.cpu, "starting frame pump");

    loop {
        let frame_start = Instant::now();

        // Drain pending input first so a mode switch lands before this
        // frame's size resolution.
        while let Some(event) = poll_input(&mut session) {
            match event {
                SessionEvent::Pan { dx, dy } => view.pan(dx, dy),
                SessionEvent::ZoomIn => view.zoom_in(),
                SessionEvent::ZoomOut => view.zoom_out(),
                SessionEvent::CycleMode => surface.set_mode(surface.mode().next()),
                SessionEvent::ToggleStats => stats = !stats,
                SessionEvent::Resized => {}
                SessionEvent::Quit => return Ok(()),
            }
        }

        // sync → render → blit, in order, every iteration.
        let (cols, rows) = session.cell_grid()?;
        if surface.sync(cols, rows) {
            frame_renderer
                .resize_target(surface.width(), surface.height())
                .context("failed to resize render target")?;
            uniforms.set_resolution(surface.width(), surface.height());
        }

        let seconds = cli
            .still
            .unwrap_or_else(|| frame_start.duration_since(start).as_secs_f32());
        uniforms.set_time(seconds, frame_index);
        uniforms.set_view(surface.aspect(), view.zoom());
        uniforms.set_offset(view.offset()[0], view.offset()[1]);

        frame_renderer
            .render(&uniforms, surface.pixels_mut())
            .context("frame render failed")?;

        let overlay = stats_line(stats, &telemetry, &surface, &view);
        session
            .submit_frame(surface.view(), overlay.as_deref())
            .context("failed to blit frame to terminal")?;

        frame_index = frame_index.wrapping_add(1);
        telemetry.frame(Instant::now());

        if cli.still.is_some() {
            hold_still_frame(&mut session)?;
            return Ok(());
        }

        if let Some(cap) = fps_cap {
            let budget = Duration::from_secs_f32(1.0 / cap);
            let elapsed = frame_start.elapsed();
            if elapsed < budget {
                thread::sleep(budget - elapsed);
            }
        }
    }
}

/// Input polling is the one non-fatal tier: a failed poll is logged and
/// treated as "no input this tick".
fn poll_input(session: &mut TerminalSession) -> Option<SessionEvent> {
    match session.poll_input() {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "input poll failed");
            None
        }
    }
}

fn stats_line(
    stats: bool,
    telemetry: &FpsCounter,
    surface: &RenderSurface,
    view: &ViewState,
) -> Option<String> {
    if !stats {
        return None;
    }
    let fps = telemetry
        .fps()
        .map(|fps| format!("{fps:>5.1}"))
        .unwrap_or_else(|| "  ---".to_string());
    Some(format!(
        " {fps} fps | {} {}x{} | zoom {:.2} ",
        surface.mode(),
        surface.width(),
        surface.height(),
        view.zoom()
    ))
}

/// Still mode: hold the rendered frame until any mapped key arrives.
fn hold_still_frame(session: &mut TerminalSession) -> Result<()> {
    loop {
        if session.poll_input()?.is_some() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(30));
    }
}
