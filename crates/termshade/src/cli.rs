use std::path::PathBuf;

use blitter::BlitMode;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "termshade",
    author,
    version,
    about = "GPU shader viewer for the terminal"
)]
pub struct Cli {
    /// WGSL fragment shader to render; defaults to the built-in ray marcher.
    #[arg(value_name = "SHADER")]
    pub shader: Option<PathBuf>,

    /// Blit mode: `single`, `halves`, `quadrants`, `sextants`, `braille`,
    /// or `pixels` (geometry aliases like `2x2` also work).
    #[arg(long, value_name = "MODE", value_parser = parse_mode)]
    pub mode: Option<BlitMode>,

    /// FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Render with the CPU pattern fill instead of the GPU.
    #[arg(long)]
    pub cpu: bool,

    /// Render one frame at the given timestamp, wait for a key, then exit.
    #[arg(long, value_name = "SECONDS")]
    pub still: Option<f32>,

    /// Disable the FPS overlay.
    #[arg(long)]
    pub no_stats: bool,

    /// Settings file to load instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn parse_mode(value: &str) -> Result<BlitMode, String> {
    value.parse()
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_flag_accepts_aliases() {
        let cli = Cli::parse_from(["termshade", "--mode", "2x4"]);
        assert_eq!(cli.mode, Some(BlitMode::Braille));
    }

    #[test]
    fn defaults_leave_everything_unset() {
        let cli = Cli::parse_from(["termshade"]);
        assert!(cli.shader.is_none());
        assert!(cli.mode.is_none());
        assert!(cli.fps.is_none());
        assert!(!cli.cpu);
        assert!(!cli.no_stats);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["termshade", "--mode", "octants"]).is_err());
    }
}
