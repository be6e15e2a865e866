use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fieldconfig::{parse_antialias, AntialiasSetting, TransitionSource, MAX_GRID_POINTS};

#[derive(Parser, Debug)]
#[command(
    name = "pointfade",
    author,
    version,
    about = "Interactive point field that crossfades between images as you scroll"
)]
pub struct Cli {
    /// Configuration file; overrides `$POINTFADE_CONFIG_DIR` and the platform default.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Content image; repeat to add more (at least two to crossfade).
    #[arg(long = "texture", value_name = "PATH")]
    pub textures: Vec<PathBuf>,

    /// Static mask image shared by every frame.
    #[arg(long, value_name = "PATH")]
    pub mask: Option<PathBuf>,

    /// Point lattice dimensions (e.g. `512x512`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_grid)]
    pub grid: Option<(u32, u32)>,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions)]
    pub size: Option<(u32, u32)>,

    /// Seed for the per-point random attributes.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Initial blend between the current texture pair (0-1).
    #[arg(long, value_name = "PROGRESS", value_parser = parse_unit_interval)]
    pub transition: Option<f32>,

    /// Where the blend comes from: `manual` (keyboard) or `scroll`.
    #[arg(long, value_name = "SOURCE", value_parser = parse_transition_source)]
    pub transition_source: Option<TransitionSource>,

    /// Wheel units per texture step.
    #[arg(long, value_name = "UNITS", value_parser = parse_scroll_scale)]
    pub scroll_scale: Option<f64>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// GLSL 450 vertex stage replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    pub vertex_shader: Option<PathBuf>,

    /// GLSL 450 fragment stage replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    pub fragment_shader: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the resolved configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration after applying the file and command-line flags.
    Show {
        /// Emit JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
    /// Print where the configuration file is looked up.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_grid(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = parse_dimensions(value)?;
    let points = u64::from(width) * u64::from(height);
    if points > MAX_GRID_POINTS {
        return Err(format!(
            "{width}x{height} is {points} points; at most {MAX_GRID_POINTS} are supported"
        ));
    }
    Ok((width, height))
}

pub fn parse_unit_interval(value: &str) -> Result<f32, String> {
    let parsed = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid number '{}'", value.trim()))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(format!("{parsed} is outside 0-1"));
    }
    Ok(parsed)
}

pub fn parse_transition_source(value: &str) -> Result<TransitionSource, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "manual" | "gui" | "keyboard" => Ok(TransitionSource::Manual),
        "scroll" | "wheel" => Ok(TransitionSource::Scroll),
        other => Err(format!(
            "unknown transition source '{other}'; expected manual or scroll"
        )),
    }
}

pub fn parse_scroll_scale(value: &str) -> Result<f64, String> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid scroll scale '{}'", value.trim()))?;
    if !parsed.is_finite() || parsed == 0.0 {
        return Err("scroll scale must be a finite, non-zero number".into());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dimensions() {
        assert_eq!(parse_dimensions("512x512").unwrap(), (512, 512));
        assert_eq!(parse_dimensions(" 1280X720 ").unwrap(), (1280, 720));
        assert!(parse_dimensions("0x10").is_err());
        assert!(parse_dimensions("640").is_err());
        assert!(parse_dimensions("ax3").is_err());
    }

    #[test]
    fn grid_rejects_oversized_lattice() {
        assert_eq!(parse_grid("4096x4096").unwrap(), (4096, 4096));
        assert!(parse_grid("4000000000x4000000000").is_err());
        assert!(parse_grid("65536x257").is_err());
        assert!(Cli::try_parse_from(["pointfade", "--grid", "20000x20000"]).is_err());
    }

    #[test]
    fn parses_transition_values() {
        assert_eq!(parse_unit_interval("0.25").unwrap(), 0.25);
        assert!(parse_unit_interval("1.5").is_err());
        assert!(parse_unit_interval("-0.1").is_err());
        assert_eq!(
            parse_transition_source("Scroll").unwrap(),
            TransitionSource::Scroll
        );
        assert_eq!(
            parse_transition_source("manual").unwrap(),
            TransitionSource::Manual
        );
        assert!(parse_transition_source("auto").is_err());
    }

    #[test]
    fn scroll_scale_rejects_zero() {
        assert_eq!(parse_scroll_scale("-4000").unwrap(), -4000.0);
        assert!(parse_scroll_scale("0").is_err());
        assert!(parse_scroll_scale("inf").is_err());
    }

    #[test]
    fn flags_parse_into_run_args() {
        let cli = Cli::try_parse_from([
            "pointfade",
            "--texture",
            "a.png",
            "--texture",
            "b.png",
            "--grid",
            "64x32",
            "--transition-source",
            "scroll",
            "--antialias",
            "4",
        ])
        .unwrap();
        assert_eq!(
            cli.run.textures,
            vec![PathBuf::from("a.png"), PathBuf::from("b.png")]
        );
        assert_eq!(cli.run.grid, Some((64, 32)));
        assert_eq!(cli.run.transition_source, Some(TransitionSource::Scroll));
        assert_eq!(cli.run.antialias, Some(AntialiasSetting::Samples4));
        assert!(cli.command.is_none());
    }

    #[test]
    fn config_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["pointfade", "config", "show", "--config", "x.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand {
                action: ConfigAction::Show { json: false }
            }))
        ));
    }
}
