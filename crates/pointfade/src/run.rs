use anyhow::{Context, Result};
use fieldconfig::{AntialiasSetting, FieldConfig};
use fieldrender::{
    Antialiasing, Camera, GridSize, PressSettings, Renderer, RendererConfig, TransitionSource,
};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::ConfigLocation;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(location: &ConfigLocation, args: &RunArgs) -> Result<()> {
    let config = resolve_config(location, args)?;
    let renderer_config = renderer_config(&config);
    tracing::debug!(
        config = %location.path().display(),
        origin = %location.origin(),
        "resolved configuration"
    );
    Renderer::new(renderer_config).run()
}

/// Loads the config file and layers the command-line flags on top.
pub fn resolve_config(location: &ConfigLocation, args: &RunArgs) -> Result<FieldConfig> {
    let path = location.path();
    let mut config = if location.is_required() {
        FieldConfig::load(path)
    } else {
        FieldConfig::load_or_default(path)
    }
    .with_context(|| format!("failed to load configuration from {}", path.display()))?;

    apply_overrides(&mut config, args);
    config
        .validate()
        .context("command-line flags produce an invalid configuration")?;
    Ok(config)
}

pub fn apply_overrides(config: &mut FieldConfig, args: &RunArgs) {
    if !args.textures.is_empty() {
        config.assets.textures = args.textures.clone();
    }
    if let Some(mask) = &args.mask {
        config.assets.mask = Some(mask.clone());
    }
    if let Some((width, height)) = args.grid {
        config.grid.width = width;
        config.grid.height = height;
    }
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(seed) = args.seed {
        config.grid.seed = Some(seed);
    }
    if let Some(initial) = args.transition {
        config.transition.initial = initial;
    }
    if let Some(source) = args.transition_source {
        config.transition.source = source;
    }
    if let Some(scale) = args.scroll_scale {
        config.scroll.scale = scale;
    }
    if let Some(antialias) = args.antialias {
        config.window.antialias = Some(antialias);
    }
    if let Some(path) = &args.vertex_shader {
        config.shaders.vertex = Some(path.clone());
    }
    if let Some(path) = &args.fragment_shader {
        config.shaders.fragment = Some(path.clone());
    }
}

pub fn renderer_config(config: &FieldConfig) -> RendererConfig {
    RendererConfig {
        surface_size: (config.window.width, config.window.height),
        grid: GridSize::new(config.grid.width, config.grid.height),
        seed: config.grid.seed,
        textures: config.assets.textures.clone(),
        mask: config.assets.mask.clone(),
        scroll_scale: config.scroll.scale,
        press: PressSettings {
            duration: config.press.duration,
            amplitude: config.press.amplitude,
            period: config.press.period,
        },
        transition_source: match config.transition.source {
            fieldconfig::TransitionSource::Manual => TransitionSource::Manual,
            fieldconfig::TransitionSource::Scroll => TransitionSource::Scroll,
        },
        transition_initial: config.transition.initial,
        transition_step: config.transition.step,
        camera: Camera {
            fov: config.camera.fov,
            near: config.camera.near,
            far: config.camera.far,
            ..Camera::at_distance(config.camera.distance)
        },
        antialiasing: map_antialias(config.window.antialias),
        vertex_shader: config.shaders.vertex.clone(),
        fragment_shader: config.shaders.fragment.clone(),
    }
}

fn map_antialias(setting: Option<AntialiasSetting>) -> Antialiasing {
    match setting.and_then(AntialiasSetting::samples) {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    #[test]
    fn flags_override_file_values() {
        let mut config = FieldConfig::from_toml_str(
            r#"
            [grid]
            width = 64
            height = 64
            seed = 3

            [transition]
            initial = 0.2
            "#,
        )
        .unwrap();
        let args = RunArgs {
            grid: Some((8, 4)),
            transition: Some(0.9),
            textures: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
            ..RunArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert_eq!((config.grid.width, config.grid.height), (8, 4));
        assert_eq!(config.grid.seed, Some(3));
        assert_eq!(config.transition.initial, 0.9);
        assert_eq!(config.assets.textures.len(), 2);
    }

    #[test]
    fn renderer_config_carries_every_section() {
        let config = FieldConfig::from_toml_str(
            r#"
            [scroll]
            scale = 2000.0

            [press]
            duration = "500ms"
            period = 0.4

            [transition]
            source = "scroll"
            step = 0.05

            [camera]
            distance = 800.0
            fov = 60.0

            [window]
            width = 640
            height = 480
            antialias = "off"
            "#,
        )
        .unwrap();
        let renderer = renderer_config(&config);
        assert_eq!(renderer.surface_size, (640, 480));
        assert_eq!(renderer.grid, GridSize::new(512, 512));
        assert_eq!(renderer.scroll_scale, 2000.0);
        assert_eq!(renderer.press.duration, Duration::from_millis(500));
        assert_eq!(renderer.press.period, 0.4);
        assert_eq!(renderer.transition_source, TransitionSource::Scroll);
        assert_eq!(renderer.transition_step, 0.05);
        assert_eq!(renderer.camera.position.z, 800.0);
        assert_eq!(renderer.camera.fov, 60.0);
        assert_eq!(renderer.camera.far, 3000.0);
        assert_eq!(renderer.antialiasing, Antialiasing::Off);
    }

    #[test]
    fn antialias_settings_map_to_renderer_policy() {
        assert_eq!(map_antialias(None), Antialiasing::Auto);
        assert_eq!(map_antialias(Some(AntialiasSetting::Auto)), Antialiasing::Auto);
        assert_eq!(map_antialias(Some(AntialiasSetting::Off)), Antialiasing::Off);
        assert_eq!(
            map_antialias(Some(AntialiasSetting::Samples8)),
            Antialiasing::Samples(8)
        );
    }
}
