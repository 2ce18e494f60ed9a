use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Viewer settings. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub model: ModelConfig,
    pub texture: PathBuf,
    pub clear_color: [f64; 4],
    pub camera: CameraConfig,
    pub sound: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub generate_normals: bool,
    /// Group to draw. `None` picks the first group that has geometry.
    pub group: Option<String>,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub velocity_scale: f32,
    pub rotation_damping: f32,
    pub spin_threshold: f32,
    /// Seconds between two spin sounds.
    pub sound_cooldown: f64,
    pub distance: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            model: ModelConfig::default(),
            texture: PathBuf::from("assets/cube_texture.png"),
            clear_color: [0.95, 0.95, 0.95, 1.0],
            camera: CameraConfig::default(),
            sound: "moo".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "spotview".to_string(),
            width: 800,
            height: 800,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/cube.obj"),
            generate_normals: true,
            group: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            velocity_scale: 0.01,
            rotation_damping: 0.05,
            spin_threshold: 30.0,
            sound_cooldown: 3.0,
            distance: 1.5,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
    }

    /// `spotview [CONFIG.json | MODEL.obj]`
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let arg = match args.into_iter().nth(1) {
            Some(arg) => arg,
            None => return Ok(Self::default()),
        };

        let path = PathBuf::from(arg);
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::load(&path)
        } else {
            let mut config = Self::default();
            config.model.path = path;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.camera.velocity_scale, 0.01);
        assert_eq!(config.camera.spin_threshold, 30.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ViewerConfig::from_json(
            r#"{ "model": { "group": "spot" }, "camera": { "distance": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.model.group.as_deref(), Some("spot"));
        assert_eq!(config.model.path, PathBuf::from("assets/cube.obj"));
        assert!(config.model.generate_normals);
        assert_eq!(config.camera.distance, 3.0);
        assert_eq!(config.camera.rotation_damping, 0.05);
    }

    #[test]
    fn default_assets_ship_with_the_crate() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let config = ViewerConfig::default();
        assert!(root.join(&config.model.path).is_file());

        let texture = image::open(root.join(&config.texture)).unwrap();
        assert_eq!(texture.to_rgba8().dimensions(), (64, 64));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ViewerConfig::from_json("{ model: ").is_err());
    }

    #[test]
    fn obj_argument_overrides_model_path() {
        let args = vec!["spotview".to_string(), "teapot.obj".to_string()];
        let config = ViewerConfig::from_args(args).unwrap();
        assert_eq!(config.model.path, PathBuf::from("teapot.obj"));
    }

    #[test]
    fn json_argument_is_loaded() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "window": {{ "title": "cow" }} }}"#).unwrap();
        let args = vec![
            "spotview".to_string(),
            file.path().to_string_lossy().into_owned(),
        ];
        let config = ViewerConfig::from_args(args).unwrap();
        assert_eq!(config.window.title, "cow");
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let err = ViewerConfig::load("does/not/exist.json").unwrap_err();
        assert!(format!("{:#}", err).contains("does/not/exist.json"));
    }
}
