use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gallery_input::CameraConfig;
use gallery_render::SceneConfig;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Model Gallery".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Mesh held in front of the camera.
    pub main_mesh: PathBuf,
    /// Mesh drawn for each animated prop.
    pub prop_mesh: PathBuf,
    /// Directory holding `ground.png`, `mesh.png`, `sky.png` and
    /// `crosshair.png`. Missing files are replaced by generated images.
    pub texture_dir: Option<PathBuf>,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            main_mesh: PathBuf::from("Models/crossbow.obj"),
            prop_mesh: PathBuf::from("Models/balloon.obj"),
            texture_dir: Some(PathBuf::from("Textures")),
        }
    }
}

/// Everything the desktop app reads from its JSON config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub assets: AssetPaths,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub clear_color: [f64; 4],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetPaths::default(),
            camera: CameraConfig::default(),
            scene: SceneConfig::default(),
            clear_color: [0.2, 0.2, 0.4, 1.0],
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open config {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_input::MoveStep;

    #[test]
    fn defaults_match_stock_scene() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.clear_color, [0.2, 0.2, 0.4, 1.0]);
        assert_eq!(cfg.camera.move_step, MoveStep::PerFrame(0.05));
        assert_eq!(cfg.assets.prop_mesh, PathBuf::from("Models/balloon.obj"));
    }

    #[test]
    fn loads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.json");
        std::fs::write(
            &path,
            r#"{
                "window": { "width": 800 },
                "camera": { "move_step": { "per_second": 3.0 } },
                "assets": { "texture_dir": null }
            }"#,
        )
        .unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.window.width, 800);
        assert_eq!(cfg.window.height, 720);
        assert_eq!(cfg.camera.move_step, MoveStep::PerSecond(3.0));
        assert_eq!(cfg.assets.texture_dir, None);
        assert_eq!(cfg.scene, SceneConfig::default());
    }

    #[test]
    fn missing_file_names_path() {
        let err = AppConfig::load(Path::new("/nonexistent/gallery.json")).unwrap_err();
        assert!(format!("{err}").contains("gallery.json"));
    }

    #[test]
    fn bad_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
