//! Renderer configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "backend": "primary", "vsync": false, "fonts": { "oversample": 8.0 } }
//! ```

use std::path::Path;

use clay_text::FontTableConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid renderer config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which wgpu backends to try when creating the GPU context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// OpenGL ES (via EGL/WGL/WebGL).
    #[default]
    Gl,
    /// The platform's primary backend (Vulkan, Metal, DX12, WebGPU).
    Primary,
    /// Anything wgpu supports.
    All,
}

impl BackendPreference {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            BackendPreference::Gl => wgpu::Backends::GL,
            BackendPreference::Primary => wgpu::Backends::PRIMARY,
            BackendPreference::All => wgpu::Backends::all(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: BackendPreference,
    /// Background RGBA, each channel in [0.0, 1.0].
    pub clear_color: [f64; 4],
    pub vsync: bool,
    pub fonts: FontTableConfig,
    /// Log a debug diagnostic for Image, Border and Custom commands.
    pub report_unsupported: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            vsync: true,
            fonts: FontTableConfig::default(),
            report_unsupported: cfg!(debug_assertions),
        }
    }
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}
