//! GPU context: owns `wgpu::Device`, `Queue`, and optional `Surface`.
//!
//! Two construction paths:
//!
//! 1. **Headless** (`GpuContext::new_headless`): no window, no surface.
//!    Used for tests, benchmarks, and offscreen rendering.
//!
//! 2. **Windowed** (`GpuContext::new_with_surface`): takes any
//!    `raw_window_handle`-compatible window from the host. The renderer
//!    never creates or destroys windows itself.
//!
//! Backends come from [`RendererConfig::backend`]; the default is the
//! OpenGL ES backend.

use thiserror::Error;
use wgpu::{
    Adapter, Device, DeviceDescriptor, Instance, InstanceDescriptor, Queue,
    RequestAdapterOptions, Surface, SurfaceConfiguration, TextureFormat, TextureUsages,
};

use crate::config::RendererConfig;

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found for backends {0:?}")]
    NoAdapter(wgpu::Backends),
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Device, queue and (when windowed) the presentation surface.
pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub adapter: Adapter,
    /// `None` for headless contexts.
    pub surface: Option<Surface<'static>>,
    pub surface_config: Option<SurfaceConfiguration>,
    /// Color format pipelines are built for.
    pub surface_format: TextureFormat,
}

impl GpuContext {
    /// Format used for headless targets. Colors arrive already in sRGB
    /// space, so an sRGB target would encode them twice.
    pub const HEADLESS_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

    fn instance(config: &RendererConfig) -> Instance {
        Instance::new(&InstanceDescriptor {
            backends: config.backend.backends(),
            ..Default::default()
        })
    }

    /// Offscreen context. Frames go to caller-owned textures.
    pub async fn new_headless(config: &RendererConfig) -> Result<Self, GpuError> {
        let instance = Self::instance(config);

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter(config.backend.backends()))?;

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("clay-headless"),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    ..Default::default()
                },
                None,
            )
            .await?;

        log::info!("GPU adapter (headless): {:?}", adapter.get_info());

        Ok(Self {
            device,
            queue,
            adapter,
            surface: None,
            surface_config: None,
            surface_format: Self::HEADLESS_FORMAT,
        })
    }

    /// Context presenting to a host-owned `window`, sized `width`×`height`.
    ///
    /// `window` has to stay alive for as long as this context does.
    pub async fn new_with_surface<W>(
        window: W,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> Result<Self, GpuError>
    where
        W: wgpu::WasmNotSendSync + Into<wgpu::SurfaceTarget<'static>>,
    {
        let instance = Self::instance(config);

        let surface = instance
            .create_surface(window)
            .map_err(|e| GpuError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter(config.backend.backends()))?;

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("clay-windowed"),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    ..Default::default()
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| GpuError::Surface(String::from("surface reports no formats")))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: config.present_mode(),
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "GPU adapter: {:?}, surface {}x{} {:?}",
            adapter.get_info(),
            surface_config.width,
            surface_config.height,
            format
        );

        Ok(Self {
            device,
            queue,
            adapter,
            surface: Some(surface),
            surface_config: Some(surface_config),
            surface_format: format,
        })
    }

    /// Reconfigure the surface for a new framebuffer size. Zero sizes are
    /// ignored, as is any call on a headless context.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(config) = &mut self.surface_config {
            if width == 0 || height == 0 {
                log::warn!("Ignoring resize to {}x{}", width, height);
                return;
            }
            config.width = width;
            config.height = height;
            if let Some(surface) = &self.surface {
                surface.configure(&self.device, config);
            }
        }
    }

    /// Configured framebuffer size; `(0, 0)` without a surface.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_config
            .as_ref()
            .map(|c| (c.width, c.height))
            .unwrap_or((0, 0))
    }
}

// ===================================================================
// Tests
// ===================================================================
