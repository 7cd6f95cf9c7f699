//! High-level renderer that ties GPU context, pipelines, fonts and the
//! command dispatcher together into a single `render_frame()` call.

use clay_core::{Dimensions, FontId, LayoutHost, RenderCommand};
use clay_text::{FontError, FontFace, FontTable};
use std::path::Path;
use thiserror::Error;
use wgpu::{
    Color, CommandEncoderDescriptor, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureView, TextureViewDescriptor,
};

use crate::config::RendererConfig;
use crate::context::GpuContext;
use crate::dispatch::{build_frame, DispatchOptions, DrawKind, FrameError, FramePlan, FrameStats};
use crate::pipelines::rect::RectPipeline;
use crate::pipelines::text::{AtlasTexture, TextPipeline};
use crate::pipelines::PipelineError;
use crate::transform::Viewport;
use crate::vertex::ViewportUniform;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("No surface configured (headless mode)")]
    NoSurface,
    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),
}

/// Renderer context for Clay render commands.
///
/// Owns the pipelines, the font table and one atlas texture per font.
/// Not internally synchronized; hosts that render from several threads
/// must serialize access themselves.
///
/// # Usage
///
/// ```ignore
/// let gpu = pollster::block_on(GpuContext::new_with_surface(window, w, h, &config))?;
/// let mut renderer = Renderer::new(&gpu, config)?;
/// let font = renderer.load_font(&gpu, "Inter.ttf", 32.0)?;
/// // each frame:
/// let stats = renderer.render_frame(&gpu, &commands, &mut layout)?;
/// ```
pub struct Renderer {
    config: RendererConfig,
    fonts: FontTable,
    rect_pipeline: RectPipeline,
    text_pipeline: TextPipeline,
    /// Indexed by `FontId`.
    atlases: Vec<AtlasTexture>,
    clear_color: Color,
}

impl Renderer {
    /// Compile both programs for the context's color format.
    ///
    /// A compile or link failure is fatal for the host.
    pub fn new(gpu: &GpuContext, config: RendererConfig) -> Result<Self, PipelineError> {
        let rect_pipeline = RectPipeline::new(&gpu.device, gpu.surface_format)?;
        let text_pipeline = TextPipeline::new(&gpu.device, gpu.surface_format)?;
        let [r, g, b, a] = config.clear_color;

        let mut fonts = config.fonts.clone();
        fonts.max_atlas_size = fonts
            .max_atlas_size
            .min(gpu.device.limits().max_texture_dimension_2d);

        Ok(Self {
            fonts: FontTable::new(fonts),
            config,
            rect_pipeline,
            text_pipeline,
            atlases: Vec::new(),
            clear_color: Color { r, g, b, a },
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Set the background clear color.
    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = Color { r, g, b, a };
    }

    pub fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    // ───────────────────── Fonts ──────────────────────────────────

    /// Load a font file, bake its atlas and upload it.
    ///
    /// Atlases larger than the device allows are rejected with
    /// [`FontError::AtlasTooLarge`] and nothing is registered.
    pub fn load_font(
        &mut self,
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        pixel_size: f32,
    ) -> Result<FontId, FontError> {
        let id = self.fonts.load_font(path, pixel_size)?;
        self.upload_atlas(gpu, id);
        Ok(id)
    }

    /// Register an already-open face.
    pub fn load_face(
        &mut self,
        gpu: &GpuContext,
        face: impl FontFace + 'static,
        pixel_size: f32,
    ) -> Result<FontId, FontError> {
        let id = self.fonts.load_face(face, pixel_size)?;
        self.upload_atlas(gpu, id);
        Ok(id)
    }

    fn upload_atlas(&mut self, gpu: &GpuContext, id: FontId) {
        if let Some(font) = self.fonts.get(id) {
            let texture = self
                .text_pipeline
                .create_atlas(&gpu.device, &gpu.queue, font.atlas());
            self.atlases.push(texture);
        }
    }

    /// Text measurement callback for the layout engine.
    pub fn measure_text(
        &mut self,
        text: &str,
        font_id: FontId,
        pixel_size: f32,
    ) -> Result<Dimensions, FontError> {
        self.fonts.measure(text, font_id, pixel_size)
    }

    // ───────────────────── Frames ─────────────────────────────────

    /// Build the vertex data and draw list for one frame without
    /// touching the GPU.
    pub fn plan_frame(
        &mut self,
        commands: &[RenderCommand<'_>],
        viewport: Viewport,
    ) -> Result<FramePlan, FrameError> {
        let options = DispatchOptions {
            report_unsupported: self.config.report_unsupported,
        };
        build_frame(commands, &mut self.fonts, viewport, options)
    }

    /// Render to the window surface and present.
    ///
    /// Reports the surface size to `host` before drawing.
    pub fn render_frame(
        &mut self,
        gpu: &GpuContext,
        commands: &[RenderCommand<'_>],
        host: &mut dyn LayoutHost,
    ) -> Result<FrameStats, RenderError> {
        let surface = gpu.surface.as_ref().ok_or(RenderError::NoSurface)?;
        let (width, height) = gpu.surface_size();
        host.set_layout_dimensions(Dimensions::new(width as f32, height as f32));

        let plan = self.plan_frame(commands, Viewport::new(width, height))?;
        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let stats = self.encode(gpu, &view, &plan, "clay_frame");
        output.present();

        Ok(stats)
    }

    /// Render to an off-screen texture (headless mode).
    ///
    /// `target` must have `RENDER_ATTACHMENT` usage and the context's
    /// color format.
    pub fn render_to_texture(
        &mut self,
        gpu: &GpuContext,
        target: &wgpu::Texture,
        commands: &[RenderCommand<'_>],
        host: &mut dyn LayoutHost,
    ) -> Result<FrameStats, RenderError> {
        let (width, height) = (target.width(), target.height());
        host.set_layout_dimensions(Dimensions::new(width as f32, height as f32));

        let plan = self.plan_frame(commands, Viewport::new(width, height))?;
        let view = target.create_view(&TextureViewDescriptor::default());
        Ok(self.encode(gpu, &view, &plan, "clay_offscreen"))
    }

    /// Upload the plan and record its draw calls in order.
    fn encode(
        &mut self,
        gpu: &GpuContext,
        view: &TextureView,
        plan: &FramePlan,
        label: &str,
    ) -> FrameStats {
        let viewport = ViewportUniform::new(plan.viewport.width, plan.viewport.height);
        self.rect_pipeline.upload_viewport(&gpu.queue, &viewport);
        self.rect_pipeline
            .upload_vertices(&gpu.device, &gpu.queue, plan.rect_vertices.as_bytes());
        self.text_pipeline
            .upload_vertices(&gpu.device, &gpu.queue, plan.text_vertices.as_bytes());

        let mut encoder = gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some(label),
        });

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &plan.draws {
                let clip = draw.clip;
                pass.set_scissor_rect(clip.x, clip.y, clip.width, clip.height);
                match draw.kind {
                    DrawKind::Rect => self.rect_pipeline.draw(&mut pass, draw.vertices.clone()),
                    DrawKind::Text(id) => match self.atlases.get(usize::from(id)) {
                        Some(atlas) => {
                            self.text_pipeline
                                .draw(&mut pass, atlas, draw.vertices.clone())
                        }
                        None => log::warn!("No atlas texture for font {}", id),
                    },
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        plan.stats
    }
}

// ===================================================================
// Tests
// ===================================================================
