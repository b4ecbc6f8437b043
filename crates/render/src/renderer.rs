use std::time::Instant;

use gallery_common::SimpleMesh;
use glam::{Mat4, Vec4};
use tracing::{error, info, info_span, trace, warn};

use crate::clock::SceneClock;
use crate::config::SceneConfig;
use crate::device::{DepthPolicy, InputLayout, RenderContext, RenderDevice};
use crate::error::{RenderError, SubmitError};
use crate::frame::FrameParams;
use crate::geometry::SceneGeometry;
use crate::pass::{DrawPass, scene_passes};
use crate::props::PropAnimator;

/// What one call to [`SceneRenderer::render_frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub time: f32,
    pub draws: u32,
    pub skipped: u32,
    pub param_uploads: u32,
}

/// Owns the scene's buffers and animation state and replays the pass list
/// against a [`RenderContext`] each frame.
pub struct SceneRenderer<B> {
    geometry: Option<SceneGeometry<B>>,
    passes: Vec<DrawPass>,
    props: PropAnimator,
    clock: SceneClock,
    config: SceneConfig,
    projection: Mat4,
    viewport: (u32, u32),
    last_params: Option<FrameParams>,
}

impl<B> SceneRenderer<B> {
    /// Creates every buffer the scene needs. Without a main mesh nothing is
    /// uploaded and the renderer stays inert.
    pub fn new<D>(
        device: &mut D,
        main: Option<&SimpleMesh>,
        prop: &SimpleMesh,
        config: SceneConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError>
    where
        D: RenderDevice<Buffer = B>,
    {
        let _span = info_span!("scene_init").entered();
        let geometry = match main {
            Some(main) => Some(SceneGeometry::upload(device, main, prop)?),
            None => {
                warn!("no main mesh; frames will not draw anything");
                None
            }
        };
        let props = PropAnimator::new();
        let passes = scene_passes(&props);
        info!(passes = passes.len(), width, height, "scene ready");
        Ok(Self {
            geometry,
            passes,
            props,
            clock: SceneClock::new(),
            config,
            projection: config.projection.matrix(width, height),
            viewport: (width, height),
            last_params: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn passes(&self) -> &[DrawPass] {
        &self.passes
    }

    pub fn props(&self) -> &PropAnimator {
        &self.props
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);
        self.projection = self.config.projection.matrix(width, height);
        info!(width, height, "projection rebuilt");
    }

    fn base_params(&self, camera_view: Mat4, time: f32) -> FrameParams {
        FrameParams {
            world: Mat4::IDENTITY,
            view: camera_view.inverse(),
            projection: self.projection,
            light_direction: self.config.lighting.direction,
            light_color: self.config.lighting.color,
            tint: Vec4::ONE,
            time,
        }
    }

    /// Advances the clock and props, then issues every pass.
    ///
    /// `camera_view` is the camera-to-world matrix. A rejected draw is
    /// logged and skipped; a lost device ends the frame with an error.
    pub fn render_frame<C>(
        &mut self,
        ctx: &mut C,
        camera_view: Mat4,
        now: Instant,
    ) -> Result<FrameReport, RenderError>
    where
        C: RenderContext<Buffer = B>,
    {
        if self.geometry.is_none() {
            return Ok(FrameReport::default());
        }
        let time = self.clock.advance(now);
        self.props.advance(time);
        let mut params = self.base_params(camera_view, time);
        let mut report = FrameReport {
            time,
            ..FrameReport::default()
        };

        let Some(geometry) = &self.geometry else {
            return Ok(report);
        };
        for pass in &self.passes {
            let buffers = geometry.buffers(pass.shape);
            ctx.set_mesh(&buffers.vertices, &buffers.indices);
            ctx.set_shaders(pass.shaders);
            if let Some(slot) = pass.texture {
                ctx.bind_texture(slot);
            }
            if pass.layout != InputLayout::Standard {
                ctx.set_input_layout(pass.layout);
            }
            if pass.depth != DepthPolicy::Less {
                ctx.set_depth_policy(pass.depth);
            }

            for instance in &pass.instances {
                params.world = instance.transform.world(camera_view, &self.props);
                params.tint = instance.tint;
                match submit(ctx, &params, &mut self.last_params, buffers.index_count) {
                    Ok(uploaded) => {
                        report.draws += 1;
                        report.param_uploads += u32::from(uploaded);
                    }
                    Err(e) if e.is_fatal() => {
                        error!(pass = pass.name, error = %e, "device lost");
                        return Err(RenderError::DeviceLost(e));
                    }
                    Err(e) => {
                        warn!(pass = pass.name, error = %e, "draw skipped");
                        report.skipped += 1;
                    }
                }
            }

            if pass.depth != DepthPolicy::Less {
                ctx.set_depth_policy(DepthPolicy::Less);
            }
            if pass.layout != InputLayout::Standard {
                ctx.set_input_layout(InputLayout::Standard);
            }
            if pass.clear_geometry_after {
                ctx.clear_geometry_stage();
            }
        }

        trace!(time, draws = report.draws, uploads = report.param_uploads, "frame");
        Ok(report)
    }
}

/// Pushes `params` unless they equal the last successful push, then draws.
/// Returns whether a push happened.
fn submit<C: RenderContext>(
    ctx: &mut C,
    params: &FrameParams,
    last: &mut Option<FrameParams>,
    index_count: u32,
) -> Result<bool, SubmitError> {
    let upload = last.as_ref() != Some(params);
    if upload {
        ctx.update_params(params)?;
        *last = Some(*params);
    }
    ctx.draw_indexed(index_count)?;
    Ok(upload)
}
