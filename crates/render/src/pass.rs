use glam::{Mat4, Vec3, Vec4};

use crate::device::{DepthPolicy, InputLayout, PixelStage, ShaderSet, TextureSlot, VertexStage};
use crate::geometry::Shape;
use crate::props::PropAnimator;

/// Where a draw's world matrix comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassTransform {
    Fixed(Mat4),
    /// The current world matrix of an animated prop.
    Prop(usize),
    /// Scaled cube centred on the camera position.
    FollowCamera { scale: f32 },
    /// A local offset expressed in camera space.
    AttachedToCamera(Mat4),
}

impl PassTransform {
    /// `camera_view` is the camera-to-world matrix.
    pub fn world(&self, camera_view: Mat4, props: &PropAnimator) -> Mat4 {
        match *self {
            PassTransform::Fixed(m) => m,
            PassTransform::Prop(i) => props.world(i),
            PassTransform::FollowCamera { scale } => {
                Mat4::from_translation(camera_view.w_axis.truncate())
                    * Mat4::from_scale(Vec3::splat(scale))
            }
            PassTransform::AttachedToCamera(local) => camera_view * local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawInstance {
    pub transform: PassTransform,
    pub tint: Vec4,
}

/// One step of the frame: a mesh, the pipeline state it needs and the
/// instances drawn with it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPass {
    pub name: &'static str,
    pub shape: Shape,
    pub shaders: ShaderSet,
    pub texture: Option<TextureSlot>,
    pub depth: DepthPolicy,
    pub layout: InputLayout,
    pub instances: Vec<DrawInstance>,
    /// Unbind the geometry stage once this pass is done.
    pub clear_geometry_after: bool,
}

impl DrawPass {
    fn new(name: &'static str, shape: Shape, shaders: ShaderSet) -> Self {
        Self {
            name,
            shape,
            shaders,
            texture: None,
            depth: DepthPolicy::Less,
            layout: InputLayout::Standard,
            instances: Vec::new(),
            clear_geometry_after: false,
        }
    }

    fn texture(mut self, slot: TextureSlot) -> Self {
        self.texture = Some(slot);
        self
    }

    fn depth(mut self, depth: DepthPolicy) -> Self {
        self.depth = depth;
        self
    }

    fn layout(mut self, layout: InputLayout) -> Self {
        self.layout = layout;
        self
    }

    fn instance(mut self, transform: PassTransform, tint: Vec4) -> Self {
        self.instances.push(DrawInstance { transform, tint });
        self
    }
}

/// Held mesh placement relative to the camera: lower right, turned a quarter
/// turn about Y, shrunk.
pub fn held_mesh_offset() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.8, -0.85, 1.0))
        * Mat4::from_rotation_y(1.5708)
        * Mat4::from_scale(Vec3::splat(0.75))
}

/// Crosshair placement in camera space: straight ahead, just past the near
/// plane.
pub fn crosshair_offset() -> Mat4 {
    Mat4::from_scale(Vec3::splat(0.1)) * Mat4::from_translation(Vec3::new(0.0, 0.0, 12.0))
}

/// The scene's fixed draw order.
pub fn scene_passes(props: &PropAnimator) -> Vec<DrawPass> {
    let white = Vec4::ONE;

    let plane = DrawPass::new(
        "plane",
        Shape::Plane,
        ShaderSet::new(VertexStage::Standard, PixelStage::SolidTexture),
    )
    .texture(TextureSlot::Ground)
    .instance(PassTransform::Fixed(Mat4::from_scale(Vec3::splat(60.0))), white);

    let mut balloons = DrawPass::new(
        "props",
        Shape::Prop,
        ShaderSet::new(VertexStage::Standard, PixelStage::Specular),
    );
    for i in 0..props.len() {
        balloons = balloons.instance(PassTransform::Prop(i), props.tint(i));
    }
    balloons.clear_geometry_after = true;

    let skybox = DrawPass::new(
        "skybox",
        Shape::Skybox,
        ShaderSet::new(VertexStage::Skybox, PixelStage::Skybox),
    )
    .texture(TextureSlot::Skybox)
    .depth(DepthPolicy::FarPlane)
    .layout(InputLayout::Skybox)
    .instance(PassTransform::FollowCamera { scale: 50.0 }, white);

    let held = DrawPass::new(
        "main mesh",
        Shape::MainMesh,
        ShaderSet::new(VertexStage::Standard, PixelStage::Lit),
    )
    .texture(TextureSlot::MainMesh)
    .depth(DepthPolicy::Always)
    .instance(PassTransform::AttachedToCamera(held_mesh_offset()), white);

    let crosshair = DrawPass::new(
        "crosshair",
        Shape::Crosshair,
        ShaderSet::new(VertexStage::Wave, PixelStage::Crosshair),
    )
    .texture(TextureSlot::Crosshair)
    .depth(DepthPolicy::Always)
    .instance(PassTransform::AttachedToCamera(crosshair_offset()), white);

    vec![plane, balloons, skybox, held, crosshair]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_fixed() {
        let passes = scene_passes(&PropAnimator::new());
        let shapes: Vec<Shape> = passes.iter().map(|p| p.shape).collect();
        assert_eq!(
            shapes,
            [Shape::Plane, Shape::Prop, Shape::Skybox, Shape::MainMesh, Shape::Crosshair]
        );
        assert_eq!(passes[1].instances.len(), 3);
        assert!(passes[1].clear_geometry_after);
        assert!(passes.iter().filter(|p| p.clear_geometry_after).count() == 1);
    }

    #[test]
    fn overlays_ignore_depth() {
        let passes = scene_passes(&PropAnimator::new());
        assert_eq!(passes[3].depth, DepthPolicy::Always);
        assert_eq!(passes[4].depth, DepthPolicy::Always);
        assert_eq!(passes[2].depth, DepthPolicy::FarPlane);
        assert_eq!(passes[2].layout, InputLayout::Skybox);
    }

    #[test]
    fn skybox_centres_on_camera() {
        let camera = Mat4::from_translation(Vec3::new(3.0, 1.0, -4.0));
        let world = PassTransform::FollowCamera { scale: 50.0 }.world(camera, &PropAnimator::new());
        assert!(world.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(3.0, 1.0, -4.0), 1e-6));
        assert!(world.transform_point3(Vec3::X).abs_diff_eq(Vec3::new(53.0, 1.0, -4.0), 1e-4));
    }

    #[test]
    fn held_mesh_follows_camera() {
        let camera = Mat4::from_translation(Vec3::new(0.0, 1.0, -8.0));
        let world = PassTransform::AttachedToCamera(held_mesh_offset())
            .world(camera, &PropAnimator::new());
        let origin = world.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.8, 0.15, -7.0), 1e-5));
    }

    #[test]
    fn crosshair_stays_ahead_of_camera() {
        let passes = scene_passes(&PropAnimator::new());
        let props = PropAnimator::new();
        let transform = passes[4].instances[0].transform;

        let at_origin = transform.world(Mat4::IDENTITY, &props);
        assert!(at_origin.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(0.0, 0.0, 1.2), 1e-6));

        let camera = Mat4::from_translation(Vec3::new(2.0, 1.0, 30.0)) * Mat4::from_rotation_y(2.0);
        let world = transform.world(camera, &props);
        let in_camera = camera.inverse() * world;
        assert!(in_camera.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(0.0, 0.0, 1.2), 1e-5));
    }
}
