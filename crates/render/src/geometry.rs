//! Built-in shapes and device upload of every mesh the scene draws.

use gallery_common::{SimpleMesh, Vertex};
use glam::{Vec2, Vec3};
use tracing::debug;

use crate::device::RenderDevice;
use crate::error::{DeviceError, RenderError};

const QUAD_INDICES: [u32; 6] = [0, 2, 3, 0, 3, 1];

/// Unit ground quad in the XZ plane. UVs run to 100 so the ground texture
/// tiles.
pub fn plane_mesh() -> SimpleMesh {
    let corners = [
        (Vec3::new(-1.0, 0.0, -1.0), Vec2::new(0.0, 0.0)),
        (Vec3::new(1.0, 0.0, -1.0), Vec2::new(100.0, 0.0)),
        (Vec3::new(-1.0, 0.0, 1.0), Vec2::new(0.0, 100.0)),
        (Vec3::new(1.0, 0.0, 1.0), Vec2::new(100.0, 100.0)),
    ];
    quad(corners)
}

/// Crosshair quad facing the camera at z = 1.
pub fn crosshair_mesh() -> SimpleMesh {
    let corners = [
        (Vec3::new(-1.0, -1.0, 1.0), Vec2::new(0.0, 0.0)),
        (Vec3::new(1.0, -1.0, 1.0), Vec2::new(1.0, 0.0)),
        (Vec3::new(-1.0, 1.0, 1.0), Vec2::new(0.0, 1.0)),
        (Vec3::new(1.0, 1.0, 1.0), Vec2::new(1.0, 1.0)),
    ];
    quad(corners)
}

fn quad(corners: [(Vec3, Vec2); 4]) -> SimpleMesh {
    let vertices = corners
        .into_iter()
        .map(|(p, uv)| Vertex::new(p, Vec3::Y, uv))
        .collect();
    SimpleMesh {
        vertices,
        indices: QUAD_INDICES.to_vec(),
    }
}

/// Cube of half-extent 1 wound to be seen from inside, with inward normals.
///
/// Faces in order: top, bottom, -X, +X, -Z, +Z.
pub fn skybox_mesh() -> SimpleMesh {
    #[rustfmt::skip]
    let faces: [([[f32; 3]; 4], [[f32; 2]; 4], Vec3); 6] = [
        ([[-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
         [[1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0]], Vec3::NEG_Y),
        ([[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
         [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]], Vec3::Y),
        ([[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]],
         [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]], Vec3::X),
        ([[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
         [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]], Vec3::NEG_X),
        ([[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
         [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]], Vec3::Z),
        ([[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
         [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]], Vec3::NEG_Z),
    ];

    let vertices = faces
        .iter()
        .flat_map(|(corners, uvs, normal)| {
            corners
                .iter()
                .zip(uvs)
                .map(move |(p, uv)| Vertex::new(Vec3::from(*p), *normal, Vec2::from(*uv)))
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 3, 3, 1, 2,
        5, 4, 6, 6, 4, 7,
        8, 9, 11, 11, 9, 10,
        13, 12, 14, 14, 12, 15,
        16, 17, 19, 19, 17, 18,
        21, 20, 22, 22, 20, 23,
    ];
    SimpleMesh { vertices, indices }
}

/// What a pass draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Plane,
    Prop,
    Skybox,
    MainMesh,
    Crosshair,
}

impl Shape {
    pub fn label(self) -> &'static str {
        match self {
            Shape::Plane => "plane",
            Shape::Prop => "prop",
            Shape::Skybox => "skybox",
            Shape::MainMesh => "main mesh",
            Shape::Crosshair => "crosshair",
        }
    }
}

/// A vertex/index buffer pair and the number of indices to draw.
#[derive(Debug, Clone)]
pub struct MeshBuffers<B> {
    pub vertices: B,
    pub indices: B,
    pub index_count: u32,
}

impl<B> MeshBuffers<B> {
    pub fn upload<D>(device: &mut D, label: &str, mesh: &SimpleMesh) -> Result<Self, RenderError>
    where
        D: RenderDevice<Buffer = B>,
    {
        mesh.validate().map_err(|e| RenderError::Resource {
            resource: format!("{label} mesh"),
            source: DeviceError::InvalidMesh(e),
        })?;
        let vertices = device
            .create_vertex_buffer(&format!("{label}.vertices"), &mesh.vertices)
            .map_err(|source| RenderError::Resource {
                resource: format!("{label} vertex buffer"),
                source,
            })?;
        let indices = device
            .create_index_buffer(&format!("{label}.indices"), &mesh.indices)
            .map_err(|source| RenderError::Resource {
                resource: format!("{label} index buffer"),
                source,
            })?;
        debug!(
            mesh = label,
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "uploaded"
        );
        Ok(Self {
            vertices,
            indices,
            index_count: mesh.index_count(),
        })
    }
}

/// Every buffer the scene needs, created in one go.
#[derive(Debug, Clone)]
pub struct SceneGeometry<B> {
    plane: MeshBuffers<B>,
    prop: MeshBuffers<B>,
    skybox: MeshBuffers<B>,
    main: MeshBuffers<B>,
    crosshair: MeshBuffers<B>,
}

impl<B> SceneGeometry<B> {
    /// Uploads the built-in shapes plus the loaded meshes. The first failure
    /// aborts and drops whatever was already created.
    pub fn upload<D>(device: &mut D, main: &SimpleMesh, prop: &SimpleMesh) -> Result<Self, RenderError>
    where
        D: RenderDevice<Buffer = B>,
    {
        Ok(Self {
            plane: MeshBuffers::upload(device, Shape::Plane.label(), &plane_mesh())?,
            prop: MeshBuffers::upload(device, Shape::Prop.label(), prop)?,
            skybox: MeshBuffers::upload(device, Shape::Skybox.label(), &skybox_mesh())?,
            main: MeshBuffers::upload(device, Shape::MainMesh.label(), main)?,
            crosshair: MeshBuffers::upload(device, Shape::Crosshair.label(), &crosshair_mesh())?,
        })
    }

    pub fn buffers(&self, shape: Shape) -> &MeshBuffers<B> {
        match shape {
            Shape::Plane => &self.plane,
            Shape::Prop => &self.prop,
            Shape::Skybox => &self.skybox,
            Shape::MainMesh => &self.main,
            Shape::Crosshair => &self.crosshair,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingDevice;

    #[test]
    fn quads_share_index_order() {
        assert_eq!(plane_mesh().indices, QUAD_INDICES);
        assert_eq!(crosshair_mesh().indices, QUAD_INDICES);
        assert!(plane_mesh().validate().is_ok());
    }

    #[test]
    fn skybox_faces_carry_their_own_uvs() {
        let sky = skybox_mesh();
        let uvs = |face: usize| -> Vec<Vec2> {
            sky.vertices[face * 4..face * 4 + 4].iter().map(|v| v.uv).collect()
        };
        assert_eq!(uvs(0)[0], Vec2::new(1.0, 0.0));
        assert_eq!(uvs(1)[0], Vec2::new(0.0, 0.0));
        assert_eq!(uvs(3)[0], Vec2::new(1.0, 1.0));
        assert_ne!(uvs(0), uvs(1));
        assert_ne!(uvs(4), uvs(5));
        for face in 0..6 {
            let mut sorted = uvs(face);
            sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
            assert_eq!(
                sorted,
                [Vec2::ZERO, Vec2::Y, Vec2::X, Vec2::ONE],
                "face {face} covers the unit square"
            );
        }
    }

    #[test]
    fn plane_uvs_tile() {
        let plane = plane_mesh();
        assert_eq!(plane.vertices[3].uv, Vec2::new(100.0, 100.0));
        assert!(plane.vertices.iter().all(|v| v.position.y == 0.0));
    }

    #[test]
    fn skybox_counts() {
        let sky = skybox_mesh();
        assert_eq!(sky.vertex_count(), 24);
        assert_eq!(sky.index_count(), 36);
        assert!(sky.validate().is_ok());
    }

    #[test]
    fn skybox_faces_inward() {
        let sky = skybox_mesh();
        for tri in sky.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| sky.vertices[tri[i] as usize]);
            let (pa, pb, pc) = (a.position.truncate(), b.position.truncate(), c.position.truncate());
            let facing = (pb - pa).cross(pc - pa).normalize();
            let centroid = (pa + pb + pc) / 3.0;
            assert!(facing.dot(centroid) < 0.0, "triangle {tri:?} faces outward");
            assert!(facing.abs_diff_eq(a.normal, 1e-6), "normal disagrees with winding");
        }
    }

    #[test]
    fn upload_creates_ten_buffers() {
        let mut device = RecordingDevice::new();
        let cube = skybox_mesh();
        let geometry = SceneGeometry::upload(&mut device, &cube, &plane_mesh()).unwrap();
        assert_eq!(device.uploads().len(), 10);
        assert_eq!(geometry.buffers(Shape::Skybox).index_count, 36);
        assert_eq!(geometry.buffers(Shape::Prop).index_count, 6);
    }

    #[test]
    fn failed_upload_names_resource() {
        let mut device = RecordingDevice::new();
        device.fail_uploads_matching("skybox.indices");
        let err = SceneGeometry::upload(&mut device, &plane_mesh(), &plane_mesh()).unwrap_err();
        match err {
            RenderError::Resource { resource, .. } => assert_eq!(resource, "skybox index buffer"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_mesh_is_rejected_before_upload() {
        let mut device = RecordingDevice::new();
        let broken = SimpleMesh {
            vertices: plane_mesh().vertices,
            indices: vec![0, 1, 9],
        };
        let err = SceneGeometry::upload(&mut device, &broken, &plane_mesh()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Resource { source: DeviceError::InvalidMesh(_), .. }
        ));
        // Plane and prop were created before the main mesh was checked.
        assert_eq!(device.uploads().len(), 6);
    }
}
