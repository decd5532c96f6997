use euclid::{Point2D, Point3D, Vector3D};

use crate::error::BlockError;
use crate::host::{DeviceSpace, StageSpace, WorldSpace};

/// Transform reference frame for relative moves and rotations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    World,
    Local,
}

/// Axis selector used by position/rotation reporter blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component of `v` along this axis.
    pub fn of(self, v: Vector3D<f32, WorldSpace>) -> f32 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }
}

/// Axis selector for screen projection, which only has two components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionAxis {
    X,
    Y,
}

/// Mesh file formats accepted by the import path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshFormat {
    Gltf,
    Glb,
    Obj,
    Stl,
}

impl MeshFormat {
    /// Parses a file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "gltf" => Some(Self::Gltf),
            "glb" => Some(Self::Glb),
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            _ => None,
        }
    }
}

/// Face UV rectangles mapping a horizontal-cross layout image onto the six
/// faces of a skybox cube, in the engine's face order
/// (+z, -z, +x, -x, +y, -y).
pub const SKYBOX_CROSS_FACE_UV: [[f32; 4]; 6] = [
    [0.75, 0.334, 1.0, 0.6665],
    [0.25, 0.334, 0.5, 0.6665],
    [0.5, 0.334, 0.75, 0.6665],
    [0.0, 0.334, 0.25, 0.6665],
    [0.25, 0.6665, 0.5, 1.0],
    [0.25, 0.0, 0.5, 0.334],
];

/// Collaborator boundary to the external 3D engine.
///
/// Everything behind this trait is sequential calls into the engine's own
/// primitives; no original geometry or rendering logic lives on this side.
/// Angles are radians, world units are the engine's. Named-mesh lookups
/// report [`BlockError::UnknownObject`] instead of panicking on a missing
/// name.
pub trait SceneEngine: Send {
    fn create_box(&mut self, name: &str, dimensions: Vector3D<f32, WorldSpace>);

    fn create_sphere(
        &mut self,
        name: &str,
        diameter: Vector3D<f32, WorldSpace>,
        segments: u32,
    );

    /// Imports a mesh from an in-memory file and registers it under `name`.
    fn import_mesh(
        &mut self,
        name: &str,
        data: &[u8],
        format: MeshFormat,
    ) -> Result<(), BlockError>;

    fn remove(&mut self, name: &str) -> Result<(), BlockError>;

    fn set_position(
        &mut self,
        name: &str,
        position: Point3D<f32, WorldSpace>,
    ) -> Result<(), BlockError>;

    fn translate(
        &mut self,
        name: &str,
        delta: Vector3D<f32, WorldSpace>,
        space: Space,
    ) -> Result<(), BlockError>;

    fn set_rotation(
        &mut self,
        name: &str,
        radians: Vector3D<f32, WorldSpace>,
    ) -> Result<(), BlockError>;

    fn rotate(
        &mut self,
        name: &str,
        radians: Vector3D<f32, WorldSpace>,
        space: Space,
    ) -> Result<(), BlockError>;

    fn set_scaling(
        &mut self,
        name: &str,
        scaling: Vector3D<f32, WorldSpace>,
    ) -> Result<(), BlockError>;

    fn position(&self, name: &str) -> Result<Point3D<f32, WorldSpace>, BlockError>;

    // Camera.
    fn set_camera_fov(&mut self, fov: f32);
    fn set_camera_position(&mut self, position: Point3D<f32, WorldSpace>);
    fn camera_position(&self) -> Point3D<f32, WorldSpace>;
    fn set_camera_rotation(&mut self, radians: Vector3D<f32, WorldSpace>);
    fn camera_rotation(&self) -> Vector3D<f32, WorldSpace>;

    /// Installs a six-face cube skybox from a base path (the engine resolves
    /// the per-face suffixes).
    fn set_skybox(&mut self, base_path: &str);

    /// Installs a skybox from a single horizontal-cross layout image, mapped
    /// with [`SKYBOX_CROSS_FACE_UV`].
    fn set_skybox_cross(&mut self, image: &[u8]) -> Result<(), BlockError>;

    /// Registers a mesh with the scene's shadow generator so it casts and
    /// receives shadows.
    fn register_shadow_caster(&mut self, name: &str) -> Result<(), BlockError>;

    /// Casts a picking ray through the oversampled surface pixel and returns
    /// the name of the nearest hit mesh.
    fn pick(&self, surface: Point2D<f32, DeviceSpace>) -> Option<String>;

    /// Projects a mesh position into the stage viewport
    /// (center-origin logical units, y still in the engine's down direction).
    fn project(&self, name: &str) -> Result<Point2D<f32, StageSpace>, BlockError>;

    // Spatial audio.
    fn attach_sound(&mut self, sound: &str, object: &str) -> Result<(), BlockError>;
    fn move_sound(&mut self, sound: &str, position: Point3D<f32, WorldSpace>);
    fn stop_sound(&mut self, sound: &str);

    /// Pauses or resumes the engine's render loop.
    fn set_rendering(&mut self, enabled: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_format_from_extension() {
        assert_eq!(MeshFormat::from_extension("glb"), Some(MeshFormat::Glb));
        assert_eq!(MeshFormat::from_extension(".glb"), Some(MeshFormat::Glb));
        assert_eq!(MeshFormat::from_extension("GLTF"), Some(MeshFormat::Gltf));
        assert_eq!(MeshFormat::from_extension("obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_extension("stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_extension("babylon"), None);
        assert_eq!(MeshFormat::from_extension(""), None);
    }

    #[test]
    fn axis_selects_component() {
        let v = Vector3D::<f32, WorldSpace>::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::X.of(v), 1.0);
        assert_eq!(Axis::Y.of(v), 2.0);
        assert_eq!(Axis::Z.of(v), 3.0);
    }
}
