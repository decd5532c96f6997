use euclid::{Point2D, Point3D, Size2D, Vector3D};
use fxhash::{FxHashMap, FxHashSet};

use crate::error::BlockError;
use crate::host::{DeviceSpace, StageSpace, WorldSpace};
use crate::scene::{Axis, MeshFormat, ProjectionAxis, SceneEngine, Space};

/// Device pixels per logical stage unit on the 3D surface.
///
/// The 3D engine renders into a surface 10x the stage's logical size layered
/// over the host canvas, so every stage coordinate entering the engine is
/// oversampled by this factor.
pub const SURFACE_OVERSAMPLE: f32 = 10.0;

/// Mesh file held in memory until an import block consumes it.
struct StoredFile {
    data: Vec<u8>,
    format: MeshFormat,
}

/// The scene block vocabulary, generic over the engine collaborator.
///
/// Owns the bookkeeping the engine does not: which object names the blocks
/// created, the named store of imported mesh files, and the pressed-key set.
/// Every operation is a thin translation from block arguments (degrees,
/// stage coordinates, axis menus) into engine calls (radians, surface
/// pixels).
pub struct SceneBlocks<E: SceneEngine> {
    engine: E,
    stage_size: Size2D<f32, StageSpace>,
    objects: FxHashSet<String>,
    files: FxHashMap<String, StoredFile>,
    keys: FxHashSet<String>,
}

impl<E: SceneEngine> SceneBlocks<E> {
    pub fn new(engine: E, stage_size: Size2D<f32, StageSpace>) -> Self {
        Self {
            engine,
            stage_size,
            objects: FxHashSet::default(),
            files: FxHashMap::default(),
            keys: FxHashSet::default(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn claim_name(&mut self, name: &str) -> Result<(), BlockError> {
        if !self.objects.insert(name.to_string()) {
            return Err(BlockError::DuplicateObject(name.to_string()));
        }
        Ok(())
    }

    fn check_known(&self, name: &str) -> Result<(), BlockError> {
        if self.objects.contains(name) {
            Ok(())
        } else {
            Err(BlockError::UnknownObject(name.to_string()))
        }
    }

    // --- object creation ---------------------------------------------------

    /// New meshes are registered as shadow casters immediately; a failure
    /// there leaves the mesh in place without shadows.
    pub fn create_box(
        &mut self,
        name: &str,
        dimensions: Vector3D<f32, WorldSpace>,
    ) -> Result<(), BlockError> {
        self.claim_name(name)?;
        self.engine.create_box(name, dimensions);
        self.engine.register_shadow_caster(name)
    }

    pub fn create_sphere(
        &mut self,
        name: &str,
        diameter: Vector3D<f32, WorldSpace>,
        segments: u32,
    ) -> Result<(), BlockError> {
        self.claim_name(name)?;
        self.engine.create_sphere(name, diameter, segments);
        self.engine.register_shadow_caster(name)
    }

    pub fn remove_object(&mut self, name: &str) -> Result<(), BlockError> {
        if !self.objects.remove(name) {
            return Err(BlockError::UnknownObject(name.to_string()));
        }
        self.engine.remove(name)
    }

    // --- file import -------------------------------------------------------

    /// Stores a picked file under a user-chosen name. The mesh format is
    /// inferred from the original file name's extension.
    pub fn store_file(
        &mut self,
        name: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), BlockError> {
        let ext = file_name.rsplit('.').next().unwrap_or("");
        let format = MeshFormat::from_extension(ext)
            .ok_or_else(|| BlockError::UnsupportedFormat(ext.to_string()))?;
        self.files.insert(name.to_string(), StoredFile { data, format });
        Ok(())
    }

    /// Imports a previously stored file into the scene as `name`.
    pub fn add_mesh_from_file(&mut self, name: &str, file: &str) -> Result<(), BlockError> {
        self.claim_name(name)?;

        // The name is released again on any failure below.
        let Some(stored) = self.files.get(file) else {
            self.objects.remove(name);
            return Err(BlockError::UnknownFile(file.to_string()));
        };
        let result = self.engine.import_mesh(name, &stored.data, stored.format);
        if result.is_err() {
            self.objects.remove(name);
            return result;
        }
        self.engine.register_shadow_caster(name)
    }

    // --- transforms --------------------------------------------------------

    pub fn move_object_to(
        &mut self,
        name: &str,
        position: Point3D<f32, WorldSpace>,
    ) -> Result<(), BlockError> {
        self.check_known(name)?;
        self.engine.set_position(name, position)
    }

    pub fn move_object_by(
        &mut self,
        name: &str,
        delta: Vector3D<f32, WorldSpace>,
        space: Space,
    ) -> Result<(), BlockError> {
        self.check_known(name)?;
        self.engine.translate(name, delta, space)
    }

    /// Block arguments are degrees; the engine speaks radians.
    pub fn rotate_object_to(
        &mut self,
        name: &str,
        degrees: Vector3D<f32, WorldSpace>,
    ) -> Result<(), BlockError> {
        self.check_known(name)?;
        self.engine.set_rotation(name, degrees * (std::f32::consts::PI / 180.0))
    }

    pub fn rotate_object_by(
        &mut self,
        name: &str,
        degrees: Vector3D<f32, WorldSpace>,
        space: Space,
    ) -> Result<(), BlockError> {
        self.check_known(name)?;
        self.engine
            .rotate(name, degrees * (std::f32::consts::PI / 180.0), space)
    }

    pub fn scale_object_to(
        &mut self,
        name: &str,
        scaling: Vector3D<f32, WorldSpace>,
    ) -> Result<(), BlockError> {
        self.check_known(name)?;
        self.engine.set_scaling(name, scaling)
    }

    pub fn object_position(&self, name: &str, axis: Axis) -> Result<f32, BlockError> {
        let position = self.engine.position(name)?;
        Ok(axis.of(position.to_vector()))
    }

    // --- camera ------------------------------------------------------------

    pub fn set_camera_fov(&mut self, fov: f32) {
        self.engine.set_camera_fov(fov);
    }

    pub fn move_camera_to(&mut self, position: Point3D<f32, WorldSpace>) {
        self.engine.set_camera_position(position);
    }

    pub fn move_camera_by(&mut self, delta: Vector3D<f32, WorldSpace>) {
        let position = self.engine.camera_position();
        self.engine.set_camera_position(position + delta);
    }

    pub fn rotate_camera_to(&mut self, degrees: Vector3D<f32, WorldSpace>) {
        self.engine
            .set_camera_rotation(degrees * (std::f32::consts::PI / 180.0));
    }

    pub fn rotate_camera_by(&mut self, degrees: Vector3D<f32, WorldSpace>) {
        let rotation = self.engine.camera_rotation();
        self.engine
            .set_camera_rotation(rotation + degrees * (std::f32::consts::PI / 180.0));
    }

    pub fn camera_position(&self, axis: Axis) -> f32 {
        axis.of(self.engine.camera_position().to_vector())
    }

    /// Camera rotation reporter, in degrees.
    pub fn camera_rotation(&self, axis: Axis) -> f32 {
        axis.of(self.engine.camera_rotation()) * (180.0 / std::f32::consts::PI)
    }

    // --- skybox ------------------------------------------------------------

    pub fn add_skybox(&mut self, base_path: &str) {
        self.engine.set_skybox(base_path);
    }

    pub fn add_skybox_from_image(&mut self, image: &[u8]) -> Result<(), BlockError> {
        self.engine.set_skybox_cross(image)
    }

    // --- picking and projection --------------------------------------------

    /// Converts a center-origin stage coordinate to the oversampled surface
    /// pixel the picking ray passes through.
    fn stage_to_surface(&self, stage: Point2D<f32, StageSpace>) -> Point2D<f32, DeviceSpace> {
        Point2D::new(
            stage.x * SURFACE_OVERSAMPLE + self.stage_size.width * SURFACE_OVERSAMPLE / 2.0,
            stage.y * SURFACE_OVERSAMPLE + self.stage_size.height * SURFACE_OVERSAMPLE / 2.0,
        )
    }

    /// Name of the mesh under the given stage coordinate, if any.
    pub fn object_hit_by_ray(&self, stage: Point2D<f32, StageSpace>) -> Option<String> {
        self.engine.pick(self.stage_to_surface(stage))
    }

    /// Stage-coordinate screen position of an object along one axis.
    ///
    /// The engine projects with y pointing down; stage coordinates point up,
    /// so the y component is negated on the way out.
    pub fn project_object(&self, name: &str, axis: ProjectionAxis) -> Result<f32, BlockError> {
        let projected = self.engine.project(name)?;
        Ok(match axis {
            ProjectionAxis::X => projected.x,
            ProjectionAxis::Y => -projected.y,
        })
    }

    // --- sound -------------------------------------------------------------

    pub fn attach_sound(&mut self, sound: &str, object: &str) -> Result<(), BlockError> {
        self.check_known(object)?;
        self.engine.attach_sound(sound, object)
    }

    pub fn move_sound(&mut self, sound: &str, position: Point3D<f32, WorldSpace>) {
        self.engine.move_sound(sound, position);
    }

    pub fn stop_sound(&mut self, sound: &str) {
        self.engine.stop_sound(sound);
    }

    // --- rendering and input -----------------------------------------------

    pub fn set_rendering(&mut self, enabled: bool) {
        self.engine.set_rendering(enabled);
    }

    /// Key events are tracked case-insensitively, matching how the block
    /// menus present key names.
    pub fn key_down(&mut self, key: &str) {
        self.keys.insert(key.to_lowercase());
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.remove(&key.to_lowercase());
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records engine calls so tests can assert on the translation layer.
    #[derive(Default)]
    struct Recorded {
        boxes: Vec<String>,
        removed: Vec<String>,
        imports: Vec<(String, usize, MeshFormat)>,
        shadow_casters: Vec<String>,
        rotations: Vec<Vector3D<f32, WorldSpace>>,
        picks: Vec<Point2D<f32, DeviceSpace>>,
        rendering: Option<bool>,
    }

    struct RecordingEngine {
        calls: Arc<Mutex<Recorded>>,
        projected: Point2D<f32, StageSpace>,
    }

    impl RecordingEngine {
        fn new() -> (Self, Arc<Mutex<Recorded>>) {
            let calls = Arc::new(Mutex::new(Recorded::default()));
            (
                Self {
                    calls: Arc::clone(&calls),
                    projected: Point2D::new(12.0, 34.0),
                },
                calls,
            )
        }
    }

    impl SceneEngine for RecordingEngine {
        fn create_box(&mut self, name: &str, _dimensions: Vector3D<f32, WorldSpace>) {
            self.calls.lock().boxes.push(name.to_string());
        }

        fn create_sphere(
            &mut self,
            _name: &str,
            _diameter: Vector3D<f32, WorldSpace>,
            _segments: u32,
        ) {
        }

        fn import_mesh(
            &mut self,
            name: &str,
            data: &[u8],
            format: MeshFormat,
        ) -> Result<(), BlockError> {
            self.calls
                .lock()
                .imports
                .push((name.to_string(), data.len(), format));
            Ok(())
        }

        fn remove(&mut self, name: &str) -> Result<(), BlockError> {
            self.calls.lock().removed.push(name.to_string());
            Ok(())
        }

        fn set_position(
            &mut self,
            _name: &str,
            _position: Point3D<f32, WorldSpace>,
        ) -> Result<(), BlockError> {
            Ok(())
        }

        fn translate(
            &mut self,
            _name: &str,
            _delta: Vector3D<f32, WorldSpace>,
            _space: Space,
        ) -> Result<(), BlockError> {
            Ok(())
        }

        fn set_rotation(
            &mut self,
            _name: &str,
            radians: Vector3D<f32, WorldSpace>,
        ) -> Result<(), BlockError> {
            self.calls.lock().rotations.push(radians);
            Ok(())
        }

        fn rotate(
            &mut self,
            _name: &str,
            radians: Vector3D<f32, WorldSpace>,
            _space: Space,
        ) -> Result<(), BlockError> {
            self.calls.lock().rotations.push(radians);
            Ok(())
        }

        fn set_scaling(
            &mut self,
            _name: &str,
            _scaling: Vector3D<f32, WorldSpace>,
        ) -> Result<(), BlockError> {
            Ok(())
        }

        fn position(&self, _name: &str) -> Result<Point3D<f32, WorldSpace>, BlockError> {
            Ok(Point3D::new(1.0, 2.0, 3.0))
        }

        fn set_camera_fov(&mut self, _fov: f32) {}
        fn set_camera_position(&mut self, _position: Point3D<f32, WorldSpace>) {}

        fn camera_position(&self) -> Point3D<f32, WorldSpace> {
            Point3D::new(0.0, 5.0, -10.0)
        }

        fn set_camera_rotation(&mut self, _radians: Vector3D<f32, WorldSpace>) {}

        fn camera_rotation(&self) -> Vector3D<f32, WorldSpace> {
            Vector3D::new(0.0, std::f32::consts::PI / 2.0, 0.0)
        }

        fn set_skybox(&mut self, _base_path: &str) {}

        fn set_skybox_cross(&mut self, _image: &[u8]) -> Result<(), BlockError> {
            Ok(())
        }

        fn pick(&self, surface: Point2D<f32, DeviceSpace>) -> Option<String> {
            self.calls.lock().picks.push(surface);
            Some("hit".to_string())
        }

        fn project(&self, _name: &str) -> Result<Point2D<f32, StageSpace>, BlockError> {
            Ok(self.projected)
        }

        fn register_shadow_caster(&mut self, name: &str) -> Result<(), BlockError> {
            self.calls.lock().shadow_casters.push(name.to_string());
            Ok(())
        }

        fn attach_sound(&mut self, _sound: &str, _object: &str) -> Result<(), BlockError> {
            Ok(())
        }

        fn move_sound(&mut self, _sound: &str, _position: Point3D<f32, WorldSpace>) {}

        fn stop_sound(&mut self, _sound: &str) {}

        fn set_rendering(&mut self, enabled: bool) {
            self.calls.lock().rendering = Some(enabled);
        }
    }

    fn test_blocks() -> (SceneBlocks<RecordingEngine>, Arc<Mutex<Recorded>>) {
        let (engine, calls) = RecordingEngine::new();
        (SceneBlocks::new(engine, Size2D::new(480.0, 360.0)), calls)
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let (mut blocks, calls) = test_blocks();
        blocks.create_box("a", Vector3D::new(1.0, 1.0, 1.0)).unwrap();
        let err = blocks.create_box("a", Vector3D::new(2.0, 2.0, 2.0));
        assert!(matches!(err, Err(BlockError::DuplicateObject(_))));
        assert_eq!(calls.lock().boxes, vec!["a"]);
    }

    #[test]
    fn remove_unknown_object_is_an_error() {
        let (mut blocks, calls) = test_blocks();
        assert!(matches!(
            blocks.remove_object("ghost"),
            Err(BlockError::UnknownObject(_))
        ));
        assert!(calls.lock().removed.is_empty());

        blocks.create_box("a", Vector3D::new(1.0, 1.0, 1.0)).unwrap();
        blocks.remove_object("a").unwrap();
        assert_eq!(calls.lock().removed, vec!["a"]);
        // The name is free again after removal.
        blocks.create_box("a", Vector3D::new(1.0, 1.0, 1.0)).unwrap();
    }

    #[test]
    fn rotation_blocks_convert_degrees_to_radians() {
        let (mut blocks, calls) = test_blocks();
        blocks.create_box("a", Vector3D::new(1.0, 1.0, 1.0)).unwrap();
        blocks
            .rotate_object_to("a", Vector3D::new(180.0, 90.0, 0.0))
            .unwrap();

        let recorded = calls.lock().rotations[0];
        assert!((recorded.x - std::f32::consts::PI).abs() < 1e-6);
        assert!((recorded.y - std::f32::consts::PI / 2.0).abs() < 1e-6);
        assert_eq!(recorded.z, 0.0);
    }

    #[test]
    fn camera_rotation_reports_degrees() {
        let (blocks, _calls) = test_blocks();
        assert!((blocks.camera_rotation(Axis::Y) - 90.0).abs() < 1e-4);
        assert_eq!(blocks.camera_position(Axis::Z), -10.0);
    }

    #[test]
    fn file_import_infers_format_from_extension() {
        let (mut blocks, calls) = test_blocks();
        blocks
            .store_file("robot", "model.glb", vec![0u8; 16])
            .unwrap();
        blocks.add_mesh_from_file("bot", "robot").unwrap();
        assert_eq!(
            calls.lock().imports.as_slice(),
            &[("bot".to_string(), 16, MeshFormat::Glb)]
        );
        assert_eq!(calls.lock().shadow_casters, vec!["bot"]);

        assert!(matches!(
            blocks.store_file("x", "model.babylon", Vec::new()),
            Err(BlockError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            blocks.add_mesh_from_file("y", "missing"),
            Err(BlockError::UnknownFile(_))
        ));
    }

    #[test]
    fn pick_converts_stage_to_oversampled_surface() {
        let (blocks, calls) = test_blocks();
        // Stage center maps to the surface center: 480*10/2, 360*10/2.
        blocks.object_hit_by_ray(Point2D::new(0.0, 0.0));
        // A point offset from center oversamples by 10 in both axes.
        blocks.object_hit_by_ray(Point2D::new(10.0, -20.0));

        let picks = calls.lock().picks.clone();
        assert_eq!(picks[0], Point2D::new(2400.0, 1800.0));
        assert_eq!(picks[1], Point2D::new(2500.0, 1600.0));
    }

    #[test]
    fn projection_negates_y() {
        let (blocks, _calls) = test_blocks();
        assert_eq!(blocks.project_object("a", ProjectionAxis::X).unwrap(), 12.0);
        assert_eq!(blocks.project_object("a", ProjectionAxis::Y).unwrap(), -34.0);
    }

    #[test]
    fn key_tracking_is_case_insensitive() {
        let (mut blocks, _calls) = test_blocks();
        blocks.key_down("A");
        assert!(blocks.is_key_pressed("a"));
        assert!(blocks.is_key_pressed("A"));

        blocks.key_up("a");
        assert!(!blocks.is_key_pressed("A"));

        // Releasing an untracked key is harmless.
        blocks.key_up("z");
    }

    #[test]
    fn rendering_toggle_reaches_engine() {
        let (mut blocks, calls) = test_blocks();
        blocks.set_rendering(false);
        assert_eq!(calls.lock().rendering, Some(false));
    }
}
