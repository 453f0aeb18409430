//! Scene graph for the garden.
//!
//! An ordered registry of entities with parent/child transforms. Every entity
//! carries an [`Owner`] tag so an environment switch can drop exactly the
//! objects that belong to the outgoing environment.

use std::collections::HashMap;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::environment::Environment;
use crate::lighting::srgb_hex;
use crate::particle::ParticleSystem;

/// Unique identifier for scene entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Types of meshes available for instantiation.
///
/// Primitives are unit sized (see [`crate::mesh_asset`]); `Asset` refers to a
/// mesh registered by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MeshType {
    Cube,
    Plane,
    Sphere { segments: u16 },
    Cone { segments: u16 },
    Cylinder { segments: u16 },
    Disc { segments: u16 },
    Asset(String),
}

impl MeshType {
    /// Key used for geometry caching.
    pub fn cache_key(&self) -> String {
        match self {
            MeshType::Cube => "cube".to_string(),
            MeshType::Plane => "plane".to_string(),
            MeshType::Sphere { segments } => format!("sphere:{segments}"),
            MeshType::Cone { segments } => format!("cone:{segments}"),
            MeshType::Cylinder { segments } => format!("cylinder:{segments}"),
            MeshType::Disc { segments } => format!("disc:{segments}"),
            MeshType::Asset(id) => id.clone(),
        }
    }
}

/// Who an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Lives for the whole session (ground, sky particles).
    Global,
    /// Built by an environment and dropped when it is torn down.
    Environment(Environment),
    /// Spawned at runtime (light-flowers); also dropped on teardown.
    Transient,
}

impl Owner {
    /// True for everything an environment teardown removes.
    pub fn is_environment_scoped(self) -> bool {
        !matches!(self, Owner::Global)
    }
}

/// Transform component for scene entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-parent matrix.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// Surface parameters for a mesh instance. Colors are linear RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    /// Emissive color already multiplied by its intensity.
    pub emissive: [f32; 3],
    pub opacity: f32,
}

impl Material {
    /// Matte material from an sRGB hex color.
    pub fn hex(color: u32) -> Self {
        Self {
            color: srgb_hex(color).to_array(),
            emissive: [0.0; 3],
            opacity: 1.0,
        }
    }

    pub fn with_emissive(mut self, emissive: u32, intensity: f32) -> Self {
        self.emissive = (srgb_hex(emissive) * intensity).to_array();
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// A mesh instance - references shared geometry with its own transform.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub mesh_type: MeshType,
    pub material: Material,
    pub transform: Transform,
    pub visible: bool,
}

impl MeshInstance {
    pub fn new(mesh_type: MeshType, material: Material) -> Self {
        Self {
            mesh_type,
            material,
            transform: Transform::default(),
            visible: true,
        }
    }
}

/// Camera-facing butterfly quad.
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Wing pattern, 1..=3.
    pub palette: u8,
    /// Position plus width (x) and height (y) in `scale`.
    pub transform: Transform,
    pub visible: bool,
}

/// A scene entity.
#[derive(Debug, Clone)]
pub enum SceneEntity {
    Mesh(MeshInstance),
    /// Transform-only node used to move several children together.
    Group { transform: Transform, visible: bool },
    Particles(ParticleSystem),
    Sprite(Sprite),
}

impl SceneEntity {
    pub fn group(transform: Transform) -> Self {
        SceneEntity::Group {
            transform,
            visible: true,
        }
    }

    /// Get a reference to the entity's transform.
    pub fn transform(&self) -> &Transform {
        match self {
            SceneEntity::Mesh(m) => &m.transform,
            SceneEntity::Group { transform, .. } => transform,
            SceneEntity::Particles(p) => &p.transform,
            SceneEntity::Sprite(s) => &s.transform,
        }
    }

    /// Get a mutable reference to the entity's transform.
    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            SceneEntity::Mesh(m) => &mut m.transform,
            SceneEntity::Group { transform, .. } => transform,
            SceneEntity::Particles(p) => &mut p.transform,
            SceneEntity::Sprite(s) => &mut s.transform,
        }
    }

    /// Check if the entity is visible.
    pub fn visible(&self) -> bool {
        match self {
            SceneEntity::Mesh(m) => m.visible,
            SceneEntity::Group { visible, .. } => *visible,
            SceneEntity::Particles(p) => p.visible,
            SceneEntity::Sprite(s) => s.visible,
        }
    }

    /// Set the entity's visibility.
    pub fn set_visible(&mut self, value: bool) {
        match self {
            SceneEntity::Mesh(m) => m.visible = value,
            SceneEntity::Group { visible, .. } => *visible = value,
            SceneEntity::Particles(p) => p.visible = value,
            SceneEntity::Sprite(s) => s.visible = value,
        }
    }
}

/// An entity plus its place in the hierarchy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub entity: SceneEntity,
    pub owner: Owner,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }
}

/// The scene graph - owns every entity in the garden.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: HashMap<EntityId, SceneNode>,
    /// Root entities in insertion order (these are drawn).
    scene_entities: Vec<EntityId>,
    /// Next entity ID to assign.
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            scene_entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Generate a new unique entity ID.
    fn new_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a root entity and add it to the scene.
    pub fn spawn(&mut self, entity: SceneEntity, owner: Owner) -> EntityId {
        let id = self.new_id();
        self.nodes.insert(
            id,
            SceneNode {
                entity,
                owner,
                parent: None,
                children: Vec::new(),
            },
        );
        self.scene_entities.push(id);
        id
    }

    /// Create an entity under `parent`. The child inherits the parent's owner.
    ///
    /// Returns `None` if the parent does not exist.
    pub fn spawn_child(&mut self, parent: EntityId, entity: SceneEntity) -> Option<EntityId> {
        let owner = self.nodes.get(&parent)?.owner;
        let id = self.new_id();
        self.nodes.insert(
            id,
            SceneNode {
                entity,
                owner,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Some(id)
    }

    /// Shorthand for a mesh child with a transform.
    pub fn spawn_mesh(
        &mut self,
        parent: EntityId,
        mesh_type: MeshType,
        material: Material,
        transform: Transform,
    ) -> Option<EntityId> {
        let mut mesh = MeshInstance::new(mesh_type, material);
        mesh.transform = transform;
        self.spawn_child(parent, SceneEntity::Mesh(mesh))
    }

    /// Destroy an entity and all its descendants.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => self.scene_entities.retain(|&e| e != id),
        }

        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(n) = self.nodes.remove(&child) {
                stack.extend(n.children);
            }
        }
        true
    }

    /// Destroy every root entity whose owner matches `predicate`.
    ///
    /// Returns the number of root entities removed.
    pub fn clear_owned(&mut self, predicate: impl Fn(Owner) -> bool) -> usize {
        let doomed: Vec<EntityId> = self
            .scene_entities
            .iter()
            .copied()
            .filter(|id| self.nodes.get(id).is_some_and(|n| predicate(n.owner)))
            .collect();
        for id in &doomed {
            self.destroy(*id);
        }
        doomed.len()
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.nodes.get(&id).map(|n| &n.entity)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.nodes.get_mut(&id).map(|n| &mut n.entity)
    }

    pub fn node(&self, id: EntityId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn owner(&self, id: EntityId) -> Option<Owner> {
        self.nodes.get(&id).map(|n| n.owner)
    }

    /// Get the parent of an entity, if any.
    pub fn get_parent(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Root entities in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = (EntityId, &SceneNode)> {
        self.scene_entities
            .iter()
            .filter_map(|&id| self.nodes.get(&id).map(|n| (id, n)))
    }

    /// World matrix of an entity (parent chain applied).
    pub fn world_matrix(&self, id: EntityId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(&current) else {
                break;
            };
            matrix = node.entity.transform().matrix() * matrix;
            cursor = node.parent;
        }
        matrix
    }

    /// Visit every visible entity depth-first in scene order with its world matrix.
    ///
    /// Hidden entities hide their whole subtree.
    pub fn visit_visible(&self, mut f: impl FnMut(EntityId, &SceneEntity, Mat4)) {
        let mut stack: Vec<(EntityId, Mat4)> = self
            .scene_entities
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();

        while let Some((id, parent_matrix)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !node.entity.visible() {
                continue;
            }
            let world = parent_matrix * node.entity.transform().matrix();
            f(id, &node.entity, world);
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Clear all entities and the scene.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.scene_entities.clear();
    }

    /// Check if an entity exists.
    pub fn exists(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Total number of entities, children included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of entities (children included) whose owner matches.
    pub fn count_owned(&self, predicate: impl Fn(Owner) -> bool) -> usize {
        self.nodes.values().filter(|n| predicate(n.owner)).count()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(mesh_type: MeshType) -> SceneEntity {
        SceneEntity::Mesh(MeshInstance::new(mesh_type, Material::hex(0xffffff)))
    }

    #[test]
    fn test_spawn_root_and_child() {
        let mut scene = SceneGraph::new();
        let group = scene.spawn(SceneEntity::group(Transform::default()), Owner::Global);
        let child = scene.spawn_child(group, mesh(MeshType::Cube)).unwrap();

        assert!(scene.exists(child));
        assert_eq!(scene.get_parent(child), Some(group));
        assert_eq!(scene.owner(child), Some(Owner::Global));
        assert_eq!(scene.roots().count(), 1);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_spawn_child_of_missing_parent() {
        let mut scene = SceneGraph::new();
        assert!(scene.spawn_child(EntityId(99), mesh(MeshType::Cube)).is_none());
    }

    #[test]
    fn test_destroy_removes_descendants() {
        let mut scene = SceneGraph::new();
        let group = scene.spawn(SceneEntity::group(Transform::default()), Owner::Global);
        let inner = scene.spawn_child(group, SceneEntity::group(Transform::default())).unwrap();
        let leaf = scene.spawn_child(inner, mesh(MeshType::Plane)).unwrap();

        assert!(scene.destroy(group));
        assert!(!scene.exists(inner));
        assert!(!scene.exists(leaf));
        assert!(scene.is_empty());
        assert!(!scene.destroy(group));
    }

    #[test]
    fn test_destroy_child_detaches_from_parent() {
        let mut scene = SceneGraph::new();
        let group = scene.spawn(SceneEntity::group(Transform::default()), Owner::Global);
        let child = scene.spawn_child(group, mesh(MeshType::Cube)).unwrap();

        assert!(scene.destroy(child));
        assert!(scene.node(group).unwrap().children().is_empty());
    }

    #[test]
    fn test_clear_owned_keeps_global() {
        let mut scene = SceneGraph::new();
        let ground = scene.spawn(mesh(MeshType::Plane), Owner::Global);
        scene.spawn(mesh(MeshType::Cube), Owner::Environment(Environment::Valley));
        scene.spawn(mesh(MeshType::Cube), Owner::Transient);

        let removed = scene.clear_owned(Owner::is_environment_scoped);
        assert_eq!(removed, 2);
        assert!(scene.exists(ground));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_world_matrix_composes_parent() {
        let mut scene = SceneGraph::new();
        let group = scene.spawn(
            SceneEntity::group(Transform::at(Vec3::new(10.0, 0.0, 0.0))),
            Owner::Global,
        );
        let child = scene
            .spawn_mesh(
                group,
                MeshType::Cube,
                Material::hex(0xffffff),
                Transform::at(Vec3::new(0.0, 2.0, 0.0)),
            )
            .unwrap();

        let world = scene.world_matrix(child).transform_point3(Vec3::ZERO);
        assert!(world.distance(Vec3::new(10.0, 2.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_visit_skips_hidden_subtrees() {
        let mut scene = SceneGraph::new();
        let group = scene.spawn(SceneEntity::group(Transform::default()), Owner::Global);
        scene.spawn_child(group, mesh(MeshType::Cube)).unwrap();
        scene.spawn(mesh(MeshType::Plane), Owner::Global);

        let mut visited = 0;
        scene.visit_visible(|_, _, _| visited += 1);
        assert_eq!(visited, 3);

        scene.get_mut(group).unwrap().set_visible(false);
        let mut visited = 0;
        scene.visit_visible(|_, _, _| visited += 1);
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_visit_order_follows_insertion() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn(mesh(MeshType::Cube), Owner::Global);
        let b = scene.spawn(mesh(MeshType::Plane), Owner::Global);

        let mut order = Vec::new();
        scene.visit_visible(|id, _, _| order.push(id));
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_mesh_type_cache_keys_are_distinct() {
        assert_ne!(
            MeshType::Cone { segments: 6 }.cache_key(),
            MeshType::Cone { segments: 5 }.cache_key()
        );
        assert_eq!(MeshType::Asset("river".into()).cache_key(), "river");
    }
}
