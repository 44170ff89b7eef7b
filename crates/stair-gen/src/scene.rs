//! Scene object registry.
//!
//! Generated instances are owned through opaque handles rather than
//! rediscovered by name: an operation that created objects keeps their
//! handles and acts on exactly those. The `"<origin>_Duplicate_<n>"` naming
//! convention is still written on every generated instance because it is the
//! ordering contract — sequence numbers are 1-based, strictly increasing,
//! and every operation that reconstructs "current instances" re-sorts by the
//! parsed sequence number before acting. A name-prefix sweep backs up
//! handle-based clearing so stale objects from earlier runs are removed too.

use hashbrown::HashMap;
use tracing::debug;

use crate::transform::Transform;
use crate::types::Mesh;

/// Opaque handle to an object in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(u32);

/// A named object in the scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    /// Material name carried along when meshes are combined or welded.
    pub material: Option<String>,
    /// Opaque blend-shape weight vector; storage and baking stay external.
    pub blend_weights: Option<Vec<f64>>,
    /// Whether a collider mirrors this object's mesh.
    pub has_collider: bool,
    pub parent: Option<ObjectHandle>,
}

impl SceneObject {
    /// Create an empty object at the given transform.
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh: None,
            material: None,
            blend_weights: None,
            has_collider: false,
            parent: None,
        }
    }

    /// Attach a mesh.
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }
}

/// Arena of scene objects keyed by opaque handles.
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashMap<u32, SceneObject>,
    next_id: u32,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Add an object and return its handle.
    pub fn spawn(&mut self, object: SceneObject) -> ObjectHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, object);
        ObjectHandle(id)
    }

    /// Remove an object, returning it if it was present.
    pub fn remove(&mut self, handle: ObjectHandle) -> Option<SceneObject> {
        self.objects.remove(&handle.0)
    }

    /// Remove an object and everything parented under it.
    /// Returns the number of objects removed.
    pub fn remove_with_children(&mut self, handle: ObjectHandle) -> usize {
        let children: Vec<u32> = self
            .objects
            .iter()
            .filter(|(_, obj)| obj.parent == Some(handle))
            .map(|(&id, _)| id)
            .collect();

        let mut removed = 0;
        for id in children {
            removed += self.remove_with_children(ObjectHandle(id));
        }
        if self.objects.remove(&handle.0).is_some() {
            removed += 1;
        }
        removed
    }

    /// Look up an object by handle.
    pub fn get(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.get(&handle.0)
    }

    /// Look up an object mutably by handle.
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        self.objects.get_mut(&handle.0)
    }

    /// True if the handle still refers to a live object.
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle.0)
    }

    /// Handles of all live objects, in creation order.
    pub fn handles(&self) -> Vec<ObjectHandle> {
        let mut ids: Vec<u32> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(ObjectHandle).collect()
    }

    /// Find the first object with the given exact name.
    pub fn find_by_name(&self, name: &str) -> Option<ObjectHandle> {
        self.handles()
            .into_iter()
            .find(|h| self.objects[&h.0].name == name)
    }

    /// All duplicates of an origin, sorted by their 1-based sequence number.
    pub fn duplicates_of(&self, origin_name: &str) -> Vec<(u32, ObjectHandle)> {
        let mut found: Vec<(u32, ObjectHandle)> = self
            .handles()
            .into_iter()
            .filter_map(|h| {
                parse_duplicate_seq(&self.objects[&h.0].name, origin_name).map(|seq| (seq, h))
            })
            .collect();
        found.sort_by_key(|&(seq, _)| seq);
        found
    }

    /// Remove every object whose name marks it as a duplicate of the origin,
    /// regardless of which run created it. Returns the number removed.
    pub fn remove_named_duplicates(&mut self, origin_name: &str) -> usize {
        let prefix = format!("{origin_name}_Duplicate");
        let stale: Vec<u32> = self
            .objects
            .iter()
            .filter(|(_, obj)| obj.name.starts_with(&prefix))
            .map(|(&id, _)| id)
            .collect();

        let removed = stale.len();
        for id in &stale {
            self.objects.remove(id);
        }
        if removed > 0 {
            debug!(origin = origin_name, removed, "Swept stale duplicates");
        }
        removed
    }
}

/// Format the canonical duplicate name for a 1-based sequence number.
pub fn duplicate_name(origin_name: &str, seq: u32) -> String {
    format!("{origin_name}_Duplicate_{seq}")
}

/// Parse the 1-based sequence number out of a duplicate name.
///
/// Returns None if the name does not follow the convention for this origin.
pub fn parse_duplicate_seq(name: &str, origin_name: &str) -> Option<u32> {
    let prefix = format!("{origin_name}_Duplicate_");
    name.strip_prefix(&prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_get_remove() {
        let mut scene = Scene::new();
        let h = scene.spawn(SceneObject::new("step", Transform::identity()));
        assert!(scene.contains(h));
        assert_eq!(scene.get(h).unwrap().name, "step");

        let obj = scene.remove(h).unwrap();
        assert_eq!(obj.name, "step");
        assert!(!scene.contains(h));
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut scene = Scene::new();
        let a = scene.spawn(SceneObject::new("a", Transform::identity()));
        scene.remove(a);
        let b = scene.spawn(SceneObject::new("b", Transform::identity()));
        assert_ne!(a, b);
        assert!(!scene.contains(a));
    }

    #[test]
    fn test_duplicate_name_round_trip() {
        let name = duplicate_name("step", 7);
        assert_eq!(name, "step_Duplicate_7");
        assert_eq!(parse_duplicate_seq(&name, "step"), Some(7));
        assert_eq!(parse_duplicate_seq(&name, "other"), None);
        assert_eq!(parse_duplicate_seq("step_Duplicate_x", "step"), None);
    }

    #[test]
    fn test_duplicates_of_sorted_by_sequence() {
        let mut scene = Scene::new();
        // Spawn out of order; lookup must re-sort by sequence number.
        for seq in [3u32, 1, 2] {
            scene.spawn(SceneObject::new(
                duplicate_name("step", seq),
                Transform::identity(),
            ));
        }
        scene.spawn(SceneObject::new("unrelated", Transform::identity()));

        let dups = scene.duplicates_of("step");
        let seqs: Vec<u32> = dups.iter().map(|&(seq, _)| seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_named_duplicates() {
        let mut scene = Scene::new();
        scene.spawn(SceneObject::new("step_Duplicate_1", Transform::identity()));
        scene.spawn(SceneObject::new("step_Duplicate_2", Transform::identity()));
        let keep = scene.spawn(SceneObject::new("step", Transform::identity()));

        assert_eq!(scene.remove_named_duplicates("step"), 2);
        assert!(scene.contains(keep));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_remove_with_children() {
        let mut scene = Scene::new();
        let container = scene.spawn(SceneObject::new("container", Transform::identity()));
        let mut child = SceneObject::new("child", Transform::identity());
        child.parent = Some(container);
        scene.spawn(child);

        assert_eq!(scene.remove_with_children(container), 2);
        assert!(scene.is_empty());
    }
}
