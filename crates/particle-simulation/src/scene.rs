//! Registry of renderable particle objects
//!
//! The scene owns one instance slot per attached particle. Slots of detached
//! objects are recycled, so handles stay small and the instance list the
//! renderer uploads never grows past the peak population.

use particle_physics::{ParticleInstance, RenderHandle};

#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Option<ParticleInstance>>,
    free: Vec<u32>,
    live: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a renderable object and return its handle
    pub fn attach(&mut self, instance: ParticleInstance) -> RenderHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(instance);
            return RenderHandle(index);
        }
        self.slots.push(Some(instance));
        RenderHandle((self.slots.len() - 1) as u32)
    }

    /// Overwrite the instance data of an attached object.
    /// Unknown or detached handles are ignored.
    pub fn update(&mut self, handle: RenderHandle, instance: ParticleInstance) {
        if let Some(slot) = self.slots.get_mut(handle.0 as usize) {
            if slot.is_some() {
                *slot = Some(instance);
            }
        }
    }

    /// Remove an object and release its slot.
    /// Returns false if the handle was not attached.
    pub fn detach(&mut self, handle: RenderHandle) -> bool {
        match self.slots.get_mut(handle.0 as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.free.push(handle.0);
                self.live -= 1;
                true
            }
            _ => {
                log::warn!("detach of unknown render handle {:?}", handle);
                false
            }
        }
    }

    pub fn contains(&self, handle: RenderHandle) -> bool {
        matches!(self.slots.get(handle.0 as usize), Some(Some(_)))
    }

    pub fn get(&self, handle: RenderHandle) -> Option<&ParticleInstance> {
        self.slots.get(handle.0 as usize).and_then(Option::as_ref)
    }

    /// Number of attached objects
    pub fn child_count(&self) -> usize {
        self.live
    }

    /// Attached instances in slot order (for GPU upload)
    pub fn instances(&self) -> impl Iterator<Item = &ParticleInstance> {
        self.slots.iter().flatten()
    }
}
