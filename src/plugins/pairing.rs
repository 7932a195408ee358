// Pairing registry: each named body has a visual instance in the main world
// and a physics instance in the hidden (shadow) world.
use bevy::prelude::*;
use std::collections::HashMap;

use crate::error::{PairSide, ShotError};
use crate::plugins::core_sim::ShotSet;

/// Which physics world an instance belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldKind {
    Main,
    Hidden,
}

/// Marks an entity taking part in the visual/physics pairing.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ShotBody {
    pub name: String,
}

/// Stable index of a pairing entry. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairId(pub u32);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    pub name: String,
    pub visual: Option<Entity>,
    pub physics: Option<Entity>,
}

impl Pairing {
    pub fn require(&self) -> Result<(Entity, Entity), ShotError> {
        let visual = self.visual.ok_or_else(|| self.missing(PairSide::Visual))?;
        let physics = self.physics.ok_or_else(|| self.missing(PairSide::Physics))?;
        Ok((visual, physics))
    }

    fn missing(&self, side: PairSide) -> ShotError {
        ShotError::MissingPairing { name: self.name.clone(), side }
    }
}

#[derive(Resource, Debug, Default)]
pub struct PairingRegistry {
    ids: HashMap<String, PairId>,
    entries: Vec<Pairing>,
    owners: HashMap<Entity, PairId>,
}

impl PairingRegistry {
    /// Stores `entity` as the visual (main world) or physics (hidden world)
    /// member of the entry named `name`, creating the entry if needed.
    pub fn register(&mut self, name: &str, kind: WorldKind, entity: Entity) -> PairId {
        let id = match self.ids.get(name) {
            Some(id) => *id,
            None => {
                let id = PairId(self.entries.len() as u32);
                self.ids.insert(name.to_string(), id);
                self.entries.push(Pairing { name: name.to_string(), ..default() });
                id
            }
        };
        let entry = &mut self.entries[id.0 as usize];
        let slot = match kind {
            WorldKind::Main => &mut entry.visual,
            WorldKind::Hidden => &mut entry.physics,
        };
        if let Some(prev) = slot.replace(entity) {
            if prev != entity {
                warn!("PAIR overwrite name={} kind={:?} prev={:?} new={:?}", name, kind, prev, entity);
                self.owners.remove(&prev);
            }
        }
        self.owners.insert(entity, id);
        id
    }

    /// Clears whichever slot `entity` occupies. The entry and its id remain.
    pub fn forget(&mut self, entity: Entity) -> Option<PairId> {
        let id = self.owners.remove(&entity)?;
        let entry = &mut self.entries[id.0 as usize];
        if entry.visual == Some(entity) { entry.visual = None; }
        if entry.physics == Some(entity) { entry.physics = None; }
        Some(id)
    }

    pub fn id(&self, name: &str) -> Option<PairId> { self.ids.get(name).copied() }

    pub fn get(&self, name: &str) -> Option<&Pairing> {
        self.id(name).and_then(|id| self.by_id(id))
    }

    pub fn by_id(&self, id: PairId) -> Option<&Pairing> { self.entries.get(id.0 as usize) }

    /// Both halves of `name`, or the missing side as an error.
    pub fn require(&self, name: &str) -> Result<(Entity, Entity), ShotError> {
        match self.get(name) {
            Some(pair) => pair.require(),
            None => Err(ShotError::MissingPairing { name: name.to_string(), side: PairSide::Visual }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PairId, &Pairing)> {
        self.entries.iter().enumerate().map(|(i, p)| (PairId(i as u32), p))
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

pub struct PairingPlugin;
impl Plugin for PairingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PairingRegistry>()
            .add_systems(Update, (register_new_bodies, forget_despawned).in_set(ShotSet::Register));
    }
}

fn register_new_bodies(
    mut registry: ResMut<PairingRegistry>,
    q_new: Query<(Entity, &ShotBody, &WorldKind), Added<ShotBody>>,
) {
    for (entity, body, kind) in &q_new {
        let id = registry.register(&body.name, *kind, entity);
        debug!("PAIR register name={} kind={:?} id={}", body.name, kind, id.0);
    }
}

fn forget_despawned(mut registry: ResMut<PairingRegistry>, mut removed: RemovedComponents<ShotBody>) {
    for entity in removed.read() {
        if let Some(id) = registry.forget(entity) {
            debug!("PAIR forget entity={:?} id={}", entity, id.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forget_keeps_entry_and_id() {
        let mut reg = PairingRegistry::default();
        let e = Entity::from_raw(7);
        let id = reg.register("ball", WorldKind::Main, e);
        assert_eq!(reg.forget(e), Some(id));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("ball").and_then(|p| p.visual), None);
        assert_eq!(reg.register("ball", WorldKind::Main, Entity::from_raw(8)), id);
    }

    #[test]
    fn require_reports_missing_side() {
        let mut reg = PairingRegistry::default();
        reg.register("ball", WorldKind::Main, Entity::from_raw(1));
        match reg.require("ball") {
            Err(ShotError::MissingPairing { side, .. }) => assert_eq!(side, PairSide::Physics),
            other => panic!("unexpected {other:?}"),
        }
    }
}
