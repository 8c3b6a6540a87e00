//! Generational pool of live enemies.

use tile_defence_board::TileId;
use tile_defence_core::EnemyId;
use tile_defence_system_motion::Motion;

/// Enemy walking the board.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    spawn: TileId,
    motion: Motion,
}

impl Enemy {
    pub(crate) const fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) const fn spawn(&self) -> TileId {
        self.spawn
    }

    pub(crate) const fn motion(&self) -> &Motion {
        &self.motion
    }

    pub(crate) fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    enemy: Option<Enemy>,
}

/// Slot storage that reuses freed slots and bumps their generation.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnemyPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl EnemyPool {
    /// Stores a new enemy, reusing the most recently freed slot if any.
    pub(crate) fn spawn(&mut self, spawn: TileId, motion: Motion) -> EnemyId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = EnemyId::new(index, slot.generation);
        slot.enemy = Some(Enemy { id, spawn, motion });
        id
    }

    /// Frees the enemy's slot. Stale or unknown ids are ignored.
    pub(crate) fn recycle(&mut self, id: EnemyId) -> Option<Enemy> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let enemy = slot.enemy.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        Some(enemy)
    }

    /// Frees every slot.
    pub(crate) fn clear(&mut self) {
        let live: Vec<EnemyId> = self.iter().map(Enemy::id).collect();
        for id in live {
            let _ = self.recycle(id);
        }
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.enemy.as_ref())
    }

    /// Live enemies in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.slots.iter().filter_map(|slot| slot.enemy.as_ref())
    }

    /// Live enemies in slot order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.slots.iter_mut().filter_map(|slot| slot.enemy.as_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.enemy.is_some()).count()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
