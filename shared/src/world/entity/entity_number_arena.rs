use std::collections::VecDeque;

use log::debug;

use crate::{
    types::{EntityNumber, EntityVersion},
    world::entity::{
        crdt_entity::CrdtEntity,
        error::EntityError,
        special_entities::{
            OTHER_PLAYER_ENTITIES_FROM, OTHER_PLAYER_ENTITIES_TO, RESERVED_STATIC_ENTITIES,
        },
    },
};

struct Slot {
    version: EntityVersion,
    alive: bool,
}

/// Generational allocator for entity numbers within a fixed range.
///
/// Freed numbers are recycled oldest-first and come back with their version
/// incremented, so a handle to the previous occupant never compares equal to
/// the new one.
pub struct EntityNumberArena {
    start: u32,
    end: u32,
    slots: Vec<Slot>,
    recycled: VecDeque<EntityNumber>,
}

impl EntityNumberArena {
    /// `start..end`, `end` may be `u16::MAX + 1`
    pub fn new(start: EntityNumber, end: u32) -> Self {
        let end = end.min(u32::from(EntityNumber::MAX) + 1);
        Self {
            start: u32::from(start),
            end,
            slots: Vec::new(),
            recycled: VecDeque::new(),
        }
    }

    /// Numbers a scene may use: everything above the reserved block
    pub fn for_scene() -> Self {
        Self::new(RESERVED_STATIC_ENTITIES, u32::from(EntityNumber::MAX) + 1)
    }

    /// Numbers the engine hands out for its own entities
    pub fn for_engine() -> Self {
        Self::new(
            OTHER_PLAYER_ENTITIES_FROM,
            u32::from(OTHER_PLAYER_ENTITIES_TO),
        )
    }

    pub fn allocate(&mut self) -> Result<CrdtEntity, EntityError> {
        if let Some(number) = self.recycled.pop_front() {
            let index = self.index_of(number);
            let slot = &mut self.slots[index];
            slot.alive = true;
            return Ok(CrdtEntity::from_parts(number, slot.version));
        }

        let next = self.start + self.slots.len() as u32;
        if next >= self.end {
            return Err(EntityError::ArenaExhausted {
                start: self.start,
                end: self.end,
            });
        }

        self.slots.push(Slot {
            version: 0,
            alive: true,
        });
        // next < end <= u16::MAX + 1
        Ok(CrdtEntity::from_parts(next as EntityNumber, 0))
    }

    pub fn free(&mut self, entity: &CrdtEntity) -> Result<(), EntityError> {
        let index = self.checked_index(entity.number())?;
        let slot = &mut self.slots[index];

        if !slot.alive || slot.version != entity.version() {
            return Err(EntityError::NotAlive {
                number: entity.number(),
                version: entity.version(),
                current: slot.version,
            });
        }

        slot.alive = false;
        slot.version = slot.version.wrapping_add(1);
        self.recycled.push_back(entity.number());
        debug!(
            "EntityNumberArena: freed {:?}, next version {}",
            entity, slot.version
        );
        Ok(())
    }

    pub fn is_alive(&self, entity: &CrdtEntity) -> bool {
        match self.checked_index(entity.number()) {
            Ok(index) => {
                let slot = &self.slots[index];
                slot.alive && slot.version == entity.version()
            }
            Err(_) => false,
        }
    }

    pub fn contains_number(&self, number: EntityNumber) -> bool {
        let number = u32::from(number);
        number >= self.start && number < self.end
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }

    fn checked_index(&self, number: EntityNumber) -> Result<usize, EntityError> {
        if !self.contains_number(number) {
            return Err(EntityError::OutOfRange {
                number,
                start: self.start,
                end: self.end,
            });
        }
        let index = self.index_of(number);
        if index >= self.slots.len() {
            // never handed out
            return Err(EntityError::NotAlive {
                number,
                version: 0,
                current: 0,
            });
        }
        Ok(index)
    }

    fn index_of(&self, number: EntityNumber) -> usize {
        (u32::from(number) - self.start) as usize
    }
}
