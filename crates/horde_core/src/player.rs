//! The controllable character: movement from semantic input, a two-slot
//! weapon inventory, energy, gold and item gathering.

use serde::{Deserialize, Serialize};

use crate::context::SimContext;
use crate::entity::{Body, Entity, EntityKind};
use crate::item::{Item, ItemKind};
use crate::living::{Living, Vitals};
use crate::math::Vec2;
use crate::weapon::Weapon;

/// Movement axis of the semantic input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Negative x.
    Left,
    /// Positive x.
    Right,
    /// Negative y (screen up).
    Up,
    /// Positive y (screen down).
    Down,
}

/// One of the two inventory slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponSlot {
    /// First slot.
    #[default]
    First,
    /// Second slot.
    Second,
}

impl WeaponSlot {
    const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// The other slot.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Semantic actions held by the player between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    left: f64,
    right: f64,
    up: f64,
    down: f64,
    /// Fire the active weapon every tick it is able to.
    pub using_weapon: bool,
    /// Aim direction; zero means "where the player faces".
    pub target_direction: Vec2,
    /// Gather the next overlapping item. Consumed by a gather attempt.
    pub grab: bool,
}

impl PlayerInput {
    /// Set an axis magnitude, clamped to `[0, 1]`.
    pub fn set_movement(&mut self, axis: Axis, magnitude: f64) {
        let magnitude = if magnitude.is_nan() { 0.0 } else { magnitude.clamp(0.0, 1.0) };
        match axis {
            Axis::Left => self.left = magnitude,
            Axis::Right => self.right = magnitude,
            Axis::Up => self.up = magnitude,
            Axis::Down => self.down = magnitude,
        }
    }

    /// Axis magnitude.
    #[must_use]
    pub const fn movement(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Left => self.left,
            Axis::Right => self.right,
            Axis::Up => self.up,
            Axis::Down => self.down,
        }
    }

    /// Combined movement direction, at most unit length.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        let raw = Vec2::new(self.right - self.left, self.down - self.up);
        if raw.sqr_magnitude() > 1.0 {
            raw.normalized()
        } else {
            raw
        }
    }

    /// Release every axis and action.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Player state.
#[derive(Debug, Clone)]
pub struct Player {
    vitals: Vitals,
    input: PlayerInput,
    slots: [Option<Weapon>; 2],
    active: WeaponSlot,
    dropped_weapon: Option<Weapon>,
    energy: f64,
    max_energy: f64,
    gold: u64,
}

impl Player {
    /// Create a player at full health and energy, without weapons.
    #[must_use]
    pub fn new(health: f64, speed: f64, max_energy: f64) -> Self {
        let max_energy = max_energy.max(0.0);
        Self {
            vitals: Vitals::new(health, speed),
            input: PlayerInput::default(),
            slots: [None, None],
            active: WeaponSlot::First,
            dropped_weapon: None,
            energy: max_energy,
            max_energy,
            gold: 0,
        }
    }

    /// Current input state.
    #[must_use]
    pub const fn input(&self) -> &PlayerInput {
        &self.input
    }

    /// Mutable input state.
    pub fn input_mut(&mut self) -> &mut PlayerInput {
        &mut self.input
    }

    /// Set a movement axis magnitude in `[0, 1]`.
    pub fn set_movement(&mut self, axis: Axis, magnitude: f64) {
        self.input.set_movement(axis, magnitude);
    }

    /// Hold or release the fire action.
    pub fn set_using_weapon(&mut self, using: bool) {
        self.input.using_weapon = using;
    }

    /// Aim direction.
    pub fn set_target_direction(&mut self, direction: Vec2) {
        self.input.target_direction = direction;
    }

    /// Press or release the grab action.
    pub fn set_grab_pressed(&mut self, pressed: bool) {
        self.input.grab = pressed;
    }

    /// Current energy.
    #[must_use]
    pub const fn energy(&self) -> f64 {
        self.energy
    }

    /// Maximum energy.
    #[must_use]
    pub const fn max_energy(&self) -> f64 {
        self.max_energy
    }

    /// Gold carried.
    #[must_use]
    pub const fn gold(&self) -> u64 {
        self.gold
    }

    /// Active slot.
    #[must_use]
    pub const fn active_slot(&self) -> WeaponSlot {
        self.active
    }

    /// Weapon in `slot`.
    #[must_use]
    pub fn weapon(&self, slot: WeaponSlot) -> Option<&Weapon> {
        self.slots[slot.index()].as_ref()
    }

    /// Weapon in the active slot.
    #[must_use]
    pub fn active_weapon(&self) -> Option<&Weapon> {
        self.weapon(self.active)
    }

    /// Whether `slot` holds a weapon.
    #[must_use]
    pub fn has_weapon(&self, slot: WeaponSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Weapon waiting to be dropped on the ground.
    #[must_use]
    pub const fn dropped_weapon(&self) -> Option<&Weapon> {
        self.dropped_weapon.as_ref()
    }

    /// Toggle the active slot. A projectile queued by the previous weapon is
    /// discarded. Dead players cannot switch.
    pub fn change_active_weapon(&mut self) {
        if self.vitals.is_dead() {
            return;
        }
        if let Some(weapon) = self.slots[self.active.index()].as_mut() {
            weapon.destroy_spawned();
        }
        self.active = self.active.other();
    }

    /// Move the weapon from `weapon` into `slot` if the slot is empty.
    ///
    /// On failure `weapon` is left untouched.
    pub fn grab_weapon(&mut self, weapon: &mut Option<Weapon>, slot: WeaponSlot) -> bool {
        let target = &mut self.slots[slot.index()];
        if target.is_some() || weapon.is_none() {
            return false;
        }
        *target = weapon.take();
        true
    }

    /// Move the weapon in `slot` (possibly none) to the drop area.
    ///
    /// Fails while a previous drop has not been harvested yet.
    pub fn drop_weapon(&mut self, slot: WeaponSlot) -> bool {
        if self.dropped_weapon.is_some() {
            return false;
        }
        let mut weapon = self.slots[slot.index()].take();
        if let Some(weapon) = weapon.as_mut() {
            weapon.destroy_spawned();
        }
        self.dropped_weapon = weapon;
        true
    }

    /// Gather `item`, marking it for deletion when consumed.
    ///
    /// Any attempt consumes the grab action, so one press gathers at most
    /// one item. Weapon items swap with the active weapon and fail while a
    /// dropped weapon is still waiting to be harvested.
    pub fn gather_item(&mut self, item: &mut Item, item_body: &mut Body) -> bool {
        if self.vitals.is_dead() {
            return false;
        }
        self.input.grab = false;

        match item.kind() {
            ItemKind::None => return false,
            ItemKind::Gold => {
                self.gold += whole_amount(item.strength());
            }
            ItemKind::HpPotion => {
                self.vitals.heal(item.strength());
            }
            ItemKind::EnergyPotion => {
                self.restore_energy(item.strength());
            }
            ItemKind::Weapon => {
                if !item.has_weapon() || !self.drop_weapon(self.active) {
                    return false;
                }
                if !self.grab_weapon(item.weapon_slot(), self.active) {
                    return false;
                }
            }
        }
        tracing::debug!(item = item.name(), kind = ?item.kind(), "item gathered");
        item_body.mark_for_deletion();
        true
    }

    /// Add energy up to the maximum.
    pub fn restore_energy(&mut self, amount: f64) {
        if amount > 0.0 {
            self.energy = (self.energy + amount).min(self.max_energy);
        }
    }

    fn wants_spawn(&self) -> bool {
        self.dropped_weapon.is_some() || self.slots.iter().flatten().any(Weapon::wants_spawn)
    }

    pub(crate) fn collide(&mut self, other: &mut Entity) {
        if !self.input.grab || other.body.is_marked() {
            return;
        }
        if let EntityKind::Item(item) = &mut other.kind {
            self.gather_item(item, &mut other.body);
        }
    }

    pub(crate) fn update(&mut self, body: &mut Body, delta_ms: i64, ctx: &mut SimContext) -> bool {
        self.resolve_effects(delta_ms, body, ctx);
        for weapon in self.slots.iter_mut().flatten() {
            weapon.tick(delta_ms);
        }

        if !self.vitals.is_dead() {
            let direction = self.input.direction();
            let step = direction * (self.vitals.current_speed() * delta_ms as f64);
            body.position = body.position + step;
            if direction.x() != 0.0 {
                self.vitals.set_looking_left(direction.x() < 0.0);
            }

            self.restore_energy(ctx.config.energy_regen_per_ms * delta_ms as f64);

            if self.input.using_weapon {
                self.try_attack(body);
            }
        }

        self.wants_spawn()
    }

    fn aim(&self) -> Vec2 {
        if self.input.target_direction.is_zero() {
            if self.vitals.looking_left() {
                Vec2::LEFT
            } else {
                Vec2::RIGHT
            }
        } else {
            self.input.target_direction
        }
    }

    fn try_attack(&mut self, body: &Body) {
        let aim = self.aim();
        if aim.x() != 0.0 {
            self.vitals.set_looking_left(aim.x() < 0.0);
        }
        let energy = self.energy;
        let Some(weapon) = self.slots[self.active.index()].as_mut() else {
            return;
        };
        if !weapon.is_ready() || weapon.wants_spawn() || energy < weapon.energy_cost() {
            return;
        }
        let center = body.center();
        let muzzle_x = if aim.x() >= 0.0 {
            body.far_corner().x()
        } else {
            body.position.x()
        };
        if weapon.attack(Vec2::new(muzzle_x, center.y()), aim, body.team) {
            self.energy -= weapon.energy_cost();
            weapon.start_cooldown();
        }
    }

    pub(crate) fn next_spawn(&mut self, body: &Body) -> Option<Entity> {
        if let Some(weapon) = self.dropped_weapon.take() {
            tracing::debug!(weapon = weapon.name(), "weapon dropped");
            return Some(Item::dropped_weapon(weapon, body.position));
        }
        self.slots
            .iter_mut()
            .flatten()
            .find_map(Weapon::take_spawned)
    }
}

impl Living for Player {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn on_death(&mut self, body: &mut Body, _ctx: &mut SimContext) {
        tracing::debug!(position = %body.position, "player died");
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_amount(value: f64) -> u64 {
    value.round().max(0.0) as u64
}
