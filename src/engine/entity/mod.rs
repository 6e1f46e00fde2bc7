use std::any::Any;

use bevy_math::Rect;
use bevy_math::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoroshiro64StarStar;
use serde::Deserialize;
use serde::Serialize;

use crate::engine::GameEngine;

pub mod cloud;
pub mod player;
pub mod spawner;

/// Inputs that may be applied to any entity.
#[derive(Default, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct EntityInput {
    pub jump: bool,
    pub move_left: bool,
    pub move_right: bool,
}

/// An entity that exists inside the engine.
pub trait EEntity: Any + Clone {
    fn id(&self) -> u128;
    fn position(&self) -> Vec2;
    fn position_mut(&mut self) -> &mut Vec2;
    fn size(&self) -> Vec2;
    fn velocity(&self) -> Vec2;

    /// deterministic rng for entities, safe for replay
    fn rng(&self, step_index: &u64) -> Xoroshiro64StarStar {
        let id = self.id();
        let first_half = (id >> 64) as u64;
        let second_half = id as u64;
        let seed = first_half ^ second_half ^ step_index;
        Xoroshiro64StarStar::seed_from_u64(seed)
    }

    fn center(&self) -> Vec2 {
        self.position() + self.size() / 2.
    }

    fn rect(&self) -> Rect {
        let pos = self.position();
        let size = self.size();
        Rect::new(pos.x, pos.y, pos.x + size.x, pos.y + size.y)
    }
}

/// A _steppable_ entity. Stepping never mutates in place: it returns
/// the next version of the entity, scheduling any side effects on the
/// engine through its event channels.
pub trait SEEntity: EEntity {
    fn step(&self, _engine: &GameEngine) -> Self
    where
        Self: Sized,
    {
        self.clone()
    }
}

/// Properties that all engine entities have. This macro is optional, you may
/// implement EEntity explicitly elsewhere.
#[macro_export]
macro_rules! entity_struct {
    (
        $(#[$struct_attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field_name:ident: $field_type:ty
            ),*
            $(,)?
        }
    ) => {
        $(#[$struct_attr])*
        #[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Default, PartialEq)]
        $vis struct $name {
            #[serde(default)]
            pub id: u128,
            #[serde(default)]
            pub position: bevy_math::Vec2,
            #[serde(default)]
            pub size: bevy_math::Vec2,
            #[serde(default)]
            pub velocity: bevy_math::Vec2,
            $(
                $(#[$field_attr])*
                $field_vis $field_name: $field_type,
            )*
        }

        impl $name {
            pub fn new(id: u128, position: bevy_math::Vec2, size: bevy_math::Vec2) -> Self {
                Self {
                    id,
                    position,
                    size,
                    ..Default::default()
                }
            }
        }

        impl $crate::engine::entity::EEntity for $name {
            fn id(&self) -> u128 {
                self.id
            }

            fn position(&self) -> bevy_math::Vec2 {
                self.position
            }

            fn position_mut(&mut self) -> &mut bevy_math::Vec2 {
                &mut self.position
            }

            fn size(&self) -> bevy_math::Vec2 {
                self.size
            }

            fn velocity(&self) -> bevy_math::Vec2 {
                self.velocity
            }
        }
    };
}

#[macro_export]
macro_rules! engine_entity_enum {
    (
        $(#[$enum_attr:meta])*
        $vis:vis enum $name:ident {
            $(
                $variant_name:ident($variant_type:ty)
            ),* $(,)?
        }
    ) => {
        $(#[$enum_attr])*
        $vis enum $name {
            $(
                $variant_name($variant_type),
            )*
        }

        impl $name {
            pub fn as_any(&self) -> &dyn std::any::Any {
                match self {
                    $(
                        $name::$variant_name(entity) => entity,
                    )*
                }
            }

            pub fn get_ref<T: 'static>(&self) -> Option<&T> {
                self.as_any().downcast_ref::<T>()
            }

            pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
                match self {
                    $(
                        $name::$variant_name(entity) => {
                            let entity: &mut dyn std::any::Any = entity;
                            entity.downcast_mut::<T>()
                        },
                    )*
                }
            }
        }

        $(
            impl From<$variant_type> for $name {
                fn from(value: $variant_type) -> Self {
                    $name::$variant_name(value)
                }
            }
        )*

        impl $crate::engine::entity::SEEntity for $name {
            fn step(&self, engine: &$crate::engine::GameEngine) -> Self {
                match self {
                    $(
                        $name::$variant_name(entity) => $name::$variant_name(entity.step(engine)),
                    )*
                }
            }
        }

        impl $crate::engine::entity::EEntity for $name {
            fn id(&self) -> u128 {
                match self {
                    $(
                        $name::$variant_name(entity) => entity.id(),
                    )*
                }
            }

            fn position(&self) -> bevy_math::Vec2 {
                match self {
                    $(
                        $name::$variant_name(entity) => entity.position(),
                    )*
                }
            }

            fn position_mut(&mut self) -> &mut bevy_math::Vec2 {
                match self {
                    $(
                        $name::$variant_name(entity) => entity.position_mut(),
                    )*
                }
            }

            fn size(&self) -> bevy_math::Vec2 {
                match self {
                    $(
                        $name::$variant_name(entity) => entity.size(),
                    )*
                }
            }

            fn velocity(&self) -> bevy_math::Vec2 {
                match self {
                    $(
                        $name::$variant_name(entity) => entity.velocity(),
                    )*
                }
            }
        }
    };
}

engine_entity_enum!(
    /// Enum to wrap all possible entity types
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub enum EngineEntity {
        Player(player::PlayerEntity),
        Cloud(cloud::CloudEntity),
        CloudSpawn(spawner::CloudSpawnEntity),
    }
);
