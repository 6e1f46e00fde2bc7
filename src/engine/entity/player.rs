use bevy_math::Rect;

use crate::STEP_LEN_S;
use crate::engine::GameEngine;
use crate::engine::GamePhase;
use crate::engine::actor;
use crate::engine::actor::ContactSide;
use crate::engine::entity::EEntity;
use crate::engine::entity::SEEntity;
use crate::engine::entity::cloud::CloudEntity;
use crate::engine::game_event::GameEvent;
use crate::entity_struct;

entity_struct!(
    pub struct PlayerEntity {
        pub facing_left: bool,
    }
);

impl SEEntity for PlayerEntity {
    fn step(&self, engine: &GameEngine) -> Self {
        let config = engine.config();
        let mut next_self = self.clone();
        let mut velocity = self.velocity;
        let input = engine.input_for_entity(&self.id);
        let grounded = actor::on_floor(&self.rect(), config.world_size);

        // run speeds are asymmetric on purpose
        if input.move_left {
            velocity.x = -config.move_speed_left;
            next_self.facing_left = true;
        } else if input.move_right {
            velocity.x = config.move_speed_right;
            next_self.facing_left = false;
        } else {
            velocity.x = 0.;
        }

        // jumping is only allowed off the floor; cloud bounces supply
        // their own impulse
        if input.jump && grounded {
            velocity.y = -config.jump_impulse;
        }

        velocity.y += (config.world_gravity + config.player_extra_gravity) * STEP_LEN_S;
        // soft terminal-velocity nudge while airborne
        if !grounded && velocity.y < config.fall_speed_soft_cap {
            velocity.y += config.fall_nudge;
        }

        let mut position = self.position + velocity * STEP_LEN_S;
        position.x = actor::clamp_x(position.x, self.size.x, config.world_size.x);
        let floor_y = config.world_size.y - self.size.y;
        if position.y >= floor_y {
            position.y = floor_y;
            velocity.y = velocity.y.min(0.);
        } else if position.y < 0. {
            position.y = 0.;
            velocity.y = velocity.y.max(0.);
        }
        next_self.position = position;
        next_self.velocity = velocity;

        // vertical cloud contact consumes the cloud; resolution happens
        // in the engine's game event handler at the end of this step
        if engine.phase() == GamePhase::Playing {
            let body = Rect::new(
                position.x,
                position.y,
                position.x + self.size.x,
                position.y + self.size.y,
            );
            for cloud in engine.entities_by_type::<CloudEntity>() {
                match actor::contact_side(&body, &cloud.rect()) {
                    Some(ContactSide::Above) | Some(ContactSide::Below) => {
                        engine.register_game_event(GameEvent::CloudBounce {
                            player_id: self.id,
                            cloud_id: cloud.id,
                        });
                        break;
                    }
                    Some(ContactSide::Side) | None => {}
                }
            }
        }
        next_self
    }
}
