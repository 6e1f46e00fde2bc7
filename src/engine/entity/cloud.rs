use crate::STEP_LEN_S;
use crate::engine::GameEngine;
use crate::engine::entity::SEEntity;
use crate::entity_struct;

entity_struct!(
    /// A transient bounce surface. Clouds drift downward under gravity
    /// and are destroyed by consumption, by falling past the bottom
    /// boundary, or by the scroll cull.
    pub struct CloudEntity {}
);

impl SEEntity for CloudEntity {
    fn step(&self, engine: &GameEngine) -> Self {
        let config = engine.config();
        let mut next_self = self.clone();
        next_self.velocity.y += (config.world_gravity + config.cloud_extra_gravity) * STEP_LEN_S;
        next_self.position.y += next_self.velocity.y * STEP_LEN_S;
        if next_self.position.y > config.cull_y {
            // fell past the bottom boundary, free the cap slot
            engine.remove_entity(self.id);
        }
        next_self
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec2;

    use super::*;
    use crate::config::GameConfig;
    use crate::engine::entity::EngineEntity;

    #[test]
    fn clouds_fall_under_gravity() {
        let mut engine = GameEngine::new(GameConfig::default(), 7);
        let id = engine.generate_id();
        let cloud = CloudEntity::new(id, Vec2::new(300., 100.), Vec2::new(80., 30.));
        engine.entities.insert(id, EngineEntity::Cloud(cloud));
        engine.step();
        let cloud = engine
            .entity_by_id::<CloudEntity>(&id)
            .expect("cloud should still exist");
        assert!(cloud.position.y > 100.);
        assert!(cloud.velocity.y > 0.);
    }

    #[test]
    fn clouds_despawn_past_the_bottom_boundary() {
        let mut engine = GameEngine::new(GameConfig::default(), 7);
        let id = engine.generate_id();
        let cloud = CloudEntity::new(id, Vec2::new(300., 599.9), Vec2::new(80., 30.));
        engine.entities.insert(id, EngineEntity::Cloud(cloud));
        engine.step();
        assert!(engine.entity_by_id::<CloudEntity>(&id).is_none());
        assert_eq!(engine.cloud_count(), 0);
    }
}
