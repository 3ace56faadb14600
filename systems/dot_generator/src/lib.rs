#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded generation of the entities shown in a round.

use dot_estimate_core::{
    AxisSign, ColorMode, DotRange, Drift, Entity, EntityColor, EntityId, EntityStyle, Position,
    Shape, ShapeMode, SPAWN_EXTENT,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LARGEST_MAGNITUDE: f32 = 1.0 - f32::EPSILON;

/// Parameters describing one round of entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationRequest {
    /// Inclusive range the entity count is drawn from.
    pub range: DotRange,
    /// How shapes are chosen.
    pub shape_mode: ShapeMode,
    /// How colors are chosen.
    pub color_mode: ColorMode,
}

/// Random entity source reproducible from a seed.
#[derive(Clone, Debug)]
pub struct DotGenerator {
    rng: ChaCha8Rng,
}

impl DotGenerator {
    /// Creates a generator whose output is reproducible from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generates the entities of a round. The count is uniform over the
    /// requested range.
    ///
    /// Every entity carries a drift descriptor; a drift speed of zero keeps
    /// it still.
    pub fn generate(&mut self, request: &GenerationRequest) -> Vec<Entity> {
        let count = self.rng.gen_range(request.range.as_range());
        (0..count)
            .map(|index| {
                let top = self.rng.gen_range(0.0..SPAWN_EXTENT);
                let left = self.rng.gen_range(0.0..SPAWN_EXTENT);
                let shape = self.pick_shape(request.shape_mode);
                let color = self.pick_color(request.color_mode);
                let drift = Some(self.pick_drift());
                Entity {
                    id: EntityId::new(index),
                    position: Position::new(top, left),
                    shape,
                    color,
                    drift,
                }
            })
            .collect()
    }

    /// Computes fresh styles for live entities after an appearance change,
    /// drawing them the same way generation does.
    pub fn restyle(
        &mut self,
        entities: &[Entity],
        shape_mode: ShapeMode,
        color_mode: ColorMode,
    ) -> Vec<EntityStyle> {
        entities
            .iter()
            .map(|entity| EntityStyle {
                entity: entity.id,
                shape: self.pick_shape(shape_mode),
                color: self.pick_color(color_mode),
            })
            .collect()
    }

    fn pick_shape(&mut self, mode: ShapeMode) -> Shape {
        match mode {
            ShapeMode::Circles => Shape::Circle,
            ShapeMode::Squares => Shape::Square,
            ShapeMode::Mixed => {
                if self.rng.gen_bool(0.5) {
                    Shape::Circle
                } else {
                    Shape::Square
                }
            }
        }
    }

    fn pick_color(&mut self, mode: ColorMode) -> EntityColor {
        match mode {
            ColorMode::Fixed(color) => color,
            ColorMode::Mixed => EntityColor::from_u24(self.rng.gen_range(0..=0x00ff_ffff)),
        }
    }

    fn pick_drift(&mut self) -> Drift {
        let sign_x = self.pick_sign();
        let sign_y = self.pick_sign();
        let sample: f32 = self.rng.gen();
        let magnitude = ((sample - 0.5).abs() * 2.0).min(LARGEST_MAGNITUDE);
        Drift::new(sign_x, sign_y, magnitude)
    }

    fn pick_sign(&mut self) -> AxisSign {
        if self.rng.gen_bool(0.5) {
            AxisSign::Positive
        } else {
            AxisSign::Negative
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_estimate_core::Level;
    use proptest::prelude::*;

    fn request(range: DotRange) -> GenerationRequest {
        GenerationRequest {
            range,
            shape_mode: ShapeMode::Circles,
            color_mode: ColorMode::default(),
        }
    }

    #[test]
    fn fixed_modes_apply_to_every_entity() {
        let mut generator = DotGenerator::new(5);
        let request = GenerationRequest {
            shape_mode: ShapeMode::Squares,
            color_mode: ColorMode::Fixed(EntityColor::RED),
            ..request(Level::new(6).dot_range())
        };

        let entities = generator.generate(&request);

        assert!(entities.iter().all(|entity| entity.shape == Shape::Square));
        assert!(entities.iter().all(|entity| entity.color == EntityColor::RED));
    }

    #[test]
    fn entity_ids_follow_generation_order() {
        let mut generator = DotGenerator::new(9);
        let entities = generator.generate(&request(Level::new(4).dot_range()));

        for (index, entity) in entities.iter().enumerate() {
            assert_eq!(entity.id.get() as usize, index);
        }
    }

    #[test]
    fn mixed_shapes_produce_both_kinds() {
        let mut generator = DotGenerator::new(13);
        let request = GenerationRequest {
            shape_mode: ShapeMode::Mixed,
            ..request(DotRange::new(200, 200).expect("valid range"))
        };

        let entities = generator.generate(&request);

        assert!(entities.iter().any(|entity| entity.shape == Shape::Circle));
        assert!(entities.iter().any(|entity| entity.shape == Shape::Square));
    }

    #[test]
    fn every_entity_carries_a_drift_descriptor() {
        let mut generator = DotGenerator::new(21);

        let entities = generator.generate(&request(DotRange::new(50, 50).expect("valid range")));

        assert_eq!(entities.len(), 50);
        for entity in entities {
            let drift = entity.drift.expect("drift descriptor");
            assert!((0.0..1.0).contains(&drift.magnitude()));
        }
    }

    #[test]
    fn restyle_keeps_identity_and_applies_modes() {
        let mut generator = DotGenerator::new(2);
        let entities = generator.generate(&request(Level::new(3).dot_range()));

        let styles = generator.restyle(&entities, ShapeMode::Squares, ColorMode::Fixed(EntityColor::BLACK));

        assert_eq!(styles.len(), entities.len());
        for (style, entity) in styles.iter().zip(&entities) {
            assert_eq!(style.entity, entity.id);
            assert_eq!(style.shape, Shape::Square);
            assert_eq!(style.color, EntityColor::BLACK);
        }
    }

    #[test]
    fn identical_seeds_generate_identical_rounds() {
        let request = GenerationRequest {
            shape_mode: ShapeMode::Mixed,
            color_mode: ColorMode::Mixed,
            ..request(Level::new(8).dot_range())
        };
        let mut first = DotGenerator::new(77);
        let mut second = DotGenerator::new(77);

        for _ in 0..10 {
            assert_eq!(first.generate(&request), second.generate(&request));
        }
    }

    proptest! {
        #[test]
        fn counts_and_positions_stay_in_bounds(level in 1u32..40, seed in any::<u64>()) {
            let range = Level::new(level).dot_range();
            let mut generator = DotGenerator::new(seed);

            let entities = generator.generate(&request(range));

            prop_assert!(range.contains(entities.len() as u32));
            for entity in entities {
                prop_assert!((0.0..SPAWN_EXTENT).contains(&entity.position.top()));
                prop_assert!((0.0..SPAWN_EXTENT).contains(&entity.position.left()));
            }
        }
    }
}
