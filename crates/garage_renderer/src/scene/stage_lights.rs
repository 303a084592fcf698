//! Stage lights
//!
//! Two copies of the stage light model stand either side of the car and
//! track it every frame. The root yaw turns the whole fixture; the lamp head
//! sub-objects pitch up or down on their own.

use crate::foundation::math::{constants::PI, Quat, Unit, Vec3};

use super::composite_model::CompositeModel;

/// Sub-objects of the stage light model forming the tilting lamp head
pub const LAMP_HEAD_SUB_OBJECTS: [usize; 2] = [4, 5];

/// Where the first fixture stands; the second mirrors it on X
pub const STAGE_LIGHT_POSITION: Vec3 = Vec3::new(-8.0, 9.0, -10.0);

/// Uniform scale applied to the stage light model
pub const STAGE_LIGHT_SCALE: f32 = 5.0;

/// A mirrored pair of stage light fixtures
#[derive(Debug, Clone)]
pub struct StageLights {
    fixtures: [CompositeModel; 2],
}

impl StageLights {
    /// Place `model` as the first fixture and a mirrored copy as the second
    pub fn new(mut model: CompositeModel) -> Self {
        {
            let root = model.root_transform_mut();
            root.scale = Vec3::new(STAGE_LIGHT_SCALE, STAGE_LIGHT_SCALE, STAGE_LIGHT_SCALE);
            root.position = STAGE_LIGHT_POSITION;
            root.rotation = Quat::identity();
        }

        let mut mirrored = model.duplicate();
        mirrored.root_transform_mut().position.x = -STAGE_LIGHT_POSITION.x;

        if model.num_models() <= LAMP_HEAD_SUB_OBJECTS[1] {
            log::warn!(
                "Stage light model has {} sub-objects; lamp heads will not tilt",
                model.num_models()
            );
        }

        Self {
            fixtures: [model, mirrored],
        }
    }

    /// Both fixtures
    pub fn fixtures(&self) -> &[CompositeModel] {
        &self.fixtures
    }

    /// Turn both fixtures towards `target`
    pub fn aim_at(&mut self, target: Vec3) {
        for fixture in &mut self.fixtures {
            aim_fixture(fixture, target);
        }
    }
}

fn aim_fixture(fixture: &mut CompositeModel, target: Vec3) {
    let direction = target - fixture.center();
    let pitch = direction.y.atan2(direction.z);
    let yaw = PI + direction.x.atan2(direction.z);

    fixture.root_transform_mut().rotation = Quat::from_axis_angle(&Unit::new_normalize(Vec3::y()), yaw);

    let tilt = Quat::from_axis_angle(&Unit::new_normalize(Vec3::x()), pitch);
    for index in LAMP_HEAD_SUB_OBJECTS {
        if let Some(local) = fixture.local_transform_mut(index) {
            local.rotation = tilt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::{BufferHandle, Material, MeshHandle};
    use crate::scene::bounds::Aabb;
    use approx::assert_relative_eq;

    fn fixture_model(parts: usize) -> CompositeModel {
        let bounds = Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5));
        let mut model = CompositeModel::new(vec![Material::default()], bounds, BufferHandle(1));
        for i in 0..parts {
            model.push_sub_object(MeshHandle(i as u64 + 2), 0, bounds);
        }
        model
    }

    #[test]
    fn test_fixtures_are_mirrored() {
        let lights = StageLights::new(fixture_model(6));
        let [left, right] = lights.fixtures() else {
            panic!("expected two fixtures");
        };
        assert_eq!(left.root_transform().position, Vec3::new(-8.0, 9.0, -10.0));
        assert_eq!(right.root_transform().position, Vec3::new(8.0, 9.0, -10.0));
        assert_eq!(left.root_transform().scale, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(right.parent_of(0), Some(right.root_key()));
    }

    #[test]
    fn test_aim_sets_yaw_and_head_pitch() {
        let mut lights = StageLights::new(fixture_model(6));
        lights.aim_at(Vec3::new(0.0, 1.0, 0.0));

        for fixture in lights.fixtures() {
            let direction = Vec3::new(0.0, 1.0, 0.0) - fixture.center();
            let expected_yaw = PI + direction.x.atan2(direction.z);
            let forward = fixture.root_transform().rotation * Vec3::z();
            assert_relative_eq!(forward.x, expected_yaw.sin(), epsilon = 1e-5);
            assert_relative_eq!(forward.z, expected_yaw.cos(), epsilon = 1e-5);

            let head = fixture.local_transform(4).unwrap().rotation;
            assert_eq!(head, fixture.local_transform(5).unwrap().rotation);
            assert_eq!(fixture.local_transform(0).unwrap().rotation, Quat::identity());
        }
    }

    #[test]
    fn test_small_model_does_not_panic() {
        let mut lights = StageLights::new(fixture_model(2));
        lights.aim_at(Vec3::zeros());
        assert_eq!(lights.fixtures()[0].num_models(), 2);
    }
}
