//! Scene state
//!
//! Models, their transform hierarchies and bounds, the visibility test, and
//! the per-frame camera and light state of the garage scene.

pub mod bounds;
pub mod camera;
pub mod composite_model;
pub mod culling;
pub mod light;
pub mod stage_lights;
pub mod static_model;
pub mod transform_tree;

pub use bounds::Aabb;
pub use camera::OrbitCamera;
pub use composite_model::{CompositeModel, SubObjectView};
pub use culling::frustum_cull_aabb;
pub use light::PointLight;
pub use stage_lights::StageLights;
pub use static_model::{create_garage, StaticModel};
pub use transform_tree::{TransformKey, TransformTree};
