pub mod animation;
pub mod behaviour;
pub mod kinematics;
pub mod policy;
