pub mod generator;
pub mod identity;
pub mod publishable_key;
pub mod view_actor;
