pub mod health;
pub mod pubsub;
