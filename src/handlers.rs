pub mod health;
pub mod subscriptions;
pub mod users;
