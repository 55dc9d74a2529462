//! Root of the SeaORM entity modules.
//! A user is identified by email and follows other users through the
//! `user_subscriptions` relation table.

pub mod subscription;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::subscription::Entity as Subscription;
    pub use super::user::Entity as User;
}
