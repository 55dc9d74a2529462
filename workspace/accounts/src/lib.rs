//! Account factory and profile operations for email-identified users.
//!
//! [`UserManager`] validates and creates accounts, [`avatar_image_file_path`]
//! names avatar uploads, and [`subscriptions`] maintains the follow graph.

pub mod avatar;
pub mod email;
pub mod error;
pub mod manager;
pub mod password;
pub mod subscriptions;

#[cfg(test)]
mod testing;

pub use avatar::avatar_image_file_path;
pub use email::normalize_email;
pub use error::{AccountError, Result};
pub use manager::{ExtraFields, UserChanges, UserManager, full_name, has_usable_password};
pub use password::{Argon2Hasher, CredentialHasher};
