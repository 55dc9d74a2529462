use std::sync::Arc;

use chrono::Utc;
use model::entities::user::{self, Gender};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument, trace, warn};

use crate::avatar::avatar_image_file_path;
use crate::email::normalize_email;
use crate::error::{AccountError, Result};
use crate::password::{CredentialHasher, is_password_usable, make_unusable_password};

/// Optional attributes accepted by the account factories.
/// Anything left as `None` takes the column default.
#[derive(Debug, Clone, Default)]
pub struct ExtraFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub avatar: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

/// Partial update of an existing account.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

/// Factory and record operations for user accounts.
///
/// The manager owns the credential hasher; every operation takes the
/// connection (or transaction) to run on.
#[derive(Debug, Clone)]
pub struct UserManager {
    hasher: Arc<dyn CredentialHasher>,
}

impl UserManager {
    pub fn new(hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { hasher }
    }

    /// Create and save a regular user with the given email and password.
    ///
    /// `is_staff` and `is_superuser` default to `false` unless overridden in
    /// `extra`.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn create_user<C>(
        &self,
        db: &C,
        email: &str,
        password: Option<&str>,
        mut extra: ExtraFields,
    ) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        extra.is_staff.get_or_insert(false);
        extra.is_superuser.get_or_insert(false);
        self.create(db, email, password, extra).await
    }

    /// Create and save a superuser with the given email and password.
    ///
    /// Both `is_staff` and `is_superuser` default to `true`; explicitly
    /// passing `false` for either is a validation error.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn create_superuser<C>(
        &self,
        db: &C,
        email: &str,
        password: Option<&str>,
        mut extra: ExtraFields,
    ) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        if !*extra.is_staff.get_or_insert(true) {
            warn!("Refusing to create superuser with is_staff=false");
            return Err(AccountError::Validation(
                "Superuser must have is_staff=true.".to_string(),
            ));
        }
        if !*extra.is_superuser.get_or_insert(true) {
            warn!("Refusing to create superuser with is_superuser=false");
            return Err(AccountError::Validation(
                "Superuser must have is_superuser=true.".to_string(),
            ));
        }

        self.create(db, email, password, extra).await
    }

    async fn create<C>(
        &self,
        db: &C,
        email: &str,
        password: Option<&str>,
        extra: ExtraFields,
    ) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        trace!("Validating new user");
        if email.trim().is_empty() {
            return Err(AccountError::Validation("The given email must be set".to_string()));
        }
        let email = normalize_email(email);
        debug!("Normalized email to {}", email);

        let new_user = user::ActiveModel {
            email: Set(email.clone()),
            password: Set(self.password_value(password)?),
            first_name: Set(extra.first_name.unwrap_or_default()),
            last_name: Set(extra.last_name.unwrap_or_default()),
            gender: Set(extra.gender.unwrap_or_default()),
            avatar: Set(extra.avatar),
            is_staff: Set(extra.is_staff.unwrap_or(false)),
            is_superuser: Set(extra.is_superuser.unwrap_or(false)),
            is_active: Set(extra.is_active.unwrap_or(true)),
            date_joined: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        };

        trace!("Inserting new user into database");
        let created = new_user
            .insert(db)
            .await
            .map_err(|err| AccountError::from_user_write(err, &email))?;

        info!(
            "User created with ID: {}, email: {}, staff: {}, superuser: {}",
            created.id, created.email, created.is_staff, created.is_superuser
        );
        Ok(created)
    }

    /// Stored password value for an optional raw password: a hash, or an
    /// unusable marker when no password was given.
    pub fn password_value(&self, raw: Option<&str>) -> Result<String> {
        match raw {
            Some(raw) => self.hasher.hash(raw),
            None => Ok(make_unusable_password()),
        }
    }

    /// Check a raw password against the account's stored password.
    /// Accounts with an unusable password never match.
    pub fn check_password(&self, user: &user::Model, raw: &str) -> Result<bool> {
        if !has_usable_password(user) {
            return Ok(false);
        }
        self.hasher.verify(raw, &user.password)
    }

    /// Replace the account's password; `None` makes it unusable.
    #[instrument(skip(self, db, raw))]
    pub async fn set_password<C>(&self, db: &C, user_id: i32, raw: Option<&str>) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        let existing = self.get_user(db, user_id).await?;
        let mut active: user::ActiveModel = existing.into();
        active.password = Set(self.password_value(raw)?);

        let updated = active.update(db).await?;
        info!("Password updated for user {} (usable: {})", user_id, raw.is_some());
        Ok(updated)
    }

    pub async fn get_user<C>(&self, db: &C, user_id: i32) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AccountError::NotFound(user_id))
    }

    /// Look up an account by email, normalizing the address first.
    pub async fn find_by_email<C>(&self, db: &C, email: &str) -> Result<Option<user::Model>>
    where
        C: ConnectionTrait,
    {
        let email = normalize_email(email);
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?)
    }

    /// Apply a partial update to an account.
    #[instrument(skip(self, db, changes))]
    pub async fn update_user<C>(
        &self,
        db: &C,
        user_id: i32,
        changes: UserChanges,
    ) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        let existing = self.get_user(db, user_id).await?;
        let is_staff = changes.is_staff.unwrap_or(existing.is_staff);
        let is_superuser = changes.is_superuser.unwrap_or(existing.is_superuser);
        if is_superuser && !is_staff {
            return Err(AccountError::Validation(
                "Superuser must have is_staff=true.".to_string(),
            ));
        }

        let mut email = existing.email.clone();
        let mut active: user::ActiveModel = existing.into();
        let mut updated_fields = Vec::new();

        if let Some(new_email) = changes.email {
            if new_email.trim().is_empty() {
                return Err(AccountError::Validation("The given email must be set".to_string()));
            }
            email = normalize_email(&new_email);
            active.email = Set(email.clone());
            updated_fields.push("email");
        }
        if let Some(raw) = changes.password {
            active.password = Set(self.hasher.hash(&raw)?);
            updated_fields.push("password");
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
            updated_fields.push("first_name");
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
            updated_fields.push("last_name");
        }
        if let Some(gender) = changes.gender {
            active.gender = Set(gender);
            updated_fields.push("gender");
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
            updated_fields.push("is_active");
        }
        if changes.is_staff.is_some() {
            active.is_staff = Set(is_staff);
            updated_fields.push("is_staff");
        }
        if changes.is_superuser.is_some() {
            active.is_superuser = Set(is_superuser);
            updated_fields.push("is_superuser");
        }

        if updated_fields.is_empty() {
            debug!("No fields to update for user ID: {}", user_id);
        } else {
            debug!("Updating fields: {}", updated_fields.join(", "));
        }

        let updated = active
            .update(db)
            .await
            .map_err(|err| AccountError::from_user_write(err, &email))?;
        info!("User with ID {} updated", user_id);
        Ok(updated)
    }

    /// Generate a storage path for an uploaded avatar and record it on the
    /// account. Writing the file itself is left to the storage backend.
    #[instrument(skip(self, db))]
    pub async fn assign_avatar<C>(&self, db: &C, user_id: i32, filename: &str) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        let existing = self.get_user(db, user_id).await?;
        let path = avatar_image_file_path(filename);
        debug!("Avatar for user {} stored at {}", user_id, path);

        let mut active: user::ActiveModel = existing.into();
        active.avatar = Set(Some(path));
        Ok(active.update(db).await?)
    }

    /// Stamp the account's last login with the current time.
    #[instrument(skip(self, db))]
    pub async fn record_login<C>(&self, db: &C, user_id: i32) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        let existing = self.get_user(db, user_id).await?;
        let mut active: user::ActiveModel = existing.into();
        active.last_login = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self, db))]
    pub async fn delete_user<C>(&self, db: &C, user_id: i32) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let result = user::Entity::delete_by_id(user_id).exec(db).await?;
        debug!("Delete operation completed. Rows affected: {}", result.rows_affected);
        if result.rows_affected == 0 {
            return Err(AccountError::NotFound(user_id));
        }
        info!("User with ID {} deleted", user_id);
        Ok(())
    }
}

pub fn has_usable_password(user: &user::Model) -> bool {
    is_password_usable(&user.password)
}

/// First and last name separated by a space, trimmed.
pub fn full_name(user: &user::Model) -> String {
    format!("{} {}", user.first_name, user.last_name).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::test_hasher;
    use crate::testing::setup_db;

    fn manager() -> UserManager {
        UserManager::new(Arc::new(test_hasher()))
    }

    #[tokio::test]
    async fn test_create_user_defaults() {
        let db = setup_db().await;
        let user = manager()
            .create_user(&db, "Someone@EXAMPLE.com", Some("secret"), ExtraFields::default())
            .await
            .unwrap();

        assert_eq!(user.email, "Someone@example.com");
        assert_eq!(user.gender, Gender::Unknown);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert!(user.is_active);
        assert!(user.avatar.is_none());
        assert!(user.last_login.is_none());
        assert_eq!(full_name(&user), "");
    }

    #[tokio::test]
    async fn test_create_user_rejects_empty_email() {
        let db = setup_db().await;
        let manager = manager();

        for email in ["", "   "] {
            let result = manager
                .create_user(&db, email, Some("secret"), ExtraFields::default())
                .await;
            assert!(matches!(result, Err(AccountError::Validation(_))), "{email:?}");
        }
        assert!(user::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_user_applies_extra_fields() {
        let db = setup_db().await;
        let extra = ExtraFields {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            gender: Some(Gender::Female),
            is_staff: Some(true),
            is_active: Some(false),
            ..Default::default()
        };
        let user = manager()
            .create_user(&db, "ada@example.com", None, extra)
            .await
            .unwrap();

        assert_eq!(user.gender, Gender::Female);
        assert!(user.is_staff);
        assert!(!user.is_superuser);
        assert!(!user.is_active);
        assert_eq!(full_name(&user), "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let db = setup_db().await;
        let manager = manager();
        let user = manager
            .create_user(&db, "pw@example.com", Some("hunter2"), ExtraFields::default())
            .await
            .unwrap();

        assert_ne!(user.password, "hunter2");
        assert!(has_usable_password(&user));
        assert!(manager.check_password(&user, "hunter2").unwrap());
        assert!(!manager.check_password(&user, "hunter3").unwrap());
    }

    #[tokio::test]
    async fn test_missing_password_is_unusable() {
        let db = setup_db().await;
        let manager = manager();
        let user = manager
            .create_user(&db, "nopw@example.com", None, ExtraFields::default())
            .await
            .unwrap();

        assert!(!has_usable_password(&user));
        assert!(!manager.check_password(&user, "").unwrap());

        let user = manager.set_password(&db, user.id, Some("now-set")).await.unwrap();
        assert!(manager.check_password(&user, "now-set").unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_normalized_email_is_rejected() {
        let db = setup_db().await;
        let manager = manager();
        manager
            .create_user(&db, "dup@example.com", None, ExtraFields::default())
            .await
            .unwrap();

        let result = manager
            .create_user(&db, "dup@EXAMPLE.COM", None, ExtraFields::default())
            .await;
        match result {
            Err(AccountError::EmailTaken(email)) => assert_eq!(email, "dup@example.com"),
            other => panic!("expected EmailTaken, got {:?}", other),
        }

        // The local part keeps its case, so this is a different account
        manager
            .create_user(&db, "Dup@example.com", None, ExtraFields::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_superuser() {
        let db = setup_db().await;
        let user = manager()
            .create_superuser(&db, "root@Example.com", Some("toor"), ExtraFields::default())
            .await
            .unwrap();

        assert_eq!(user.email, "root@example.com");
        assert!(user.is_staff);
        assert!(user.is_superuser);
    }

    #[tokio::test]
    async fn test_create_superuser_rejects_false_flags() {
        let db = setup_db().await;
        let manager = manager();

        let not_staff = ExtraFields {
            is_staff: Some(false),
            ..Default::default()
        };
        let result = manager
            .create_superuser(&db, "a@example.com", Some("pw"), not_staff)
            .await;
        match result {
            Err(AccountError::Validation(message)) => assert!(message.contains("is_staff")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let not_superuser = ExtraFields {
            is_superuser: Some(false),
            ..Default::default()
        };
        let result = manager
            .create_superuser(&db, "b@example.com", Some("pw"), not_superuser)
            .await;
        match result {
            Err(AccountError::Validation(message)) => assert!(message.contains("is_superuser")),
            other => panic!("expected validation error, got {:?}", other),
        }

        assert!(user::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_user() {
        let db = setup_db().await;
        let manager = manager();
        let user = manager
            .create_user(&db, "old@example.com", Some("pw"), ExtraFields::default())
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some("New@EXAMPLE.org".to_string()),
            password: Some("pw2".to_string()),
            gender: Some(Gender::Genderless),
            last_name: Some("Smith".to_string()),
            ..Default::default()
        };
        let updated = manager.update_user(&db, user.id, changes).await.unwrap();

        assert_eq!(updated.email, "New@example.org");
        assert_eq!(updated.gender, Gender::Genderless);
        assert_eq!(full_name(&updated), "Smith");
        assert!(manager.check_password(&updated, "pw2").unwrap());
        assert_eq!(updated.date_joined, user.date_joined);

        let found = manager.find_by_email(&db, "New@example.ORG").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_update_user_keeps_superuser_invariant() {
        let db = setup_db().await;
        let manager = manager();
        let regular = manager
            .create_user(&db, "reg@example.com", None, ExtraFields::default())
            .await
            .unwrap();

        let promote_without_staff = UserChanges {
            is_superuser: Some(true),
            ..Default::default()
        };
        let result = manager.update_user(&db, regular.id, promote_without_staff).await;
        assert!(matches!(result, Err(AccountError::Validation(_))));

        let promote = UserChanges {
            is_staff: Some(true),
            is_superuser: Some(true),
            ..Default::default()
        };
        let admin = manager.update_user(&db, regular.id, promote).await.unwrap();
        assert!(admin.is_staff && admin.is_superuser);
    }

    #[tokio::test]
    async fn test_update_user_email_conflict() {
        let db = setup_db().await;
        let manager = manager();
        manager
            .create_user(&db, "taken@example.com", None, ExtraFields::default())
            .await
            .unwrap();
        let other = manager
            .create_user(&db, "other@example.com", None, ExtraFields::default())
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some("taken@Example.com".to_string()),
            ..Default::default()
        };
        let result = manager.update_user(&db, other.id, changes).await;
        assert!(matches!(result, Err(AccountError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_assign_avatar_and_record_login() {
        let db = setup_db().await;
        let manager = manager();
        let user = manager
            .create_user(&db, "pic@example.com", None, ExtraFields::default())
            .await
            .unwrap();

        let updated = manager.assign_avatar(&db, user.id, "selfie.png").await.unwrap();
        let avatar = updated.avatar.unwrap();
        assert!(avatar.starts_with("uploads/avatar/image/"));
        assert!(avatar.ends_with(".png"));

        let logged_in = manager.record_login(&db, user.id).await.unwrap();
        assert!(logged_in.last_login.is_some());
    }

    #[tokio::test]
    async fn test_missing_user_operations() {
        let db = setup_db().await;
        let manager = manager();

        assert!(matches!(manager.get_user(&db, 42).await, Err(AccountError::NotFound(42))));
        assert!(matches!(
            manager.update_user(&db, 42, UserChanges::default()).await,
            Err(AccountError::NotFound(42))
        ));
        assert!(matches!(
            manager.assign_avatar(&db, 42, "a.png").await,
            Err(AccountError::NotFound(42))
        ));
        assert!(matches!(manager.delete_user(&db, 42).await, Err(AccountError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_db().await;
        let manager = manager();
        let user = manager
            .create_user(&db, "bye@example.com", None, ExtraFields::default())
            .await
            .unwrap();

        manager.delete_user(&db, user.id).await.unwrap();
        assert!(manager.find_by_email(&db, "bye@example.com").await.unwrap().is_none());
    }
}
