use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use tracing::warn;

use super::subscription;

/// Self-declared gender of an account holder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum Gender {
    #[default]
    #[sea_orm(string_value = "unknown")]
    Unknown,
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "genderless")]
    Genderless,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Unknown => "unknown",
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Genderless => "genderless",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Gender::Unknown),
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "genderless" => Ok(Gender::Genderless),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

/// Represents a registered user of the system.
/// The email address is the login identifier; there is no username.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Normalized email address (domain part lower-cased).
    #[sea_orm(unique)]
    pub email: String,
    /// PHC hash string, or an unusable marker starting with `!`.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// Storage path of the uploaded avatar image.
    pub avatar: Option<String>,
    /// Grants access to the administration surface.
    pub is_staff: bool,
    /// Grants every permission. Implies `is_staff`.
    pub is_superuser: bool,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

// The only relations of a user are to itself through `user_subscriptions`,
// which are expressed with the `Linked` types below.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// Users that a given user follows.
#[derive(Debug)]
pub struct SubscriptionsLink;

impl Linked for SubscriptionsLink {
    type FromEntity = Entity;
    type ToEntity = Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            subscription::Relation::Subscriber.def().rev(),
            subscription::Relation::Target.def(),
        ]
    }
}

/// Users that follow a given user.
#[derive(Debug)]
pub struct FollowersLink;

impl Linked for FollowersLink {
    type FromEntity = Entity;
    type ToEntity = Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            subscription::Relation::Target.def().rev(),
            subscription::Relation::Subscriber.def(),
        ]
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Some(email) = self.email.try_as_ref() {
            if email.trim().is_empty() {
                warn!("Rejecting user save with an empty email (insert: {})", insert);
                return Err(DbErr::Custom("The given email must be set".to_string()));
            }
        }

        let is_superuser = self.is_superuser.try_as_ref().copied();
        let is_staff = self.is_staff.try_as_ref().copied();
        if let (Some(true), Some(false)) = (is_superuser, is_staff) {
            warn!("Rejecting superuser save without is_staff (insert: {})", insert);
            return Err(DbErr::Custom("Superuser must have is_staff=true.".to_string()));
        }

        Ok(self)
    }
}
