//! Directed follow relations between accounts.
//!
//! Following is asymmetric: `subscribe(a, b)` makes `a` a follower of `b`
//! without making `b` follow `a`.

use model::entities::{subscription, user};
use sea_orm::{
    ConnectionTrait, EntityTrait, ModelTrait, QueryOrder, Set, sea_query::OnConflict,
};
use tracing::{debug, info, instrument};

use crate::error::{AccountError, Result};

async fn find_user<C>(db: &C, user_id: i32) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AccountError::NotFound(user_id))
}

/// Make `subscriber_id` follow `target_id`.
///
/// Returns `true` when a new relation was created and `false` when it
/// already existed.
#[instrument(skip(db))]
pub async fn subscribe<C>(db: &C, subscriber_id: i32, target_id: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    if subscriber_id == target_id {
        return Err(AccountError::Validation(
            "A user cannot subscribe to themselves".to_string(),
        ));
    }
    find_user(db, subscriber_id).await?;
    find_user(db, target_id).await?;

    let inserted = subscription::Entity::insert(subscription::ActiveModel {
        subscriber_id: Set(subscriber_id),
        target_id: Set(target_id),
    })
    .on_conflict(
        OnConflict::columns([
            subscription::Column::SubscriberId,
            subscription::Column::TargetId,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    if inserted == 0 {
        debug!("User {} already follows {}", subscriber_id, target_id);
        return Ok(false);
    }

    info!("User {} now follows {}", subscriber_id, target_id);
    Ok(true)
}

/// Remove the follow relation; returns whether one existed.
#[instrument(skip(db))]
pub async fn unsubscribe<C>(db: &C, subscriber_id: i32, target_id: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = subscription::Entity::delete_by_id((subscriber_id, target_id))
        .exec(db)
        .await?;
    debug!("Unsubscribe removed {} rows", result.rows_affected);
    Ok(result.rows_affected > 0)
}

/// Accounts that `user_id` follows, ordered by id.
pub async fn subscriptions_of<C>(db: &C, user_id: i32) -> Result<Vec<user::Model>>
where
    C: ConnectionTrait,
{
    let user = find_user(db, user_id).await?;
    Ok(user
        .find_linked(user::SubscriptionsLink)
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}

/// Accounts following `user_id`, ordered by id.
pub async fn followers_of<C>(db: &C, user_id: i32) -> Result<Vec<user::Model>>
where
    C: ConnectionTrait,
{
    let user = find_user(db, user_id).await?;
    Ok(user
        .find_linked(user::FollowersLink)
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}
