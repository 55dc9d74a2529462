use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Directed follow relation between two users (join table)
        manager
            .create_table(
                Table::create()
                    .table(UserSubscriptions::Table)
                    .if_not_exists()
                    .col(integer(UserSubscriptions::SubscriberId))
                    .col(integer(UserSubscriptions::TargetId))
                    .primary_key(
                        Index::create()
                            .name("pk_user_subscriptions")
                            .col(UserSubscriptions::SubscriberId)
                            .col(UserSubscriptions::TargetId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_subscriptions_subscriber")
                            .from(UserSubscriptions::Table, UserSubscriptions::SubscriberId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_subscriptions_target")
                            .from(UserSubscriptions::Table, UserSubscriptions::TargetId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Followers are looked up by target
        manager
            .create_index(
                Index::create()
                    .name("idx_user_subscriptions_target")
                    .table(UserSubscriptions::Table)
                    .col(UserSubscriptions::TargetId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSubscriptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum UserSubscriptions {
    Table,
    SubscriberId,
    TargetId,
}
