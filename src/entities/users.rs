use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(
        primary_key,
        auto_increment = false,
        column_type = "String(StringLen::N(20))"
    )]
    pub username: String,

    /// Argon2id PHC string, never the plaintext
    #[sea_orm(column_type = "Text")]
    pub password: String,

    #[sea_orm(unique, column_type = "String(StringLen::N(50))")]
    pub email: String,

    #[sea_orm(column_type = "String(StringLen::N(30))")]
    pub first_name: String,

    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub last_name: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
