// SeaORM entities backing the relational repository

pub mod comment;
pub mod post;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use super::comment::{
        ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as CommentEntity,
        Model as CommentModel,
    };
    pub use super::post::{
        ActiveModel as PostActiveModel, Column as PostColumn, Entity as PostEntity,
        Model as PostModel,
    };

    pub use sea_orm::{
        ActiveModelTrait,
        ColumnTrait,
        ConnectionTrait,

        // Database and connection types
        Database,
        DatabaseConnection,
        DbErr,

        // Core traits
        EntityTrait,
        ModelTrait,
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,

        // Active model helpers
        Set,
    };
}
