use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub tagline: String,
    pub description: String,
    /// Media-relative poster path, e.g. "movies/matrix.jpg".
    pub poster: String,
    pub year: i32,
    pub country: String,
    /// ISO-8601 date string; parsed with jiff where a real date is needed.
    pub world_premiere: String,
    pub budget: i64,
    pub fees_in_usa: i64,
    pub fees_in_world: i64,
    pub trailer_url: String,
    pub category_id: Option<i32>,
    #[sea_orm(unique)]
    pub slug: String,
    /// Drafts are hidden from every public listing.
    pub draft: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::movie_shot::Entity")]
    Shots,
    #[sea_orm(has_many = "super::rating::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::movie_shot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shots.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_genre::Relation::Movie.def().rev())
    }
}

/// Cast link. `Related` cannot be implemented twice for the actor entity,
/// so the two roles go through `Linked` instead.
#[derive(Debug)]
pub struct Cast;

impl Linked for Cast {
    type FromEntity = Entity;
    type ToEntity = super::actor::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::movie_actor::Relation::Movie.def().rev(),
            super::movie_actor::Relation::Actor.def(),
        ]
    }
}

/// Director link, same shape as [`Cast`].
#[derive(Debug)]
pub struct Directors;

impl Linked for Directors {
    type FromEntity = Entity;
    type ToEntity = super::actor::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::movie_director::Relation::Movie.def().rev(),
            super::movie_director::Relation::Actor.def(),
        ]
    }
}

impl ActiveModelBehavior for ActiveModel {}
