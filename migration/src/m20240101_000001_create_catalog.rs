use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Name))
                    .col(text(Categories::Description))
                    .col(string_uniq(Categories::Slug))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(pk_auto(Genres::Id))
                    .col(string(Genres::Name))
                    .col(text(Genres::Description))
                    .col(string_uniq(Genres::Slug))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actors::Table)
                    .if_not_exists()
                    .col(pk_auto(Actors::Id))
                    .col(string(Actors::Name))
                    .col(integer(Actors::Age).default(0))
                    .col(text(Actors::Description))
                    .col(string(Actors::Image))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Title))
                    .col(string(Movies::Tagline).default(""))
                    .col(text(Movies::Description))
                    .col(string(Movies::Poster))
                    .col(integer(Movies::Year))
                    .col(string(Movies::Country))
                    .col(string(Movies::WorldPremiere))
                    .col(big_integer(Movies::Budget).default(0))
                    .col(big_integer(Movies::FeesInUsa).default(0))
                    .col(big_integer(Movies::FeesInWorld).default(0))
                    .col(string(Movies::TrailerUrl).default("-"))
                    .col(integer_null(Movies::CategoryId))
                    .col(string_uniq(Movies::Slug))
                    .col(boolean(Movies::Draft).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_category")
                            .from(Movies::Table, Movies::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_year")
                    .table(Movies::Table)
                    .col(Movies::Year)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieGenres::Table)
                    .if_not_exists()
                    .col(integer(MovieGenres::MovieId))
                    .col(integer(MovieGenres::GenreId))
                    .primary_key(
                        Index::create()
                            .col(MovieGenres::MovieId)
                            .col(MovieGenres::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre_movie")
                            .from(MovieGenres::Table, MovieGenres::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre_genre")
                            .from(MovieGenres::Table, MovieGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieActors::Table)
                    .if_not_exists()
                    .col(integer(MovieActors::MovieId))
                    .col(integer(MovieActors::ActorId))
                    .primary_key(
                        Index::create()
                            .col(MovieActors::MovieId)
                            .col(MovieActors::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_movie")
                            .from(MovieActors::Table, MovieActors::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_actor")
                            .from(MovieActors::Table, MovieActors::ActorId)
                            .to(Actors::Table, Actors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieDirectors::Table)
                    .if_not_exists()
                    .col(integer(MovieDirectors::MovieId))
                    .col(integer(MovieDirectors::ActorId))
                    .primary_key(
                        Index::create()
                            .col(MovieDirectors::MovieId)
                            .col(MovieDirectors::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_director_movie")
                            .from(MovieDirectors::Table, MovieDirectors::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_director_actor")
                            .from(MovieDirectors::Table, MovieDirectors::ActorId)
                            .to(Actors::Table, Actors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieShots::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieShots::Id))
                    .col(string(MovieShots::Title))
                    .col(text(MovieShots::Description))
                    .col(string(MovieShots::Image))
                    .col(integer(MovieShots::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_shot_movie")
                            .from(MovieShots::Table, MovieShots::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RatingStars::Table)
                    .if_not_exists()
                    .col(pk_auto(RatingStars::Id))
                    .col(integer(RatingStars::Value).default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(pk_auto(Ratings::Id))
                    .col(string(Ratings::Ip))
                    .col(integer(Ratings::StarId))
                    .col(integer(Ratings::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_star")
                            .from(Ratings::Table, Ratings::StarId)
                            .to(RatingStars::Table, RatingStars::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_movie")
                            .from(Ratings::Table, Ratings::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per (movie, ip); the upsert in the app relies on this.
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_movie_ip_unique")
                    .table(Ratings::Table)
                    .col(Ratings::MovieId)
                    .col(Ratings::Ip)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_auto(Reviews::Id))
                    .col(string(Reviews::Email))
                    .col(string(Reviews::Name))
                    .col(text(Reviews::Text))
                    .col(integer_null(Reviews::ParentId))
                    .col(integer(Reviews::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_parent")
                            .from(Reviews::Table, Reviews::ParentId)
                            .to(Reviews::Table, Reviews::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_movie")
                            .from(Reviews::Table, Reviews::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_movie")
                    .table(Reviews::Table)
                    .col(Reviews::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reviews::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Ratings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(RatingStars::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieShots::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieDirectors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieActors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieGenres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Categories::Table).to_owned()).await?;
        Ok(())
    }
}

// Iden enum names must render to the table names the entities declare.
#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    Slug,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    Id,
    Name,
    Description,
    Slug,
}

#[derive(DeriveIden)]
enum Actors {
    Table,
    Id,
    Name,
    Age,
    Description,
    Image,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    Tagline,
    Description,
    Poster,
    Year,
    Country,
    WorldPremiere,
    Budget,
    FeesInUsa,
    FeesInWorld,
    TrailerUrl,
    CategoryId,
    Slug,
    Draft,
}

#[derive(DeriveIden)]
enum MovieGenres {
    Table,
    MovieId,
    GenreId,
}

#[derive(DeriveIden)]
enum MovieActors {
    Table,
    MovieId,
    ActorId,
}

#[derive(DeriveIden)]
enum MovieDirectors {
    Table,
    MovieId,
    ActorId,
}

#[derive(DeriveIden)]
enum MovieShots {
    Table,
    Id,
    Title,
    Description,
    Image,
    MovieId,
}

#[derive(DeriveIden)]
enum RatingStars {
    Table,
    Id,
    Value,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Id,
    Ip,
    StarId,
    MovieId,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Email,
    Name,
    Text,
    ParentId,
    MovieId,
}
