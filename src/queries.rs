use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use crate::{
    entities::{actor, category, genre, movie, movie_genre, movie_shot, review},
    error::AppResult,
    models::{MovieDetail, MoviePage, ReviewThread, Sidebar},
};

pub const LIST_PAGE_SIZE: u64 = 6;
pub const FILTER_PAGE_SIZE: u64 = 3;

async fn page_of(
    db: &DatabaseConnection,
    select: Select<movie::Entity>,
    per_page: u64,
    page: u64,
) -> AppResult<MoviePage> {
    let page = page.max(1);
    let paginator = select.paginate(db, per_page);
    let pages = paginator.num_pages().await?;
    let movies = paginator.fetch_page(page - 1).await?;
    Ok(MoviePage { movies, page, pages })
}

/// All non-draft movies, newest last.
pub async fn list_movies(db: &DatabaseConnection, page: u64) -> AppResult<MoviePage> {
    let select = movie::Entity::find()
        .filter(movie::Column::Draft.eq(false))
        .order_by_asc(movie::Column::Id);
    page_of(db, select, LIST_PAGE_SIZE, page).await
}

/// Movies matching (year ∈ years) OR (genre ∈ genres). An empty set
/// contributes no clause, so years-only ignores genre entirely and
/// vice versa; both empty matches nothing.
pub async fn filter_movies(
    db: &DatabaseConnection,
    years: &[i32],
    genres: &[i32],
    page: u64,
) -> AppResult<MoviePage> {
    if years.is_empty() && genres.is_empty() {
        return Ok(MoviePage::empty());
    }

    let mut cond = Condition::any();
    if !years.is_empty() {
        cond = cond.add(movie::Column::Year.is_in(years.iter().copied()));
    }
    if !genres.is_empty() {
        cond = cond.add(movie_genre::Column::GenreId.is_in(genres.iter().copied()));
    }

    let select = movie::Entity::find()
        .join(JoinType::LeftJoin, movie_genre::Relation::Movie.def().rev())
        .filter(movie::Column::Draft.eq(false))
        .filter(cond)
        .distinct()
        .order_by_asc(movie::Column::Id);
    page_of(db, select, FILTER_PAGE_SIZE, page).await
}

/// Case-insensitive substring match on the title.
pub async fn search_movies(db: &DatabaseConnection, q: &str, page: u64) -> AppResult<MoviePage> {
    let q = q.trim();
    if q.is_empty() {
        return Ok(MoviePage::empty());
    }
    let select = movie::Entity::find()
        .filter(movie::Column::Draft.eq(false))
        .filter(movie::Column::Title.contains(q))
        .order_by_asc(movie::Column::Id);
    page_of(db, select, FILTER_PAGE_SIZE, page).await
}

/// Distinct release years among non-draft movies, newest first.
pub async fn distinct_years(db: &DatabaseConnection) -> AppResult<Vec<i32>> {
    Ok(movie::Entity::find()
        .select_only()
        .column(movie::Column::Year)
        .filter(movie::Column::Draft.eq(false))
        .distinct()
        .order_by_desc(movie::Column::Year)
        .into_tuple::<i32>()
        .all(db)
        .await?)
}

pub async fn recent_movies(db: &DatabaseConnection, count: u64) -> AppResult<Vec<movie::Model>> {
    Ok(movie::Entity::find()
        .filter(movie::Column::Draft.eq(false))
        .order_by_desc(movie::Column::Id)
        .limit(count)
        .all(db)
        .await?)
}

pub async fn sidebar(db: &DatabaseConnection, recent_count: u64) -> AppResult<Sidebar> {
    Ok(Sidebar {
        categories: category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(db)
            .await?,
        genres: genre::Entity::find().order_by_asc(genre::Column::Name).all(db).await?,
        years: distinct_years(db).await?,
        recent: recent_movies(db, recent_count).await?,
    })
}

pub async fn find_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> AppResult<Option<movie::Model>> {
    Ok(movie::Entity::find().filter(movie::Column::Slug.eq(slug)).one(db).await?)
}

/// One movie by slug, with everything the detail page needs.
pub async fn movie_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> AppResult<Option<MovieDetail>> {
    let Some(movie) = find_by_slug(db, slug).await? else {
        return Ok(None);
    };

    let genres = movie.find_related(genre::Entity).all(db).await?;
    let actors = movie.find_linked(movie::Cast).all(db).await?;
    let directors = movie.find_linked(movie::Directors).all(db).await?;
    let shots = movie.find_related(movie_shot::Entity).all(db).await?;
    let reviews = review_threads(db, movie.id).await?;

    Ok(Some(MovieDetail { movie, genres, actors, directors, shots, reviews }))
}

/// Top-level reviews of a movie with their direct replies. Display is one
/// level deep; a reply to a reply keeps its parent reference but is not
/// rendered in the thread.
pub async fn review_threads(
    db: &DatabaseConnection,
    movie_id: i32,
) -> AppResult<Vec<ReviewThread>> {
    let all = review::Entity::find()
        .filter(review::Column::MovieId.eq(movie_id))
        .order_by_asc(review::Column::Id)
        .all(db)
        .await?;

    let (parents, replies): (Vec<_>, Vec<_>) =
        all.into_iter().partition(|r| r.parent_id.is_none());

    let mut threads: Vec<ReviewThread> = parents
        .into_iter()
        .map(|review| ReviewThread { review, replies: Vec::new() })
        .collect();
    for reply in replies {
        if let Some(thread) = threads.iter_mut().find(|t| Some(t.review.id) == reply.parent_id)
        {
            thread.replies.push(reply);
        }
    }
    Ok(threads)
}

pub async fn actor_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> AppResult<Option<actor::Model>> {
    Ok(actor::Entity::find().filter(actor::Column::Name.eq(name)).one(db).await?)
}

#[cfg(test)]
pub(crate) mod tests {
    use sea_orm::{ActiveModelTrait, Set};

    use super::*;

    pub(crate) async fn test_db() -> DatabaseConnection {
        crate::db::connect_and_migrate("sqlite::memory:").await.unwrap()
    }

    pub(crate) async fn seed_movie(
        db: &DatabaseConnection,
        title: &str,
        year: i32,
        draft: bool,
    ) -> movie::Model {
        let slug = title.to_lowercase().replace(' ', "-");
        movie::ActiveModel {
            title: Set(title.to_string()),
            tagline: Set(String::new()),
            description: Set(String::new()),
            poster: Set(String::new()),
            year: Set(year),
            country: Set("US".to_string()),
            world_premiere: Set("2020-01-01".to_string()),
            budget: Set(0),
            fees_in_usa: Set(0),
            fees_in_world: Set(0),
            trailer_url: Set("-".to_string()),
            category_id: Set(None),
            slug: Set(slug),
            draft: Set(draft),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    pub(crate) async fn seed_genre(db: &DatabaseConnection, name: &str) -> genre::Model {
        genre::ActiveModel {
            name: Set(name.to_string()),
            description: Set(String::new()),
            slug: Set(name.to_lowercase()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    pub(crate) async fn tag_genre(db: &DatabaseConnection, movie_id: i32, genre_id: i32) {
        movie_genre::ActiveModel { movie_id: Set(movie_id), genre_id: Set(genre_id) }
            .insert(db)
            .await
            .unwrap();
    }

    pub(crate) async fn seed_review(
        db: &DatabaseConnection,
        movie_id: i32,
        name: &str,
        parent_id: Option<i32>,
    ) -> review::Model {
        review::ActiveModel {
            email: Set(format!("{name}@example.com")),
            name: Set(name.to_string()),
            text: Set("fine film".to_string()),
            parent_id: Set(parent_id),
            movie_id: Set(movie_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn drafts_never_listed() {
        let db = test_db().await;
        seed_movie(&db, "Public", 2020, false).await;
        seed_movie(&db, "Hidden", 2020, true).await;

        let page = list_movies(&db, 1).await.unwrap();
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].title, "Public");
    }

    #[tokio::test]
    async fn list_paginates_by_six() {
        let db = test_db().await;
        for i in 0..8 {
            seed_movie(&db, &format!("Movie {i}"), 2020, false).await;
        }

        let first = list_movies(&db, 1).await.unwrap();
        assert_eq!(first.movies.len(), 6);
        assert_eq!(first.pages, 2);

        let second = list_movies(&db, 2).await.unwrap();
        assert_eq!(second.movies.len(), 2);
    }

    #[tokio::test]
    async fn filter_by_years_only() {
        let db = test_db().await;
        seed_movie(&db, "Old", 1999, false).await;
        seed_movie(&db, "New", 2020, false).await;
        seed_movie(&db, "Newer", 2021, false).await;

        let page = filter_movies(&db, &[1999, 2021], &[], 1).await.unwrap();
        let titles: Vec<_> = page.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Old", "Newer"]);
    }

    #[tokio::test]
    async fn filter_by_genres_only() {
        let db = test_db().await;
        let drama = seed_genre(&db, "Drama").await;
        let comedy = seed_genre(&db, "Comedy").await;
        let a = seed_movie(&db, "A", 2020, false).await;
        let b = seed_movie(&db, "B", 2020, false).await;
        tag_genre(&db, a.id, drama.id).await;
        tag_genre(&db, b.id, comedy.id).await;

        let page = filter_movies(&db, &[], &[drama.id], 1).await.unwrap();
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].title, "A");
    }

    #[tokio::test]
    async fn filter_or_semantics_without_duplicates() {
        let db = test_db().await;
        let drama = seed_genre(&db, "Drama").await;
        // Matches both clauses; must appear once.
        let both = seed_movie(&db, "Both", 2020, false).await;
        tag_genre(&db, both.id, drama.id).await;
        seed_movie(&db, "Year only", 2020, false).await;
        seed_movie(&db, "Neither", 1999, false).await;

        let page = filter_movies(&db, &[2020], &[drama.id], 1).await.unwrap();
        let titles: Vec<_> = page.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Both", "Year only"]);
    }

    #[tokio::test]
    async fn filter_excludes_drafts() {
        let db = test_db().await;
        seed_movie(&db, "Draft", 2020, true).await;
        let page = filter_movies(&db, &[2020], &[], 1).await.unwrap();
        assert!(page.movies.is_empty());
    }

    #[tokio::test]
    async fn filter_with_nothing_selected_matches_nothing() {
        let db = test_db().await;
        seed_movie(&db, "A", 2020, false).await;
        let page = filter_movies(&db, &[], &[], 1).await.unwrap();
        assert!(page.movies.is_empty());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let db = test_db().await;
        seed_movie(&db, "The Matrix", 1999, false).await;
        seed_movie(&db, "MATRIX Reloaded", 2003, false).await;
        seed_movie(&db, "Inception", 2010, false).await;
        seed_movie(&db, "Matrix Hidden", 2021, true).await;

        let page = search_movies(&db, "matrix", 1).await.unwrap();
        let titles: Vec<_> = page.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["The Matrix", "MATRIX Reloaded"]);
    }

    #[tokio::test]
    async fn distinct_years_descending_without_drafts() {
        let db = test_db().await;
        seed_movie(&db, "A", 1999, false).await;
        seed_movie(&db, "B", 2020, false).await;
        seed_movie(&db, "C", 2020, false).await;
        seed_movie(&db, "D", 2023, true).await;

        assert_eq!(distinct_years(&db).await.unwrap(), [2020, 1999]);
    }

    #[tokio::test]
    async fn detail_loads_relations_and_threads() {
        let db = test_db().await;
        let drama = seed_genre(&db, "Drama").await;
        let movie = seed_movie(&db, "The Matrix", 1999, false).await;
        tag_genre(&db, movie.id, drama.id).await;

        let top = seed_review(&db, movie.id, "alice", None).await;
        seed_review(&db, movie.id, "bob", Some(top.id)).await;

        let detail = movie_by_slug(&db, "the-matrix").await.unwrap().unwrap();
        assert_eq!(detail.genres.len(), 1);
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].review.name, "alice");
        assert_eq!(detail.reviews[0].replies.len(), 1);
        assert_eq!(detail.reviews[0].replies[0].name, "bob");

        assert!(movie_by_slug(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recent_movies_newest_first() {
        let db = test_db().await;
        for i in 0..7 {
            seed_movie(&db, &format!("Movie {i}"), 2020, false).await;
        }
        let recent = recent_movies(&db, 5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].title, "Movie 6");
    }
}
