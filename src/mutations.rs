use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::{
    entities::{movie, rating, rating_star, review},
    error::{AppError, AppResult},
    models::ReviewForm,
};

pub const MAX_REVIEW_CHARS: usize = 5000;

/// Validate and persist a review. A supplied parent must be an existing
/// review of the same movie.
pub async fn submit_review(
    db: &DatabaseConnection,
    movie_id: i32,
    form: &ReviewForm,
) -> AppResult<review::Model> {
    let movie = movie::Entity::find_by_id(movie_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let name = form.name.trim();
    let text = form.text.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if text.is_empty() {
        return Err(AppError::BadRequest("review text is required".to_string()));
    }
    if text.chars().count() > MAX_REVIEW_CHARS {
        return Err(AppError::BadRequest(format!(
            "review text must be at most {MAX_REVIEW_CHARS} characters"
        )));
    }
    if !is_valid_email(form.email.trim()) {
        return Err(AppError::BadRequest("a valid email is required".to_string()));
    }

    let parent_id = match form.parent_id() {
        Some(id) => {
            let parent = review::Entity::find_by_id(id)
                .filter(review::Column::MovieId.eq(movie.id))
                .one(db)
                .await?;
            if parent.is_none() {
                return Err(AppError::BadRequest("unknown parent review".to_string()));
            }
            Some(id)
        }
        None => None,
    };

    let saved = review::ActiveModel {
        email: Set(form.email.trim().to_string()),
        name: Set(name.to_string()),
        text: Set(text.to_string()),
        parent_id: Set(parent_id),
        movie_id: Set(movie.id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(saved)
}

/// Upsert the rating row keyed by (movie, ip). Done as a single
/// insert-on-conflict against the unique index so concurrent submissions
/// from the same client cannot create duplicates.
pub async fn submit_rating(
    db: &DatabaseConnection,
    movie_id: i32,
    star_value: i32,
    ip: &str,
) -> AppResult<()> {
    if movie::Entity::find_by_id(movie_id).one(db).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let star = rating_star::Entity::find()
        .filter(rating_star::Column::Value.eq(star_value))
        .one(db)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("unknown star value {star_value}")))?;

    let model = rating::ActiveModel {
        ip: Set(ip.to_string()),
        star_id: Set(star.id),
        movie_id: Set(movie_id),
        ..Default::default()
    };

    rating::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                rating::Column::MovieId,
                rating::Column::Ip,
            ])
            .update_columns([rating::Column::StarId])
            .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use sea_orm::ModelTrait;

    use super::*;
    use crate::{
        entities::{category, movie_shot},
        models::ReviewForm,
        queries::{
            self,
            tests::{seed_movie, seed_review, test_db},
        },
    };

    fn review_form(name: &str, email: &str, text: &str, parent: Option<&str>) -> ReviewForm {
        ReviewForm {
            name: name.to_string(),
            email: email.to_string(),
            text: text.to_string(),
            parent: parent.map(str::to_string),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("alice @example.com"));
    }

    #[tokio::test]
    async fn review_is_saved() {
        let db = test_db().await;
        let movie = seed_movie(&db, "The Matrix", 1999, false).await;

        let saved = submit_review(
            &db,
            movie.id,
            &review_form("alice", "alice@example.com", "great", None),
        )
        .await
        .unwrap();
        assert_eq!(saved.movie_id, movie.id);
        assert_eq!(saved.parent_id, None);
    }

    #[tokio::test]
    async fn invalid_review_is_rejected_not_saved() {
        let db = test_db().await;
        let movie = seed_movie(&db, "The Matrix", 1999, false).await;

        let err = submit_review(&db, movie.id, &review_form("alice", "not-an-email", "x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let long = "x".repeat(MAX_REVIEW_CHARS + 1);
        let err =
            submit_review(&db, movie.id, &review_form("alice", "a@b.com", &long, None))
                .await
                .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert!(queries::review_threads(&db, movie.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn review_for_missing_movie_is_not_found() {
        let db = test_db().await;
        let err = submit_review(&db, 99, &review_form("a", "a@b.com", "x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn reply_resolves_parent_and_stays_out_of_top_level() {
        let db = test_db().await;
        let movie = seed_movie(&db, "The Matrix", 1999, false).await;
        let top = seed_review(&db, movie.id, "alice", None).await;

        let parent = top.id.to_string();
        let reply = submit_review(
            &db,
            movie.id,
            &review_form("bob", "bob@example.com", "agreed", Some(&parent)),
        )
        .await
        .unwrap();
        assert_eq!(reply.parent_id, Some(top.id));

        let threads = queries::review_threads(&db, movie.id).await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].replies[0].id, reply.id);
    }

    #[tokio::test]
    async fn reply_to_another_movies_review_is_rejected() {
        let db = test_db().await;
        let a = seed_movie(&db, "A", 2020, false).await;
        let b = seed_movie(&db, "B", 2020, false).await;
        let foreign = seed_review(&db, a.id, "alice", None).await;

        let parent = foreign.id.to_string();
        let err = submit_review(
            &db,
            b.id,
            &review_form("bob", "bob@example.com", "hi", Some(&parent)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn rating_upserts_one_row_per_movie_and_ip() {
        let db = test_db().await;
        let movie = seed_movie(&db, "The Matrix", 1999, false).await;

        submit_rating(&db, movie.id, 3, "1.2.3.4").await.unwrap();
        submit_rating(&db, movie.id, 5, "1.2.3.4").await.unwrap();
        // A different client keeps its own row.
        submit_rating(&db, movie.id, 1, "5.6.7.8").await.unwrap();

        let rows = rating::Entity::find()
            .filter(rating::Column::MovieId.eq(movie.id))
            .filter(rating::Column::Ip.eq("1.2.3.4"))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let star = rating_star::Entity::find_by_id(rows[0].star_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(star.value, 5);

        let total = rating::Entity::find().all(&db).await.unwrap();
        assert_eq!(total.len(), 2);
    }

    #[tokio::test]
    async fn unknown_star_value_is_rejected_without_a_row() {
        let db = test_db().await;
        let movie = seed_movie(&db, "The Matrix", 1999, false).await;

        let err = submit_rating(&db, movie.id, 7, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(rating::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rating_for_missing_movie_is_not_found() {
        let db = test_db().await;
        let err = submit_rating(&db, 42, 3, "1.2.3.4").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn deleting_a_movie_cascades_to_its_children() {
        let db = test_db().await;
        let movie = seed_movie(&db, "The Matrix", 1999, false).await;
        seed_review(&db, movie.id, "alice", None).await;
        submit_rating(&db, movie.id, 4, "1.2.3.4").await.unwrap();
        movie_shot::ActiveModel {
            title: Set("Lobby".to_string()),
            description: Set(String::new()),
            image: Set("shots/lobby.jpg".to_string()),
            movie_id: Set(movie.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        movie.delete(&db).await.unwrap();

        assert!(review::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(rating::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(movie_shot::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_category_keeps_the_movie() {
        let db = test_db().await;
        let cat = category::ActiveModel {
            name: Set("Films".to_string()),
            description: Set(String::new()),
            slug: Set("films".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let movie = seed_movie(&db, "The Matrix", 1999, false).await;
        let mut update: movie::ActiveModel = movie.into();
        update.category_id = Set(Some(cat.id));
        let movie = update.update(&db).await.unwrap();

        cat.delete(&db).await.unwrap();

        let reloaded = movie::Entity::find_by_id(movie.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.category_id, None);
    }
}
