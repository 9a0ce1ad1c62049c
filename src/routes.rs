use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Form, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Query as MultiQuery;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{FilterQuery, PageQuery, RatingForm, ReviewForm, SearchQuery},
    mutations, queries, templates,
};

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let page = queries::list_movies(&state.db, q.page.unwrap_or(1)).await?;
    let sidebar = queries::sidebar(&state.db, state.config.recent_count).await?;
    Ok(Html(templates::movie_list_page("Movies", &page, &sidebar, "/", "")))
}

pub async fn filter(
    State(state): State<Arc<AppState>>,
    MultiQuery(q): MultiQuery<FilterQuery>,
) -> AppResult<Html<String>> {
    let page =
        queries::filter_movies(&state.db, &q.year, &q.genre, q.page.unwrap_or(1)).await?;
    let sidebar = queries::sidebar(&state.db, state.config.recent_count).await?;

    // Selection carried into pagination links, Django-querystring style.
    let mut query = String::new();
    for year in &q.year {
        query.push_str(&format!("year={year}&"));
    }
    for genre in &q.genre {
        query.push_str(&format!("genre={genre}&"));
    }
    Ok(Html(templates::movie_list_page("Filtered movies", &page, &sidebar, "/filter", &query)))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let page = queries::search_movies(&state.db, &q.q, q.page.unwrap_or(1)).await?;
    let sidebar = queries::sidebar(&state.db, state.config.recent_count).await?;
    let query = format!("q={}&", urlencoding::encode(q.q.trim()));
    Ok(Html(templates::movie_list_page("Search results", &page, &sidebar, "/search", &query)))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let detail = queries::movie_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::NotFound)?;
    let sidebar = queries::sidebar(&state.db, state.config.recent_count).await?;
    Ok(Html(templates::movie_detail_page(&detail, &sidebar)))
}

pub async fn actor_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Html<String>> {
    let actor = queries::actor_by_name(&state.db, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    let sidebar = queries::sidebar(&state.db, state.config.recent_count).await?;
    Ok(Html(templates::actor_page(&actor, &sidebar)))
}

pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Form(form): Form<ReviewForm>,
) -> AppResult<Redirect> {
    let movie = queries::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::NotFound)?;
    mutations::submit_review(&state.db, movie.id, &form).await?;
    Ok(Redirect::to(&format!("/{}", movie.slug)))
}

/// Status-only contract: 201 on success, 400 on a bad star value, no body
/// either way.
pub async fn add_rating(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(form): Form<RatingForm>,
) -> Response {
    let ip = client_ip(&headers, peer);
    match mutations::submit_rating(&state.db, form.movie, form.star, &ip).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(AppError::BadRequest(_)) => StatusCode::BAD_REQUEST.into_response(),
        Err(AppError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => err.into_response(),
    }
}

/// First X-Forwarded-For entry when present, otherwise the peer address.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "10.0.0.9:54321".parse().unwrap()
    }

    #[test]
    fn client_ip_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "1.2.3.4, 5.6.7.8".parse().unwrap());
        assert_eq!(client_ip(&headers, peer()), "1.2.3.4");
    }

    #[test]
    fn client_ip_falls_back_to_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "10.0.0.9");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "".parse().unwrap());
        assert_eq!(client_ip(&headers, peer()), "10.0.0.9");
    }
}
