use serde::Deserialize;

use crate::entities::{actor, category, genre, movie, movie_shot, review};

/// One page of movies plus what pagination needs to render itself.
#[derive(Clone, Debug)]
pub struct MoviePage {
    pub movies: Vec<movie::Model>,
    /// 1-based current page.
    pub page: u64,
    pub pages: u64,
}

impl MoviePage {
    pub fn empty() -> Self {
        Self { movies: Vec::new(), page: 1, pages: 0 }
    }
}

/// Sidebar data shared by every listing page: the genre/year filter form
/// and the recently added widget.
#[derive(Clone, Debug)]
pub struct Sidebar {
    pub categories: Vec<category::Model>,
    pub genres: Vec<genre::Model>,
    pub years: Vec<i32>,
    pub recent: Vec<movie::Model>,
}

/// A top-level review with its direct replies.
#[derive(Clone, Debug)]
pub struct ReviewThread {
    pub review: review::Model,
    pub replies: Vec<review::Model>,
}

/// Everything the detail page renders for one movie.
#[derive(Clone, Debug)]
pub struct MovieDetail {
    pub movie: movie::Model,
    pub genres: Vec<genre::Model>,
    pub actors: Vec<actor::Model>,
    pub directors: Vec<actor::Model>,
    pub shots: Vec<movie_shot::Model>,
    pub reviews: Vec<ReviewThread>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// `/filter?year=2019&year=2020&genre=3` — repeated keys, hence
/// axum-extra's `Query` on the route.
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub year: Vec<i32>,
    #[serde(default)]
    pub genre: Vec<i32>,
    pub page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub name: String,
    pub email: String,
    pub text: String,
    /// Review id being replied to; the form sends "" when absent.
    pub parent: Option<String>,
}

impl ReviewForm {
    pub fn parent_id(&self) -> Option<i32> {
        self.parent.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

#[derive(Debug, Deserialize)]
pub struct RatingForm {
    pub movie: i32,
    pub star: i32,
}
