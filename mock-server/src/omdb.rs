//! Fake of the OMDb movie API over a fixed catalogue.
//!
//! Supports lookups by IMDb id (`i`), by exact title (`t`), and paged
//! substring search (`s`, `page`), ten results per page like the real
//! service. Every request must carry the configured `apikey`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub kind: String,
    pub released: String,
    pub runtime: String,
    pub director: String,
    pub plot: String,
}

impl Movie {
    fn summary(&self) -> Value {
        json!({
            "Title": self.title,
            "Year": self.year,
            "imdbID": self.imdb_id,
            "Type": self.kind,
            "Poster": "N/A",
        })
    }

    fn details(&self) -> Value {
        json!({
            "Title": self.title,
            "Year": self.year,
            "Released": self.released,
            "Runtime": self.runtime,
            "Director": self.director,
            "Plot": self.plot,
            "imdbID": self.imdb_id,
            "Type": self.kind,
            "Response": "True",
        })
    }
}

#[derive(Clone)]
struct OmdbState {
    api_key: Arc<str>,
    catalogue: Arc<Vec<Movie>>,
}

/// Router serving the default catalogue, accepting only `api_key`.
pub fn router(api_key: &str) -> Router {
    router_with(api_key, catalogue())
}

pub fn router_with(api_key: &str, movies: Vec<Movie>) -> Router {
    Router::new().route("/", get(query)).with_state(OmdbState {
        api_key: Arc::from(api_key),
        catalogue: Arc::new(movies),
    })
}

fn movie(imdb_id: &str, title: &str, year: &str, kind: &str) -> Movie {
    Movie {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: year.to_string(),
        kind: kind.to_string(),
        released: "N/A".to_string(),
        runtime: "N/A".to_string(),
        director: "N/A".to_string(),
        plot: "N/A".to_string(),
    }
}

/// Fixture catalogue. Searching for "stem" yields more than 30 hits.
pub fn catalogue() -> Vec<Movie> {
    let mut movies = vec![
        Movie {
            released: "23 Nov 2010".to_string(),
            runtime: "12 min".to_string(),
            director: "Mike Feurstein".to_string(),
            plot: "A short about a stem cell researcher.".to_string(),
            ..movie("tt1810525", "Stem Cell Diaries", "2010", "movie")
        },
        Movie {
            released: "01 Mar 2011".to_string(),
            runtime: "9 min".to_string(),
            director: "Ph Carli".to_string(),
            plot: "Two friends argue about everything.".to_string(),
            ..movie("tt1846527", "Le Stem", "2011", "movie")
        },
        Movie {
            released: "05 Oct 2013".to_string(),
            runtime: "22 min".to_string(),
            director: "N/A".to_string(),
            plot: "Students explore careers in Science, Technology, Engineering and Math."
                .to_string(),
            ..movie("tt3396208", "The STEM Journals", "2013–", "series")
        },
        Movie {
            runtime: "15 min".to_string(),
            ..movie("tt7926996", "Activision: STEM - in the Videogame Industry", "2017", "movie")
        },
    ];
    for n in 1..=30 {
        movies.push(movie(
            &format!("tt90000{n:02}"),
            &format!("Stem Stories Episode {n}"),
            "2019",
            "episode",
        ));
    }
    movies
}

fn failure(message: &str) -> Value {
    json!({ "Response": "False", "Error": message })
}

async fn query(State(state): State<OmdbState>, Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("apikey") {
        None => return (StatusCode::UNAUTHORIZED, Json(failure("No API key provided."))).into_response(),
        Some(key) if key.as_str() != &*state.api_key => {
            return (StatusCode::UNAUTHORIZED, Json(failure("Invalid API key!"))).into_response()
        }
        Some(_) => {}
    }

    let body = if let Some(id) = params.get("i") {
        state
            .catalogue
            .iter()
            .find(|m| &m.imdb_id == id)
            .map(Movie::details)
            .unwrap_or_else(|| failure("Incorrect IMDb ID."))
    } else if let Some(title) = params.get("t") {
        state
            .catalogue
            .iter()
            .find(|m| m.title.eq_ignore_ascii_case(title))
            .map(Movie::details)
            .unwrap_or_else(|| failure("Movie not found!"))
    } else if let Some(term) = params.get("s") {
        search(&state.catalogue, term, params.get("page"))
    } else {
        failure("Something went wrong.")
    };
    Json(body).into_response()
}

fn search(catalogue: &[Movie], term: &str, page: Option<&String>) -> Value {
    let term = term.to_lowercase();
    let hits: Vec<&Movie> = catalogue
        .iter()
        .filter(|m| m.title.to_lowercase().contains(&term))
        .collect();
    if hits.is_empty() {
        return failure("Movie not found!");
    }
    let page: usize = page.and_then(|p| p.parse().ok()).unwrap_or(1).max(1);
    let items: Vec<Value> = hits
        .iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .map(|m| m.summary())
        .collect();
    json!({
        "Search": items,
        "totalResults": hits.len().to_string(),
        "Response": "True",
    })
}
