use jiff::civil::Date;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Film {
    pub id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: String,
    pub release_date: Option<Date>,
    pub genre_ids: Vec<i32>,
    pub vote_average: f64,
    pub runtime: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CuratedList {
    pub id: i32,
    pub name: String,
    pub refreshed_at: Option<jiff::Timestamp>,
    pub films: Vec<Film>,
}

/// Fields needed to create a film record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewFilm {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<Date>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub runtime: Option<i32>,
}

impl From<&MovieDetails> for NewFilm {
    fn from(details: &MovieDetails) -> Self {
        Self {
            id: details.id,
            title: details.title.clone(),
            poster_path: details.poster_path.clone(),
            backdrop_path: details.backdrop_path.clone(),
            overview: details.overview.clone(),
            release_date: parse_release_date(details.release_date.as_deref()),
            genre_ids: details.genres.iter().map(|g| g.id).collect(),
            vote_average: details.vote_average,
            runtime: details.runtime,
        }
    }
}

impl From<&PopularFilm> for NewFilm {
    fn from(summary: &PopularFilm) -> Self {
        Self {
            id: summary.id,
            title: summary.title.clone(),
            poster_path: summary.poster_path.clone(),
            backdrop_path: summary.backdrop_path.clone(),
            overview: summary.overview.clone(),
            release_date: parse_release_date(summary.release_date.as_deref()),
            genre_ids: summary.genre_ids.clone(),
            vote_average: summary.vote_average,
            // The listing endpoint never carries a runtime.
            runtime: None,
        }
    }
}

/// One entry of the catalog's popular listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopularFilm {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub vote_average: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: f64,
    pub runtime: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
}

impl Video {
    pub fn is_youtube_trailer(&self) -> bool {
        self.site == "YouTube" && self.kind == "Trailer"
    }
}

/// The catalog sends `""` for films without a known release date.
pub fn parse_release_date(raw: Option<&str>) -> Option<Date> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(runtime: Option<i32>) -> MovieDetails {
        MovieDetails {
            id: 550,
            title: "Fight Club".to_string(),
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            overview: "Un employé de bureau insomniaque".to_string(),
            release_date: Some("1999-10-15".to_string()),
            genres: vec![
                Genre { id: 18, name: "Drame".to_string() },
                Genre { id: 53, name: "Thriller".to_string() },
            ],
            vote_average: 8.4,
            runtime,
        }
    }

    #[test]
    fn test_new_film_from_details_keeps_runtime() {
        let film = NewFilm::from(&details(Some(139)));
        assert_eq!(film.id, 550);
        assert_eq!(film.genre_ids, vec![18, 53]);
        assert_eq!(film.runtime, Some(139));
        assert_eq!(film.release_date, Some(jiff::civil::date(1999, 10, 15)));
    }

    #[test]
    fn test_new_film_from_summary_has_no_runtime() {
        let summary = PopularFilm {
            id: 42,
            title: "Summary".to_string(),
            poster_path: None,
            backdrop_path: None,
            overview: String::new(),
            release_date: Some(String::new()),
            genre_ids: vec![12],
            vote_average: 6.1,
        };
        let film = NewFilm::from(&summary);
        assert_eq!(film.runtime, None);
        assert_eq!(film.release_date, None);
    }

    #[test]
    fn test_parse_release_date() {
        assert_eq!(parse_release_date(None), None);
        assert_eq!(parse_release_date(Some("  ")), None);
        assert_eq!(parse_release_date(Some("not a date")), None);
        assert_eq!(parse_release_date(Some("2024-02-29")), Some(jiff::civil::date(2024, 2, 29)));
    }

    #[test]
    fn test_details_deserialize_with_nulls() {
        let json = r#"{
            "id": 7,
            "title": "Sans affiche",
            "poster_path": null,
            "backdrop_path": null,
            "overview": "",
            "release_date": "",
            "genres": [],
            "vote_average": 0,
            "runtime": null
        }"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.id, 7);
        assert_eq!(details.runtime, None);
        assert_eq!(details.poster_path, None);
    }

    #[test]
    fn test_video_trailer_filter() {
        let video: Video =
            serde_json::from_str(r#"{"site":"YouTube","type":"Trailer","key":"abc"}"#).unwrap();
        assert!(video.is_youtube_trailer());
        let teaser = Video { kind: "Teaser".to_string(), ..video };
        assert!(!teaser.is_youtube_trailer());
    }
}
