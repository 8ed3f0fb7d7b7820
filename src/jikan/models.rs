//! Jikan v4 response models.
//!
//! Jikan omits or nulls fields freely (unaired shows have no score, movies no
//! episode count, old entries no trailer), so everything except `mal_id` is
//! optional and the display helpers substitute defaults.

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub mal_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub airing: bool,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub members: Option<u64>,
    #[serde(default)]
    pub favorites: Option<u64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub aired: Option<Aired>,
    #[serde(default)]
    pub trailer: Option<Trailer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<NamedResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub themes: Vec<NamedResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub studios: Vec<NamedResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub producers: Vec<NamedResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub jpg: Option<ImageUrls>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageUrls {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aired {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trailer {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// `GET /anime` body
#[derive(Debug, Clone, Deserialize)]
pub struct AnimeListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Anime>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub last_visible_page: u32,
}

/// `GET /anime/{id}` body
#[derive(Debug, Clone, Deserialize)]
pub struct AnimeResponse {
    pub data: Anime,
}

/// One page of list results as handed to the controllers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimePage {
    pub items: Vec<Anime>,
    pub total_pages: u32,
}

impl From<AnimeListResponse> for AnimePage {
    fn from(resp: AnimeListResponse) -> Self {
        Self {
            items: resp.data,
            total_pages: resp.pagination.last_visible_page,
        }
    }
}

/// Airing state as shown to the user, derived from `airing` and `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiringState {
    Airing,
    Finished,
    Upcoming,
}

impl AiringState {
    pub fn as_display(&self) -> &'static str {
        match self {
            AiringState::Airing => "Airing",
            AiringState::Finished => "Finished",
            AiringState::Upcoming => "Upcoming",
        }
    }
}

const NOT_AVAILABLE: &str = "N/A";

impl Anime {
    pub fn airing_state(&self) -> AiringState {
        if self.airing {
            AiringState::Airing
        } else if self.status.as_deref() == Some("Not yet aired") {
            AiringState::Upcoming
        } else {
            AiringState::Finished
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        let jpg = self.images.as_ref()?.jpg.as_ref()?;
        jpg.large_image_url
            .as_deref()
            .or(jpg.image_url.as_deref())
    }

    pub fn trailer_url(&self) -> Option<&str> {
        self.trailer
            .as_ref()
            .and_then(|t| t.url.as_deref())
            .filter(|u| !u.is_empty())
    }

    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("Unknown")
    }

    pub fn synopsis_text(&self) -> &str {
        self.synopsis.as_deref().unwrap_or("No synopsis available.")
    }

    /// Raw score for the detail page, "0" when unscored
    pub fn score_label(&self) -> String {
        match self.score {
            Some(score) if score > 0.0 => score.to_string(),
            _ => "0".to_string(),
        }
    }

    /// One-decimal score for list rows
    pub fn short_score_label(&self) -> String {
        format!("{:.1}", self.score.unwrap_or(0.0))
    }

    pub fn episodes_label(&self) -> String {
        match self.episodes {
            Some(n) if n > 0 => n.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }

    /// "12 episodes", or "Movie" for single-episode and unknown counts
    pub fn episode_count_label(&self) -> String {
        match self.episodes {
            Some(n) if n > 1 => format!("{} episodes", n),
            _ => "Movie".to_string(),
        }
    }

    pub fn year_label(&self) -> String {
        match self.year {
            Some(y) if y > 0 => y.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }

    pub fn rank_label(&self) -> String {
        match self.rank {
            Some(r) if r > 0 => format!("#{}", r),
            _ => format!("#{}", NOT_AVAILABLE),
        }
    }

    pub fn members_label(&self) -> String {
        self.members
            .map(group_thousands)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn favorites_label(&self) -> String {
        self.favorites
            .map(group_thousands)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn duration_label(&self) -> &str {
        self.duration
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(NOT_AVAILABLE)
    }

    /// "03 Oct 2002 to 08 Feb 2007", with N/A for an unknown side
    pub fn aired_label(&self) -> String {
        let (from, to) = match &self.aired {
            Some(aired) => (aired.from.as_deref(), aired.to.as_deref()),
            None => (None, None),
        };
        format!("{} to {}", format_air_date(from), format_air_date(to))
    }

    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().map(|g| g.name.as_str())
    }
}

fn format_air_date(raw: Option<&str>) -> String {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.format("%d %b %Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
