//! Wikipedia summaries and attraction search

use futures::future::join_all;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{get_json, http_client, OpenDataError, Result, DEFAULT_USER_AGENT};

pub const WIKIPEDIA_REST_URL: &str = "https://en.wikipedia.org/api/rest_v1";
pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const WIKIPEDIA_WIKI_URL: &str = "https://en.wikipedia.org/wiki";

pub const MAX_ATTRACTIONS: usize = 10;

/// Below this many search results the built-in list is mixed in
const MIN_SEARCH_RESULTS: usize = 5;

const EXCLUDED_TITLE_MARKERS: &[&str] = &["list of", "category:", "template:", "wikipedia:", "file:", "portal:"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    pub rest_url: String,
    pub api_url: String,
    pub wiki_url: String,
    pub user_agent: String,
    pub timeout_sec: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            rest_url: WIKIPEDIA_REST_URL.to_string(),
            api_url: WIKIPEDIA_API_URL.to_string(),
            wiki_url: WIKIPEDIA_WIKI_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_sec: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiSummary {
    pub title: String,
    pub url: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttractionSource {
    Wikipedia,
    Popular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub source: AttractionSource,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    title: Option<String>,
    extract: Option<String>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: String,
}

/// `(city, [(name, page)])`; pages are relative to the wiki URL
static POPULAR_ATTRACTIONS: &[(&str, &[(&str, &str)])] = &[
    ("agra", &[
        ("Taj Mahal", "Taj_Mahal"),
        ("Agra Fort", "Agra_Fort"),
        ("Fatehpur Sikri", "Fatehpur_Sikri"),
        ("Itmad-ud-Daula", "Itmad-ud-Daula"),
    ]),
    ("delhi", &[
        ("Red Fort", "Red_Fort"),
        ("India Gate", "India_Gate"),
        ("Qutub Minar", "Qutub_Minar"),
        ("Lotus Temple", "Lotus_Temple"),
        ("Humayun's Tomb", "Humayun%27s_Tomb"),
    ]),
    ("mumbai", &[
        ("Gateway of India", "Gateway_of_India"),
        ("Marine Drive", "Marine_Drive,_Mumbai"),
        ("Elephanta Caves", "Elephanta_Caves"),
        ("Chhatrapati Shivaji Terminus", "Chhatrapati_Shivaji_Terminus"),
        ("Juhu Beach", "Juhu_Beach"),
    ]),
    ("kolkata", &[
        ("Victoria Memorial", "Victoria_Memorial,_Kolkata"),
        ("Howrah Bridge", "Howrah_Bridge"),
        ("Marble Palace", "Marble_Palace,_Kolkata"),
    ]),
    ("chennai", &[
        ("Marina Beach", "Marina_Beach"),
        ("Kapaleeshwarar Temple", "Kapaleeshwarar_Temple"),
        ("Fort St. George", "Fort_St._George,_India"),
        ("San Thome Basilica", "San_Thome_Basilica"),
    ]),
    ("paris", &[
        ("Eiffel Tower", "Eiffel_Tower"),
        ("Louvre Museum", "Louvre"),
        ("Notre-Dame de Paris", "Notre-Dame_de_Paris"),
        ("Champs-Élysées", "Champs-%C3%89lys%C3%A9es"),
        ("Arc de Triomphe", "Arc_de_Triomphe"),
        ("Montmartre", "Montmartre"),
    ]),
    ("london", &[
        ("Big Ben", "Big_Ben"),
        ("Tower of London", "Tower_of_London"),
        ("British Museum", "British_Museum"),
        ("London Eye", "London_Eye"),
        ("Buckingham Palace", "Buckingham_Palace"),
        ("Tower Bridge", "Tower_Bridge"),
    ]),
    ("rome", &[
        ("Colosseum", "Colosseum"),
        ("Roman Forum", "Roman_Forum"),
        ("Vatican City", "Vatican_City"),
        ("Trevi Fountain", "Trevi_Fountain"),
        ("Pantheon, Rome", "Pantheon,_Rome"),
    ]),
    ("barcelona", &[
        ("Sagrada Família", "Sagrada_Fam%C3%ADlia"),
        ("Park Güell", "Park_G%C3%BCell"),
        ("La Rambla", "La_Rambla,_Barcelona"),
        ("Camp Nou", "Camp_Nou"),
    ]),
    ("amsterdam", &[
        ("Rijksmuseum", "Rijksmuseum"),
        ("Anne Frank House", "Anne_Frank_House"),
        ("Vondelpark", "Vondelpark"),
    ]),
    ("tokyo", &[
        ("Tokyo Tower", "Tokyo_Tower"),
        ("Senso-ji", "Sens%C5%8D-ji"),
        ("Meiji Shrine", "Meiji_Shrine"),
        ("Tokyo Skytree", "Tokyo_Skytree"),
        ("Shibuya Crossing", "Shibuya_Crossing"),
    ]),
    ("beijing", &[
        ("Great Wall of China", "Great_Wall_of_China"),
        ("Forbidden City", "Forbidden_City"),
        ("Tiananmen Square", "Tiananmen_Square"),
        ("Summer Palace", "Summer_Palace"),
        ("Temple of Heaven", "Temple_of_Heaven"),
    ]),
    ("bangkok", &[
        ("Grand Palace", "Grand_Palace"),
        ("Wat Arun", "Wat_Arun"),
        ("Wat Phra Kaew", "Wat_Phra_Kaew"),
    ]),
    ("singapore", &[
        ("Marina Bay Sands", "Marina_Bay_Sands"),
        ("Gardens by the Bay", "Gardens_by_the_Bay"),
        ("Sentosa Island", "Sentosa"),
    ]),
    ("istanbul", &[
        ("Hagia Sophia", "Hagia_Sophia"),
        ("Blue Mosque", "Blue_Mosque"),
        ("Topkapi Palace", "Topkap%C4%B1_Palace"),
        ("Grand Bazaar", "Grand_Bazaar,_Istanbul"),
    ]),
    ("new york", &[
        ("Statue of Liberty", "Statue_of_Liberty"),
        ("Times Square", "Times_Square"),
        ("Central Park", "Central_Park"),
        ("Empire State Building", "Empire_State_Building"),
        ("Brooklyn Bridge", "Brooklyn_Bridge"),
    ]),
    ("dubai", &[
        ("Burj Khalifa", "Burj_Khalifa"),
        ("Palm Jumeirah", "Palm_Jumeirah"),
        ("Dubai Mall", "Dubai_Mall"),
        ("Burj Al Arab", "Burj_Al_Arab"),
    ]),
    ("cairo", &[
        ("Pyramids of Giza", "Giza_pyramid_complex"),
        ("Egyptian Museum", "Egyptian_Museum"),
        ("Khan el-Khalili", "Khan_el-Khalili"),
    ]),
    ("sydney", &[
        ("Sydney Opera House", "Sydney_Opera_House"),
        ("Sydney Harbour Bridge", "Sydney_Harbour_Bridge"),
        ("Royal Botanic Gardens", "Royal_Botanic_Gardens,_Sydney"),
        ("Bondi Beach", "Bondi_Beach"),
    ]),
];

/// Text up to the first period, with the period kept
pub fn first_sentence(extract: &str) -> String {
    format!("{}.", extract.split('.').next().unwrap_or(""))
}

fn page_slug(title: &str) -> String {
    title.replace(' ', "_")
}

/// Parse a configured endpoint that page paths get appended to
fn base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| OpenDataError::ParseError(format!("invalid base URL {}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(OpenDataError::ParseError(format!("URL cannot take a path: {}", raw)));
    }
    Ok(url)
}

/// Append `segments` to `base`, percent-encoding each one so `/`, `?` and `#`
/// in a title stay part of the page name
fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Article URL for `title` under `wiki_url`
pub fn page_url(wiki_url: &Url, title: &str) -> Url {
    join_segments(wiki_url, &[&page_slug(title)])
}

fn is_article_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    title.chars().count() > 3 && !EXCLUDED_TITLE_MARKERS.iter().any(|m| lower.contains(m))
}

pub fn search_queries(location: &str) -> [String; 5] {
    [
        format!("tourist attractions in {}", location),
        format!("places to visit in {}", location),
        format!("landmarks in {}", location),
        format!("sights in {}", location),
        format!("points of interest in {}", location),
    ]
}

/// Built-in highlights for well-known cities
pub fn popular_attractions(location: &str, wiki_url: &Url) -> Vec<Attraction> {
    let city = location.split(',').next().unwrap_or("").trim().to_lowercase();
    POPULAR_ATTRACTIONS
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, spots)| {
            spots
                .iter()
                .map(|(name, page)| Attraction {
                    name: name.to_string(),
                    url: page_url(wiki_url, page).to_string(),
                    source: AttractionSource::Popular,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Merge per-query title lists into at most [`MAX_ATTRACTIONS`] unique articles,
/// topping up from the built-in list when search came back thin
pub fn merge_attractions(location: &str, title_batches: Vec<Vec<String>>, wiki_url: &Url) -> Vec<Attraction> {
    let mut attractions: Vec<Attraction> = Vec::new();

    for title in title_batches.into_iter().flatten() {
        if is_article_title(&title) && !attractions.iter().any(|a| a.name == title) {
            attractions.push(Attraction {
                url: page_url(wiki_url, &title).to_string(),
                name: title,
                source: AttractionSource::Wikipedia,
            });
        }
    }

    if attractions.len() < MIN_SEARCH_RESULTS {
        for spot in popular_attractions(location, wiki_url) {
            if !attractions.iter().any(|a| a.name == spot.name) {
                attractions.push(spot);
            }
        }
    }

    attractions.truncate(MAX_ATTRACTIONS);
    attractions
}

pub struct Wikipedia {
    config: WikipediaConfig,
    rest_base: Url,
    wiki_base: Url,
    client: reqwest::Client,
}

impl Wikipedia {
    pub fn english() -> Result<Self> {
        Self::new(WikipediaConfig::default())
    }

    pub fn new(config: WikipediaConfig) -> Result<Self> {
        let client = http_client(config.timeout_sec, &config.user_agent)?;
        let rest_base = base_url(&config.rest_url)?;
        let wiki_base = base_url(&config.wiki_url)?;
        Ok(Self {
            config,
            rest_base,
            wiki_base,
            client,
        })
    }

    async fn fetch_summary(&self, title: &str) -> Result<WikiSummary> {
        let request = self
            .client
            .get(join_segments(&self.rest_base, &["page", "summary", &page_slug(title)]));
        let data: SummaryResponse = get_json(request, "Wikipedia").await?;

        let extract = data
            .extract
            .unwrap_or_else(|| format!("Learn more about {} on Wikipedia", title));
        Ok(WikiSummary {
            title: data.title.unwrap_or_else(|| title.to_string()),
            url: page_url(&self.wiki_base, title).to_string(),
            description: first_sentence(&extract),
            thumbnail: data.thumbnail.map(|t| t.source),
        })
    }

    async fn search_title(&self, query: &str) -> Result<Option<String>> {
        let request = self.client.get(&self.config.api_url).query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("format", "json"),
            ("srlimit", "1"),
        ]);
        let data: SearchResponse = get_json(request, "Wikipedia search").await?;
        Ok(data
            .query
            .and_then(|q| q.search.into_iter().next())
            .map(|r| r.title))
    }

    /// Summary for the first comma-separated part of `name`.
    ///
    /// A direct page lookup is tried first; if that fails the best search hit
    /// is summarised instead. `Ok(None)` when neither finds a page.
    pub async fn summary(&self, name: &str) -> Result<Option<WikiSummary>> {
        let clean = name.split(',').next().unwrap_or(name).trim();

        match self.fetch_summary(clean).await {
            Ok(summary) => return Ok(Some(summary)),
            Err(e) => debug!(title = clean, error = %e, "direct summary lookup failed"),
        }

        let Some(found) = self.search_title(clean).await? else {
            return Ok(None);
        };
        match self.fetch_summary(&found).await {
            Ok(summary) => Ok(Some(summary)),
            Err(e) => {
                debug!(title = %found, error = %e, "summary for search hit failed");
                Ok(None)
            }
        }
    }

    async fn opensearch(&self, query: &str) -> Result<Vec<String>> {
        let request = self.client.get(&self.config.api_url).query(&[
            ("action", "opensearch"),
            ("search", query),
            ("limit", "5"),
            ("namespace", "0"),
            ("format", "json"),
        ]);
        // [query, [titles], [descriptions], [urls]]
        let data: serde_json::Value = get_json(request, "Wikipedia opensearch").await?;
        Ok(data
            .get(1)
            .and_then(|titles| titles.as_array())
            .map(|titles| {
                titles
                    .iter()
                    .filter_map(|t| t.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn attractions(&self, location: &str) -> Vec<Attraction> {
        let queries = search_queries(location);
        let results = join_all(queries.iter().map(|q| self.opensearch(q))).await;

        let batches = results
            .into_iter()
            .zip(queries.iter())
            .filter_map(|(result, query)| match result {
                Ok(titles) => Some(titles),
                Err(e) => {
                    warn!(query = %query, error = %e, "attraction search failed");
                    None
                }
            })
            .collect();

        merge_attractions(location, batches, &self.wiki_base)
    }
}
