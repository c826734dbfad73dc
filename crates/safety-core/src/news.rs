//! Canned safety news per city

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

static CITY_NEWS: &[(&str, &[(&str, &str, Severity)])] = &[
    (
        "paris",
        &[
            (
                "Paris Metro Safety Improvements",
                "New security measures implemented in major metro stations",
                Severity::Low,
            ),
            (
                "Tourist Safety Campaign Launched",
                "Paris tourism board launches safety awareness campaign for visitors",
                Severity::Info,
            ),
        ],
    ),
    (
        "london",
        &[(
            "London Underground Security Update",
            "Enhanced security protocols in place following recent incidents",
            Severity::Medium,
        )],
    ),
    (
        "tokyo",
        &[(
            "Tokyo Earthquake Preparedness",
            "Emergency drills conducted in tourist areas",
            Severity::Info,
        )],
    ),
    (
        "new york",
        &[(
            "NYC Tourist Safety Initiatives",
            "New safety measures for Times Square and Central Park",
            Severity::Low,
        )],
    ),
];

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// News for the city named by the first comma-separated part of `location`
pub fn safety_news(location: &str, now: DateTime<Utc>) -> Vec<NewsItem> {
    let name = location.split(',').next().unwrap_or("").trim().to_lowercase();

    if let Some((_, items)) = CITY_NEWS.iter().find(|(city, _)| *city == name) {
        return items
            .iter()
            .map(|(title, description, severity)| NewsItem {
                title: title.to_string(),
                description: description.to_string(),
                severity: *severity,
                timestamp: now,
            })
            .collect();
    }

    vec![NewsItem {
        title: format!("General Safety Advisory for {}", title_case(&name)),
        description: "Stay aware of surroundings and follow local safety guidelines".to_string(),
        severity: Severity::Info,
        timestamp: now,
    }]
}
