//! Keyword-driven safety assistant
//!
//! Replies are picked by the first matching keyword group, in this order:
//! emergency, safety, weather, attractions, transport, medical, directions,
//! greetings, thanks. Anything else gets the generic help text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const EMERGENCY_KEYWORDS: &[&str] = &["emergency", "danger", "help", "stuck", "lost", "accident", "medical"];
const GREETINGS: &[&str] = &["hello", "hi", "hey", "good morning", "good evening"];

pub const EMERGENCY_REPLY: &str = "🚨 EMERGENCY DETECTED! If you're in immediate danger, call emergency services immediately. Local emergency number: 112 (Europe) / 911 (US) / 100 (India). Stay calm and provide your location details.";
const GENERAL_SAFETY_REPLY: &str =
    "General safety tips: Stay aware, keep emergency contacts handy, and trust your instincts.";
const NO_WEATHER_REPLY: &str =
    "I don't have current weather data. Please check the weather section on the map.";
const SEARCH_ATTRACTIONS_REPLY: &str =
    "🏛️ Search for a location on the map to see tourist attractions with images and descriptions!";
const TRANSPORT_REPLY: &str = "🚗 Transportation tips: Use official taxi services or ride-sharing apps. Verify driver details and share your trip with someone. For public transport, check official schedules.";
const MEDICAL_REPLY: &str = "🏥 Medical emergency: Call local emergency services. For non-emergency medical help, look for hospitals or clinics. Keep travel insurance details handy.";
const LOST_REPLY: &str = "🗺️ If you're lost: Stay calm, use the map to locate yourself, and ask locals politely. Share your location with trusted contacts.";
const GREETING_REPLY: &str = "Hello! 👋 I'm your AI Safety Assistant. I can help with safety tips, emergency contacts, weather advice, and travel recommendations. What would you like to know?";
const THANKS_REPLY: &str = "You're welcome! 😊 Stay safe and enjoy your travels. Remember, safety first!";
pub const GENERIC_REPLY: &str = "🤖 I'm here to help with your safety and travel needs! Ask me about:\n• Safety tips for your location\n• Weather conditions\n• Tourist attractions\n• Emergency contacts\n• Travel advice\n\nWhat specific information do you need?";

/// Temperature assumed for safety tips when the client sent none
const DEFAULT_TEMPERATURE_C: f64 = 20.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantContext {
    pub location: Option<LocationContext>,
    pub weather: Option<WeatherContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
    pub context: AssistantContext,
}

fn mentions(message: &str, words: &[&str]) -> bool {
    words.iter().any(|w| message.contains(w))
}

pub fn respond(message: &str, context: AssistantContext) -> AssistantReply {
    AssistantReply {
        response: generate_response(message, context.location.as_ref(), context.weather.as_ref()),
        timestamp: Utc::now(),
        context,
    }
}

pub fn generate_response(
    message: &str,
    location: Option<&LocationContext>,
    weather: Option<&WeatherContext>,
) -> String {
    let message = message.to_lowercase();

    if mentions(&message, EMERGENCY_KEYWORDS) {
        return EMERGENCY_REPLY.to_string();
    }

    if mentions(&message, &["safe", "safety"]) {
        let mut tips = Vec::new();
        if let Some(location) = location {
            tips.push(format!(
                "📍 For {}:",
                location.name.as_deref().unwrap_or("your location")
            ));
            tips.push("• Stay aware of your surroundings".to_string());
            tips.push("• Keep valuables secure".to_string());
            tips.push("• Use official transportation".to_string());
        }
        if let Some(weather) = weather {
            let temp = weather.temperature.unwrap_or(DEFAULT_TEMPERATURE_C);
            if temp > 35.0 {
                tips.push("🔥 High temperature alert: Stay hydrated and avoid prolonged sun exposure".to_string());
            } else if temp < 5.0 {
                tips.push("❄️ Cold weather: Dress warmly and be cautious of ice".to_string());
            }
        }
        return if tips.is_empty() {
            GENERAL_SAFETY_REPLY.to_string()
        } else {
            tips.join("\n")
        };
    }

    if mentions(&message, &["weather", "rain", "hot", "cold"]) {
        return match weather {
            Some(weather) => {
                let desc = weather.description.as_deref().unwrap_or("Unknown");
                match weather.temperature {
                    Some(t) => format!(
                        "🌤️ Current weather: {}°C, {}. Dress appropriately for the weather!",
                        t, desc
                    ),
                    None => format!("🌤️ Current weather: N/A°C, {}.", desc),
                }
            }
            None => NO_WEATHER_REPLY.to_string(),
        };
    }

    if mentions(&message, &["attractions", "places", "see"]) {
        return match location.and_then(|l| l.name.as_deref()) {
            Some(name) if !name.is_empty() => format!(
                "🏛️ For tourist attractions in {}, check the location pins on the map! They show famous places with direct Wikipedia links.",
                name
            ),
            _ => SEARCH_ATTRACTIONS_REPLY.to_string(),
        };
    }

    if mentions(&message, &["transport", "taxi", "uber"]) {
        return TRANSPORT_REPLY.to_string();
    }

    if mentions(&message, &["sick", "medical", "doctor"]) {
        return MEDICAL_REPLY.to_string();
    }

    if mentions(&message, &["lost", "direction", "find"]) {
        return LOST_REPLY.to_string();
    }

    if mentions(&message, GREETINGS) {
        return GREETING_REPLY.to_string();
    }

    if mentions(&message, &["thank", "thanks"]) {
        return THANKS_REPLY.to_string();
    }

    GENERIC_REPLY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> LocationContext {
        LocationContext {
            name: Some("Paris".to_string()),
            lat: Some(48.8566),
            lng: Some(2.3522),
        }
    }

    fn weather(temp: f64) -> WeatherContext {
        WeatherContext {
            temperature: Some(temp),
            description: Some("Clear sky".to_string()),
        }
    }

    #[test]
    fn test_emergency_wins() {
        let reply = generate_response("I'm LOST and need HELP", None, None);
        assert_eq!(reply, EMERGENCY_REPLY);
    }

    #[test]
    fn test_safety_tips_with_context() {
        let reply = generate_response("is this area safe?", Some(&paris()), Some(&weather(38.0)));
        assert!(reply.starts_with("📍 For Paris:"));
        assert!(reply.contains("• Keep valuables secure"));
        assert!(reply.ends_with("avoid prolonged sun exposure"));

        let cold = generate_response("safety", None, Some(&weather(2.0)));
        assert_eq!(cold, "❄️ Cold weather: Dress warmly and be cautious of ice");

        assert_eq!(generate_response("safety", None, None), GENERAL_SAFETY_REPLY);
    }

    #[test]
    fn test_weather_reply() {
        let reply = generate_response("what's the weather", None, Some(&weather(22.0)));
        assert_eq!(reply, "🌤️ Current weather: 22°C, Clear sky. Dress appropriately for the weather!");
        assert_eq!(generate_response("will it rain", None, None), NO_WEATHER_REPLY);
    }

    #[test]
    fn test_attractions_reply() {
        let reply = generate_response("best places to visit", Some(&paris()), None);
        assert!(reply.contains("in Paris"));
        assert_eq!(generate_response("what to see", None, None), SEARCH_ATTRACTIONS_REPLY);
    }

    #[test]
    fn test_later_groups() {
        assert_eq!(generate_response("need a taxi", None, None), TRANSPORT_REPLY);
        assert_eq!(generate_response("I feel sick", None, None), MEDICAL_REPLY);
        assert_eq!(generate_response("which direction to the museum", None, None), LOST_REPLY);
        assert_eq!(generate_response("Good morning!", None, None), GREETING_REPLY);
        assert_eq!(generate_response("thanks a lot", None, None), THANKS_REPLY);
        assert_eq!(generate_response("xyz", None, None), GENERIC_REPLY);
    }

    #[test]
    fn test_reply_echoes_context() {
        let context = AssistantContext {
            location: Some(paris()),
            weather: None,
        };
        let reply = respond("hello", context.clone());
        assert_eq!(reply.response, GREETING_REPLY);
        assert_eq!(reply.context.location, context.location);
    }
}
