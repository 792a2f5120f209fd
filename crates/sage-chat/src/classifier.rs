//! Rule-based intent classification over raw user text.
//!
//! Tags each utterance with one topic from a closed set so the controller
//! can pick a richer prompt template (itinerary requests) or a canned
//! response bank (fallback mode). Classification never short-circuits the
//! remote call and never fails: unmatched text is `Unknown`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// =============================================================================
// Intent
// =============================================================================

/// Coarse topic classification of a single user utterance.
///
/// Derived per message, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Trekking,
    Accommodation,
    Food,
    Permits,
    Weather,
    Itinerary,
    Unknown,
}

impl Intent {
    /// All intents in classification priority order. First match wins.
    pub const PRIORITY: [Intent; 7] = [
        Intent::Greeting,
        Intent::Trekking,
        Intent::Accommodation,
        Intent::Food,
        Intent::Permits,
        Intent::Weather,
        Intent::Itinerary,
    ];
}

// =============================================================================
// Compiled pattern tables (compiled once, reused across calls)
// =============================================================================

struct IntentPatterns {
    greeting: Vec<Regex>,
    trekking: Vec<Regex>,
    accommodation: Vec<Regex>,
    food: Vec<Regex>,
    permits: Vec<Regex>,
    weather: Vec<Regex>,
    itinerary: Vec<Regex>,
}

static INTENT_PATTERNS: LazyLock<IntentPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("Invalid intent regex"))
            .collect()
    };

    IntentPatterns {
        greeting: mk(&[
            r"(?i)\b(?:hi|hello|hey|namaste)\b",
            r"(?i)\bgood\s+(?:morning|afternoon|evening)\b",
        ]),
        trekking: mk(&[
            r"(?i)\btrek(?:king|s)?\b",
            r"(?i)\bhik(?:e|es|ing)\b",
            r"(?i)\bgoecha\s*la\b",
            r"(?i)\bdzongri\b",
            r"(?i)\btrail(?:s)?\b",
            r"(?i)\bcamping\b",
        ]),
        accommodation: mk(&[
            r"(?i)\bhotel(?:s)?\b",
            r"(?i)\baccommodat(?:ion|ions|e)\b",
            r"(?i)\bhomestay(?:s)?\b",
            r"(?i)\bresort(?:s)?\b",
            r"(?i)\blodge(?:s)?\b",
            r"(?i)\bwhere\s+(?:to|can\s+i|should\s+i)\s+stay\b",
            r"(?i)\bplace\s+to\s+stay\b",
        ]),
        food: mk(&[
            r"(?i)\bfood(?:s)?\b",
            r"(?i)\beat(?:ing)?\b",
            r"(?i)\bmomo(?:s)?\b",
            r"(?i)\bthukpa\b",
            r"(?i)\bcuisine\b",
            r"(?i)\brestaurant(?:s)?\b",
            r"(?i)\bdish(?:es)?\b",
        ]),
        permits: mk(&[
            r"(?i)\bpermit(?:s)?\b",
            r"(?i)\binner\s+line\b",
            r"(?i)\bilp\b",
            r"(?i)\bnathula\b",
            r"(?i)\bvisa(?:s)?\b",
        ]),
        weather: mk(&[
            r"(?i)\bweather\b",
            r"(?i)\btemperature\b",
            r"(?i)\bclimate\b",
            r"(?i)\bseason(?:s)?\b",
            r"(?i)\bbest\s+time\b",
            r"(?i)\brain(?:fall|y|s)?\b",
            r"(?i)\bsnow(?:fall|ing)?\b",
            r"(?i)\bmonsoon\b",
        ]),
        itinerary: mk(&[
            r"(?i)\bitinerar(?:y|ies)\b",
            r"(?i)\bplan\b",
            r"(?i)\b\d+\s*[-\s]?\s*days?\b",
            r"(?i)\bschedule\b",
            r"(?i)\btrip\b",
            r"(?i)\btour\b",
        ]),
    }
});

// =============================================================================
// IntentClassifier
// =============================================================================

/// Pattern-based tagger over raw user text.
///
/// Matching is boolean presence-of-pattern with a fixed priority order:
/// greeting > trekking > accommodation > food > permits > weather >
/// itinerary > unknown. No confidence scores.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify the intent of a raw utterance. Pure and deterministic.
    pub fn classify(&self, text: &str) -> Intent {
        let pats = &*INTENT_PATTERNS;
        for intent in Intent::PRIORITY {
            let set = match intent {
                Intent::Greeting => &pats.greeting,
                Intent::Trekking => &pats.trekking,
                Intent::Accommodation => &pats.accommodation,
                Intent::Food => &pats.food,
                Intent::Permits => &pats.permits,
                Intent::Weather => &pats.weather,
                Intent::Itinerary => &pats.itinerary,
                Intent::Unknown => unreachable!("Unknown is not in PRIORITY"),
            };
            if set.iter().any(|re| re.is_match(text)) {
                return intent;
            }
        }
        Intent::Unknown
    }

    /// Build the prompt forwarded to the backend for the given intent.
    ///
    /// Itinerary requests are augmented with structural instructions
    /// (day-by-day sections, bullet points, time estimates) so the model
    /// replies in a renderable shape. All other intents pass through.
    pub fn build_prompt(&self, intent: Intent, text: &str) -> String {
        match intent {
            Intent::Itinerary => format!(
                "{}\n\nPlease structure the itinerary with a day-by-day breakdown \
                 (one section per day), bullet points for the activities within each \
                 day, and rough time estimates for travel between stops.",
                text
            ),
            _ => text.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
