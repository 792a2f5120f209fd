//! Canned response bank for fallback/local mode.
//!
//! When the remote backend is unavailable the controller answers from this
//! statically authored bank, selected by intent. The bank is an immutable
//! structure constructed once at startup and passed by reference; it is
//! never mutated at runtime.

use crate::classifier::Intent;

/// Ordered canned replies and optional follow-up prompts for one intent.
#[derive(Clone, Debug)]
pub struct CannedReplies {
    /// Ordered reply templates.
    pub responses: Vec<String>,
    /// Ordered follow-up prompts appended after a reply.
    pub questions: Vec<String>,
}

impl CannedReplies {
    fn new(responses: &[&str], questions: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|s| s.to_string()).collect(),
            questions: questions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Static mapping from intent to canned replies.
#[derive(Clone, Debug)]
pub struct ResponseBank {
    greeting: CannedReplies,
    trekking: CannedReplies,
    accommodation: CannedReplies,
    food: CannedReplies,
    permits: CannedReplies,
    weather: CannedReplies,
    itinerary: CannedReplies,
    unknown: CannedReplies,
}

impl Default for ResponseBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBank {
    /// Build the bank with the stock Sikkim travel replies.
    pub fn new() -> Self {
        Self {
            greeting: CannedReplies::new(
                &["Namaste! I'm Sikkim Sage, your travel guide for the Himalayas."],
                &["What would you like to know about Sikkim?"],
            ),
            trekking: CannedReplies::new(
                &[
                    "Sikkim offers amazing trekking routes! The Goecha La trek is \
                     particularly stunning.",
                    "The Dzongri trail is a shorter alternative with superb views of \
                     Kanchenjunga.",
                ],
                &["Would you like difficulty and season details for a specific trek?"],
            ),
            accommodation: CannedReplies::new(
                &["For accommodation, I recommend staying in Gangtok for easy access \
                   to major attractions."],
                &["Are you looking for hotels, homestays, or something more remote?"],
            ),
            food: CannedReplies::new(
                &["Don't miss trying momos, thukpa, and traditional Sikkimese tea!"],
                &["Shall I suggest places to eat in Gangtok?"],
            ),
            permits: CannedReplies::new(
                &["Tsomgo Lake and Nathula Pass require special permits. I can help \
                   you with that."],
                &["How many days are you planning to spend in the protected areas?"],
            ),
            weather: CannedReplies::new(
                &["Best time to visit Sikkim is March-May and October-December for \
                   clear mountain views."],
                &["Which month are you thinking of travelling?"],
            ),
            itinerary: CannedReplies::new(
                &[
                    "The Rumtek Monastery is a must-visit for spiritual experiences.",
                    "Yumthang Valley is called the 'Valley of Flowers' - perfect for \
                     nature lovers!",
                ],
                &["Would you like me to help you customize this itinerary?"],
            ),
            unknown: CannedReplies::new(
                &["I'm best at Sikkim travel questions - trekking, food, permits, \
                   weather, places to stay, and trip planning."],
                &["What part of your Sikkim trip can I help with?"],
            ),
        }
    }

    /// Look up the replies for an intent.
    pub fn replies(&self, intent: Intent) -> &CannedReplies {
        match intent {
            Intent::Greeting => &self.greeting,
            Intent::Trekking => &self.trekking,
            Intent::Accommodation => &self.accommodation,
            Intent::Food => &self.food,
            Intent::Permits => &self.permits,
            Intent::Weather => &self.weather,
            Intent::Itinerary => &self.itinerary,
            Intent::Unknown => &self.unknown,
        }
    }

    /// Compose a canned reply for the given intent and turn counter.
    ///
    /// Replies rotate deterministically through the ordered list; the
    /// matching follow-up prompt (if any) is appended on its own paragraph.
    pub fn compose(&self, intent: Intent, turn: usize) -> String {
        let replies = self.replies(intent);
        let mut text = replies.responses[turn % replies.responses.len()].clone();
        if !replies.questions.is_empty() {
            let question = &replies.questions[turn % replies.questions.len()];
            text.push_str("\n\n");
            text.push_str(question);
        }
        text
    }
}

// =============================================================================
// Tests
// =============================================================================
