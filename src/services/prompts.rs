//! Prompt builders for the text-completion endpoints.

use super::ChatMessage;

const TRIP_PLANNER_SYSTEM: &str =
    "You are a smart travel planner who adapts to the user's preferred language and currency.";

/// Headings the trip plan is asked to fill, in order.
pub const TRIP_PLAN_SECTIONS: [&str; 6] = [
    "Best Time to Visit",
    "Top 3 Attractions",
    "Recommended Travel Methods",
    "Budget Breakdown",
    "Hotel Zone Suggestions",
    "Packing Tips",
];

/// Inputs for a trip plan, defaults already applied.
#[derive(Debug, Clone, Copy)]
pub struct TripPlanPrompt<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub date: &'a str,
    pub language: &'a str,
    pub currency: &'a str,
}

/// Inputs for an itinerary, defaults already applied.
#[derive(Debug, Clone, Copy)]
pub struct ItineraryPrompt<'a> {
    pub destination: &'a str,
    pub days: u32,
    pub language: &'a str,
    pub currency: &'a str,
}

pub fn trip_plan_messages(prompt: TripPlanPrompt<'_>) -> Vec<ChatMessage> {
    let mut user = format!(
        "You are a smart multilingual travel assistant. Respond in '{}' language.\n\n\
         Plan a trip from {} to {} on {}. Show all costs in {}.\n\n",
        prompt.language, prompt.origin, prompt.destination, prompt.date, prompt.currency
    );
    for section in TRIP_PLAN_SECTIONS {
        user.push_str("### ");
        user.push_str(section);
        user.push_str(":\n\n");
    }

    vec![ChatMessage::system(TRIP_PLANNER_SYSTEM), ChatMessage::user(user)]
}

pub fn itinerary_messages(prompt: ItineraryPrompt<'_>) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "You are a smart travel planner. Respond in '{}'. \
         Create a {}-day travel itinerary for {}. \
         Include day-wise sightseeing, food spots, tips, and mention costs in {}.",
        prompt.language, prompt.days, prompt.destination, prompt.currency
    ))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::MessageContent;

    fn text(message: &ChatMessage) -> &str {
        match &message.content {
            MessageContent::Text(text) => text,
            MessageContent::Parts(_) => panic!("expected text content"),
        }
    }

    #[test]
    fn test_trip_plan_has_system_and_user() {
        let messages = trip_plan_messages(TripPlanPrompt {
            origin: "Dhaka",
            destination: "Sylhet",
            date: "2026-12-01",
            language: "en",
            currency: "USD",
        });

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");

        let user = text(&messages[1]);
        assert!(user.contains("Respond in 'en' language"));
        assert!(user.contains("from Dhaka to Sylhet on 2026-12-01"));
        assert!(user.contains("Show all costs in USD"));
        for section in TRIP_PLAN_SECTIONS {
            assert!(user.contains(&format!("### {}:", section)));
        }
    }

    #[test]
    fn test_itinerary_is_single_user_message() {
        let messages = itinerary_messages(ItineraryPrompt {
            destination: "Bandarban",
            days: 5,
            language: "bn",
            currency: "BDT",
        });

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        let user = text(&messages[0]);
        assert!(user.contains("5-day travel itinerary for Bandarban"));
        assert!(user.contains("costs in BDT"));
    }
}
