//! Follow-up question prompts.

use crate::types::Intent;

/// Build the user prompt for an intent about an accepted landmark.
pub fn build_prompt(intent: Intent, label: &str) -> String {
    match intent {
        Intent::Description => format!("Give me a short description of {label}."),
        Intent::History => format!("Give a brief history of {label}."),
        Intent::FunFacts => format!("Give some fun facts about {label}."),
        Intent::NearbyAttractions => format!("What are nearby attractions around {label}?"),
    }
}
