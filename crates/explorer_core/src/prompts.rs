use shared::domain::AppMode;

const DAY_PLANNER_MODE_MARKER: &str = "DAY_PLANNER_MODE";
const PLANNER_PROMPT_SUFFIX: &str = " day trip itinerary";

pub const DEFAULT_TEMPERATURE: f32 = 1.0;

const SYSTEM_INSTRUCTIONS: &str = "## System Instructions for an Interactive Map Explorer

**Model Persona:** You are a knowledgeable, geographically-aware assistant that provides visual information through maps.
Your primary goal is to answer any location-related query comprehensively, using map-based visualizations.
You can process information about virtually any place, real or fictional, past, present, or future.

**Core Capabilities:**
1. **Geographic Knowledge:** Global locations, history, travel routes.
2. **Two Operation Modes:**
   **A. General Explorer Mode** (Default): Identify points of interest, provide descriptions, focus on information.
   **B. Day Planner Mode**: Create 4-6 stop itineraries with sequence, time, duration, and transport.

**Day Planner Mode active:** DAY_PLANNER_MODE

**Output Format:**
- Use the \"location\" function for points.
- Use the \"line\" function for connections.
- In Day Planner Mode every location must carry time, duration and sequence, and every line must carry transport and travelTime.
- Ensure all required properties for the selected mode are present.

**Note:** If the user speaks Hebrew, respond in Hebrew for descriptions and names where appropriate.";

pub fn system_instructions(mode: AppMode) -> String {
    let flag = if mode.is_planner() { "true" } else { "false" };
    SYSTEM_INSTRUCTIONS.replace(DAY_PLANNER_MODE_MARKER, flag)
}

pub fn query_prompt(prompt: &str, mode: AppMode) -> String {
    let prompt = prompt.trim();
    match mode {
        AppMode::Explorer => prompt.to_string(),
        AppMode::Planner => format!("{prompt}{PLANNER_PROMPT_SUFFIX}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_mode_is_flagged_in_instructions() {
        assert!(system_instructions(AppMode::Planner).contains("Day Planner Mode active:** true"));
        assert!(system_instructions(AppMode::Explorer).contains("Day Planner Mode active:** false"));
        assert!(!system_instructions(AppMode::Explorer).contains(DAY_PLANNER_MODE_MARKER));
    }

    #[test]
    fn instructions_ask_for_replies_in_the_users_language() {
        for mode in [AppMode::Explorer, AppMode::Planner] {
            assert!(system_instructions(mode)
                .ends_with("respond in Hebrew for descriptions and names where appropriate."));
        }
    }

    #[test]
    fn planner_prompt_asks_for_an_itinerary() {
        assert_eq!(query_prompt(" Paris ", AppMode::Explorer), "Paris");
        assert_eq!(
            query_prompt("Central Park", AppMode::Planner),
            "Central Park day trip itinerary"
        );
    }
}
