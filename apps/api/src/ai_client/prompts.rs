//! Prompt construction for all analysis modes.
//!
//! Builders are pure functions of their typed inputs — no I/O, no
//! randomness — so prompt text is testable without a network call. Each
//! prompt embeds the output schema it expects; the schema text here and the
//! validator in `schema.rs` describe the same contract and must move
//! together.

use crate::models::profile::ProfileAttributes;
use crate::models::riasec::RiasecScores;

/// System prompt for career recommendation calls.
pub const CAREER_ADVISOR_SYSTEM: &str = "You are an expert AI Career Counselor and Talent Development Specialist.
Your goal is to provide highly personalized, data-driven, and actionable career guidance.
You specialize in analyzing user profiles (interests, education, skills, personality) to recommend the best fit careers.

Guidelines:
1. Be encouraging but realistic.
2. Focus on \"Future of Work\" trends.
3. Provide specific, actionable advice (e.g., exact skills to learn).
4. Do NOT use generic advice like \"follow your passion\" without concrete steps.
5. Analyze the match based on: Skills, Personality Fit, and Market Demand.

Output Format: JSON only, strictly adhering to the specified schema.";

/// System prompt for the detailed personality analysis mode.
pub const PERSONALITY_ANALYST_SYSTEM: &str = "You are an expert Psychologist and Career Counselor specializing in the RIASEC (Holland Code) model.
Your goal is to analyze a user's personality assessment scores and provide deep insights into their work style, ideal environments, and potential career paths.
Output Format: JSON only.";

/// Schema block shared by both career prompts. Must match the
/// `CareerAnalysis` contract field for field.
const CAREER_ANALYSIS_SCHEMA: &str = r#"{
  "user_profile_summary": "string (100-200 words, rich with bullet points, using 'You' tone)",
  "personality_analysis": [
    {
      "trait": "string",
      "score": number (0-100),
      "description": "string (conversational)"
    }
  ],
  "top_careers": [
    {
      "career_name": "string",
      "match_percentage": number (0-100),
      "reasoning": "string (Start with 'You'll excel here because...')",
      "required_skills": ["string"],
      "missing_skills": ["string"],
      "salary_range": { "min": number, "max": number, "currency": "KES" },
      "outlook": "string"
    }
  ],
  "suggested_learning_path": ["string (Direct 'You should...' advice)"]
}"#;

/// Renders scores one `category: sum` per line, in canonical R-I-A-S-E-C
/// order. Categories absent from the map are omitted, never guessed.
fn render_scores(scores: &RiasecScores) -> String {
    scores
        .iter()
        .map(|(category, sum)| format!("{}: {sum}", category.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the RIASEC career-recommendation prompt.
pub fn riasec_career_prompt(scores: &RiasecScores) -> String {
    format!(
        r#"Analyze the following RIASEC (Holland Code) scores and recommend the top 3 best-fit career paths.

Scores (sum of 1-5 Likert answers per category):
{scores}

Provide a comprehensive analysis using a warm, personal, and conversational tone.
CRITICAL TONE GUIDELINE: Use the second-person ("I notice you have...", "You seem to enjoy...", "Your profile suggests...") instead of technical or robotic descriptions.

Detailed Requirements:
1. A detailed professional profile summary. Start with a warm opening like "Based on your responses, I see a strong alignment with..."
2. Use bullet points for key insights within the summary and reasoning sections.
3. Top 3 highly specific Career Matches (e.g., "Full-Stack Developer", "User Experience Researcher") with:
   - Match percentage
   - Detailed reasoning speaking DIRECTLY to the user.
   - Required skills for that role
   - Likely missing skills for someone with this profile
   - Realistic salary range in KES (Kenyan Shillings)
   - Job market outlook
4. A 4-step actionable learning path presented as direct advice to the user.

Return JSON data matching the schema:
{schema}

IMPORTANT: "top_careers" MUST be an array of OBJECTS as specified above. Do NOT return an array of strings."#,
        scores = render_scores(scores),
        schema = CAREER_ANALYSIS_SCHEMA,
    )
}

/// Builds the profile-based career-recommendation prompt.
pub fn profile_career_prompt(profile: &ProfileAttributes) -> String {
    let interests = if profile.interests.is_empty() {
        "N/A".to_string()
    } else {
        profile.interests.join(", ")
    };
    let skills = if profile.skills.is_empty() {
        "None listed".to_string()
    } else {
        profile.skills.join(", ")
    };
    format!(
        r#"Analyze the following user profile and recommend the top 3 career paths.

User Profile:
- Education: {education}
- Field of Study: {field}
- Interests: {interests}
- Bio: {bio}
- Self-Identified Skills: {skills}

Provide a comprehensive analysis including:
1. A brief summary of their professional profile, written in the second person ("You").
2. Analysis of their likely personality traits based on their bio and interests.
3. Top 3 Career Matches with detailed reasoning, required skills, and gap analysis.
4. A suggested high-level learning path to achieve these roles.

Return JSON data matching the schema:
{schema}

IMPORTANT: "top_careers" MUST be an array of OBJECTS as specified above. Do NOT return an array of strings."#,
        education = profile.education_level.as_deref().unwrap_or("N/A"),
        field = profile.field_of_study.as_deref().unwrap_or("N/A"),
        interests = interests,
        bio = profile.bio.as_deref().unwrap_or("N/A"),
        skills = skills,
        schema = CAREER_ANALYSIS_SCHEMA,
    )
}

/// Builds the detailed personality-analysis prompt.
pub fn personality_prompt(scores: &RiasecScores) -> String {
    format!(
        r#"Analyze the following RIASEC personality scores (Scale 1-5 per question, summed):
{scores}

Provide a comprehensive analysis, addressed directly to the user in the second person, including:
1. Their dominant Holland Code (e.g., RIA, ESC).
2. A description of their key personality traits.
3. Ideal work environments (e.g., "Structured and distinct" vs "Creative and open").
4. Top 3 broad career categories that fit this profile.
5. Strengths and potential blind spots.

Return JSON data matching this schema:
{{
  "holland_code": "string",
  "dominant_traits": ["string"],
  "work_environment": "string",
  "recommended_career_categories": ["string"],
  "strengths": ["string"],
  "blind_spots": ["string"],
  "summary_paragraph": "string"
}}"#,
        scores = render_scores(scores),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::riasec::RiasecCategory;

    fn sample_scores() -> RiasecScores {
        RiasecScores::from([
            (RiasecCategory::Realistic, 12),
            (RiasecCategory::Investigative, 18),
            (RiasecCategory::Artistic, 9),
        ])
    }

    #[test]
    fn test_riasec_prompt_is_deterministic() {
        assert_eq!(
            riasec_career_prompt(&sample_scores()),
            riasec_career_prompt(&sample_scores())
        );
    }

    #[test]
    fn test_riasec_prompt_embeds_scores_verbatim() {
        let prompt = riasec_career_prompt(&sample_scores());
        assert!(prompt.contains("realistic: 12"));
        assert!(prompt.contains("investigative: 18"));
        assert!(prompt.contains("artistic: 9"));
    }

    #[test]
    fn test_riasec_prompt_omits_absent_categories() {
        let prompt = riasec_career_prompt(&sample_scores());
        assert!(!prompt.contains("social:"));
        assert!(!prompt.contains("conventional:"));
    }

    #[test]
    fn test_scores_render_in_canonical_order() {
        let rendered = render_scores(&sample_scores());
        let realistic = rendered.find("realistic").unwrap();
        let investigative = rendered.find("investigative").unwrap();
        let artistic = rendered.find("artistic").unwrap();
        assert!(realistic < investigative && investigative < artistic);
    }

    #[test]
    fn test_riasec_prompt_describes_output_schema() {
        let prompt = riasec_career_prompt(&sample_scores());
        for field in [
            "user_profile_summary",
            "personality_analysis",
            "top_careers",
            "match_percentage",
            "salary_range",
            "suggested_learning_path",
        ] {
            assert!(prompt.contains(field), "schema field {field} missing");
        }
        assert!(prompt.contains("array of OBJECTS"));
    }

    #[test]
    fn test_riasec_prompt_requires_second_person_voice() {
        let prompt = riasec_career_prompt(&sample_scores());
        assert!(prompt.contains("second-person"));
    }

    #[test]
    fn test_profile_prompt_renders_attributes() {
        let profile = ProfileAttributes {
            education_level: Some("Undergraduate".to_string()),
            field_of_study: Some("Computer Science".to_string()),
            interests: vec!["robotics".to_string(), "music".to_string()],
            bio: None,
            skills: vec![],
        };
        let prompt = profile_career_prompt(&profile);
        assert!(prompt.contains("Education: Undergraduate"));
        assert!(prompt.contains("Field of Study: Computer Science"));
        assert!(prompt.contains("robotics, music"));
        assert!(prompt.contains("Bio: N/A"));
        assert!(prompt.contains("Self-Identified Skills: None listed"));
    }

    #[test]
    fn test_personality_prompt_describes_sibling_schema() {
        let prompt = personality_prompt(&sample_scores());
        for field in [
            "holland_code",
            "dominant_traits",
            "work_environment",
            "recommended_career_categories",
            "strengths",
            "blind_spots",
            "summary_paragraph",
        ] {
            assert!(prompt.contains(field), "schema field {field} missing");
        }
        assert!(prompt.contains("realistic: 12"));
    }
}
