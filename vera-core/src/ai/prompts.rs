//! Prompt Templates for AI Operations
//!
//! Builds the structured prompts for requirement extraction and quality
//! analysis. Both demand JSON-only output so the response parser stays
//! simple.

/// URS text beyond this many characters is truncated to fit model limits
const URS_EXCERPT_LIMIT: usize = 8000;

fn urs_excerpt(document_text: &str) -> &str {
    match document_text.char_indices().nth(URS_EXCERPT_LIMIT) {
        Some((byte_index, _)) => &document_text[..byte_index],
        None => document_text,
    }
}

/// Build the prompt that turns a URS document into test steps
pub fn build_extraction_prompt(document_text: &str) -> String {
    let mut prompt = String::from(
        r#"You are an expert in software validation for pharmaceutical and medical device industries.
Parse the URS document and extract all individual requirements.
Generate a detailed test script for each requirement in valid JSON format only.

Output structure:
{
  "test_steps": [
    {
      "step_no": 1,
      "requirement_id": "REQ-001",
      "description": "Requirement description",
      "expected_result": "Expected outcome"
    }
  ]
}

Rules:
- Each requirement becomes one test step
- Maintain order of requirements
- Treat sub-parts (1.1, 1.2) as separate steps
- Use clear, professional language for FDA/GxP compliance
- Output valid JSON only, no markdown or commentary

URS Text:
"#,
    );
    prompt.push_str(urs_excerpt(document_text));
    prompt.push_str("\n\nGenerate the JSON output with test_steps array now:");
    prompt
}

/// Build the prompt for the requirement quality analysis
pub fn build_quality_prompt(document_text: &str) -> String {
    let mut prompt = String::from(
        r#"You are a validation expert analyzing User Requirements Specifications (URS) for quality issues.

Analyze the following URS text and identify:

1. **Ambiguous Requirements**: Requirements with unclear or vague language
2. **Non-Testable Requirements**: Requirements that cannot be objectively tested
3. **Missing Acceptance Criteria**: Requirements without clear success criteria
4. **Conflicting Requirements**: Requirements that contradict each other
5. **Incomplete Requirements**: Requirements missing essential details

For each issue found, provide:
- Issue category
- Description of the problem
- Severity (High/Medium/Low)
- Suggested improvement
- Affected requirement IDs where identifiable

Output MUST be valid JSON only, no markdown or commentary.

Output format:
{
  "issues": [
    {
      "category": "Ambiguous|Non-Testable|Missing Acceptance|Conflicting|Incomplete",
      "severity": "High|Medium|Low",
      "description": "what's wrong",
      "suggestion": "how to improve",
      "affected_requirements": ["REQ-001"]
    }
  ],
  "strengths": ["list of good aspects"],
  "recommendations": ["list of overall recommendations"]
}

URS Text:
"#,
    );
    prompt.push_str(urs_excerpt(document_text));
    prompt.push_str("\n\nGenerate the JSON quality report now:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_contains_urs() {
        let prompt = build_extraction_prompt("REQ-001 The system shall log users in.");
        assert!(prompt.contains("test_steps"));
        assert!(prompt.contains("REQ-001 The system shall log users in."));
    }

    #[test]
    fn test_quality_prompt_lists_categories() {
        let prompt = build_quality_prompt("some urs");
        for category in [
            "Ambiguous",
            "Non-Testable",
            "Missing Acceptance",
            "Conflicting",
            "Incomplete",
        ] {
            assert!(prompt.contains(category), "missing category {}", category);
        }
    }

    #[test]
    fn test_long_urs_is_truncated() {
        let long_text = "x".repeat(20_000);
        let prompt = build_extraction_prompt(&long_text);
        assert!(prompt.len() < 12_000);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // Multi-byte characters near the cut must not split
        let long_text = "\u{00e9}".repeat(10_000);
        let prompt = build_quality_prompt(&long_text);
        assert!(prompt.contains('\u{00e9}'));
    }
}
