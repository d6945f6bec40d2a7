//! Response Parsing Module
//!
//! Parses JSON responses from the AI into structured data types. Severity
//! and category strings from the wire are validated into the closed
//! enumerations; unknown values are an error rather than a silent default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ai::client::AiError;
use crate::models::TestStep;
use crate::quality::{aggregate_score, IssueCategory, QualityIssue, QualityReport, Severity};

/// Wire shape of the extraction result; also the on-disk shape of a steps
/// file fed to the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStepsResponse {
    pub test_steps: Vec<TestStep>,
}

/// Wire shape of one quality issue, before enum validation
#[derive(Debug, Clone, Deserialize)]
struct QualityIssueWire {
    pub category: String,
    pub severity: String,
    pub description: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub affected_requirements: Vec<String>,
}

/// Wire shape of the quality analysis result
#[derive(Debug, Clone, Deserialize)]
struct QualityResponseWire {
    #[serde(default)]
    pub issues: Vec<QualityIssueWire>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Extract JSON from a response that may contain markdown code blocks
fn extract_json(response: &str) -> &str {
    // Look for JSON in markdown code block
    if let Some(start) = response.find("```json") {
        let json_start = start + 7; // Skip "```json"
        if let Some(end) = response[json_start..].find("```") {
            return response[json_start..json_start + end].trim();
        }
    }

    // Look for generic code block
    if let Some(start) = response.find("```") {
        let code_start = start + 3;
        // Skip language identifier if present
        let json_start = if let Some(newline) = response[code_start..].find('\n') {
            code_start + newline + 1
        } else {
            code_start
        };
        if let Some(end) = response[json_start..].find("```") {
            return response[json_start..json_start + end].trim();
        }
    }

    // Try to find JSON object directly
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return &response[start..=end];
            }
        }
    }

    response.trim()
}

/// Parse the extraction response from the AI
pub fn parse_extraction_response(response: &str) -> Result<TestStepsResponse, AiError> {
    let json_str = extract_json(response);
    serde_json::from_str(json_str).map_err(|e| {
        AiError::InvalidResponse(format!(
            "Failed to parse extraction response: {}. JSON: {}",
            e,
            &json_str[..json_str.len().min(200)]
        ))
    })
}

/// Parse the quality response and aggregate the overall score
pub fn parse_quality_response(response: &str) -> Result<QualityReport, AiError> {
    let json_str = extract_json(response);
    let wire: QualityResponseWire = serde_json::from_str(json_str).map_err(|e| {
        AiError::InvalidResponse(format!(
            "Failed to parse quality response: {}. JSON: {}",
            e,
            &json_str[..json_str.len().min(200)]
        ))
    })?;

    let mut issues = Vec::with_capacity(wire.issues.len());
    for issue in wire.issues {
        let category = IssueCategory::parse(&issue.category).ok_or_else(|| {
            AiError::InvalidResponse(format!("Unknown issue category: {}", issue.category))
        })?;
        let severity = Severity::parse(&issue.severity).ok_or_else(|| {
            AiError::InvalidResponse(format!("Unknown issue severity: {}", issue.severity))
        })?;
        issues.push(QualityIssue {
            category,
            severity,
            description: issue.description,
            suggestion: issue.suggestion,
            affected_requirements: issue
                .affected_requirements
                .into_iter()
                .collect::<BTreeSet<_>>(),
        });
    }

    Ok(QualityReport {
        overall_score: aggregate_score(&issues),
        issues,
        strengths: wire.strengths,
        recommendations: wire.recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityBand;

    #[test]
    fn test_extract_json_from_markdown() {
        let response = r#"Here's my analysis:

```json
{
  "test_steps": []
}
```

That's my extraction."#;

        let json = extract_json(response);
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("test_steps"));
    }

    #[test]
    fn test_extract_json_direct() {
        let response = r#"{"test_steps": []}"#;
        let json = extract_json(response);
        assert_eq!(json, response);
    }

    #[test]
    fn test_parse_extraction_response() {
        let response = r#"```json
{
  "test_steps": [
    {
      "step_no": 1,
      "requirement_id": "REQ-001",
      "description": "Verify user login",
      "expected_result": "Dashboard is displayed"
    },
    {
      "step_no": 2,
      "requirement_id": "REQ-002",
      "description": "Verify password reset",
      "expected_result": "Reset email is sent"
    }
  ]
}
```"#;

        let result = parse_extraction_response(response).unwrap();
        assert_eq!(result.test_steps.len(), 2);
        assert_eq!(result.test_steps[0].requirement_id, "REQ-001");
        assert_eq!(result.test_steps[1].step_no, 2);
    }

    #[test]
    fn test_parse_extraction_empty_is_valid() {
        let result = parse_extraction_response(r#"{"test_steps": []}"#).unwrap();
        assert!(result.test_steps.is_empty());
    }

    #[test]
    fn test_parse_quality_response() {
        let response = r#"```json
{
  "issues": [
    {
      "category": "Ambiguous",
      "severity": "High",
      "description": "REQ-003 uses 'fast' without a measurable bound",
      "suggestion": "Specify a response-time limit",
      "affected_requirements": ["REQ-003"]
    },
    {
      "category": "Missing Acceptance",
      "severity": "Low",
      "description": "REQ-007 has no success criteria",
      "suggestion": "Add an acceptance criterion",
      "affected_requirements": ["REQ-007"]
    }
  ],
  "strengths": ["Consistent requirement numbering"],
  "recommendations": ["Quantify performance requirements"]
}
```"#;

        let report = parse_quality_response(response).unwrap();
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].category, IssueCategory::Ambiguous);
        assert_eq!(report.issues[0].severity, Severity::High);
        assert!(report.issues[0].affected_requirements.contains("REQ-003"));
        // 100 - 15 - 3 = 82
        assert_eq!(report.overall_score, 82);
        assert_eq!(report.band(), QualityBand::Fair);
        assert_eq!(report.strengths.len(), 1);
    }

    #[test]
    fn test_parse_quality_no_issues() {
        let report = parse_quality_response(r#"{"issues": []}"#).unwrap();
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.band(), QualityBand::Good);
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let response = r#"{
  "issues": [
    {
      "category": "Ambiguous",
      "severity": "Catastrophic",
      "description": "x",
      "suggestion": "y"
    }
  ]
}"#;
        assert!(matches!(
            parse_quality_response(response),
            Err(AiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let response = r#"{
  "issues": [
    {
      "category": "Stylistic",
      "severity": "Low",
      "description": "x",
      "suggestion": "y"
    }
  ]
}"#;
        assert!(matches!(
            parse_quality_response(response),
            Err(AiError::InvalidResponse(_))
        ));
    }
}
