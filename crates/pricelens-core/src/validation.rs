use serde::{Deserialize, Serialize};

/// Minimum validator confidence for a record to count as valid.
pub const VALID_CONFIDENCE_THRESHOLD: u8 = 70;

/// Severity tier of a [`ValidationIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Confidence penalty subtracted for each issue of this severity.
    #[must_use]
    pub fn weight(self) -> u32 {
        match self {
            Severity::High => 25,
            Severity::Medium => 15,
            Severity::Low => 5,
        }
    }
}

/// Product field a validation issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductField {
    Title,
    Price,
    OriginalPrice,
    Seller,
    Rating,
    ReviewCount,
    Source,
    Images,
    Specifications,
}

impl ProductField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::Title => "title",
            ProductField::Price => "price",
            ProductField::OriginalPrice => "originalPrice",
            ProductField::Seller => "seller",
            ProductField::Rating => "rating",
            ProductField::ReviewCount => "reviewCount",
            ProductField::Source => "source",
            ProductField::Images => "images",
            ProductField::Specifications => "specifications",
        }
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured finding about one product field. Never raised as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub field: ProductField,
    pub severity: Severity,
    pub message: String,
    pub detected_value: String,
    pub expected_pattern: Option<String>,
}

impl ValidationIssue {
    #[must_use]
    pub fn new(
        field: ProductField,
        severity: Severity,
        message: impl Into<String>,
        detected_value: impl Into<String>,
    ) -> Self {
        Self {
            field,
            severity,
            message: message.into(),
            detected_value: detected_value.into(),
            expected_pattern: None,
        }
    }

    #[must_use]
    pub fn expecting(mut self, pattern: impl Into<String>) -> Self {
        self.expected_pattern = Some(pattern.into());
        self
    }
}

/// Outcome of validating one product record.
///
/// `confidence` is always `clamp(100 - Σ weight(issue), 0, 100)` and
/// `is_valid` is always `confidence >= 70`; build instances through
/// [`ValidationResult::from_issues`] to keep both in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub confidence: u8,
    pub issues: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn from_issues(issues: Vec<ValidationIssue>, suggestions: Vec<String>) -> Self {
        let confidence = confidence_for(&issues);
        Self {
            is_valid: is_valid_confidence(confidence),
            confidence,
            issues,
            suggestions,
        }
    }

    #[must_use]
    pub fn has_high_severity(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::High)
    }

    pub fn high_severity_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::High)
    }
}

/// Severity-weighted confidence for a set of issues.
#[must_use]
pub fn confidence_for(issues: &[ValidationIssue]) -> u8 {
    let penalty: u32 = issues.iter().map(|i| i.severity.weight()).sum();
    let remaining = 100u32.saturating_sub(penalty);
    // remaining is at most 100.
    u8::try_from(remaining).unwrap_or(100)
}

#[must_use]
pub fn is_valid_confidence(confidence: u8) -> bool {
    confidence >= VALID_CONFIDENCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity) -> ValidationIssue {
        ValidationIssue::new(ProductField::Price, severity, "test", "$0.00")
    }

    #[test]
    fn no_issues_is_full_confidence() {
        let result = ValidationResult::from_issues(vec![], vec![]);
        assert_eq!(result.confidence, 100);
        assert!(result.is_valid);
    }

    #[test]
    fn penalties_follow_severity_weights() {
        let result = ValidationResult::from_issues(
            vec![issue(Severity::High), issue(Severity::Medium), issue(Severity::Low)],
            vec![],
        );
        assert_eq!(result.confidence, 55);
        assert!(!result.is_valid);
    }

    #[test]
    fn confidence_clamps_at_zero() {
        let issues = vec![issue(Severity::High); 6];
        assert_eq!(confidence_for(&issues), 0);
    }

    #[test]
    fn validity_boundary_is_seventy() {
        assert!(!is_valid_confidence(69));
        assert!(is_valid_confidence(70));

        // 100 - 15 - 15 = 70
        let at_boundary = ValidationResult::from_issues(
            vec![issue(Severity::Medium), issue(Severity::Medium)],
            vec![],
        );
        assert_eq!(at_boundary.confidence, 70);
        assert!(at_boundary.is_valid);

        // 100 - 25 - 5 - 5 = 65
        let below = ValidationResult::from_issues(
            vec![issue(Severity::High), issue(Severity::Low), issue(Severity::Low)],
            vec![],
        );
        assert_eq!(below.confidence, 65);
        assert!(!below.is_valid);
    }

    #[test]
    fn issue_serializes_field_name() {
        let json = serde_json::to_value(issue(Severity::High).expecting("$N.NN")).unwrap();
        assert_eq!(json["field"], "price");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["expectedPattern"], "$N.NN");
        assert_eq!(json["detectedValue"], "$0.00");
    }
}
