//! Agreement rules for worker consensus
//!
//! A rule decides whether the top-ranked answer has enough worker support
//! to be returned without consulting the judge.

/// Rule for determining worker agreement
///
/// - `AtLeast(n)`: at least n workers gave the same answer (default: 2)
/// - `Majority`: more than half of the worker roster agreed
/// - `Unanimous`: every worker agreed
/// - `Percentage(p)`: at least p% of the worker roster agreed
///
/// The denominator is always the full worker roster size, not the number of
/// workers that happened to answer.
///
/// # Example
///
/// ```
/// use ensemble_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::default();
/// assert!(rule.is_satisfied(2, 3));
/// assert!(!rule.is_satisfied(1, 3));
///
/// let strict = QuorumRule::Unanimous;
/// assert!(strict.is_satisfied(3, 3));
/// assert!(!strict.is_satisfied(2, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumRule {
    /// At least n workers must agree
    AtLeast(usize),

    /// More than half must agree
    Majority,

    /// All workers must agree
    Unanimous,

    /// At least this percentage must agree (0-100)
    Percentage(u8),
}

impl Default for QuorumRule {
    fn default() -> Self {
        QuorumRule::AtLeast(2)
    }
}

impl QuorumRule {
    /// Check if `agreeing` workers out of a roster of `total` satisfy the rule
    pub fn is_satisfied(&self, agreeing: usize, total: usize) -> bool {
        if total == 0 || agreeing == 0 {
            return false;
        }
        agreeing >= self.min_agreement_needed(total)
    }

    /// Minimum number of agreeing workers needed for a roster of `total`
    pub fn min_agreement_needed(&self, total: usize) -> usize {
        match self {
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::AtLeast(n) => format!("at least {} agreeing workers", n),
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all workers agree)".to_string(),
            QuorumRule::Percentage(p) => format!("at least {}% agreement", p),
        }
    }

    /// Canonical configuration string, parseable by `FromStr`
    pub fn as_config_str(&self) -> String {
        match self {
            QuorumRule::AtLeast(n) => format!("atleast:{}", n),
            QuorumRule::Majority => "majority".to_string(),
            QuorumRule::Unanimous => "unanimous".to_string(),
            QuorumRule::Percentage(p) => format!("{}%", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                if n == 0 {
                    return Err("atleast requires a positive number".to_string());
                }
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                if p > 100 {
                    return Err(format!("Percentage out of range: {}", p));
                }
                Ok(QuorumRule::Percentage(p))
            }
            other => Err(format!(
                "Unknown agreement rule: {}. Valid: atleast:N, majority, unanimous, percentage:N or N%",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_two_agreeing_workers() {
        let rule = QuorumRule::default();
        assert_eq!(rule, QuorumRule::AtLeast(2));
        assert!(!rule.is_satisfied(1, 3));
        assert!(rule.is_satisfied(2, 3));
        assert!(rule.is_satisfied(2, 5));
    }

    #[test]
    fn test_majority_rule() {
        let rule = QuorumRule::Majority;

        // 5 workers: need 3
        assert!(!rule.is_satisfied(2, 5));
        assert!(rule.is_satisfied(3, 5));

        // 4 workers: need 3
        assert!(!rule.is_satisfied(2, 4));
        assert!(rule.is_satisfied(3, 4));
    }

    #[test]
    fn test_unanimous_rule() {
        let rule = QuorumRule::Unanimous;
        assert!(!rule.is_satisfied(2, 3));
        assert!(rule.is_satisfied(3, 3));
    }

    #[test]
    fn test_percentage_rule() {
        let rule = QuorumRule::Percentage(75);

        // 5 workers: ceil(3.75) = 4
        assert!(!rule.is_satisfied(3, 5));
        assert!(rule.is_satisfied(4, 5));
    }

    #[test]
    fn test_zero_counts() {
        assert!(!QuorumRule::AtLeast(1).is_satisfied(0, 3));
        assert!(!QuorumRule::Majority.is_satisfied(0, 0));
        assert!(!QuorumRule::Percentage(0).is_satisfied(0, 3));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!("majority".parse::<QuorumRule>().ok(), Some(QuorumRule::Majority));
        assert_eq!("Unanimous".parse::<QuorumRule>().ok(), Some(QuorumRule::Unanimous));
        assert_eq!("atleast:3".parse::<QuorumRule>().ok(), Some(QuorumRule::AtLeast(3)));
        assert_eq!("at_least:2".parse::<QuorumRule>().ok(), Some(QuorumRule::AtLeast(2)));
        assert_eq!("percentage:60".parse::<QuorumRule>().ok(), Some(QuorumRule::Percentage(60)));
        assert_eq!("80%".parse::<QuorumRule>().ok(), Some(QuorumRule::Percentage(80)));
        assert!("atleast:0".parse::<QuorumRule>().is_err());
        assert!("150%".parse::<QuorumRule>().is_err());
        assert!("plurality".parse::<QuorumRule>().is_err());
    }

    #[test]
    fn test_config_str_parses_back() {
        for rule in [
            QuorumRule::AtLeast(2),
            QuorumRule::Majority,
            QuorumRule::Unanimous,
            QuorumRule::Percentage(66),
        ] {
            assert_eq!(rule.as_config_str().parse::<QuorumRule>().ok(), Some(rule));
        }
    }
}
