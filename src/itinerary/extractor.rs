//! Pattern-based extraction of place names from itinerary text
//!
//! The extractor walks the itinerary line by line, carrying the current day
//! (taken from "Day N" markers) and applying an ordered list of
//! [`ExtractionRule`]s to every line. It never fails: malformed markers are
//! ignored and lines without matches contribute nothing.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use crate::models::LocationCandidate;

/// Letters of any script and whitespace, starting with a letter. Apostrophes and
/// hyphens only join letters, so a " - " separator ends the name.
const PHRASE: &str = r"\p{L}(?:[\p{L}\s]|['’-]\p{L})+";

static DAY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)day\s+([0-9]+)").expect("day marker regex"));

static DEFAULT_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    [
        (
            "visit",
            format!(r"(?i)visit\s+({PHRASE}(?:museum|tower|cathedral|palace|park|square|bridge))"),
        ),
        ("lunch", format!(r"(?i)lunch\s+at\s+({PHRASE})")),
        ("dinner", format!(r"(?i)dinner\s+at\s+({PHRASE})")),
        (
            "stay",
            format!(r"(?i)stay\s+at\s+((?:hotel|inn|resort)\b(?:[\p{{L}}\s]|['’-]\p{{L}})*|{PHRASE}(?:hotel|inn|resort))"),
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| ExtractionRule::new(name, &pattern).expect("built-in extraction rule"))
    .collect()
});

/// A named lexical pattern whose first capture group is the place name
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    name: String,
    pattern: Regex,
}

impl ExtractionRule {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed, non-empty captures in match order
    fn names_in<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern
            .captures_iter(line)
            .filter_map(|captures| captures.get(1))
            .map(|capture| capture.as_str().trim())
            .filter(|name| !name.is_empty())
    }
}

/// Turns itinerary text into an ordered list of [`LocationCandidate`]s
#[derive(Debug, Clone)]
pub struct LocationExtractor {
    rules: Vec<ExtractionRule>,
}

impl Default for LocationExtractor {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl LocationExtractor {
    /// Extractor with a custom rule list, applied in the given order
    #[must_use]
    pub fn with_rules(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Candidates in line order, then rule order, then match order
    #[must_use]
    pub fn extract(&self, itinerary: &str) -> Vec<LocationCandidate> {
        let (_, candidates) = itinerary.lines().fold(
            (1_u32, Vec::new()),
            |(current_day, mut candidates), line| {
                let day = parse_day_marker(line).unwrap_or(current_day);
                for rule in &self.rules {
                    for name in rule.names_in(line) {
                        trace!(rule = rule.name(), day, name, "candidate");
                        candidates.push(LocationCandidate {
                            name: name.to_string(),
                            source_line: line.to_string(),
                            day_number: day,
                        });
                    }
                }
                (day, candidates)
            },
        );
        candidates
    }
}

/// Day number announced on this line, if any.
///
/// Markers without a usable number ("Day banana", "Day 0", overflow) yield `None`.
#[must_use]
pub fn parse_day_marker(line: &str) -> Option<u32> {
    if !line.to_lowercase().contains("day ") {
        return None;
    }
    DAY_MARKER
        .captures(line)
        .and_then(|captures| captures[1].parse::<u32>().ok())
        .filter(|day| *day >= 1)
}

/// Extract candidates with the built-in rules
#[must_use]
pub fn extract_candidates(itinerary: &str) -> Vec<LocationCandidate> {
    LocationExtractor::default().extract(itinerary)
}
