//! Vote tally
//!
//! Groups votes by exact normalized answer and ranks the groups.

use super::vote::Vote;
use serde::Serialize;

/// One distinct answer and the workers that gave it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    /// Normalized answer string (e.g. `"A, C"`, `"true"`)
    pub answer: String,
    /// Number of workers that gave this answer
    pub count: usize,
    /// Sum of effective confidences
    pub total_confidence: u32,
    /// Supporting workers, in roster order
    pub supporting_providers: Vec<String>,
    #[serde(skip)]
    first_index: usize,
}

impl TallyEntry {
    /// Average confidence, rounded to the nearest integer
    pub fn average_confidence(&self) -> u8 {
        if self.count == 0 {
            return 0;
        }
        let count = self.count as u32;
        ((self.total_confidence + count / 2) / count).min(100) as u8
    }
}

/// Tally of one resolution round's votes, ranked
///
/// Ranking: count descending, then average confidence descending, then the
/// roster position of the first supporting worker. Given the same votes the
/// ranking is always the same regardless of arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    entries: Vec<TallyEntry>,
}

impl VoteTally {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let mut ordered: Vec<&Vote> = votes.iter().filter(|v| !v.answer.is_empty()).collect();
        ordered.sort_by_key(|v| v.roster_index);

        let mut entries: Vec<TallyEntry> = Vec::new();
        for vote in ordered {
            let key = vote.normalized();
            match entries.iter_mut().find(|e| e.answer == key) {
                Some(entry) => {
                    entry.count += 1;
                    entry.total_confidence += u32::from(vote.confidence());
                    entry.supporting_providers.push(vote.model.to_string());
                }
                None => entries.push(TallyEntry {
                    answer: key,
                    count: 1,
                    total_confidence: u32::from(vote.confidence()),
                    supporting_providers: vec![vote.model.to_string()],
                    first_index: vote.roster_index,
                }),
            }
        }

        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.average_confidence().cmp(&a.average_confidence()))
                .then_with(|| a.first_index.cmp(&b.first_index))
        });

        Self { entries }
    }

    /// Entries in rank order
    pub fn ranked(&self) -> &[TallyEntry] {
        &self.entries
    }

    /// Top-ranked entry, if any vote was cast
    pub fn leader(&self) -> Option<&TallyEntry> {
        self.entries.first()
    }

    /// Number of distinct answers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of counted votes
    pub fn vote_count(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Compact summary for logs (e.g. `A x2 (85%), B x1 (70%)`)
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} x{} ({}%)", e.answer, e.count, e.average_confidence()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::ParsedAnswer;
    use crate::core::model::Model;

    fn vote(model: &str, index: usize, letters: &[char], confidence: u8) -> Vote {
        Vote::new(
            Model::from(model),
            index,
            ParsedAnswer::letters(letters.iter().copied(), confidence),
        )
    }

    #[test]
    fn test_tally_counts_and_averages() {
        let tally = VoteTally::from_votes(&[
            vote("w1", 0, &['A'], 90),
            vote("w2", 1, &['A'], 80),
            vote("w3", 2, &['B'], 70),
        ]);

        let leader = tally.leader().unwrap();
        assert_eq!(leader.answer, "A");
        assert_eq!(leader.count, 2);
        assert_eq!(leader.total_confidence, 170);
        assert_eq!(leader.average_confidence(), 85);
        assert_eq!(leader.supporting_providers, vec!["w1", "w2"]);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.vote_count(), 3);
    }

    #[test]
    fn test_ties_break_on_average_confidence() {
        let tally = VoteTally::from_votes(&[
            vote("w1", 0, &['A'], 60),
            vote("w2", 1, &['B'], 95),
            vote("w3", 2, &['C'], 70),
        ]);
        let order: Vec<_> = tally.ranked().iter().map(|e| e.answer.as_str()).collect();
        assert_eq!(order, ["B", "C", "A"]);
    }

    #[test]
    fn test_full_tie_breaks_on_roster_order() {
        let tally = VoteTally::from_votes(&[
            vote("w3", 2, &['C'], 70),
            vote("w1", 0, &['A'], 70),
            vote("w2", 1, &['B'], 70),
        ]);
        assert_eq!(tally.leader().unwrap().answer, "A");
    }

    #[test]
    fn test_arrival_order_does_not_matter() {
        let votes = vec![
            vote("w1", 0, &['A'], 90),
            vote("w2", 1, &['B'], 80),
            vote("w3", 2, &['A'], 70),
        ];
        let mut reversed = votes.clone();
        reversed.reverse();
        assert_eq!(VoteTally::from_votes(&votes), VoteTally::from_votes(&reversed));
        assert_eq!(
            VoteTally::from_votes(&reversed).leader().unwrap().supporting_providers,
            vec!["w1", "w3"]
        );
    }

    #[test]
    fn test_multi_letter_answers_match_exactly() {
        let tally = VoteTally::from_votes(&[
            vote("w1", 0, &['C', 'A'], 80),
            vote("w2", 1, &['A', 'C'], 60),
            vote("w3", 2, &['A'], 90),
        ]);
        let leader = tally.leader().unwrap();
        assert_eq!(leader.answer, "A, C");
        assert_eq!(leader.count, 2);
        assert_eq!(leader.average_confidence(), 70);
    }

    #[test]
    fn test_empty_answers_are_not_counted() {
        let tally = VoteTally::from_votes(&[Vote::new(Model::from("w1"), 0, ParsedAnswer::empty())]);
        assert!(tally.is_empty());
        assert!(tally.leader().is_none());
        assert_eq!(tally.summary(), "");
    }

    #[test]
    fn test_summary() {
        let tally = VoteTally::from_votes(&[
            vote("w1", 0, &['A'], 90),
            vote("w2", 1, &['A'], 80),
            vote("w3", 2, &['B'], 70),
        ]);
        assert_eq!(tally.summary(), "A x2 (85%), B x1 (70%)");
    }
}
