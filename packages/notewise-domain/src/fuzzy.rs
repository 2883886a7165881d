use std::cmp::Ordering;

/// Scores how far a query is from a candidate key.
pub trait SimilarityScorer
where
	Self: Send + Sync,
{
	/// Normalized distance in `[0, 1]`. `0.0` means the query occurs verbatim in the key, and the
	/// value grows with edit distance.
	fn distance(&self, query: &str, key: &str) -> f32;
}

/// Approximate substring matching: the fewest character edits needed to make the query appear
/// anywhere in the key, divided by the query length. Case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringLevenshtein;
impl SimilarityScorer for SubstringLevenshtein {
	fn distance(&self, query: &str, key: &str) -> f32 {
		let query: Vec<char> = query.to_lowercase().chars().collect();

		if query.is_empty() {
			return 0.0;
		}

		let key: Vec<char> = key.to_lowercase().chars().collect();
		let edits = substring_edit_distance(&query, &key);

		(edits as f32 / query.len() as f32).min(1.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyHit {
	/// Position of the candidate in the indexed key list.
	pub index: usize,
	pub distance: f32,
}

/// Composite keys ranked against a query by a [`SimilarityScorer`].
pub struct FuzzyIndex<'a> {
	scorer: &'a dyn SimilarityScorer,
	keys: Vec<String>,
	max_distance: f32,
}
impl<'a> FuzzyIndex<'a> {
	pub fn new(scorer: &'a dyn SimilarityScorer, keys: Vec<String>, max_distance: f32) -> Self {
		Self { scorer, keys, max_distance }
	}

	/// Hits within `max_distance`, closest first. Equal distances keep index order.
	pub fn search(&self, query: &str, limit: usize) -> Vec<FuzzyHit> {
		let mut hits: Vec<FuzzyHit> = self
			.keys
			.iter()
			.enumerate()
			.map(|(index, key)| FuzzyHit { index, distance: self.scorer.distance(query, key) })
			.filter(|hit| hit.distance <= self.max_distance)
			.collect();

		hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
		hits.truncate(limit);

		hits
	}
}

/// Edit distance between `pattern` and its best-matching substring of `text`.
pub fn substring_edit_distance(pattern: &[char], text: &[char]) -> usize {
	let m = pattern.len();
	let mut prev: Vec<usize> = (0..=m).collect();
	let mut cur = vec![0; m + 1];
	let mut best = m;

	for &ch in text {
		cur[0] = 0;

		for i in 1..=m {
			let substitution = prev[i - 1] + usize::from(pattern[i - 1] != ch);

			cur[i] = substitution.min(prev[i] + 1).min(cur[i - 1] + 1);
		}

		best = best.min(cur[m]);

		std::mem::swap(&mut prev, &mut cur);
	}

	best
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chars(value: &str) -> Vec<char> {
		value.chars().collect()
	}

	#[test]
	fn substring_costs_nothing() {
		assert_eq!(substring_edit_distance(&chars("sleep"), &chars("poor sleep lately")), 0);
		assert_eq!(SubstringLevenshtein.distance("SLEEP", "Poor sleep lately"), 0.0);
	}

	#[test]
	fn typos_cost_one_edit_each() {
		assert_eq!(substring_edit_distance(&chars("slep"), &chars("poor sleep lately")), 1);
		assert_eq!(substring_edit_distance(&chars("sleeep"), &chars("poor sleep lately")), 1);
		assert_eq!(substring_edit_distance(&chars("abc"), &chars("")), 3);
	}

	#[test]
	fn distance_grows_with_edits() {
		let scorer = SubstringLevenshtein;
		let exact = scorer.distance("anxiety", "social anxiety at work");
		let one_typo = scorer.distance("anxeity", "social anxiety at work");
		let unrelated = scorer.distance("anxiety", "garden");

		assert!(exact < one_typo);
		assert!(one_typo < unrelated);
		assert!(unrelated <= 1.0);
	}

	#[test]
	fn index_ranks_closest_first_and_applies_threshold() {
		let keys = vec![
			"we talked about gardening".to_string(),
			"my anxeity spiked".to_string(),
			"anxiety about work".to_string(),
		];
		let index = FuzzyIndex::new(&SubstringLevenshtein, keys, 0.3);
		let hits = index.search("anxiety", 10);
		let order: Vec<usize> = hits.iter().map(|hit| hit.index).collect();

		assert_eq!(order, vec![2, 1]);
		assert_eq!(hits[0].distance, 0.0);
	}

	#[test]
	fn index_respects_limit_and_keeps_ties_stable() {
		let keys = vec!["work".to_string(), "work stress".to_string(), "workload".to_string()];
		let index = FuzzyIndex::new(&SubstringLevenshtein, keys, 1.0);
		let hits = index.search("work", 2);

		assert_eq!(hits.iter().map(|hit| hit.index).collect::<Vec<_>>(), vec![0, 1]);
	}
}
