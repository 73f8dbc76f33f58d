use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchAlgorithm {
    /// Subsequence match rewarding tightly clustered characters.
    #[default]
    Gap,
    /// Skim's v2 scorer.
    Skim,
}

pub struct Matcher {
    algorithm: MatchAlgorithm,
    skim: SkimMatcherV2,
}

impl Matcher {
    pub fn new(algorithm: MatchAlgorithm) -> Self {
        Self {
            algorithm,
            skim: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Scores `candidate` against `query`. Zero means no match; any match is
    /// strictly positive.
    pub fn score(&self, query: &str, candidate: &str) -> f64 {
        match self.algorithm {
            MatchAlgorithm::Gap => score(query, candidate),
            MatchAlgorithm::Skim => {
                if query.is_empty() {
                    return 1.0;
                }
                match self.skim.fuzzy_match(candidate, query) {
                    Some(value) => value.max(0) as f64 + 1.0,
                    None => 0.0,
                }
            }
        }
    }
}

/// Case-insensitive subsequence score.
///
/// Starts at 1 and adds `1 / (index - previous_index)` for every matched query
/// character, so runs of adjacent characters are worth more than scattered ones.
/// Returns 0 when the query is not fully consumed.
pub fn score(query: &str, candidate: &str) -> f64 {
    let query: Vec<char> = query.to_lowercase().chars().collect();
    if query.is_empty() {
        return 1.0;
    }

    let mut total = 1.0;
    let mut consumed = 0usize;
    let mut previous: isize = -1;
    for (index, ch) in candidate.to_lowercase().chars().enumerate() {
        if consumed == query.len() {
            break;
        }
        if ch == query[consumed] {
            let index = index as isize;
            total += 1.0 / (index - previous) as f64;
            previous = index;
            consumed += 1;
        }
    }

    if consumed == query.len() { total } else { 0.0 }
}
