//! Filtering and selection of scored items

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::document::{Importance, StudyItem};
use crate::store::ReviewRecord;

/// An item joined with its review record and score for one run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    pub item: StudyItem,
    pub record: ReviewRecord,
    pub score: f64,
}

/// How the final study set is drawn from the eligible items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// Highest scores first, ties in encounter order
    TopN,
    /// Uniform sample without replacement
    Random,
    /// 60% high / 30% medium / rest low, without replacement, topped up from any tier
    ImportanceSplit,
    /// Sample with replacement, weighted by score
    ScoreWeighted,
}

impl Default for SelectionMode {
    fn default() -> Self {
        Self::TopN
    }
}

/// Conjunctive eligibility filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    /// Exact primary chapter
    pub chapter: Option<String>,
    /// Exact importance (exam importance for terms)
    pub importance: Option<Importance>,
    /// Case-insensitive substring of any tag
    pub tag: Option<String>,
    /// Chapters of the next deadline; takes the place of `chapter` when set
    pub deadline_chapters: Vec<String>,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        self.chapter.is_none() && self.importance.is_none() && self.tag.is_none() && self.deadline_chapters.is_empty()
    }

    pub fn matches(&self, item: &StudyItem) -> bool {
        if !self.deadline_chapters.is_empty() {
            let in_deadline = item
                .effective_chapters()
                .iter()
                .any(|chapter| self.deadline_chapters.iter().any(|d| d.as_str() == *chapter));
            if !in_deadline {
                return false;
            }
        } else if let Some(chapter) = &self.chapter {
            if item.chapter.as_deref() != Some(chapter.as_str()) {
                return false;
            }
        }

        if let Some(importance) = self.importance {
            if item.importance != importance {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            let needle = tag.to_lowercase();
            if !item.tags.iter().any(|t| t.to_lowercase().contains(&needle)) {
                return false;
            }
        }

        true
    }
}

/// Draw the study set from `items` according to `mode`
pub fn select<R: Rng + ?Sized>(items: Vec<ScoredItem>, target: usize, mode: SelectionMode, rng: &mut R) -> Vec<ScoredItem> {
    match mode {
        SelectionMode::TopN => top_n(items, target),
        SelectionMode::Random => uniform_sample(items, target, rng),
        SelectionMode::ImportanceSplit => importance_split(items, target, rng),
        SelectionMode::ScoreWeighted => score_weighted(items, target, rng),
    }
}

/// Stable sort by descending score, then truncate
pub fn top_n(mut items: Vec<ScoredItem>, target: usize) -> Vec<ScoredItem> {
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
    items.truncate(target);
    items
}

/// Move the elements at `indices` out of `items`, in index order given
fn take_indices<T>(items: Vec<T>, indices: impl IntoIterator<Item = usize>) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    indices.into_iter().filter_map(|i| slots.get_mut(i).and_then(Option::take)).collect()
}

pub fn uniform_sample<R: Rng + ?Sized>(items: Vec<ScoredItem>, target: usize, rng: &mut R) -> Vec<ScoredItem> {
    let amount = target.min(items.len());
    let picked = index::sample(rng, items.len(), amount);
    take_indices(items, picked.into_iter())
}

/// `floor(value * n / 10)` without overflowing
fn tenths(value: usize, n: usize) -> usize {
    value / 10 * n + value % 10 * n / 10
}

/// Sample a proportional share of each importance tier without replacement
pub fn importance_split<R: Rng + ?Sized>(items: Vec<ScoredItem>, target: usize, rng: &mut R) -> Vec<ScoredItem> {
    let bucket = |importance: Importance| -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, s)| s.item.importance == importance)
            .map(|(i, _)| i)
            .collect()
    };
    let high = bucket(Importance::High);
    let medium = bucket(Importance::Medium);
    let low = bucket(Importance::Low);

    let target = target.min(items.len());
    let high_count = high.len().min(tenths(target, 6));
    let medium_count = medium.len().min(tenths(target, 3));
    let low_count = low.len().min(target.saturating_sub(high_count + medium_count));

    let mut picked: Vec<usize> = Vec::with_capacity(target);
    for (pool, count) in [(&high, high_count), (&medium, medium_count), (&low, low_count)] {
        picked.extend(index::sample(rng, pool.len(), count).into_iter().map(|i| pool[i]));
    }

    let remaining = target.saturating_sub(picked.len());
    if remaining > 0 {
        let unused: Vec<usize> = (0..items.len()).filter(|i| !picked.contains(i)).collect();
        let fill = remaining.min(unused.len());
        picked.extend(index::sample(rng, unused.len(), fill).into_iter().map(|i| unused[i]));
    }

    take_indices(items, picked)
}

/// Sample with replacement, weighted by score.
///
/// When no positive weight exists the draw falls back to a uniform sample
/// without replacement.
pub fn score_weighted<R: Rng + ?Sized>(items: Vec<ScoredItem>, target: usize, rng: &mut R) -> Vec<ScoredItem> {
    let amount = target.min(items.len());
    if amount == 0 {
        return Vec::new();
    }

    let total: f64 = items.iter().map(|s| s.score).sum();
    if total == 0.0 {
        log::debug!("All weights are zero, sampling uniformly");
        return uniform_sample(items, target, rng);
    }

    let dist = match WeightedIndex::new(items.iter().map(|s| s.score)) {
        Ok(dist) => dist,
        Err(e) => {
            log::warn!("Cannot weight by score ({}), sampling uniformly", e);
            return uniform_sample(items, target, rng);
        }
    };

    (0..amount).map(|_| items[dist.sample(rng)].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ItemId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn scored(name: &str, importance: Importance, score: f64) -> ScoredItem {
        let item = StudyItem::section(ItemId::new("notes.wiki", name), importance, "Topic".into(), PathBuf::from("notes.wiki"));
        ScoredItem {
            item,
            record: ReviewRecord::default(),
            score,
        }
    }

    fn names(items: &[ScoredItem]) -> Vec<&str> {
        items.iter().map(|s| s.item.name()).collect()
    }

    fn tiered(high: usize, medium: usize, low: usize) -> Vec<ScoredItem> {
        let mut items = Vec::new();
        for i in 0..high {
            items.push(scored(&format!("h{}", i), Importance::High, 10.0));
        }
        for i in 0..medium {
            items.push(scored(&format!("m{}", i), Importance::Medium, 5.0));
        }
        for i in 0..low {
            items.push(scored(&format!("l{}", i), Importance::Low, 2.0));
        }
        items
    }

    #[test]
    fn test_top_n_stable_ties() {
        let items = vec![
            scored("a", Importance::Low, 5.0),
            scored("b", Importance::High, 9.0),
            scored("c", Importance::Medium, 5.0),
            scored("d", Importance::Medium, 5.0),
            scored("e", Importance::Medium, 1.0),
        ];

        let top = top_n(items.clone(), 4);
        assert_eq!(names(&top), vec!["b", "a", "c", "d"]);

        // Same input, same output
        let again = top_n(items.clone(), 4);
        assert_eq!(names(&again), names(&top));

        assert_eq!(top_n(items, 50).len(), 5);
    }

    #[test]
    fn test_uniform_sample_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = uniform_sample(tiered(4, 4, 4), 5, &mut rng);
        assert_eq!(picked.len(), 5);
        let unique: HashSet<&str> = names(&picked).into_iter().collect();
        assert_eq!(unique.len(), 5);

        let all = uniform_sample(tiered(1, 1, 0), 5, &mut rng);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_importance_split_proportions() {
        let mut rng = StdRng::seed_from_u64(42);
        let picked = importance_split(tiered(10, 10, 10), 10, &mut rng);

        let count = |prefix: char| picked.iter().filter(|s| s.item.name().starts_with(prefix)).count();
        assert_eq!(picked.len(), 10);
        assert_eq!(count('h'), 6);
        assert_eq!(count('m'), 3);
        assert_eq!(count('l'), 1);
    }

    #[test]
    fn test_importance_split_tops_up_from_any_tier() {
        let mut rng = StdRng::seed_from_u64(3);
        // No high items: 3 medium + 7 low would be requested, only 2 low exist
        let picked = importance_split(tiered(0, 8, 2), 10, &mut rng);

        assert_eq!(picked.len(), 10);
        let unique: HashSet<&str> = names(&picked).into_iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_importance_split_never_exceeds_target_or_repeats() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for target in 0..12 {
                let picked = importance_split(tiered(3, 2, 4), target, &mut rng);
                assert!(picked.len() <= target);
                assert_eq!(picked.len(), target.min(9));
                let unique: HashSet<&str> = names(&picked).into_iter().collect();
                assert_eq!(unique.len(), picked.len());
            }
        }
    }

    #[test]
    fn test_importance_split_huge_target_returns_everything() {
        let mut rng = StdRng::seed_from_u64(9);
        let picked = importance_split(tiered(3, 0, 0), usize::MAX, &mut rng);
        assert_eq!(picked.len(), 3);

        let picked = importance_split(tiered(2, 2, 2), 1 << 40, &mut rng);
        assert_eq!(picked.len(), 6);

        for mode in [SelectionMode::TopN, SelectionMode::Random, SelectionMode::ScoreWeighted] {
            assert_eq!(select(tiered(1, 1, 1), usize::MAX, mode, &mut rng).len(), 3);
        }
    }

    #[test]
    fn test_tenths_matches_floor() {
        for value in 0..200 {
            assert_eq!(tenths(value, 6), value * 6 / 10);
            assert_eq!(tenths(value, 3), value * 3 / 10);
        }
        assert_eq!(tenths(usize::MAX, 6), usize::MAX / 10 * 6 + 3);
    }

    #[test]
    fn test_score_weighted_zero_weights_fall_back() {
        let mut rng = StdRng::seed_from_u64(11);
        let items: Vec<ScoredItem> = (0..6).map(|i| scored(&format!("z{}", i), Importance::Medium, 0.0)).collect();

        let picked = score_weighted(items, 4, &mut rng);
        assert_eq!(picked.len(), 4);
        let unique: HashSet<&str> = names(&picked).into_iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_score_weighted_with_replacement() {
        let mut rng = StdRng::seed_from_u64(5);
        let items = vec![
            scored("only", Importance::High, 12.5),
            scored("never", Importance::Low, 0.0),
            scored("nope", Importance::Low, 0.0),
        ];

        let picked = score_weighted(items, 3, &mut rng);
        assert_eq!(names(&picked), vec!["only", "only", "only"]);
    }

    #[test]
    fn test_select_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        for mode in [SelectionMode::TopN, SelectionMode::Random, SelectionMode::ImportanceSplit, SelectionMode::ScoreWeighted] {
            assert!(select(Vec::new(), 5, mode, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_filter_deadline_uses_secondary_chapters() {
        let mut item = StudyItem::term(ItemId::new("glossary.wiki", "Capsid"), "Shell".into(), "topics/capsid".into(), None);
        item.chapter = Some("7".into());
        item.all_chapters = vec!["7".into(), "13".into()];
        item.tags = vec!["Virology".into()];

        let deadline = ItemFilter {
            deadline_chapters: vec!["13".into()],
            // ignored while a deadline is active
            chapter: Some("99".into()),
            ..Default::default()
        };
        assert!(deadline.matches(&item));

        let chapter = ItemFilter {
            chapter: Some("13".into()),
            ..Default::default()
        };
        assert!(!chapter.matches(&item));

        let tag = ItemFilter {
            tag: Some("viro".into()),
            importance: Some(Importance::Medium),
            ..Default::default()
        };
        assert!(tag.matches(&item));

        let wrong_importance = ItemFilter {
            importance: Some(Importance::High),
            ..Default::default()
        };
        assert!(!wrong_importance.matches(&item));
    }
}
