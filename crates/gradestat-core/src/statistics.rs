//! Cohort statistics: the trimmed "top 95%" average and threshold bands.
//!
//! All rates are percentages (0–100). A group of size zero has every figure
//! defined as 0 rather than raising a division error.

use serde::{Deserialize, Serialize};

use crate::model::{ClassId, StudentRecord, Subject, SubjectConfig, SubjectMap};

/// Share of a group (by count) included in the trimmed average.
pub const TRIMMED_SHARE: f64 = 0.95;

/// Fraction of the maximum score at or above which a score is excellent.
pub const EXCELLENT_RATIO: f64 = 0.8;

/// Fraction of the maximum score at or above which a score passes.
pub const PASS_RATIO: f64 = 0.6;

/// Fraction of the maximum score below which a score fails.
pub const FAIL_RATIO: f64 = 0.4;

/// Number of top scores averaged for a group of `n` students.
///
/// `max(1, round(n × 0.95))`, rounding halves to even; zero for an empty
/// group.
pub fn trimmed_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    ((n as f64 * TRIMMED_SHARE).round_ties_even() as usize).max(1)
}

/// Mean of the [`trimmed_count`] highest scores. Ties are irrelevant since
/// selection is by value only.
pub fn trimmed_average(scores: &[f64]) -> f64 {
    let k = trimmed_count(scores.len());
    if k == 0 {
        return 0.0;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_unstable_by(|a, b| b.total_cmp(a));
    sorted[..k].iter().sum::<f64>() / k as f64
}

/// `count / group_size × 100`, or 0 for an empty group.
pub fn rate(count: usize, group_size: usize) -> f64 {
    if group_size == 0 {
        0.0
    } else {
        count as f64 / group_size as f64 * 100.0
    }
}

/// Score cutoffs derived from one subject's maximum score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub excellent: f64,
    pub pass: f64,
    pub fail: f64,
}

impl Thresholds {
    pub fn for_max_score(max_score: f64) -> Self {
        Self {
            excellent: max_score * EXCELLENT_RATIO,
            pass: max_score * PASS_RATIO,
            fail: max_score * FAIL_RATIO,
        }
    }

    pub fn is_excellent(&self, score: f64) -> bool {
        score >= self.excellent
    }

    pub fn is_pass(&self, score: f64) -> bool {
        score >= self.pass
    }

    /// Strictly below 40% of the maximum; not the complement of a pass.
    pub fn is_fail(&self, score: f64) -> bool {
        score < self.fail
    }
}

/// Count and rate of one classification band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandStats {
    pub count: usize,
    /// Percentage of the group.
    pub rate: f64,
}

impl BandStats {
    fn new(count: usize, group_size: usize) -> Self {
        Self {
            count,
            rate: rate(count, group_size),
        }
    }
}

/// Statistics for one subject within one group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubjectStats {
    pub trimmed_average: f64,
    /// How many top scores the average covers.
    pub averaged_count: usize,
    pub excellent: BandStats,
    pub pass: BandStats,
    pub fail: BandStats,
}

impl SubjectStats {
    pub fn compute(scores: &[f64], max_score: f64) -> Self {
        let thresholds = Thresholds::for_max_score(max_score);
        let n = scores.len();
        let count = |pred: fn(&Thresholds, f64) -> bool| {
            scores.iter().filter(|&&s| pred(&thresholds, s)).count()
        };
        Self {
            trimmed_average: trimmed_average(scores),
            averaged_count: trimmed_count(n),
            excellent: BandStats::new(count(Thresholds::is_excellent), n),
            pass: BandStats::new(count(Thresholds::is_pass), n),
            fail: BandStats::new(count(Thresholds::is_fail), n),
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.trimmed_average,
            self.excellent.rate,
            self.pass.rate,
            self.fail.rate,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Which students a row of statistics covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "class", rename_all = "lowercase")]
pub enum GroupScope {
    /// Every student in the table.
    Grade,
    Class(ClassId),
}

impl GroupScope {
    pub fn label(&self) -> &str {
        match self {
            GroupScope::Grade => "Whole grade",
            GroupScope::Class(id) => id.as_str(),
        }
    }
}

/// Statistics for one group: the grade or a single class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortStats {
    pub scope: GroupScope,
    pub student_count: usize,
    /// Percentage of the grade in this group; `None` for the grade row.
    pub share: Option<f64>,
    pub subjects: SubjectMap<SubjectStats>,
}

impl CohortStats {
    /// Compute every subject's statistics for `students`.
    pub fn compute(
        scope: GroupScope,
        students: &[&StudentRecord],
        cohort_size: usize,
        config: &SubjectConfig,
    ) -> Self {
        let share = match scope {
            GroupScope::Grade => None,
            GroupScope::Class(_) => Some(rate(students.len(), cohort_size)),
        };
        let subjects = SubjectMap::from_fn(|subject: Subject| {
            let scores: Vec<f64> = students.iter().map(|s| s.scores[subject]).collect();
            SubjectStats::compute(&scores, config.max_score(subject))
        });
        Self {
            scope,
            student_count: students.len(),
            share,
            subjects,
        }
    }

    pub fn label(&self) -> &str {
        self.scope.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_count_follows_rounding_rule() {
        assert_eq!(trimmed_count(0), 0);
        assert_eq!(trimmed_count(1), 1);
        assert_eq!(trimmed_count(2), 2);
        assert_eq!(trimmed_count(10), 10); // 9.5 rounds to even
        assert_eq!(trimmed_count(20), 19);
        assert_eq!(trimmed_count(30), 28); // 28.5 rounds to even
        assert_eq!(trimmed_count(40), 38);
        assert_eq!(trimmed_count(45), 43); // 42.75
        // 95% in exact integer arithmetic, halves to even.
        for n in 1..500usize {
            let (q, r) = (n * 95 / 100, n * 95 % 100);
            let rounded = match r {
                0..=49 => q,
                50 => q + q % 2,
                _ => q + 1,
            };
            assert_eq!(trimmed_count(n), rounded.max(1), "n = {n}");
        }
    }

    #[test]
    fn trimmed_average_is_mean_of_largest_scores() {
        for n in [1usize, 7, 10, 19, 30, 101] {
            // 1..=n in a scrambled order; 37 is coprime with each n.
            let scores: Vec<f64> = (0..n).map(|i| ((i * 37) % n + 1) as f64).collect();
            let k = trimmed_count(n);
            let top_sum: usize = (n - k + 1..=n).sum();
            let expected = top_sum as f64 / k as f64;
            assert!(
                (trimmed_average(&scores) - expected).abs() < 1e-9,
                "n = {n}"
            );
        }
    }

    #[test]
    fn trimmed_average_drops_lowest_scores() {
        let mut scores: Vec<f64> = (1..=20).map(|v| v as f64 * 5.0).collect();
        scores.reverse();
        // 19 of 20 kept: the single 5.0 is dropped.
        let expected = (2..=20).map(|v| v as f64 * 5.0).sum::<f64>() / 19.0;
        assert!((trimmed_average(&scores) - expected).abs() < 1e-9);
    }

    #[test]
    fn trimmed_average_of_empty_group_is_zero() {
        assert_eq!(trimmed_average(&[]), 0.0);
    }

    #[test]
    fn trimmed_average_single_student() {
        assert_eq!(trimmed_average(&[42.0]), 42.0);
    }

    #[test]
    fn bands_are_independent() {
        let t = Thresholds::for_max_score(100.0);
        assert!(t.is_excellent(80.0) && t.is_pass(80.0) && !t.is_fail(80.0));
        assert!(!t.is_excellent(79.9) && t.is_pass(60.0));
        assert!(!t.is_pass(59.9) && !t.is_fail(59.9));
        assert!(!t.is_fail(40.0));
        assert!(t.is_fail(39.9));
    }

    #[test]
    fn band_implications_hold_for_any_score() {
        for max in [50.0, 100.0, 120.0, 150.0] {
            let t = Thresholds::for_max_score(max);
            for step in 0..=300 {
                let s = step as f64 * 0.5;
                if t.is_excellent(s) {
                    assert!(s >= 0.8 * max);
                    assert!(t.is_pass(s));
                }
                if t.is_pass(s) {
                    assert!(s >= 0.6 * max);
                    assert!(!t.is_fail(s));
                }
                if t.is_fail(s) {
                    assert!(s < 0.4 * max);
                }
            }
        }
    }

    #[test]
    fn fail_is_not_complement_of_pass() {
        let stats = SubjectStats::compute(&[50.0, 50.0, 90.0, 10.0], 100.0);
        assert_eq!(stats.pass.count, 1);
        assert_eq!(stats.fail.count, 1);
        assert_ne!(stats.fail.count, 4 - stats.pass.count);
    }

    #[test]
    fn two_student_scenario() {
        let stats = SubjectStats::compute(&[100.0, 0.0], 100.0);
        assert_eq!(stats.averaged_count, 2);
        assert_eq!(stats.trimmed_average, 50.0);
        assert_eq!(stats.excellent, BandStats { count: 1, rate: 50.0 });
        assert_eq!(stats.pass, BandStats { count: 1, rate: 50.0 });
        assert_eq!(stats.fail, BandStats { count: 1, rate: 50.0 });
    }

    #[test]
    fn empty_group_rates_are_zero() {
        let stats = SubjectStats::compute(&[], 100.0);
        assert_eq!(stats, SubjectStats::default());
        assert_eq!(rate(3, 0), 0.0);
    }

    #[test]
    fn custom_max_score_shifts_thresholds() {
        let stats = SubjectStats::compute(&[96.0, 72.0, 47.0], 120.0);
        assert_eq!(stats.excellent.count, 1);
        assert_eq!(stats.pass.count, 2);
        assert_eq!(stats.fail.count, 1);
    }

    #[test]
    fn class_share_is_fraction_of_cohort() {
        let record = StudentRecord::new(None, SubjectMap::splat(70.0));
        let students = vec![&record; 3];
        let class = ClassId::new("1").unwrap();
        let stats = CohortStats::compute(
            GroupScope::Class(class),
            &students,
            8,
            &SubjectConfig::default(),
        );
        assert_eq!(stats.share, Some(37.5));
        assert_eq!(stats.student_count, 3);
        assert_eq!(stats.subjects[Subject::Math].pass.count, 3);

        let grade = CohortStats::compute(GroupScope::Grade, &students, 3, &SubjectConfig::default());
        assert_eq!(grade.share, None);
        assert_eq!(grade.label(), "Whole grade");
    }
}
