use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::QuestionResult;
use crate::sanitize::{mean, percentage};

pub const STRENGTH_THRESHOLD: f64 = 80.0;
pub const IMPROVEMENT_THRESHOLD: f64 = 50.0;
pub const MAX_FEEDBACK_TAGS: usize = 3;
pub const FAST_ANSWER_SECONDS: f64 = 30.0;
pub const SLOW_ANSWER_SECONDS: f64 = 120.0;
/// Answers at or under this many seconds keep full efficiency weight.
pub const EFFICIENT_SECONDS: f64 = 60.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub score: f64,
    pub max_score: f64,
    pub average_score: f64,
    pub average_time: f64,
    #[serde(skip)]
    time_total: f64,
}

impl Breakdown {
    fn add(&mut self, result: &QuestionResult) {
        self.total += 1;
        if result.is_correct {
            self.correct += 1;
        }
        self.score += result.score;
        self.max_score += result.max_score;
        self.time_total += result.time_spent;
    }

    fn finish(&mut self) {
        let n = self.total as f64;
        self.accuracy = percentage(self.correct as f64, n);
        self.average_score = if self.total == 0 { 0.0 } else { self.score / n };
        self.average_time = if self.total == 0 { 0.0 } else { self.time_total / n };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAnalysis {
    pub total_time: f64,
    pub mean: f64,
    pub median: f64,
    pub fastest: f64,
    pub slowest: f64,
    pub std_dev: f64,
    pub under_30_seconds: usize,
    pub over_120_seconds: usize,
    /// 0-100; rewards answers that are both correct and quick.
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyEntry {
    pub question_index: usize,
    pub case_id: String,
    pub score_percent: f64,
    pub complexity: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAnalysis {
    pub hardest: Vec<DifficultyEntry>,
    pub easiest: Vec<DifficultyEntry>,
    pub average_score_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_questions: usize,
    pub answered: usize,
    pub skipped: usize,
    pub unanswered: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub total_score: f64,
    pub max_possible_score: f64,
    pub percentage_score: f64,
    pub by_category: BTreeMap<String, Breakdown>,
    pub by_complexity: BTreeMap<String, Breakdown>,
    pub by_age_group: BTreeMap<String, Breakdown>,
    pub time_analysis: Option<TimeAnalysis>,
    pub difficulty_analysis: Option<DifficultyAnalysis>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
    /// Seconds spent on each correct answer, in answer order.
    pub correct_times: Vec<f64>,
}

impl SessionStats {
    pub fn empty() -> Self {
        Self {
            total_questions: 0,
            answered: 0,
            skipped: 0,
            unanswered: 0,
            correct_answers: 0,
            accuracy: 0.0,
            total_score: 0.0,
            max_possible_score: 0.0,
            percentage_score: 0.0,
            by_category: BTreeMap::new(),
            by_complexity: BTreeMap::new(),
            by_age_group: BTreeMap::new(),
            time_analysis: None,
            difficulty_analysis: None,
            strengths: Vec::new(),
            improvements: Vec::new(),
            recommendations: Vec::new(),
            correct_times: Vec::new(),
        }
    }
}

/// Aggregates results over a session of `total_questions`; questions without
/// a result count as zero.
pub fn compute_stats(results: &[QuestionResult], total_questions: usize, max_score: f64) -> SessionStats {
    let mut stats = SessionStats::empty();
    stats.total_questions = total_questions;
    stats.answered = results.iter().filter(|r| r.answer.is_some()).count();
    stats.skipped = results.len() - stats.answered;
    stats.unanswered = total_questions.saturating_sub(results.len());
    stats.correct_answers = results.iter().filter(|r| r.is_correct).count();
    stats.accuracy = percentage(stats.correct_answers as f64, total_questions as f64);
    stats.total_score = results.iter().map(|r| r.score).sum();
    stats.max_possible_score = total_questions as f64 * max_score;
    stats.percentage_score = percentage(stats.total_score, stats.max_possible_score);
    stats.correct_times = results
        .iter()
        .filter(|r| r.is_correct)
        .map(|r| r.time_spent)
        .collect();

    for result in results {
        stats
            .by_category
            .entry(result.category.clone())
            .or_default()
            .add(result);
        stats
            .by_complexity
            .entry(result.complexity.as_str().to_string())
            .or_default()
            .add(result);
        stats
            .by_age_group
            .entry(result.age_group.as_str().to_string())
            .or_default()
            .add(result);
    }
    for breakdown in stats
        .by_category
        .values_mut()
        .chain(stats.by_complexity.values_mut())
        .chain(stats.by_age_group.values_mut())
    {
        breakdown.finish();
    }

    stats.time_analysis = time_analysis(results);
    stats.difficulty_analysis = difficulty_analysis(results);
    stats.strengths = tag_categories(&stats.by_category, |acc| acc >= STRENGTH_THRESHOLD, true);
    stats.improvements = tag_categories(&stats.by_category, |acc| acc < IMPROVEMENT_THRESHOLD, false);
    stats.recommendations = recommendations(&stats);
    stats
}

/// Pace metrics over answered questions only; timeouts carry no answer to
/// time, so a session without answers has no analysis at all.
fn time_analysis(results: &[QuestionResult]) -> Option<TimeAnalysis> {
    let answered: Vec<&QuestionResult> = results.iter().filter(|r| r.answer.is_some()).collect();
    let times: Vec<f64> = answered.iter().map(|r| r.time_spent).collect();
    let mean_time = mean(&times)?;

    let mut sorted = times.clone();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    let variance = times.iter().map(|t| (t - mean_time).powi(2)).sum::<f64>() / times.len() as f64;

    let weights: Vec<f64> = answered
        .iter()
        .map(|r| {
            let quality = if r.max_score > 0.0 {
                (r.score / r.max_score).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let pace = (EFFICIENT_SECONDS / r.time_spent.max(EFFICIENT_SECONDS)).min(1.0);
            quality * pace
        })
        .collect();

    Some(TimeAnalysis {
        total_time: times.iter().sum(),
        mean: mean_time,
        median,
        fastest: sorted[0],
        slowest: sorted[sorted.len() - 1],
        std_dev: variance.sqrt(),
        under_30_seconds: times.iter().filter(|&&t| t < FAST_ANSWER_SECONDS).count(),
        over_120_seconds: times.iter().filter(|&&t| t > SLOW_ANSWER_SECONDS).count(),
        efficiency: mean(&weights)? * 100.0,
    })
}

fn difficulty_analysis(results: &[QuestionResult]) -> Option<DifficultyAnalysis> {
    if results.is_empty() {
        return None;
    }
    let mut entries: Vec<DifficultyEntry> = results
        .iter()
        .map(|r| DifficultyEntry {
            question_index: r.question_index,
            case_id: r.case_id.clone(),
            score_percent: percentage(r.score, r.max_score),
            complexity: r.complexity.as_str().to_string(),
            category: r.category.clone(),
        })
        .collect();
    let average = entries.iter().map(|e| e.score_percent).sum::<f64>() / entries.len() as f64;

    entries.sort_by(|a, b| {
        a.score_percent
            .total_cmp(&b.score_percent)
            .then(a.question_index.cmp(&b.question_index))
    });
    let hardest: Vec<DifficultyEntry> = entries.iter().take(3).cloned().collect();

    entries.sort_by(|a, b| {
        b.score_percent
            .total_cmp(&a.score_percent)
            .then(a.question_index.cmp(&b.question_index))
    });
    let easiest: Vec<DifficultyEntry> = entries.into_iter().take(3).collect();

    Some(DifficultyAnalysis {
        hardest,
        easiest,
        average_score_percent: average,
    })
}

fn tag_categories(
    by_category: &BTreeMap<String, Breakdown>,
    qualifies: impl Fn(f64) -> bool,
    best_first: bool,
) -> Vec<String> {
    let mut tagged: Vec<(&String, f64)> = by_category
        .iter()
        .filter(|(_, b)| b.total > 0 && qualifies(b.accuracy))
        .map(|(name, b)| (name, b.accuracy))
        .collect();
    tagged.sort_by(|a, b| {
        let order = if best_first {
            b.1.total_cmp(&a.1)
        } else {
            a.1.total_cmp(&b.1)
        };
        order.then_with(|| a.0.cmp(b.0))
    });
    tagged
        .into_iter()
        .take(MAX_FEEDBACK_TAGS)
        .map(|(name, _)| name.clone())
        .collect()
}

fn recommendations(stats: &SessionStats) -> Vec<String> {
    let mut out = Vec::new();
    if stats.total_questions == 0 {
        return out;
    }

    if stats.percentage_score >= 90.0 {
        out.push("Excellent work. Try a harder difficulty tier to keep improving.".to_string());
    } else if stats.percentage_score < 60.0 {
        out.push("Review the diagnostic criteria for the conditions you missed before the next quiz.".to_string());
    }

    for category in &stats.improvements {
        out.push(format!("Focus on {category}: accuracy was below {IMPROVEMENT_THRESHOLD:.0}%."));
    }

    if let Some(time) = &stats.time_analysis {
        if time.mean > SLOW_ANSWER_SECONDS {
            out.push("Work on recognizing key features faster; average time exceeded two minutes.".to_string());
        } else if time.under_30_seconds * 2 > stats.answered.max(1) && stats.accuracy < 60.0 {
            out.push("Slow down and read each case fully; many quick answers were incorrect.".to_string());
        }
    }

    if stats.unanswered + stats.skipped > 0 {
        out.push(format!(
            "{} question(s) were not answered; attempt every case for full credit.",
            stats.unanswered + stats.skipped
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AgeGroup, Complexity};

    fn result(idx: usize, category: &str, correct: bool, time: f64) -> QuestionResult {
        QuestionResult {
            question_index: idx,
            case_id: format!("c{idx}"),
            answer: Some("x".to_string()),
            correct_diagnosis: "X".to_string(),
            is_correct: correct,
            score: if correct { 1.0 } else { 0.0 },
            max_score: 1.0,
            time_spent: time,
            category: category.to_string(),
            age_group: AgeGroup::Adult,
            complexity: Complexity::Basic,
            feedback: String::new(),
            rationale: None,
        }
    }

    #[test]
    fn test_empty_session() {
        let stats = compute_stats(&[], 0, 1.0);
        assert_eq!(stats.percentage_score, 0.0);
        assert_eq!(stats.accuracy, 0.0);
        assert!(stats.time_analysis.is_none());
        assert!(stats.difficulty_analysis.is_none());
    }

    #[test]
    fn test_timeouts_only_have_no_time_analysis() {
        let mut results = vec![result(0, "A", false, 40.0), result(1, "A", false, 40.0)];
        for r in &mut results {
            r.answer = None;
        }
        let stats = compute_stats(&results, 2, 1.0);
        assert_eq!(stats.answered, 0);
        assert_eq!(stats.skipped, 2);
        assert!(stats.time_analysis.is_none());
    }

    #[test]
    fn test_time_analysis_ignores_timeouts() {
        let mut results = vec![result(0, "A", true, 20.0), result(1, "A", false, 300.0)];
        results[1].answer = None;
        let time = compute_stats(&results, 2, 1.0).time_analysis.unwrap();
        assert_eq!(time.total_time, 20.0);
        assert_eq!(time.slowest, 20.0);
        assert!((time.efficiency - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unanswered_count_as_zero() {
        let results = vec![result(0, "A", true, 10.0)];
        let stats = compute_stats(&results, 4, 1.0);
        assert_eq!(stats.unanswered, 3);
        assert!((stats.percentage_score - 25.0).abs() < 1e-9);
        assert_eq!(stats.max_possible_score, 4.0);
    }

    #[test]
    fn test_time_analysis() {
        let results = vec![
            result(0, "A", true, 10.0),
            result(1, "A", true, 20.0),
            result(2, "A", false, 150.0),
            result(3, "A", true, 120.0),
        ];
        let time = compute_stats(&results, 4, 1.0).time_analysis.unwrap();
        assert!((time.mean - 75.0).abs() < 1e-9);
        assert!((time.median - 70.0).abs() < 1e-9);
        assert_eq!(time.fastest, 10.0);
        assert_eq!(time.slowest, 150.0);
        assert_eq!(time.under_30_seconds, 2);
        assert_eq!(time.over_120_seconds, 1);
        // (1 + 1 + 0 + 0.5) / 4
        assert!((time.efficiency - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_strengths_and_improvements() {
        let mut results = Vec::new();
        for i in 0..5 {
            results.push(result(i, "Mood", true, 10.0));
        }
        for i in 5..9 {
            results.push(result(i, "Anxiety", i == 5, 10.0));
        }
        results.push(result(9, "Psychosis", true, 10.0));
        let stats = compute_stats(&results, 10, 1.0);
        assert_eq!(stats.strengths, vec!["Mood", "Psychosis"]);
        assert_eq!(stats.improvements, vec!["Anxiety"]);
        assert_eq!(stats.by_category["Anxiety"].correct, 1);
        assert!((stats.by_category["Anxiety"].accuracy - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_feedback_tags_capped_at_three() {
        let results: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, c)| result(i, c, true, 10.0))
            .collect();
        let stats = compute_stats(&results, 4, 1.0);
        assert_eq!(stats.strengths, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_difficulty_analysis_order() {
        let mut results = vec![
            result(0, "A", true, 10.0),
            result(1, "A", false, 10.0),
            result(2, "A", true, 10.0),
        ];
        results[2].score = 0.5;
        let analysis = compute_stats(&results, 3, 1.0).difficulty_analysis.unwrap();
        assert_eq!(analysis.hardest[0].question_index, 1);
        assert_eq!(analysis.easiest[0].question_index, 0);
        assert!((analysis.average_score_percent - 50.0).abs() < 1e-9);
    }
}
