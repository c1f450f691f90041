use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::stats::Breakdown;
use super::SessionReport;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => Err(EngineError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn export_report(report: &SessionReport, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ExportFormat::Csv => Ok(to_csv(report)),
        ExportFormat::Text => Ok(to_text(report)),
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_csv(report: &SessionReport) -> String {
    let mut out = String::new();
    out.push_str(
        "question,case_id,answer,correct_diagnosis,is_correct,score,max_score,time_spent,\
         category,age_group,complexity,feedback\n",
    );
    for r in &report.results {
        let row = [
            (r.question_index + 1).to_string(),
            csv_field(&r.case_id),
            csv_field(r.answer.as_deref().unwrap_or("")),
            csv_field(&r.correct_diagnosis),
            r.is_correct.to_string(),
            format!("{:.2}", r.score),
            format!("{:.2}", r.max_score),
            format!("{:.1}", r.time_spent),
            csv_field(&r.category),
            r.age_group.as_str().to_string(),
            r.complexity.as_str().to_string(),
            csv_field(&r.feedback),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    let stats = &report.stats;
    out.push('\n');
    out.push_str("metric,value\n");
    let _ = writeln!(out, "session_id,{}", report.session_id);
    let _ = writeln!(out, "policy,{}", report.policy);
    let _ = writeln!(out, "total_questions,{}", stats.total_questions);
    let _ = writeln!(out, "correct_answers,{}", stats.correct_answers);
    let _ = writeln!(out, "accuracy,{:.1}", stats.accuracy);
    let _ = writeln!(out, "total_score,{:.2}", stats.total_score);
    let _ = writeln!(out, "max_possible_score,{:.2}", stats.max_possible_score);
    let _ = writeln!(out, "percentage_score,{:.1}", stats.percentage_score);
    if let Some(time) = &stats.time_analysis {
        let _ = writeln!(out, "mean_time,{:.1}", time.mean);
        let _ = writeln!(out, "median_time,{:.1}", time.median);
        let _ = writeln!(out, "time_efficiency,{:.1}", time.efficiency);
    }
    if let Some(progression) = &report.progression {
        let _ = writeln!(out, "xp_awarded,{}", progression.total_xp_awarded);
        let _ = writeln!(out, "level,{}", progression.level_after);
    }
    out
}

fn breakdown_section(out: &mut String, title: &str, rows: &BTreeMap<String, Breakdown>) {
    if rows.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
    for (name, b) in rows {
        let _ = writeln!(
            out,
            "  {name}: {}/{} correct ({:.1}%), avg score {:.2}, avg time {:.1}s",
            b.correct, b.total, b.accuracy, b.average_score, b.average_time
        );
    }
}

fn list_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
    for item in items {
        let _ = writeln!(out, "  * {item}");
    }
}

fn to_text(report: &SessionReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();
    let _ = writeln!(out, "DIAGNOSTIC QUIZ REPORT");
    let _ = writeln!(out, "======================");
    let _ = writeln!(out, "Session:  {}", report.session_id);
    let _ = writeln!(out, "Policy:   {}", report.policy);
    let _ = writeln!(out, "Finished: {}", report.completed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(
        out,
        "Score:    {:.2} / {:.2} ({:.1}%)",
        stats.total_score, stats.max_possible_score, stats.percentage_score
    );
    let _ = writeln!(
        out,
        "Correct:  {} / {} ({:.1}%)",
        stats.correct_answers, stats.total_questions, stats.accuracy
    );
    if let Some(time) = &stats.time_analysis {
        let _ = writeln!(
            out,
            "Time:     mean {:.1}s, median {:.1}s, fastest {:.1}s, slowest {:.1}s, efficiency {:.0}/100",
            time.mean, time.median, time.fastest, time.slowest, time.efficiency
        );
    }

    breakdown_section(&mut out, "Category Performance", &stats.by_category);
    breakdown_section(&mut out, "Complexity Performance", &stats.by_complexity);
    breakdown_section(&mut out, "Age Group Performance", &stats.by_age_group);
    list_section(&mut out, "Strengths", &stats.strengths);
    list_section(&mut out, "Areas for Improvement", &stats.improvements);
    list_section(&mut out, "Recommendations", &stats.recommendations);

    if let Some(progression) = &report.progression {
        let _ = writeln!(out, "\nProgression");
        let _ = writeln!(out, "-----------");
        let _ = writeln!(
            out,
            "  XP earned: {} (total {})",
            progression.total_xp_awarded, progression.experience
        );
        let _ = writeln!(
            out,
            "  Level: {} -> {}",
            progression.level_before, progression.level_after
        );
        let _ = writeln!(
            out,
            "  Streak: {} (x{:.2})",
            progression.streak, progression.multiplier
        );
        for achievement in &progression.new_achievements {
            let _ = writeln!(
                out,
                "  Achievement unlocked: {} (+{} XP)",
                achievement.name, achievement.xp_reward
            );
        }
        let _ = writeln!(out, "  Recommended tier: {}", progression.recommended_tier);
    }

    let _ = writeln!(out, "\nQuestion Details");
    let _ = writeln!(out, "----------------");
    for r in &report.results {
        let mark = if r.is_correct { "correct" } else { "incorrect" };
        let _ = writeln!(
            out,
            "  Q{} [{mark}] {}: {} (expected {}), {:.2}/{:.2} in {:.1}s",
            r.question_index + 1,
            r.case_id,
            r.answer.as_deref().unwrap_or("(no answer)"),
            r.correct_diagnosis,
            r.score,
            r.max_score,
            r.time_spent
        );
        let _ = writeln!(out, "      {}", r.feedback);
        if let Some(rationale) = &r.rationale {
            let _ = writeln!(out, "      scoring: {rationale}");
        }
    }
    out
}
