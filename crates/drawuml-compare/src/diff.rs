//! Классификация расхождений и отчёт сравнения.

use serde::{Deserialize, Serialize};

/// Серьёзность расхождения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Семантика потеряна или искажена
    Blocking,
    /// Семантика на месте, заметное визуальное расхождение
    Important,
    /// Мелочь
    Cosmetic,
}

/// Одно расхождение
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    /// Короткая категория (missing_participant, arrow_mismatch, ...)
    pub category: String,
    /// Человекочитаемое описание
    pub message: String,
}

impl Issue {
    /// Создаёт расхождение
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
        }
    }

    pub fn blocking(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Blocking, category, message)
    }

    pub fn important(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Important, category, message)
    }

    pub fn cosmetic(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Cosmetic, category, message)
    }
}

/// Итоговая оценка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    Pass,
    NeedsWork,
    Fail,
}

impl Score {
    /// Код завершения процесса для драйвера харнесса
    pub fn exit_code(&self) -> i32 {
        match self {
            Score::Pass => 0,
            Score::Fail => 2,
            Score::NeedsWork => 3,
        }
    }
}

/// Отчёт сравнения одной диаграммы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub blocking: Vec<Issue>,
    pub important: Vec<Issue>,
    pub cosmetic: Vec<Issue>,
    pub summary: String,
    pub score: Score,
}

impl Report {
    /// Собирает отчёт из списка расхождений
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let mut blocking = Vec::new();
        let mut important = Vec::new();
        let mut cosmetic = Vec::new();
        for issue in issues {
            match issue.severity {
                Severity::Blocking => blocking.push(issue),
                Severity::Important => important.push(issue),
                Severity::Cosmetic => cosmetic.push(issue),
            }
        }
        let score = if !blocking.is_empty() {
            Score::Fail
        } else if !important.is_empty() {
            Score::NeedsWork
        } else {
            Score::Pass
        };
        let summary = format!(
            "blocking: {}, important: {}, cosmetic: {}",
            blocking.len(),
            important.len(),
            cosmetic.len()
        );
        Self {
            blocking,
            important,
            cosmetic,
            summary,
            score,
        }
    }

    /// Сериализует отчёт в JSON (артефакт `<name>-report.json`)
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_rules() {
        let report = Report::from_issues(vec![]);
        assert_eq!(report.score, Score::Pass);
        assert_eq!(report.score.exit_code(), 0);

        let report = Report::from_issues(vec![Issue::important("x", "y")]);
        assert_eq!(report.score, Score::NeedsWork);
        assert_eq!(report.score.exit_code(), 3);

        let report = Report::from_issues(vec![
            Issue::important("x", "y"),
            Issue::blocking("z", "w"),
        ]);
        assert_eq!(report.score, Score::Fail);
        assert_eq!(report.score.exit_code(), 2);
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::from_issues(vec![Issue::cosmetic("extra_divider", "лишний разделитель")]);
        let json = report.to_json();
        assert!(json.contains("\"score\": \"pass\""));
        assert!(json.contains("extra_divider"));
    }
}
