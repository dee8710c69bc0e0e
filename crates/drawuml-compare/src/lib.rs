//! # drawuml-compare
//!
//! Харнесс семантического сравнения: два экстрактора (эталонный SVG
//! PlantUML и draw.io XML конвертера) проецируют оба артефакта в
//! нормализованную диаграмму; сопоставитель строит отчёт с
//! классификацией расхождений по серьёзности. Файловый ввод-вывод и
//! запуск внешних инструментов остаются за драйвером.

pub mod diff;
pub mod drawio;
pub mod matcher;
pub mod normalized;
pub mod svgref;

pub use diff::{Issue, Report, Score, Severity};
pub use normalized::NormalizedDiagram;

/// Семейство диаграммы для сравнения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Sequence,
    Class,
    Component,
    State,
    Timing,
}

/// Сравнивает draw.io результат с эталонным SVG и строит отчёт
pub fn compare(family: Family, reference_svg: &str, candidate_xml: &str) -> Report {
    let issues = match family {
        Family::Sequence => matcher::match_sequence(
            &svgref::extract_sequence(reference_svg),
            &drawio::extract_sequence(candidate_xml),
        ),
        Family::Class => matcher::match_class(
            &svgref::extract_class(reference_svg),
            &drawio::extract_class(candidate_xml),
        ),
        Family::Component => matcher::match_component(
            &svgref::extract_component(reference_svg),
            &drawio::extract_component(candidate_xml),
        ),
        Family::State => matcher::match_state(
            &svgref::extract_state(reference_svg),
            &drawio::extract_state(candidate_xml),
        ),
        Family::Timing => matcher::match_timing(
            &svgref::extract_timing(reference_svg),
            &drawio::extract_timing(candidate_xml),
        ),
    };
    Report::from_issues(issues)
}

/// Нормализует draw.io результат без эталона (для тестов и отладки)
pub fn normalize_candidate(family: Family, candidate_xml: &str) -> NormalizedDiagram {
    match family {
        Family::Sequence => NormalizedDiagram::Sequence(drawio::extract_sequence(candidate_xml)),
        Family::Class => NormalizedDiagram::Class(drawio::extract_class(candidate_xml)),
        Family::Component => {
            NormalizedDiagram::Component(drawio::extract_component(candidate_xml))
        }
        Family::State => NormalizedDiagram::State(drawio::extract_state(candidate_xml)),
        Family::Timing => NormalizedDiagram::Timing(drawio::extract_timing(candidate_xml)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_empty_inputs_pass() {
        let report = compare(Family::Sequence, "<svg></svg>", "<mxfile></mxfile>");
        assert_eq!(report.score, Score::Pass);
    }
}
