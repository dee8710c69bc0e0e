//! # drawuml-model
//!
//! Промежуточные модели PlantUML диаграмм — строго типизированное
//! представление семантики, независимое от синтаксиса и от целевого
//! XML. Каждое семейство диаграмм имеет свой модуль; общие типы
//! (цвет, стиль линии, декораторы связей) — в `common`.
//!
//! Перекрёстные ссылки между сущностями хранятся как строковые коды
//! в упорядоченных словарях (`IndexMap`), а не как указатели: модель
//! ациклична, тривиально сериализуема и сохраняет порядок появления.

pub mod class;
pub mod common;
pub mod component;
pub mod sequence;
pub mod state;
pub mod timing;

pub use common::{code_from_name, Color, DirectionHint, LineStyle, LinkDecor, NotePosition};

use serde::{Deserialize, Serialize};

/// Диаграмма любого поддерживаемого семейства
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Diagram {
    Sequence(sequence::SequenceDiagram),
    Class(class::ClassDiagram),
    Component(component::ComponentDiagram),
    Deployment(component::ComponentDiagram),
    UseCase(component::ComponentDiagram),
    State(state::StateDiagram),
    Timing(timing::TimingDiagram),
}

impl Diagram {
    /// Человекочитаемое имя семейства
    pub fn family(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Class(_) => "class",
            Self::Component(_) => "component",
            Self::Deployment(_) => "deployment",
            Self::UseCase(_) => "usecase",
            Self::State(_) => "state",
            Self::Timing(_) => "timing",
        }
    }

    /// Заголовок диаграммы, если есть
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Sequence(d) => d.title.as_deref(),
            Self::Class(d) => d.title.as_deref(),
            Self::Component(d) | Self::Deployment(d) | Self::UseCase(d) => d.title.as_deref(),
            Self::State(d) => d.title.as_deref(),
            Self::Timing(d) => d.title.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_names() {
        let d = Diagram::Sequence(sequence::SequenceDiagram::new());
        assert_eq!(d.family(), "sequence");
        let d = Diagram::UseCase(component::ComponentDiagram::new());
        assert_eq!(d.family(), "usecase");
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut seq = sequence::SequenceDiagram::new();
        seq.title = Some("Тест".into());
        seq.ensure_participant("Alice");
        let json = serde_json::to_string(&Diagram::Sequence(seq)).unwrap();
        let back: Diagram = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title(), Some("Тест"));
    }
}
