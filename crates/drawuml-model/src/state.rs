//! Модель State Diagrams (диаграмм состояний).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::{Color, LineStyle, NotePosition};

/// Направление раскладки диаграммы состояний
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateDirection {
    #[default]
    TopToBottom,
    LeftToRight,
}

/// Диаграмма состояний
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDiagram {
    /// Заголовок диаграммы
    pub title: Option<String>,
    /// Состояния (код -> состояние) в порядке появления
    pub elements: IndexMap<String, StateElement>,
    /// Переходы
    pub transitions: Vec<Transition>,
    /// Заметки
    pub notes: Vec<StateNote>,
    /// Направление раскладки
    pub direction: StateDirection,
}

impl StateDiagram {
    /// Создаёт новую пустую диаграмму
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет состояние
    pub fn add_element(&mut self, element: StateElement) {
        self.elements.insert(element.code.clone(), element);
    }

    /// Регистрирует состояние по первой ссылке
    pub fn ensure_element(&mut self, code: &str) {
        if !self.elements.contains_key(code) {
            self.elements
                .insert(code.to_string(), StateElement::new(code, code));
        }
    }

    /// Добавляет переход
    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Состояния верхнего уровня (без родителя)
    pub fn top_level(&self) -> impl Iterator<Item = &StateElement> {
        self.elements.values().filter(|e| e.parent.is_none())
    }
}

/// Тип состояния
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateKind {
    #[default]
    State,
    Initial,
    Final,
    Choice,
    ForkJoin,
    SynchroBar,
    History,
    DeepHistory,
}

/// Состояние или псевдосостояние
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateElement {
    /// Стабильный код
    pub code: String,
    /// Отображаемое имя
    pub display_name: String,
    /// Тип
    pub kind: StateKind,
    /// Код родительского составного состояния
    pub parent: Option<String>,
    /// Коды вложенных состояний
    pub children: Vec<String>,
    /// Конкурентные регионы: разбиение children по разделителям `--`
    pub concurrent_regions: Vec<Vec<String>>,
    /// Строки описания (`State : text`)
    pub descriptions: Vec<String>,
    /// Стереотипы
    pub stereotypes: Vec<String>,
    /// Стиль рамки
    pub line_style: Option<LineStyle>,
    /// Цвет фона
    pub color: Option<Color>,
}

impl StateElement {
    /// Создаёт обычное состояние
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            kind: StateKind::State,
            parent: None,
            children: Vec::new(),
            concurrent_regions: Vec::new(),
            descriptions: Vec::new(),
            stereotypes: Vec::new(),
            line_style: None,
            color: None,
        }
    }

    /// Создаёт псевдосостояние
    pub fn pseudo(code: impl Into<String>, kind: StateKind) -> Self {
        let code = code.into();
        let mut el = Self::new(code.clone(), code);
        el.kind = kind;
        el
    }

    /// Составное состояние (имеет вложенные)
    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Переход между состояниями
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// Код источника
    pub from: String,
    /// Код приёмника
    pub to: String,
    /// Подпись (событие [/ действие])
    pub label: Option<String>,
    /// Стиль линии (из символов тела `.`/`=`/`~`)
    pub line_style: LineStyle,
    /// Цвет линии
    pub color: Option<Color>,
    /// Крест на начале (`x-->`)
    pub cross_start: bool,
    /// Кружок на конце (`-->o`)
    pub circle_end: bool,
}

impl Transition {
    /// Создаёт переход
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
            line_style: LineStyle::Solid,
            color: None,
            cross_start: false,
            circle_end: false,
        }
    }
}

/// Заметка диаграммы состояний
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateNote {
    /// Позиция относительно якоря
    pub position: NotePosition,
    /// Текст
    pub text: String,
    /// Код состояния-якоря
    pub entity_code: Option<String>,
    /// Заметка на связи
    pub is_on_link: bool,
    /// Индекс перехода
    pub link_index: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_state() {
        let initial = StateElement::pseudo("__initial_0", StateKind::Initial);
        assert_eq!(initial.kind, StateKind::Initial);
        assert!(!initial.is_composite());
    }

    #[test]
    fn test_top_level_filter() {
        let mut d = StateDiagram::new();
        d.add_element(StateElement::new("Outer", "Outer"));
        let mut inner = StateElement::new("Inner", "Inner");
        inner.parent = Some("Outer".into());
        d.add_element(inner);
        d.elements.get_mut("Outer").unwrap().children.push("Inner".into());
        assert_eq!(d.top_level().count(), 1);
        assert!(d.elements["Outer"].is_composite());
    }
}
