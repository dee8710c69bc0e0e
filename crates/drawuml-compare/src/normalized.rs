//! Нормализованные диаграммы — минимальное семантическое содержимое
//! для сравнения, общее для обоих экстракторов.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Нормализованная диаграмма любого семейства
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NormalizedDiagram {
    Sequence(NormalizedSequence),
    Class(NormalizedClass),
    Component(NormalizedComponent),
    State(NormalizedState),
    Timing(NormalizedTiming),
}

/// Нормализованная sequence диаграмма
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedSequence {
    /// Участники в порядке слева направо: (имя, индекс типа)
    pub participants: Vec<NormalizedParticipant>,
    /// Сообщения в порядке сверху вниз
    pub messages: Vec<NormalizedMessage>,
    /// Количество полос активации по участникам
    pub activations: IndexMap<String, usize>,
    /// Типы фрагментов в порядке появления
    pub fragments: Vec<String>,
    /// Тексты заметок
    pub notes: Vec<String>,
    /// Тексты разделителей
    pub dividers: Vec<String>,
}

/// Участник: имя и индекс типа (0 participant, 1 actor, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedParticipant {
    pub name: String,
    pub kind_index: usize,
}

/// Сообщение
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub from: String,
    pub to: String,
    pub label: String,
    pub dashed: bool,
    /// Вид наконечника: block/open/oval/cross/none
    pub arrow: String,
}

/// Нормализованная class диаграмма
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedClass {
    /// Сущности: (имя, вид, число членов)
    pub entities: Vec<NormalizedEntity>,
    /// Связи
    pub relationships: Vec<NormalizedRelation>,
    /// Имена пакетов
    pub packages: Vec<String>,
    /// Тексты заметок
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEntity {
    pub name: String,
    /// class/interface/enum/... (пустая строка если неизвестен)
    pub kind: String,
    pub member_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRelation {
    pub from: String,
    pub to: String,
    /// extension/composition/aggregation/association/dependency
    pub kind: String,
    pub label: String,
}

/// Нормализованная component/use-case диаграмма
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedComponent {
    /// Элементы: (имя, вид)
    pub elements: Vec<(String, String)>,
    /// Имена контейнеров
    pub containers: Vec<String>,
    /// Связи
    pub relationships: Vec<NormalizedRelation>,
    /// Тексты заметок
    pub notes: Vec<String>,
}

/// Нормализованная state диаграмма
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedState {
    /// Имена состояний
    pub states: Vec<String>,
    pub has_initial: bool,
    pub has_final: bool,
    /// Переходы (from, to, label); для SVG-экстрактора from/to могут
    /// быть пустыми при недостатке данных
    pub transitions: Vec<(String, String, String)>,
    /// Тексты заметок
    pub notes: Vec<String>,
}

/// Нормализованная timing диаграмма
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedTiming {
    /// Игроки в порядке сверху вниз
    pub players: Vec<String>,
    /// Число изменений состояния по игрокам
    pub changes: IndexMap<String, usize>,
    /// Видимый диапазон времени
    pub time_span: Option<(f64, f64)>,
}

/// Нормализует текст для сопоставления: нижний регистр, схлопнутые
/// пробелы, декодированные HTML сущности
pub fn normalize_text(s: &str) -> String {
    let decoded = s
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#10;", " ")
        .replace("&laquo;", "<<")
        .replace("&raquo;", ">>")
        .replace('«', "<<")
        .replace('»', ">>")
        .replace("&amp;", "&");
    decoded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello   World "), "hello world");
        assert_eq!(normalize_text("a &lt;b&gt; &amp; c"), "a <b> & c");
        assert_eq!(normalize_text("Multi&#10;line"), "multi line");
    }
}
