//! Общие типы, используемые моделями всех семейств диаграмм.

use serde::{Deserialize, Serialize};

/// Цвет как непрозрачная строка: либо `#RRGGBB`, либо имя цвета PlantUML.
/// Нормализация в hex выполняется модулем color на этапе эмиссии.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub String);

impl Color {
    /// Создаёт цвет из сырого токена (`#FF0000`, `#LightBlue`, `red`)
    pub fn parse(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_string())
    }

    /// Сырое значение цвета
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Стиль линии
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Bold,
    Dotted,
    Hidden,
}

/// Позиция заметки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotePosition {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
    Over,
}

impl NotePosition {
    /// Парсит позицию из ключевого слова
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "over" => Some(Self::Over),
            _ => None,
        }
    }
}

/// Подсказка направления связи — только подсказка layout, не семантика
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectionHint {
    Left,
    Right,
    Up,
    Down,
    #[default]
    None,
}

impl DirectionHint {
    /// Парсит подсказку из текста внутри тела связи; принимаются
    /// префиксные сокращения PlantUML (`-down->`, `-d->`, `-le->`)
    pub fn parse(s: &str) -> Self {
        let lower = s.to_lowercase();
        if lower.is_empty() {
            return Self::None;
        }
        for (word, hint) in [
            ("left", Self::Left),
            ("right", Self::Right),
            ("up", Self::Up),
            ("down", Self::Down),
        ] {
            if word.starts_with(&lower) {
                return hint;
            }
        }
        Self::None
    }
}

/// Декоратор конца связи (глиф-терминатор)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkDecor {
    #[default]
    None,
    /// Открытая стрелка `<` / `>`
    Arrow,
    /// Наследование/расширение `<|` / `|>`
    Extension,
    /// Композиция `*` (закрашенный ромб)
    Composition,
    /// Агрегация `o` (пустой ромб)
    Aggregation,
    /// Кружок (lollipop) `(` / `)`
    Circle,
    /// Закрашенный кружок `0`
    CircleFilled,
    /// Крест `x`
    Cross,
    /// Квадрат `#`
    Square,
    /// Воронья лапка `}` / `{`
    CrowFoot,
    /// Один-ко-многим `}|` / `|{`
    OneMany,
    /// Ровно один `||`
    One,
    /// Ноль-или-один `|o` / `o|`
    ZeroOne,
    /// Плюс `+`
    Plus,
}

/// Выводит стабильный код из отображаемого имени: убирает пробелы и
/// символы вне идентификатора. Детерминированно и идемпотентно.
pub fn code_from_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}
