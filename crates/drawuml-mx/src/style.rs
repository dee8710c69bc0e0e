//! Сериализация карты стилей mxGraph.
//!
//! Стиль ячейки — строка вида `key1=value1;key2=value2;` (точка с
//! запятой в конце обязательна при непустой карте). Первый сегмент
//! может быть «голым» именем формы (`rounded=0` против `ellipse;`).

use indexmap::IndexMap;

/// Упорядоченная карта стилей
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    /// Голый первый сегмент (имя формы), без `=`
    base: Option<String>,
    entries: IndexMap<String, String>,
}

impl StyleMap {
    /// Создаёт пустую карту
    pub fn new() -> Self {
        Self::default()
    }

    /// Создаёт карту с голым базовым сегментом (`ellipse`, `group`)
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            entries: IndexMap::new(),
        }
    }

    /// Устанавливает значение ключа (сохраняет порядок вставки)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Значение ключа
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Сериализует в строку стиля; пустая карта даёт пустую строку
    pub fn build(&self) -> String {
        let mut out = String::new();
        if let Some(base) = &self.base {
            out.push_str(base);
            out.push(';');
        }
        for (k, v) in &self.entries {
            out.push_str(k);
            out.push('=');
            out.push_str(v);
            out.push(';');
        }
        out
    }
}

/// Заменяет значение `key=…;` в готовой строке стиля; если ключа нет,
/// дописывает его в конец. Используется для подстановки
/// пользовательских цветов в константные словари стилей.
pub fn style_replace(style: &str, key: &str, value: &str) -> String {
    let prefix = format!("{}=", key);
    let mut out = String::with_capacity(style.len() + value.len());
    let mut replaced = false;
    for seg in style.split(';') {
        if seg.is_empty() {
            continue;
        }
        if seg.starts_with(&prefix) {
            out.push_str(&prefix);
            out.push_str(value);
            replaced = true;
        } else {
            out.push_str(seg);
        }
        out.push(';');
    }
    if !replaced {
        out.push_str(&prefix);
        out.push_str(value);
        out.push(';');
    }
    out
}
