//! Тип ошибки парсера.
//!
//! Парсеры толерантны: нераспознанная строка молча пропускается и
//! никогда не является ошибкой. Единственная ошибка — невозможность
//! определить семейство диаграммы.

use thiserror::Error;

/// Ошибки парсинга
#[derive(Error, Debug)]
pub enum ParseError {
    /// Не удалось определить тип диаграммы
    #[error("неизвестный тип диаграммы")]
    UnknownDiagramType,

    /// Пустой исходный код
    #[error("пустой исходный код")]
    EmptySource,
}
