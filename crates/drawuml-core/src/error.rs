//! Типы ошибок для drawuml-core

use thiserror::Error;

/// Тип результата для drawuml-core
pub type Result<T> = std::result::Result<T, Error>;

/// Ошибки конвертации
#[derive(Error, Debug)]
pub enum Error {
    /// Ошибка парсинга
    #[error("ошибка парсинга: {0}")]
    Parse(String),

    /// Структурная ошибка построения документа
    #[error("ошибка построения документа: {0}")]
    Document(String),

    /// Пустой исходный код
    #[error("пустой исходный код")]
    EmptySource,
}
