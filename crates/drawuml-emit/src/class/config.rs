//! Конфигурация эмиттера Class Diagrams.

/// Геометрические константы class диаграмм
#[derive(Debug, Clone)]
pub struct ClassEmitConfig {
    /// Элементов в ряду сетки
    pub cols_per_row: usize,
    /// Горизонтальный зазор сетки
    pub h_gap: f64,
    /// Вертикальный зазор сетки
    pub v_gap: f64,
    /// Отступ от края диаграммы
    pub margin: f64,
    /// Минимальная ширина сущности
    pub entity_min_width: f64,
    /// Высота заголовка сущности
    pub header_height: f64,
    /// Высота строки члена
    pub member_height: f64,
    /// Высота заголовка контейнера (пакета)
    pub container_header: f64,
    /// Внутренний отступ контейнера
    pub container_padding: f64,
    /// Ширина символа для оценки текста
    pub char_width: f64,
    /// Минимальная ширина заметки
    pub note_width: f64,
    /// Высота строки заметки
    pub note_line_height: f64,
}

impl Default for ClassEmitConfig {
    fn default() -> Self {
        Self {
            cols_per_row: 4,
            h_gap: 60.0,
            v_gap: 50.0,
            margin: 40.0,
            entity_min_width: 160.0,
            header_height: 26.0,
            member_height: 20.0,
            container_header: 30.0,
            container_padding: 15.0,
            char_width: 7.0,
            note_width: 120.0,
            note_line_height: 16.0,
        }
    }
}

impl ClassEmitConfig {
    /// Создаёт конфигурацию по умолчанию
    pub fn new() -> Self {
        Self::default()
    }

    /// Ширина текста с внутренними отступами
    pub fn padded_text_width(&self, text: &str) -> f64 {
        crate::text_width(text, self.char_width) + 16.0
    }
}
