//! Конфигурация эмиттера Sequence Diagrams.

/// Геометрические константы sequence диаграмм
#[derive(Debug, Clone)]
pub struct SequenceEmitConfig {
    /// Левый отступ первого участника
    pub margin_left: f64,
    /// Верхний отступ
    pub margin_top: f64,
    /// Зазор между участниками
    pub participant_gap: f64,
    /// Минимальная ширина блока участника
    pub participant_width: f64,
    /// Высота блока участника
    pub participant_height: f64,
    /// Ширина фигуры актёра
    pub actor_width: f64,
    /// Высота строки (шаг по Y на сообщение)
    pub row_height: f64,
    /// Высота зоны заголовка диаграммы
    pub title_height: f64,
    /// Ширина полосы активации
    pub activation_width: f64,
    /// Горизонтальный вынос петли self-сообщения
    pub self_message_width: f64,
    /// Вертикальный размер петли self-сообщения
    pub self_message_height: f64,
    /// Высота заголовка фрагмента
    pub fragment_header_height: f64,
    /// Внутренний отступ фрагмента
    pub fragment_padding: f64,
    /// Высота разделителя
    pub divider_height: f64,
    /// Высота задержки
    pub delay_height: f64,
    /// Отступ box от участников
    pub box_padding: f64,
    /// Ширина символа для оценки текста
    pub char_width: f64,
    /// Высота строки текста заметки
    pub note_line_height: f64,
    /// Минимальная ширина заметки
    pub note_width: f64,
    /// Вынос экзо-стрелки за крайнего участника
    pub exo_reach: f64,
}

impl Default for SequenceEmitConfig {
    fn default() -> Self {
        Self {
            margin_left: 40.0,
            margin_top: 20.0,
            participant_gap: 40.0,
            participant_width: 80.0,
            participant_height: 30.0,
            actor_width: 30.0,
            row_height: 35.0,
            title_height: 30.0,
            activation_width: 10.0,
            self_message_width: 40.0,
            self_message_height: 25.0,
            fragment_header_height: 22.0,
            fragment_padding: 10.0,
            divider_height: 25.0,
            delay_height: 25.0,
            box_padding: 10.0,
            char_width: 7.0,
            note_line_height: 16.0,
            note_width: 100.0,
            exo_reach: 45.0,
        }
    }
}

impl SequenceEmitConfig {
    /// Создаёт конфигурацию по умолчанию
    pub fn new() -> Self {
        Self::default()
    }

    /// Ширина блока участника под его имя
    pub fn width_for_name(&self, name: &str) -> f64 {
        let text = crate::text_width(name, self.char_width) + 20.0;
        self.participant_width.max(text)
    }

    /// Высота заметки по числу строк
    pub fn note_height(&self, text: &str) -> f64 {
        crate::line_count(text) as f64 * self.note_line_height + 10.0
    }
}
