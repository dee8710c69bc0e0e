//! Метрики размещения sequence diagram.

use indexmap::IndexMap;

/// Позиция участника
#[derive(Debug, Clone)]
pub struct ParticipantSlot {
    /// Идентификатор групповой ячейки участника
    pub group_id: String,
    /// Абсолютный X левого края
    pub x: f64,
    /// Абсолютный X центра (линия жизни)
    pub center_x: f64,
    /// Ширина блока заголовка
    pub width: f64,
    /// Участник появляется по create
    pub is_created: bool,
    /// Y появления заголовка (для create — переопределяется)
    pub start_y: f64,
}

/// Открытая активация
#[derive(Debug, Clone)]
pub struct ActivationFrame {
    /// Код участника
    pub participant: String,
    /// Y начала полосы
    pub start_y: f64,
    /// Глубина вложенности (смещение по X)
    pub level: usize,
    /// Цвет полосы
    pub color: Option<String>,
    /// Порядковый номер открытия (для разрешения return)
    pub seq: usize,
}

/// Завершённая активация
#[derive(Debug, Clone)]
pub struct CompletedActivation {
    pub participant: String,
    pub start_y: f64,
    pub end_y: f64,
    pub level: usize,
    pub color: Option<String>,
}

/// Рабочее состояние эмиттера
#[derive(Debug, Default)]
pub struct EmitMetrics {
    /// Слоты участников (код -> позиция), в порядке размещения
    pub participants: IndexMap<String, ParticipantSlot>,
    /// Текущая позиция Y
    pub current_y: f64,
    /// Y последнего сообщения
    pub last_message_y: f64,
    /// Открытые активации по участникам (LIFO)
    pub active: IndexMap<String, Vec<ActivationFrame>>,
    /// Завершённые активации
    pub completed: Vec<CompletedActivation>,
    /// Счётчик открытий активаций
    pub activation_seq: usize,
}

impl EmitMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Центр X участника
    pub fn center_x(&self, code: &str) -> Option<f64> {
        self.participants.get(code).map(|p| p.center_x)
    }

    /// Глубина открытых активаций участника
    pub fn activation_depth(&self, code: &str) -> usize {
        self.active.get(code).map(|v| v.len()).unwrap_or(0)
    }

    /// Открывает активацию от позиции последнего сообщения
    pub fn activate(&mut self, code: &str, color: Option<String>) {
        let level = self.activation_depth(code);
        self.activation_seq += 1;
        let frame = ActivationFrame {
            participant: code.to_string(),
            start_y: self.last_message_y,
            level,
            color,
            seq: self.activation_seq,
        };
        self.active.entry(code.to_string()).or_default().push(frame);
    }

    /// Закрывает верхнюю активацию участника; возвращает полосу
    pub fn deactivate(&mut self, code: &str, end_y: f64) -> Option<CompletedActivation> {
        let frame = self.active.get_mut(code)?.pop()?;
        let done = CompletedActivation {
            participant: frame.participant,
            start_y: frame.start_y,
            end_y,
            level: frame.level,
            color: frame.color,
        };
        self.completed.push(done.clone());
        Some(done)
    }

    /// Закрывает все активации участника (destroy)
    pub fn close_all(&mut self, code: &str, end_y: f64) {
        while self.deactivate(code, end_y).is_some() {}
    }

    /// Неявное закрытие всех оставшихся активаций в конце диаграммы
    pub fn finalize(&mut self, end_y: f64) {
        let codes: Vec<String> = self.active.keys().cloned().collect();
        for code in codes {
            self.close_all(&code, end_y);
        }
    }

    /// Участник с самой свежей живой активацией
    pub fn most_recent_active(&self) -> Option<&str> {
        self.active
            .iter()
            .flat_map(|(_, frames)| frames.iter())
            .max_by_key(|f| f.seq)
            .map(|f| f.participant.as_str())
    }

    /// Следующая по свежести живая активация на другом участнике
    pub fn next_recent_active(&self, not: &str) -> Option<&str> {
        self.active
            .iter()
            .flat_map(|(_, frames)| frames.iter())
            .filter(|f| f.participant != not)
            .max_by_key(|f| f.seq)
            .map(|f| f.participant.as_str())
    }
}
