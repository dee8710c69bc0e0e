//! Модель Timing Diagrams (временных диаграмм).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::Color;

/// Временная диаграмма
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingDiagram {
    /// Заголовок диаграммы
    pub title: Option<String>,
    /// Игроки (код -> игрок) в порядке появления
    pub players: IndexMap<String, TimingPlayer>,
    /// Временные ограничения
    pub constraints: Vec<TimeConstraint>,
    /// Сообщения между игроками
    pub messages: Vec<TimeMessage>,
    /// Подсветки интервалов
    pub highlights: Vec<TimingHighlight>,
    /// Заметки
    pub notes: Vec<TimingNote>,
    /// `hide time-axis`
    pub hide_time_axis: bool,
    /// Компактный режим (`mode compact`)
    pub compact_mode: bool,
    /// Именованные времена (`@5 as :tick`)
    pub time_aliases: IndexMap<String, f64>,
}

impl TimingDiagram {
    /// Создаёт новую пустую диаграмму
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет игрока
    pub fn add_player(&mut self, player: TimingPlayer) {
        self.players.insert(player.code.clone(), player);
    }

    /// После парсинга: сортирует изменения состояний каждого игрока по времени
    pub fn sort_state_changes(&mut self) {
        for player in self.players.values_mut() {
            player
                .state_changes
                .sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
        }
    }

    /// Все упомянутые моменты времени (изменения, ограничения,
    /// сообщения, подсветки), отсортированные по возрастанию
    pub fn resolved_times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = Vec::new();
        for player in self.players.values() {
            times.extend(player.state_changes.iter().map(|c| c.time));
        }
        for c in &self.constraints {
            times.push(c.time1);
            times.push(c.time2);
        }
        for m in &self.messages {
            times.push(m.from_time);
            times.push(m.to_time);
        }
        for h in &self.highlights {
            times.push(h.start_time);
            times.push(h.end_time);
        }
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        times.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON);
        times
    }
}

/// Тип игрока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimingPlayerKind {
    #[default]
    Robust,
    Concise,
    Clock,
    Binary,
    Analog,
    Rectangle,
}

impl TimingPlayerKind {
    /// Парсит тип из ключевого слова
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "robust" => Some(Self::Robust),
            "concise" => Some(Self::Concise),
            "clock" => Some(Self::Clock),
            "binary" => Some(Self::Binary),
            "analog" => Some(Self::Analog),
            "rectangle" => Some(Self::Rectangle),
            _ => None,
        }
    }
}

/// Игрок — горизонтальная полоса с осциллограммой
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingPlayer {
    /// Стабильный код
    pub code: String,
    /// Отображаемое имя
    pub display_name: String,
    /// Тип игрока
    pub kind: TimingPlayerKind,
    /// Компактный режим для этого игрока
    pub compact: bool,
    /// Известные состояния в порядке объявления
    pub states: Vec<String>,
    /// Алиасы состояний (код -> подпись)
    pub state_aliases: IndexMap<String, String>,
    /// Изменения состояния (сортируются по времени после парсинга)
    pub state_changes: Vec<StateChange>,
    /// Период тактов (clock)
    pub clock_period: Option<f64>,
    /// Длительность импульса (clock)
    pub clock_pulse: Option<f64>,
    /// Смещение первого фронта (clock)
    pub clock_offset: Option<f64>,
    /// Нижняя граница шкалы (analog)
    pub analog_start: Option<f64>,
    /// Верхняя граница шкалы (analog)
    pub analog_end: Option<f64>,
}

impl TimingPlayer {
    /// Создаёт нового игрока
    pub fn new(
        code: impl Into<String>,
        display_name: impl Into<String>,
        kind: TimingPlayerKind,
    ) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            kind,
            compact: false,
            states: Vec::new(),
            state_aliases: IndexMap::new(),
            state_changes: Vec::new(),
            clock_period: None,
            clock_pulse: None,
            clock_offset: None,
            analog_start: None,
            analog_end: None,
        }
    }

    /// Регистрирует состояние, если оно ещё не известно
    pub fn ensure_state(&mut self, state: &str) {
        if !self.states.iter().any(|s| s == state) {
            self.states.push(state.to_string());
        }
    }

    /// Подпись состояния с учётом алиасов
    pub fn state_label<'a>(&'a self, state: &'a str) -> &'a str {
        self.state_aliases.get(state).map(|s| s.as_str()).unwrap_or(state)
    }
}

/// Изменение состояния игрока
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChange {
    /// Момент времени
    pub time: f64,
    /// Код состояния (для analog — числовое значение в тексте)
    pub state: String,
    /// Цвет сегмента
    pub color: Option<Color>,
    /// Комментарий (`: text` после состояния)
    pub comment: Option<String>,
}

/// Временное ограничение между двумя моментами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConstraint {
    pub time1: f64,
    pub time2: f64,
    /// Игрок, к которому привязано ограничение
    pub player_code: Option<String>,
    /// Подпись (обычно длительность)
    pub label: Option<String>,
}

/// Сообщение между игроками
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeMessage {
    pub from_player: String,
    pub from_time: f64,
    pub to_player: String,
    pub to_time: f64,
    pub label: Option<String>,
}

/// Подсветка интервала времени
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingHighlight {
    pub start_time: f64,
    pub end_time: f64,
    pub color: Option<Color>,
    pub caption: Option<String>,
}

/// Позиция заметки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimingNotePosition {
    #[default]
    Top,
    Bottom,
}

/// Заметка на игроке
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingNote {
    pub position: TimingNotePosition,
    pub player_code: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_state_changes() {
        let mut d = TimingDiagram::new();
        let mut p = TimingPlayer::new("U", "User", TimingPlayerKind::Robust);
        for (t, s) in [(100.0, "Active"), (0.0, "Idle"), (200.0, "Idle")] {
            p.state_changes.push(StateChange {
                time: t,
                state: s.into(),
                color: None,
                comment: None,
            });
        }
        d.add_player(p);
        d.sort_state_changes();
        let times: Vec<f64> = d.players["U"].state_changes.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0.0, 100.0, 200.0]);
    }

    #[test]
    fn test_resolved_times_dedup() {
        let mut d = TimingDiagram::new();
        let mut p = TimingPlayer::new("S", "S", TimingPlayerKind::Concise);
        p.state_changes.push(StateChange {
            time: 0.0,
            state: "A".into(),
            color: None,
            comment: None,
        });
        d.add_player(p);
        d.constraints.push(TimeConstraint {
            time1: 0.0,
            time2: 100.0,
            player_code: None,
            label: None,
        });
        assert_eq!(d.resolved_times(), vec![0.0, 100.0]);
    }

    #[test]
    fn test_state_label_alias() {
        let mut p = TimingPlayer::new("WU", "Web User", TimingPlayerKind::Robust);
        p.state_aliases.insert("OK".into(), "Все хорошо".into());
        assert_eq!(p.state_label("OK"), "Все хорошо");
        assert_eq!(p.state_label("Idle"), "Idle");
    }
}
