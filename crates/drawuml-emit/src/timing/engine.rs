//! Эмиттер Timing Diagrams.
//!
//! Ось времени строится по объединению всех упомянутых моментов;
//! каждый игрок занимает горизонтальную полосу фиксированной высоты,
//! осциллограмма рисуется сегментами между последовательными
//! изменениями состояния. Z-порядок: заголовок -> подсветки -> фон
//! полос -> сегменты -> подписи состояний -> заметки -> ограничения ->
//! сообщения -> ось времени -> подписи игроков.

use indexmap::IndexMap;

use drawuml_mx::{build_cell, style_replace, CellIdAllocator, CellOptions, Geometry, MxPoint};
use drawuml_model::timing::{
    StateChange, TimingDiagram, TimingNotePosition, TimingPlayer, TimingPlayerKind,
};

use super::config::TimingEmitConfig;
use crate::EmitResult;

const LANE_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;fillColor=none;strokeColor=#C0C0C0;dashed=1;";
const SEGMENT_STYLE: &str = "endArrow=none;html=1;strokeColor=#A80036;strokeWidth=2;";
const CONNECTOR_STYLE: &str = "endArrow=none;html=1;strokeColor=#A80036;";
const BAR_STYLE: &str = "rounded=0;whiteSpace=wrap;html=1;fillColor=#FEFECE;strokeColor=#A80036;";
const ANALOG_STYLE: &str = "endArrow=none;html=1;strokeColor=#0000FF;";
const HIGHLIGHT_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;fillColor=#FFF2CC;strokeColor=none;opacity=50;verticalAlign=top;";
const CONSTRAINT_STYLE: &str =
    "endArrow=block;endFill=1;startArrow=block;startFill=1;html=1;";
const MESSAGE_STYLE: &str = "endArrow=open;endFill=0;dashed=1;html=1;";
const NOTE_STYLE: &str = "shape=note;whiteSpace=wrap;html=1;backgroundOutline=1;fillColor=#FEFFDD;";
const AXIS_STYLE: &str = "endArrow=none;html=1;strokeColor=#000000;";
const TICK_LABEL_STYLE: &str = "text;html=1;align=center;fontSize=10;";
const PLAYER_LABEL_STYLE: &str = "text;html=1;align=right;verticalAlign=middle;fontStyle=1;";
const STATE_LABEL_STYLE: &str = "text;html=1;align=left;fontSize=10;";
const TITLE_STYLE: &str = "text;html=1;align=center;fontSize=14;fontStyle=1;";

/// Полоса игрока
struct Lane {
    y: f64,
    height: f64,
}

/// Эмиттер timing diagram
pub struct TimingEmitter {
    config: TimingEmitConfig,
    ids: CellIdAllocator,
}

impl TimingEmitter {
    /// Создаёт эмиттер с конфигурацией по умолчанию
    pub fn new() -> Self {
        Self {
            config: TimingEmitConfig::default(),
            ids: CellIdAllocator::default(),
        }
    }

    /// Создаёт эмиттер с заданной конфигурацией
    pub fn with_config(config: TimingEmitConfig) -> Self {
        Self {
            config,
            ids: CellIdAllocator::default(),
        }
    }

    /// Эмитирует диаграмму
    pub fn emit(&mut self, diagram: &TimingDiagram, parent: &str) -> EmitResult {
        let times = diagram.resolved_times();
        let min_time = times.first().copied().unwrap_or(0.0);
        let max_time = times.last().copied().unwrap_or(0.0);
        let span = (max_time - min_time).max(1.0);
        let axis_width = (span * self.config.time_unit_width).max(self.config.min_axis_width);
        let label_column = self.config.label_column;
        let to_x = move |t: f64| -> f64 { label_column + (t - min_time) / span * axis_width };

        let mut titles: Vec<String> = Vec::new();
        let mut highlights: Vec<String> = Vec::new();
        let mut lanes_bg: Vec<String> = Vec::new();
        let mut segments: Vec<String> = Vec::new();
        let mut state_labels: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();
        let mut constraints: Vec<String> = Vec::new();
        let mut messages: Vec<String> = Vec::new();
        let mut axis: Vec<String> = Vec::new();
        let mut player_labels: Vec<String> = Vec::new();

        let title_offset = if diagram.title.is_some() { 35.0 } else { 0.0 };
        if let Some(title) = &diagram.title {
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(title.clone())
                .with_style(TITLE_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(
                    self.config.label_column,
                    5.0,
                    axis_width,
                    25.0,
                ));
            titles.push(build_cell(&cell).expect("title cell"));
        }

        // Раскладка полос
        let mut lanes: IndexMap<String, Lane> = IndexMap::new();
        let mut y = self.config.margin + title_offset;
        for (code, player) in &diagram.players {
            let height = self.lane_height(player);
            lanes.insert(code.clone(), Lane { y, height });
            y += height + self.config.lane_gap;
        }
        let lanes_bottom = y - self.config.lane_gap;

        // Подсветки интервалов (на всю высоту полос)
        for highlight in &diagram.highlights {
            let x1 = to_x(highlight.start_time);
            let x2 = to_x(highlight.end_time);
            let style = match &highlight.color {
                Some(c) => style_replace(
                    HIGHLIGHT_STYLE,
                    "fillColor",
                    &drawuml_mx::color::normalize(c.as_str()),
                ),
                None => HIGHLIGHT_STYLE.to_string(),
            };
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(highlight.caption.clone().unwrap_or_default())
                .with_style(style)
                .with_parent(parent)
                .with_geometry(Geometry::new(
                    x1,
                    self.config.margin + title_offset,
                    x2 - x1,
                    lanes_bottom - self.config.margin - title_offset,
                ));
            highlights.push(build_cell(&cell).expect("highlight cell"));
        }

        // Полосы и осциллограммы
        for (code, player) in &diagram.players {
            let lane = &lanes[code];
            let bg = CellOptions::vertex(self.ids.next_id())
                .with_style(LANE_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(
                    self.config.label_column,
                    lane.y,
                    axis_width,
                    lane.height,
                ));
            lanes_bg.push(build_cell(&bg).expect("lane cell"));

            match player.kind {
                TimingPlayerKind::Robust => self.emit_robust(
                    player, lane, max_time, &to_x, parent, &mut segments, &mut state_labels,
                ),
                TimingPlayerKind::Binary => self.emit_binary(
                    player, lane, max_time, &to_x, parent, &mut segments,
                ),
                TimingPlayerKind::Concise | TimingPlayerKind::Rectangle => self.emit_concise(
                    player, lane, max_time, &to_x, parent, &mut segments,
                ),
                TimingPlayerKind::Clock => self.emit_clock(
                    player, lane, min_time, max_time, &to_x, parent, &mut segments,
                ),
                TimingPlayerKind::Analog => self.emit_analog(
                    player, lane, max_time, &to_x, parent, &mut segments,
                ),
            }

            // Подпись игрока слева, поверх всего
            let label = CellOptions::vertex(self.ids.next_id())
                .with_value(player.display_name.clone())
                .with_style(PLAYER_LABEL_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(
                    self.config.margin,
                    lane.y,
                    self.config.label_column - self.config.margin - 10.0,
                    lane.height,
                ));
            player_labels.push(build_cell(&label).expect("player label cell"));
        }

        // Заметки
        for note in &diagram.notes {
            let Some(lane) = lanes.get(&note.player_code) else {
                continue;
            };
            let height = crate::line_count(&note.text) as f64 * 16.0 + 10.0;
            let y = match note.position {
                TimingNotePosition::Top => lane.y - height - 5.0,
                TimingNotePosition::Bottom => lane.y + lane.height + 5.0,
            };
            let width =
                crate::text_width(&note.text, self.config.char_width).max(80.0) + 20.0;
            let cell = CellOptions::vertex(self.ids.next_id())
                .with_value(note.text.clone())
                .with_style(NOTE_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(self.config.label_column, y.max(0.0), width, height));
            notes.push(build_cell(&cell).expect("note cell"));
        }

        // Ограничения: двусторонние стрелки
        for constraint in &diagram.constraints {
            let y = match constraint.player_code.as_ref().and_then(|c| lanes.get(c)) {
                Some(lane) => lane.y + lane.height + 12.0,
                None => lanes_bottom + 12.0,
            };
            let mut cell = CellOptions::edge(self.ids.next_id())
                .with_style(CONSTRAINT_STYLE)
                .with_parent(parent)
                .with_endpoints(
                    MxPoint::new(to_x(constraint.time1), y),
                    MxPoint::new(to_x(constraint.time2), y),
                );
            if let Some(label) = &constraint.label {
                cell = cell.with_value(label.clone());
            }
            constraints.push(build_cell(&cell).expect("constraint cell"));
        }

        // Сообщения между игроками
        for message in &diagram.messages {
            let (Some(from_lane), Some(to_lane)) = (
                lanes.get(&message.from_player),
                lanes.get(&message.to_player),
            ) else {
                continue;
            };
            let mut cell = CellOptions::edge(self.ids.next_id())
                .with_style(MESSAGE_STYLE)
                .with_parent(parent)
                .with_endpoints(
                    MxPoint::new(
                        to_x(message.from_time),
                        from_lane.y + from_lane.height / 2.0,
                    ),
                    MxPoint::new(to_x(message.to_time), to_lane.y + to_lane.height / 2.0),
                );
            if let Some(label) = &message.label {
                cell = cell.with_value(label.clone());
            }
            messages.push(build_cell(&cell).expect("message cell"));
        }

        // Ось времени с засечками
        let axis_y = lanes_bottom + 30.0;
        if !diagram.hide_time_axis && !diagram.players.is_empty() {
            let line = CellOptions::edge(self.ids.next_id())
                .with_style(AXIS_STYLE)
                .with_parent(parent)
                .with_endpoints(
                    MxPoint::new(self.config.label_column, axis_y),
                    MxPoint::new(self.config.label_column + axis_width, axis_y),
                );
            axis.push(build_cell(&line).expect("axis cell"));
            for t in &times {
                let x = to_x(*t);
                let tick = CellOptions::edge(self.ids.next_id())
                    .with_style(AXIS_STYLE)
                    .with_parent(parent)
                    .with_endpoints(
                        MxPoint::new(x, axis_y),
                        MxPoint::new(x, axis_y + self.config.tick_height),
                    );
                axis.push(build_cell(&tick).expect("tick cell"));
                let label = CellOptions::vertex(self.ids.next_id())
                    .with_value(format_time(*t))
                    .with_style(TICK_LABEL_STYLE)
                    .with_parent(parent)
                    .with_geometry(Geometry::new(x - 20.0, axis_y + 8.0, 40.0, 14.0));
                axis.push(build_cell(&label).expect("tick label cell"));
            }
        }

        let mut cells = titles;
        cells.extend(highlights);
        cells.extend(lanes_bg);
        cells.extend(segments);
        cells.extend(state_labels);
        cells.extend(notes);
        cells.extend(constraints);
        cells.extend(messages);
        cells.extend(axis);
        cells.extend(player_labels);

        EmitResult {
            cells,
            width: self.config.label_column + axis_width + self.config.margin,
            height: axis_y + 30.0,
        }
    }

    /// Высота полосы игрока по типу
    fn lane_height(&self, player: &TimingPlayer) -> f64 {
        match player.kind {
            TimingPlayerKind::Robust => {
                (player.states.len().max(2) as f64) * self.config.robust_level_height
            }
            TimingPlayerKind::Concise | TimingPlayerKind::Rectangle => self.config.concise_height,
            TimingPlayerKind::Clock => self.config.clock_height,
            TimingPlayerKind::Binary => self.config.binary_height,
            TimingPlayerKind::Analog => self.config.analog_height,
        }
    }

    /// Y уровня состояния robust игрока (сверху вниз)
    fn robust_level_y(&self, player: &TimingPlayer, lane: &Lane, state: &str) -> f64 {
        let count = player.states.len().max(1);
        let index = player
            .states
            .iter()
            .position(|s| s == state)
            .unwrap_or(count - 1);
        let step = lane.height / count as f64;
        lane.y + step * (index as f64 + 0.5)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_robust(
        &mut self,
        player: &TimingPlayer,
        lane: &Lane,
        max_time: f64,
        to_x: &dyn Fn(f64) -> f64,
        parent: &str,
        segments: &mut Vec<String>,
        state_labels: &mut Vec<String>,
    ) {
        let changes = &player.state_changes;
        for (i, change) in changes.iter().enumerate() {
            let y = self.robust_level_y(player, lane, &change.state);
            let next_time = changes.get(i + 1).map(|c| c.time).unwrap_or(max_time);
            let x1 = to_x(change.time);
            let x2 = to_x(next_time);
            let style = segment_style(change, SEGMENT_STYLE);
            let segment = CellOptions::edge(self.ids.next_id())
                .with_style(style)
                .with_parent(parent)
                .with_endpoints(MxPoint::new(x1, y), MxPoint::new(x2, y));
            segments.push(build_cell(&segment).expect("robust segment cell"));

            // Подпись состояния над сегментом
            let label = CellOptions::vertex(self.ids.next_id())
                .with_value(player.state_label(&change.state).to_string())
                .with_style(STATE_LABEL_STYLE)
                .with_parent(parent)
                .with_geometry(Geometry::new(x1 + 2.0, y - 16.0, (x2 - x1).max(30.0), 14.0));
            state_labels.push(build_cell(&label).expect("state label cell"));

            // Вертикальный переход в момент смены состояния
            if let Some(next) = changes.get(i + 1) {
                let next_y = self.robust_level_y(player, lane, &next.state);
                if (next_y - y).abs() > f64::EPSILON {
                    let connector = CellOptions::edge(self.ids.next_id())
                        .with_style(CONNECTOR_STYLE)
                        .with_parent(parent)
                        .with_endpoints(MxPoint::new(x2, y), MxPoint::new(x2, next_y));
                    segments.push(build_cell(&connector).expect("connector cell"));
                }
            }
        }
    }

    fn emit_binary(
        &mut self,
        player: &TimingPlayer,
        lane: &Lane,
        max_time: f64,
        to_x: &dyn Fn(f64) -> f64,
        parent: &str,
        segments: &mut Vec<String>,
    ) {
        let high_y = lane.y + 8.0;
        let low_y = lane.y + lane.height - 8.0;
        let level_y = |state: &str| -> f64 {
            let lower = state.to_lowercase();
            if lower == "1" || lower == "high" || lower == "on" || lower == "true" {
                high_y
            } else {
                low_y
            }
        };
        let changes = &player.state_changes;
        for (i, change) in changes.iter().enumerate() {
            let y = level_y(&change.state);
            let next_time = changes.get(i + 1).map(|c| c.time).unwrap_or(max_time);
            let segment = CellOptions::edge(self.ids.next_id())
                .with_style(segment_style(change, SEGMENT_STYLE))
                .with_parent(parent)
                .with_endpoints(
                    MxPoint::new(to_x(change.time), y),
                    MxPoint::new(to_x(next_time), y),
                );
            segments.push(build_cell(&segment).expect("binary segment cell"));
            if let Some(next) = changes.get(i + 1) {
                let next_y = level_y(&next.state);
                if (next_y - y).abs() > f64::EPSILON {
                    let connector = CellOptions::edge(self.ids.next_id())
                        .with_style(CONNECTOR_STYLE)
                        .with_parent(parent)
                        .with_endpoints(
                            MxPoint::new(to_x(next.time), y),
                            MxPoint::new(to_x(next.time), next_y),
                        );
                    segments.push(build_cell(&connector).expect("binary connector cell"));
                }
            }
        }
    }

    fn emit_concise(
        &mut self,
        player: &TimingPlayer,
        lane: &Lane,
        max_time: f64,
        to_x: &dyn Fn(f64) -> f64,
        parent: &str,
        segments: &mut Vec<String>,
    ) {
        let changes = &player.state_changes;
        for (i, change) in changes.iter().enumerate() {
            let next_time = changes.get(i + 1).map(|c| c.time).unwrap_or(max_time);
            let x1 = to_x(change.time);
            let x2 = to_x(next_time);
            if x2 - x1 < f64::EPSILON {
                continue;
            }
            let style = match &change.color {
                Some(c) => style_replace(
                    BAR_STYLE,
                    "fillColor",
                    &drawuml_mx::color::normalize(c.as_str()),
                ),
                None => BAR_STYLE.to_string(),
            };
            let bar = CellOptions::vertex(self.ids.next_id())
                .with_value(player.state_label(&change.state).to_string())
                .with_style(style)
                .with_parent(parent)
                .with_geometry(Geometry::new(x1, lane.y, x2 - x1, lane.height));
            segments.push(build_cell(&bar).expect("concise bar cell"));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_clock(
        &mut self,
        player: &TimingPlayer,
        lane: &Lane,
        min_time: f64,
        max_time: f64,
        to_x: &dyn Fn(f64) -> f64,
        parent: &str,
        segments: &mut Vec<String>,
    ) {
        let period = player.clock_period.unwrap_or(1.0).max(f64::EPSILON);
        let pulse = player.clock_pulse.unwrap_or(period / 2.0);
        let offset = player.clock_offset.unwrap_or(0.0);
        let high_y = lane.y + 8.0;
        let low_y = lane.y + lane.height - 8.0;

        // Фронты на offset + k*period (подъём) и + pulse (спад)
        let mut points: Vec<MxPoint> = Vec::new();
        let mut k = ((min_time - offset) / period).floor() as i64 - 1;
        loop {
            let rise = offset + k as f64 * period;
            let fall = rise + pulse;
            if rise > max_time {
                break;
            }
            if fall >= min_time {
                let rise_t = rise.max(min_time);
                let fall_t = fall.min(max_time);
                points.push(MxPoint::new(to_x(rise_t), low_y));
                points.push(MxPoint::new(to_x(rise_t), high_y));
                points.push(MxPoint::new(to_x(fall_t), high_y));
                points.push(MxPoint::new(to_x(fall_t), low_y));
            }
            k += 1;
        }
        if points.len() >= 2 {
            let first = points[0];
            let last = points[points.len() - 1];
            let wave = CellOptions::edge(self.ids.next_id())
                .with_style(SEGMENT_STYLE)
                .with_parent(parent)
                .with_endpoints(first, last)
                .with_waypoints(points[1..points.len() - 1].to_vec());
            segments.push(build_cell(&wave).expect("clock wave cell"));
        }
    }

    fn emit_analog(
        &mut self,
        player: &TimingPlayer,
        lane: &Lane,
        max_time: f64,
        to_x: &dyn Fn(f64) -> f64,
        parent: &str,
        segments: &mut Vec<String>,
    ) {
        let values: Vec<f64> = player
            .state_changes
            .iter()
            .filter_map(|c| c.state.parse::<f64>().ok())
            .collect();
        if values.is_empty() {
            return;
        }
        let low = player
            .analog_start
            .unwrap_or_else(|| values.iter().copied().fold(f64::MAX, f64::min));
        let high = player
            .analog_end
            .unwrap_or_else(|| values.iter().copied().fold(f64::MIN, f64::max));
        let range = (high - low).max(f64::EPSILON);
        let to_y =
            |v: f64| -> f64 { lane.y + lane.height - (v - low) / range * lane.height };

        let mut points: Vec<MxPoint> = Vec::new();
        for change in &player.state_changes {
            if let Ok(v) = change.state.parse::<f64>() {
                points.push(MxPoint::new(to_x(change.time), to_y(v)));
            }
        }
        // Последнее значение тянется до конца оси
        if let Some(last) = points.last().copied() {
            let end_x = to_x(max_time);
            if end_x > last.x {
                points.push(MxPoint::new(end_x, last.y));
            }
        }
        if points.len() >= 2 {
            let first = points[0];
            let last = points[points.len() - 1];
            let wave = CellOptions::edge(self.ids.next_id())
                .with_style(ANALOG_STYLE)
                .with_parent(parent)
                .with_endpoints(first, last)
                .with_waypoints(points[1..points.len() - 1].to_vec());
            segments.push(build_cell(&wave).expect("analog wave cell"));
        }
    }
}

impl Default for TimingEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Стиль сегмента с учётом цвета изменения
fn segment_style(change: &StateChange, base: &str) -> String {
    match &change.color {
        Some(c) => style_replace(
            base,
            "strokeColor",
            &drawuml_mx::color::normalize(c.as_str()),
        ),
        None => base.to_string(),
    }
}

/// Числовая подпись момента времени
fn format_time(t: f64) -> String {
    if (t - t.round()).abs() < 1e-9 {
        format!("{}", t.round() as i64)
    } else {
        format!("{}", t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawuml_model::timing::StateChange;

    fn change(time: f64, state: &str) -> StateChange {
        StateChange {
            time,
            state: state.into(),
            color: None,
            comment: None,
        }
    }

    fn two_player_diagram() -> TimingDiagram {
        let mut d = TimingDiagram::new();
        let mut u = TimingPlayer::new("U", "User", TimingPlayerKind::Robust);
        u.states = vec!["Idle".into(), "Active".into()];
        u.state_changes = vec![change(0.0, "Idle"), change(100.0, "Active"), change(200.0, "Idle")];
        d.add_player(u);
        let mut s = TimingPlayer::new("S", "Server", TimingPlayerKind::Concise);
        s.states = vec!["Listening".into(), "Busy".into()];
        s.state_changes = vec![
            change(0.0, "Listening"),
            change(100.0, "Busy"),
            change(200.0, "Listening"),
        ];
        d.add_player(s);
        d
    }

    #[test]
    fn test_two_players_axis_and_labels() {
        let d = two_player_diagram();
        let result = TimingEmitter::new().emit(&d, "1");
        assert!(result.cells.iter().any(|c| c.contains("value=\"User\"")));
        assert!(result.cells.iter().any(|c| c.contains("value=\"Server\"")));
        // Засечки оси: 0, 100, 200
        assert!(result.cells.iter().any(|c| c.contains("value=\"0\"")));
        assert!(result.cells.iter().any(|c| c.contains("value=\"100\"")));
        assert!(result.cells.iter().any(|c| c.contains("value=\"200\"")));
    }

    #[test]
    fn test_segment_x_non_decreasing() {
        let d = two_player_diagram();
        let config = TimingEmitConfig::default();
        let to_x = |t: f64| config.label_column + t / 200.0 * 800.0;
        // Границы сегментов по возрастанию времени
        let times: Vec<f64> = d.players["U"].state_changes.iter().map(|c| c.time).collect();
        let xs: Vec<f64> = times.iter().map(|t| to_x(*t)).collect();
        for pair in xs.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_concise_bars_carry_state_labels() {
        let d = two_player_diagram();
        let result = TimingEmitter::new().emit(&d, "1");
        assert!(result.cells.iter().any(|c| c.contains("value=\"Listening\"")));
        assert!(result.cells.iter().any(|c| c.contains("value=\"Busy\"")));
    }

    #[test]
    fn test_clock_waveform_generated() {
        let mut d = TimingDiagram::new();
        let mut clk = TimingPlayer::new("C", "CLK", TimingPlayerKind::Clock);
        clk.clock_period = Some(50.0);
        clk.clock_pulse = Some(25.0);
        d.add_player(clk);
        // Ось времени задаётся ограничением
        d.constraints.push(drawuml_model::timing::TimeConstraint {
            time1: 0.0,
            time2: 200.0,
            player_code: None,
            label: None,
        });
        let result = TimingEmitter::new().emit(&d, "1");
        assert!(result
            .cells
            .iter()
            .any(|c| c.contains("<Array as=\"points\">")));
    }

    #[test]
    fn test_analog_polyline() {
        let mut d = TimingDiagram::new();
        let mut v = TimingPlayer::new("V", "Volts", TimingPlayerKind::Analog);
        v.analog_start = Some(0.0);
        v.analog_end = Some(5.0);
        v.state_changes = vec![change(0.0, "0"), change(50.0, "3.3"), change(100.0, "5")];
        d.add_player(v);
        let result = TimingEmitter::new().emit(&d, "1");
        assert!(result
            .cells
            .iter()
            .any(|c| c.contains("strokeColor=#0000FF")));
    }

    #[test]
    fn test_hide_time_axis() {
        let mut d = two_player_diagram();
        d.hide_time_axis = true;
        let result = TimingEmitter::new().emit(&d, "1");
        assert!(!result
            .cells
            .iter()
            .any(|c| c.contains("strokeColor=#000000") && c.contains("edge=\"1\"")));
    }

    #[test]
    fn test_constraint_double_arrow() {
        let mut d = two_player_diagram();
        d.constraints.push(drawuml_model::timing::TimeConstraint {
            time1: 0.0,
            time2: 100.0,
            player_code: Some("U".into()),
            label: Some("{100 ms}".into()),
        });
        let result = TimingEmitter::new().emit(&d, "1");
        assert!(result
            .cells
            .iter()
            .any(|c| c.contains("startArrow=block") && c.contains("endArrow=block")));
    }

    #[test]
    fn test_highlight_behind_lanes() {
        let mut d = two_player_diagram();
        d.highlights.push(drawuml_model::timing::TimingHighlight {
            start_time: 50.0,
            end_time: 150.0,
            color: None,
            caption: Some("окно".into()),
        });
        let result = TimingEmitter::new().emit(&d, "1");
        let highlight_pos = result
            .cells
            .iter()
            .position(|c| c.contains("value=\"окно\""))
            .unwrap();
        let segment_pos = result
            .cells
            .iter()
            .position(|c| c.contains("strokeWidth=2"))
            .unwrap();
        assert!(highlight_pos < segment_pos);
    }
}
