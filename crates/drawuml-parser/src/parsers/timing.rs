//! Построчный парсер Timing Diagrams.
//!
//! Контекст парсера — текущий игрок и текущее время. Строка `X is Y`
//! контекстно-зависима: если X — известный код игрока, это смена
//! состояния X в текущий момент; если X — число, это смена времени, и
//! состояние Y получает текущий игрок. Набор кодов игроков
//! проверяется в момент чтения строки; более поздние объявления не
//! переинтерпретируют прочитанное.

use regex::Regex;

use drawuml_model::common::Color;
use drawuml_model::timing::{
    StateChange, TimeConstraint, TimeMessage, TimingDiagram, TimingHighlight, TimingNote,
    TimingNotePosition, TimingPlayer, TimingPlayerKind,
};

use crate::line::{clean_lines, split_name_alias, take_trailing_color, unquote};

/// Парсит timing diagram из исходного кода
pub fn parse_timing(source: &str) -> TimingDiagram {
    let mut parser = TimingParser::new();
    for line in clean_lines(source) {
        parser.feed(&line);
    }
    parser.finish()
}

struct Rules {
    title: Regex,
    player: Regex,
    clock: Regex,
    analog_between: Regex,
    has_states: Regex,
    at_line: Regex,
    is_change: Regex,
    constraint: Regex,
    message: Regex,
    highlight: Regex,
    note: Regex,
}

impl Rules {
    fn new() -> Self {
        Self {
            title: Regex::new(r"^(?i)title\b\s*(.*)$").unwrap(),
            player: Regex::new(
                r#"^(?i)(compact\s+)?(robust|concise|clock|binary|analog|rectangle)\s+(.+)$"#,
            )
            .unwrap(),
            clock: Regex::new(
                r"(?i)\s+with\s+period\s+(\d+(?:\.\d+)?)(?:\s+pulse\s+(\d+(?:\.\d+)?))?(?:\s+offset\s+(\d+(?:\.\d+)?))?\s*$",
            )
            .unwrap(),
            analog_between: Regex::new(
                r"(?i)\s+between\s+(-?\d+(?:\.\d+)?)\s+and\s+(-?\d+(?:\.\d+)?)\s*$",
            )
            .unwrap(),
            has_states: Regex::new(r"^(\S+)\s+has\s+(.+)$").unwrap(),
            at_line: Regex::new(r"^@(\+)?(\S+)(?:\s+as\s+:(\S+))?$").unwrap(),
            is_change: Regex::new(r#"^(\S+)\s+is\s+(.+)$"#).unwrap(),
            constraint: Regex::new(
                r"^(?:(\S+?)@)?(\S+)\s+<->\s+@?(\S+)\s*(?::\s*(.*))?$",
            )
            .unwrap(),
            message: Regex::new(r"^(\S+)@(\S+)\s+->\s+(\S+)@(\S+)\s*(?::\s*(.*))?$").unwrap(),
            highlight: Regex::new(
                r"^(?i)highlight\s+(\S+)\s+to\s+(\S+)\s*(#\S+)?\s*(?::\s*(.*))?$",
            )
            .unwrap(),
            note: Regex::new(r"^(?i)note\s+(top|bottom)\s+of\s+(\S+)\s*:\s*(.*)$").unwrap(),
        }
    }
}

struct TimingParser {
    diagram: TimingDiagram,
    current_player: Option<String>,
    current_time: f64,
    rules: Rules,
}

impl TimingParser {
    fn new() -> Self {
        Self {
            diagram: TimingDiagram::new(),
            current_player: None,
            current_time: 0.0,
            rules: Rules::new(),
        }
    }

    /// Разбирает момент времени: число, `+число` (от текущего) или
    /// алиас `:имя`
    fn resolve_time(&self, token: &str) -> Option<f64> {
        let token = token.trim();
        if let Some(rel) = token.strip_prefix('+') {
            return rel.parse::<f64>().ok().map(|d| self.current_time + d);
        }
        if let Some(alias) = token.strip_prefix(':') {
            return self.diagram.time_aliases.get(alias).copied();
        }
        if let Ok(value) = token.parse::<f64>() {
            return Some(value);
        }
        self.diagram.time_aliases.get(token).copied()
    }

    fn feed(&mut self, line: &str) {
        if self.try_title(line)
            || self.try_directive(line)
            || self.try_player(line)
            || self.try_has_states(line)
            || self.try_at(line)
            || self.try_highlight(line)
            || self.try_note(line)
            || self.try_message(line)
            || self.try_constraint(line)
            || self.try_is_change(line)
        {
            return;
        }
        // Нераспознанная строка пропускается молча
    }

    fn try_title(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.title.captures(line) else {
            return false;
        };
        let rest = caps[1].trim().to_string();
        if !rest.is_empty() {
            self.diagram.title = Some(rest);
        }
        true
    }

    fn try_directive(&mut self, line: &str) -> bool {
        let lower = line.to_lowercase();
        if lower == "hide time-axis" || lower == "hide timeaxis" {
            self.diagram.hide_time_axis = true;
            return true;
        }
        if lower == "mode compact" {
            self.diagram.compact_mode = true;
            return true;
        }
        false
    }

    fn try_player(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.player.captures(line) else {
            return false;
        };
        let compact = caps.get(1).is_some();
        let Some(kind) = TimingPlayerKind::parse(&caps[2]) else {
            return false;
        };
        let mut rest = caps[3].trim().to_string();

        let mut clock_params = None;
        if kind == TimingPlayerKind::Clock {
            if let Some(c) = self.rules.clock.captures(&rest) {
                let period: f64 = c[1].parse().unwrap_or(1.0);
                let pulse = c.get(2).and_then(|m| m.as_str().parse().ok());
                let offset = c.get(3).and_then(|m| m.as_str().parse().ok());
                clock_params = Some((period, pulse, offset));
                rest = self.rules.clock.replace(&rest, "").to_string();
            }
        }
        let mut analog_range = None;
        if kind == TimingPlayerKind::Analog {
            if let Some(c) = self.rules.analog_between.captures(&rest) {
                analog_range = Some((
                    c[1].parse::<f64>().unwrap_or(0.0),
                    c[2].parse::<f64>().unwrap_or(0.0),
                ));
                rest = self.rules.analog_between.replace(&rest, "").to_string();
            }
        }

        let (display_name, code) = split_name_alias(&rest);
        if code.is_empty() {
            return false;
        }
        let mut player = TimingPlayer::new(code.clone(), display_name, kind);
        player.compact = compact || self.diagram.compact_mode;
        if let Some((period, pulse, offset)) = clock_params {
            player.clock_period = Some(period);
            player.clock_pulse = pulse;
            player.clock_offset = offset;
        }
        if let Some((start, end)) = analog_range {
            player.analog_start = Some(start);
            player.analog_end = Some(end);
        }
        self.diagram.add_player(player);
        self.current_player = Some(code);
        true
    }

    fn try_has_states(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.has_states.captures(line) else {
            return false;
        };
        let code = caps[1].to_string();
        if !self.diagram.players.contains_key(&code) {
            return false;
        }
        let list = caps[2].to_string();
        let player = self.diagram.players.get_mut(&code).unwrap();
        for item in list.split(',') {
            let (label, state_code) = split_name_alias(item.trim());
            player.ensure_state(&state_code);
            if label != state_code {
                player.state_aliases.insert(state_code, label);
            }
        }
        true
    }

    fn try_at(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.at_line.captures(line) else {
            return false;
        };
        let relative = caps.get(1).is_some();
        let token = caps[2].to_string();

        // `@Player` переключает текущего игрока
        if !relative && self.diagram.players.contains_key(&token) {
            self.current_player = Some(token);
            return true;
        }

        let time = if relative {
            match token.parse::<f64>() {
                Ok(d) => self.current_time + d,
                Err(_) => return false,
            }
        } else {
            match self.resolve_time(&token) {
                Some(t) => t,
                None => return false,
            }
        };
        self.current_time = time;
        if let Some(alias) = caps.get(3) {
            self.diagram
                .time_aliases
                .insert(alias.as_str().to_string(), time);
        }
        true
    }

    fn try_is_change(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.is_change.captures(line) else {
            return false;
        };
        let left = caps[1].to_string();
        let rest = caps[2].trim().to_string();

        let (player_code, time) = if self.diagram.players.contains_key(&left) {
            // Известный игрок: смена состояния в текущий момент
            (left, self.current_time)
        } else if let Some(t) = self.resolve_time(&left) {
            // Числовой контекст: время меняется, игрок — текущий
            self.current_time = t;
            match &self.current_player {
                Some(p) => (p.clone(), t),
                None => return false,
            }
        } else {
            return false;
        };

        let (rest, comment) = match rest.split_once(" : ") {
            Some((head, c)) => (head.trim().to_string(), Some(c.trim().to_string())),
            None => (rest, None),
        };
        let (rest, color) = take_trailing_color(&rest);
        let state = unquote(&rest);

        if let Some(player) = self.diagram.players.get_mut(&player_code) {
            if player.kind != TimingPlayerKind::Analog {
                player.ensure_state(&state);
            }
            player.state_changes.push(StateChange {
                time,
                state,
                color,
                comment,
            });
            self.current_player = Some(player_code);
        }
        true
    }

    fn try_constraint(&mut self, line: &str) -> bool {
        if !line.contains("<->") {
            return false;
        }
        let Some(caps) = self.rules.constraint.captures(line) else {
            return false;
        };
        let player_code = caps.get(1).map(|m| m.as_str().to_string());
        let t1_token = caps[2].trim_start_matches('@').to_string();
        let (Some(time1), Some(time2)) = (
            self.resolve_time(&t1_token),
            self.resolve_time(&caps[3]),
        ) else {
            return false;
        };
        self.diagram.constraints.push(TimeConstraint {
            time1,
            time2,
            player_code: player_code.or_else(|| self.current_player.clone()),
            label: caps.get(4).map(|m| m.as_str().trim().to_string()),
        });
        true
    }

    fn try_message(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.message.captures(line) else {
            return false;
        };
        let (Some(from_time), Some(to_time)) =
            (self.resolve_time(&caps[2]), self.resolve_time(&caps[4]))
        else {
            return false;
        };
        let from_player = caps[1].to_string();
        let to_player = caps[3].to_string();
        if !self.diagram.players.contains_key(&from_player)
            || !self.diagram.players.contains_key(&to_player)
        {
            return false;
        }
        self.diagram.messages.push(TimeMessage {
            from_player,
            from_time,
            to_player,
            to_time,
            label: caps.get(5).map(|m| m.as_str().trim().to_string()),
        });
        true
    }

    fn try_highlight(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.highlight.captures(line) else {
            return false;
        };
        let (Some(start_time), Some(end_time)) =
            (self.resolve_time(&caps[1]), self.resolve_time(&caps[2]))
        else {
            return false;
        };
        self.diagram.highlights.push(TimingHighlight {
            start_time,
            end_time,
            color: caps.get(3).map(|m| Color::parse(m.as_str())),
            caption: caps.get(4).map(|m| m.as_str().trim().to_string()),
        });
        true
    }

    fn try_note(&mut self, line: &str) -> bool {
        let Some(caps) = self.rules.note.captures(line) else {
            return false;
        };
        let position = if caps[1].to_lowercase() == "top" {
            TimingNotePosition::Top
        } else {
            TimingNotePosition::Bottom
        };
        self.diagram.notes.push(TimingNote {
            position,
            player_code: caps[2].to_string(),
            text: caps[3].trim().to_string(),
        });
        true
    }

    fn finish(mut self) -> TimingDiagram {
        // Постобработка: изменения состояний сортируются по времени
        self.diagram.sort_state_changes();
        self.diagram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_players_state_changes() {
        let source = "@startuml\nrobust \"User\" as U\nconcise \"Server\" as S\n@0\nU is Idle\nS is Listening\n@100\nU is Active\nS is Busy\n@200\nU is Idle\nS is Listening\n@enduml";
        let diagram = parse_timing(source);
        assert_eq!(diagram.players.len(), 2);
        assert_eq!(diagram.players["U"].kind, TimingPlayerKind::Robust);
        assert_eq!(diagram.players["S"].kind, TimingPlayerKind::Concise);

        let u = &diagram.players["U"];
        assert_eq!(u.state_changes.len(), 3);
        let times: Vec<f64> = u.state_changes.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0.0, 100.0, 200.0]);
        assert_eq!(u.state_changes[1].state, "Active");
        assert_eq!(diagram.resolved_times(), vec![0.0, 100.0, 200.0]);
    }

    #[test]
    fn test_numeric_left_is_time_context() {
        let source = "@startuml\nrobust \"U\" as U\nU is Idle\n100 is Active\n@enduml";
        let diagram = parse_timing(source);
        let u = &diagram.players["U"];
        assert_eq!(u.state_changes.len(), 2);
        assert_eq!(u.state_changes[1].time, 100.0);
        assert_eq!(u.state_changes[1].state, "Active");
    }

    #[test]
    fn test_relative_time() {
        let source = "@startuml\nconcise \"S\" as S\n@5\nS is A\n@+10\nS is B\n@enduml";
        let diagram = parse_timing(source);
        let s = &diagram.players["S"];
        assert_eq!(s.state_changes[1].time, 15.0);
    }

    #[test]
    fn test_time_alias() {
        let source = "@startuml\nconcise \"S\" as S\n@10 as :start\nS is Up\n@:start\nS is Up2\n@enduml";
        let diagram = parse_timing(source);
        assert_eq!(diagram.time_aliases["start"], 10.0);
        assert_eq!(diagram.players["S"].state_changes[0].time, 10.0);
    }

    #[test]
    fn test_clock_player() {
        let source = "@startuml\nclock \"CLK\" as C with period 50 pulse 15 offset 10\n@enduml";
        let diagram = parse_timing(source);
        let c = &diagram.players["C"];
        assert_eq!(c.kind, TimingPlayerKind::Clock);
        assert_eq!(c.clock_period, Some(50.0));
        assert_eq!(c.clock_pulse, Some(15.0));
        assert_eq!(c.clock_offset, Some(10.0));
    }

    #[test]
    fn test_analog_player() {
        let source = "@startuml\nanalog \"Volts\" as V between 0 and 5\n@0\nV is 0\n@50\nV is 3.3\n@enduml";
        let diagram = parse_timing(source);
        let v = &diagram.players["V"];
        assert_eq!(v.analog_start, Some(0.0));
        assert_eq!(v.analog_end, Some(5.0));
        assert_eq!(v.state_changes[1].state, "3.3");
    }

    #[test]
    fn test_constraint_and_message() {
        let source = "@startuml\nrobust \"A\" as A\nconcise \"B\" as B\n@0\nA is X\nA@0 <-> @50 : {50 ms}\nA@10 -> B@20 : ping\n@enduml";
        let diagram = parse_timing(source);
        assert_eq!(diagram.constraints.len(), 1);
        assert_eq!(diagram.constraints[0].time2, 50.0);
        assert_eq!(diagram.constraints[0].player_code.as_deref(), Some("A"));
        assert_eq!(diagram.messages.len(), 1);
        assert_eq!(diagram.messages[0].label.as_deref(), Some("ping"));
    }

    #[test]
    fn test_highlight() {
        let source = "@startuml\nconcise \"S\" as S\nhighlight 10 to 20 #Gold : окно\n@enduml";
        let diagram = parse_timing(source);
        assert_eq!(diagram.highlights.len(), 1);
        assert_eq!(diagram.highlights[0].caption.as_deref(), Some("окно"));
    }

    #[test]
    fn test_player_switch_with_at() {
        let source = "@startuml\nrobust \"A\" as A\nrobust \"B\" as B\n@A\n0 is X\n@B\n0 is Y\n@enduml";
        let diagram = parse_timing(source);
        assert_eq!(diagram.players["A"].state_changes[0].state, "X");
        assert_eq!(diagram.players["B"].state_changes[0].state, "Y");
    }

    #[test]
    fn test_late_declaration_does_not_reinterpret() {
        // До объявления U строка `U is Idle` не имеет игрока и пропускается
        let source = "@startuml\nU is Idle\nrobust \"U\" as U\nU is Busy\n@enduml";
        let diagram = parse_timing(source);
        assert_eq!(diagram.players["U"].state_changes.len(), 1);
        assert_eq!(diagram.players["U"].state_changes[0].state, "Busy");
    }

    #[test]
    fn test_has_states_with_alias() {
        let source = "@startuml\nrobust \"WU\" as WU\nWU has Absent,Idle as \"Ожидание\"\n@enduml";
        let diagram = parse_timing(source);
        let wu = &diagram.players["WU"];
        assert_eq!(wu.states, vec!["Absent", "Idle"]);
        assert_eq!(wu.state_label("Idle"), "Ожидание");
    }

    #[test]
    fn test_note_on_player() {
        let source = "@startuml\nconcise \"S\" as S\nnote top of S : важный момент\n@enduml";
        let diagram = parse_timing(source);
        assert_eq!(diagram.notes.len(), 1);
        assert_eq!(diagram.notes[0].position, TimingNotePosition::Top);
    }
}
