//! Интеграционные тесты timing диаграмм.

use drawuml_core::{convert, parse_diagram, ConvertOptions, Diagram};
use drawuml_model::timing::TimingPlayerKind;

#[test]
fn test_two_players() {
    // Два игрока, по три изменения на отметках {0, 100, 200}; после
    // пост-сортировки времена строго возрастают; ось охватывает
    // [0, 200]
    let source = "@startuml\nrobust \"User\" as U\nconcise \"Server\" as S\n@0\nU is Idle\nS is Listening\n@100\nU is Active\nS is Busy\n@200\nU is Idle\nS is Listening\n@enduml";

    let Diagram::Timing(model) = parse_diagram(source).unwrap() else {
        panic!("Expected timing diagram");
    };
    assert_eq!(model.players.len(), 2);
    assert_eq!(model.players["U"].kind, TimingPlayerKind::Robust);
    assert_eq!(model.players["S"].kind, TimingPlayerKind::Concise);

    for player in model.players.values() {
        assert_eq!(player.state_changes.len(), 3);
        let times: Vec<f64> = player.state_changes.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0.0, 100.0, 200.0]);
        for pair in times.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }
    assert_eq!(model.resolved_times(), vec![0.0, 100.0, 200.0]);

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("value=\"User\""));
    assert!(xml.contains("value=\"Server\""));
    // Ось времени: засечки на каждом моменте
    assert!(xml.contains("value=\"0\""));
    assert!(xml.contains("value=\"100\""));
    assert!(xml.contains("value=\"200\""));
}

#[test]
fn test_waveform_x_monotonic() {
    let source = "@startuml\nrobust \"U\" as U\n@0\nU is A\n@50\nU is B\n@150\nU is C\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();

    // Границы сегментов осциллограммы не убывают по X
    let mut xs: Vec<f64> = Vec::new();
    let mut rest = xml.as_str();
    while let Some(pos) = rest.find("strokeWidth=2") {
        let chunk = &rest[pos..];
        if let Some(sp) = chunk.find("as=\"sourcePoint\"") {
            let before = &chunk[..sp];
            if let Some(xpos) = before.rfind("x=\"") {
                let tail = &before[xpos + 3..];
                if let Some(end) = tail.find('"') {
                    if let Ok(x) = tail[..end].parse::<f64>() {
                        xs.push(x);
                    }
                }
            }
        }
        rest = &rest[pos + 1..];
    }
    assert!(xs.len() >= 3);
    for pair in xs.windows(2) {
        assert!(pair[1] >= pair[0], "waveform X not monotonic: {:?}", xs);
    }
}

#[test]
fn test_clock_and_analog() {
    let source = "@startuml\nclock \"CLK\" as C with period 50\nanalog \"V\" as V between 0 and 5\n@0\nV is 0\n@100\nV is 5\n@enduml";
    let Diagram::Timing(model) = parse_diagram(source).unwrap() else {
        panic!("Expected timing diagram");
    };
    assert_eq!(model.players["C"].clock_period, Some(50.0));
    assert_eq!(model.players["V"].analog_end, Some(5.0));

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("<Array as=\"points\">"));
}

#[test]
fn test_constraint_and_highlight() {
    let source = "@startuml\nconcise \"S\" as S\n@0\nS is Up\n@100\nS is Down\nS@0 <-> @100 : {100 ms}\nhighlight 20 to 60 #Gold : окно\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("{100 ms}"));
    assert!(xml.contains("value=\"окно\""));
}

#[test]
fn test_hidden_time_axis() {
    let source = "@startuml\nhide time-axis\nconcise \"S\" as S\n@0\nS is Up\n@enduml";
    let Diagram::Timing(model) = parse_diagram(source).unwrap() else {
        panic!("Expected timing diagram");
    };
    assert!(model.hide_time_axis);
}
