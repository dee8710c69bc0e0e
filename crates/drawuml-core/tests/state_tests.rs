//! Интеграционные тесты state диаграмм.

use drawuml_core::{convert, parse_diagram, ConvertOptions, Diagram};
use drawuml_model::state::StateKind;

#[test]
fn test_state_with_transitions() {
    // Начальное и конечное псевдосостояния, два обычных состояния,
    // четыре перехода; Idle укладывается в слой ниже Running
    let source = "@startuml\n[*] --> Idle\nIdle --> Running : start\nRunning --> Idle : stop\nRunning --> [*] : abort\n@enduml";

    let Diagram::State(model) = parse_diagram(source).unwrap() else {
        panic!("Expected state diagram");
    };
    assert_eq!(model.transitions.len(), 4);
    let kinds: Vec<StateKind> = model.elements.values().map(|e| e.kind).collect();
    assert_eq!(
        kinds.iter().filter(|k| **k == StateKind::Initial).count(),
        1
    );
    assert_eq!(kinds.iter().filter(|k| **k == StateKind::Final).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == StateKind::State).count(), 2);

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("value=\"start\""));
    assert!(xml.contains("value=\"stop\""));
    assert!(xml.contains("value=\"abort\""));

    // Idle размещён выше Running по основной оси (слой меньше)
    let y_of = |needle: &str| -> f64 {
        let cell = xml
            .split("<mxCell")
            .find(|c| c.contains(needle) && c.contains("vertex=\"1\""))
            .unwrap();
        let pos = cell.find("y=\"").unwrap() + 3;
        let end = cell[pos..].find('"').unwrap() + pos;
        cell[pos..end].parse().unwrap()
    };
    assert!(y_of("value=\"Idle\"") < y_of("value=\"Running\""));
}

#[test]
fn test_composite_and_regions() {
    let source = "@startuml\nstate Active {\n[*] --> Working\n--\n[*] --> Logging\n}\n@enduml";
    let Diagram::State(model) = parse_diagram(source).unwrap() else {
        panic!("Expected state diagram");
    };
    let active = &model.elements["Active"];
    assert!(active.is_composite());
    assert_eq!(active.concurrent_regions.len(), 2);

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("container=1"));
}

#[test]
fn test_choice_and_fork() {
    let source = "@startuml\nstate decide <<choice>>\nstate split <<fork>>\nA --> decide\ndecide --> B\n@enduml";
    let Diagram::State(model) = parse_diagram(source).unwrap() else {
        panic!("Expected state diagram");
    };
    assert_eq!(model.elements["decide"].kind, StateKind::Choice);
    assert_eq!(model.elements["split"].kind, StateKind::ForkJoin);

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("rhombus"));
}

#[test]
fn test_final_state_ring() {
    let source = "@startuml\n[*] --> A\nA --> [*]\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();
    // Кольцо и внутренний закрашенный круг
    assert!(xml.contains("fillColor=none"));
    assert!(xml.contains("fillColor=#000000"));
}

#[test]
fn test_state_descriptions_in_value() {
    let source = "@startuml\n[*] --> Idle\nIdle : ждёт запроса\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("ждёт запроса"));
}
