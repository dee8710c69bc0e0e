//! Интеграционные тесты component и use-case диаграмм.

use drawuml_core::{convert, parse_diagram, ConvertOptions, Diagram};
use drawuml_model::common::{LineStyle, LinkDecor};
use drawuml_model::component::ComponentKind;

#[test]
fn test_usecase_with_extends() {
    // Актёр, два прецедента, ассоциация и расширение пунктиром
    let source = "@startuml\n:Customer: --> (Place order)\n(Place order) <.. (Validate) : extends\n@enduml";

    let Diagram::UseCase(model) = parse_diagram(source).unwrap() else {
        panic!("Expected usecase diagram");
    };
    assert_eq!(model.elements.len(), 3);
    assert_eq!(model.elements["Customer"].kind, ComponentKind::Actor);
    assert_eq!(model.elements["Placeorder"].display_name, "Place order");
    assert_eq!(model.elements["Placeorder"].kind, ComponentKind::UseCase);
    assert_eq!(model.elements["Validate"].kind, ComponentKind::UseCase);

    assert_eq!(model.relationships.len(), 2);
    let association = &model.relationships[0];
    assert_eq!(association.from, "Customer");
    assert_eq!(association.to, "Placeorder");
    assert_eq!(association.right_decor, LinkDecor::Arrow);
    let extension = &model.relationships[1];
    assert_eq!(extension.from, "Placeorder");
    assert_eq!(extension.to, "Validate");
    assert_eq!(extension.left_decor, LinkDecor::Arrow);
    assert_eq!(extension.line_style, LineStyle::Dashed);
    assert_eq!(extension.label.as_deref(), Some("extends"));

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("shape=umlActor"));
    assert!(xml.contains("value=\"Place order\""));
    assert!(xml.contains("value=\"extends\""));
    assert!(xml.contains("dashed=1"));
}

#[test]
fn test_component_with_containers() {
    let source = "@startuml\npackage \"Web\" {\n[Frontend]\n}\nnode Server {\n[Backend]\ndatabase Store\n}\n[Frontend] --> [Backend]: REST\n@enduml";

    let Diagram::Component(model) = parse_diagram(source).unwrap() else {
        panic!("Expected component diagram");
    };
    assert_eq!(model.containers.len(), 2);
    assert_eq!(
        model.elements["Frontend"].container_path.as_deref(),
        Some("Web")
    );
    assert_eq!(
        model.elements["Store"].container_path.as_deref(),
        Some("Server")
    );

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("container=1"));
    assert!(xml.contains("shape=component"));
    assert!(xml.contains("shape=cylinder3"));
    assert!(xml.contains("value=\"REST\""));
}

#[test]
fn test_deployment_detection() {
    let source = "@startuml\nnode \"Web Server\" {\n[Apache]\n}\n@enduml";
    let diagram = parse_diagram(source).unwrap();
    assert_eq!(diagram.family(), "deployment");
}

#[test]
fn test_interface_lollipop() {
    let source = "@startuml\n() \"HTTP\" as Http\n[Gateway] --> Http\n@enduml";
    let Diagram::Component(model) = parse_diagram(source).unwrap() else {
        panic!("Expected component diagram");
    };
    assert_eq!(model.elements["Http"].kind, ComponentKind::Interface);

    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("ellipse"));
}

#[test]
fn test_note_on_component() {
    let source = "@startuml\n[Core]\nnote right of Core : главный модуль\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();
    assert!(xml.contains("shape=note"));
    assert!(xml.contains("главный модуль"));
}
