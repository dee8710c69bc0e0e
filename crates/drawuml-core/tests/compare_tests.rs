//! Тесты харнесса сравнения: результат конвертера против
//! синтетического эталонного SVG.

use drawuml_compare::{compare, Family, Score};
use drawuml_core::{convert, ConvertOptions};

#[test]
fn test_sequence_pairs_with_reference() {
    // R2: нормализация результата и эталона даёт ноль blocking проблем
    let source = "@startuml\nAlice -> Bob: Hello\nBob --> Alice: Hi back\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();

    let reference_svg = r##"<svg>
<text x="45" class="participant participant-head" textLength="36">Alice</text>
<text x="160" class="participant participant-head" textLength="28">Bob</text>
<polygon points="1,1" fill="#181818"/>
<line x1="63" y1="80" x2="174" y2="80"/>
<text class="message" x="80">Hello</text>
<polygon points="1,1" fill="#181818"/>
<line x1="174" y1="110" x2="63" y2="110" stroke-dasharray="2,2"/>
<text class="message" x="80">Hi back</text>
</svg>"##;

    let report = compare(Family::Sequence, reference_svg, &xml);
    assert!(
        report.blocking.is_empty(),
        "blocking issues: {:?}",
        report.blocking
    );
}

#[test]
fn test_sequence_missing_message_fails() {
    let source = "@startuml\nAlice -> Bob: Hello\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();

    // Эталон содержит второе сообщение, которого нет в результате
    let reference_svg = r#"<svg>
<text x="45" class="participant participant-head" textLength="36">Alice</text>
<text x="160" class="participant participant-head" textLength="28">Bob</text>
<line x1="63" y1="80" x2="174" y2="80"/>
<text class="message" x="80">Hello</text>
<line x1="174" y1="110" x2="63" y2="110"/>
<text class="message" x="80">Goodbye</text>
</svg>"#;

    let report = compare(Family::Sequence, reference_svg, &xml);
    assert_eq!(report.score, Score::Fail);
    assert!(report
        .blocking
        .iter()
        .any(|i| i.category == "missing_message"));
}

#[test]
fn test_class_entities_pair() {
    let source = "@startuml\nclass Animal\nclass Dog\nAnimal <|-- Dog\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();

    let reference_svg = r#"<svg>
<g data-qualified-name="Animal"><text>Animal</text></g>
<g data-qualified-name="Dog"><text>Dog</text></g>
<g data-entity-1="Animal" data-entity-2="Dog" data-uid="lnk1"><polygon fill="none" points="1,1"/></g>
</svg>"#;

    let report = compare(Family::Class, reference_svg, &xml);
    assert!(
        report.blocking.is_empty(),
        "blocking issues: {:?}",
        report.blocking
    );
}

#[test]
fn test_state_pairs() {
    let source = "@startuml\n[*] --> Idle\nIdle --> Running : start\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();

    let reference_svg = r##"<svg>
<ellipse cx="50" cy="20" rx="10" ry="10" fill="#000000"/>
<g data-qualified-name="Idle"><text>Idle</text></g>
<g data-qualified-name="Running"><text>Running</text></g>
<g data-entity-1="Idle" data-entity-2="Running"><path d="M1,1"/></g>
</svg>"##;

    let report = compare(Family::State, reference_svg, &xml);
    assert!(
        report.blocking.is_empty(),
        "blocking issues: {:?}",
        report.blocking
    );
}

#[test]
fn test_timing_players_pair() {
    let source = "@startuml\nrobust \"User\" as U\nconcise \"Server\" as S\n@0\nU is Idle\nS is Up\n@100\nU is Busy\nS is Down\n@enduml";
    let xml = convert(source, &ConvertOptions::default()).unwrap();

    let reference_svg = r#"<svg>
<text x="10">User</text>
<text x="10">Server</text>
<text x="130">0</text>
<text x="500">100</text>
</svg>"#;

    let report = compare(Family::Timing, reference_svg, &xml);
    assert!(
        report.blocking.is_empty(),
        "blocking issues: {:?}",
        report.blocking
    );
}

#[test]
fn test_report_json_artifact() {
    let report = compare(Family::Sequence, "<svg></svg>", "<mxfile></mxfile>");
    let json = report.to_json();
    assert!(json.contains("\"score\""));
    assert!(json.contains("\"summary\""));
}
