//! Сопоставление нормализованных диаграмм и классификация
//! расхождений.
//!
//! Двухфазное жадное сопоставление: сначала точное по
//! нормализованному текстовому ключу, затем (для сообщений) по одной
//! подписи — чтобы связать пару и всплыть расхождение связности
//! отдельной проблемой.

use crate::diff::Issue;
use crate::normalized::{
    NormalizedClass, NormalizedComponent, NormalizedMessage, NormalizedSequence, NormalizedState,
    NormalizedTiming,
};

/// Сопоставляет sequence диаграммы: reference — эталон PlantUML,
/// candidate — результат конвертера
pub fn match_sequence(
    reference: &NormalizedSequence,
    candidate: &NormalizedSequence,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    // Участники: точное сопоставление по имени
    for participant in &reference.participants {
        if !candidate
            .participants
            .iter()
            .any(|p| p.name == participant.name)
        {
            issues.push(Issue::blocking(
                "missing_participant",
                format!("участник '{}' отсутствует в результате", participant.name),
            ));
        }
    }
    for participant in &candidate.participants {
        if !reference
            .participants
            .iter()
            .any(|p| p.name == participant.name)
        {
            issues.push(Issue::blocking(
                "extra_participant",
                format!("лишний участник '{}'", participant.name),
            ));
        }
    }
    // Порядок общих участников
    let common_ref: Vec<&str> = reference
        .participants
        .iter()
        .filter(|p| candidate.participants.iter().any(|c| c.name == p.name))
        .map(|p| p.name.as_str())
        .collect();
    let common_cand: Vec<&str> = candidate
        .participants
        .iter()
        .filter(|p| reference.participants.iter().any(|c| c.name == p.name))
        .map(|p| p.name.as_str())
        .collect();
    if common_ref != common_cand {
        issues.push(Issue::important(
            "participant_order",
            format!("порядок участников: {:?} против {:?}", common_ref, common_cand),
        ));
    }

    issues.extend(match_messages(&reference.messages, &candidate.messages));

    // Активации: количество полос по участникам
    for (participant, count) in &reference.activations {
        let candidate_count = candidate.activations.get(participant).copied().unwrap_or(0);
        if candidate_count != *count {
            issues.push(Issue::important(
                "activation_count",
                format!(
                    "активации '{}': эталон {}, результат {}",
                    participant, count, candidate_count
                ),
            ));
        }
    }

    // Фрагменты по типам в порядке появления
    if reference.fragments != candidate.fragments {
        if reference.fragments.len() != candidate.fragments.len() {
            issues.push(Issue::important(
                "fragment_count",
                format!(
                    "фрагменты: эталон {:?}, результат {:?}",
                    reference.fragments, candidate.fragments
                ),
            ));
        } else {
            issues.push(Issue::important(
                "fragment_type",
                format!(
                    "типы фрагментов: эталон {:?}, результат {:?}",
                    reference.fragments, candidate.fragments
                ),
            ));
        }
    }

    // Заметки и разделители — косметика
    if reference.notes.len() != candidate.notes.len() {
        let category = if candidate.notes.len() > reference.notes.len() {
            "extra_notes"
        } else {
            "missing_notes"
        };
        issues.push(Issue::cosmetic(
            category,
            format!(
                "заметок в эталоне {}, в результате {}",
                reference.notes.len(),
                candidate.notes.len()
            ),
        ));
    }
    if reference.dividers.len() != candidate.dividers.len() {
        let category = if candidate.dividers.len() > reference.dividers.len() {
            "extra_divider"
        } else {
            "missing_divider"
        };
        issues.push(Issue::cosmetic(
            category,
            format!(
                "разделителей в эталоне {}, в результате {}",
                reference.dividers.len(),
                candidate.dividers.len()
            ),
        ));
    }

    issues
}

/// Двухфазное сопоставление сообщений
fn match_messages(
    reference: &[NormalizedMessage],
    candidate: &[NormalizedMessage],
) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut candidate_used = vec![false; candidate.len()];
    let key = |m: &NormalizedMessage| format!("{}|{}|{}", m.from, m.to, m.label);

    for message in reference {
        // Фаза 1: точный ключ from|to|label
        let exact = candidate
            .iter()
            .enumerate()
            .find(|(i, c)| !candidate_used[*i] && key(c) == key(message));
        if let Some((i, paired)) = exact {
            candidate_used[i] = true;
            if paired.dashed != message.dashed || paired.arrow != message.arrow {
                issues.push(Issue::important(
                    "arrow_mismatch",
                    format!(
                        "стрелка '{}': эталон {}/{}, результат {}/{}",
                        message.label,
                        if message.dashed { "dashed" } else { "solid" },
                        message.arrow,
                        if paired.dashed { "dashed" } else { "solid" },
                        paired.arrow
                    ),
                ));
            }
            continue;
        }
        // Фаза 2: только подпись — пара найдена, связность неверна
        let by_label = candidate
            .iter()
            .enumerate()
            .find(|(i, c)| !candidate_used[*i] && c.label == message.label);
        if let Some((i, paired)) = by_label {
            candidate_used[i] = true;
            issues.push(Issue::blocking(
                "wrong_connectivity",
                format!(
                    "сообщение '{}': эталон {} -> {}, результат {} -> {}",
                    message.label, message.from, message.to, paired.from, paired.to
                ),
            ));
        } else {
            issues.push(Issue::blocking(
                "missing_message",
                format!(
                    "сообщение '{}' ({} -> {}) отсутствует",
                    message.label, message.from, message.to
                ),
            ));
        }
    }
    for (i, message) in candidate.iter().enumerate() {
        if !candidate_used[i] {
            issues.push(Issue::blocking(
                "extra_message",
                format!("лишнее сообщение '{}'", message.label),
            ));
        }
    }
    issues
}

/// Ключ связи без направления: декораторы на противоположных концах
/// эквивалентны при перестановке концов
fn relation_key(from: &str, to: &str) -> (String, String) {
    if from <= to {
        (from.to_string(), to.to_string())
    } else {
        (to.to_string(), from.to_string())
    }
}

/// Сопоставляет class диаграммы
pub fn match_class(reference: &NormalizedClass, candidate: &NormalizedClass) -> Vec<Issue> {
    let mut issues = Vec::new();

    for entity in &reference.entities {
        let Some(paired) = candidate.entities.iter().find(|c| c.name == entity.name) else {
            issues.push(Issue::blocking(
                "missing_entity",
                format!("сущность '{}' отсутствует", entity.name),
            ));
            continue;
        };
        if paired.kind != entity.kind {
            issues.push(Issue::important(
                "class_type_mismatch",
                format!(
                    "тип '{}': эталон {}, результат {}",
                    entity.name, entity.kind, paired.kind
                ),
            ));
        }
        if paired.member_count != entity.member_count {
            issues.push(Issue::important(
                "member_count",
                format!(
                    "члены '{}': эталон {}, результат {}",
                    entity.name, entity.member_count, paired.member_count
                ),
            ));
        }
    }
    for entity in &candidate.entities {
        if !reference.entities.iter().any(|r| r.name == entity.name) {
            issues.push(Issue::blocking(
                "extra_entity",
                format!("лишняя сущность '{}'", entity.name),
            ));
        }
    }

    // Связи: ключ — неупорядоченная пара концов
    let mut candidate_used = vec![false; candidate.relationships.len()];
    for relation in &reference.relationships {
        let key = relation_key(&relation.from, &relation.to);
        let paired = candidate
            .relationships
            .iter()
            .enumerate()
            .find(|(i, c)| !candidate_used[*i] && relation_key(&c.from, &c.to) == key);
        match paired {
            Some((i, found)) => {
                candidate_used[i] = true;
                if found.kind != relation.kind {
                    issues.push(Issue::important(
                        "arrow_mismatch",
                        format!(
                            "связь {} - {}: эталон {}, результат {}",
                            relation.from, relation.to, relation.kind, found.kind
                        ),
                    ));
                }
            }
            None => issues.push(Issue::blocking(
                "missing_relationship",
                format!("связь {} - {} отсутствует", relation.from, relation.to),
            )),
        }
    }
    for (i, relation) in candidate.relationships.iter().enumerate() {
        if !candidate_used[i] {
            issues.push(Issue::blocking(
                "extra_relationship",
                format!("лишняя связь {} - {}", relation.from, relation.to),
            ));
        }
    }

    for package in &reference.packages {
        if !candidate.packages.contains(package) {
            issues.push(Issue::important(
                "missing_container",
                format!("пакет '{}' отсутствует", package),
            ));
        }
    }
    if candidate.notes.len() != reference.notes.len() {
        issues.push(Issue::cosmetic(
            "notes_count",
            format!(
                "заметок в эталоне {}, в результате {}",
                reference.notes.len(),
                candidate.notes.len()
            ),
        ));
    }
    issues
}

/// Сопоставляет component/use-case диаграммы
pub fn match_component(
    reference: &NormalizedComponent,
    candidate: &NormalizedComponent,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (name, kind) in &reference.elements {
        let Some((_, paired_kind)) = candidate.elements.iter().find(|(n, _)| n == name) else {
            issues.push(Issue::blocking(
                "missing_element",
                format!("элемент '{}' отсутствует", name),
            ));
            continue;
        };
        if paired_kind != kind {
            issues.push(Issue::important(
                "element_type_mismatch",
                format!("тип '{}': эталон {}, результат {}", name, kind, paired_kind),
            ));
        }
    }
    for (name, _) in &candidate.elements {
        if !reference.elements.iter().any(|(n, _)| n == name) {
            issues.push(Issue::blocking(
                "extra_element",
                format!("лишний элемент '{}'", name),
            ));
        }
    }

    let mut candidate_used = vec![false; candidate.relationships.len()];
    for relation in &reference.relationships {
        let key = relation_key(&relation.from, &relation.to);
        let paired = candidate
            .relationships
            .iter()
            .enumerate()
            .find(|(i, c)| !candidate_used[*i] && relation_key(&c.from, &c.to) == key);
        match paired {
            Some((i, _)) => candidate_used[i] = true,
            None => issues.push(Issue::blocking(
                "missing_relationship",
                format!("связь {} - {} отсутствует", relation.from, relation.to),
            )),
        }
    }
    for (i, relation) in candidate.relationships.iter().enumerate() {
        if !candidate_used[i] {
            issues.push(Issue::blocking(
                "extra_relationship",
                format!("лишняя связь {} - {}", relation.from, relation.to),
            ));
        }
    }

    for container in &reference.containers {
        if !candidate.containers.contains(container) {
            issues.push(Issue::important(
                "missing_container",
                format!("контейнер '{}' отсутствует", container),
            ));
        }
    }
    for container in &candidate.containers {
        if !reference.containers.contains(container) {
            issues.push(Issue::cosmetic(
                "extra_container",
                format!("лишний контейнер '{}'", container),
            ));
        }
    }
    if candidate.notes.len() != reference.notes.len() {
        issues.push(Issue::cosmetic(
            "notes_count",
            format!(
                "заметок в эталоне {}, в результате {}",
                reference.notes.len(),
                candidate.notes.len()
            ),
        ));
    }
    issues
}

/// Сопоставляет state диаграммы
pub fn match_state(reference: &NormalizedState, candidate: &NormalizedState) -> Vec<Issue> {
    let mut issues = Vec::new();

    for state in &reference.states {
        if !candidate.states.contains(state) {
            issues.push(Issue::blocking(
                "missing_state",
                format!("состояние '{}' отсутствует", state),
            ));
        }
    }
    for state in &candidate.states {
        if !reference.states.contains(state) {
            issues.push(Issue::blocking(
                "extra_state",
                format!("лишнее состояние '{}'", state),
            ));
        }
    }
    if reference.has_initial && !candidate.has_initial {
        issues.push(Issue::blocking(
            "missing_state",
            "начальное псевдосостояние отсутствует",
        ));
    }
    if reference.has_final && !candidate.has_final {
        issues.push(Issue::blocking(
            "missing_state",
            "конечное псевдосостояние отсутствует",
        ));
    }

    // Переходы: эталонный экстрактор может не знать концов
    let named = |t: &(String, String, String)| !t.0.is_empty() && !t.1.is_empty();
    let ref_named: Vec<_> = reference.transitions.iter().filter(|t| named(t)).collect();
    if ref_named.is_empty() {
        if reference.transitions.len() != candidate.transitions.len() {
            issues.push(Issue::blocking(
                "missing_transition",
                format!(
                    "переходов в эталоне {}, в результате {}",
                    reference.transitions.len(),
                    candidate.transitions.len()
                ),
            ));
        }
    } else {
        for transition in &ref_named {
            let found = candidate.transitions.iter().any(|c| {
                relation_key(&c.0, &c.1) == relation_key(&transition.0, &transition.1)
            });
            if !found {
                issues.push(Issue::blocking(
                    "missing_transition",
                    format!("переход {} -> {} отсутствует", transition.0, transition.1),
                ));
            }
        }
    }
    if candidate.notes.len() != reference.notes.len() {
        issues.push(Issue::cosmetic(
            "notes_count",
            format!(
                "заметок в эталоне {}, в результате {}",
                reference.notes.len(),
                candidate.notes.len()
            ),
        ));
    }
    issues
}

/// Сопоставляет timing диаграммы
pub fn match_timing(reference: &NormalizedTiming, candidate: &NormalizedTiming) -> Vec<Issue> {
    let mut issues = Vec::new();

    for player in &reference.players {
        if !candidate.players.contains(player) {
            issues.push(Issue::blocking(
                "missing_player",
                format!("игрок '{}' отсутствует", player),
            ));
        }
    }
    for player in &candidate.players {
        if !reference.players.contains(player) {
            issues.push(Issue::blocking(
                "extra_player",
                format!("лишний игрок '{}'", player),
            ));
        }
    }

    // Количество изменений сравнивается, когда эталон его знает
    for (player, count) in &reference.changes {
        let candidate_count = candidate.changes.get(player).copied().unwrap_or(0);
        if candidate_count != *count {
            issues.push(Issue::important(
                "change_count",
                format!(
                    "изменения '{}': эталон {}, результат {}",
                    player, count, candidate_count
                ),
            ));
        }
    }

    if let (Some(ref_span), Some(cand_span)) = (reference.time_span, candidate.time_span) {
        if (ref_span.0 - cand_span.0).abs() > 0.5 || (ref_span.1 - cand_span.1).abs() > 0.5 {
            issues.push(Issue::important(
                "time_span",
                format!("ось времени: эталон {:?}, результат {:?}", ref_span, cand_span),
            ));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalized::NormalizedParticipant;

    fn message(from: &str, to: &str, label: &str, dashed: bool) -> NormalizedMessage {
        NormalizedMessage {
            from: from.into(),
            to: to.into(),
            label: label.into(),
            dashed,
            arrow: "block".into(),
        }
    }

    fn sequence(participants: &[&str], messages: Vec<NormalizedMessage>) -> NormalizedSequence {
        NormalizedSequence {
            participants: participants
                .iter()
                .map(|n| NormalizedParticipant {
                    name: n.to_string(),
                    kind_index: 0,
                })
                .collect(),
            messages,
            ..NormalizedSequence::default()
        }
    }

    #[test]
    fn test_identical_sequences_pass() {
        let a = sequence(&["alice", "bob"], vec![message("alice", "bob", "hello", false)]);
        let issues = match_sequence(&a, &a.clone());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_participant_blocking() {
        let reference = sequence(&["alice", "bob"], vec![]);
        let candidate = sequence(&["alice"], vec![]);
        let issues = match_sequence(&reference, &candidate);
        assert!(issues
            .iter()
            .any(|i| i.category == "missing_participant"));
    }

    #[test]
    fn test_connectivity_mismatch_via_label_phase() {
        let reference = sequence(
            &["alice", "bob"],
            vec![message("alice", "bob", "hello", false)],
        );
        let candidate = sequence(
            &["alice", "bob"],
            vec![message("bob", "alice", "hello", false)],
        );
        let issues = match_sequence(&reference, &candidate);
        assert!(issues.iter().any(|i| i.category == "wrong_connectivity"));
        // Пара найдена: сообщение не дублируется как missing + extra
        assert!(!issues.iter().any(|i| i.category == "missing_message"));
        assert!(!issues.iter().any(|i| i.category == "extra_message"));
    }

    #[test]
    fn test_arrow_mismatch_important() {
        let reference = sequence(
            &["alice", "bob"],
            vec![message("alice", "bob", "hello", true)],
        );
        let candidate = sequence(
            &["alice", "bob"],
            vec![message("alice", "bob", "hello", false)],
        );
        let issues = match_sequence(&reference, &candidate);
        assert!(issues.iter().any(|i| i.category == "arrow_mismatch"));
    }

    #[test]
    fn test_relation_swapped_ends_equivalent() {
        // R3: перестановка концов с перестановкой декораторов — та же связь
        let reference = NormalizedClass {
            entities: vec![],
            relationships: vec![crate::normalized::NormalizedRelation {
                from: "a".into(),
                to: "b".into(),
                kind: "extension".into(),
                label: String::new(),
            }],
            packages: vec![],
            notes: vec![],
        };
        let candidate = NormalizedClass {
            entities: vec![],
            relationships: vec![crate::normalized::NormalizedRelation {
                from: "b".into(),
                to: "a".into(),
                kind: "extension".into(),
                label: String::new(),
            }],
            packages: vec![],
            notes: vec![],
        };
        let issues = match_class(&reference, &candidate);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_state_blocking() {
        let reference = NormalizedState {
            states: vec!["idle".into(), "running".into()],
            has_initial: true,
            has_final: false,
            transitions: vec![],
            notes: vec![],
        };
        let candidate = NormalizedState {
            states: vec!["idle".into()],
            has_initial: true,
            has_final: false,
            transitions: vec![],
            notes: vec![],
        };
        let issues = match_state(&reference, &candidate);
        assert!(issues.iter().any(|i| i.category == "missing_state"));
    }

    #[test]
    fn test_missing_player_blocking() {
        let mut reference = NormalizedTiming::default();
        reference.players = vec!["user".into(), "server".into()];
        let mut candidate = NormalizedTiming::default();
        candidate.players = vec!["user".into()];
        let issues = match_timing(&reference, &candidate);
        assert!(issues.iter().any(|i| i.category == "missing_player"));
    }
}
