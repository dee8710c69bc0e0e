//! Послойная укладка графа переходов.
//!
//! Топологические слои по Кану: рёбра дедуплицируются по
//! неупорядоченной паре, чтобы обратное ребро пары не образовывало
//! цикл; оставшиеся циклы разрываются принудительным выпуском первой
//! недостижимой вершины. Для каждого прямого ребра выполняется
//! `layer(to) > layer(from)`.

use indexmap::{IndexMap, IndexSet};

/// Присваивает слой каждой вершине; порядок вершин сохраняется
pub fn assign_layers(nodes: &[String], edges: &[(String, String)]) -> IndexMap<String, usize> {
    let index: IndexMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    // Дедупликация по неупорядоченной паре: обратные рёбра отбрасываются
    let mut seen_pairs: IndexSet<(usize, usize)> = IndexSet::new();
    let mut forward: Vec<(usize, usize)> = Vec::new();
    for (from, to) in edges {
        let (Some(&f), Some(&t)) = (index.get(from.as_str()), index.get(to.as_str())) else {
            continue;
        };
        if f == t {
            continue;
        }
        let key = (f.min(t), f.max(t));
        if seen_pairs.insert(key) {
            forward.push((f, t));
        }
    }

    let n = nodes.len();
    let mut in_degree = vec![0usize; n];
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(f, t) in &forward {
        adjacency[f].push(t);
        in_degree[t] += 1;
    }

    let mut layer = vec![0usize; n];
    let mut emitted = vec![false; n];
    let mut remaining = n;
    while remaining > 0 {
        let mut progressed = false;
        for i in 0..n {
            if !emitted[i] && in_degree[i] == 0 {
                emitted[i] = true;
                remaining -= 1;
                progressed = true;
                for &next in &adjacency[i] {
                    in_degree[next] = in_degree[next].saturating_sub(1);
                    layer[next] = layer[next].max(layer[i] + 1);
                }
            }
        }
        if !progressed {
            // Цикл: принудительно выпускаем первую оставшуюся вершину
            if let Some(i) = (0..n).find(|&i| !emitted[i]) {
                emitted[i] = true;
                remaining -= 1;
                for &next in &adjacency[i] {
                    in_degree[next] = in_degree[next].saturating_sub(1);
                    layer[next] = layer[next].max(layer[i] + 1);
                }
            }
        }
    }

    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), layer[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_linear_chain() {
        let nodes = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let layers = assign_layers(&nodes, &owned(&[("A", "B"), ("B", "C")]));
        assert_eq!(layers["A"], 0);
        assert_eq!(layers["B"], 1);
        assert_eq!(layers["C"], 2);
    }

    #[test]
    fn test_back_edge_dropped() {
        // Idle -> Running и Running -> Idle: обратное ребро пары не
        // образует цикл, слои остаются упорядоченными
        let nodes = vec!["Idle".to_string(), "Running".to_string()];
        let layers = assign_layers(&nodes, &owned(&[("Idle", "Running"), ("Running", "Idle")]));
        assert!(layers["Running"] > layers["Idle"]);
    }

    #[test]
    fn test_forward_edges_strictly_increase() {
        let nodes: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let edges = owned(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let layers = assign_layers(&nodes, &edges);
        for (f, t) in &edges {
            assert!(layers[t] > layers[f], "{} -> {}", f, t);
        }
    }

    #[test]
    fn test_cycle_terminates() {
        let nodes: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        // Настоящий цикл из трёх вершин
        let layers = assign_layers(&nodes, &owned(&[("A", "B"), ("B", "C"), ("C", "A")]));
        assert_eq!(layers.len(), 3);
    }

    #[test]
    fn test_self_loop_ignored() {
        let nodes = vec!["A".to_string()];
        let layers = assign_layers(&nodes, &owned(&[("A", "A")]));
        assert_eq!(layers["A"], 0);
    }
}
