//! Elimination order policies
//!
//! The values a query returns do not depend on the order in which variables are eliminated, but
//! the size of the intermediate factors does.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::factor::Factor;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EliminationOrder {
    /// Eliminate in id order
    Lexicographic,

    /// Greedily eliminate the variable with the fewest remaining neighbours, connecting its
    /// neighbours as it goes (min-degree with fill-in)
    MinNeighbours,

    /// Maximum cardinality search, reversed. Koller & Friedman Algorithm 9.3
    MaxCardinality,

    /// Eliminate in the given order. Ids that are not up for elimination are skipped and
    /// variables the list misses are eliminated last, in id order.
    Explicit(Vec<String>)
}

impl Default for EliminationOrder {
    fn default() -> Self {
        EliminationOrder::Lexicographic
    }
}


impl EliminationOrder {

    /// Order `candidates` for elimination from the working set `factors`
    pub fn order(&self, candidates: &[String], factors: &[Factor]) -> Vec<String> {
        match self {
            EliminationOrder::Lexicographic => {
                candidates.iter().cloned().sorted().collect()
            },
            EliminationOrder::MinNeighbours => min_neighbours(candidates, factors),
            EliminationOrder::MaxCardinality => max_cardinality(candidates, factors),
            EliminationOrder::Explicit(ids) => {
                let mut order: Vec<String> = ids.iter()
                    .filter(|id| candidates.contains(*id))
                    .unique()
                    .cloned()
                    .collect();

                let missing: Vec<String> = candidates.iter()
                    .filter(|id| ! order.contains(*id))
                    .cloned()
                    .sorted()
                    .collect();

                order.extend(missing);
                order
            }
        }
    }

}


/// The interaction graph of the factors: two variables are neighbours when some factor mentions
/// both. Every candidate has an entry.
fn interaction_graph(candidates: &[String], factors: &[Factor]) -> BTreeMap<String, BTreeSet<String>> {
    let mut neighbours: BTreeMap<String, BTreeSet<String>> = candidates.iter()
        .map(|v| (v.clone(), BTreeSet::new()))
        .collect();

    for f in factors {
        let scope = f.scope_ids();
        for (i, vi) in scope.iter().enumerate() {
            let entry = neighbours.entry(String::from(*vi)).or_insert_with(BTreeSet::new);
            for (j, vj) in scope.iter().enumerate() {
                if i != j {
                    entry.insert(String::from(*vj));
                }
            }
        }
    }

    neighbours
}


fn min_neighbours(candidates: &[String], factors: &[Factor]) -> Vec<String> {
    let mut graph = interaction_graph(candidates, factors);
    let mut remaining: BTreeSet<String> = candidates.iter().cloned().collect();
    let mut order = Vec::with_capacity(remaining.len());

    loop {
        let next = match remaining.iter().min_by_key(|v| graph.get(*v).map_or(0, |n| n.len())) {
            Some(v) => v.clone(),
            None => break
        };

        remaining.remove(&next);
        let ns = graph.remove(&next).unwrap_or_default();

        // drop the eliminated variable and connect what it joined
        for n in &ns {
            if let Some(adj) = graph.get_mut(n) {
                adj.remove(&next);
                adj.extend(ns.iter().filter(|m| *m != n).cloned());
            }
        }

        order.push(next);
    }

    order
}


fn max_cardinality(candidates: &[String], factors: &[Factor]) -> Vec<String> {
    let graph = interaction_graph(candidates, factors);
    let vars: Vec<&String> = candidates.iter().sorted().collect();

    // the (reverse) elimination order
    let mut marked: BTreeSet<&String> = BTreeSet::new();
    let mut elimination: Vec<String> = Vec::with_capacity(vars.len());

    for _ in 0..vars.len() {
        let mut best: Option<(&String, usize)> = None;

        for &v in vars.iter().filter(|v| ! marked.contains(*v)) {
            // count the number of marked neighbors
            let ct = graph.get(v).map_or(0, |ns| ns.iter().filter(|n| marked.contains(n)).count());

            match best {
                Some((_, max)) if ct <= max => (),
                _ => best = Some((v, ct))
            }
        }

        if let Some((v, _)) = best {
            elimination.push(v.clone());
            marked.insert(v);
        }
    }

    // we need to reverse the elimination order before returning
    elimination.reverse();
    elimination
}
