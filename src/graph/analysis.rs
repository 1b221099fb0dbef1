//! Structural analysis over the adjacency index of a `Graph`
//!
//! Every routine here is a pure function of the graph. Results are reported by node id, in
//! graph order, so they are deterministic for a given construction order.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};

use super::Graph;


/// Partition the nodes into connected components, treating every edge as undirected.
///
/// Components are ordered by their first node; nodes within a component follow graph order.
pub fn connected_components(g: &Graph) -> Vec<Vec<String>> {
    let mut seen = vec![false; g.order()];
    let mut components = Vec::new();

    for start in 0..g.order() {
        if seen[start] {
            continue;
        }

        let mut members = vec![start];
        let mut queue = VecDeque::new();
        seen[start] = true;
        queue.push_back(start);

        while let Some(u) = queue.pop_front() {
            for &(v, _) in g.incident(u) {
                if ! seen[v] {
                    seen[v] = true;
                    members.push(v);
                    queue.push_back(v);
                }
            }
        }

        members.sort();
        components.push(ids_of(g, &members));
    }

    components
}


/// Order the nodes `0..n` so every arc `(from, to)` points forward (Kahn's algorithm). Among
/// the nodes ready at any point the smallest comes first.
///
/// # Returns
/// `None` if the arcs contain a cycle
pub fn topological_sort(n: usize, arcs: &[(usize, usize)]) -> Option<Vec<usize>> {
    let mut indegree = vec![0; n];
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in arcs {
        indegree[to] += 1;
        out[from].push(to);
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| indegree[i] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(u)) = ready.pop() {
        order.push(u);
        for &v in &out[u] {
            indegree[v] -= 1;
            if indegree[v] == 0 {
                ready.push(Reverse(v));
            }
        }
    }

    if order.len() == n {
        Some(order)
    } else {
        None
    }
}


/// Topological order of the nodes over the directed edges. Undirected edges are ignored.
///
/// # Returns
/// `None` if the directed edges contain a cycle
pub fn topological_order(g: &Graph) -> Option<Vec<String>> {
    let arcs: Vec<(usize, usize)> = g.edges()
        .filter(|e| e.is_directed())
        .filter_map(|e| Some((g.index_of(e.start())?, g.index_of(e.end())?)))
        .collect();

    topological_sort(g.order(), &arcs).map(|order| ids_of(g, &order))
}


/// Check that the directed edges of the graph contain no cycle
pub fn is_acyclic(g: &Graph) -> bool {
    topological_order(g).is_some()
}


/// Every maximal clique (Bron–Kerbosch with pivoting), treating every edge as undirected.
///
/// Cliques list their nodes in graph order and are sorted by those positions. An isolated node
/// is a clique of its own.
pub fn maximal_cliques(g: &Graph) -> Vec<Vec<String>> {
    let neighbours: Vec<BTreeSet<usize>> = (0..g.order())
        .map(|u| g.incident(u).iter().map(|&(v, _)| v).collect())
        .collect();

    let mut cliques: Vec<Vec<usize>> = Vec::new();
    bron_kerbosch(&neighbours, Vec::new(), (0..g.order()).collect(), BTreeSet::new(), &mut cliques);

    cliques.iter_mut().for_each(|c| c.sort());
    cliques.sort();
    cliques.iter().map(|c| ids_of(g, c)).collect()
}


fn bron_kerbosch(
    neighbours: &[BTreeSet<usize>],
    r: Vec<usize>,
    mut p: BTreeSet<usize>,
    mut x: BTreeSet<usize>,
    out: &mut Vec<Vec<usize>>
) {
    if p.is_empty() && x.is_empty() {
        out.push(r);
        return;
    }

    // pivot on the candidate with the most neighbours in p
    let pivot = p.union(&x)
        .cloned()
        .max_by_key(|&u| neighbours[u].intersection(&p).count());

    let candidates: Vec<usize> = match pivot {
        Some(u) => p.difference(&neighbours[u]).cloned().collect(),
        None => p.iter().cloned().collect()
    };

    for v in candidates {
        let mut next_r = r.clone();
        next_r.push(v);

        let next_p = p.intersection(&neighbours[v]).cloned().collect();
        let next_x = x.intersection(&neighbours[v]).cloned().collect();
        bron_kerbosch(neighbours, next_r, next_p, next_x, out);

        p.remove(&v);
        x.insert(v);
    }
}


fn ids_of(g: &Graph, idxs: &[usize]) -> Vec<String> {
    idxs.iter()
        .filter_map(|&i| g.node_at(i))
        .map(String::from)
        .collect()
}
