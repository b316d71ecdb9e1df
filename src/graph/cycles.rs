//! Cycle detection over the module import graph.
//!
//! Runs one depth-first forest over a graph snapshot with an explicit work
//! stack, emitting a cycle for every back-edge to a node on the current
//! path. This deliberately reports the cycles discoverable by a single DFS
//! traversal, not every elementary cycle of a strongly-connected component;
//! downstream output volume depends on that behavior.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Detect cycles in a module adjacency snapshot (as produced by
/// [`DependencyGraph::import_map`](super::engine::DependencyGraph::import_map)).
///
/// Each cycle is an ordered module-name sequence; the walk closes from the
/// last element back to the first. Modules and neighbors are traversed in
/// sorted order, so the same snapshot always yields the same cycles.
pub fn detect_cycles(imports: &BTreeMap<String, BTreeSet<String>>) -> Vec<Vec<String>> {
    // Assign dense indices once per snapshot; edge targets may name modules
    // absent from the key set (external dependencies) and still get a node.
    let mut names: BTreeSet<&str> = imports.keys().map(String::as_str).collect();
    for targets in imports.values() {
        names.extend(targets.iter().map(String::as_str));
    }
    let names: Vec<&str> = names.into_iter().collect();
    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, &name)| (name, i))
        .collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    for (from, targets) in imports {
        let from_idx = index[from.as_str()];
        adjacency[from_idx] = targets.iter().map(|t| index[t.as_str()]).collect();
    }

    let mut visited = vec![false; names.len()];
    let mut on_stack = vec![false; names.len()];
    let mut cycles = Vec::new();

    for root in 0..names.len() {
        if visited[root] {
            continue;
        }

        // Explicit work stack of (node, next-neighbor-offset) frames; `path`
        // mirrors the stack's node column for back-edge slicing.
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        let mut path: Vec<usize> = vec![root];
        on_stack[root] = true;

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&target) = adjacency[node].get(frame.1) {
                frame.1 += 1;
                if on_stack[target] {
                    // Back-edge: the slice of the current path from the
                    // target's first occurrence through `node` is one cycle.
                    if let Some(start) = path.iter().position(|&n| n == target) {
                        cycles.push(path[start..].iter().map(|&i| names[i].to_string()).collect());
                    }
                } else if !visited[target] {
                    on_stack[target] = true;
                    path.push(target);
                    stack.push((target, 0));
                }
            } else {
                visited[node] = true;
                on_stack[node] = false;
                path.pop();
                stack.pop();
            }
        }
    }

    debug!(modules = names.len(), cycles = cycles.len(), "cycle detection finished");
    cycles
}
