//! Rebuild a nested folder tree from flat detail records.

use std::collections::HashMap;

use super::{FolderDetail, ReturnedFolder};

/// Build the folder tree described by the parent ids of `details`.
///
/// Roots are the folders without a parent id, plus every folder whose parent
/// is not part of `details`. Children keep their input order. Every distinct
/// id appears exactly once in the result: a repeated record is dropped in
/// favor of the first one, and when parent ids form a cycle, the first cycle
/// member reached is promoted to root.
pub fn build_tree(details: &[FolderDetail]) -> Vec<ReturnedFolder> {
    let mut index: HashMap<u64, usize> = HashMap::with_capacity(details.len());
    for (i, detail) in details.iter().enumerate() {
        index.entry(detail.id).or_insert(i);
    }
    let is_first = |i: usize| index.get(&details[i].id) == Some(&i);

    let mut parent: Vec<Option<usize>> = details
        .iter()
        .map(|d| d.parent_id.and_then(|pid| index.get(&pid).copied()))
        .collect();
    break_cycles(&mut parent);

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); details.len()];
    for (i, p) in parent.iter().enumerate() {
        if !is_first(i) {
            continue;
        }
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    roots
        .into_iter()
        .map(|i| assemble(i, details, &children))
        .collect()
}

/// Cut parent links so that every chain ends at a root.
fn break_cycles(parent: &mut [Option<usize>]) {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNSEEN; parent.len()];
    let mut path = Vec::new();

    for start in 0..parent.len() {
        let mut current = start;
        let looped = loop {
            if state[current] != UNSEEN {
                // Reaching a node of the current walk again means a loop.
                break state[current] == ON_PATH;
            }
            state[current] = ON_PATH;
            path.push(current);
            match parent[current] {
                Some(p) => current = p,
                None => break false,
            }
        };
        if looped {
            parent[current] = None;
        }
        for node in path.drain(..) {
            state[node] = DONE;
        }
    }
}

fn assemble(i: usize, details: &[FolderDetail], children: &[Vec<usize>]) -> ReturnedFolder {
    let mut node = ReturnedFolder::from(&details[i]);
    node.children = children[i]
        .iter()
        .map(|&c| assemble(c, details, children))
        .collect();
    node
}
