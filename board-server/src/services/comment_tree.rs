//! Rebuilds the reply forest of a post from its flat comment rows.
//!
//! Rows whose parent is not in the set (for example because the parent was
//! soft-deleted) are dropped together with everything below them. Which
//! node ends up under which parent does not depend on row order; siblings
//! keep the order they had in the input.

use std::collections::{HashMap, HashSet};

use crate::models::{Comment, CommentNode};

pub fn build_comment_tree(rows: Vec<Comment>) -> Vec<CommentNode> {
    let ids: HashSet<i64> = rows.iter().map(|c| c.id).collect();

    let mut roots = Vec::new();
    let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        match row.parent_id {
            None => roots.push(idx),
            Some(parent) if ids.contains(&parent) => children.entry(parent).or_default().push(idx),
            Some(_) => {}
        }
    }

    let mut slots: Vec<Option<Comment>> = rows.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|idx| assemble(idx, &mut slots, &children))
        .collect()
}

/// Depth-first assembly with an explicit stack, so reply chains of any depth
/// are fine. Each slot is taken at most once.
fn assemble(
    root: usize,
    slots: &mut [Option<Comment>],
    children: &HashMap<i64, Vec<usize>>,
) -> Option<CommentNode> {
    let kids_of = |id: i64| children.get(&id).cloned().unwrap_or_default().into_iter();

    let comment = slots[root].take()?;
    let kids = kids_of(comment.id);
    let mut stack = vec![(CommentNode::from(comment), kids)];

    loop {
        let (_, pending) = stack.last_mut()?;
        match pending.next() {
            Some(child) => {
                if let Some(comment) = slots[child].take() {
                    let kids = kids_of(comment.id);
                    stack.push((CommentNode::from(comment), kids));
                }
            }
            None => {
                let (node, _) = stack.pop()?;
                match stack.last_mut() {
                    Some((parent, _)) => parent.replies.push(node),
                    None => return Some(node),
                }
            }
        }
    }
}
