use std::ops::RangeInclusive;

pub type Path = Vec<usize>;

pub fn parent(path: &[usize]) -> &[usize] {
    path.split_last().map(|(_, parent)| parent).unwrap_or(&[])
}

/// `ancestor` is a strict prefix of `path`.
pub fn is_ancestor(ancestor: &[usize], path: &[usize]) -> bool {
    path.len() > ancestor.len() && path.starts_with(ancestor)
}

/// Remap `path` after a node was inserted at `inserted`.
pub fn transform_insert(path: &[usize], inserted: &[usize]) -> Path {
    let mut out = path.to_vec();
    let Some((&index, parent)) = inserted.split_last() else {
        return out;
    };
    let depth = parent.len();
    if out.len() > depth && out.starts_with(parent) && out[depth] >= index {
        out[depth] += 1;
    }
    out
}

/// Remap `path` after the node at `removed` was taken out. Paths inside the
/// removed subtree have no counterpart and yield `None`.
pub fn transform_remove(path: &[usize], removed: &[usize]) -> Option<Path> {
    let mut out = path.to_vec();
    let Some((&index, parent)) = removed.split_last() else {
        return Some(out);
    };
    let depth = parent.len();
    if out.len() <= depth || !out.starts_with(parent) {
        return Some(out);
    }
    if out[depth] == index {
        return None;
    }
    if out[depth] > index {
        out[depth] -= 1;
    }
    Some(out)
}

/// Remap `path` after the siblings `range` of `parent` were moved into a new
/// element inserted at `range.start()`.
pub fn transform_wrap(path: &[usize], parent: &[usize], range: &RangeInclusive<usize>) -> Path {
    let mut out = path.to_vec();
    let depth = parent.len();
    if out.len() <= depth || !out.starts_with(parent) {
        return out;
    }
    let ix = out[depth];
    let (start, end) = (*range.start(), *range.end());
    if ix > end {
        out[depth] = ix - (end - start);
    } else if ix >= start {
        out[depth] = start;
        out.insert(depth + 1, ix - start);
    }
    out
}

/// Remap `path` after the element at `unwrapped` was replaced by its
/// `child_count` children. The unwrapped element itself maps to its first
/// child's position.
pub fn transform_unwrap(path: &[usize], unwrapped: &[usize], child_count: usize) -> Path {
    let mut out = path.to_vec();
    let Some((&index, parent)) = unwrapped.split_last() else {
        return out;
    };
    let depth = parent.len();
    if out.len() <= depth || !out.starts_with(parent) {
        return out;
    }
    let ix = out[depth];
    if ix > index {
        out[depth] = ix + child_count - 1;
    } else if ix == index && out.len() > depth + 1 {
        let child = out.remove(depth + 1);
        out[depth] = index + child;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_moves_inner_paths_under_new_element() {
        let range = 1..=2;
        assert_eq!(transform_wrap(&[0, 0], &[0], &range), vec![0, 0]);
        assert_eq!(transform_wrap(&[0, 1], &[0], &range), vec![0, 1, 0]);
        assert_eq!(transform_wrap(&[0, 2, 3], &[0], &range), vec![0, 1, 1, 3]);
        assert_eq!(transform_wrap(&[0, 4], &[0], &range), vec![0, 3]);
        assert_eq!(transform_wrap(&[1, 4], &[0], &range), vec![1, 4]);
    }

    #[test]
    fn unwrap_is_inverse_of_wrap_for_inner_paths() {
        let range = 1..=2;
        for path in [vec![0, 0], vec![0, 1], vec![0, 2, 5], vec![0, 4]] {
            let wrapped = transform_wrap(&path, &[0], &range);
            assert_eq!(transform_unwrap(&wrapped, &[0, 1], 2), path);
        }
    }

    #[test]
    fn insert_and_remove_shift_following_siblings() {
        assert_eq!(transform_insert(&[0, 2], &[0, 1]), vec![0, 3]);
        assert_eq!(transform_insert(&[0, 0], &[0, 1]), vec![0, 0]);
        assert_eq!(transform_remove(&[0, 2], &[0, 1]), Some(vec![0, 1]));
        assert_eq!(transform_remove(&[0, 1, 0], &[0, 1]), None);
    }
}
