//! Ordering Engine: index arithmetic for drag-and-drop.
//!
//! Both operations work on the single global sequence; a page's order is that
//! sequence filtered by page id, so moving an element here moves it within
//! its page while leaving every other page's relative order untouched.

/// Move `seq[source]` next to `seq[target]`.
///
/// The desired slot is computed against the indices *before* the source is
/// removed (`target`, or `target + 1` when inserting after), then shifted left
/// once if the removal moved it.
pub fn reorder<T>(seq: &mut Vec<T>, source: usize, target: usize, insert_after: bool) {
    if source == target || source >= seq.len() || target >= seq.len() {
        return;
    }
    let desired = if insert_after { target + 1 } else { target };
    let item = seq.remove(source);
    let index = if source < desired { desired - 1 } else { desired };
    seq.insert(index.min(seq.len()), item);
}

/// Remove `seq[source]` and reinsert it right after the last remaining element
/// matching `belongs`, or at the very end when nothing matches.
pub fn move_after_last<T>(seq: &mut Vec<T>, source: usize, belongs: impl Fn(&T) -> bool) {
    if source >= seq.len() {
        return;
    }
    let item = seq.remove(source);
    let index = seq
        .iter()
        .rposition(|x| belongs(x))
        .map_or(seq.len(), |last| last + 1);
    seq.insert(index, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abcd() -> Vec<char> {
        vec!['A', 'B', 'C', 'D']
    }

    #[test]
    fn reorder_before_target() {
        let mut seq = abcd();
        reorder(&mut seq, 0, 2, false);
        assert_eq!(seq, vec!['B', 'A', 'C', 'D']);
    }

    #[test]
    fn reorder_after_target() {
        let mut seq = abcd();
        reorder(&mut seq, 0, 2, true);
        assert_eq!(seq, vec!['B', 'C', 'A', 'D']);
    }

    #[test]
    fn reorder_backwards() {
        let mut seq = abcd();
        reorder(&mut seq, 3, 1, false);
        assert_eq!(seq, vec!['A', 'D', 'B', 'C']);

        let mut seq = abcd();
        reorder(&mut seq, 3, 1, true);
        assert_eq!(seq, vec!['A', 'B', 'D', 'C']);
    }

    #[test]
    fn reorder_after_last_element() {
        let mut seq = abcd();
        reorder(&mut seq, 0, 3, true);
        assert_eq!(seq, vec!['B', 'C', 'D', 'A']);
    }

    #[test]
    fn reorder_onto_neighbour_is_stable() {
        let mut seq = abcd();
        reorder(&mut seq, 1, 2, false);
        assert_eq!(seq, abcd());
        reorder(&mut seq, 2, 1, true);
        assert_eq!(seq, abcd());
    }

    #[test]
    fn reorder_same_or_out_of_range_is_noop() {
        let mut seq = abcd();
        reorder(&mut seq, 1, 1, true);
        reorder(&mut seq, 9, 1, false);
        reorder(&mut seq, 1, 9, false);
        assert_eq!(seq, abcd());
    }

    #[test]
    fn move_after_last_member() {
        // (page, name): X and Y interleaved.
        let mut seq = vec![('X', 'a'), ('Y', 'b'), ('X', 'c'), ('Y', 'd'), ('Y', 'e')];
        move_after_last(&mut seq, 0, |p| p.0 == 'X');
        assert_eq!(seq, vec![('Y', 'b'), ('X', 'c'), ('X', 'a'), ('Y', 'd'), ('Y', 'e')]);
    }

    #[test]
    fn move_after_last_without_members_goes_to_end() {
        let mut seq = vec![('X', 'a'), ('Y', 'b'), ('Y', 'c')];
        move_after_last(&mut seq, 0, |p| p.0 == 'X');
        assert_eq!(seq, vec![('Y', 'b'), ('Y', 'c'), ('X', 'a')]);
    }
}
