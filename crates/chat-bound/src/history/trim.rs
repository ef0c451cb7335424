//! Count-based trimming.

use super::turn::Turn;

/// The last `keep` turns of `turns`, oldest first. Every turn counts as one
/// unit regardless of its length.
pub fn keep_last(turns: &[Turn], keep: usize) -> &[Turn] {
    let start = turns.len().saturating_sub(keep);
    &turns[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<Turn> {
        (0..n).map(|i| Turn::user(format!("m{i}"))).collect()
    }

    #[test]
    fn keeps_tail_in_order() {
        let all = turns(13);
        let kept = keep_last(&all, 10);
        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0].content, "m3");
        assert_eq!(kept[9].content, "m12");
    }

    #[test]
    fn shorter_input_is_kept_whole() {
        let all = turns(4);
        assert_eq!(keep_last(&all, 10).len(), 4);
        assert!(keep_last(&[], 10).is_empty());
    }

    #[test]
    fn long_content_still_counts_as_one() {
        let mut all = turns(3);
        all.push(Turn::user("x".repeat(10_000)));
        assert_eq!(keep_last(&all, 2).len(), 2);
    }
}
