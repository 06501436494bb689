//! Line-based three-way merge of blob content (diff3), used both standalone and as the leaf
//! operation of [`crate::tree::merge_trees()`].

use std::ops::Range;

/// Marker lines are always this many `<`/`=`/`>` characters.
const MARKER_LEN: usize = 7;

/// The result of merging a blob three ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMergeOutcome {
    /// The merged content: conflict-free text, or text carrying `<<<<<<<`/`=======`/`>>>>>>>`
    /// conflict markers for every hunk both sides touched differently.
    pub content: Vec<u8>,
    /// Whether at least one conflict marker was emitted.
    pub has_conflict: bool,
}

/// Merge `ours` and `theirs` against their common ancestor `base`, all given as raw bytes (decoded
/// lossily as UTF-8 the way the original content was almost certainly authored as text).
///
/// Hunks both sides changed identically are taken without a conflict; hunks only one side touched
/// are taken from that side; hunks both sides changed differently are wrapped in conflict markers
/// naming `our_name`/`their_name`. A hunk one side touches and the other leaves alone never
/// conflicts with a disjoint hunk the other side touches elsewhere, even when nothing in between
/// them is common to both diffs.
pub fn merge_blobs(base: &[u8], ours: &[u8], theirs: &[u8], our_name: &str, their_name: &str) -> BlobMergeOutcome {
    let base_lines = split_lines(base);
    let our_lines = split_lines(ours);
    let their_lines = split_lines(theirs);

    let our_hunks = hunks(&align(&base_lines, &our_lines), base_lines.len(), our_lines.len());
    let their_hunks = hunks(&align(&base_lines, &their_lines), base_lines.len(), their_lines.len());
    let groups = group_overlapping(our_hunks, their_hunks);

    let mut out = Vec::new();
    let mut has_conflict = false;
    let mut pos = 0;
    for group in &groups {
        let merged_base = group.base_range();
        for line in &base_lines[pos..merged_base.start] {
            out.extend_from_slice(line);
        }

        let our_changed = !group.ours.is_empty();
        let their_changed = !group.theirs.is_empty();
        let our_content = reconstruct(&merged_base, &group.ours, &base_lines, &our_lines);
        let their_content = reconstruct(&merged_base, &group.theirs, &base_lines, &their_lines);

        if our_changed && !their_changed {
            out.extend_from_slice(&our_content);
        } else if !our_changed && their_changed {
            out.extend_from_slice(&their_content);
        } else if our_content == their_content {
            out.extend_from_slice(&our_content);
        } else {
            has_conflict = true;
            out.extend(std::iter::repeat(b'<').take(MARKER_LEN));
            out.push(b' ');
            out.extend_from_slice(our_name.as_bytes());
            out.push(b'\n');
            out.extend_from_slice(&our_content);
            out.extend(std::iter::repeat(b'=').take(MARKER_LEN));
            out.push(b'\n');
            out.extend_from_slice(&their_content);
            out.extend(std::iter::repeat(b'>').take(MARKER_LEN));
            out.push(b' ');
            out.extend_from_slice(their_name.as_bytes());
            out.push(b'\n');
        }

        pos = merged_base.end;
    }
    for line in &base_lines[pos..] {
        out.extend_from_slice(line);
    }

    BlobMergeOutcome {
        content: out,
        has_conflict,
    }
}

/// One contiguous run of base lines one side's diff replaces with `replacement` lines from that
/// side.
#[derive(Debug, Clone)]
struct Hunk {
    base: Range<usize>,
    replacement: Range<usize>,
}

/// One or more [`Hunk`]s, from either or both sides, whose base ranges overlap and so must be
/// resolved together rather than independently.
#[derive(Debug, Default)]
struct Group {
    ours: Vec<Hunk>,
    theirs: Vec<Hunk>,
}

impl Group {
    fn base_range(&self) -> Range<usize> {
        let mut hunks = self.ours.iter().chain(&self.theirs);
        let first = hunks.next().expect("a group always has at least one hunk");
        let mut start = first.base.start;
        let mut end = first.base.end;
        for hunk in hunks {
            start = start.min(hunk.base.start);
            end = end.max(hunk.base.end);
        }
        start..end
    }
}

/// Derive the runs of base lines `matches` (an ascending LCS alignment between the base and the
/// other side) does *not* preserve unchanged, each paired with the range of the other side's lines
/// that replace it.
fn hunks(matches: &[(usize, usize)], base_len: usize, other_len: usize) -> Vec<Hunk> {
    let mut out = Vec::new();
    let mut prev_base = 0;
    let mut prev_other = 0;
    for (b, o) in matches.iter().copied().chain(std::iter::once((base_len, other_len))) {
        if prev_base < b || prev_other < o {
            out.push(Hunk {
                base: prev_base..b,
                replacement: prev_other..o,
            });
        }
        prev_base = b + 1;
        prev_other = o + 1;
    }
    out
}

/// Merge `our_hunks` and `their_hunks` into groups, joining two hunks whenever their base ranges
/// share a line (or, for a pair of pure insertions, land at the exact same point). Hunks that
/// touch disjoint stretches of base stay in separate groups and are resolved independently.
fn group_overlapping(our_hunks: Vec<Hunk>, their_hunks: Vec<Hunk>) -> Vec<Group> {
    enum Side {
        Ours,
        Theirs,
    }

    let mut tagged: Vec<(Side, Hunk)> = our_hunks
        .into_iter()
        .map(|h| (Side::Ours, h))
        .chain(their_hunks.into_iter().map(|h| (Side::Theirs, h)))
        .collect();
    tagged.sort_by_key(|(_, h)| h.base.start);

    let mut groups: Vec<Group> = Vec::new();
    for (side, hunk) in tagged {
        let overlaps_last = groups.last().map_or(false, |g| {
            let r = g.base_range();
            r == hunk.base || (hunk.base.start < r.end && r.start < hunk.base.end)
        });
        if !overlaps_last {
            groups.push(Group::default());
        }
        let group = groups.last_mut().expect("just pushed if empty");
        match side {
            Side::Ours => group.ours.push(hunk),
            Side::Theirs => group.theirs.push(hunk),
        }
    }
    groups
}

/// Reconstruct one side's content across `range` (a span of base line indices): base lines not
/// covered by any of `side_hunks` are copied verbatim (that side left them alone), base lines a
/// hunk covers are replaced by that hunk's slice of `side_lines`.
fn reconstruct(range: &Range<usize>, side_hunks: &[Hunk], base_lines: &[Vec<u8>], side_lines: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut pos = range.start;
    for hunk in side_hunks {
        for line in &base_lines[pos..hunk.base.start] {
            out.extend_from_slice(line);
        }
        for line in &side_lines[hunk.replacement.start..hunk.replacement.end] {
            out.extend_from_slice(line);
        }
        pos = hunk.base.end;
    }
    for line in &base_lines[pos..range.end] {
        out.extend_from_slice(line);
    }
    out
}

/// Split `text` into lines, keeping each line's trailing `\n` (or `\r\n`) attached, the way a
/// merge needs to reproduce a file's exact byte layout.
fn split_lines(text: &[u8]) -> Vec<Vec<u8>> {
    let text = String::from_utf8_lossy(text);
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            lines.push(bytes[start..=i].to_vec());
            start = i + 1;
        }
    }
    if start < bytes.len() {
        lines.push(bytes[start..].to_vec());
    }
    lines
}

/// A longest-common-subsequence alignment between `a` and `b`, returned as matched `(a_idx,
/// b_idx)` pairs in ascending order. Quadratic in `a.len() * b.len()`; fine for the line counts a
/// merge actually deals with, not meant for huge files.
fn align(a: &[Vec<u8>], b: &[Vec<u8>]) -> Vec<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if a[i] == b[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_changes_merge_without_conflict() {
        let base = b"one\ntwo\nthree\n";
        let ours = b"one (ours)\ntwo\nthree\n";
        let theirs = b"one\ntwo\nthree (theirs)\n";
        let result = merge_blobs(base, ours, theirs, "ours", "theirs");
        assert!(!result.has_conflict);
        assert_eq!(result.content, b"one (ours)\ntwo\nthree (theirs)\n".to_vec());
    }

    #[test]
    fn adjacent_single_line_edits_on_different_lines_merge_without_conflict() {
        let base = b"a\nb\nc\n";
        let ours = b"a\nB\nc\n";
        let theirs = b"a\nb\nC\n";
        let result = merge_blobs(base, ours, theirs, "ours", "theirs");
        assert!(!result.has_conflict);
        assert_eq!(result.content, b"a\nB\nC\n".to_vec());
    }

    #[test]
    fn overlapping_changes_conflict() {
        let base = b"one\ntwo\nthree\n";
        let ours = b"one\nTWO-OURS\nthree\n";
        let theirs = b"one\nTWO-THEIRS\nthree\n";
        let result = merge_blobs(base, ours, theirs, "HEAD", "branch");
        assert!(result.has_conflict);
        let text = String::from_utf8(result.content).unwrap();
        assert!(text.contains("<<<<<<< HEAD\n"));
        assert!(text.contains("TWO-OURS\n"));
        assert!(text.contains("=======\n"));
        assert!(text.contains("TWO-THEIRS\n"));
        assert!(text.contains(">>>>>>> branch\n"));
    }

    #[test]
    fn identical_edits_on_both_sides_do_not_conflict() {
        let base = b"one\ntwo\nthree\n";
        let ours = b"one\nTWO\nthree\n";
        let theirs = b"one\nTWO\nthree\n";
        let result = merge_blobs(base, ours, theirs, "ours", "theirs");
        assert!(!result.has_conflict);
        assert_eq!(result.content, b"one\nTWO\nthree\n".to_vec());
    }
}
