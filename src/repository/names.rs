//! Human-readable object names
//!
//! Names are revision expressions relative to the reference an object was
//! first discovered from, e.g. `refs/heads/main~3:src/lib.rs`.

/// Name of the `index`-th parent (0-based) of the commit called `commit`
pub fn parent_name(commit: &str, index: usize) -> String {
    if index > 0 {
        return format!("{commit}^{}", index + 1);
    }
    // Collapse first-parent chains: X~2 -> X~3
    if let Some((base, n)) = commit.rsplit_once('~') {
        if let Ok(n) = n.parse::<u64>() {
            return format!("{base}~{}", n + 1);
        }
    }
    format!("{commit}~1")
}

/// Name of the root tree of the commit called `commit`
pub fn tree_name(commit: &str) -> String {
    format!("{commit}^{{tree}}")
}

/// Name of the object a tag called `tag` points at
pub fn tag_target_name(tag: &str) -> String {
    format!("{tag}^{{}}")
}

/// Name of the entry `filename` within the tree called `tree`
pub fn entry_name(tree: &str, filename: &str) -> String {
    if let Some(commit) = tree.strip_suffix("^{tree}") {
        format!("{commit}:{filename}")
    } else if tree.contains(':') {
        format!("{tree}/{filename}")
    } else {
        format!("{tree}:{filename}")
    }
}
