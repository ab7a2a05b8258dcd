//! Contiguous, balanced chunking of ordered groups.
//!
//! A group larger than `max_batch_size` is cut into
//! `ceil(len / max_batch_size)` contiguous slices whose sizes differ by at
//! most one, so the largest slice holds `ceil(len / num_chunks)` items.
//! Slicing never reorders items and never round-robins.

/// How a group of `len` items will be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub num_chunks: usize,
    /// Size of the largest chunk.
    pub chunk_size: usize,
}

/// Plan the chunks for a group. `None` or zero means unbounded.
///
/// Sizes are balanced rather than greedily filled: 10 items capped at 4
/// become `[4, 3, 3]`, not `[4, 4, 2]`.
pub fn plan_chunks(len: usize, max_batch_size: Option<usize>) -> ChunkPlan {
    match max_batch_size {
        Some(max) if max > 0 && len > max => {
            let num_chunks = len.div_ceil(max);
            ChunkPlan {
                num_chunks,
                chunk_size: len.div_ceil(num_chunks),
            }
        }
        _ => ChunkPlan {
            num_chunks: 1,
            chunk_size: len,
        },
    }
}

/// Split `items` into the contiguous chunks described by [`plan_chunks`].
/// The first `len % num_chunks` chunks carry one extra item.
pub fn split_contiguous<T>(items: Vec<T>, max_batch_size: Option<usize>) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    let plan = plan_chunks(items.len(), max_batch_size);
    if plan.num_chunks == 1 {
        return vec![items];
    }

    let base = items.len() / plan.num_chunks;
    let remainder = items.len() % plan.num_chunks;

    let mut chunks = Vec::with_capacity(plan.num_chunks);
    let mut iter = items.into_iter();
    for index in 0..plan.num_chunks {
        let size = if index < remainder { base + 1 } else { base };
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

/// Split into fixed-size runs; only the last run may be shorter.
pub fn split_fixed<T>(items: Vec<T>, chunk_size: usize) -> Vec<Vec<T>> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

/// `"{base}"` for a lone chunk, `"[i/n]{base}"` otherwise (1-indexed).
pub fn chunk_title(base: &str, index: usize, num_chunks: usize) -> String {
    if num_chunks > 1 {
        format!("[{}/{}]{}", index, num_chunks, base)
    } else {
        base.to_string()
    }
}
