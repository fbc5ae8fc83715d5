//! Stream padding helpers

/// Round `count` up to the next multiple of `alignment`
pub(crate) fn align_up(count: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return count;
    }
    count.div_ceil(alignment) * alignment
}

/// Extend `stream` to `target` by repeating its last element
pub(crate) fn pad_repeat_last<T: Copy>(stream: &mut Vec<T>, target: usize) {
    if let Some(&last) = stream.last() {
        stream.resize(target.max(stream.len()), last);
    }
}

/// How a stream was brought to the vertex count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fit {
    Exact,
    /// Short stream, filled with copies of its first element
    Padded,
    /// Absent stream, synthesized from the default
    Synthesized,
    /// Long stream, extra elements dropped
    Truncated(usize),
}

/// Bring `stream` to exactly `target` elements
///
/// Short streams repeat their first element, an empty stream is filled with
/// `default`, and a long stream is cut at `target`.
pub(crate) fn fit_to_count<T: Copy>(stream: &mut Vec<T>, target: usize, default: T) -> Fit {
    let len = stream.len();
    if len == target {
        Fit::Exact
    } else if len == 0 {
        stream.resize(target, default);
        Fit::Synthesized
    } else if len < target {
        let first = stream[0];
        stream.resize(target, first);
        Fit::Padded
    } else {
        stream.truncate(target);
        Fit::Truncated(len)
    }
}
