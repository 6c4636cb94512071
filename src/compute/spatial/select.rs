//! Partial sorting primitives used by the bulk loader.
//!
//! [`quickselect`] is the Floyd-Rivest selection algorithm: it moves the
//! k-th smallest element (by a scalar key) to position `k`, with every element
//! before it comparing `<=` and every element after it comparing `>=`.
//! [`multi_select`] applies it repeatedly to cut a range into groups of a
//! fixed size that are ordered relative to each other but not internally.

/// Ranges larger than this are narrowed with a recursive sample step first.
const SAMPLE_THRESHOLD: isize = 600;

/// Rearrange `items[left..=right]` so that `items[k]` holds the element of
/// rank `k` under `key`.
///
/// Recursion only happens on the sampled sub-range, whose size shrinks to
/// roughly `n^(2/3)` per level, so stack depth stays small.
///
/// # Examples
///
/// ```
/// use polylocate::compute::spatial::select::quickselect;
///
/// let mut v = vec![9.0, 1.0, 8.0, 2.0, 7.0, 3.0, 6.0, 4.0, 5.0];
/// let last = v.len() - 1;
/// quickselect(&mut v, 4, 0, last, &|x: &f64| *x);
/// assert_eq!(v[4], 5.0);
/// assert!(v[..4].iter().all(|x| *x <= 5.0));
/// assert!(v[5..].iter().all(|x| *x >= 5.0));
/// ```
pub fn quickselect<T, F>(items: &mut [T], k: usize, left: usize, right: usize, key: &F)
where
    F: Fn(&T) -> f64,
{
    if items.is_empty() {
        return;
    }
    debug_assert!(
        left <= k && k <= right && right < items.len(),
        "quickselect rank {k} outside range {left}..={right} of {} items",
        items.len()
    );
    select_step(items, k as isize, left as isize, right as isize, key);
}

fn select_step<T, F>(items: &mut [T], k: isize, mut left: isize, mut right: isize, key: &F)
where
    F: Fn(&T) -> f64,
{
    while right > left {
        if right - left > SAMPLE_THRESHOLD {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = n.ln();
            let s = 0.5 * (2.0 * z / 3.0).exp();
            let sign = if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 };
            let sd = 0.5 * (z * s * (n - s) / n).sqrt() * sign;
            let kf = k as f64;
            let new_left = left.max((kf - m * s / n + sd).floor() as isize);
            let new_right = right.min((kf + (n - m) * s / n + sd).floor() as isize);
            select_step(items, k, new_left, new_right, key);
        }

        let t = key(&items[k as usize]);
        let mut i = left;
        let mut j = right;

        items.swap(left as usize, k as usize);
        if key(&items[right as usize]) > t {
            items.swap(left as usize, right as usize);
        }

        while i < j {
            items.swap(i as usize, j as usize);
            i += 1;
            j -= 1;
            while key(&items[i as usize]) < t {
                i += 1;
            }
            while key(&items[j as usize]) > t {
                j -= 1;
            }
        }

        if key(&items[left as usize]) == t {
            items.swap(left as usize, j as usize);
        } else {
            j += 1;
            items.swap(j as usize, right as usize);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

/// Partition `items[left..=right]` into consecutive groups of `group` elements
/// such that every key in one group is `<=` every key in the next.
///
/// Works on an explicit stack of half-open index ranges; each range longer
/// than one group is bisected at a multiple of `group` and the split point
/// fixed with [`quickselect`].
pub fn multi_select<T, F>(items: &mut [T], left: usize, right: usize, group: usize, key: &F)
where
    F: Fn(&T) -> f64,
{
    debug_assert!(group > 0, "multi_select group size must be positive");
    if items.is_empty() {
        return;
    }
    let mut stack = vec![(left, right + 1)];

    while let Some((lo, hi)) = stack.pop() {
        if hi - lo <= group {
            continue;
        }

        let mid = lo + (hi - lo).div_ceil(group * 2) * group;
        quickselect(items, mid, lo, hi - 1, key);

        stack.push((lo, mid));
        stack.push((mid, hi));
    }
}
