//! Reverse-chronological pagination over ordered history.

/// Return one page of `items` with the newest entries first.
///
/// `items` is assumed to be ordered oldest to newest; `page` is 1-based.
/// Out-of-range pages and zero arguments yield an empty vec, never an error.
pub fn reverse_paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Vec<T> {
    if page == 0 || per_page == 0 || items.is_empty() {
        return Vec::new();
    }
    let skip = (page - 1).saturating_mul(per_page);
    if skip >= items.len() {
        return Vec::new();
    }
    items.iter().rev().skip(skip).take(per_page).cloned().collect()
}
