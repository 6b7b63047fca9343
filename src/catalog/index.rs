use std::collections::HashMap;

use super::types::{Category, CategoryId};

/// Category id -> display label.
pub type CategoryIndex = HashMap<CategoryId, String>;

/// Build a lookup from category id to label.
///
/// Duplicate ids are not rejected: the record seen last wins.
pub fn build_category_index(categories: &[Category]) -> CategoryIndex {
    let mut index = HashMap::with_capacity(categories.len());
    for category in categories {
        index.insert(category.id, category.label.clone());
    }
    index
}
