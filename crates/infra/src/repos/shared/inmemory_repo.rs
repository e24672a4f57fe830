use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = lock(collection);
    collection.push(val.clone());
}

pub fn insert_many<T: Clone>(vals: &[T], collection: &Mutex<Vec<T>>) {
    let mut collection = lock(collection);
    collection.extend_from_slice(vals);
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    let collection = lock(collection);
    collection.iter().filter(|item| compare(item)).cloned().collect()
}

/// Lock that ignores poisoning
fn lock<T>(collection: &Mutex<Vec<T>>) -> std::sync::MutexGuard<'_, Vec<T>> {
    collection
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
