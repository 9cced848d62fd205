/// Whether `item` is present in `list`, by exact string equality.
pub fn contains<S: AsRef<str>>(list: &[S], item: &str) -> bool {
    list.iter().any(|entry| entry.as_ref() == item)
}
