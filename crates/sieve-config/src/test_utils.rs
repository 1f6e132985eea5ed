/// Runs `f` with the given variables set (`Some`) or removed (`None`), then
/// restores whatever was there before.
pub fn with_env<F>(vars: &[(&str, Option<&str>)], f: F)
where
    F: FnOnce(),
{
    let saved: Vec<_> = vars
        .iter()
        .map(|(key, _)| (*key, std::env::var(key).ok()))
        .collect();

    for (key, value) in vars {
        set_or_remove(key, *value);
    }

    f();

    for (key, value) in saved {
        set_or_remove(key, value.as_deref());
    }
}

fn set_or_remove(key: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}
