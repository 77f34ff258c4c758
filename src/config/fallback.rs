// src/config/fallback.rs

/// Fill keys missing from `target` with those of `fallback`, merging nested
/// tables. Values already present in `target` always win. Top-level keys
/// listed in `skip` are never taken from the fallback.
pub fn apply_fallback(target: &mut toml::Table, fallback: &toml::Table, skip: &[&str]) {
    for (key, value) in fallback {
        if skip.contains(&key.as_str()) {
            continue;
        }
        match (target.get_mut(key), value) {
            (None, _) => {
                target.insert(key.clone(), value.clone());
            }
            (Some(toml::Value::Table(existing)), toml::Value::Table(fallback_table)) => {
                apply_fallback(existing, fallback_table, &[]);
            }
            (Some(_), _) => {}
        }
    }
}

