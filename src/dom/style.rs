//! Inline `style` attribute editing.
//!
//! Declarations keep their original order; setting an existing property
//! replaces it in place, an empty value removes it.

/// Parse `a: b; c: d` into ordered `(property, value)` pairs.
pub fn parse(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            (!prop.is_empty() && !value.is_empty()).then(|| (prop, value.to_string()))
        })
        .collect()
}

/// Serialize declarations back into attribute text.
pub fn write(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(prop, value)| format!("{prop}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Look up a single property.
pub fn get(style: &str, prop: &str) -> Option<String> {
    let prop = prop.to_ascii_lowercase();
    parse(style)
        .into_iter()
        .find_map(|(p, v)| (p == prop).then_some(v))
}

/// Return `style` with `prop` set to `value` (removed when `value` is empty).
pub fn set(style: &str, prop: &str, value: &str) -> String {
    let prop = prop.to_ascii_lowercase();
    let value = value.trim();
    let mut decls = parse(style);

    match decls.iter().position(|(p, _)| *p == prop) {
        Some(pos) if value.is_empty() => {
            decls.remove(pos);
        }
        Some(pos) => decls[pos].1 = value.to_string(),
        None if value.is_empty() => {}
        None => decls.push((prop, value.to_string())),
    }

    write(&decls)
}
