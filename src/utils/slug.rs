//! URL-safe slug generation

/// Turn a display name into a lowercase, accent-free, hyphenated slug.
pub fn slugify(nombre: &str) -> String {
    let mut out = String::with_capacity(nombre.len());
    let mut last_hyphen = true; // suppress leading hyphen

    for ch in nombre.chars().flat_map(char::to_lowercase) {
        let mapped = deaccent(ch);
        match mapped {
            'a'..='z' | '0'..='9' => {
                out.push(mapped);
                last_hyphen = false;
            }
            _ => {
                if !last_hyphen {
                    out.push('-');
                    last_hyphen = true;
                }
            }
        }
    }

    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Slug with a base36 timestamp suffix, guaranteeing uniqueness without a
/// lookup round-trip.
pub fn slugify_unique(nombre: &str, millis: i64) -> String {
    format!("{}-{}", slugify(nombre), to_base36(millis))
}

fn deaccent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

fn to_base36(mut value: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value <= 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
