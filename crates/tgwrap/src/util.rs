use std::path::MAIN_SEPARATOR;

const URL_MASKS: &[(&str, &str)] = &[("?ref=", "<ref-place-holder>")];

/// Split `s` on `sep` without breaking `?ref=` query strings of module URLs.
pub fn split_urls(s: &str, sep: &str) -> Vec<String> {
    let mut masked = s.to_string();
    for (src, mask) in URL_MASKS {
        masked = masked.replace(src, mask);
    }
    masked
        .split(sep)
        .map(|part| {
            URL_MASKS
                .iter()
                .fold(part.to_string(), |acc, (src, mask)| acc.replace(mask, src))
        })
        .collect()
}

/// Forward slashes regardless of platform.
pub fn to_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}
