use workflow::OptionError;

/// Parse a boolean option value.
#[rustfmt::skip]
pub fn parse_bool(name: &str, value: &str) -> Result<bool, OptionError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true"  | "yes" | "on"  | "1" => Ok(true),
        "false" | "no"  | "off" | "0" => Ok(false),
        _ => Err(OptionError::invalid(name, value, "expected true or false")),
    }
}

/// Parse a 1-based index.
pub fn parse_index(name: &str, value: &str) -> Result<usize, OptionError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(OptionError::invalid(name, value, "indices start at 1")),
        Ok(i) => Ok(i),
        Err(e) => Err(OptionError::invalid(name, value, e)),
    }
}

/// Split a list option on commas and whitespace.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
