use serde_json::Value as JsonValue;

/// Renders a number the way a JavaScript engine stringifies it
/// (shortest round-trip digits, exponent form outside `1e-7..1e21`).
pub fn format_js_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    if x == 0.0 {
        return "0".to_string();
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let sci = format!("{:e}", x.abs());
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let exp_sign = if n - 1 < 0 { "-" } else { "+" };
        if k == 1 {
            format!("{}e{}{}", digits, exp_sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", &digits[..1], &digits[1..], exp_sign, (n - 1).abs())
        }
    };

    format!("{}{}", sign, body)
}

/// `Number.prototype.toFixed`: nearest representation with `decimals` digits,
/// exact ties rounded away from zero.
pub fn to_fixed(x: f64, decimals: usize) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.abs() >= 1e21 || x.is_infinite() {
        return format_js_number(x);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let ax = x.abs();

    let wide = format!("{:.*}", decimals + 30, ax);
    let dot = wide.find('.').unwrap_or(wide.len());
    let cut = if decimals == 0 { dot } else { dot + 1 + decimals };
    let head = &wide[..cut];
    let tail = wide[cut..].trim_start_matches('.');

    let is_tie = tail.starts_with('5') && tail[1..].chars().all(|c| c == '0');
    let body = if is_tie { increment_decimal(head) } else { format!("{:.*}", decimals, ax) };

    format!("{}{}", sign, body)
}

fn increment_decimal(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();
    let mut i = chars.len();
    while i > 0 {
        i -= 1;
        match chars[i] {
            '.' => continue,
            '9' => chars[i] = '0',
            c => {
                chars[i] = ((c as u8) + 1) as char;
                return chars.into_iter().collect();
            }
        }
    }
    let mut out = String::with_capacity(chars.len() + 1);
    out.push('1');
    out.extend(chars);
    out
}

/// JavaScript truthiness of a JSON value.
pub fn js_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// JavaScript `String(value)` for a JSON value.
pub fn js_display(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.as_f64().map(format_js_number).unwrap_or_else(|| n.to_string()),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| if item.is_null() { String::new() } else { js_display(item) })
            .collect::<Vec<_>>()
            .join(","),
        JsonValue::Object(_) => "[object Object]".to_string(),
    }
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse_segments(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }
        while let Some(stripped) = rest.strip_prefix('[') {
            let close = stripped.find(']')?;
            let index = stripped[..close].trim().parse::<usize>().ok()?;
            segments.push(Segment::Index(index));
            rest = &stripped[close + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(segments)
}

/// Picks a nested value by a dotted path such as `person.addresses[0].city`.
pub fn pick<'a>(root: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = root;
    for segment in parse_segments(path)? {
        current = match (segment, current) {
            (Segment::Key(key), JsonValue::Object(map)) => map.get(key)?,
            (Segment::Key(key), JsonValue::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
            (Segment::Index(i), JsonValue::Array(items)) => items.get(i)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Normalizes a data-model field reference into a dotted path.
///
/// Accepts both dotted paths and schema-pointer style references
/// (`#/properties/person/properties/age`).
pub fn normalize_field_path(field: &str) -> String {
    match field.strip_prefix("#/").or_else(|| field.strip_prefix('/')) {
        Some(pointer) => pointer
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != "properties" && *seg != "items")
            .collect::<Vec<_>>()
            .join("."),
        None => field.to_string(),
    }
}
