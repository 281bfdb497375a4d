use std::collections::HashMap;

/// One data line of the program CSV, keyed by lower-cased header name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into().to_lowercase(), value.into()))
                .collect(),
        }
    }

    /// Looks a column up by name. Names are matched case-insensitively and
    /// missing columns read as the empty string.
    pub fn get(&self, column: &str) -> &str {
        if let Some(value) = self.values.get(column) {
            return value;
        }
        self.values
            .get(&column.to_lowercase())
            .map_or("", String::as_str)
    }
}

/// Splits one CSV line into trimmed fields.
///
/// Quoted fields may contain the delimiter, and `""` inside quotes is a
/// literal quote. Unbalanced quotes are tolerated: the scan simply runs to the
/// end of the line in whatever mode it is in.
pub fn tokenize_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
            continue;
        }

        if ch == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
            continue;
        }

        current.push(ch);
    }
    fields.push(current);

    fields
        .into_iter()
        .map(|field| field.trim().to_string())
        .collect()
}

/// Parses a whole CSV document into rows. The first non-blank line is the
/// header; every later non-blank line becomes one row, in input order.
pub fn parse_table(text: &str, delimiter: char) -> Vec<Row> {
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).trim())
        .filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };

    let headers = tokenize_line(header_line, delimiter);

    lines
        .map(|line| {
            let mut fields = tokenize_line(line, delimiter).into_iter();
            Row::from_pairs(
                headers
                    .iter()
                    .map(|header| (header.as_str(), fields.next().unwrap_or_default())),
            )
        })
        .collect()
}
