//! Header line tokenizer.

/// Separator outside quotes: any whitespace or the 0x04 control byte.
#[inline]
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '\u{4}'
}

/// Split a header line into tokens.
///
/// Tokens are separated by runs of whitespace or `0x04`. A double quote
/// toggles quoting; separators inside quotes stay in the token, and the
/// quote characters themselves are kept, so
/// `Modules("Confocal C1 Grabber").BarrierFilter(2)` is one token.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if is_separator(c) && !in_quotes {
            if !token.is_empty() {
                tokens.push(std::mem::take(&mut token));
            }
            continue;
        }
        if c == '"' {
            in_quotes = !in_quotes;
        }
        token.push(c);
    }
    if !token.is_empty() {
        tokens.push(token);
    }
    tokens
}

/// Join `tokens[start..stop]` with single spaces, clamping to the slice.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S], start: usize, stop: usize) -> String {
    let stop = stop.min(tokens.len());
    if start >= stop {
        return String::new();
    }
    let mut out = String::new();
    for (i, t) in tokens[start..stop].iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(t.as_ref());
    }
    out
}
