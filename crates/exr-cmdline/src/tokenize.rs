#![forbid(unsafe_code)]

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Index of the quote closing a literal opened at `open`. The literal needs
/// at least one character and never spans a newline.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let first = chars.get(open + 1)?;
    if *first == '\n' {
        return None;
    }
    for (idx, &ch) in chars.iter().enumerate().skip(open + 2) {
        if is_quote(ch) {
            return Some(idx);
        }
        if ch == '\n' {
            return None;
        }
    }
    None
}

fn flush(word: &mut String, out: &mut Vec<String>) {
    if !word.is_empty() {
        out.push(std::mem::take(word));
    }
}

/// Splits one fragment on whitespace, keeping quoted literals as single
/// tokens with their quotes removed. Empty tokens are dropped.
pub fn split_fragment_into(fragment: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = fragment.chars().collect();
    let mut word = String::new();
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        if is_quote(ch) {
            if let Some(end) = closing_quote(&chars, idx) {
                flush(&mut word, out);
                out.push(chars[idx + 1..end].iter().collect());
                idx = end + 1;
                continue;
            }
        }

        if ch.is_whitespace() {
            flush(&mut word, out);
        } else {
            word.push(ch);
        }
        idx += 1;
    }
    flush(&mut word, out);
}

#[must_use]
pub fn split_fragment(fragment: &str) -> Vec<String> {
    let mut out = Vec::new();
    split_fragment_into(fragment, &mut out);
    out
}

#[must_use]
pub fn split_fragments<S: AsRef<str>>(fragments: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(fragments.len() * 2);
    for fragment in fragments {
        split_fragment_into(fragment.as_ref(), &mut out);
    }
    out
}
