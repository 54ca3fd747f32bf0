use std::borrow::Cow;

/// Native positional placeholder marker of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// SQLite-style placeholders like `?1`.
    Sqlite,
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
}

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }
    if idx < bytes.len() && bytes[idx] == b'$' {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

fn matches_dollar_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    end < bytes.len()
        && bytes[idx + 1..=end].starts_with(tag.as_bytes())
        && bytes.get(end) == Some(&b'$')
}

/// Rewrite portable `?` placeholders to the driver's positional marker.
///
/// `?` becomes `?1`, `?2`, … for [`PlaceholderStyle::Sqlite`] and `$1`, `$2`,
/// … for [`PlaceholderStyle::Postgres`], numbered left to right. A `?` that is
/// already followed by a digit is assumed native and left alone, as is any `?`
/// inside quoted strings, comments, or dollar-quoted blocks. Translation uses
/// a lightweight state machine; for dialect-heavy SQL (e.g., procedure
/// bodies), prefer writing the native markers yourself.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str, style: PlaceholderStyle) -> Cow<'_, str> {
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut state = State::Normal;
    let mut next_index: usize = 1;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match state.clone() {
            State::Normal => {
                if b == b'?' && !bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                    let buf = out.get_or_insert_with(|| {
                        let mut s = String::with_capacity(sql.len() + 8);
                        s.push_str(&sql[..i]);
                        s
                    });
                    match style {
                        PlaceholderStyle::Sqlite => buf.push('?'),
                        PlaceholderStyle::Postgres => buf.push('$'),
                    }
                    buf.push_str(&next_index.to_string());
                    next_index += 1;
                    i += 1;
                    continue;
                }
                match b {
                    b'\'' => state = State::SingleQuoted,
                    b'"' => state = State::DoubleQuoted,
                    b'-' if is_line_comment_start(bytes, i) => state = State::LineComment,
                    b'/' if is_block_comment_start(bytes, i) => {
                        state = State::BlockComment(1);
                        if let Some(buf) = out.as_mut() {
                            buf.push_str(&sql[i..i + 2]);
                        }
                        i += 2;
                        continue;
                    }
                    b'$' => {
                        if let Some((tag, tag_end)) = try_start_dollar_quote(bytes, i) {
                            if let Some(buf) = out.as_mut() {
                                buf.push_str(&sql[i..=tag_end]);
                            }
                            i = tag_end + 1;
                            state = State::DollarQuoted(tag);
                            continue;
                        }
                    }
                    _ => {}
                }
            }
            State::SingleQuoted => {
                if b == b'\'' {
                    state = State::Normal;
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, i) {
                    state = State::BlockComment(depth + 1);
                    if let Some(buf) = out.as_mut() {
                        buf.push_str(&sql[i..i + 2]);
                    }
                    i += 2;
                    continue;
                }
                if is_block_comment_end(bytes, i) {
                    state = if depth > 1 {
                        State::BlockComment(depth - 1)
                    } else {
                        State::Normal
                    };
                    if let Some(buf) = out.as_mut() {
                        buf.push_str(&sql[i..i + 2]);
                    }
                    i += 2;
                    continue;
                }
            }
            State::DollarQuoted(tag) => {
                if b == b'$' && matches_dollar_tag(bytes, i, &tag) {
                    let end = i + 1 + tag.len();
                    if let Some(buf) = out.as_mut() {
                        buf.push_str(&sql[i..=end]);
                    }
                    i = end + 1;
                    state = State::Normal;
                    continue;
                }
            }
        }

        if let Some(buf) = out.as_mut() {
            // Push the current byte's full character; multi-byte chars never
            // match any of the ASCII state triggers above.
            let ch_len = utf8_len(b);
            buf.push_str(&sql[i..i + ch_len]);
            i += ch_len;
        } else {
            i += utf8_len(b);
        }
    }

    match out {
        Some(s) => Cow::Owned(s),
        None => Cow::Borrowed(sql),
    }
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_left_to_right() {
        assert_eq!(
            translate_placeholders("select * from t where a=? and b=?", PlaceholderStyle::Sqlite),
            "select * from t where a=?1 and b=?2"
        );
        assert_eq!(
            translate_placeholders("insert into t (a, b) values (?, ?)", PlaceholderStyle::Postgres),
            "insert into t (a, b) values ($1, $2)"
        );
    }

    #[test]
    fn untouched_sql_borrows() {
        let sql = "select 1";
        assert!(matches!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn skips_strings_and_comments() {
        let sql = "select '?' as q, \"?col\" from t -- where x=?\nwhere y=? /* and z=? */";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "select '?' as q, \"?col\" from t -- where x=?\nwhere y=$1 /* and z=? */"
        );
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "select $body$ a ? b $body$ where c=?";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "select $body$ a ? b $body$ where c=$1"
        );
    }

    #[test]
    fn native_numbered_markers_left_alone() {
        let sql = "select * from t where a=?1";
        assert!(matches!(
            translate_placeholders(sql, PlaceholderStyle::Sqlite),
            Cow::Borrowed(_)
        ));
    }
}
