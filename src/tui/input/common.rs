use crate::util::unicode;

/// Single-field text editing on a buffer with a byte-offset cursor.
pub(super) enum TextEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Apply an edit. Home/End stay on the cursor's line in multi-line text.
pub(super) fn apply_text_edit(buf: &mut String, cursor: &mut usize, edit: TextEdit) {
    *cursor = (*cursor).min(buf.len());
    match edit {
        TextEdit::Insert(c) => {
            buf.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        TextEdit::Backspace => {
            if let Some(prev) = unicode::prev_grapheme_boundary(buf, *cursor) {
                buf.replace_range(prev..*cursor, "");
                *cursor = prev;
            }
        }
        TextEdit::Delete => {
            if let Some(next) = unicode::next_grapheme_boundary(buf, *cursor) {
                buf.replace_range(*cursor..next, "");
            }
        }
        TextEdit::Left => {
            if let Some(prev) = unicode::prev_grapheme_boundary(buf, *cursor) {
                *cursor = prev;
            }
        }
        TextEdit::Right => {
            if let Some(next) = unicode::next_grapheme_boundary(buf, *cursor) {
                *cursor = next;
            }
        }
        TextEdit::Home => {
            *cursor = buf[..*cursor].rfind('\n').map_or(0, |i| i + 1);
        }
        TextEdit::End => {
            *cursor += buf[*cursor..].find('\n').unwrap_or(buf.len() - *cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, cursor: usize, edits: Vec<TextEdit>) -> (String, usize) {
        let mut buf = text.to_string();
        let mut cur = cursor;
        for e in edits {
            apply_text_edit(&mut buf, &mut cur, e);
        }
        (buf, cur)
    }

    #[test]
    fn insert_and_backspace() {
        assert_eq!(
            run("ac", 1, vec![TextEdit::Insert('b')]),
            ("abc".to_string(), 2)
        );
        assert_eq!(run("abc", 3, vec![TextEdit::Backspace]), ("ab".to_string(), 2));
        assert_eq!(run("abc", 0, vec![TextEdit::Backspace]), ("abc".to_string(), 0));
    }

    #[test]
    fn graphemes_move_as_one() {
        let s = "a🎉b";
        assert_eq!(run(s, 1, vec![TextEdit::Right]).1, 5);
        assert_eq!(run(s, 5, vec![TextEdit::Backspace]), ("ab".to_string(), 1));
        assert_eq!(run(s, 1, vec![TextEdit::Delete]), ("ab".to_string(), 1));
    }

    #[test]
    fn home_end_stay_on_line() {
        let s = "one\ntwo\nthree";
        assert_eq!(run(s, 5, vec![TextEdit::Home]).1, 4);
        assert_eq!(run(s, 5, vec![TextEdit::End]).1, 7);
        assert_eq!(run(s, 9, vec![TextEdit::End]).1, s.len());
        assert_eq!(run("abc", 2, vec![TextEdit::Home]).1, 0);
    }
}
