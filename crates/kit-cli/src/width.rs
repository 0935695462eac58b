use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Terminal columns occupied by `s` (wide CJK glyphs count as two).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

pub fn pad_right(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(fill))
}

/// Center `s` in `width` columns. An odd leftover column goes on the right.
pub fn pad_center(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    let left = fill / 2;
    format!("{}{s}{}", " ".repeat(left), " ".repeat(fill - left))
}

/// Cut `s` to at most `width` columns, ending in `…` when shortened.
pub fn truncate(s: &str, width: usize) -> Cow<'_, str> {
    if display_width(s) <= width {
        return Cow::Borrowed(s);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}
