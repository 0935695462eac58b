use std::io::{self, Write};

use crate::width::{display_width, pad_center, pad_right, truncate};

const DEFAULT_PADDING: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorderStyle {
    Ascii,
    #[default]
    Rounded,
    Double,
}

struct Border {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
    tee_left: char,
    tee_right: char,
}

impl BorderStyle {
    fn border(self) -> Border {
        match self {
            Self::Ascii => Border {
                top_left: '+',
                top_right: '+',
                bottom_left: '+',
                bottom_right: '+',
                horizontal: '-',
                vertical: '|',
                tee_left: '+',
                tee_right: '+',
            },
            Self::Rounded => Border {
                top_left: '╭',
                top_right: '╮',
                bottom_left: '╰',
                bottom_right: '╯',
                horizontal: '─',
                vertical: '│',
                tee_left: '├',
                tee_right: '┤',
            },
            Self::Double => Border {
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
                horizontal: '═',
                vertical: '║',
                tee_left: '╠',
                tee_right: '╣',
            },
        }
    }
}

/// A boxed startup banner: a centered title row, then optional
/// left-aligned detail lines below a separator.
///
/// ```ignore
/// Banner::new("kit-fetch")
///     .version(env!("CARGO_PKG_VERSION"))
///     .line("workers: 8")
///     .print();
/// ```
///
/// Widths are measured in terminal columns, so wide glyphs line up.
#[derive(Debug, Clone)]
pub struct Banner {
    title: String,
    version: Option<String>,
    lines: Vec<String>,
    min_width: usize,
    max_width: Option<usize>,
    padding: usize,
    style: BorderStyle,
}

impl Banner {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: None,
            lines: Vec::new(),
            min_width: 0,
            max_width: None,
            padding: DEFAULT_PADDING,
            style: BorderStyle::default(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Minimum width between the side borders.
    pub fn min_width(mut self, width: usize) -> Self {
        self.min_width = width;
        self
    }

    /// Maximum width between the side borders. Longer rows are truncated.
    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    pub fn style(mut self, style: BorderStyle) -> Self {
        self.style = style;
        self
    }

    fn title_row(&self) -> String {
        match &self.version {
            Some(version) => format!("{} v{}", self.title, version.trim_start_matches('v')),
            None => self.title.clone(),
        }
    }

    fn inner_width(&self, title: &str) -> usize {
        let widest = std::iter::once(title)
            .chain(self.lines.iter().map(String::as_str))
            .map(display_width)
            .max()
            .unwrap_or(0);
        let mut inner = (widest + 2 * self.padding).max(self.min_width);
        if let Some(max) = self.max_width {
            inner = inner.min(max.max(2 * self.padding + 1));
        }
        inner
    }

    pub fn render(&self) -> String {
        let b = self.style.border();
        let title = self.title_row();
        let inner = self.inner_width(&title);
        let text_width = inner - 2 * self.padding;
        let pad = " ".repeat(self.padding);
        let rule = b.horizontal.to_string().repeat(inner);

        let mut out = String::new();
        out.push_str(&format!("{}{rule}{}\n", b.top_left, b.top_right));

        let title = truncate(&title, text_width);
        out.push_str(&format!("{}{}{}\n", b.vertical, pad_center(&title, inner), b.vertical));

        if !self.lines.is_empty() {
            out.push_str(&format!("{}{rule}{}\n", b.tee_left, b.tee_right));
            for line in &self.lines {
                let line = truncate(line, text_width);
                out.push_str(&format!(
                    "{}{pad}{}{pad}{}\n",
                    b.vertical,
                    pad_right(&line, text_width),
                    b.vertical
                ));
            }
        }

        out.push_str(&format!("{}{rule}{}\n", b.bottom_left, b.bottom_right));
        out
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.render().as_bytes())?;
        w.flush()
    }

    /// Write to stderr so stdout stays clean for program output.
    pub fn print(&self) {
        let _ = self.write_to(&mut io::stderr().lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_title_only() {
        let out = Banner::new("hi").style(BorderStyle::Ascii).render();
        assert_eq!(out, "+------+\n|  hi  |\n+------+\n");
    }

    #[test]
    fn test_rounded_with_lines() {
        let out = Banner::new("app").line("a").line("bcd").padding(1).render();
        let expected = "\
╭─────╮
│ app │
├─────┤
│ a   │
│ bcd │
╰─────╯
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_version_is_appended_once() {
        let out = Banner::new("tool").version("v1.2.0").padding(0).style(BorderStyle::Ascii).render();
        assert!(out.contains("|tool v1.2.0|"));
        let out = Banner::new("tool").version("1.2.0").padding(0).style(BorderStyle::Ascii).render();
        assert!(out.contains("|tool v1.2.0|"));
    }

    #[test]
    fn test_odd_leftover_goes_right() {
        let out = Banner::new("ab").min_width(7).padding(0).style(BorderStyle::Ascii).render();
        assert!(out.contains("|  ab   |"), "{out}");
    }

    #[test]
    fn test_max_width_truncates_rows() {
        let out = Banner::new("title")
            .line("a very long detail line")
            .max_width(10)
            .padding(1)
            .style(BorderStyle::Double)
            .render();
        for row in out.lines() {
            assert_eq!(display_width(row), 12, "{row}");
        }
        assert!(out.contains("a very …"));
    }

    #[test]
    fn test_every_row_has_same_width_with_wide_glyphs() {
        let out = Banner::new("日本").line("x").lines(["ascii", "語"]).render();
        let widths: Vec<_> = out.lines().map(display_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_write_to_buffer() {
        let mut buf = Vec::new();
        Banner::new("x").write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), Banner::new("x").render());
    }
}
