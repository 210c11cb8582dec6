use crate::graphemes;

/// Cursor-addressable multi-line text buffer used by the text and boolean prompts.
pub trait TextEdit {
    fn insert(&mut self, c: char);
    fn left(&mut self);
    fn right(&mut self);
    fn up(&mut self);
    fn down(&mut self);
    fn backspace(&mut self);
    fn home(&mut self);
    fn end(&mut self);
    fn newline(&mut self);
    fn set_width(&mut self, width: usize);
    /// Columns already taken on the first visual row by whatever precedes the text.
    fn set_first_line_indent(&mut self, indent: usize);
    /// Visual row of the cursor after soft wrapping.
    fn cursor_row(&self) -> usize;
    /// Visual column of the cursor, including the first-line indent on row 0.
    fn cursor_col(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn paragraphs(&self) -> &[String];
    fn cursor_on_last_paragraph(&self) -> bool;
    /// Soft-wrapped contents, one visual row per line.
    fn text(&self) -> String;
    fn grapheme_count(&self) -> usize;
}

/// Paragraph-based text buffer with a grapheme-indexed cursor.
#[derive(Debug, Clone)]
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    col: usize, // grapheme index (not byte)
    width: usize,
    indent: usize,
}

impl TextArea {
    pub fn new(width: usize) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            width,
            indent: 0,
        }
    }

    /// Rows a paragraph occupies, as `(grapheme_start, text)` pairs.
    fn chunks(&self, li: usize) -> Vec<(usize, String)> {
        let line = &self.lines[li];
        if self.width == 0 {
            return vec![(0, line.clone())];
        }
        let mut out = Vec::new();
        let mut start = 0;
        let mut rest = line.as_str();
        if li == 0 && self.indent > 0 {
            let first_cap = self.width.saturating_sub(self.indent);
            let split = graphemes::byte_offset(rest, first_cap);
            out.push((0, rest[..split].to_string()));
            start = graphemes::count(&rest[..split]);
            rest = &rest[split..];
            if rest.is_empty() {
                return out;
            }
        }
        for chunk in graphemes::wrap(rest, self.width) {
            let len = graphemes::count(&chunk);
            out.push((start, chunk));
            start += len;
        }
        out
    }

    /// Visual rows plus the cursor's visual `(row, col)`.
    fn layout(&self) -> (Vec<String>, (usize, usize)) {
        let mut visual = Vec::new();
        let mut cursor = (0, 0);

        for li in 0..self.lines.len() {
            let vis_start = visual.len();
            let chunks = self.chunks(li);
            if li == self.row {
                cursor = self.locate(&chunks, vis_start);
            }
            visual.extend(chunks.into_iter().map(|(_, text)| text));
        }

        (visual, cursor)
    }

    fn locate(&self, chunks: &[(usize, String)], vis_start: usize) -> (usize, usize) {
        let on_first = self.row == 0;
        let offset = |k: usize| if on_first && k == 0 { self.indent } else { 0 };
        for (k, (start, text)) in chunks.iter().enumerate() {
            let end = start + graphemes::count(text);
            if self.col < end {
                return (vis_start + k, offset(k) + self.col - start);
            }
        }
        let k = chunks.len() - 1;
        let (start, _) = &chunks[k];
        (vis_start + k, offset(k) + self.col - start)
    }

    fn line_len(&self) -> usize {
        graphemes::count(&self.lines[self.row])
    }
}

impl TextEdit for TextArea {
    fn insert(&mut self, c: char) {
        let line = &mut self.lines[self.row];
        let byte = graphemes::byte_offset(line, self.col);
        line.insert(byte, c);
        // A combining mark joins the previous cluster instead of adding one.
        self.col = graphemes::count(&line[..byte + c.len_utf8()]);
    }

    fn left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len();
        }
    }

    fn right(&mut self) {
        if self.col < self.line_len() {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    fn up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len());
        }
    }

    fn down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len());
        }
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let start = graphemes::byte_offset(line, self.col - 1);
            let end = graphemes::byte_offset(line, self.col);
            line.replace_range(start..end, "");
            self.col -= 1;
        } else if self.row > 0 {
            let removed = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len();
            self.lines[self.row].push_str(&removed);
        }
    }

    fn home(&mut self) {
        self.col = 0;
    }

    fn end(&mut self) {
        self.col = self.line_len();
    }

    fn newline(&mut self) {
        let byte = graphemes::byte_offset(&self.lines[self.row], self.col);
        let rest = self.lines[self.row].split_off(byte);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, rest);
    }

    fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    fn set_first_line_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    fn cursor_row(&self) -> usize {
        let (_, (row, _)) = self.layout();
        row
    }

    fn cursor_col(&self) -> usize {
        let (_, (_, col)) = self.layout();
        col
    }

    fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    fn paragraphs(&self) -> &[String] {
        &self.lines
    }

    fn cursor_on_last_paragraph(&self) -> bool {
        self.row + 1 == self.lines.len()
    }

    fn text(&self) -> String {
        self.layout().0.join("\n")
    }

    fn grapheme_count(&self) -> usize {
        self.lines.iter().map(|l| graphemes::count(l)).sum()
    }
}
