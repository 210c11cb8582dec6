use crate::graphemes;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_LINES_SHOWN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption {
    pub name: String,
    pub description: Option<String>,
}

impl SelectionOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// One terminal row of an option's display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLine {
    pub option: usize,
    pub text: String,
    pub is_first: bool,
}

/// A row of the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Line(usize),
    Blank,
}

/// Lay options out as `name: description` rows, descriptions wrapped into a
/// column that starts after the longest name. An option without a description
/// still gets its padded `name: ` row.
pub fn compute_lines(options: &[SelectionOption], width: usize) -> Vec<RenderLine> {
    let longest = options
        .iter()
        .map(|o| graphemes::count(&o.name))
        .max()
        .unwrap_or(0);
    // Two columns for the cursor marker, two for ": ".
    let wrap_width = width.saturating_sub(longest + 4);

    let mut lines = Vec::new();
    for (idx, option) in options.iter().enumerate() {
        let rows = graphemes::wrap(option.description(), wrap_width);
        for (i, chunk) in rows.into_iter().enumerate() {
            let text = if i == 0 {
                let padding = " ".repeat(longest - graphemes::count(&option.name));
                format!("{}: {padding}{chunk}", option.name)
            } else {
                format!("{}  {chunk}", " ".repeat(longest))
            };
            lines.push(RenderLine {
                option: idx,
                text,
                is_first: i == 0,
            });
        }
    }
    lines
}

/// Per-grapheme flags for the parts of `name` matching `filter`, case-insensitively.
pub fn match_mask(name: &str, filter: &str) -> Vec<bool> {
    let filter = filter.to_lowercase();
    let filter_len = graphemes::count(&filter);
    let mut remaining = 0;
    let mut mask = Vec::new();
    for (i, _) in name.grapheme_indices(true) {
        if !filter.is_empty() && name[i..].to_lowercase().starts_with(&filter) {
            remaining = filter_len;
        }
        mask.push(remaining > 0);
        remaining = remaining.saturating_sub(1);
    }
    mask
}

/// Cursor, scroll offset and filter over a select prompt's rows.
#[derive(Debug, Clone)]
pub struct Viewport {
    lines: Vec<RenderLine>,
    names: Vec<String>,
    cursor: usize,
    offset: usize,
    filter: String,
    lines_shown: usize,
}

impl Viewport {
    /// `lines_shown` of zero means the default.
    pub fn new(options: &[SelectionOption], width: usize, lines_shown: usize) -> Self {
        let mut vp = Self {
            lines: compute_lines(options, width),
            names: options.iter().map(|o| o.name.to_lowercase()).collect(),
            cursor: 0,
            offset: 0,
            filter: String::new(),
            lines_shown,
        };
        vp.offset = vp.lines_to_show() / 2;
        vp
    }

    /// Lay out again for a new width, keeping the selected option and filter.
    pub fn relayout(&mut self, options: &[SelectionOption], width: usize) {
        let selected = self.cursor_option();
        self.lines = compute_lines(options, width);
        self.names = options.iter().map(|o| o.name.to_lowercase()).collect();
        self.cursor = self
            .lines
            .iter()
            .position(|l| l.is_first && l.option == selected)
            .unwrap_or(0);
        self.offset = self.lines_to_show() / 2;
    }

    pub fn lines(&self) -> &[RenderLine] {
        &self.lines
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_option(&self) -> usize {
        self.lines.get(self.cursor).map_or(0, |l| l.option)
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn matches(&self, option: usize) -> bool {
        self.filter.is_empty() || self.names[option].contains(&self.filter.to_lowercase())
    }

    pub fn match_count(&self) -> usize {
        (0..self.names.len()).filter(|&i| self.matches(i)).count()
    }

    pub fn lines_to_show(&self) -> usize {
        let n = match self.lines_shown {
            0 => DEFAULT_LINES_SHOWN,
            n => n,
        };
        n.min(self.lines.len())
    }

    pub fn move_up(&mut self) {
        self.step(false);
    }

    pub fn move_down(&mut self) {
        self.step(true);
    }

    fn step(&mut self, forward: bool) {
        if self.match_count() <= 1 {
            return;
        }
        let len = self.lines.len();
        loop {
            self.cursor = if forward {
                (self.cursor + 1) % len
            } else {
                (self.cursor + len - 1) % len
            };
            let line = &self.lines[self.cursor];
            if line.is_first && self.matches(line.option) {
                break;
            }
        }
    }

    /// Narrow the filter. A cursor left on a non-matching option jumps to the
    /// nearest matching one; with nothing matching it stays put.
    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        if self.match_count() == 0 || self.matches(self.cursor_option()) {
            return;
        }
        let nearest = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_first && self.matches(l.option))
            .min_by_key(|(i, _)| i.abs_diff(self.cursor))
            .map(|(i, _)| i);
        if let Some(i) = nearest {
            self.cursor = i;
        }
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
    }

    /// The rows to draw under the header, starting `offset - n/2` rows from the
    /// cursor. Filtered-out rows are skipped; once the walk comes back around
    /// to its first row the rest is blank, so the height stays fixed.
    pub fn window(&self) -> Vec<Row> {
        let n = self.lines_to_show();
        if n == 0 {
            return Vec::new();
        }
        let len = self.lines.len() as isize;
        let at = |off: isize| (self.cursor as isize + off).rem_euclid(len) as usize;

        let mut start = self.offset as isize - (n / 2) as isize;
        let mut end = start + n as isize - 1;
        let mut blank = false;
        if self.match_count() == 0 {
            // The filter itself takes the first row.
            blank = true;
            start += 1;
        }

        let first = at(start);
        let mut rows = Vec::with_capacity(n);
        let mut off = start;
        while off <= end {
            let idx = at(off);
            if off != start && idx == first {
                blank = true;
            }
            if blank {
                rows.push(Row::Blank);
            } else if self.matches(self.lines[idx].option) {
                rows.push(Row::Line(idx));
            } else {
                end += 1;
            }
            off += 1;
        }
        rows
    }
}
