//! Helpers for fixed-width CLI tables.
//!
//! Cisco tables align every cell below its header: left-aligned columns start where the header
//! starts, right-aligned (numeric) columns end where the header ends.

/// A header cell and its position in the header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub right_aligned: bool,
}

/// Column layout of a table, read from its header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    columns: Vec<Column>,
}

impl TableHeader {
    /// Locates every header in `line`, in the given order. Returns `None` if any header is
    /// missing or out of order, meaning `line` is not the header of this table.
    pub fn locate(line: &str, headers: &[(&'static str, bool)]) -> Option<Self> {
        let mut columns = Vec::with_capacity(headers.len());
        let mut offset = 0;
        for &(name, right_aligned) in headers {
            let start = offset + line.get(offset..)?.find(name)?;
            let end = start + name.len();
            columns.push(Column {
                name,
                start,
                end,
                right_aligned,
            });
            offset = end;
        }
        Some(Self { columns })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Start offset of `name`, or `usize::MAX` if the table has no such column.
    pub fn start_of(&self, name: &str) -> usize {
        self.column(name).map(|c| c.start).unwrap_or(usize::MAX)
    }

    /// The right-aligned column whose header ends closest to `token_end`.
    pub fn nearest_right_aligned(&self, token_end: usize) -> Option<&Column> {
        self.columns
            .iter()
            .filter(|c| c.right_aligned)
            .min_by_key(|c| c.end.abs_diff(token_end))
    }
}

/// A whitespace-delimited token together with its byte span in the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

pub fn tokens(line: &str) -> Vec<Token<'_>> {
    let mut result = Vec::new();
    let mut start = None;
    for (pos, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                result.push(Token {
                    text: &line[s..pos],
                    start: s,
                    end: pos,
                });
                start = None;
            }
            (false, None) => start = Some(pos),
            _ => {}
        }
    }
    if let Some(s) = start {
        result.push(Token {
            text: &line[s..],
            start: s,
            end: line.len(),
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: [(&str, bool); 3] = [("Name", false), ("Count", true), ("Note", false)];

    #[test]
    fn test_locate_header() {
        let header = TableHeader::locate("  Name     Count Note", &HEADERS).unwrap();
        assert_eq!(header.start_of("Name"), 2);
        assert_eq!(header.column("Count").unwrap().end, 16);
        assert_eq!(header.start_of("Note"), 17);
        assert_eq!(header.start_of("Missing"), usize::MAX);
    }

    #[test]
    fn test_locate_rejects_other_lines() {
        assert!(TableHeader::locate("Count Name Note", &HEADERS).is_none());
        assert!(TableHeader::locate("", &HEADERS).is_none());
    }

    #[test]
    fn test_tokens_keep_spans() {
        let toks = tokens(" *>  10.0.0.0/8   1");
        let texts: Vec<_> = toks.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["*>", "10.0.0.0/8", "1"]);
        assert_eq!((toks[1].start, toks[1].end), (5, 15));
        assert_eq!(toks[2].end, 19);
    }
}
