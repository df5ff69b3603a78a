#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Picks the delimiter from the first physical line only.
///
/// Semicolon wins when it outnumbers commas and is at least as common as tabs;
/// tab wins when it strictly outnumbers both; otherwise comma.
pub fn detect_delimiter(first_line: &str) -> Delimiter {
    let line = first_line.lines().next().unwrap_or("");
    let commas = line.matches(',').count();
    let semicolons = line.matches(';').count();
    let tabs = line.matches('\t').count();

    if semicolons > commas && semicolons >= tabs {
        Delimiter::Semicolon
    } else if tabs > commas && tabs > semicolons {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}

/// Returns the first physical line of an upload (without the line terminator).
pub fn first_line(content: &[u8]) -> String {
    let end = content
        .iter()
        .position(|b| *b == b'\n')
        .unwrap_or(content.len());
    let line = String::from_utf8_lossy(&content[..end]);
    line.trim_end_matches('\r').to_string()
}
