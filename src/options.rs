use itertools::Itertools;
use unicode_width::UnicodeWidthStr;

pub const DEFAULT_OPTIONS_TEXT: &str = "Option 1, Option 2, Option 3";
pub const SAMPLE_OPTIONS_TEXT: &str = "Pizza\nBurger\nSushi\nTacos\nPasta";

const DELIMITERS: [char; 4] = [',', ';', '\n', '|'];
const ELLIPSIS: &str = "...";

/// Splits free text on any run of `,` `;` `\n` `|` and keeps the trimmed,
/// non-empty pieces in order.
pub fn parse_input(input: &str) -> Vec<String> {
    input
        .split(|c: char| DELIMITERS.contains(&c))
        .map(str::trim)
        .filter(|opt| !opt.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Drops whitespace-only entries and trims the rest.
pub fn sanitize<I, S>(options: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    options
        .into_iter()
        .filter_map(|opt| {
            let trimmed = opt.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .collect()
}

/// Inverse of [`parse_input`] for showing an option list back in the editor.
pub fn join_options(options: &[String]) -> String {
    options.iter().join(", ")
}

pub fn max_label_chars(segment_count: usize) -> usize {
    if segment_count > 8 { 10 } else { 14 }
}

/// Truncates a segment label the way the wheel shows it: crowded wheels get
/// shorter labels, and anything cut gets a trailing ellipsis.
pub fn truncate_label(option: &str, segment_count: usize) -> String {
    let max_chars = max_label_chars(segment_count);
    if option.chars().count() > max_chars {
        let head: String = option.chars().take(max_chars).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        option.to_owned()
    }
}

/// Terminal column width of a label.
pub fn display_width(label: &str) -> usize {
    UnicodeWidthStr::width(label)
}
