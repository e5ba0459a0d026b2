/// Normalizes chapter content text extracted from PDFs into paragraphs.
///
/// The extraction format carries no structural markup: runs of two or more
/// newlines are the only paragraph-boundary signal, while single newlines
/// inside a chunk are column-width line-wrap artifacts. Splitting on the
/// double-newline boundary and then collapsing all remaining whitespace to
/// single spaces recovers flowing prose without altering any text content.
pub fn normalize_content(raw: &str) -> Vec<String> {
    raw.split("\n\n")
        .map(|chunk| chunk.split_whitespace().collect::<Vec<&str>>().join(" "))
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}
