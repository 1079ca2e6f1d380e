/// Remove HTML/XML tags, keeping text content. A `<` followed by whitespace
/// or at the end of input is literal text; an unterminated tag swallows the
/// rest of the input.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_tag = false;
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if in_tag {
            match (quote, ch) {
                (Some(open), _) if ch == open => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '>') => in_tag = false,
                (None, _) => {}
            }
            continue;
        }

        if ch == '<' && chars.peek().is_some_and(|next| !next.is_whitespace()) {
            in_tag = true;
        } else {
            out.push(ch);
        }
    }
    out
}
