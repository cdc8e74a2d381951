/// Concatenates rendered fragments in order, without separators.
pub fn assemble<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .fold(String::new(), |mut markup, fragment| {
            markup.push_str(fragment.as_ref());
            markup
        })
}
