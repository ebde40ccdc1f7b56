/// 2-letter ISO country code to flag emoji via Unicode regional indicator
/// symbols. Case-insensitive. Anything that is not exactly two ASCII letters
/// yields `None` — tooltips render no flag rather than a broken glyph.
pub fn flag_emoji(country_code: &str) -> Option<String> {
    let code = country_code.trim();
    if code.len() != 2 {
        return None;
    }

    let mut flag = String::with_capacity(8);
    for c in code.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let offset = c.to_ascii_uppercase() as u32 - 'A' as u32;
        flag.push(char::from_u32(0x1F1E6 + offset)?);
    }
    Some(flag)
}
