/// Splits `text` so that every line fits in `max_line_length` characters where possible.
///
/// Explicit line breaks are kept. Lines that already fit are returned verbatim,
/// overflowing whitespace-only lines become empty, and a single word longer than
/// the budget is left whole on its own line.
pub fn wrap(text: &str, max_line_length: usize) -> String {
    let mut result: Vec<String> = Vec::new();

    for line in text.split('\n') {
        if char_len(line) <= max_line_length {
            result.push(line.to_string());
            continue;
        }

        if line.chars().all(char::is_whitespace) {
            result.push(String::new());
            continue;
        }

        let mut words = line.split(' ');
        let mut current = words.next().unwrap_or_default().to_string();
        let mut current_len = char_len(&current);
        for word in words {
            let word_len = char_len(word);
            if current_len + word_len + 1 > max_line_length {
                result.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            } else {
                current.push(' ');
                current.push_str(word);
                current_len += word_len + 1;
            }
        }
        result.push(current);
    }

    result.join("\n")
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}
