pub fn utf16_col_to_byte_col(line_content: &str, utf16_col: usize) -> usize {
    let mut curr_utf16 = 0;
    let mut curr_byte = 0;

    for c in line_content.chars() {
        if curr_utf16 >= utf16_col {
            break;
        }
        curr_utf16 += c.len_utf16();
        curr_byte += c.len_utf8();
    }
    curr_byte
}

pub fn byte_col_to_utf16_col(line_content: &str, byte_col: usize) -> usize {
    let mut curr_utf16 = 0;
    for (i, c) in line_content.char_indices() {
        if i >= byte_col {
            break;
        }
        curr_utf16 += c.len_utf16();
    }
    curr_utf16
}
