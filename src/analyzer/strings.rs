//! Printable string extraction from decoded payloads

/// Runs of printable ASCII (`0x20..=0x7E`) at least `min_len` bytes long,
/// in buffer order, at most `max` of them
pub fn extract_printable(data: &[u8], min_len: usize, max: usize) -> Vec<String> {
    let mut strings = Vec::new();
    let mut start = None;

    for (index, &byte) in data.iter().enumerate() {
        if strings.len() >= max {
            return strings;
        }
        let printable = (0x20..=0x7E).contains(&byte);
        match (printable, start) {
            (true, None) => start = Some(index),
            (false, Some(from)) => {
                push_run(&mut strings, &data[from..index], min_len);
                start = None;
            }
            _ => {}
        }
    }

    if let Some(from) = start {
        if strings.len() < max {
            push_run(&mut strings, &data[from..], min_len);
        }
    }
    strings
}

fn push_run(strings: &mut Vec<String>, run: &[u8], min_len: usize) {
    if run.len() >= min_len {
        strings.push(String::from_utf8_lossy(run).into_owned());
    }
}
