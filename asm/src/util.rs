use crate::object::Assembly;
use color_print::cformat;
use std::collections::HashMap;

/// Print a listing: address, emitted bytes, line number and source.
pub fn print_dump(path: &str, source: &str, asm: &Assembly) {
    let by_line: HashMap<usize, _> = asm.lines.iter().map(|l| (l.line, l)).collect();
    let errors: HashMap<usize, _> = asm.errors.iter().map(|e| (e.line, e)).collect();

    println!(
        "{}+------[{}]{}",
        "-".repeat(19),
        path,
        "-".repeat(45usize.saturating_sub(path.len()))
    );
    for (idx, raw) in source.lines().enumerate() {
        let line_num = idx + 1;
        let head = match by_line.get(&line_num) {
            Some(l) => {
                let hex = format!("{:<11}", l.hex());
                cformat!("[<c>{:04X}</>] <y>{}</>", l.address, hex)
            }
            None if errors.contains_key(&line_num) => {
                format!("{:7}{}", "", cformat!("<r,s>{:<11}</>", "!! !! !!"))
            }
            None => format!("{:18}", ""),
        };
        println!("{} | {:>4}:   {}", head, line_num, raw);
    }
    println!("{}+{}", "-".repeat(19), "-".repeat(53));

    if !asm.labels.is_empty() {
        for (name, addr) in &asm.labels {
            println!("{}", cformat!("  <g>{:<12}</> ${:04X}", name, addr));
        }
    }
}
