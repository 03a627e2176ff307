use crate::{
    mode::Mode,
    op::Mnemonic,
    table::{self, Encoding},
};
use strum::IntoEnumIterator;

fn section(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
}

fn mode_syntax(mode: Mode) -> &'static str {
    match mode {
        Mode::INH => "ABA, CLRA",
        Mode::IMM => "LDA #$10",
        Mode::DIR => "LDA $10",
        Mode::EXT => "LDA $1234",
        Mode::IDX => "LDA 5,X",
        Mode::REL => "BNE LOOP",
    }
}

/// Text reference generated from the opcode map: addressing modes, number
/// formats, every mnemonic with its opcodes, aliases and directives.
/// Register-keyed entries show the A and B opcodes as `A:xx/B:xx`.
pub fn instruction_reference() -> String {
    let mut out = String::from("Instruction Reference\n");
    out += &"=".repeat(21);
    out += "\n";

    section(&mut out, "Addressing Modes");
    for mode in Mode::iter() {
        out += &format!("{:<6}{}\n", mode.to_string(), mode_syntax(mode));
    }

    section(&mut out, "Number Formats");
    out += "$FF 0xFF  hexadecimal\n";
    out += "%1010 0b1010  binary\n";
    out += "255   decimal\n";
    out += "LOOP  label value\n";

    section(&mut out, "Instructions");
    for m in Mnemonic::iter() {
        let modes: Vec<String> = m
            .encodings()
            .iter()
            .map(|(mode, e)| match e {
                Encoding::Fixed(code) => format!("{mode}:{code:02X}"),
                Encoding::ByRegister { a, b } => format!("{mode}:A:{a:02X}/B:{b:02X}"),
            })
            .collect();
        out += &format!("{:<6}{}\n", m.to_string(), modes.join(" "));
    }

    section(&mut out, "Aliases");
    for (name, m, acc) in table::aliases() {
        out += &format!("{name:<6}{m} {acc}\n");
    }

    section(&mut out, "Directives");
    out += "ORG   set the location counter\n";
    out += "END   stop assembling\n";
    out += ".BYTE emit one byte\n";
    out
}

#[test]
fn test() {
    let text = instruction_reference();
    assert!(text.starts_with("Instruction Reference\n"));
    assert!(text.contains("\nAddressing Modes\n----------------\nINH   ABA, CLRA\n"));
    assert!(text.contains("LDA   IMM:86 DIR:96 EXT:B6 IDX:A6\n"));
    assert!(text.contains("PSH   INH:A:36/B:37\n"));
    assert!(text.contains("LDY   IMM:18CE"));
    assert!(text.contains("LDAA  LDA A\n"));
    assert!(text.contains("ORB   ORA B\n"));
    assert!(text.ends_with("END   stop assembling\n.BYTE emit one byte\n"));
    for m in Mnemonic::iter() {
        assert!(text.contains(&format!("\n{:<6}", m.to_string())), "{m}");
    }
}
