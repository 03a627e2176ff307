use m68asm::{assemble, Assembly};

fn bytes(asm: &Assembly) -> Vec<u8> {
    asm.object_data().values().copied().collect()
}

fn ok(src: &str) -> Assembly {
    let asm = assemble(src);
    for (i, line) in src.lines().enumerate() {
        println!("{:>3}: {}", i + 1, line);
    }
    for m in asm.mappings() {
        println!("{} {:<12} {}", m.address, m.object_code, m.assembly);
    }
    assert!(asm.success, "Errors found: {:?}", asm.error_messages());
    asm
}

macro_rules! case {
    ($name:ident, $src:expr => [$($byte:expr),*]) => {
        #[test]
        fn $name() {
            assert_eq!(bytes(&ok($src)), vec![$($byte),*]);
        }
    };
    ($name:ident, $src:expr => err [$($msg:expr),*]) => {
        #[test]
        fn $name() {
            let asm = assemble($src);
            assert!(!asm.success);
            assert_eq!(asm.error_messages(), vec![$($msg.to_string()),*]);
            assert!(asm.object_data().is_empty());
        }
    };
}

case!(aliases, "  LDAA #1\n  STAB $2000\n  ORB #$0F\n  ASLB\n" => [0x86, 0x01, 0xF7, 0x20, 0x00, 0xCA, 0x0F, 0x58]);
case!(register_form, "  LDA B #1\n  PSH A\n  PUL B\n" => [0xC6, 0x01, 0x36, 0x33]);
case!(load_store_b, "  LDA B #1\n  STA B $2000\n  LDB A $30\n" => [0xC6, 0x01, 0xF7, 0x20, 0x00, 0x96, 0x30]);
case!(backward_direct, "  ORG $40\nVAR .BYTE 0\n  ORG $1000\n  LDA VAR\n" => [0x00, 0x96, 0x40]);
case!(forward_extended, "  LDA VAR\n  ORG $40\nVAR .BYTE 7\n" => [0x07, 0xB6, 0x00, 0x40]);
case!(branch_forward_limit, "  ORG $1000\n  BRA FAR\n  ORG $1081\nFAR NOP\n" => [0x20, 0x7F, 0x01]);
case!(branch_backward_limit, "  ORG $0F82\nFAR NOP\n  ORG $1000\n  BRA FAR\n" => [0x01, 0x20, 0x80]);
case!(bit_branch_loop, "WAIT BRCLR $25,#$80,WAIT\n" => [0x13, 0x25, 0x80, 0xFC]);
case!(number_formats, "  LDA #%1010\n  LDB #0b1111\n  LDX #65535\n" => [0x86, 0x0A, 0xC6, 0x0F, 0xCE, 0xFF, 0xFF]);

case!(unknown_mnemonic, "  NOP\n  NOP\n  FOO\n" => err ["Line 3: Unknown instruction: FOO"]);
case!(duplicate_label, "LOOP NOP\nLOOP NOP\n" => err ["Line 2: Duplicate label: LOOP (first defined on line 1)"]);
case!(branch_too_far, "  ORG $1000\n  BRA FAR\n  ORG $1082\nFAR NOP\n" => err ["Line 2: Branch target out of range: 128"]);
case!(push_without_register, "  PSH\n" => err ["Line 1: Instruction PSH requires register specification"]);
case!(undefined_label, "  JMP NOWHERE\n" => err ["Line 1: Undefined label: NOWHERE"]);
case!(store_immediate, "  STA #1\n" => err ["Line 1: Addressing mode IMM not supported for STA"]);
case!(direct_out_of_range, "  BSET $1234,#1\n" => err ["Line 1: Direct address out of range: $1234"]);

#[test]
fn object_code_listing() {
    let asm = ok("\
; store two constants
        ORG $1000
START   LDA #$55
        STA $2000
        LDB #$AA
        STB $2001
        BEQ START
        ORG $1100
        .BYTE $FF
");
    assert_eq!(
        asm.object_code(),
        "\
Motorola 6800 Object Code
==================================================
Origin Address: $1000

1000: 86 55 B7 20 00 C6 AA F7 20 01 27 F4
1100: FF"
    );
}

#[test]
fn first_org_is_origin() {
    let asm = ok("  ORG $2000\n  NOP\n  ORG $3000\n  NOP\n");
    assert_eq!(asm.origin, 0x2000);
    assert_eq!(
        asm.messages,
        vec!["Line 1: Origin set to $2000", "Line 3: Origin set to $3000"]
    );
    assert_eq!(asm.image().runs(), vec![(0x2000, vec![0x01]), (0x3000, vec![0x01])]);
}

#[test]
fn default_origin_without_org() {
    let asm = ok("  NOP\n");
    assert_eq!(asm.origin, 0x1000);
    assert_eq!(asm.mappings()[0].address, "$1000");
}

#[test]
fn empty_source() {
    let asm = assemble("");
    assert!(asm.success);
    assert!(asm.object_data().is_empty());
    assert!(asm.object_code().is_empty());
}

#[test]
fn labels_are_reported() {
    let asm = ok("START NOP\nLOOP: BRA LOOP\nEND_ NOP\n");
    let names: Vec<(&str, u16)> = asm.labels.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(names, vec![("START", 0x1000), ("LOOP", 0x1001), ("END_", 0x1003)]);
}

#[test]
fn image_yaml_round_trip() {
    let asm = ok("  ORG $1000\n  LDA #$55\n");
    let yaml = serde_yaml::to_string(&asm.image()).unwrap();
    let back: m68arch::ObjectImage = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, asm.image());
}
