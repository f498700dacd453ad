//! Integration tests for the assembler front-end.

use rv32sim::asm::{self, AsmErrorKind};

/// Tests known encodings from the base instruction set.
#[test]
fn test_basic_encodings() {
    assert_eq!(asm::assemble("addi x5, x0, -1").unwrap().words(), vec![0xFFF00293]);
    assert_eq!(asm::assemble("lui x28, 100000").unwrap().words(), vec![0x186A0E37]);
    assert_eq!(asm::assemble("auipc x5, 0").unwrap().words(), vec![0x00000297]);
}

/// Tests pseudo-op expansion.
#[test]
fn test_pseudo_ops() {
    assert_eq!(asm::assemble("nop").unwrap().words(), vec![0x0000_0013]);
    assert_eq!(asm::assemble("halt").unwrap().words(), vec![0]);
    // mv x5, x6 == addi x5, x6, 0
    assert_eq!(asm::assemble("mv x5, x6").unwrap().words(), vec![0x0003_0293]);
    // ret == jalr x0, 0(x1)
    assert_eq!(asm::assemble("ret").unwrap().words(), vec![0x0000_8067]);
    // li x5, 1 == addi x5, x0, 1
    assert_eq!(asm::assemble("li x5, 1").unwrap().words(), vec![0x0010_0293]);
}

/// Tests ABI register names resolve alongside numeric names.
#[test]
fn test_abi_register_names() {
    let numeric = asm::assemble("add x10, x2, x8").unwrap().words();
    let abi = asm::assemble("add a0, sp, fp").unwrap().words();
    assert_eq!(numeric, abi);
}

/// Tests displacement operands on loads and stores.
#[test]
fn test_displacement_form() {
    let program = asm::assemble("lw x7, 8(sp)\nsw x7, -4(sp)").unwrap();
    let lw = program.text[0].word;
    let sw = program.text[1].word;
    assert_eq!(lw & 0x7F, 0b0000011);
    assert_eq!(lw >> 20, 8);
    assert_eq!((lw >> 15) & 0x1F, 2);
    assert_eq!(sw & 0x7F, 0b0100011);
}

/// Tests backward label resolution in byte displacements.
#[test]
fn test_backward_label() {
    let program = asm::assemble(
        "loop:\n\
         addi x5, x5, -1\n\
         bne x5, x0, loop\n",
    )
    .unwrap();
    // bne sits 4 bytes after loop, so the displacement is -4.
    let reference = asm::assemble("bne x5, x0, -4").unwrap().words()[0];
    assert_eq!(program.text[1].word, reference);
}

/// Tests forward references resolve on the second pass.
#[test]
fn test_forward_label() {
    let program = asm::assemble(
        "j end\n\
         nop\n\
         end:\n\
         halt\n",
    )
    .unwrap();
    let reference = asm::assemble("j 8").unwrap().words()[0];
    assert_eq!(program.text[0].word, reference);
}

/// Tests each text word remembers its source line.
#[test]
fn test_source_line_provenance() {
    let program = asm::assemble("nop\n\n# comment\nnop\n").unwrap();
    assert_eq!(program.text[0].line, 1);
    assert_eq!(program.text[1].line, 4);
}

/// Tests data directives build a little-endian data segment.
#[test]
fn test_data_directives() {
    let program = asm::assemble(
        ".data\n\
         .byte 1, 2\n\
         .half 0x0304\n\
         .word 0x05060708\n",
    )
    .unwrap();
    assert_eq!(program.data, vec![1, 2, 0x04, 0x03, 0x08, 0x07, 0x06, 0x05]);
}

/// Tests `.string` NUL-terminates and `.align` pads with zeros.
#[test]
fn test_string_and_align() {
    let program = asm::assemble(
        ".data\n\
         .string \"hi\"\n\
         .align 2\n\
         .word 1\n",
    )
    .unwrap();
    assert_eq!(
        program.data,
        vec![b'h', b'i', 0, 0, 1, 0, 0, 0]
    );
}

/// Tests `.dword` emits eight little-endian bytes.
#[test]
fn test_dword_directive() {
    let program = asm::assemble(".data\n.dword 0x1122334455667788").unwrap();
    assert_eq!(
        program.data,
        vec![0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
    );
}

/// Tests a data label used as a `.word` value resolves to its absolute
/// address.
#[test]
fn test_data_label_value() {
    let program = asm::assemble(
        ".data\n\
         first: .word 7\n\
         ptr: .word first\n",
    )
    .unwrap();
    assert_eq!(&program.data[4..8], &0x1000_0000u32.to_le_bytes());
}

/// Tests unknown mnemonics report position.
#[test]
fn test_unknown_mnemonic_error() {
    let err = asm::assemble("nop\nfrobnicate x1, x2\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.col, 1);
    assert!(matches!(err.kind, AsmErrorKind::UnknownMnemonic(_)));
}

/// Tests out-of-range immediates are rejected with position.
#[test]
fn test_immediate_range_error() {
    let err = asm::assemble("addi x5, x0, 2048").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(matches!(
        err.kind,
        AsmErrorKind::ImmediateRange { value: 2048, width: 12 }
    ));

    // li carries the same 12-bit limit.
    let err = asm::assemble("li x5, 5000").unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::ImmediateRange { .. }));
}

/// Tests duplicate and unknown labels are rejected.
#[test]
fn test_label_errors() {
    let dup = asm::assemble("a:\nnop\na:\nnop\n").unwrap_err();
    assert_eq!(dup.line, 3);
    assert!(matches!(dup.kind, AsmErrorKind::DuplicateLabel(_)));

    let unknown = asm::assemble("j nowhere\n").unwrap_err();
    assert!(matches!(unknown.kind, AsmErrorKind::UnknownLabel(_)));
}

/// Tests odd branch displacements are rejected.
#[test]
fn test_odd_displacement_error() {
    let err = asm::assemble("beq x1, x2, 3").unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::OddDisplacement(3)));
}

/// Tests instructions are rejected inside the data section.
#[test]
fn test_instruction_outside_text() {
    let err = asm::assemble(".data\nnop\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(matches!(err.kind, AsmErrorKind::InstructionOutsideText));
}

/// Tests unknown registers report the offending column.
#[test]
fn test_unknown_register_error() {
    let err = asm::assemble("add x5, q7, x1").unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(err.col, 9);
    assert!(matches!(err.kind, AsmErrorKind::UnknownRegister(_)));
}
