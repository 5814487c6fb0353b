mod common;

use common::{load, output, packed, run, run_with, zstring, StoryBuilder, HIGH, SCRATCH};
use zaffre::game::config::Config;
use zaffre::game::error::GameError;
use zaffre::game::instruction::OpCode;
use zaffre::game::state::GameState;
use zaffre::ui::interface::TIMEOUT_LINE;

const PRINT_NUM_SP: [u8; 3] = [0xE6, 0xBF, 0x00];
const NEW_LINE: u8 = 0xBB;
const QUIT: u8 = 0xBA;

fn print_char(c: char) -> [u8; 3] {
    [0xE5, 0x7F, c as u8]
}

fn print_num_global(global: u8) -> [u8; 3] {
    [0xE6, 0xBF, 0x10 + global]
}

fn print(version: u8, text: &str) -> Vec<u8> {
    let mut bytes = vec![0xB2];
    bytes.extend(zstring(version, text));
    bytes
}

fn assemble(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

#[test]
fn prints_string_literals() {
    let code = assemble(&[&print(3, "Hello, world!"), &[NEW_LINE, QUIT]]);
    let story = StoryBuilder::new(3).code(&code).build();
    assert_eq!(output(&story, ""), "Hello, world!\n");
}

#[test]
fn signed_arithmetic() {
    let code = assemble(&[
        // add #7 #5 -> sp
        &[0x14, 7, 5, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // sub #3 #10 -> sp
        &[0x15, 3, 10, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // mul #-3 #1000 -> sp
        &[0xD6, 0x0F, 0xFF, 0xFD, 0x03, 0xE8, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // div #-7 #2 -> sp
        &[0xD7, 0x0F, 0xFF, 0xF9, 0x00, 0x02, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // mod #-7 #2 -> sp
        &[0xD8, 0x0F, 0xFF, 0xF9, 0x00, 0x02, 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(3).code(&code).build();
    assert_eq!(output(&story, ""), "12 -7 -3000 -3 -1");
}

#[test]
fn division_by_zero_is_fatal() {
    let code = assemble(&[&print(3, "before"), &[0x17, 1, 0, 0x00], &print(3, "after")]);
    let story = StoryBuilder::new(3).code(&code).build();
    let run = run(&story, "");
    assert!(matches!(run.result, Err(GameError::DivisionByZero)));
    assert_eq!(run.output, "before\nFatal error: Division by zero\n");
}

#[test]
fn illegal_opcode_is_fatal() {
    // 0OP:191 (piracy) only exists from version 5.
    let story = StoryBuilder::new(3).code(&[0xBF]).build();
    let run = run(&story, "");
    assert!(matches!(
        run.result,
        Err(GameError::IllegalInstruction(OpCode::ZeroOp(0x0F)))
    ));
    assert!(run.output.contains("Fatal error: Illegal instruction 0OP:191"));
}

#[test]
fn calls_use_local_defaults_and_store_results() {
    let routine = packed(3, HIGH).to_be_bytes();
    let code = assemble(&[
        // call routine #5 -> g00
        &[0xE0, 0x1F, routine[0], routine[1], 5, 0x10],
        &print_num_global(0),
        &print_char(' '),
        // call routine -> sp
        &[0xE0, 0x3F, routine[0], routine[1], 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // call 0 -> sp
        &[0xE0, 0x3F, 0x00, 0x00, 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(3)
        .code(&code)
        // add L00 L01 -> sp; ret sp
        .routine(HIGH, &[10, 20], &[0x74, 0x01, 0x02, 0x00, 0xAB, 0x00])
        .build();
    assert_eq!(output(&story, ""), "25 30 0");
}

#[test]
fn branch_offsets_zero_and_one_return() {
    let first = packed(3, HIGH).to_be_bytes();
    let second = packed(3, HIGH + 0x10).to_be_bytes();
    let code = assemble(&[
        &[0xE0, 0x3F, first[0], first[1], 0x00],
        &PRINT_NUM_SP,
        &[0xE0, 0x3F, second[0], second[1], 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(3)
        .code(&code)
        // jz #0 ?rfalse; rtrue
        .routine(HIGH, &[], &[0x90, 0x00, 0xC0, 0xB0])
        // je #1 #2 #1 ?rtrue; rfalse
        .routine(HIGH + 0x10, &[], &[0xC1, 0x57, 1, 2, 1, 0xC1, 0xB1])
        .build();
    assert_eq!(output(&story, ""), "01");
}

#[test]
fn inc_chk_loop() {
    let code = assemble(&[
        // inc_chk g00 #3 ?done
        &[0x05, 0x10, 0x03, 0xC8],
        &print_num_global(0),
        // jump loop
        &[0x8C, 0xFF, 0xF8],
        // done:
        &[NEW_LINE, QUIT],
    ]);
    let story = StoryBuilder::new(3).code(&code).build();
    assert_eq!(output(&story, ""), "123\n");
}

#[test]
fn object_tree_and_properties() {
    let code = assemble(&[
        // insert_obj #3 #1
        &[0x0E, 3, 1],
        // get_parent #3 -> sp
        &[0x93, 3, 0x00],
        &PRINT_NUM_SP,
        // get_child #1 -> sp ?next; print_obj sp
        &[0x92, 1, 0x00, 0xC2],
        &[0xAA, 0x00],
        &print_char(' '),
        // get_prop #2 #5 -> sp
        &[0x11, 2, 5, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        &[0x11, 2, 3, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // property 7 falls back to the defaults table
        &[0x11, 2, 7, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // set_attr #3 #10; test_attr #3 #10 ?yes
        &[0x0B, 3, 10],
        &[0x0A, 3, 10, 0xC5],
        &print_char('n'),
        &print_char('y'),
        &print_char(' '),
        // remove_obj #3; get_parent #3 -> sp
        &[0x99, 3],
        &[0x93, 3, 0x00],
        &PRINT_NUM_SP,
        &[0x92, 1, 0x00, 0xC2],
        &[0xAA, 0x00],
        &[QUIT],
    ]);
    let story = StoryBuilder::new(3)
        .object("room", 0, 0, 2)
        .object("box", 1, 0, 0)
        .object("lamp", 0, 0, 0)
        .property(2, 5, &[0x12, 0x34])
        .property(2, 3, &[0x07])
        .default_property(7, 0x00FF)
        .code(&code)
        .build();
    assert_eq!(output(&story, ""), "1lamp 4660 7 255 y 0box");
}

#[test]
fn put_prop_on_missing_property_is_fatal() {
    // put_prop #1 #9 #1
    let story = StoryBuilder::new(3)
        .object("room", 0, 0, 0)
        .code(&[0xE3, 0x57, 1, 9, 1, QUIT])
        .build();
    let run = run(&story, "");
    assert!(matches!(
        run.result,
        Err(GameError::MissingProperty {
            object: 1,
            property: 9
        })
    ));
}

#[test]
fn sread_tokenises_the_command() {
    let text = SCRATCH as u16;
    let parse = SCRATCH as u16 + 0x40;
    let [t0, t1] = text.to_be_bytes();
    let [p0, p1] = parse.to_be_bytes();
    let [w0, w1] = (parse + 2).to_be_bytes();
    let code = assemble(&[
        // sread text parse
        &[0xE4, 0x0F, t0, t1, p0, p1],
        // loadb parse #1 -> sp
        &[0xD0, 0x1F, p0, p1, 1, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // loadw parse+2 #0 -> sp
        &[0xCF, 0x1F, w0, w1, 0, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // loadw parse+2 #2 -> sp
        &[0xCF, 0x1F, w0, w1, 2, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // loadb parse #9 -> sp (start of the second word)
        &[0xD0, 0x1F, p0, p1, 9, 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let builder = StoryBuilder::new(3)
        .separators(b",")
        .words(&["look", "take", "lamp"])
        .bytes(SCRATCH, &[20])
        .bytes(SCRATCH + 0x40, &[4])
        .code(&code);
    let expected = format!(
        "Take lamp\n2 {} {} 6",
        builder.entry("take"),
        builder.entry("lamp")
    );
    let story = builder.build();
    assert_eq!(output(&story, "Take lamp"), expected);
}

#[test]
fn end_of_input_quits_cleanly() {
    let [t0, t1] = (SCRATCH as u16).to_be_bytes();
    let [p0, p1] = (SCRATCH as u16 + 0x40).to_be_bytes();
    let code = assemble(&[&[0xE4, 0x0F, t0, t1, p0, p1], &print(3, "never"), &[QUIT]]);
    let story = StoryBuilder::new(3)
        .bytes(SCRATCH, &[20])
        .bytes(SCRATCH + 0x40, &[4])
        .code(&code)
        .build();
    assert_eq!(output(&story, ""), "");
}

#[test]
fn reseeded_random_is_repeatable() {
    let code = assemble(&[
        // random #-7 -> sp; pop
        &[0xE7, 0x3F, 0xFF, 0xF9, 0x00, 0xB9],
        // random #100 -> sp, twice
        &[0xE7, 0x7F, 100, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        &[0xE7, 0x7F, 100, 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(3).code(&code).build();
    let config = |seed| Config {
        seed: Some(seed),
        ..Config::default()
    };
    let first = run_with(&story, "", config(1));
    let second = run_with(&story, "", config(99));
    assert!(first.result.is_ok());
    assert_eq!(first.output, second.output);
    for value in first.output.split(' ') {
        let value: u16 = value.parse().unwrap();
        assert!((1..=100).contains(&value));
    }
}

#[test]
fn verify_checks_the_story_checksum() {
    let code = assemble(&[&[0xBD, 0xC5], &print_char('n'), &print_char('y'), &[QUIT]]);
    let story = StoryBuilder::new(3).code(&code).build();
    assert_eq!(output(&story, ""), "y");

    let mut corrupt = story.clone();
    corrupt[0xFFF] ^= 0xFF;
    assert_eq!(output(&corrupt, ""), "ny");
}

#[test]
fn check_arg_count_sees_supplied_arguments() {
    let routine = packed(5, HIGH).to_be_bytes();
    let code = assemble(&[
        // call_vs routine #9 -> sp
        &[0xE0, 0x1F, routine[0], routine[1], 9, 0x00],
        &PRINT_NUM_SP,
        // call_vs routine #9 #9 -> sp
        &[0xE0, 0x17, routine[0], routine[1], 9, 9, 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5)
        .code(&code)
        // check_arg_count #2 ?rtrue; rfalse
        .routine(HIGH, &[0, 0, 0], &[0xFF, 0x7F, 2, 0xC1, 0xB1])
        .build();
    assert_eq!(output(&story, ""), "01");
}

#[test]
fn throw_returns_from_the_catching_routine() {
    let thrower = packed(5, HIGH + 0x20).to_be_bytes();
    let catcher = packed(5, HIGH + 0x40).to_be_bytes();
    let code = assemble(&[
        &[0xE0, 0x3F, catcher[0], catcher[1], 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5)
        .code(&code)
        // throw #42 L00
        .routine(HIGH + 0x20, &[0], &[0x3C, 42, 0x01])
        // catch -> L00; call_vn thrower L00; rfalse
        .routine(
            HIGH + 0x40,
            &[0],
            &[0xB9, 0x01, 0xF9, 0x2F, thrower[0], thrower[1], 0x01, 0xB1],
        )
        .build();
    assert_eq!(output(&story, ""), "42");
}

#[test]
fn memory_stream_captures_output() {
    let [t0, t1] = (SCRATCH as u16).to_be_bytes();
    let code = assemble(&[
        // output_stream #3 table
        &[0xF3, 0x4F, 3, t0, t1],
        &print(5, "abc"),
        // output_stream #-3
        &[0xF3, 0x3F, 0xFF, 0xFD],
        // loadw table #0 -> sp
        &[0xCF, 0x1F, t0, t1, 0, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // loadb table #2 -> sp
        &[0xD0, 0x1F, t0, t1, 2, 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5).code(&code).build();
    assert_eq!(output(&story, ""), "3 97");
}

#[test]
fn restore_undo_rewinds_to_save_undo() {
    let code = assemble(&[
        // save_undo -> g01
        &[0xBE, 0x09, 0xFF, 0x11],
        // je g01 #2 ?done
        &[0x41, 0x11, 0x02, 0xC8],
        // inc g00
        &[0x95, 0x10],
        // restore_undo -> sp
        &[0xBE, 0x0A, 0xFF, 0x00],
        // done:
        &print_num_global(0),
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5).code(&code).build();
    assert_eq!(output(&story, ""), "0");
}

#[test]
fn aread_stores_terminator_and_length() {
    let [t0, t1] = (SCRATCH as u16).to_be_bytes();
    let [p0, p1] = (SCRATCH as u16 + 0x40).to_be_bytes();
    let code = assemble(&[
        // aread text parse -> sp
        &[0xE4, 0x0F, t0, t1, p0, p1, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // loadb text #1 -> sp
        &[0xD0, 0x1F, t0, t1, 1, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // loadb parse #1 -> sp
        &[0xD0, 0x1F, p0, p1, 1, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // loadb parse #5 -> sp (start of the first word)
        &[0xD0, 0x1F, p0, p1, 5, 0x00],
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5)
        .separators(b".")
        .words(&["north", "."])
        .bytes(SCRATCH, &[20, 0])
        .bytes(SCRATCH + 0x40, &[4])
        .code(&code)
        .build();
    assert_eq!(output(&story, "North."), "North.\n13 6 2 2");
}

/// Frame pointer, cell count and frame depth of the call stack.
fn stack_shape(state: &GameState) -> (usize, usize, usize) {
    let stack = state.stack();
    (stack.frame_pointer(), stack.len(), stack.depth())
}

#[test]
fn variable_zero_cannot_reach_into_locals() {
    let routine = packed(3, HIGH).to_be_bytes();
    let main = [0xE0, 0x3F, routine[0], routine[1], 0x00, QUIT];

    // load sp -> sp with nothing on the routine's stack
    let story = StoryBuilder::new(3)
        .code(&main)
        .routine(HIGH, &[10, 20], &[0x9E, 0x00, 0x00, 0xAB, 0x00])
        .build();
    assert!(matches!(
        run(&story, "").result,
        Err(GameError::StackUnderflow)
    ));

    // inc sp in a routine without locals would hit the frame cell
    let story = StoryBuilder::new(3)
        .code(&main)
        .routine(HIGH, &[], &[0x95, 0x00, 0xB0])
        .build();
    assert!(matches!(
        run(&story, "").result,
        Err(GameError::StackUnderflow)
    ));
}

#[test]
fn timed_input_runs_the_interrupt_routine() {
    let [t0, t1] = (SCRATCH as u16).to_be_bytes();
    let [p0, p1] = (SCRATCH as u16 + 0x40).to_be_bytes();
    let [r0, r1] = packed(5, HIGH).to_be_bytes();
    let code = assemble(&[
        // push #77
        &[0xE8, 0x7F, 77],
        // aread text parse #1 routine -> sp
        &[0xE4, 0x04, t0, t1, p0, p1, 1, r0, r1, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        &print_num_global(2),
        &print_char(' '),
        // read_char #1 #1 routine -> sp
        &[0xF6, 0x53, 1, 1, r0, r1, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        &print_num_global(2),
        &print_char(' '),
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5)
        .bytes(SCRATCH, &[20, 0])
        .bytes(SCRATCH + 0x40, &[4])
        .code(&code)
        // inc g02; je g02 #2 ?rtrue; rfalse
        .routine(HIGH, &[], &[0x95, 0x12, 0x41, 0x12, 0x02, 0xC1, 0xB1])
        .build();

    // The first interrupt returns false and reading carries on, the second
    // returns true and ends the read with terminator 0. The third lets
    // read_char continue to the key press.
    let script = format!("{0}\n{0}\n{0}\nx\n", TIMEOUT_LINE);
    let (mut state, output) = load(&story, &script);
    let before = stack_shape(&state);
    state.run().unwrap();
    assert_eq!(output.borrow().as_str(), "0 2 120 3 77");
    assert_eq!(stack_shape(&state), before);
}

#[test]
fn nested_calls_leave_the_stack_as_they_found_it() {
    let [r0, r1] = packed(5, HIGH).to_be_bytes();
    let [d0, d1] = packed(5, HIGH + 0x40).to_be_bytes();
    let [e0, e1] = packed(5, HIGH + 0x80).to_be_bytes();
    let code = assemble(&[
        // push #77
        &[0xE8, 0x7F, 77],
        // call_vs count #5 -> g00
        &[0xE0, 0x1F, r0, r1, 5, 0x10],
        // call_vn2 last #1 #2 #3 #4 #5 #6 #7
        &[0xFA, 0x15, 0x55, e0, e1, 1, 2, 3, 4, 5, 6, 7],
        &print_num_global(0),
        &print_char(' '),
        &print_num_global(3),
        &print_char(' '),
        &print_num_global(1),
        &print_char(' '),
        &PRINT_NUM_SP,
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5)
        .code(&code)
        // count(n): jz L00 ?rfalse; sub L00 #1 -> L01; call_2n tick L01;
        // call_vs count L01 -> sp; add sp #1 -> sp; ret sp
        .routine(
            HIGH,
            &[0, 0],
            &[
                0xA0, 0x01, 0xC0, 0x55, 0x01, 0x01, 0x02, 0xDA, 0x2F, d0, d1, 0x02, 0xE0, 0x2F,
                r0, r1, 0x02, 0x00, 0x54, 0x00, 0x01, 0x00, 0xAB, 0x00,
            ],
        )
        // tick: inc g03; ret #99
        .routine(HIGH + 0x40, &[], &[0x95, 0x13, 0x9B, 99])
        // last: store g01 L07; rtrue
        .routine(HIGH + 0x80, &[0; 7], &[0x2D, 0x11, 0x07, 0xB0])
        .build();

    let (mut state, output) = load(&story, "");
    let before = stack_shape(&state);

    // An interrupt call pushes its result, which call_interrupt takes back.
    assert_eq!(state.call_interrupt(packed(5, HIGH), &[3]).unwrap(), 3);
    assert_eq!(stack_shape(&state), before);

    let mut deepest = 0;
    while !state.is_finished() {
        state.step().unwrap();
        deepest = deepest.max(state.stack().depth());
    }
    // main, then count(5) down to count(0)
    assert_eq!(deepest, 7);
    assert_eq!(output.borrow().as_str(), "5 8 7 77");
    assert_eq!(stack_shape(&state), before);
}

#[test]
fn large_object_layout() {
    let code = assemble(&[
        // insert_obj #2 #1; get_parent #2 -> sp
        &[0x0E, 2, 1],
        &[0x93, 2, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // get_prop_addr #1 #20 -> sp; get_prop_len sp -> sp
        &[0x12, 1, 20, 0x00],
        &[0xA4, 0x00, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // get_prop #1 #3 -> sp
        &[0x11, 1, 3, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // property 60 comes from the 63-entry defaults table
        &[0x11, 1, 60, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // get_next_prop #1 #0 -> sp; get_next_prop #1 #20 -> sp
        &[0x13, 1, 0, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        &[0x13, 1, 20, 0x00],
        &PRINT_NUM_SP,
        &print_char(' '),
        // print_obj #2
        &[0x9A, 2],
        &print_char(' '),
        // put_prop #1 #3 #500; get_prop #1 #3 -> sp
        &[0xE3, 0x53, 1, 3, 0x01, 0xF4],
        &[0x11, 1, 3, 0x00],
        &PRINT_NUM_SP,
        // set_attr #2 #40; test_attr #2 #40 ?yes
        &[0x0B, 2, 40],
        &[0x0A, 2, 40, 0xC5],
        &print_char('n'),
        &print_char('y'),
        &[QUIT],
    ]);
    let story = StoryBuilder::new(5)
        .object("chest", 0, 0, 0)
        .object("coin", 0, 0, 0)
        .property(1, 20, &[1, 2, 3, 4])
        .property(1, 3, &[0x12, 0x34])
        .default_property(60, 0x0102)
        .code(&code)
        .build();
    assert_eq!(output(&story, ""), "1 4 4660 258 20 3 coin 500y");
}

#[test]
fn routine_and_string_offsets() {
    // Routines start 0x100 bytes and strings 0x180 bytes into the image.
    let [r0, r1] = (((HIGH - 0x100) / 4) as u16).to_be_bytes();
    let [s0, s1] = (((HIGH + 0x40 - 0x180) / 4) as u16).to_be_bytes();
    for version in [6, 7] {
        let code = assemble(&[
            // call_vs routine #7 -> sp
            &[0xE0, 0x1F, r0, r1, 7, 0x00],
            &PRINT_NUM_SP,
            // print_paddr string
            &[0x8D, s0, s1],
            &[QUIT],
        ]);
        let story = StoryBuilder::new(version)
            .offsets(0x20, 0x30)
            .code(&code)
            // add L00 #1 -> sp; ret sp
            .routine(HIGH, &[0], &[0x54, 0x01, 0x01, 0x00, 0xAB, 0x00])
            .string(HIGH + 0x40, "ok")
            .build();
        assert_eq!(output(&story, ""), "8ok", "version {}", version);
    }
}
