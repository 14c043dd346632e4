use serpe_core::engine::quantize;
use serpe_core::types::pattern::{decode, dilcue, euclidean, random, MAX_STEPS};
use serpe_core::{EngineConfig, Pattern, Radix, Session};

fn session() -> Session {
    Session::new(EngineConfig::default())
}

fn parsed(session: &mut Session, text: &str) -> String {
    let result = session.parse(text);
    assert!(result.is_valid, "{:?}", result.error_message);
    result.pattern.unwrap().to_string()
}

#[test]
fn euclidean_three_eight() {
    assert_eq!(parsed(&mut session(), "E(3,8)"), "10010010");
}

#[test]
fn barlow_three_eight_keeps_downbeat() {
    assert_eq!(parsed(&mut session(), "B(3,8)"), "10001001");
}

#[test]
fn hex_codec_matches_euclidean() {
    assert_eq!(parsed(&mut session(), "0x94:8"), "10010010");
}

#[test]
fn transformation_fills_one_onset_per_trigger() {
    let mut session = session();
    let text = "E(1,8)>8";
    assert_eq!(parsed(&mut session, text), "10000000");
    let mut onsets = 1;
    let mut last = Pattern::rests(1);
    for _ in 0..7 {
        last = session.trigger(text).unwrap();
        assert_eq!(last.onset_count(), onsets + 1);
        onsets += 1;
    }
    assert_eq!(last.to_string(), "11111111");
}

#[test]
fn scene_list_alternates() {
    let mut session = session();
    let text = "E(3,8)|B(5,13)";
    let result = session.parse(text);
    assert_eq!(result.scene_index, 0);
    assert_eq!(result.scene_count, 2);

    let pattern = session.trigger(text).unwrap();
    assert_eq!(pattern.len(), 13);
    assert_eq!(session.state(text).unwrap().scene_index, 1);

    let pattern = session.trigger(text).unwrap();
    assert_eq!(pattern.to_string(), "10010010");
    assert_eq!(session.state(text).unwrap().scene_index, 0);
}

#[test]
fn quantize_keeps_metadata() {
    let result = session().quantize(&euclidean(5, 17), 13, true).unwrap();
    assert_eq!(result.pattern.len(), 13);
    assert!(result.pattern.onset_count() <= 5);
    assert_eq!(result.original_steps, 17);
    assert_eq!(result.new_steps, 13);
    assert_eq!(result.original_onset_count, 5);
}

#[test]
fn euclidean_counts_and_downbeat() {
    for steps in 1..=MAX_STEPS {
        for onsets in 0..=steps {
            let pattern = euclidean(onsets, steps);
            assert_eq!(pattern.len(), steps);
            assert_eq!(pattern.onset_count(), onsets);
            if onsets > 0 {
                assert!(pattern.is_onset(0), "E({},{})", onsets, steps);
            }
        }
    }
}

#[test]
fn dilcue_is_inverted_complement() {
    for steps in 1..=MAX_STEPS {
        for onsets in 0..=steps {
            assert_eq!(dilcue(onsets, steps), euclidean(steps - onsets, steps).invert());
        }
    }
}

#[test]
fn codec_round_trip_on_whole_groups() {
    for (seed, steps) in [(1, 8), (2, 12), (3, 16), (4, 32), (5, 64), (6, 128)] {
        let pattern = random(steps / 3, steps, seed);
        let hex = pattern.to_hex();
        let digits = hex.strip_prefix("0x").unwrap();
        assert_eq!(decode(Radix::Hex, digits, None).unwrap(), pattern, "{}", hex);
    }
    for (seed, steps) in [(1, 6), (2, 9), (3, 12), (4, 24), (5, 126)] {
        let pattern = random(steps / 2, steps, seed);
        let octal = pattern.to_octal();
        let digits = octal.strip_prefix("0o").unwrap();
        assert_eq!(decode(Radix::Octal, digits, None).unwrap(), pattern, "{}", octal);
    }
}

#[test]
fn quantize_to_same_length_is_identity() {
    for steps in [1, 5, 8, 13, 128] {
        let pattern = random(steps / 2, steps, steps as u64);
        assert_eq!(quantize(&pattern, steps, true).unwrap().pattern, pattern);
    }
}

#[test]
fn zero_offset_never_moves() {
    let mut session = session();
    let base = parsed(&mut session, "E(5,12)+0");
    for _ in 0..30 {
        assert_eq!(session.trigger("E(5,12)+0").unwrap().to_string(), base);
    }
}

#[test]
fn scenes_return_to_start_after_full_cycle() {
    let mut session = session();
    let text = "1000|0100|0010|0001|1100";
    session.parse(text);
    for _ in 0..5 {
        session.trigger(text).unwrap();
    }
    assert_eq!(session.state(text).unwrap().scene_index, 0);
}

#[test]
fn reparsing_is_idempotent() {
    let text = "E(3,8)*4";

    let mut once = session();
    once.parse(text);
    let expected = once.trigger(text).unwrap();

    let mut twice = session();
    twice.parse(text);
    twice.parse(text);
    assert_eq!(twice.trigger(text).unwrap(), expected);
    assert_eq!(twice.len(), 1);
}

#[test]
fn trigger_on_static_notation_is_identity() {
    let mut session = session();
    for _ in 0..3 {
        assert_eq!(session.trigger("P(5,0,8)").unwrap().to_string(), "10110110");
    }
    assert!(session.is_empty());
}

#[test]
fn partial_scene_failure_degrades() {
    let mut session = session();
    let result = session.parse("E(3,8)|E(9,4)");
    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(session.trigger("E(3,8)|E(9,4)").unwrap().to_string(), "0");
}

#[test]
fn errors_name_the_offending_text() {
    let mut session = session();
    let result = session.parse("E(3,8)|Q(1,2)");
    assert!(result.is_valid);

    let result = session.parse("Q(1,2)");
    assert!(!result.is_valid);
    assert!(result.error_message.unwrap().contains("'Q'"));

    for bad in ["E(9,4)", "{1E(3,8)", "0x", "E(3,8", "E(3,8)>4+1"] {
        let result = session.parse(bad);
        assert!(!result.is_valid, "{}", bad);
        assert!(result.pattern.is_none());
    }
    // only the valid scene list holds state
    assert_eq!(session.len(), 1);
}

#[test]
fn accents_travel_with_the_pattern() {
    let result = session().parse("{101}E(5,8)");
    assert_eq!(result.pattern.unwrap().to_string(), "10110110");
    assert_eq!(result.accent_pattern.unwrap().to_string(), "101");
}

#[test]
fn sessions_are_independent() {
    let mut a = session();
    let mut b = session();
    a.parse("E(3,8)+1");
    a.trigger("E(3,8)+1").unwrap();
    assert_eq!(b.parse("E(3,8)+1").pattern.unwrap().to_string(), "10010010");
}

#[test]
fn word_prefixes_and_decimal_digits() {
    let mut session = session();
    assert_eq!(parsed(&mut session, "rev 1011"), "1101");
    assert_eq!(parsed(&mut session, "comp 1010"), "0101");
    assert_eq!(parsed(&mut session, "73"), "10010010");
    assert_eq!(parsed(&mut session, "o44"), parsed(&mut session, "0o44"));
}

#[test]
fn strung_patterns_and_morse() {
    let mut session = session();
    assert_eq!(parsed(&mut session, "M:SOS"), "111101010111");
    assert_eq!(parsed(&mut session, "tresillo 1111"), "100100101111");
}

#[test]
fn percent_offset_evolves_like_plus() {
    let mut session = session();
    session.parse("E(3,8)%1");
    session.parse("E(3,8)+1");
    assert_eq!(
        session.trigger("E(3,8)%1").unwrap(),
        session.trigger("E(3,8)+1").unwrap()
    );
}

#[test]
fn combination_error_points_at_the_combination() {
    let result = session().parse("1010 E(3,7)+E(2,127)");
    assert!(!result.is_valid);
    assert_eq!(
        result.error_message.unwrap(),
        "Error at 5..20: combined length 889 exceeds 128 steps"
    );
}
