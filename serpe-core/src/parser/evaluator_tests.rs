#[cfg(test)]
mod generator_tests {
    use crate::parser::{parse, parse_expression, Evaluator, Expression};
    use crate::types::pattern::{euclidean, random};

    fn eval(input: &str) -> String {
        let expr = parse_expression(input).unwrap();
        Evaluator::new(0).eval(&expr).unwrap().pattern.to_string()
    }

    #[test]
    fn test_eval_generators() {
        assert_eq!(eval("E(3,8)"), "10010010");
        assert_eq!(eval("B(3,8)"), "10001001");
        assert_eq!(eval("W(3,8)"), "01010100");
        assert_eq!(eval("P(3,1,6)"), "010101");
        assert_eq!(eval("D(5,8)"), euclidean(3, 8).invert().to_string());
    }

    #[test]
    fn test_eval_polygon_defaults_to_sides() {
        assert_eq!(eval("P(4,0)"), "1111");
    }

    #[test]
    fn test_eval_seeded_random() {
        assert_eq!(eval("R(3,8,42)"), random(3, 8, 42).to_string());
    }

    #[test]
    fn test_eval_unseeded_random_is_stable() {
        let expr = parse_expression("R(5,16)").unwrap();
        let evaluator = Evaluator::new(99);
        let first = evaluator.eval(&expr).unwrap().pattern;
        let second = evaluator.eval(&expr).unwrap().pattern;
        assert_eq!(first, second);
        assert_eq!(first.onset_count(), 5);
    }

    #[test]
    fn test_eval_identical_random_calls_differ() {
        let strung = eval("R(8,32) R(8,32)");
        assert_eq!(strung.len(), 64);
        assert_ne!(strung[..32], strung[32..]);

        let parsed = parse("R(8,32)|R(8,32)").unwrap();
        let Expression::SceneList(scenes) = parsed.expression else {
            panic!("Expected a scene list");
        };
        let evaluator = Evaluator::new(0);
        let first = evaluator.eval(&scenes[0]).unwrap().pattern;
        let second = evaluator.eval(&scenes[1]).unwrap().pattern;
        assert_ne!(first, second);
    }

    #[test]
    fn test_eval_euclidean_rotation_argument() {
        assert_eq!(eval("E(3,8,1)"), eval("E(3,8)@1"));
        assert_eq!(eval("E(3,8,-1)"), "00100101");
    }

    #[test]
    fn test_eval_bell_random() {
        let expr = parse_expression("R(r,16)").unwrap();
        let pattern = Evaluator::new(5).eval(&expr).unwrap().pattern;
        assert_eq!(pattern.len(), 16);
        assert!((1..16).contains(&pattern.onset_count()));
        assert_eq!(eval("R(r,16,7)"), eval("R(r,16,7)"));
    }

    #[test]
    fn test_eval_invert_and_rotate() {
        assert_eq!(eval("~E(3,8)"), "01101101");
        assert_eq!(eval("E(3,8)@1"), euclidean(3, 8).rotate(1).to_string());
    }

    #[test]
    fn test_eval_word_prefixes() {
        assert_eq!(eval("rev 1011"), "1101");
        assert_eq!(eval("comp 1010"), "0101");
        assert_eq!(eval("rev E(3,8)"), "01001001");
    }

    #[test]
    fn test_eval_stringing() {
        assert_eq!(eval("1010 E(1,4)"), "10101000");
        assert_eq!(eval("M:SOS 0"), "1111010101110");
        assert_eq!(eval("73 1"), "100100101");
    }
}

#[cfg(test)]
mod operator_tests {
    use crate::parser::{parse, parse_expression, Evaluator, Expression, Span, UpiErrorKind};
    use crate::types::Pattern;

    fn evaluator() -> Evaluator {
        Evaluator::new(0)
    }

    #[test]
    fn test_eval_combination() {
        let expr = parse_expression("E(3,8)+E(2,8)").unwrap();
        assert_eq!(evaluator().eval(&expr).unwrap().pattern.to_string(), "10011010");
        let expr = parse_expression("E(3,8)-E(2,8)").unwrap();
        assert_eq!(evaluator().eval(&expr).unwrap().pattern.to_string(), "00010010");
    }

    #[test]
    fn test_eval_combination_too_long() {
        let expr = parse_expression("E(1,127)+E(1,2)").unwrap();
        let err = evaluator().eval(&expr).unwrap_err();
        assert_eq!(err.kind, UpiErrorKind::CombinedTooLong);
        assert_eq!(err.span, Span::new(0, 15));
    }

    #[test]
    fn test_eval_errors_point_at_the_operation() {
        let parsed = parse("1|E(3,7)+E(2,127)").unwrap();
        let Expression::SceneList(scenes) = parsed.expression else {
            panic!("Expected a scene list");
        };
        let err = evaluator().eval(&scenes[1]).unwrap_err();
        assert_eq!(err.to_string(), "Error at 2..17: combined length 889 exceeds 128 steps");

        let expr = parse_expression("E(1,100) E(1,100)").unwrap();
        let err = evaluator().eval(&expr).unwrap_err();
        assert_eq!(err.kind, UpiErrorKind::CombinedTooLong);
        assert_eq!(err.span, Span::new(0, 17));
    }

    #[test]
    fn test_eval_quantize_error_keeps_span() {
        let literal = Expression::Literal(Pattern::onsets(4));
        let expr = Expression::quantized(literal, 0, true, Span::new(3, 4));
        let err = evaluator().eval(&expr).unwrap_err();
        assert_eq!(err.kind, UpiErrorKind::OutOfRange);
        assert_eq!(err.span, Span::new(3, 4));
    }

    #[test]
    fn test_eval_quantize_records_metadata() {
        let expr = parse_expression("1010;8").unwrap();
        let result = evaluator().eval(&expr).unwrap();
        assert_eq!(result.pattern.to_string(), "10001000");
        let quantization = result.quantization.unwrap();
        assert_eq!(quantization.original_steps, 4);
        assert_eq!(quantization.new_steps, 8);
        assert!(quantization.clockwise);
    }

    #[test]
    fn test_eval_accent() {
        let expr = parse_expression("{100}E(3,8)").unwrap();
        let result = evaluator().eval(&expr).unwrap();
        assert_eq!(result.pattern.to_string(), "10010010");
        assert_eq!(result.accent.unwrap().to_string(), "100");
        assert!(result.quantization.is_none());
    }

    #[test]
    fn test_progressive_without_state_is_base() {
        let expr = parse_expression("E(3,8)+1").unwrap();
        assert_eq!(evaluator().eval(&expr).unwrap().pattern.to_string(), "10010010");
    }

    #[test]
    fn test_scene_list_evaluates_first_scene() {
        let parsed = parse("E(3,8)|1000").unwrap();
        let result = evaluator().eval(&parsed.expression).unwrap();
        assert_eq!(result.pattern.to_string(), "10010010");
    }
}

#[cfg(test)]
mod strategy_tests {
    use crate::engine::progressive::{Progression, Strategy};
    use crate::parser::{parse_expression, progression_for, Expression};
    use crate::types::Metric;

    fn strategy(input: &str) -> Strategy {
        match parse_expression(input).unwrap() {
            Expression::Progressive { kind, body } => match progression_for(kind, &body) {
                Progression::Transform { strategy, .. } => strategy,
                other => panic!("Expected a transformation, got {:?}", other),
            },
            other => panic!("Expected a progressive expression, got {:?}", other),
        }
    }

    #[test]
    fn test_base_family_picks_strategy() {
        assert_eq!(strategy("E(1,8)>4"), Strategy::Euclidean);
        assert_eq!(strategy("D(1,8)>4"), Strategy::Dilcue);
        assert_eq!(strategy("B(1,8)>4"), Strategy::Flip(Metric::Barlow));
        assert_eq!(strategy("W(1,8)>4"), Strategy::Flip(Metric::Wolrab));
    }

    #[test]
    fn test_other_bases_flip_by_barlow() {
        assert_eq!(strategy("10000000>3"), Strategy::Flip(Metric::Barlow));
        assert_eq!(strategy("P(3,0,12)>6"), Strategy::Flip(Metric::Barlow));
    }

    #[test]
    fn test_explicit_transformer_wins() {
        assert_eq!(strategy("E(1,8)W>4"), Strategy::Flip(Metric::Wolrab));
        assert_eq!(strategy("10000000E>3"), Strategy::Euclidean);
    }

    #[test]
    fn test_offset_and_lengthen() {
        let expr = parse_expression("E(3,8)*4").unwrap();
        match expr {
            Expression::Progressive { kind, body } => {
                assert_eq!(progression_for(kind, &body), Progression::Lengthen { block: 4 })
            }
            other => panic!("Expected a progressive expression, got {:?}", other),
        }
    }
}
