//! Full training runs on Gaudi hardware, one test per generated case. Run with
//! `cargo test -p exr-harness --test example_regression -- --ignored`.
//!
//! Test functions carry the generated case name with `-` spelled as `_`, so
//! `test_run_qa_bert-base-uncased_single_card` is registered as
//! `test_run_qa_bert_base_uncased_single_card`.

use exr_harness::{HarnessConfig, run_example_case};
use exr_registry::{all_suites, find_suite, generate_cases};
use std::collections::BTreeSet;

fn registered_name(test_name: &str) -> String {
    test_name.replace('-', "_")
}

fn run_registered_case(fn_name: &str, suite_name: &str) {
    let cfg = HarnessConfig::from_env().expect("valid harness environment");
    let suite = find_suite(suite_name).expect("registered suite");
    let enabled = generate_cases(suite, cfg.run_oversized_single_card).expect("cases generate");

    let Some(case) = enabled
        .iter()
        .find(|case| registered_name(&case.test_name) == fn_name)
    else {
        let gated = generate_cases(suite, true)
            .expect("cases generate")
            .into_iter()
            .any(|case| registered_name(&case.test_name) == fn_name);
        assert!(gated, "{fn_name} is not generated by suite {suite_name}");
        eprintln!("{fn_name}: skipped, oversized single-card runs are disabled");
        return;
    };

    if let Err(err) = run_example_case(&cfg, case) {
        panic!("{} failed: {err}", case.test_name);
    }
}

macro_rules! example_case_tests {
    ($($suite:literal => [$($test_fn:ident),+ $(,)?]),+ $(,)?) => {
        const REGISTERED_CASES: &[(&str, &str)] = &[
            $($(($suite, stringify!($test_fn)),)+)+
        ];

        $($(
            #[test]
            #[ignore = "launches example training runs on Gaudi"]
            fn $test_fn() {
                run_registered_case(stringify!($test_fn), $suite);
            }
        )+)+
    };
}

example_case_tests! {
    "text_classification" => [
        test_run_glue_bert_base_uncased_single_card,
        test_run_glue_bert_large_uncased_whole_word_masking_single_card,
        test_run_glue_roberta_base_single_card,
        test_run_glue_roberta_large_single_card,
        test_run_glue_albert_large_v2_single_card,
        test_run_glue_albert_xxlarge_v1_single_card,
    ],
    "multi_card_text_classification" => [
        test_run_glue_bert_base_uncased_multi_card,
        test_run_glue_bert_large_uncased_whole_word_masking_multi_card,
        test_run_glue_roberta_base_multi_card,
        test_run_glue_roberta_large_multi_card,
        test_run_glue_albert_large_v2_multi_card,
        test_run_glue_albert_xxlarge_v1_multi_card,
    ],
    "question_answering" => [
        test_run_qa_bert_base_uncased_single_card,
        test_run_qa_bert_large_uncased_whole_word_masking_single_card,
        test_run_qa_roberta_base_single_card,
        test_run_qa_roberta_large_single_card,
        test_run_qa_albert_large_v2_single_card,
        test_run_qa_albert_xxlarge_v1_single_card,
        test_run_qa_distilbert_base_uncased_single_card,
    ],
    "multi_card_question_answering" => [
        test_run_qa_bert_base_uncased_multi_card,
        test_run_qa_bert_large_uncased_whole_word_masking_multi_card,
        test_run_qa_roberta_base_multi_card,
        test_run_qa_roberta_large_multi_card,
        test_run_qa_albert_large_v2_multi_card,
        test_run_qa_albert_xxlarge_v1_multi_card,
        test_run_qa_distilbert_base_uncased_multi_card,
    ],
    "language_modeling" => [
        test_run_clm_gpt2_single_card,
        test_run_clm_gpt2_xl_single_card,
    ],
    "multi_card_language_modeling" => [
        test_run_clm_gpt2_multi_card,
        test_run_clm_gpt2_xl_multi_card,
    ],
    "multi_card_summarization" => [
        test_run_summarization_t5_small_multi_card,
    ],
}

#[test]
fn every_generated_case_has_its_own_test() {
    let mut generated = BTreeSet::new();
    let mut case_count = 0;
    for suite in all_suites() {
        for case in generate_cases(suite, true).expect("cases generate") {
            case_count += 1;
            generated.insert((suite.name, registered_name(&case.test_name)));
        }
    }
    assert_eq!(generated.len(), case_count, "case names collide once '-' becomes '_'");

    let registered: BTreeSet<(&str, String)> = REGISTERED_CASES
        .iter()
        .map(|&(suite, name)| (suite, name.to_string()))
        .collect();
    assert_eq!(registered.len(), REGISTERED_CASES.len());

    let missing: Vec<_> = generated.difference(&registered).collect();
    let stale: Vec<_> = registered.difference(&generated).collect();
    assert!(missing.is_empty(), "cases without a test: {missing:?}");
    assert!(stale.is_empty(), "tests without a case: {stale:?}");
}
