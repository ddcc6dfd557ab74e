//! The shipped demo pipeline must register in every context it supports

use baton_core::configs::pipeline::parse_pipeline_config;
use baton_core::registration::register_pipeline;
use baton_core::{ExecutionContext, TaskDefinition};

const INVERSIFY: &str = include_str!("../../../demos/inversify/baton.yml");

fn test_members(context: &ExecutionContext) -> Vec<String> {
    let config = parse_pipeline_config(INVERSIFY).unwrap();
    let registry = register_pipeline(&config, context).unwrap();
    assert!(registry.contains("default"));
    match registry.resolve("test").unwrap() {
        TaskDefinition::Composite(composite) => composite.member_labels(),
        TaskDefinition::Leaf(_) => panic!("'test' should be a composite"),
    }
}

#[test]
fn demo_registers_node_tests_locally() {
    assert_eq!(test_members(&ExecutionContext::default()), vec!["mocha"]);
}

#[test]
fn demo_adds_browser_tests_on_appveyor() {
    let context = ExecutionContext::from_flags([("APPVEYOR", true)]);
    assert_eq!(test_members(&context), vec!["mocha", "karma"]);
}

#[test]
fn demo_reads_only_the_appveyor_signal() {
    let config = parse_pipeline_config(INVERSIFY).unwrap();
    assert_eq!(config.signals(), vec!["APPVEYOR".to_string()]);
    assert_eq!(config.default_task(), "default");
}

#[test]
fn demo_builds_every_format_inside_build() {
    let config = parse_pipeline_config(INVERSIFY).unwrap();
    let registry = register_pipeline(&config, &ExecutionContext::default()).unwrap();

    assert!(!registry.contains("build-targets"));
    match registry.resolve("build").unwrap() {
        TaskDefinition::Composite(composite) => assert_eq!(
            composite.member_labels(),
            vec![
                "lint",
                "parallel[build-src, build-es, build-lib, build-amd, build-dts]",
                "build-test"
            ]
        ),
        TaskDefinition::Leaf(_) => panic!("'build' should be a composite"),
    }
}
