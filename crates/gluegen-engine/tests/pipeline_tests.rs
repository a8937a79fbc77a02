//! Pipeline Tests
//!
//! Resolution and assembly over hand-built AST sets.
//!
//! Run with: cargo test -p gluegen-engine --test pipeline_tests

use gluegen_engine::ast::{
    ClassRecord, Compound, ConstructorRecord, DecoratorRecord, MemberRecord, ParamRecord,
    SourceFileRecord,
};
use gluegen_engine::config::OutputConfig;
use gluegen_engine::{AstSet, GluegenConfig, OverloadPolicy, Pipeline, ReflectError, TypeToken};
use serde_json::{json, Value};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn builtin(name: &str) -> TypeToken {
    TypeToken::Builtin(name.to_string())
}

fn class(id: &str) -> TypeToken {
    TypeToken::Class(id.to_string())
}

fn delim(d: &str) -> TypeToken {
    TypeToken::Delimiter(d.to_string())
}

fn marked(name: &str, tokens: Vec<TypeToken>, attachments: &str) -> MemberRecord {
    MemberRecord::variable(
        format!("member_{}", name),
        name,
        tokens,
        format!("= SharedVar(){}", attachments),
    )
}

fn scope(namespace: &str, members: Vec<MemberRecord>) -> Compound {
    Compound::SourceFile(SourceFileRecord {
        name: namespace.to_string(),
        namespace: namespace.split("::").map(str::to_string).collect(),
        members,
    })
}

fn param(name: &str, ty: &str, default: Option<&str>) -> ParamRecord {
    ParamRecord {
        name: name.to_string(),
        declared_type: ty.to_string(),
        default_value: default.map(str::to_string),
    }
}

fn decorator(name: &str, ctors: Vec<Vec<ParamRecord>>) -> Compound {
    Compound::DecoratorClass(DecoratorRecord {
        qualified_name: format!("inexor::{}", name),
        constructors: ctors
            .into_iter()
            .map(|params| ConstructorRecord { params })
            .collect(),
    })
}

fn box_class() -> Compound {
    Compound::ReflectedClass(ClassRecord {
        id: "classapp_1_1Box".to_string(),
        qualified_name: "app::Box".to_string(),
        file: "app/box.hpp".to_string(),
        generic_params: vec!["T".to_string()],
        members: vec![marked("value", vec![builtin("T")], "")],
    })
}

fn run(compounds: Vec<Compound>) -> Value {
    Pipeline::default()
        .run(&AstSet::from_compounds(compounds))
        .expect("pipeline runs")
        .document
}

fn run_err(compounds: Vec<Compound>) -> ReflectError {
    Pipeline::default()
        .run(&AstSet::from_compounds(compounds))
        .expect_err("pipeline fails")
}

fn attribute<'v>(entry: &'v Value, name: &str) -> &'v Value {
    entry["attached_attributes"]
        .as_array()
        .and_then(|list| list.iter().find(|a| a["name"] == name))
        .unwrap_or_else(|| panic!("attribute {} missing", name))
}

fn argument<'v>(attribute: &'v Value, name: &str) -> &'v Value {
    attribute["arguments"]
        .as_array()
        .and_then(|list| list.iter().find(|a| a["name"] == name))
        .unwrap_or_else(|| panic!("argument {} missing", name))
}

// =============================================================================
// END TO END
// =============================================================================

mod end_to_end_tests {
    use super::*;

    #[test]
    fn test_plain_int_variable() {
        let doc = run(vec![scope("app", vec![marked("score", vec![builtin("int")], "")])]);
        let score = &doc["variables"][0];
        assert_eq!(score["name"], "score");
        assert_eq!(score["namespace"], json!(["app"]));
        assert_eq!(score["type_name_cpp"], "int");
        assert_eq!(score["is_int"], true);
        assert_eq!(score["attached_attributes"], json!([]));
        assert_eq!(doc["type_definitions"], json!([]));
    }

    #[test]
    fn test_file_comment_comes_from_config() {
        let config = GluegenConfig {
            output: OutputConfig {
                file_comment: "// generated".to_string(),
                pretty: false,
            },
            ..GluegenConfig::default()
        };
        let output = Pipeline::new(config).run(&AstSet::new()).unwrap();
        assert_eq!(output.document["file_comment"], "// generated");
        assert_eq!(output.document["variables"], json!([]));
    }

    #[test]
    fn test_nested_namespace() {
        let doc = run(vec![scope(
            "inexor::rendering",
            vec![marked("maxfps", vec![builtin("unsigned int")], "")],
        )]);
        let maxfps = &doc["variables"][0];
        assert_eq!(maxfps["namespace"], json!(["inexor", "rendering"]));
        assert_eq!(maxfps["is_unsigned_int"], true);
        assert_eq!(
            maxfps["namespace_sep_open"],
            "namespace inexor { namespace rendering { "
        );
        assert_eq!(maxfps["namespace_sep_close"], " } }");
    }
}

// =============================================================================
// GENERIC SUBSTITUTION
// =============================================================================

mod substitution_tests {
    use super::*;

    #[test]
    fn test_box_of_int_member_is_int() {
        let tokens = vec![class("classapp_1_1Box"), delim("<"), builtin("Int"), delim(">")];
        let doc = run(vec![box_class(), scope("app", vec![marked("b", tokens, "")])]);

        let boxed = &doc["type_definitions"][0];
        assert_eq!(boxed["signature"], "classapp_1_1Box<Int>");
        assert_eq!(boxed["namespace_sep_open"], "namespace app { ");
        assert_eq!(boxed["namespace_sep_close"], " }");
        let value = &boxed["members"][0];
        assert_eq!(value["type_name_cpp"], "Int");
        assert_eq!(value["is_Int"], true);
        assert!(value.get("is_T").is_none());
    }

    #[test]
    fn test_nested_class_argument_is_resolved_through_member() {
        let player = Compound::ReflectedClass(ClassRecord {
            id: "classapp_1_1Player".to_string(),
            qualified_name: "app::Player".to_string(),
            file: "app/player.hpp".to_string(),
            generic_params: vec![],
            members: vec![marked("health", vec![builtin("int")], "")],
        });
        let tokens = vec![
            class("classapp_1_1Box"),
            delim("<"),
            class("classapp_1_1Player"),
            delim(">"),
        ];
        let doc = run(vec![box_class(), player, scope("app", vec![marked("p", tokens, "")])]);

        let signatures: Vec<_> = doc["type_definitions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["signature"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            signatures,
            vec!["classapp_1_1Box<classapp_1_1Player>", "classapp_1_1Player"]
        );
        assert_eq!(doc["variables"][0]["type_name_cpp"], "app::Box<app::Player>");
    }

    #[test]
    fn test_classes_inside_builtin_containers() {
        let player = Compound::ReflectedClass(ClassRecord {
            id: "classapp_1_1Player".to_string(),
            qualified_name: "app::Player".to_string(),
            file: "app/player.hpp".to_string(),
            generic_params: vec![],
            members: vec![marked("health", vec![builtin("int")], "")],
        });
        let vector_of = |id: &str| {
            vec![builtin("std::vector"), delim("<"), class(id), delim(">")]
        };
        let output = Pipeline::default()
            .run(&AstSet::from_compounds(vec![
                player,
                scope(
                    "app",
                    vec![
                        marked("players", vector_of("classapp_1_1Player"), ""),
                        marked("ghosts", vector_of("classapp_1_1Ghost"), ""),
                    ],
                ),
            ]))
            .unwrap();

        let doc = &output.document;
        assert_eq!(doc["type_definitions"][0]["signature"], "classapp_1_1Player");
        assert_eq!(doc["type_definitions"][0]["members"][0]["name"], "health");
        assert_eq!(doc["variables"].as_array().unwrap().len(), 1);
        assert_eq!(doc["variables"][0]["name"], "players");
        assert_eq!(
            doc["variables"][0]["template_types"][0]["type_name_cpp"],
            "app::Player"
        );
        assert!(matches!(
            output.diagnostics.entries(),
            [ReflectError::UnresolvedType { variable, signature }]
                if variable == "app::ghosts" && signature == "classapp_1_1Ghost"
        ));
    }

    #[test]
    fn test_arity_mismatch_aborts() {
        let tokens = vec![
            class("classapp_1_1Box"),
            delim("<"),
            builtin("int"),
            delim(","),
            builtin("int"),
            delim(">"),
        ];
        let err = run_err(vec![box_class(), scope("app", vec![marked("b", tokens, "")])]);
        assert!(matches!(err, ReflectError::GenericArity { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn test_malformed_type_aborts() {
        let tokens = vec![class("classapp_1_1Box"), delim("<"), builtin("int")];
        let err = run_err(vec![box_class(), scope("app", vec![marked("b", tokens, "")])]);
        assert!(matches!(err, ReflectError::Parse { ref entity, .. } if entity == "app::b"));
    }
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

mod attribute_tests {
    use super::*;

    fn range() -> Compound {
        decorator(
            "Range",
            vec![vec![param("min", "int", Some("0")), param("max", "int", Some("10"))]],
        )
    }

    #[test]
    fn test_unattached_defaults_propagate() {
        let doc = run(vec![range(), scope("app", vec![marked("v", vec![builtin("int")], "")])]);
        let range = attribute(&doc["variables"][0], "Range");
        assert_eq!(argument(range, "min")["value"], "0");
        assert_eq!(argument(range, "max")["value"], "10");
        assert_eq!(argument(range, "max")["defaulted"], true);
    }

    #[test]
    fn test_defaults_render_against_variable() {
        let path = decorator(
            "Path",
            vec![vec![param(
                "key",
                "std::string",
                Some("std::string(\"{{namespace}}::{{name}}#{{index}}\")"),
            )]],
        );
        let doc = run(vec![path, scope("app", vec![marked("v", vec![builtin("int")], "")])]);
        let path = attribute(&doc["variables"][0], "Path");
        assert_eq!(argument(path, "key")["value"], "app::v#21");
    }

    fn pick_variable() -> Compound {
        scope("app", vec![marked("v", vec![builtin("int")], " | Pick(5)")])
    }

    #[test]
    fn test_overload_with_defaults_wins_over_shorter_one() {
        let pick = decorator(
            "Pick",
            vec![
                vec![param("a", "int", None)],
                vec![param("a", "int", None), param("b", "int", Some("2"))],
            ],
        );
        let doc = run(vec![pick, pick_variable()]);
        let pick = attribute(&doc["variables"][0], "Pick");
        assert_eq!(pick["arguments"].as_array().unwrap().len(), 2);
        assert_eq!(argument(pick, "a")["value"], "5");
        assert_eq!(argument(pick, "a")["defaulted"], false);
        assert_eq!(argument(pick, "b")["value"], "2");
        assert_eq!(argument(pick, "b")["defaulted"], true);
    }

    #[test]
    fn test_defaulted_overload_selected_when_first_needs_more() {
        let pick = decorator(
            "Pick",
            vec![
                vec![param("a", "int", None), param("c", "int", None)],
                vec![param("a", "int", None), param("b", "int", Some("2"))],
            ],
        );
        let doc = run(vec![pick, pick_variable()]);
        let pick = attribute(&doc["variables"][0], "Pick");
        assert_eq!(argument(pick, "a")["value"], "5");
        assert_eq!(argument(pick, "b")["value"], "2");
        assert_eq!(argument(pick, "b")["defaulted"], true);
    }

    #[test]
    fn test_overload_choice_ignores_unrelated_decorators() {
        let pick = || {
            decorator(
                "Pick",
                vec![
                    vec![param("a", "int", None)],
                    vec![param("a", "int", None), param("b", "int", Some("2"))],
                ],
            )
        };
        let a = run(vec![range(), pick(), pick_variable()]);
        let b = run(vec![pick(), pick_variable(), range()]);
        assert_eq!(
            attribute(&a["variables"][0], "Pick"),
            attribute(&b["variables"][0], "Pick")
        );
    }

    #[test]
    fn test_overload_mismatch_policy() {
        let compounds = || {
            vec![
                range(),
                scope("app", vec![marked("v", vec![builtin("int")], " | Range(\"low\")")]),
            ]
        };
        assert!(matches!(
            run_err(compounds()),
            ReflectError::OverloadResolution { ref variable, .. } if variable == "app::v"
        ));

        let mut config = GluegenConfig::default();
        config.resolution.overload_mismatch = OverloadPolicy::Skip;
        let output = Pipeline::new(config)
            .run(&AstSet::from_compounds(compounds()))
            .unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.document["variables"][0]["attached_attributes"], json!([]));
    }

    #[test]
    fn test_too_many_arguments_is_a_mismatch() {
        let err = run_err(vec![
            range(),
            scope("app", vec![marked("v", vec![builtin("int")], " | Range(1, 2, 3)")]),
        ]);
        assert!(matches!(err, ReflectError::OverloadResolution { .. }));
    }

    #[test]
    fn test_invalid_definition_aborts() {
        let err = run_err(vec![decorator(
            "Bad",
            vec![vec![param("a", "int", Some("1")), param("b", "int", None)]],
        )]);
        assert!(matches!(err, ReflectError::InvalidAttributeDefinition { .. }));
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

mod determinism_tests {
    use super::*;

    fn compounds() -> Vec<Compound> {
        vec![
            box_class(),
            decorator("Zeta", vec![vec![param("z", "int", Some("1"))]]),
            decorator("Alpha", vec![vec![param("a", "bool", Some("true"))]]),
            scope(
                "app",
                vec![
                    marked("one", vec![builtin("int")], ""),
                    marked(
                        "two",
                        vec![class("classapp_1_1Box"), delim("<"), builtin("float"), delim(">")],
                        "",
                    ),
                    marked(
                        "three",
                        vec![class("classapp_1_1Box"), delim("<"), builtin("int"), delim(">")],
                        "",
                    ),
                ],
            ),
        ]
    }

    #[test]
    fn test_identical_input_identical_output() {
        let first = Pipeline::default()
            .run(&AstSet::from_compounds(compounds()))
            .unwrap()
            .to_json(true)
            .unwrap();
        let second = Pipeline::default()
            .run(&AstSet::from_compounds(compounds()))
            .unwrap()
            .to_json(true)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decorator_order_does_not_change_ids() {
        let mut reversed = compounds();
        reversed.swap(1, 2);
        let a = run(compounds());
        let b = run(reversed);
        assert_eq!(a["attribute_definitions"], b["attribute_definitions"]);
        assert_eq!(a["attribute_definitions"][0]["name"], "Alpha");
        assert_eq!(a["attribute_definitions"][0]["parameters"][0]["id"], "1");
    }

    #[test]
    fn test_indices_follow_discovery_order() {
        let doc = run(compounds());
        let indices: Vec<_> = doc["variables"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["index"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(indices, vec!["21", "22", "23"]);

        let signatures: Vec<_> = doc["type_definitions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["signature"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(signatures, vec!["classapp_1_1Box<float>", "classapp_1_1Box<int>"]);
        assert_eq!(doc["type_definitions"][1]["members"][0]["index"], "2");
    }
}
