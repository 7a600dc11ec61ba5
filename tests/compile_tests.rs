//! End-to-end compilation of trees built with `scssc::ast::builder`.

mod common;

use common::{compile_err, compile_normalized, compile_ok, normalize};
use scssc::ast::builder::*;
use scssc::{Compiler, ErrorType};

// ============================================================================
// EXPRESSIONS AND VARIABLES
// ============================================================================

#[test]
fn variables_become_root_properties() {
    let tree = stylesheet(vec![
        set("x", lit("5px")),
        set("y", lit("10px")),
        rule(&["a"], vec![decl("width", infix("$x + $y"))]),
    ]);
    assert_eq!(
        compile_normalized(&tree),
        ":root{ --x: 5px; --y: 10px; } a{ width: 15px; }"
    );
}

#[test]
fn integer_and_pixel_sums() {
    let tree = stylesheet(vec![rule(
        &["a"],
        vec![
            decl("order", infix("2 + 3")),
            decl("width", infix("2px + 3")),
            decl("height", infix("( 1 + 2 ) * 3px")),
        ],
    )]);
    assert_eq!(
        compile_normalized(&tree),
        "a{ order: 5; width: 5px; height: 9px; }"
    );
}

#[test]
fn lone_hex_operand_is_kept_as_written() {
    let tree = stylesheet(vec![rule(
        &["a"],
        vec![
            decl("color", expr(vec![lit("#000000")])),
            decl("background", expr(vec![lit("#0a0a0a")])),
        ],
    )]);
    assert_eq!(
        compile_normalized(&tree),
        "a{ color: #000000; background: #0a0a0a; }"
    );
}

#[test]
fn list_alias_stays_a_list() {
    let tree = stylesheet(vec![
        set("sizes", list(vec![lit("1px"), lit("2px")])),
        set("copy", var("sizes")),
        rule(
            &["a"],
            vec![
                decl("n", call("length", vec![var("copy")])),
                decl("last", call("nth", vec![var("copy"), lit("2")])),
            ],
        ),
    ]);
    assert_eq!(compile_normalized(&tree), "a{ n: 2; last: 2px; }");
}

#[test]
fn output_positions_use_custom_properties() {
    let tree = stylesheet(vec![
        set("c", lit("red")),
        set("sizes", list(vec![lit("1px"), lit("2px")])),
        rule(
            &["a"],
            vec![
                decl("border", values(vec![vec![lit("1px"), lit("solid"), var("c")], vec![lit("red")]])),
                decl("margin", var("sizes")),
                decl("padding", var("unknown")),
            ],
        ),
    ]);
    assert_eq!(
        compile_normalized(&tree),
        ":root{ --c: red; } a{ border: 1px solid var(--c), red; margin: 1px, 2px; padding: $unknown; }"
    );
}

#[test]
fn nested_declarations_stay_out_of_root_block() {
    let tree = stylesheet(vec![
        set("keep", lit("1")),
        rule(&["a"], vec![set("local", lit("2")), decl("z-index", infix("$local + 1"))]),
    ]);
    assert_eq!(compile_normalized(&tree), ":root{ --keep: 1; } a{ z-index: 3; }");
}

#[test]
fn compiler_reuse_starts_from_scratch() {
    let mut compiler = Compiler::new();
    let first = stylesheet(vec![set("x", lit("1"))]);
    assert_eq!(compiler.compile(&first).unwrap(), ":root{\n\t--x: 1;\n}");

    let second = stylesheet(vec![rule(&["a"], vec![decl("w", infix("$x + 1"))])]);
    let err = compiler.compile(&second).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Reference);
    assert!(compiler.symbols().is_empty());
}

// ============================================================================
// BUILT-INS
// ============================================================================

#[test]
fn length_and_nth() {
    let tree = stylesheet(vec![
        set("sizes", list(vec![lit("4px"), lit("8px"), lit("16px")])),
        rule(
            &["a"],
            vec![
                decl("count", call("length", vec![var("sizes")])),
                decl("first", call("nth", vec![var("sizes"), lit("1")])),
                decl("last", call("nth", vec![var("sizes"), infix("1 + 2")])),
            ],
        ),
    ]);
    assert_eq!(
        compile_normalized(&tree),
        "a{ count: 3; first: 4px; last: 16px; }"
    );
}

#[test]
fn length_of_map_is_a_type_error() {
    let tree = stylesheet(vec![
        set("theme", map(vec![("fg", lit("black"))])),
        rule(&["a"], vec![decl("n", call("length", vec![var("theme")]))]),
    ]);
    assert_eq!(compile_err(&tree).error_type(), ErrorType::Semantic);
}

#[test]
fn nth_past_the_end_fails() {
    let tree = stylesheet(vec![
        set("sizes", list(vec![lit("4px")])),
        rule(&["a"], vec![decl("n", call("nth", vec![var("sizes"), lit("2")]))]),
    ]);
    let err = compile_err(&tree);
    assert_eq!(err.error_type(), ErrorType::Semantic);
    assert!(err.message().contains("out of range"));
}

#[test]
fn colour_and_gradient_functions() {
    let tree = stylesheet(vec![
        set("base", lit("#336699")),
        rule(
            &["a"],
            vec![
                decl("color", call("darken", vec![var("base"), lit("10%")])),
                decl("border-color", call("lighten", vec![lit("red"), lit("20%")])),
                decl("background", call("linear-gradient", vec![lit("toright"), lit("red"), lit("blue")])),
                decl("box-shadow", call("rgba", vec![lit("0"), lit("0"), lit("0"), lit("0.5")])),
                decl("transform", call("translate", vec![var("base")])),
            ],
        ),
    ]);
    let css = compile_ok(&tree);
    assert!(css.contains("color: color-mix(in srgb, black 10%, #336699);"));
    assert!(css.contains("border-color: color-mix(in srgb, white 20%, red);"));
    assert!(css.contains("background: linear-gradient(to right, red, blue);"));
    assert!(css.contains("box-shadow: rgba(0, 0, 0, 0.5);"));
    assert!(css.contains("transform: translate(var(--base));"));
}

// ============================================================================
// MIXINS
// ============================================================================

fn sized_box() -> scssc::Node {
    mixin(
        "box",
        vec![param("a"), param_default("b", lit("10px"))],
        vec![decl("width", var("a")), decl("height", var("b"))],
    )
}

#[test]
fn mixin_default_fills_missing_argument() {
    let tree = stylesheet(vec![sized_box(), rule(&["div"], vec![include("box", vec![lit("5px")])])]);
    assert_eq!(compile_normalized(&tree), "div{ width: 5px; height: 10px; }");
}

#[test]
fn mixin_without_required_argument_fails() {
    let tree = stylesheet(vec![sized_box(), rule(&["div"], vec![include("box", vec![])])]);
    assert_eq!(compile_err(&tree).error_type(), ErrorType::Argument);
}

#[test]
fn variadic_mixin_joins_arguments() {
    let tree = stylesheet(vec![
        mixin("shadow", vec![rest_param("s")], vec![decl("box-shadow", var("s"))]),
        rule(&["a"], vec![include("shadow", vec![lit("0 1px red"), lit("0 2px blue")])]),
    ]);
    assert_eq!(compile_normalized(&tree), "a{ box-shadow: 0 1px red, 0 2px blue; }");
}

#[test]
fn mixin_rules_nest_under_the_includer() {
    let tree = stylesheet(vec![
        mixin(
            "link",
            vec![param("c")],
            vec![rule(&["&:hover"], vec![decl("color", var("c")), rule(&["span"], vec![decl("x", lit("1"))])])],
        ),
        rule(&["nav"], vec![rule(&["a"], vec![include("link", vec![lit("red")])])]),
    ]);
    assert_eq!(
        compile_normalized(&tree),
        "nav{ } nav a:hover{ color: red; } nav a:hover span{ x: 1; } nav a{ }"
    );
}

// ============================================================================
// NESTING
// ============================================================================

#[test]
fn deep_rule_follows_the_outer_closing_brace() {
    let tree = stylesheet(vec![rule(
        &[".a"],
        vec![
            decl("color", lit("red")),
            rule(&[".b"], vec![rule(&[".c"], vec![decl("x", lit("1"))])]),
        ],
    )]);
    let css = compile_normalized(&tree);
    assert_eq!(css, ".a{ color: red; } .a .b .c{ x: 1; } .a .b{ }");
    let outer_close = css.find('}').unwrap();
    assert!(css.find(".a .b .c{").unwrap() > outer_close);
}

#[test]
fn deferred_rules_flush_after_their_own_statement() {
    let tree = stylesheet(vec![
        rule(&["a"], vec![rule(&["&.on"], vec![decl("x", lit("1"))])]),
        rule(&["b"], vec![decl("y", lit("2"))]),
    ]);
    assert_eq!(compile_normalized(&tree), "a{ } a.on{ x: 1; } b{ y: 2; }");
}

// ============================================================================
// LOOPS
// ============================================================================

fn counted(keyword: &str) -> scssc::Node {
    stylesheet(vec![for_loop(
        "i",
        lit("1"),
        keyword,
        lit("3"),
        vec![rule(&[".col-#{$i}"], vec![decl("flex", lit("1"))])],
    )])
}

#[test]
fn for_through_is_inclusive() {
    assert_eq!(
        compile_normalized(&counted("through")),
        ".col-1{ flex: 1; } .col-2{ flex: 1; } .col-3{ flex: 1; }"
    );
}

#[test]
fn for_to_is_exclusive() {
    assert_eq!(
        compile_normalized(&counted("to")),
        ".col-1{ flex: 1; } .col-2{ flex: 1; }"
    );
}

#[test]
fn for_bounds_fold_variables() {
    let tree = stylesheet(vec![
        set("n", lit("2")),
        for_loop("i", lit("1"), "through", var("n"), vec![rule(&[".x-#{$i}"], vec![])]),
    ]);
    assert_eq!(compile_normalized(&tree), ":root{ --n: 2; } .x-1{ } .x-2{ }");
}

#[test]
fn loop_rules_nested_deeper_are_unrolled_too() {
    let tree = stylesheet(vec![rule(
        &[".list"],
        vec![for_loop(
            "i",
            lit("1"),
            "through",
            lit("2"),
            vec![rule(&["&-#{$i}"], vec![rule(&["a"], vec![decl("color", lit("red"))])])],
        )],
    )]);
    assert_eq!(
        compile_normalized(&tree),
        ".list{ } .list-1{ } .list-1 a{ color: red; } .list-2{ } .list-2 a{ color: red; }"
    );
}

#[test]
fn each_over_list_variable() {
    let tree = stylesheet(vec![
        set("sizes", list(vec![lit("sm"), lit("lg")])),
        each(&["s"], var("sizes"), vec![rule(&[".btn-#{$s}"], vec![decl("size", var("s"))])]),
    ]);
    assert_eq!(
        compile_normalized(&tree),
        ".btn-sm{ size: sm; } .btn-lg{ size: lg; }"
    );
}

#[test]
fn each_over_map_binds_key_and_value() {
    let tree = stylesheet(vec![
        set("theme", map(vec![("primary", lit("blue")), ("danger", lit("red"))])),
        each(
            &["name", "color"],
            var("theme"),
            vec![rule(&[".text-#{$name}"], vec![decl("color", var("color"))])],
        ),
    ]);
    assert_eq!(
        compile_normalized(&tree),
        ".text-primary{ color: blue; } .text-danger{ color: red; }"
    );
}

#[test]
fn each_over_inline_list_declaration() {
    let tree = stylesheet(vec![
        set("last", lit("c")),
        each(
            &["s"],
            list(vec![lit("a"), lit("b"), var("last")]),
            vec![rule(&[".icon-#{$s}"], vec![decl("content", var("s"))])],
        ),
    ]);
    assert_eq!(
        compile_normalized(&tree),
        ":root{ --last: c; } .icon-a{ content: a; } .icon-b{ content: b; } .icon-c{ content: c; }"
    );
}

#[test]
fn nested_loops_substitute_both_variables() {
    let tree = stylesheet(vec![for_loop(
        "i",
        lit("1"),
        "through",
        lit("2"),
        vec![each(&["s"], lit("a, b"), vec![rule(&[".g-#{$i}-#{$s}"], vec![])])],
    )]);
    assert_eq!(
        compile_normalized(&tree),
        ".g-1-a{ } .g-1-b{ } .g-2-a{ } .g-2-b{ }"
    );
}

// ============================================================================
// CONDITIONALS
// ============================================================================

#[test]
fn if_uses_variable_guard() {
    let tree = stylesheet(vec![
        set("dark", lit("true")),
        rule(
            &["body"],
            vec![if_chain(var("dark"), vec![decl("background", lit("black"))], vec![], None)],
        ),
    ]);
    assert!(compile_ok(&tree).contains("background: black;"));
}

#[test]
fn true_else_if_with_empty_body_falls_through() {
    let tree = stylesheet(vec![rule(
        &["a"],
        vec![if_chain(
            infix("1 > 2"),
            vec![decl("x", lit("then"))],
            vec![
                (infix("1 < 2"), vec![]),
                (infix("2 == 2"), vec![decl("x", lit("second"))]),
            ],
            Some(vec![decl("x", lit("else"))]),
        )],
    )]);
    assert_eq!(compile_normalized(&tree), "a{ x: second; }");

    let tree = stylesheet(vec![rule(
        &["a"],
        vec![if_chain(
            lit("false"),
            vec![],
            vec![(lit("true"), vec![])],
            Some(vec![decl("x", lit("else"))]),
        )],
    )]);
    assert_eq!(compile_normalized(&tree), "a{ x: else; }");
}

#[test]
fn not_negates_the_whole_guard() {
    let tree = stylesheet(vec![rule(
        &["a"],
        vec![if_chain(
            infix("not 5 > 3"),
            vec![decl("x", lit("then"))],
            vec![],
            Some(vec![decl("x", lit("else"))]),
        )],
    )]);
    assert_eq!(compile_normalized(&tree), "a{ x: else; }");

    let tree = stylesheet(vec![rule(
        &["a"],
        vec![if_chain(
            infix("not true and false"),
            vec![decl("x", lit("then"))],
            vec![],
            Some(vec![decl("x", lit("else"))]),
        )],
    )]);
    assert_eq!(compile_normalized(&tree), "a{ x: then; }");
}

#[test]
fn no_branch_and_no_else_renders_nothing() {
    let tree = stylesheet(vec![rule(
        &["a"],
        vec![if_chain(lit("false"), vec![decl("x", lit("1"))], vec![], None)],
    )]);
    assert_eq!(normalize(&compile_ok(&tree)), "a{ }");
}
