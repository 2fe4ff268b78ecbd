//! End-to-end tests over the whole pipeline: scan, parse, analyse, evaluate
//! (and, for shapes, symbolically compile). Each test builds its own
//! `System`/`Program` pair rather than sharing state, matching how a host
//! embedder would drive one compile at a time.

use std::rc::Rc;

use curv::{
    error::Context,
    location::Location,
    sc,
    shape,
    source::{Source, SourceKind},
    system::System,
    value::Value,
    Program,
};

fn eval(src: &str) -> Value {
    run(src).unwrap_or_else(|err| panic!("{src:?} failed to evaluate: {err}"))
}

fn run(src: &str) -> curv::Result<Value> {
    let system = Rc::new(System::new());
    let mut program = Program::new(system, Source::from_string(src), None);
    program.compile()?;
    program.eval()
}

fn num(v: &Value) -> f64 {
    v.as_num().unwrap_or_else(|| panic!("expected a number, got {v:?}"))
}

#[test]
fn let_binding_with_arithmetic_precedence() {
    let v = eval("let x = 1 in x + 2 * 3");
    assert_eq!(num(&v), 7.0);
}

#[test]
fn list_comprehension_over_a_range() {
    let v = eval("[for (i in 1..3) i*i]");
    let items = v.as_list().expect("expected a list");
    let squares: Vec<f64> = items.iter().map(num).collect();
    assert_eq!(squares, vec![1.0, 4.0, 9.0]);
}

#[test]
fn recursive_let_binding_computes_factorial() {
    let v = eval("let f = x -> if (x <= 1) 1 else x * f(x - 1) in f(5)");
    assert_eq!(num(&v), 120.0);
}

#[test]
fn self_referential_definition_is_an_illegal_recursive_reference() {
    let err = run("let x = x + 1 in x").expect_err("expected a recursive-reference error");
    assert!(
        err.message.contains("illegal recursive reference"),
        "unexpected error message: {}",
        err.message
    );
}

#[test]
fn directory_import_exposes_members_by_file_stem() {
    let dir = std::env::temp_dir().join("curv_integration_test_directory_import");
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).expect("create temp dir");
    std::fs::write(dir.join("a.curv"), "42").expect("write a.curv");
    std::fs::write(dir.join("b.curv"), "\"hi\"").expect("write b.curv");

    let loc_source = Source::from_string("");
    let loc = Location::new(Rc::clone(&loc_source), curv::token::Token::new(0, 0, 0, curv::token::TokenKind::EndOfSource));
    let value = curv::directory_import::include(dir.to_str().unwrap(), &loc).expect("include directory");

    let record = value.as_record().expect("directory import should yield a record");
    assert_eq!(num(&record.get("a").unwrap().unwrap()), 42.0);
    match record.get("b").unwrap().unwrap() {
        Value::Str(s) => assert_eq!(s.as_ref(), "hi"),
        other => panic!("expected a string field, got {other:?}"),
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn sphere_dist_recognised_and_shape_compiled_to_glsl() {
    let v = eval("sphere(1)");
    let info = shape::recognise(&v).expect("sphere(1) should be recognised as a shape");
    assert_eq!(info.dimension, shape::Dimension::D3);

    let loc_source = Source::from_string("");
    let loc = Location::new(Rc::clone(&loc_source), curv::token::Token::new(0, 0, 0, curv::token::TokenKind::EndOfSource));

    let sym = sc::compile_function(&info.dist, &loc).expect("sphere's dist should be Shape-Compilable");
    let shader = sc::glsl::render(&sym);
    assert!(shader.contains("sqrt"), "expected the GLSL source to call sqrt: {shader}");

    let ok = sc::test_shape_at_point(&v, &Value::List(Rc::new(vec![Value::Num(0.0), Value::Num(0.0), Value::Num(0.0)])), &loc)
        .expect("sc_test should succeed");
    assert!(matches!(ok, Value::Bool(true)));
}

#[test]
fn circle_dist_at_origin_is_negative_radius() {
    let v = eval("circle(1)");
    let info = shape::recognise(&v).expect("circle(1) should be recognised as a shape");
    assert_eq!(info.dimension, shape::Dimension::D2);

    let loc_source = Source::from_string("");
    let loc = Location::new(Rc::clone(&loc_source), curv::token::Token::new(0, 0, 0, curv::token::TokenKind::EndOfSource));
    let sym = sc::compile_function(&info.dist, &loc).expect("circle's dist should be Shape-Compilable");
    let substituted = sc::cpp::render(&sym);
    assert!(substituted.contains("std::sqrt"), "expected the C++ source to call std::sqrt: {substituted}");

    let direct = info.dist.call(&Value::List(Rc::new(vec![Value::Num(0.0), Value::Num(0.0), Value::Num(0.0)])), &loc).unwrap();
    assert_eq!(num(&direct), -1.0);
}

#[test]
fn self_recursive_dist_is_rejected_by_the_shape_compiler() {
    use curv::closure::Closure;
    use curv::frame::Frame;
    use curv::meaning::operation::Operation;
    use curv::pattern::Pattern;

    let loc_source = Source::from_string("");
    let loc = Location::new(Rc::clone(&loc_source), curv::token::Token::new(0, 0, 0, curv::token::TokenKind::EndOfSource));

    // A hand-built `dist` whose body calls itself: `p -> dist(p)`. There is
    // no base case, and no closure literal can reference itself before it
    // exists, so the call target is patched in via a `RefCell`-free Rc cycle
    // substitute: a `NonlocalRef` back into a one-slot captured frame that
    // holds the closure itself once constructed.
    let outer = Frame::new(1, None, None);
    let body = Rc::new(Operation::Call {
        func: Box::new(Operation::NonlocalRef {
            depth: 1,
            index: 0,
            name: Rc::from("self"),
        }),
        arg: Box::new(Operation::LocalRef {
            index: 0,
            name: Rc::from("p"),
        }),
        loc: loc.clone(),
    });
    let pattern = Rc::new(Pattern::List {
        items: vec![Pattern::Slot { index: 0, name: Rc::from("x") }],
        spread: Some(Box::new(Pattern::Wildcard)),
    });
    let closure = Rc::new(Closure::Lambda {
        name: Some(Rc::from("dist")),
        param: pattern,
        body,
        captured: Rc::clone(&outer),
        nslots: 1,
    });
    outer.set_eager(0, Value::Function(Rc::clone(&closure)));

    let err = sc::compile_function(&closure, &loc).expect_err("a self-recursive dist must be rejected");
    assert!(matches!(err.context, Context::ScFrame(_)));
    assert!(err.message.contains("recursive"), "unexpected message: {}", err.message);
}

#[test]
fn gpu_json_round_trips_infinite_bbox_as_oversized_exponent() {
    let loc_source = Source::from_string("");
    let loc = Location::new(Rc::clone(&loc_source), curv::token::Token::new(0, 0, 0, curv::token::TokenKind::EndOfSource));
    let value = Value::List(Rc::new(vec![Value::Num(f64::INFINITY), Value::Num(f64::NEG_INFINITY), Value::Num(1.5)]));
    let json = curv::gpu_json::encode(&value, &loc).expect("encode should succeed");
    assert!(json.contains("1e9999"));
    assert!(json.contains("-1e9999"));
}

#[test]
fn gpu_source_kind_is_selected_by_suffix_in_the_cli_loader() {
    // Exercises the same `SourceKind` the CLI picks for a `.gpu` path,
    // without shelling out to the binary.
    let source = Source::new("cached.gpu", "{}".to_string(), SourceKind::Gpu);
    assert_eq!(source.kind(), SourceKind::Gpu);
}
