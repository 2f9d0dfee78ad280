//! End-to-end scenarios for the capability engine: environment reads,
//! transitive reachability, explicit-over-derived precedence, and safe
//! terminators.

use capgraph_analysis::{
    get_capability_info, scan_env_reads, Capability, CapabilityType, Classifier, Config,
    StdClassifier, DYNAMIC_VALUE,
};
use capgraph_ir::{
    AstId, Decl, Expr, FuncDecl, IdentTarget, PackageId, Program, ProgramBuilder, SourceFile,
    Stmt, Type,
};
use std::collections::HashSet;

fn queried(packages: &[PackageId]) -> HashSet<PackageId> {
    packages.iter().copied().collect()
}

fn env_call_stmt(pkg: &str, func: &str, args: Vec<Expr>) -> Stmt {
    Stmt::Expr(Expr::call(
        Expr::selector(Expr::import_ident(pkg, pkg), func),
        args,
    ))
}

/// A classifier with explicit opinions about a handful of test
/// functions, on top of a minimal standard-library prefix list.
struct TestClassifier {
    categories: Vec<(&'static str, &'static str, Capability)>,
}

impl Classifier for TestClassifier {
    fn function_category(&self, package: &str, name: &str) -> Capability {
        self.categories
            .iter()
            .find(|(p, n, _)| *p == package && *n == name)
            .map(|(_, _, c)| *c)
            .unwrap_or(Capability::Unspecified)
    }

    fn is_std_lib(&self, path: &str) -> bool {
        let first = path.split('/').next().unwrap_or(path);
        ["os", "syscall", "runtime"].contains(&first)
    }
}

#[test]
fn env_literal_read_is_reported_and_direct() {
    let mut b = ProgramBuilder::new();
    let p = b.add_package("example.com/p", "p");
    let os = b.add_package("os", "os");
    let run = b.add_function(Some(p), "p.Run");
    let getenv = b.add_function(Some(os), "os.Getenv");
    b.add_call(run, getenv);
    b.add_file(
        p,
        SourceFile::new(
            "p.x",
            vec![Decl::Func(FuncDecl {
                id: AstId(0),
                name: "Run".to_string(),
                body: vec![env_call_stmt(
                    "os",
                    "Getenv",
                    vec![Expr::string_lit("\"HOME\"")],
                )],
            })],
        ),
    );
    let program = b.finish();

    let report = scan_env_reads(&program);
    assert_eq!(report.by_package.len(), 1);
    assert!(report.by_package["example.com/p"].contains("HOME"));

    let classifier = StdClassifier::new();
    let list = get_capability_info(&program, &queried(&[p]), &classifier, &Config::default());
    let env_record = list
        .capability_info
        .iter()
        .find(|r| r.capability == Capability::ReadEnvironment)
        .expect("read-environment record");
    assert_eq!(env_record.package_path, "example.com/p");
    assert_eq!(env_record.capability_type, Some(CapabilityType::Direct));
    assert_eq!(env_record.path[0].name, "p.Run");
}

#[test]
fn env_constant_read_resolves_to_constant_value() {
    let mut b = ProgramBuilder::new();
    let p = b.add_package("example.com/p", "p");
    b.add_file(
        p,
        SourceFile::new(
            "p.x",
            vec![Decl::Func(FuncDecl {
                id: AstId(0),
                name: "Run".to_string(),
                body: vec![env_call_stmt(
                    "os",
                    "Getenv",
                    vec![Expr::ident(
                        "K",
                        IdentTarget::Const {
                            value: "\"PATH\"".to_string(),
                        },
                    )],
                )],
            })],
        ),
    );
    let program = b.finish();

    let report = scan_env_reads(&program);
    assert!(report.by_package["example.com/p"].contains("PATH"));
    assert_eq!(report.totals["PATH"], 1);
}

#[test]
fn env_dynamic_read_records_sentinel() {
    let mut b = ProgramBuilder::new();
    let p = b.add_package("example.com/p", "p");
    b.add_file(
        p,
        SourceFile::new(
            "p.x",
            vec![Decl::Func(FuncDecl {
                id: AstId(0),
                name: "Run".to_string(),
                body: vec![env_call_stmt(
                    "os",
                    "Getenv",
                    vec![Expr::ident("userInput", IdentTarget::Other)],
                )],
            })],
        ),
    );
    let program = b.finish();

    let report = scan_env_reads(&program);
    assert!(report.by_package["example.com/p"].contains(DYNAMIC_VALUE));
}

#[test]
fn transitive_file_io_through_dependency_package() {
    let mut b = ProgramBuilder::new();
    let q = b.add_package("example.com/q", "q");
    let r = b.add_package("example.com/r", "r");
    let os = b.add_package("os", "os");
    let run = b.add_function(Some(q), "q.Run");
    let helper = b.add_function(Some(r), "r.Helper");
    let read_file = b.add_function(Some(os), "os.ReadFile");
    b.add_call(run, helper);
    b.add_call(helper, read_file);
    let program = b.finish();

    let classifier = StdClassifier::new();
    let list = get_capability_info(&program, &queried(&[q]), &classifier, &Config::default());

    let files: Vec<_> = list
        .capability_info
        .iter()
        .filter(|r| r.capability == Capability::Files)
        .collect();
    assert_eq!(files.len(), 1);
    let record = files[0];
    assert_eq!(record.package_path, "example.com/q");
    assert_eq!(record.capability_type, Some(CapabilityType::Transitive));
    let names: Vec<&str> = record.path.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["q.Run", "r.Helper", "os.ReadFile"]);
    assert_eq!(
        record.dep_path.as_deref(),
        Some("q.Run r.Helper os.ReadFile")
    );
}

#[test]
fn same_package_helper_stays_direct() {
    let mut b = ProgramBuilder::new();
    let q = b.add_package("example.com/q", "q");
    let os = b.add_package("os", "os");
    let run = b.add_function(Some(q), "q.Run");
    let helper = b.add_function(Some(q), "q.helper");
    let read_file = b.add_function(Some(os), "os.ReadFile");
    b.add_call(run, helper);
    b.add_call(helper, read_file);
    let program = b.finish();

    let classifier = StdClassifier::new();
    let list = get_capability_info(&program, &queried(&[q]), &classifier, &Config::default());
    let record = list
        .capability_info
        .iter()
        .find(|r| r.capability == Capability::Files && r.path[0].name == "q.Run")
        .expect("files record for q.Run");
    assert_eq!(record.capability_type, Some(CapabilityType::Direct));
}

#[test]
fn explicit_classification_suppresses_derived_capability() {
    let mut b = ProgramBuilder::new();
    let app = b.add_package("example.com/app", "app");
    let main = b.add_function(Some(app), "app.Main");
    let f = b.add_function(Some(app), "app.F");
    b.add_call(main, f);
    b.link_syntax(f, AstId(0));
    // app.F contains an unsafe-pointer conversion in its body.
    b.add_file(
        app,
        SourceFile::new(
            "f.x",
            vec![Decl::Func(FuncDecl {
                id: AstId(0),
                name: "F".to_string(),
                body: vec![Stmt::Expr(Expr::conversion(
                    Type::pointer(Type::basic("byte")),
                    Type::unsafe_pointer(),
                    Expr::ident("p", IdentTarget::Other),
                ))],
            })],
        ),
    );
    let program = b.finish();

    let classifier = TestClassifier {
        categories: vec![("example.com/app", "app.F", Capability::Runtime)],
    };
    let list = get_capability_info(&program, &queried(&[app]), &classifier, &Config::default());

    assert!(list
        .capability_info
        .iter()
        .any(|r| r.capability == Capability::Runtime));
    assert!(
        !list
            .capability_info
            .iter()
            .any(|r| r.capability == Capability::UnsafePointer),
        "explicitly classified function must not also report a derived capability"
    );
}

#[test]
fn safe_function_terminates_every_path() {
    let mut b = ProgramBuilder::new();
    let app = b.add_package("example.com/app", "app");
    let os = b.add_package("os", "os");
    let main = b.add_function(Some(app), "app.Main");
    let sanitize = b.add_function(Some(app), "app.sanitize");
    let open = b.add_function(Some(os), "os.Open");
    b.add_call(main, sanitize);
    b.add_call(sanitize, open);
    let program = b.finish();

    let classifier = TestClassifier {
        categories: vec![
            ("example.com/app", "app.sanitize", Capability::Safe),
            ("os", "os.Open", Capability::Files),
        ],
    };
    let list = get_capability_info(&program, &queried(&[app]), &classifier, &Config::default());
    assert!(
        list.capability_info.is_empty(),
        "no path may traverse the safe sanitizer: {:?}",
        list.capability_info
    );
}

#[test]
fn capability_root_inside_queried_package_reports_itself() {
    let mut b = ProgramBuilder::new();
    let app = b.add_package("example.com/app", "app");
    let asm = b.add_function(Some(app), "app.fastHash");
    b.mark_external(asm);
    let program = b.finish();

    let classifier = StdClassifier::new();
    let list = get_capability_info(&program, &queried(&[app]), &classifier, &Config::default());
    let record = list
        .capability_info
        .iter()
        .find(|r| r.capability == Capability::ArbitraryExecution)
        .expect("arbitrary-execution record for the assembly function");
    assert_eq!(record.path.len(), 1);
    assert_eq!(record.path[0].name, "app.fastHash");
    assert_eq!(record.capability_type, Some(CapabilityType::Direct));
}

#[test]
fn disable_builtin_skips_derived_scanners() {
    let mut b = ProgramBuilder::new();
    let app = b.add_package("example.com/app", "app");
    let asm = b.add_function(Some(app), "app.fastHash");
    b.mark_external(asm);
    let program = b.finish();

    let config = Config {
        disable_builtin: true,
        ..Config::default()
    };
    let classifier = StdClassifier::new();
    let list = get_capability_info(&program, &queried(&[app]), &classifier, &config);
    assert!(list.capability_info.is_empty());
}

#[test]
fn program_survives_json_round_trip_before_analysis() {
    let mut b = ProgramBuilder::new();
    let q = b.add_package("example.com/q", "q");
    let os = b.add_package("os", "os");
    let run = b.add_function(Some(q), "q.Run");
    let read_file = b.add_function(Some(os), "os.ReadFile");
    b.add_call(run, read_file);
    let program = b.finish();

    let json = serde_json::to_string(&program).unwrap();
    let mut decoded: Program = serde_json::from_str(&json).unwrap();
    decoded.validate().unwrap();

    let q_id = decoded.package_by_path("example.com/q").unwrap();
    let classifier = StdClassifier::new();
    let list = get_capability_info(&decoded, &queried(&[q_id]), &classifier, &Config::default());
    assert_eq!(list.capability_info.len(), 1);
    assert_eq!(list.capability_info[0].capability, Capability::Files);
}
